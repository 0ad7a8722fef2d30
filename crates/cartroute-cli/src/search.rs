//! `search` command: a headless run of the discovery and planning workflow.

use cartroute_core::{AppConfig, LocationMode, RouteId, SearchRequest};
use cartroute_workflow::{
    HeadlessMap, MapApiError, MapApiGate, MapEvent, OverlayCategory, PointerKind,
    WorkflowController, WorkflowSettings,
};

use crate::adapters::build_services;

#[derive(Debug)]
pub(crate) struct SearchArgs {
    pub query: String,
    pub radius_km: f64,
    pub address: Option<String>,
    pub plan: bool,
    pub select: Option<u32>,
}

impl SearchArgs {
    fn to_request(&self) -> SearchRequest {
        let mode = match &self.address {
            Some(address) => LocationMode::Address(address.clone()),
            None => LocationMode::Current,
        };
        SearchRequest::new(self.query.clone(), self.radius_km * 1000.0, mode)
    }
}

/// Runs discovery, then planning and route selection when asked for, and
/// prints what the map would show.
///
/// # Errors
///
/// Returns an error if the collaborators cannot be built or planning is
/// refused. Failures inside the workflow are reported as notices.
pub(crate) async fn run_search(config: &AppConfig, args: &SearchArgs) -> anyhow::Result<()> {
    MapApiGate::global()
        .ensure_ready(|| async {
            if config.maps_api_key.trim().is_empty() {
                return Err(MapApiError::LoadFailed("maps API key is empty".to_string()));
            }
            Ok(())
        })
        .await?;

    let services = build_services(config)?;
    let mut controller = WorkflowController::new(
        HeadlessMap::new(),
        services,
        WorkflowSettings::from_app_config(config),
    );

    controller.discover(args.to_request());
    controller.run_until_idle().await;
    print_notices(&mut controller);
    print_stores(&controller);

    if args.plan && !controller.stores().is_empty() {
        controller.plan()?;
        controller.run_until_idle().await;
        print_notices(&mut controller);

        if let Some(route) = args.select {
            select_route(&mut controller, RouteId(route));
            controller.run_until_idle().await;
        }
        print_routes(&controller);
    }

    controller.shutdown();
    Ok(())
}

/// Clicks the route's drawn path, or selects it from the list when it has none.
fn select_route(controller: &mut WorkflowController<HeadlessMap>, route: RouteId) {
    let event = controller
        .route_layer(route)
        .and_then(|layer| controller.map().pointer(layer, PointerKind::Click))
        .unwrap_or(MapEvent::RouteClicked(route));
    controller.handle_map_event(event);
    if controller.selection().selected_route != Some(route) {
        println!("route {route} is not among the candidates");
    }
}

fn print_notices(controller: &mut WorkflowController<HeadlessMap>) {
    for notice in controller.take_notices() {
        println!("notice: {notice}");
    }
}

fn print_stores(controller: &WorkflowController<HeadlessMap>) {
    let stores = controller.stores();
    if stores.is_empty() {
        return;
    }
    let origin = controller.position();

    println!("{:<28}{:>9}  {:<36}PRODUCTS", "STORE", "KM", "ADDRESS");
    for store in stores {
        let distance = origin.map_or_else(
            || "-".to_string(),
            |o| format!("{:.2}", o.distance_km(&store.position)),
        );
        println!(
            "{:<28}{:>9}  {:<36}{}",
            store.name,
            distance,
            store.address,
            store.available_products().join(", ")
        );
    }
    println!(
        "{} store marker(s) drawn",
        controller.overlay_count(OverlayCategory::StoreMarkers)
    );
}

fn print_routes(controller: &WorkflowController<HeadlessMap>) {
    let selected = controller.selection().selected_route;

    println!("{:<4}{:>9}{:>9}{:>12}  {:<10}STOPS", "ID", "KM", "MIN", "COST", "PATH");
    for route in controller.routes() {
        let path = match (&route.error_message, controller.route_layer(route.id)) {
            (Some(_), _) => "error",
            (None, Some(_)) => "drawn",
            (None, None) => "none",
        };
        let marker = if selected == Some(route.id) { "*" } else { "" };
        println!(
            "{:<4}{:>9.2}{:>9}{:>12.0}  {:<10}{}",
            format!("{}{marker}", route.id),
            route.distance_km,
            route.duration_minutes,
            route.cost,
            path,
            route.stop_labels.join(" -> ")
        );
    }
}
