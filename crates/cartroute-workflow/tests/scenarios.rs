//! End-to-end runs of the workflow against in-memory collaborators.

mod support;

use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::time::Duration;

use cartroute_core::{GeoPosition, LocationMode, RouteId, SearchRequest, StoreId};
use cartroute_workflow::map::PinColor;
use cartroute_workflow::planning::ROUTE_PALETTE;
use cartroute_workflow::{
    LocationError, Notice, OverlayCategory, PathResolutionError, Phase, PointerKind, SearchError,
    Tab, WorkflowError,
};

use support::{
    candidate, drawn_path, here, store, two_stores, FakeGeocoder, FakeGeolocator, FakePaths,
    FakePlanner, FakeSearch, Harness,
};

fn rice_request() -> SearchRequest {
    SearchRequest::new("2kg rice", 2000.0, LocationMode::Current)
}

fn three_candidate_harness() -> Harness {
    Harness::new(
        FakeGeolocator::at(here()),
        FakeSearch::returning(two_stores()),
        FakePlanner::returning(vec![candidate(1), candidate(2), candidate(3)]),
        FakePaths::default()
            .answer("dest-1", 200, Ok(drawn_path()))
            .answer("dest-2", 100, Ok(drawn_path()))
            .answer(
                "dest-3",
                300,
                Err(PathResolutionError::Status {
                    status: "ZERO_RESULTS".to_string(),
                }),
            ),
    )
}

#[tokio::test(start_paused = true)]
async fn scenario_a_discovery_draws_user_radius_and_stores() {
    let mut h = Harness::new(
        FakeGeolocator::at(here()),
        FakeSearch::returning(two_stores()),
        FakePlanner::returning(Vec::new()),
        FakePaths::default(),
    );

    h.controller.discover(rice_request());
    h.controller.run_until_idle().await;

    let c = &h.controller;
    assert_eq!(c.phase(), Phase::Discovery);
    assert_eq!(c.overlay_count(OverlayCategory::UserMarker), 1);
    assert_eq!(c.overlay_count(OverlayCategory::RadiusCircle), 1);
    assert_eq!(c.overlay_count(OverlayCategory::StoreMarkers), 2);
    assert_eq!(c.map().markers().filter(|m| m.pin == PinColor::Green).count(), 2);
    let circle = c.map().circles().next().unwrap();
    assert!((circle.radius_meters - 2000.0).abs() < f64::EPSILON);
    assert_eq!(circle.center, here());
    assert_eq!(c.map().view(), Some((here(), 14)));
    assert_eq!(c.position(), Some(here()));
    assert_eq!(*h.search.seen_positions.lock().unwrap(), vec![here()]);
}

#[tokio::test(start_paused = true)]
async fn scenario_b_no_stores_is_a_notice_not_a_failure() {
    let mut h = Harness::new(
        FakeGeolocator::at(here()),
        FakeSearch::returning(Vec::new()),
        FakePlanner::returning(Vec::new()),
        FakePaths::default(),
    );

    h.controller.discover(rice_request());
    h.controller.run_until_idle().await;

    assert_eq!(h.controller.phase(), Phase::Discovery);
    assert_eq!(h.controller.overlay_count(OverlayCategory::StoreMarkers), 0);
    assert_eq!(h.controller.map().layer_count(), 0);
    assert_eq!(h.controller.take_notices(), vec![Notice::NoStoresFound]);
    assert!(matches!(h.controller.plan(), Err(WorkflowError::NoStores)));
}

#[tokio::test(start_paused = true)]
async fn scenario_c_paths_render_as_they_arrive() {
    let mut h = three_candidate_harness();
    h.controller.discover(rice_request());
    h.controller.run_until_idle().await;

    h.controller.plan().unwrap();
    h.controller.run_until_idle().await;

    let c = &h.controller;
    assert_eq!(c.phase(), Phase::Planning);
    assert!(!c.is_busy());
    assert_eq!(c.routes().len(), 3);
    assert_eq!(c.overlay_count(OverlayCategory::RoutePaths), 2);

    let first = c.route_layer(RouteId(1)).unwrap();
    let second = c.route_layer(RouteId(2)).unwrap();
    assert!(second < first, "route 2 resolved before route 1");
    assert!(c.route_layer(RouteId(3)).is_none());
    assert!(c.routes().iter().any(|r| r.id == RouteId(3)));

    assert_eq!(
        *h.paths.answered.lock().unwrap(),
        vec!["dest-2".to_string(), "dest-1".to_string(), "dest-3".to_string()]
    );
    assert!(h.controller.take_notices().is_empty());
}

#[tokio::test(start_paused = true)]
async fn scenario_d_route_click_selects_and_decays() {
    let mut h = three_candidate_harness();
    h.controller.discover(rice_request());
    h.controller.run_until_idle().await;
    h.controller.plan().unwrap();
    h.controller.run_until_idle().await;
    h.controller.toggle_sidebar();

    let layer = h.controller.route_layer(RouteId(2)).unwrap();
    let other = h.controller.route_layer(RouteId(1)).unwrap();
    let other_before = h.controller.map().polyline_style(other);
    let click = h.controller.map().pointer(layer, PointerKind::Click).unwrap();
    h.controller.handle_map_event(click);

    let selection = h.controller.selection();
    assert_eq!(selection.selected_route, Some(RouteId(2)));
    assert_eq!(selection.active_tab, Tab::Route);
    assert!(!selection.sidebar_collapsed);
    let emphasised = h.controller.map().polyline_style(layer).unwrap();
    assert!(emphasised.weight > 5);
    assert_eq!(h.controller.map().polyline_style(other), other_before);

    h.controller.run_until_idle().await;
    let settled = h.controller.map().polyline_style(layer).unwrap();
    assert!(settled.weight < emphasised.weight);
    assert_eq!(settled.weight, 8);
    assert_eq!(h.controller.selection().selected_route, Some(RouteId(2)));
}

#[tokio::test(start_paused = true)]
async fn scenario_e_location_denied_aborts_before_search() {
    let mut h = Harness::new(
        FakeGeolocator::failing(LocationError::PermissionDenied),
        FakeSearch::returning(two_stores()),
        FakePlanner::returning(Vec::new()),
        FakePaths::default(),
    );

    h.controller.discover(rice_request());
    h.controller.run_until_idle().await;

    assert_eq!(h.geolocator.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.search.calls.load(Ordering::SeqCst), 0);
    assert!(h.controller.map().history().is_empty());
    assert_eq!(h.controller.take_notices(), vec![Notice::LocationUnavailable]);
    assert!(!h.controller.is_busy());
}

#[tokio::test(start_paused = true)]
async fn address_mode_geocodes_before_searching() {
    let ben_thanh = GeoPosition::new(10.7725, 106.698);
    let mut h = Harness::with_geocoder(
        FakeGeolocator::failing(LocationError::Unsupported),
        FakeGeocoder {
            known: HashMap::from([("Ben Thanh Market".to_string(), ben_thanh)]),
        },
        FakeSearch::returning(two_stores()),
        FakePlanner::returning(Vec::new()),
        FakePaths::default(),
    );

    h.controller.discover(SearchRequest::new(
        "eggs",
        1500.0,
        LocationMode::Address("Ben Thanh Market".to_string()),
    ));
    h.controller.run_until_idle().await;

    assert_eq!(h.geolocator.calls.load(Ordering::SeqCst), 0);
    assert_eq!(*h.search.seen_positions.lock().unwrap(), vec![ben_thanh]);
    assert_eq!(h.controller.overlay_count(OverlayCategory::StoreMarkers), 2);
}

#[tokio::test(start_paused = true)]
async fn unknown_address_surfaces_notice() {
    let mut h = Harness::new(
        FakeGeolocator::at(here()),
        FakeSearch::returning(two_stores()),
        FakePlanner::returning(Vec::new()),
        FakePaths::default(),
    );

    h.controller.discover(SearchRequest::new(
        "eggs",
        1500.0,
        LocationMode::Address("Atlantis".to_string()),
    ));
    h.controller.run_until_idle().await;

    assert_eq!(h.search.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.controller.take_notices(), vec![Notice::AddressNotFound]);
    assert_eq!(h.controller.map().layer_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn search_failure_keeps_previous_results_for_retry() {
    let search = FakeSearch::returning(two_stores());
    search.push(Duration::ZERO, Err(SearchError::new("HTTP 502")));
    let mut h = Harness::new(
        FakeGeolocator::at(here()),
        search,
        FakePlanner::returning(Vec::new()),
        FakePaths::default(),
    );
    h.controller.discover(rice_request());
    h.controller.run_until_idle().await;

    h.controller.discover(rice_request());
    h.controller.run_until_idle().await;

    assert_eq!(h.controller.phase(), Phase::Discovery);
    assert_eq!(h.controller.take_notices(), vec![Notice::SearchFailed]);
    assert_eq!(h.controller.stores().len(), 2);
    assert_eq!(h.controller.overlay_count(OverlayCategory::StoreMarkers), 2);
}

#[tokio::test(start_paused = true)]
async fn stale_discovery_response_is_discarded() {
    let search = FakeSearch::default();
    search.push(
        Duration::from_millis(500),
        Ok(vec![
            store("old-1", 10.70, 106.60),
            store("old-2", 10.71, 106.61),
            store("old-3", 10.72, 106.62),
        ]),
    );
    search.push(Duration::from_millis(10), Ok(vec![store("new-1", 10.77, 106.70)]));
    let mut h = Harness::new(
        FakeGeolocator::at(here()),
        search,
        FakePlanner::returning(Vec::new()),
        FakePaths::default(),
    );

    let first = h.controller.discover(rice_request());
    let second = h.controller.discover(rice_request());
    assert!(second > first);

    let fresh = h.controller.next_event().await.unwrap();
    assert_eq!(fresh.generation, second);
    assert!(h.controller.handle_event(fresh));
    let selection_before = h.controller.selection().clone();
    let calls_before = h.controller.map().history().len();

    let stale = h.controller.next_event().await.unwrap();
    assert_eq!(stale.generation, first);
    assert!(!h.controller.handle_event(stale));

    assert_eq!(h.controller.stores().len(), 1);
    assert_eq!(h.controller.stores()[0].id, StoreId::from("new-1"));
    assert_eq!(h.controller.overlay_count(OverlayCategory::StoreMarkers), 1);
    assert_eq!(h.controller.map().history().len(), calls_before);
    assert_eq!(*h.controller.selection(), selection_before);
}

#[tokio::test(start_paused = true)]
async fn back_during_planning_drops_late_candidates() {
    let mut h = three_candidate_harness();
    h.controller.discover(rice_request());
    h.controller.run_until_idle().await;

    h.controller.plan().unwrap();
    assert!(h.controller.back());
    h.controller.run_until_idle().await;

    assert_eq!(h.controller.phase(), Phase::Discovery);
    assert!(h.controller.routes().is_empty());
    assert_eq!(h.controller.overlay_count(OverlayCategory::RoutePaths), 0);
    assert!(h.paths.requests.lock().unwrap().is_empty());
    assert_eq!(h.controller.overlay_count(OverlayCategory::StoreMarkers), 2);
}

#[tokio::test(start_paused = true)]
async fn back_after_planning_leaves_no_route_overlays() {
    let mut h = three_candidate_harness();
    h.controller.discover(rice_request());
    h.controller.run_until_idle().await;
    h.controller.plan().unwrap();
    h.controller.run_until_idle().await;
    h.controller.handle_map_event(cartroute_workflow::MapEvent::RouteClicked(RouteId(1)));

    assert!(h.controller.back());

    assert_eq!(h.controller.overlay_count(OverlayCategory::RoutePaths), 0);
    assert_eq!(h.controller.map().polylines().count(), 0);
    assert_eq!(h.controller.selection().selected_route, None);
    // one click listener per store marker is all that remains
    assert_eq!(h.controller.map().listener_count(), 2);
    h.controller.run_until_idle().await;
    assert_eq!(h.controller.map().polylines().count(), 0);
}

#[tokio::test(start_paused = true)]
async fn colors_are_stable_within_a_session_and_fresh_across_sessions() {
    let mut h = three_candidate_harness();
    h.controller.discover(rice_request());
    h.controller.run_until_idle().await;
    h.controller.plan().unwrap();
    h.controller.run_until_idle().await;

    let layer = h.controller.route_layer(RouteId(2)).unwrap();
    let color = h.controller.map().polyline_style(layer).unwrap().color;
    assert_eq!(color, ROUTE_PALETTE[1]);
    for _ in 0..3 {
        let enter = h.controller.map().pointer(layer, PointerKind::Enter).unwrap();
        h.controller.handle_map_event(enter);
        let leave = h.controller.map().pointer(layer, PointerKind::Leave).unwrap();
        h.controller.handle_map_event(leave);
    }
    assert_eq!(h.controller.map().polyline_style(layer).unwrap().color, color);

    assert!(h.controller.back());
    assert_eq!(h.controller.route_style(RouteId(2)), None);

    *h.planner.result.lock().unwrap() = Ok(vec![candidate(2), candidate(1)]);
    h.controller.plan().unwrap();
    h.controller.run_until_idle().await;
    assert_eq!(h.controller.route_style(RouteId(2)).unwrap().color, ROUTE_PALETTE[0]);
    assert_eq!(h.controller.route_style(RouteId(1)).unwrap().color, ROUTE_PALETTE[1]);
}

#[tokio::test(start_paused = true)]
async fn planning_failure_still_enters_planning_with_notice() {
    let mut h = Harness::new(
        FakeGeolocator::at(here()),
        FakeSearch::returning(two_stores()),
        FakePlanner::failing("backend unavailable"),
        FakePaths::default(),
    );
    h.controller.discover(rice_request());
    h.controller.run_until_idle().await;

    h.controller.plan().unwrap();
    h.controller.run_until_idle().await;

    assert_eq!(h.controller.phase(), Phase::Planning);
    assert_eq!(h.controller.routes().len(), 1);
    assert!(h.controller.routes()[0].is_sentinel());
    assert!(h.paths.requests.lock().unwrap().is_empty());
    assert_eq!(
        h.controller.take_notices(),
        vec![Notice::PlanningFailed("backend unavailable".to_string())]
    );
}

#[tokio::test(start_paused = true)]
async fn crashed_search_clears_busy_and_can_be_retried() {
    let search = FakeSearch::panicking(1);
    search.push(Duration::ZERO, Ok(two_stores()));
    let mut h = Harness::new(
        FakeGeolocator::at(here()),
        search,
        FakePlanner::returning(Vec::new()),
        FakePaths::default(),
    );

    h.controller.discover(rice_request());
    tokio::time::timeout(Duration::from_secs(2), h.controller.run_until_idle())
        .await
        .expect("controller settles after a crashed search");

    assert!(!h.controller.is_busy());
    assert_eq!(h.controller.take_notices(), vec![Notice::SearchFailed]);
    assert!(h.controller.stores().is_empty());
    assert!(matches!(h.controller.plan(), Err(WorkflowError::NoStores)));

    h.controller.discover(rice_request());
    h.controller.run_until_idle().await;

    assert_eq!(h.search.calls.load(Ordering::SeqCst), 2);
    assert_eq!(h.controller.stores().len(), 2);
    assert!(h.controller.plan().is_ok());
}

#[tokio::test(start_paused = true)]
async fn crashed_planner_leaves_a_failed_plan() {
    let mut h = Harness::new(
        FakeGeolocator::at(here()),
        FakeSearch::returning(two_stores()),
        FakePlanner::panicking(),
        FakePaths::default(),
    );
    h.controller.discover(rice_request());
    h.controller.run_until_idle().await;

    h.controller.plan().unwrap();
    tokio::time::timeout(Duration::from_secs(2), h.controller.run_until_idle())
        .await
        .expect("controller settles after a crashed planner");

    assert_eq!(h.controller.phase(), Phase::Planning);
    assert!(!h.controller.is_busy());
    assert_eq!(h.controller.routes().len(), 1);
    assert!(h.controller.routes()[0].is_sentinel());
    assert!(h.paths.requests.lock().unwrap().is_empty());
    assert!(matches!(
        h.controller.take_notices().as_slice(),
        [Notice::PlanningFailed(_)]
    ));
    assert!(h.controller.back());
}

#[tokio::test(start_paused = true)]
async fn double_submit_issues_one_planning_call() {
    let mut h = three_candidate_harness();
    h.controller.discover(rice_request());
    h.controller.run_until_idle().await;

    h.controller.plan().unwrap();
    assert!(matches!(h.controller.plan(), Err(WorkflowError::Busy(_))));
    h.controller.run_until_idle().await;

    assert_eq!(h.planner.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn path_requests_keep_candidate_stops() {
    let mut h = three_candidate_harness();
    h.controller.discover(rice_request());
    h.controller.run_until_idle().await;
    h.controller.plan().unwrap();
    h.controller.run_until_idle().await;

    let requests = h.paths.requests.lock().unwrap();
    assert_eq!(requests.len(), 3);
    for request in requests.iter() {
        assert_eq!(request.stops.len(), 1);
        assert!(request.optimize);
    }
}

#[tokio::test(start_paused = true)]
async fn rediscovery_from_planning_resets_the_session() {
    let mut h = three_candidate_harness();
    h.search.push(Duration::ZERO, Ok(two_stores()));
    h.controller.discover(rice_request());
    h.controller.run_until_idle().await;
    h.controller.plan().unwrap();
    h.controller.run_until_idle().await;

    h.controller.discover(rice_request());

    assert_eq!(h.controller.phase(), Phase::Discovery);
    assert_eq!(h.controller.overlay_count(OverlayCategory::RoutePaths), 0);
    h.controller.run_until_idle().await;
    assert_eq!(h.controller.overlay_count(OverlayCategory::StoreMarkers), 2);
    assert!(h.controller.routes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_in_flight_work() {
    let search = FakeSearch::default();
    search.push(Duration::from_secs(5), Ok(two_stores()));
    let mut h = Harness::new(
        FakeGeolocator::at(here()),
        search,
        FakePlanner::returning(Vec::new()),
        FakePaths::default(),
    );

    h.controller.discover(rice_request());
    h.controller.shutdown();
    h.controller.run_until_idle().await;
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert!(h.controller.map().history().is_empty());
    assert!(h.controller.stores().is_empty());
    assert!(h.controller.next_event().await.is_none());
}
