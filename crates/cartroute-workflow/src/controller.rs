//! The workflow controller.
//!
//! Owns the map surface, the overlay registry and the request generation.
//! Network work runs on tasks held in a [`JoinSet`]; every state change
//! happens in [`WorkflowController::handle_event`] or an entry point, on the
//! caller's task. Responses tagged with an older generation are dropped
//! untouched. A task that panics is answered with a failure event for its
//! generation, so the busy guard always clears.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::task::{Id, JoinSet};

use cartroute_core::{GeoPosition, RouteCandidate, RouteId, SearchRequest, StoreId, StoreResult};

use crate::discovery::{self, DiscoveryResult};
use crate::error::{PathResolutionError, SearchError, WorkflowError};
use crate::map::{InfoContent, LayerHandle, MapEvent, MapSurface, PathStyle};
use crate::notice::Notice;
use crate::overlay::{OverlayCategory, OverlayRegistry, PendingOverlay};
use crate::phase::{Phase, PhaseMachine};
use crate::planning::{self, PlanningSession};
use crate::position::PositionProvider;
use crate::services::{GeolocationOptions, PathRequest, Services};
use crate::settings::WorkflowSettings;
use crate::sidebar::{SelectionState, Tab};

/// Results delivered by spawned tasks.
#[derive(Debug)]
pub enum WorkflowEvent {
    DiscoveryFinished(Result<DiscoveryResult, WorkflowError>),
    PlanningFinished(Vec<RouteCandidate>),
    PathResolved {
        route: RouteId,
        outcome: Result<Vec<GeoPosition>, PathResolutionError>,
    },
    ClickFeedbackExpired {
        route: RouteId,
        token: u64,
    },
}

impl WorkflowEvent {
    fn name(&self) -> &'static str {
        match self {
            WorkflowEvent::DiscoveryFinished(_) => "discovery_finished",
            WorkflowEvent::PlanningFinished(_) => "planning_finished",
            WorkflowEvent::PathResolved { .. } => "path_resolved",
            WorkflowEvent::ClickFeedbackExpired { .. } => "click_feedback_expired",
        }
    }
}

/// What a spawned task was doing.
#[derive(Debug, Clone, Copy)]
enum TaskOrigin {
    Discovery,
    Planning,
    Path(RouteId),
    ClickFeedback { route: RouteId, token: u64 },
}

impl TaskOrigin {
    /// The event standing in for a task that died before reporting.
    fn failed(self, reason: &str) -> WorkflowEvent {
        match self {
            TaskOrigin::Discovery => {
                WorkflowEvent::DiscoveryFinished(Err(SearchError::new(reason).into()))
            }
            TaskOrigin::Planning => {
                WorkflowEvent::PlanningFinished(vec![RouteCandidate::sentinel(reason)])
            }
            TaskOrigin::Path(route) => WorkflowEvent::PathResolved {
                route,
                outcome: Err(PathResolutionError::Transport(reason.to_string())),
            },
            TaskOrigin::ClickFeedback { route, token } => {
                WorkflowEvent::ClickFeedbackExpired { route, token }
            }
        }
    }
}

const TASK_FAILED: &str = "the request failed unexpectedly";

/// A [`WorkflowEvent`] with the generation that spawned it.
#[derive(Debug)]
pub struct TaggedEvent {
    pub generation: u64,
    pub event: WorkflowEvent,
}

pub struct WorkflowController<M: MapSurface> {
    map: M,
    services: Services,
    settings: WorkflowSettings,
    registry: OverlayRegistry,
    phase: PhaseMachine,
    selection: SelectionState,
    generation: u64,
    request: Option<SearchRequest>,
    discovered: Option<DiscoveryResult>,
    session: Option<PlanningSession>,
    notices: Vec<Notice>,
    tasks: JoinSet<TaggedEvent>,
    origins: HashMap<Id, (u64, TaskOrigin)>,
    feedback_tokens: u64,
}

impl<M: MapSurface> WorkflowController<M> {
    #[must_use]
    pub fn new(map: M, services: Services, settings: WorkflowSettings) -> Self {
        Self {
            map,
            services,
            settings,
            registry: OverlayRegistry::new(),
            phase: PhaseMachine::new(),
            selection: SelectionState::default(),
            generation: 0,
            request: None,
            discovered: None,
            session: None,
            notices: Vec::new(),
            tasks: JoinSet::new(),
            origins: HashMap::new(),
            feedback_tokens: 0,
        }
    }

    // ---- entry points -------------------------------------------------

    /// Starts a discovery run and returns its generation. Any run still in
    /// flight is superseded; re-entering from planning abandons the session.
    ///
    /// Must be called inside a tokio runtime. The result is applied only when
    /// the caller drives [`WorkflowController::next_event`] or
    /// [`WorkflowController::run_until_idle`].
    pub fn discover(&mut self, request: SearchRequest) -> u64 {
        self.generation += 1;
        let generation = self.generation;
        if self.phase.current() == Phase::Planning {
            self.leave_planning();
        }
        self.phase.start_discovery();
        tracing::info!(
            generation,
            query = %request.free_text_query,
            radius_m = request.radius_meters,
            "discovery started"
        );

        let provider = PositionProvider::new(
            Arc::clone(&self.services.geolocator),
            Arc::clone(&self.services.geocoder),
            GeolocationOptions::precise(self.settings.geolocation_timeout),
        );
        let search = Arc::clone(&self.services.search);
        self.request = Some(request.clone());
        self.spawn(TaskOrigin::Discovery, async move {
            WorkflowEvent::DiscoveryFinished(
                discovery::discover(&provider, search.as_ref(), &request).await,
            )
        });
        generation
    }

    /// Discovery → Planning. Requests route candidates for the discovered
    /// stores and returns the planning generation.
    ///
    /// # Errors
    ///
    /// - [`WorkflowError::Busy`] while discovery or planning is in flight.
    /// - [`WorkflowError::WrongPhase`] when already planning.
    /// - [`WorkflowError::NoStores`] before any store has been discovered.
    pub fn plan(&mut self) -> Result<u64, WorkflowError> {
        let discovered = self.discovered.as_ref().filter(|d| !d.stores.is_empty());
        self.phase
            .begin_planning(discovered.map_or(0, |d| d.stores.len()))?;
        let Some(discovered) = discovered else {
            return Err(WorkflowError::NoStores);
        };
        let stores = discovered.stores.clone();
        let position = discovered.position;

        self.generation += 1;
        let generation = self.generation;
        self.session = Some(PlanningSession::new());
        self.selection.selected_route = None;
        self.registry
            .replace(&mut self.map, OverlayCategory::RoutePaths, Vec::new())?;
        tracing::info!(generation, store_count = stores.len(), "planning started");

        let planner = Arc::clone(&self.services.planner);
        self.spawn(TaskOrigin::Planning, async move {
            WorkflowEvent::PlanningFinished(
                planning::request_candidates(planner.as_ref(), &stores, position).await,
            )
        });
        Ok(generation)
    }

    /// Planning → Discovery. Returns `false` if already in discovery.
    pub fn back(&mut self) -> bool {
        if self.phase.current() != Phase::Planning {
            tracing::debug!("back ignored outside planning");
            return false;
        }
        self.generation += 1;
        self.leave_planning();
        tracing::info!(generation = self.generation, "returned to discovery");
        true
    }

    /// Applies a pointer message delivered by the map surface.
    pub fn handle_map_event(&mut self, event: MapEvent) {
        match event {
            MapEvent::StoreClicked(store) => self.store_clicked(&store),
            MapEvent::RouteClicked(route) => self.route_clicked(route),
            MapEvent::RouteHoverStarted(route) => {
                let Some(session) = self.session.as_mut() else {
                    return;
                };
                let previous = session.hover_started(route);
                if let Some(previous) = previous {
                    self.restyle(previous);
                }
                self.restyle(route);
            }
            MapEvent::RouteHoverEnded(route) => {
                let ended = self
                    .session
                    .as_mut()
                    .is_some_and(|session| session.hover_ended(route));
                if ended {
                    self.restyle(route);
                }
            }
            MapEvent::ViewportChanged { center, zoom } => {
                tracing::trace!(%center, zoom, "viewport changed");
            }
        }
    }

    /// Switches the side panel tab. Returns `false` if the tab is not
    /// available in the current phase.
    pub fn select_tab(&mut self, tab: Tab) -> bool {
        self.selection.select_tab(tab, self.phase.current())
    }

    pub fn toggle_sidebar(&mut self) {
        self.selection.toggle_collapsed();
    }

    /// Cancels every in-flight task and removes every overlay. Idempotent.
    pub fn shutdown(&mut self) {
        self.generation += 1;
        self.tasks.abort_all();
        self.tasks.detach_all();
        self.origins.clear();

        self.phase = PhaseMachine::new();
        self.session = None;
        self.selection = SelectionState::default();
        let removed = self.registry.teardown_all(&mut self.map);
        tracing::info!(generation = self.generation, removed, "workflow shut down");
    }

    // ---- event loop ---------------------------------------------------

    /// Waits for the next task result. `None` once nothing is in flight.
    ///
    /// A task that panicked yields the failure event for what it was doing.
    pub async fn next_event(&mut self) -> Option<TaggedEvent> {
        loop {
            match self.tasks.join_next_with_id().await? {
                Ok((id, tagged)) => {
                    self.origins.remove(&id);
                    return Some(tagged);
                }
                Err(err) => {
                    let Some((generation, origin)) = self.origins.remove(&err.id()) else {
                        continue;
                    };
                    if err.is_cancelled() {
                        continue;
                    }
                    tracing::error!(generation, ?origin, error = %err, "workflow task died without reporting");
                    return Some(TaggedEvent {
                        generation,
                        event: origin.failed(TASK_FAILED),
                    });
                }
            }
        }
    }

    /// Applies a task result. Returns `false` if it was stale and dropped.
    pub fn handle_event(&mut self, tagged: TaggedEvent) -> bool {
        if tagged.generation != self.generation {
            tracing::debug!(
                event = tagged.event.name(),
                event_generation = tagged.generation,
                generation = self.generation,
                "dropping stale response"
            );
            return false;
        }
        match tagged.event {
            WorkflowEvent::DiscoveryFinished(outcome) => self.apply_discovery(outcome),
            WorkflowEvent::PlanningFinished(candidates) => self.apply_candidates(candidates),
            WorkflowEvent::PathResolved { route, outcome } => self.apply_path(route, outcome),
            WorkflowEvent::ClickFeedbackExpired { route, token } => {
                let expired = self
                    .session
                    .as_mut()
                    .is_some_and(|session| session.end_click_feedback(route, token));
                if expired {
                    self.restyle(route);
                }
            }
        }
        true
    }

    /// Drives task results until nothing is left in flight.
    pub async fn run_until_idle(&mut self) {
        while let Some(tagged) = self.next_event().await {
            self.handle_event(tagged);
        }
    }

    // ---- read-only surface -------------------------------------------

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase.current()
    }

    #[must_use]
    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    #[must_use]
    pub fn request(&self) -> Option<&SearchRequest> {
        self.request.as_ref()
    }

    #[must_use]
    pub fn position(&self) -> Option<GeoPosition> {
        self.discovered.as_ref().map(|d| d.position)
    }

    #[must_use]
    pub fn stores(&self) -> &[StoreResult] {
        self.discovered
            .as_ref()
            .map(|d| d.stores.as_slice())
            .unwrap_or_default()
    }

    /// Candidates of the current planning session, including ones that
    /// never got a drawn path.
    #[must_use]
    pub fn routes(&self) -> &[RouteCandidate] {
        self.session
            .as_ref()
            .map(PlanningSession::candidates)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.phase.is_busy()
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn overlay_count(&self, category: OverlayCategory) -> usize {
        self.registry.count(category)
    }

    /// The style `route` is (or would be) drawn with right now.
    #[must_use]
    pub fn route_style(&self, route: RouteId) -> Option<PathStyle> {
        self.session
            .as_ref()?
            .style(route, self.selection.selected_route)
    }

    #[must_use]
    pub fn route_layer(&self, route: RouteId) -> Option<LayerHandle> {
        self.registry.route_layer(route)
    }

    #[must_use]
    pub fn store_layer(&self, store: &StoreId) -> Option<LayerHandle> {
        self.registry.store_layer(store)
    }

    /// Notices raised since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    #[must_use]
    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    // ---- internals ----------------------------------------------------

    fn spawn<F>(&mut self, origin: TaskOrigin, task: F)
    where
        F: Future<Output = WorkflowEvent> + Send + 'static,
    {
        let generation = self.generation;
        let handle = self.tasks.spawn(async move {
            TaggedEvent {
                generation,
                event: task.await,
            }
        });
        self.origins.insert(handle.id(), (generation, origin));
    }

    fn leave_planning(&mut self) {
        self.phase.back();
        self.session = None;
        let removed = self
            .registry
            .detach_category(&mut self.map, OverlayCategory::RoutePaths);
        self.selection.clear_for_discovery();
        tracing::debug!(removed, "planning session discarded");
    }

    fn apply_discovery(&mut self, outcome: Result<DiscoveryResult, WorkflowError>) {
        self.phase.finish();
        match outcome {
            Ok(result) => {
                let radius = self.request.as_ref().map_or(0.0, |r| r.radius_meters);
                if let Err(e) = discovery::render(
                    &mut self.registry,
                    &mut self.map,
                    &result,
                    radius,
                    self.settings.default_zoom,
                ) {
                    tracing::error!(error = %e, "failed to draw discovery result");
                }
                if result.stores.is_empty() {
                    tracing::info!(generation = self.generation, "no stores found");
                    self.notices.push(Notice::NoStoresFound);
                }
                self.selection.selected_store = None;
                self.discovered = Some(result);
            }
            Err(err) => {
                tracing::warn!(generation = self.generation, error = %err, "discovery aborted");
                if let Some(notice) = Notice::for_error(&err) {
                    self.notices.push(notice);
                }
            }
        }
    }

    fn apply_candidates(&mut self, candidates: Vec<RouteCandidate>) {
        self.phase.finish();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.set_candidates(candidates);

        let mut requests = Vec::new();
        for candidate in session.candidates() {
            if let Some(message) = &candidate.error_message {
                tracing::warn!(route_id = %candidate.id, %message, "candidate carries a planning error");
                self.notices.push(Notice::PlanningFailed(message.clone()));
                continue;
            }
            match PathRequest::for_candidate(candidate, self.settings.optimize_waypoints) {
                Ok(request) => requests.push((candidate.id, request)),
                Err(e) => tracing::warn!(route_id = %candidate.id, error = %e, "candidate cannot be drawn"),
            }
        }
        tracing::info!(
            generation = self.generation,
            candidate_count = session.candidates().len(),
            drawable = requests.len(),
            "route candidates received"
        );

        for (route, request) in requests {
            let resolver = Arc::clone(&self.services.paths);
            self.spawn(TaskOrigin::Path(route), async move {
                WorkflowEvent::PathResolved {
                    route,
                    outcome: planning::resolve_path(resolver.as_ref(), request).await,
                }
            });
        }
    }

    fn apply_path(
        &mut self,
        route: RouteId,
        outcome: Result<Vec<GeoPosition>, PathResolutionError>,
    ) {
        let path = match outcome {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(route_id = %route, error = %e, "path resolution failed, route listed without a path");
                return;
            }
        };
        let Some(style) = self.route_style(route) else {
            tracing::debug!(route_id = %route, "path for unknown route dropped");
            return;
        };
        match self.registry.attach_route_path(
            &mut self.map,
            PendingOverlay::route_path(route, path, style),
        ) {
            Ok(_) => tracing::info!(route_id = %route, color = style.color, "route path drawn"),
            Err(e) => tracing::error!(route_id = %route, error = %e, "failed to draw route path"),
        }
    }

    fn store_clicked(&mut self, store: &StoreId) {
        let Some(info) = self
            .stores()
            .iter()
            .find(|s| &s.id == store)
            .map(InfoContent::for_store)
        else {
            tracing::debug!(store_id = %store, "click on unknown store ignored");
            return;
        };
        self.selection.store_clicked(store.clone(), self.phase.current());
        if let Some(layer) = self.registry.store_layer(store) {
            self.map.open_info(layer, &info);
        }
    }

    fn route_clicked(&mut self, route: RouteId) {
        if self.phase.current() != Phase::Planning {
            return;
        }
        let previous = self.selection.selected_route;
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if !session.contains(route) {
            return;
        }
        self.feedback_tokens += 1;
        let token = self.feedback_tokens;
        let lost_feedback = session.start_click_feedback(route, token);
        self.selection.route_clicked(route);
        tracing::info!(route_id = %route, "route selected");

        for other in [previous, lost_feedback].into_iter().flatten() {
            if other != route {
                self.restyle(other);
            }
        }
        self.restyle(route);

        let delay = self.settings.click_feedback;
        self.spawn(TaskOrigin::ClickFeedback { route, token }, async move {
            tokio::time::sleep(delay).await;
            WorkflowEvent::ClickFeedbackExpired { route, token }
        });
    }

    fn restyle(&mut self, route: RouteId) {
        let Some(style) = self.route_style(route) else {
            return;
        };
        if let Some(layer) = self.registry.route_layer(route) {
            self.map.restyle_polyline(layer, &style);
        }
    }
}

impl<M: MapSurface> Drop for WorkflowController<M> {
    fn drop(&mut self) {
        self.tasks.abort_all();
        self.registry.teardown_all(&mut self.map);
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
