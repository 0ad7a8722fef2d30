//! In-memory collaborators for driving a `WorkflowController` end to end.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use cartroute_core::{GeoPosition, RouteCandidate, RouteId, SearchRequest, StoreId, StoreResult, Waypoint};
use cartroute_workflow::{
    GeocodingError, Geocoder, GeolocationOptions, Geolocator, HeadlessMap, LocationError,
    PathRequest, PathResolutionError, PathResolver, PlanningError, RoutePlanner, SearchError,
    Services, StoreSearch, WorkflowController, WorkflowSettings,
};

pub fn here() -> GeoPosition {
    GeoPosition::new(10.76, 106.70)
}

pub fn store(id: &str, lat: f64, lng: f64) -> StoreResult {
    StoreResult {
        id: StoreId::from(id),
        name: format!("Store {id}"),
        address: format!("{id} Nguyen Hue"),
        position: GeoPosition::new(lat, lng),
        items: Vec::new(),
    }
}

pub fn two_stores() -> Vec<StoreResult> {
    vec![store("s1", 10.7701, 106.7012), store("s2", 10.7755, 106.6990)]
}

/// A candidate whose destination address is `dest-{id}`.
pub fn candidate(id: u32) -> RouteCandidate {
    RouteCandidate {
        id: RouteId(id),
        ordered_waypoints: vec![
            Waypoint::Position(here()),
            Waypoint::Address(format!("stop-{id}")),
            Waypoint::Address(format!("dest-{id}")),
        ],
        stop_labels: vec![format!("stop-{id}"), format!("dest-{id}")],
        distance_km: 2.0 + f64::from(id),
        duration_minutes: 5 + id,
        cost: 60_000.0,
        error_message: None,
    }
}

pub fn drawn_path() -> Vec<GeoPosition> {
    vec![here(), GeoPosition::new(10.77, 106.70), GeoPosition::new(10.775, 106.699)]
}

pub struct FakeGeolocator {
    pub result: Mutex<Result<GeoPosition, LocationError>>,
    pub calls: AtomicU32,
}

impl FakeGeolocator {
    pub fn at(position: GeoPosition) -> Self {
        Self {
            result: Mutex::new(Ok(position)),
            calls: AtomicU32::new(0),
        }
    }

    pub fn failing(err: LocationError) -> Self {
        Self {
            result: Mutex::new(Err(err)),
            calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl Geolocator for FakeGeolocator {
    async fn current_position(
        &self,
        _options: GeolocationOptions,
    ) -> Result<GeoPosition, LocationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.lock().unwrap().clone()
    }
}

#[derive(Default)]
pub struct FakeGeocoder {
    pub known: HashMap<String, GeoPosition>,
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeoPosition, GeocodingError> {
        self.known
            .get(address)
            .copied()
            .ok_or_else(|| GeocodingError::NoMatch {
                address: address.to_string(),
            })
    }
}

/// Answers searches from a queue, each after its own delay.
#[derive(Default)]
pub struct FakeSearch {
    pub responses: Mutex<VecDeque<(Duration, Result<Vec<StoreResult>, SearchError>)>>,
    pub calls: AtomicU32,
    pub seen_positions: Mutex<Vec<GeoPosition>>,
    pub panics_left: AtomicU32,
}

impl FakeSearch {
    pub fn returning(stores: Vec<StoreResult>) -> Self {
        let search = Self::default();
        search.push(Duration::ZERO, Ok(stores));
        search
    }

    /// Panics on the next `times` calls, then answers from the queue.
    pub fn panicking(times: u32) -> Self {
        let search = Self::default();
        search.panics_left.store(times, Ordering::SeqCst);
        search
    }

    pub fn push(&self, delay: Duration, result: Result<Vec<StoreResult>, SearchError>) {
        self.responses.lock().unwrap().push_back((delay, result));
    }
}

#[async_trait]
impl StoreSearch for FakeSearch {
    async fn nearby(
        &self,
        _request: &SearchRequest,
        position: GeoPosition,
    ) -> Result<Vec<StoreResult>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let panics = self.panics_left.load(Ordering::SeqCst);
        if panics > 0 {
            self.panics_left.store(panics - 1, Ordering::SeqCst);
            panic!("search backend crashed");
        }
        self.seen_positions.lock().unwrap().push(position);
        let next = self.responses.lock().unwrap().pop_front();
        let (delay, result) = next.unwrap_or((Duration::ZERO, Ok(Vec::new())));
        tokio::time::sleep(delay).await;
        result
    }
}

pub struct FakePlanner {
    pub result: Mutex<Result<Vec<RouteCandidate>, PlanningError>>,
    pub delay: Duration,
    pub calls: AtomicU32,
    pub panics: AtomicBool,
}

impl FakePlanner {
    pub fn returning(candidates: Vec<RouteCandidate>) -> Self {
        Self {
            result: Mutex::new(Ok(candidates)),
            delay: Duration::from_millis(20),
            calls: AtomicU32::new(0),
            panics: AtomicBool::new(false),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Mutex::new(Err(PlanningError::new(message))),
            delay: Duration::from_millis(20),
            calls: AtomicU32::new(0),
            panics: AtomicBool::new(false),
        }
    }

    pub fn panicking() -> Self {
        let planner = Self::returning(Vec::new());
        planner.panics.store(true, Ordering::SeqCst);
        planner
    }
}

#[async_trait]
impl RoutePlanner for FakePlanner {
    async fn plan(
        &self,
        _stores: &[StoreResult],
        _position: GeoPosition,
    ) -> Result<Vec<RouteCandidate>, PlanningError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        if self.panics.load(Ordering::SeqCst) {
            panic!("planner crashed");
        }
        self.result.lock().unwrap().clone()
    }
}

/// Resolves paths keyed by destination, each after its own delay, and
/// records the order in which answers were given.
#[derive(Default)]
pub struct FakePaths {
    pub answers: HashMap<String, (Duration, Result<Vec<GeoPosition>, PathResolutionError>)>,
    pub requests: Mutex<Vec<PathRequest>>,
    pub answered: Mutex<Vec<String>>,
}

impl FakePaths {
    pub fn answer(
        mut self,
        destination: &str,
        delay_ms: u64,
        result: Result<Vec<GeoPosition>, PathResolutionError>,
    ) -> Self {
        self.answers.insert(
            destination.to_string(),
            (Duration::from_millis(delay_ms), result),
        );
        self
    }
}

#[async_trait]
impl PathResolver for FakePaths {
    async fn resolve(&self, request: &PathRequest) -> Result<Vec<GeoPosition>, PathResolutionError> {
        self.requests.lock().unwrap().push(request.clone());
        let destination = request.destination.to_string();
        let (delay, result) = self.answers.get(&destination).cloned().unwrap_or((
            Duration::ZERO,
            Err(PathResolutionError::Status {
                status: "NOT_FOUND".to_string(),
            }),
        ));
        tokio::time::sleep(delay).await;
        self.answered.lock().unwrap().push(destination);
        result
    }
}

pub struct Harness {
    pub geolocator: Arc<FakeGeolocator>,
    pub search: Arc<FakeSearch>,
    pub planner: Arc<FakePlanner>,
    pub paths: Arc<FakePaths>,
    pub controller: WorkflowController<HeadlessMap>,
}

impl Harness {
    pub fn new(
        geolocator: FakeGeolocator,
        search: FakeSearch,
        planner: FakePlanner,
        paths: FakePaths,
    ) -> Self {
        Self::with_geocoder(geolocator, FakeGeocoder::default(), search, planner, paths)
    }

    pub fn with_geocoder(
        geolocator: FakeGeolocator,
        geocoder: FakeGeocoder,
        search: FakeSearch,
        planner: FakePlanner,
        paths: FakePaths,
    ) -> Self {
        let geolocator = Arc::new(geolocator);
        let search = Arc::new(search);
        let planner = Arc::new(planner);
        let paths = Arc::new(paths);
        let services = Services {
            geolocator: geolocator.clone(),
            geocoder: Arc::new(geocoder),
            search: search.clone(),
            planner: planner.clone(),
            paths: paths.clone(),
        };
        let controller =
            WorkflowController::new(HeadlessMap::new(), services, WorkflowSettings::default());
        Self {
            geolocator,
            search,
            planner,
            paths,
            controller,
        }
    }
}
