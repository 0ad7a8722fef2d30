//! Seams for the external collaborators the workflow consumes.
//!
//! Every remote call goes through one of these traits so the controller can
//! be driven by real HTTP clients or by in-memory fakes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use cartroute_core::{GeoPosition, RouteCandidate, SearchRequest, StoreResult, Waypoint};

use crate::error::{GeocodingError, LocationError, PathResolutionError, PlanningError, SearchError};

/// Options passed to the platform location service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeolocationOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix the platform may return. Zero disables the cache.
    pub maximum_age: Duration,
}

impl GeolocationOptions {
    /// High accuracy, no cached fixes, the given timeout.
    #[must_use]
    pub fn precise(timeout: Duration) -> Self {
        Self {
            high_accuracy: true,
            timeout,
            maximum_age: Duration::ZERO,
        }
    }
}

#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn current_position(
        &self,
        options: GeolocationOptions,
    ) -> Result<GeoPosition, LocationError>;
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<GeoPosition, GeocodingError>;
}

#[async_trait]
pub trait StoreSearch: Send + Sync {
    /// Stores within the request's radius of `position` carrying matching items.
    async fn nearby(
        &self,
        request: &SearchRequest,
        position: GeoPosition,
    ) -> Result<Vec<StoreResult>, SearchError>;
}

#[async_trait]
pub trait RoutePlanner: Send + Sync {
    /// Route candidates visiting `stores` from `position`, in the planner's order.
    async fn plan(
        &self,
        stores: &[StoreResult],
        position: GeoPosition,
    ) -> Result<Vec<RouteCandidate>, PlanningError>;
}

#[async_trait]
pub trait PathResolver: Send + Sync {
    async fn resolve(&self, request: &PathRequest) -> Result<Vec<GeoPosition>, PathResolutionError>;
}

/// A directions lookup for one route candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct PathRequest {
    pub origin: Waypoint,
    pub destination: Waypoint,
    /// Interior stops in the candidate's visiting order.
    pub stops: Vec<Waypoint>,
    /// Whether the directions service may reorder `stops`.
    pub optimize: bool,
}

impl PathRequest {
    /// Splits the candidate's waypoints into origin, stops and destination.
    ///
    /// # Errors
    ///
    /// Returns [`PathResolutionError::NotDrawable`] when the candidate has
    /// fewer than two waypoints.
    pub fn for_candidate(
        candidate: &RouteCandidate,
        optimize: bool,
    ) -> Result<Self, PathResolutionError> {
        let (origin, destination, stops) =
            candidate
                .endpoints()
                .ok_or(PathResolutionError::NotDrawable {
                    route_id: candidate.id,
                })?;
        Ok(Self {
            origin: origin.clone(),
            destination: destination.clone(),
            stops: stops.to_vec(),
            optimize,
        })
    }
}

/// The full set of collaborators a workflow run needs.
#[derive(Clone)]
pub struct Services {
    pub geolocator: Arc<dyn Geolocator>,
    pub geocoder: Arc<dyn Geocoder>,
    pub search: Arc<dyn StoreSearch>,
    pub planner: Arc<dyn RoutePlanner>,
    pub paths: Arc<dyn PathResolver>,
}
