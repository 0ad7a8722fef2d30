use thiserror::Error;

use cartroute_core::RouteId;

use crate::overlay::{OverlayCategory, OverlayId};
use crate::phase::Phase;

/// The platform location service could not produce a fix.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("location service unsupported on this platform")]
    Unsupported,

    #[error("location unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeocodingError {
    #[error("no match for address \"{address}\"")]
    NoMatch { address: String },

    #[error("geocoding service failure: {0}")]
    ServiceFailure(String),
}

/// The nearby-store search call failed as a whole.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("store search failed: {message}")]
pub struct SearchError {
    pub message: String,
}

impl SearchError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The route-planning call failed as a whole. The controller turns this into
/// a sentinel candidate rather than aborting the phase transition.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("route planning failed: {message}")]
pub struct PlanningError {
    pub message: String,
}

impl PlanningError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A single candidate could not be resolved into a drawable path.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathResolutionError {
    #[error("route {route_id} has fewer than two waypoints")]
    NotDrawable { route_id: RouteId },

    #[error("directions service returned status {status}")]
    Status { status: String },

    #[error("directions service returned an empty path")]
    EmptyPath,

    #[error("directions request failed: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("overlay {kind} does not belong to category {category}")]
    CategoryMismatch {
        category: OverlayCategory,
        kind: String,
    },

    #[error("unknown overlay {0}")]
    UnknownOverlay(OverlayId),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapApiError {
    #[error("map API failed to load: {0}")]
    LoadFailed(String),
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Geocoding(#[from] GeocodingError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Planning(#[from] PlanningError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    MapApi(#[from] MapApiError),

    #[error("another {0} request is still in progress")]
    Busy(&'static str),

    #[error("no stores discovered yet")]
    NoStores,

    #[error("expected phase {expected}, workflow is in {actual}")]
    WrongPhase { expected: Phase, actual: Phase },
}
