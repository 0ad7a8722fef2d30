//! Two-phase search-and-route workflow.
//!
//! A [`WorkflowController`] resolves the user's position, discovers nearby
//! stores, then plans alternative multi-stop routes across them, keeping the
//! map overlays and the side panel selection consistent throughout.

pub mod controller;
pub mod discovery;
pub mod error;
pub mod headless;
pub mod map;
pub mod map_api;
pub mod notice;
pub mod overlay;
pub mod phase;
pub mod planning;
pub mod position;
pub mod services;
pub mod settings;
pub mod sidebar;

pub use controller::{TaggedEvent, WorkflowController, WorkflowEvent};
pub use discovery::DiscoveryResult;
pub use error::{
    GeocodingError, LocationError, MapApiError, PathResolutionError, PlanningError,
    RegistryError, SearchError, WorkflowError,
};
pub use headless::HeadlessMap;
pub use map::{MapEvent, MapSurface, PathStyle, PointerKind};
pub use map_api::MapApiGate;
pub use notice::Notice;
pub use overlay::{OverlayCategory, OverlayRegistry};
pub use phase::Phase;
pub use position::PositionProvider;
pub use services::{
    Geocoder, GeolocationOptions, Geolocator, PathRequest, PathResolver, RoutePlanner, Services,
    StoreSearch,
};
pub use settings::WorkflowSettings;
pub use sidebar::{SelectionState, Tab};
