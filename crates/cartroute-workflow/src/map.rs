//! The map rendering surface and the overlay specs drawn on it.
//!
//! A [`MapSurface`] is a thin, synchronous wrapper over whatever actually
//! draws layers. Pointer subscriptions carry a pre-built [`MapEvent`]; the
//! surface hands that message back to the controller when the pointer
//! interaction happens, so no handler holds on to workflow state.

use std::fmt;

use cartroute_core::{GeoPosition, RouteId, StoreId, StoreResult};

/// Opaque reference to one drawn layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerHandle(pub u64);

impl fmt::Display for LayerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

/// Opaque reference to one pointer subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Click,
    Enter,
    Leave,
}

/// Messages the map surface delivers back to the workflow controller.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    StoreClicked(StoreId),
    RouteClicked(RouteId),
    RouteHoverStarted(RouteId),
    RouteHoverEnded(RouteId),
    /// Pan/zoom/resize. Never causes overlays to be replaced.
    ViewportChanged { center: GeoPosition, zoom: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinColor {
    Red,
    Green,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub position: GeoPosition,
    pub title: String,
    pub pin: PinColor,
}

impl MarkerSpec {
    #[must_use]
    pub fn user(position: GeoPosition) -> Self {
        Self {
            position,
            title: "Your location".to_string(),
            pin: PinColor::Red,
        }
    }

    #[must_use]
    pub fn store(store: &StoreResult) -> Self {
        Self {
            position: store.position,
            title: store.name.clone(),
            pin: PinColor::Green,
        }
    }
}

pub const RADIUS_COLOR: &str = "#4285F4";

#[derive(Debug, Clone, PartialEq)]
pub struct CircleSpec {
    pub center: GeoPosition,
    pub radius_meters: f64,
    pub stroke_color: &'static str,
    pub stroke_opacity: f64,
    pub stroke_weight: u32,
    pub fill_color: &'static str,
    pub fill_opacity: f64,
}

impl CircleSpec {
    /// The translucent search-radius circle around the user.
    #[must_use]
    pub fn search_radius(center: GeoPosition, radius_meters: f64) -> Self {
        Self {
            center,
            radius_meters,
            stroke_color: RADIUS_COLOR,
            stroke_opacity: 0.8,
            stroke_weight: 2,
            fill_color: RADIUS_COLOR,
            fill_opacity: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathStyle {
    pub color: &'static str,
    pub weight: u32,
    pub opacity: f64,
    pub z_index: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolylineSpec {
    pub path: Vec<GeoPosition>,
    pub style: PathStyle,
}

/// Popup content shown when a store marker is clicked.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoContent {
    pub title: String,
    pub address: String,
    pub products: Vec<String>,
}

impl InfoContent {
    #[must_use]
    pub fn for_store(store: &StoreResult) -> Self {
        Self {
            title: store.name.clone(),
            address: store.address.clone(),
            products: store
                .available_products()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Drawing primitives the workflow needs from a map.
pub trait MapSurface {
    fn set_view(&mut self, center: GeoPosition, zoom: u8);

    fn add_marker(&mut self, spec: &MarkerSpec) -> LayerHandle;

    fn add_circle(&mut self, spec: &CircleSpec) -> LayerHandle;

    fn add_polyline(&mut self, spec: &PolylineSpec) -> LayerHandle;

    fn restyle_polyline(&mut self, layer: LayerHandle, style: &PathStyle);

    fn remove_layer(&mut self, layer: LayerHandle);

    /// Delivers `event` whenever `kind` happens on `layer`.
    fn subscribe(&mut self, layer: LayerHandle, kind: PointerKind, event: MapEvent)
        -> ListenerHandle;

    fn unsubscribe(&mut self, listener: ListenerHandle);

    fn open_info(&mut self, layer: LayerHandle, content: &InfoContent);
}
