//! In-memory [`MapSurface`] that keeps every live layer and subscription.
//!
//! Used by the CLI for headless runs and by tests to observe exactly what the
//! workflow drew. Pointer interactions are simulated with
//! [`HeadlessMap::pointer`], which returns the message a real map would
//! deliver.

use std::collections::BTreeMap;

use cartroute_core::GeoPosition;

use crate::map::{
    CircleSpec, InfoContent, LayerHandle, ListenerHandle, MapEvent, MapSurface, MarkerSpec,
    PathStyle, PointerKind, PolylineSpec,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Marker(MarkerSpec),
    Circle(CircleSpec),
    Polyline(PolylineSpec),
}

/// One call made against the surface, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapCall {
    SetView,
    Add(LayerHandle),
    Remove(LayerHandle),
    Restyle(LayerHandle),
    Subscribe(ListenerHandle),
    Unsubscribe(ListenerHandle),
    OpenInfo(LayerHandle),
}

#[derive(Debug, Clone)]
struct Listener {
    layer: LayerHandle,
    kind: PointerKind,
    event: MapEvent,
}

#[derive(Debug, Default)]
pub struct HeadlessMap {
    next_id: u64,
    layers: BTreeMap<LayerHandle, Layer>,
    listeners: BTreeMap<ListenerHandle, Listener>,
    view: Option<(GeoPosition, u8)>,
    info: Option<(LayerHandle, InfoContent)>,
    history: Vec<MapCall>,
}

impl HeadlessMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn add(&mut self, layer: Layer) -> LayerHandle {
        let handle = LayerHandle(self.next_id());
        self.layers.insert(handle, layer);
        self.history.push(MapCall::Add(handle));
        handle
    }

    #[must_use]
    pub fn layer(&self, handle: LayerHandle) -> Option<&Layer> {
        self.layers.get(&handle)
    }

    pub fn layers(&self) -> impl Iterator<Item = (LayerHandle, &Layer)> {
        self.layers.iter().map(|(handle, layer)| (*handle, layer))
    }

    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn markers(&self) -> impl Iterator<Item = &MarkerSpec> {
        self.layers.values().filter_map(|layer| match layer {
            Layer::Marker(spec) => Some(spec),
            _ => None,
        })
    }

    pub fn circles(&self) -> impl Iterator<Item = &CircleSpec> {
        self.layers.values().filter_map(|layer| match layer {
            Layer::Circle(spec) => Some(spec),
            _ => None,
        })
    }

    pub fn polylines(&self) -> impl Iterator<Item = &PolylineSpec> {
        self.layers.values().filter_map(|layer| match layer {
            Layer::Polyline(spec) => Some(spec),
            _ => None,
        })
    }

    /// Current style of a drawn polyline.
    #[must_use]
    pub fn polyline_style(&self, handle: LayerHandle) -> Option<PathStyle> {
        match self.layers.get(&handle) {
            Some(Layer::Polyline(spec)) => Some(spec.style),
            _ => None,
        }
    }

    #[must_use]
    pub fn view(&self) -> Option<(GeoPosition, u8)> {
        self.view
    }

    /// The most recently opened info popup.
    #[must_use]
    pub fn info(&self) -> Option<&(LayerHandle, InfoContent)> {
        self.info.as_ref()
    }

    #[must_use]
    pub fn history(&self) -> &[MapCall] {
        &self.history
    }

    /// Simulates a pointer interaction, returning the message subscribed for
    /// it, if any.
    #[must_use]
    pub fn pointer(&self, layer: LayerHandle, kind: PointerKind) -> Option<MapEvent> {
        self.listeners
            .values()
            .find(|listener| listener.layer == layer && listener.kind == kind)
            .map(|listener| listener.event.clone())
    }
}

impl MapSurface for HeadlessMap {
    fn set_view(&mut self, center: GeoPosition, zoom: u8) {
        tracing::debug!(%center, zoom, "map view set");
        self.view = Some((center, zoom));
        self.history.push(MapCall::SetView);
    }

    fn add_marker(&mut self, spec: &MarkerSpec) -> LayerHandle {
        let handle = self.add(Layer::Marker(spec.clone()));
        tracing::debug!(%handle, title = %spec.title, position = %spec.position, "marker added");
        handle
    }

    fn add_circle(&mut self, spec: &CircleSpec) -> LayerHandle {
        let handle = self.add(Layer::Circle(spec.clone()));
        tracing::debug!(%handle, radius_m = spec.radius_meters, "circle added");
        handle
    }

    fn add_polyline(&mut self, spec: &PolylineSpec) -> LayerHandle {
        let handle = self.add(Layer::Polyline(spec.clone()));
        tracing::debug!(
            %handle,
            points = spec.path.len(),
            color = spec.style.color,
            "polyline added"
        );
        handle
    }

    fn restyle_polyline(&mut self, layer: LayerHandle, style: &PathStyle) {
        match self.layers.get_mut(&layer) {
            Some(Layer::Polyline(spec)) => {
                spec.style = *style;
                self.history.push(MapCall::Restyle(layer));
            }
            _ => tracing::debug!(handle = %layer, "restyle ignored for unknown polyline"),
        }
    }

    fn remove_layer(&mut self, layer: LayerHandle) {
        if self.layers.remove(&layer).is_some() {
            self.history.push(MapCall::Remove(layer));
        } else {
            tracing::debug!(handle = %layer, "remove ignored for unknown layer");
        }
        if self.info.as_ref().is_some_and(|(handle, _)| *handle == layer) {
            self.info = None;
        }
    }

    fn subscribe(
        &mut self,
        layer: LayerHandle,
        kind: PointerKind,
        event: MapEvent,
    ) -> ListenerHandle {
        let handle = ListenerHandle(self.next_id());
        self.listeners.insert(handle, Listener { layer, kind, event });
        self.history.push(MapCall::Subscribe(handle));
        handle
    }

    fn unsubscribe(&mut self, listener: ListenerHandle) {
        if self.listeners.remove(&listener).is_some() {
            self.history.push(MapCall::Unsubscribe(listener));
        }
    }

    fn open_info(&mut self, layer: LayerHandle, content: &InfoContent) {
        tracing::debug!(handle = %layer, title = %content.title, "info popup opened");
        self.info = Some((layer, content.clone()));
        self.history.push(MapCall::OpenInfo(layer));
    }
}
