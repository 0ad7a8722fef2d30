//! Arena of every overlay the workflow has drawn.
//!
//! Overlays are grouped into four categories. Replacing a category detaches
//! every existing overlay in it, listeners first, before any new overlay is
//! attached.

use std::collections::BTreeMap;
use std::fmt;

use cartroute_core::{GeoPosition, RouteId, StoreId, StoreResult};

use crate::error::RegistryError;
use crate::map::{
    CircleSpec, LayerHandle, ListenerHandle, MapEvent, MapSurface, MarkerSpec, PathStyle,
    PointerKind, PolylineSpec,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OverlayId(u64);

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "overlay#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayCategory {
    UserMarker,
    RadiusCircle,
    StoreMarkers,
    RoutePaths,
}

impl OverlayCategory {
    pub const ALL: [OverlayCategory; 4] = [
        OverlayCategory::UserMarker,
        OverlayCategory::RadiusCircle,
        OverlayCategory::StoreMarkers,
        OverlayCategory::RoutePaths,
    ];
}

impl fmt::Display for OverlayCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OverlayCategory::UserMarker => "user_marker",
            OverlayCategory::RadiusCircle => "radius_circle",
            OverlayCategory::StoreMarkers => "store_markers",
            OverlayCategory::RoutePaths => "route_paths",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayKind {
    UserMarker,
    RadiusCircle,
    StoreMarker(StoreId),
    RoutePath(RouteId),
}

impl OverlayKind {
    #[must_use]
    pub fn category(&self) -> OverlayCategory {
        match self {
            OverlayKind::UserMarker => OverlayCategory::UserMarker,
            OverlayKind::RadiusCircle => OverlayCategory::RadiusCircle,
            OverlayKind::StoreMarker(_) => OverlayCategory::StoreMarkers,
            OverlayKind::RoutePath(_) => OverlayCategory::RoutePaths,
        }
    }
}

impl fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayKind::UserMarker => f.write_str("user marker"),
            OverlayKind::RadiusCircle => f.write_str("radius circle"),
            OverlayKind::StoreMarker(id) => write!(f, "store marker {id}"),
            OverlayKind::RoutePath(id) => write!(f, "route path {id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum OverlaySpec {
    Marker(MarkerSpec),
    Circle(CircleSpec),
    Polyline(PolylineSpec),
}

/// An overlay waiting to be attached, with the pointer messages it should emit.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingOverlay {
    kind: OverlayKind,
    spec: OverlaySpec,
    subscriptions: Vec<(PointerKind, MapEvent)>,
}

impl PendingOverlay {
    #[must_use]
    pub fn user_marker(position: GeoPosition) -> Self {
        Self {
            kind: OverlayKind::UserMarker,
            spec: OverlaySpec::Marker(MarkerSpec::user(position)),
            subscriptions: Vec::new(),
        }
    }

    #[must_use]
    pub fn radius_circle(center: GeoPosition, radius_meters: f64) -> Self {
        Self {
            kind: OverlayKind::RadiusCircle,
            spec: OverlaySpec::Circle(CircleSpec::search_radius(center, radius_meters)),
            subscriptions: Vec::new(),
        }
    }

    #[must_use]
    pub fn store_marker(store: &StoreResult) -> Self {
        Self {
            kind: OverlayKind::StoreMarker(store.id.clone()),
            spec: OverlaySpec::Marker(MarkerSpec::store(store)),
            subscriptions: vec![(PointerKind::Click, MapEvent::StoreClicked(store.id.clone()))],
        }
    }

    #[must_use]
    pub fn route_path(route: RouteId, path: Vec<GeoPosition>, style: PathStyle) -> Self {
        Self {
            kind: OverlayKind::RoutePath(route),
            spec: OverlaySpec::Polyline(PolylineSpec { path, style }),
            subscriptions: vec![
                (PointerKind::Click, MapEvent::RouteClicked(route)),
                (PointerKind::Enter, MapEvent::RouteHoverStarted(route)),
                (PointerKind::Leave, MapEvent::RouteHoverEnded(route)),
            ],
        }
    }

    #[must_use]
    pub fn kind(&self) -> &OverlayKind {
        &self.kind
    }
}

/// A live overlay: its layer and every listener attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedOverlay {
    pub kind: OverlayKind,
    pub layer: LayerHandle,
    pub listeners: Vec<ListenerHandle>,
}

#[derive(Debug, Default)]
pub struct OverlayRegistry {
    next_id: u64,
    overlays: BTreeMap<OverlayId, RenderedOverlay>,
}

impl OverlayRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Detaches every overlay in `category`, then attaches `pending`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::CategoryMismatch`] if any pending overlay
    /// belongs to another category. Nothing is detached or attached in that
    /// case.
    pub fn replace<M: MapSurface + ?Sized>(
        &mut self,
        map: &mut M,
        category: OverlayCategory,
        pending: Vec<PendingOverlay>,
    ) -> Result<Vec<OverlayId>, RegistryError> {
        if let Some(stray) = pending.iter().find(|p| p.kind.category() != category) {
            return Err(RegistryError::CategoryMismatch {
                category,
                kind: stray.kind.to_string(),
            });
        }

        let removed = self.detach_category(map, category);
        let ids: Vec<OverlayId> = pending
            .into_iter()
            .map(|overlay| self.attach(map, overlay))
            .collect();
        tracing::debug!(%category, removed, attached = ids.len(), "overlay category replaced");
        Ok(ids)
    }

    /// Attaches one route path, first detaching any path already drawn for
    /// the same route.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::CategoryMismatch`] if `pending` is not a
    /// route path.
    pub fn attach_route_path<M: MapSurface + ?Sized>(
        &mut self,
        map: &mut M,
        pending: PendingOverlay,
    ) -> Result<OverlayId, RegistryError> {
        let route = match &pending.kind {
            OverlayKind::RoutePath(route) => *route,
            other => {
                return Err(RegistryError::CategoryMismatch {
                    category: OverlayCategory::RoutePaths,
                    kind: other.to_string(),
                })
            }
        };

        let existing: Vec<OverlayId> = self
            .overlays
            .iter()
            .filter(|(_, overlay)| overlay.kind == OverlayKind::RoutePath(route))
            .map(|(id, _)| *id)
            .collect();
        for id in existing {
            self.detach(map, id)?;
        }
        Ok(self.attach(map, pending))
    }

    /// Removes one overlay and its listeners from the map.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownOverlay`] if `id` is not live.
    pub fn detach<M: MapSurface + ?Sized>(
        &mut self,
        map: &mut M,
        id: OverlayId,
    ) -> Result<(), RegistryError> {
        let overlay = self
            .overlays
            .remove(&id)
            .ok_or(RegistryError::UnknownOverlay(id))?;
        Self::remove_from_map(map, &overlay);
        Ok(())
    }

    /// Detaches every overlay in `category`; returns how many were removed.
    pub fn detach_category<M: MapSurface + ?Sized>(
        &mut self,
        map: &mut M,
        category: OverlayCategory,
    ) -> usize {
        let ids: Vec<OverlayId> = self
            .overlays
            .iter()
            .filter(|(_, overlay)| overlay.kind.category() == category)
            .map(|(id, _)| *id)
            .collect();
        for id in &ids {
            if let Some(overlay) = self.overlays.remove(id) {
                Self::remove_from_map(map, &overlay);
            }
        }
        ids.len()
    }

    /// Detaches everything. Safe to call any number of times.
    pub fn teardown_all<M: MapSurface + ?Sized>(&mut self, map: &mut M) -> usize {
        let overlays = std::mem::take(&mut self.overlays);
        for overlay in overlays.values() {
            Self::remove_from_map(map, overlay);
        }
        if !overlays.is_empty() {
            tracing::debug!(removed = overlays.len(), "all overlays torn down");
        }
        overlays.len()
    }

    #[must_use]
    pub fn count(&self, category: OverlayCategory) -> usize {
        self.overlays
            .values()
            .filter(|overlay| overlay.kind.category() == category)
            .count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: OverlayId) -> Option<&RenderedOverlay> {
        self.overlays.get(&id)
    }

    #[must_use]
    pub fn route_layer(&self, route: RouteId) -> Option<LayerHandle> {
        self.find_layer(&OverlayKind::RoutePath(route))
    }

    #[must_use]
    pub fn store_layer(&self, store: &StoreId) -> Option<LayerHandle> {
        self.find_layer(&OverlayKind::StoreMarker(store.clone()))
    }

    fn find_layer(&self, kind: &OverlayKind) -> Option<LayerHandle> {
        self.overlays
            .values()
            .find(|overlay| &overlay.kind == kind)
            .map(|overlay| overlay.layer)
    }

    fn attach<M: MapSurface + ?Sized>(&mut self, map: &mut M, pending: PendingOverlay) -> OverlayId {
        let layer = match &pending.spec {
            OverlaySpec::Marker(spec) => map.add_marker(spec),
            OverlaySpec::Circle(spec) => map.add_circle(spec),
            OverlaySpec::Polyline(spec) => map.add_polyline(spec),
        };
        let listeners = pending
            .subscriptions
            .into_iter()
            .map(|(kind, event)| map.subscribe(layer, kind, event))
            .collect();

        self.next_id += 1;
        let id = OverlayId(self.next_id);
        self.overlays.insert(
            id,
            RenderedOverlay {
                kind: pending.kind,
                layer,
                listeners,
            },
        );
        id
    }

    fn remove_from_map<M: MapSurface + ?Sized>(map: &mut M, overlay: &RenderedOverlay) {
        for listener in &overlay.listeners {
            map.unsubscribe(*listener);
        }
        map.remove_layer(overlay.layer);
    }
}

#[cfg(test)]
#[path = "overlay_test.rs"]
mod tests;
