//! The discovery phase: resolve a position, search nearby stores, draw them.

use cartroute_core::{GeoPosition, SearchRequest, StoreResult};

use crate::error::{RegistryError, WorkflowError};
use crate::map::MapSurface;
use crate::overlay::{OverlayCategory, OverlayRegistry, PendingOverlay};
use crate::position::PositionProvider;
use crate::services::StoreSearch;

/// A successful discovery run.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryResult {
    pub position: GeoPosition,
    pub stores: Vec<StoreResult>,
}

/// Resolves the position, then searches. The search is never issued if the
/// position cannot be resolved.
///
/// # Errors
///
/// - [`WorkflowError::Location`] / [`WorkflowError::Geocoding`] from position
///   resolution.
/// - [`WorkflowError::Search`] when the search service fails.
pub async fn discover(
    provider: &PositionProvider,
    search: &dyn StoreSearch,
    request: &SearchRequest,
) -> Result<DiscoveryResult, WorkflowError> {
    let position = provider.resolve(request).await?;
    let stores = search.nearby(request, position).await?;
    tracing::info!(
        store_count = stores.len(),
        radius_m = request.radius_meters,
        position = %position,
        "nearby search finished"
    );
    Ok(DiscoveryResult { position, stores })
}

/// Draws a discovery result: one view reset, then user marker, radius circle
/// and one marker per store. An empty result leaves the map empty.
///
/// # Errors
///
/// Propagates [`RegistryError`] from the overlay registry.
pub fn render<M: MapSurface + ?Sized>(
    registry: &mut OverlayRegistry,
    map: &mut M,
    result: &DiscoveryResult,
    radius_meters: f64,
    zoom: u8,
) -> Result<(), RegistryError> {
    map.set_view(result.position, zoom);

    if result.stores.is_empty() {
        registry.teardown_all(map);
        return Ok(());
    }

    registry.replace(
        map,
        OverlayCategory::UserMarker,
        vec![PendingOverlay::user_marker(result.position)],
    )?;
    registry.replace(
        map,
        OverlayCategory::RadiusCircle,
        vec![PendingOverlay::radius_circle(result.position, radius_meters)],
    )?;
    registry.replace(
        map,
        OverlayCategory::StoreMarkers,
        result.stores.iter().map(PendingOverlay::store_marker).collect(),
    )?;
    Ok(())
}
