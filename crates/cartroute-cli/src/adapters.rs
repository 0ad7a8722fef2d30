//! Plugs the HTTP clients into the workflow's collaborator seams.

use std::sync::Arc;

use async_trait::async_trait;

use cartroute_client::{
    ClientError, DirectionsClient, DirectionsQuery, GeocodingClient, HttpOptions, SearchApiClient,
};
use cartroute_core::{AppConfig, GeoPosition, RouteCandidate, SearchRequest, StoreResult};
use cartroute_workflow::{
    GeocodingError, Geocoder, GeolocationOptions, Geolocator, LocationError, PathRequest,
    PathResolutionError, PathResolver, PlanningError, RoutePlanner, SearchError, Services,
    StoreSearch,
};

/// Stand-in for a platform location service: reports the fix configured in
/// `CARTROUTE_CURRENT_POSITION`, or fails as unsupported.
pub(crate) struct FixedGeolocator {
    position: Option<GeoPosition>,
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn current_position(
        &self,
        _options: GeolocationOptions,
    ) -> Result<GeoPosition, LocationError> {
        self.position.ok_or(LocationError::Unsupported)
    }
}

pub(crate) struct GeocodingAdapter(GeocodingClient);

#[async_trait]
impl Geocoder for GeocodingAdapter {
    async fn geocode(&self, address: &str) -> Result<GeoPosition, GeocodingError> {
        self.0.geocode(address).await.map_err(|e| match e {
            ClientError::NoResults { .. } => GeocodingError::NoMatch {
                address: address.to_string(),
            },
            other => GeocodingError::ServiceFailure(other.to_string()),
        })
    }
}

pub(crate) struct BackendAdapter(SearchApiClient);

/// Echoed search centres further than this from the sent position are logged.
const ECHO_TOLERANCE_KM: f64 = 0.5;

/// Distance between the position sent and the one the backend says it
/// searched around, when the two disagree by more than [`ECHO_TOLERANCE_KM`].
fn echo_drift_km(sent: GeoPosition, echoed: Option<GeoPosition>) -> Option<f64> {
    let drift = sent.distance_km(&echoed?);
    (drift > ECHO_TOLERANCE_KM).then_some(drift)
}

#[async_trait]
impl StoreSearch for BackendAdapter {
    async fn nearby(
        &self,
        request: &SearchRequest,
        position: GeoPosition,
    ) -> Result<Vec<StoreResult>, SearchError> {
        let found = self
            .0
            .nearby(
                &request.free_text_query,
                request.radius_km(),
                position,
                request.address(),
            )
            .await
            .map_err(|e| SearchError::new(e.to_string()))?;
        if let Some(drift_km) = echo_drift_km(position, found.searched_at) {
            tracing::warn!(
                %position,
                drift_km,
                "backend searched around a different position than requested"
            );
        }
        Ok(found.stores)
    }
}

#[async_trait]
impl RoutePlanner for BackendAdapter {
    async fn plan(
        &self,
        stores: &[StoreResult],
        position: GeoPosition,
    ) -> Result<Vec<RouteCandidate>, PlanningError> {
        self.0
            .plans(stores, position)
            .await
            .map_err(|e| PlanningError::new(e.to_string()))
    }
}

pub(crate) struct DirectionsAdapter(DirectionsClient);

#[async_trait]
impl PathResolver for DirectionsAdapter {
    async fn resolve(&self, request: &PathRequest) -> Result<Vec<GeoPosition>, PathResolutionError> {
        let query = DirectionsQuery {
            origin: request.origin.clone(),
            destination: request.destination.clone(),
            stops: request.stops.clone(),
            optimize: request.optimize,
        };
        let resolved = self.0.directions(&query).await.map_err(|e| match e {
            ClientError::Service { status, .. } => PathResolutionError::Status { status },
            ClientError::NoResults { .. } => PathResolutionError::EmptyPath,
            other => PathResolutionError::Transport(other.to_string()),
        })?;
        tracing::debug!(
            points = resolved.path.len(),
            waypoint_order = ?resolved.waypoint_order,
            "directions resolved"
        );
        Ok(resolved.path)
    }
}

/// Builds every collaborator from configuration.
///
/// # Errors
///
/// Returns an error if an HTTP client cannot be built or a base URL is invalid.
pub(crate) fn build_services(config: &AppConfig) -> anyhow::Result<Services> {
    let options = HttpOptions::from_app_config(config);

    let backend = Arc::new(BackendAdapter(
        SearchApiClient::new(&config.api_base_url, &options)
            .map_err(|e| anyhow::anyhow!("failed to build search API client: {e}"))?
            .with_session_token(config.session_token.clone()),
    ));
    let geocoder = GeocodingClient::new(&config.maps_base_url, &config.maps_api_key, &options)
        .map_err(|e| anyhow::anyhow!("failed to build geocoding client: {e}"))?;
    let directions = DirectionsClient::new(&config.maps_base_url, &config.maps_api_key, &options)
        .map_err(|e| anyhow::anyhow!("failed to build directions client: {e}"))?;

    Ok(Services {
        geolocator: Arc::new(FixedGeolocator {
            position: config.current_position,
        }),
        geocoder: Arc::new(GeocodingAdapter(geocoder)),
        search: backend.clone(),
        planner: backend,
        paths: Arc::new(DirectionsAdapter(directions)),
    })
}
