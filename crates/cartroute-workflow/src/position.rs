//! Resolves where a search is centred.

use std::sync::Arc;

use cartroute_core::{GeoPosition, LocationMode, SearchRequest};

use crate::error::{LocationError, WorkflowError};
use crate::services::{Geocoder, GeolocationOptions, Geolocator};

#[derive(Clone)]
pub struct PositionProvider {
    geolocator: Arc<dyn Geolocator>,
    geocoder: Arc<dyn Geocoder>,
    options: GeolocationOptions,
}

impl PositionProvider {
    #[must_use]
    pub fn new(
        geolocator: Arc<dyn Geolocator>,
        geocoder: Arc<dyn Geocoder>,
        options: GeolocationOptions,
    ) -> Self {
        Self {
            geolocator,
            geocoder,
            options,
        }
    }

    /// Current fix or geocoded address, depending on the request.
    ///
    /// The platform call is bounded by the configured timeout even if the
    /// location service never answers.
    ///
    /// # Errors
    ///
    /// - [`WorkflowError::Location`] when the platform fails, times out or
    ///   reports out-of-range coordinates.
    /// - [`WorkflowError::Geocoding`] when the address cannot be resolved.
    pub async fn resolve(&self, request: &SearchRequest) -> Result<GeoPosition, WorkflowError> {
        match &request.location_mode {
            LocationMode::Current => {
                let timeout_ms = u64::try_from(self.options.timeout.as_millis()).unwrap_or(u64::MAX);
                let fix = tokio::time::timeout(
                    self.options.timeout,
                    self.geolocator.current_position(self.options),
                )
                .await
                .map_err(|_elapsed| LocationError::Timeout { timeout_ms })??;

                if !fix.is_valid() {
                    return Err(LocationError::Unavailable(format!(
                        "platform reported invalid coordinates {fix}"
                    ))
                    .into());
                }
                tracing::debug!(position = %fix, "current position resolved");
                Ok(fix)
            }
            LocationMode::Address(address) => {
                let position = self.geocoder.geocode(address).await?;
                tracing::debug!(%address, %position, "address geocoded");
                Ok(position)
            }
        }
    }
}
