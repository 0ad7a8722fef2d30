//! The user's submitted shopping request.

use serde::{Deserialize, Serialize};

/// Where the search should be centred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationMode {
    /// Ask the platform location service for the current fix.
    Current,
    /// Resolve a free-text address through the geocoding service.
    Address(String),
}

/// A submitted search. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub free_text_query: String,
    pub radius_meters: f64,
    pub location_mode: LocationMode,
}

impl SearchRequest {
    #[must_use]
    pub fn new(
        free_text_query: impl Into<String>,
        radius_meters: f64,
        location_mode: LocationMode,
    ) -> Self {
        Self {
            free_text_query: free_text_query.into(),
            radius_meters,
            location_mode,
        }
    }

    /// The radius in kilometres, as the search backend expects it.
    #[must_use]
    pub fn radius_km(&self) -> f64 {
        self.radius_meters / 1000.0
    }

    /// The address string when the request is address-based.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        match &self.location_mode {
            LocationMode::Current => None,
            LocationMode::Address(address) => Some(address.as_str()),
        }
    }
}
