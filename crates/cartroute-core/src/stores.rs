//! Stores returned by the nearby-search service.

use serde::{Deserialize, Serialize};

use crate::geo::GeoPosition;

/// Backend-assigned store identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreId(pub String);

impl std::fmt::Display for StoreId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StoreId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A store carrying at least one product matching the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreResult {
    pub id: StoreId,
    pub name: String,
    pub address: String,
    pub position: GeoPosition,
    pub items: Vec<ItemMatch>,
}

/// One requested product and the store's candidates for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMatch {
    pub product_name: String,
    pub requested_quantity: f64,
    pub unit: Option<String>,
    pub candidates: Vec<ProductCandidate>,
}

/// A concrete product on the store's shelf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCandidate {
    pub id: Option<String>,
    pub name: String,
    pub price: Option<f64>,
    pub unit: Option<String>,
    pub category: Option<String>,
    pub image_ref: Option<String>,
}

impl StoreResult {
    /// Product names the store can supply, one per requested item that has
    /// at least one candidate.
    #[must_use]
    pub fn available_products(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter(|item| !item.candidates.is_empty())
            .map(|item| item.product_name.as_str())
            .collect()
    }
}
