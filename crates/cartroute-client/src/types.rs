//! Wire types for the search/planning backend and the maps services.
//!
//! Raw response types are deliberately permissive (`Option` everywhere,
//! numbers accepted as strings) and converted into `cartroute_core` types by
//! [`crate::normalize`].

use serde::{Deserialize, Deserializer, Serialize};

/// `{"lat": .., "lng": ..}` as both services expect it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

// ---------------------------------------------------------------------------
// Nearby search
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct NearbyRequestBody<'a> {
    pub prompt: &'a str,
    pub user_location: LatLng,
    /// Search radius in kilometres.
    pub expected_radius: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub struct NearbyResponse {
    #[serde(default)]
    pub user_loc: Option<[f64; 2]>,
    #[serde(default)]
    pub stores: Vec<RawStore>,
}

/// Store identifiers arrive either as a Mongo extended-JSON object or a plain string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawObjectId {
    Oid {
        #[serde(rename = "$oid")]
        oid: String,
    },
    Plain(String),
}

impl RawObjectId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            RawObjectId::Oid { oid } => oid,
            RawObjectId::Plain(s) => s,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawStore {
    #[serde(rename = "_id", default)]
    pub id: Option<RawObjectId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lng: Option<f64>,
    #[serde(default)]
    pub items: Vec<RawItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawItem {
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub candidates: Vec<RawCandidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCandidate {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub img_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Route planning
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct PlanRequestBody {
    pub stores: Vec<PlanStoreBody>,
    /// `[lat, lng]`
    pub user_loc: [f64; 2],
}

#[derive(Debug, Serialize)]
pub struct PlanStoreBody {
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub items: Vec<PlanItemBody>,
}

#[derive(Debug, Serialize)]
pub struct PlanItemBody {
    pub product_name: String,
    pub quantity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub candidates: Vec<PlanCandidateBody>,
}

#[derive(Debug, Serialize)]
pub struct PlanCandidateBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// One element of the planning response array.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPlan {
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cost: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub distance: Option<f64>,
    /// Minutes.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub duration: Option<f64>,
    /// `[lat, lng]` pairs, starting at the user's position.
    #[serde(default)]
    pub coordinates: Vec<[f64; 2]>,
    /// Addresses parallel to `coordinates`.
    #[serde(default)]
    pub waypoints: Vec<String>,
    #[serde(rename = "_error_message", default)]
    pub error_message: Option<String>,
}

// ---------------------------------------------------------------------------
// Maps services
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    pub geometry: Geometry,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Deserialize)]
pub struct DirectionsResponse {
    pub status: String,
    #[serde(default)]
    pub routes: Vec<DirectionsRoute>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DirectionsRoute {
    pub overview_polyline: EncodedPolyline,
    /// Visiting order of the interior stops when optimisation was requested.
    #[serde(default)]
    pub waypoint_order: Vec<usize>,
}

#[derive(Debug, Deserialize)]
pub struct EncodedPolyline {
    pub points: String,
}

/// Accepts a JSON number, a numeric string, or `null`.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}
