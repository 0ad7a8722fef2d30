//! Route candidates returned by the planning service.

use serde::{Deserialize, Serialize};

use crate::geo::GeoPosition;

/// Planning-service candidate identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(pub u32);

impl std::fmt::Display for RouteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stop on a route: either resolved coordinates or a free-text address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Waypoint {
    Position(GeoPosition),
    Address(String),
}

impl std::fmt::Display for Waypoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Waypoint::Position(p) => write!(f, "{p}"),
            Waypoint::Address(a) => f.write_str(a),
        }
    }
}

/// One proposed multi-stop route, before or after its path is drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteCandidate {
    pub id: RouteId,
    /// First = origin, last = destination, interior = stops in visiting order.
    pub ordered_waypoints: Vec<Waypoint>,
    /// Human-readable addresses, parallel to the planning service's stop list.
    pub stop_labels: Vec<String>,
    pub distance_km: f64,
    pub duration_minutes: u32,
    pub cost: f64,
    /// Set when planning failed for this candidate; it must not be drawn.
    pub error_message: Option<String>,
}

impl RouteCandidate {
    /// Builds the sentinel candidate that stands in for a failed planning call.
    #[must_use]
    pub fn sentinel(message: impl Into<String>) -> Self {
        Self {
            id: RouteId(0),
            ordered_waypoints: Vec::new(),
            stop_labels: Vec::new(),
            distance_km: 0.0,
            duration_minutes: 0,
            cost: 0.0,
            error_message: Some(message.into()),
        }
    }

    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.error_message.is_some()
    }

    /// Origin, destination and interior stops, or `None` when the candidate
    /// has fewer than two waypoints and cannot be drawn.
    #[must_use]
    pub fn endpoints(&self) -> Option<(&Waypoint, &Waypoint, &[Waypoint])> {
        match self.ordered_waypoints.as_slice() {
            [origin, stops @ .., destination] => Some((origin, destination, stops)),
            _ => None,
        }
    }
}
