use std::fmt;

use crate::error::WorkflowError;

/// Non-fatal messages surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    LocationUnavailable,
    AddressNotFound,
    SearchFailed,
    NoStoresFound,
    PlanningFailed(String),
}

impl Notice {
    /// The notice shown for a failed discovery run, if any.
    #[must_use]
    pub fn for_error(err: &WorkflowError) -> Option<Self> {
        match err {
            WorkflowError::Location(_) => Some(Notice::LocationUnavailable),
            WorkflowError::Geocoding(_) => Some(Notice::AddressNotFound),
            WorkflowError::Search(_) => Some(Notice::SearchFailed),
            WorkflowError::Planning(e) => Some(Notice::PlanningFailed(e.message.clone())),
            WorkflowError::NoStores => Some(Notice::NoStoresFound),
            WorkflowError::Registry(_)
            | WorkflowError::MapApi(_)
            | WorkflowError::Busy(_)
            | WorkflowError::WrongPhase { .. } => None,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::LocationUnavailable => f.write_str("Could not determine your location."),
            Notice::AddressNotFound => f.write_str("Could not find that address."),
            Notice::SearchFailed => f.write_str("Store search failed. Please try again."),
            Notice::NoStoresFound => f.write_str("No stores found nearby."),
            Notice::PlanningFailed(message) => write!(f, "Route planning failed: {message}"),
        }
    }
}
