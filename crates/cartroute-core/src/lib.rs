pub mod app_config;
pub mod config;
pub mod geo;
pub mod request;
pub mod routes;
pub mod stores;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::GeoPosition;
pub use request::{LocationMode, SearchRequest};
pub use routes::{RouteCandidate, RouteId, Waypoint};
pub use stores::{ItemMatch, ProductCandidate, StoreId, StoreResult};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
