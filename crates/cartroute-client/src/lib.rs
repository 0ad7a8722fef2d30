pub mod directions;
pub mod error;
pub mod geocode;
mod http;
pub mod normalize;
pub mod polyline;
pub(crate) mod retry;
pub mod search;
pub mod types;

pub use directions::{DirectionsClient, DirectionsQuery, ResolvedDirections};
pub use error::ClientError;
pub use geocode::GeocodingClient;
pub use http::HttpOptions;
pub use polyline::decode_polyline;
pub use search::{NearbyStores, SearchApiClient};
