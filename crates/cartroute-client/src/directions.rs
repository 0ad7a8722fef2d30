//! HTTP client for the directions (path resolution) service.

use reqwest::{Client, Url};

use cartroute_core::{GeoPosition, Waypoint};

use crate::error::ClientError;
use crate::http::{build_client, join, parse_base_url, send_json, HttpOptions};
use crate::polyline::decode_polyline;
use crate::retry::retry_with_backoff;
use crate::types::DirectionsResponse;

const SERVICE: &str = "directions";

/// A multi-stop directions request.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsQuery {
    pub origin: Waypoint,
    pub destination: Waypoint,
    /// Interior stops in the planned visiting order.
    pub stops: Vec<Waypoint>,
    /// Let the service reorder `stops`. The set of stops never changes.
    pub optimize: bool,
}

/// A resolved, drawable path.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDirections {
    pub path: Vec<GeoPosition>,
    /// Order the service chose for the interior stops (indices into `stops`).
    pub waypoint_order: Vec<usize>,
}

/// Resolves ordered waypoints into a drawable path.
pub struct DirectionsClient {
    client: Client,
    base_url: Url,
    api_key: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl DirectionsClient {
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ClientError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(base_url: &str, api_key: &str, options: &HttpOptions) -> Result<Self, ClientError> {
        Ok(Self {
            client: build_client(options)?,
            base_url: parse_base_url(base_url)?,
            api_key: api_key.to_owned(),
            max_retries: options.max_retries,
            backoff_base_ms: options.backoff_base_ms,
        })
    }

    /// Fetches the overview path for `query`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Service`] when the status is not `OK`.
    /// - [`ClientError::NoResults`] when `OK` carries no routes.
    /// - [`ClientError::InvalidPolyline`] when the overview polyline is malformed.
    /// - [`ClientError::Http`] / [`ClientError::UnexpectedStatus`] on transport failure.
    pub async fn directions(
        &self,
        query: &DirectionsQuery,
    ) -> Result<ResolvedDirections, ClientError> {
        let url = self.build_url(query)?;
        let response: DirectionsResponse =
            retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
                send_json(self.client.get(url.clone()), "directions response")
            })
            .await?;

        if response.status != "OK" {
            return Err(ClientError::Service {
                service: SERVICE,
                status: response.status,
                message: response.error_message,
            });
        }

        let route = response
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::NoResults {
                service: SERVICE,
                query: format!("{} -> {}", query.origin, query.destination),
            })?;

        Ok(ResolvedDirections {
            path: decode_polyline(&route.overview_polyline.points)?,
            waypoint_order: route.waypoint_order,
        })
    }

    fn build_url(&self, query: &DirectionsQuery) -> Result<Url, ClientError> {
        let mut url = join(&self.base_url, "directions/json")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("origin", &query.origin.to_string());
            pairs.append_pair("destination", &query.destination.to_string());
            if !query.stops.is_empty() {
                let stops = query
                    .stops
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("|");
                let waypoints = if query.optimize {
                    format!("optimize:true|{stops}")
                } else {
                    stops
                };
                pairs.append_pair("waypoints", &waypoints);
            }
            pairs.append_pair("mode", "driving");
            pairs.append_pair("key", &self.api_key);
        }
        Ok(url)
    }
}
