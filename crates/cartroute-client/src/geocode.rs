//! HTTP client for the address geocoding service.

use reqwest::{Client, Url};

use cartroute_core::GeoPosition;

use crate::error::ClientError;
use crate::http::{build_client, join, parse_base_url, send_json, HttpOptions};
use crate::retry::retry_with_backoff;
use crate::types::GeocodeResponse;

const SERVICE: &str = "geocoding";

/// Resolves free-text addresses to coordinates.
pub struct GeocodingClient {
    client: Client,
    base_url: Url,
    api_key: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl GeocodingClient {
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

    /// Returns the best match for `address`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::NoResults`] for `ZERO_RESULTS` or an empty result list.
    /// - [`ClientError::Service`] for any other non-`OK` status.
    /// - [`ClientError::Http`] / [`ClientError::UnexpectedStatus`] on transport failure.
    pub async fn geocode(&self, address: &str) -> Result<GeoPosition, ClientError> {
        let url = self.build_url(address)?;
        let response: GeocodeResponse =
            retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
                send_json(self.client.get(url.clone()), "geocode response")
            })
            .await?;

        match response.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" => {
                return Err(ClientError::NoResults {
                    service: SERVICE,
                    query: address.to_string(),
                })
            }
            _ => {
                return Err(ClientError::Service {
                    service: SERVICE,
                    status: response.status.clone(),
                    message: response.error_message,
                })
            }
        }

        let location = response
            .results
            .first()
            .map(|r| r.geometry.location)
            .ok_or_else(|| ClientError::NoResults {
                service: SERVICE,
                query: address.to_string(),
            })?;

        Ok(GeoPosition::new(location.lat, location.lng))
    }

    fn build_url(&self, address: &str) -> Result<Url, ClientError> {
        let mut url = join(&self.base_url, "geocode/json")?;
        url.query_pairs_mut()
            .append_pair("address", address)
            .append_pair("key", &self.api_key);
        Ok(url)
    }
}
