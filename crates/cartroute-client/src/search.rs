//! HTTP client for the nearby-search and route-planning backend.
//!
//! Both endpoints take a JSON body via `POST` and authenticate with the
//! session token cookie when one is configured.

use reqwest::{Client, Url};

use cartroute_core::{GeoPosition, RouteCandidate, StoreResult};

use crate::error::ClientError;
use crate::http::{build_client, join, parse_base_url, send_json, HttpOptions};
use crate::normalize::{normalize_plans, normalize_stores, plan_request_body};
use crate::retry::retry_with_backoff;
use crate::types::{LatLng, NearbyRequestBody, NearbyResponse, RawPlan};

const NEARBY_PATH: &str = "api/search/nearby";
const PLANS_PATH: &str = "api/search/plans";

/// Result of a nearby search.
#[derive(Debug, Clone)]
pub struct NearbyStores {
    /// The position the backend searched around, when it echoes one.
    pub searched_at: Option<GeoPosition>,
    pub stores: Vec<StoreResult>,
}

/// Client for the search/planning backend.
///
/// Use [`SearchApiClient::new`] with the configured base URL; tests point it
/// at a `wiremock` server the same way.
pub struct SearchApiClient {
    client: Client,
    base_url: Url,
    session_token: Option<String>,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl SearchApiClient {
    /// Creates a client for the backend rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ClientError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(base_url: &str, options: &HttpOptions) -> Result<Self, ClientError> {
        Ok(Self {
            client: build_client(options)?,
            base_url: parse_base_url(base_url)?,
            session_token: None,
            max_retries: options.max_retries,
            backoff_base_ms: options.backoff_base_ms,
        })
    }

    /// Attaches the session token sent as the `token` cookie.
    #[must_use]
    pub fn with_session_token(mut self, token: Option<String>) -> Self {
        self.session_token = token;
        self
    }

    /// Searches for stores within `radius_km` of `position` that carry the
    /// products described by `query`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::UnexpectedStatus`] on a non-2xx status (5xx/429 retried).
    /// - [`ClientError::Http`] on network failure after all retries.
    /// - [`ClientError::Deserialize`] if the body does not match the expected shape.
    pub async fn nearby(
        &self,
        query: &str,
        radius_km: f64,
        position: GeoPosition,
        address: Option<&str>,
    ) -> Result<NearbyStores, ClientError> {
        let url = join(&self.base_url, NEARBY_PATH)?;
        let body = NearbyRequestBody {
            prompt: query,
            user_location: LatLng {
                lat: position.lat,
                lng: position.lng,
            },
            expected_radius: radius_km,
            address,
        };

        let response: NearbyResponse =
            retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
                send_json(self.post(&url).json(&body), "nearby search response")
            })
            .await?;

        let stores = normalize_stores(response.stores);
        tracing::debug!(store_count = stores.len(), radius_km, "nearby search returned");

        Ok(NearbyStores {
            searched_at: response
                .user_loc
                .map(|[lat, lng]| GeoPosition::new(lat, lng)),
            stores,
        })
    }

    /// Requests route candidates visiting the given stores from `origin`.
    ///
    /// The returned list keeps the backend's order and may contain candidates
    /// carrying an `error_message` instead of a route.
    ///
    /// # Errors
    ///
    /// Same as [`SearchApiClient::nearby`].
    pub async fn plans(
        &self,
        stores: &[StoreResult],
        origin: GeoPosition,
    ) -> Result<Vec<RouteCandidate>, ClientError> {
        let url = join(&self.base_url, PLANS_PATH)?;
        let body = plan_request_body(stores, origin);

        let raw: Vec<RawPlan> = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            send_json(self.post(&url).json(&body), "route plans response")
        })
        .await?;

        let candidates = normalize_plans(raw);
        tracing::debug!(candidate_count = candidates.len(), "route planning returned");
        Ok(candidates)
    }

    fn post(&self, url: &Url) -> reqwest::RequestBuilder {
        let request = self
            .client
            .post(url.clone())
            .header(reqwest::header::ACCEPT, "application/json");
        match &self.session_token {
            Some(token) => request.header(reqwest::header::COOKIE, format!("token={token}")),
            None => request,
        }
    }
}
