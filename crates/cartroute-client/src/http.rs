//! Shared `reqwest` plumbing for every client in this crate.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use cartroute_core::AppConfig;

use crate::error::ClientError;

/// Transport settings shared by all clients.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Additional attempts after the first failure for transient errors.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl HttpOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.request_timeout_secs,
            user_agent: config.user_agent.clone(),
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
        }
    }
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: "cartroute/0.1 (shopping-routes)".to_string(),
            max_retries: 2,
            backoff_base_ms: 500,
        }
    }
}

pub(crate) fn build_client(options: &HttpOptions) -> Result<Client, ClientError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(options.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(options.user_agent.as_str())
        .build()?;
    Ok(client)
}

/// Parses `base_url`, normalising it to end with exactly one slash so that
/// `Url::join` appends to the path rather than replacing its last segment.
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, ClientError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })
}

pub(crate) fn join(base: &Url, path: &str) -> Result<Url, ClientError> {
    base.join(path).map_err(|e| ClientError::InvalidBaseUrl {
        url: base.to_string(),
        reason: format!("cannot join \"{path}\": {e}"),
    })
}

/// Sends `request`, asserts a 2xx status, and parses the body as `T`.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    context: &str,
) -> Result<T, ClientError> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::UnexpectedStatus {
            status: status.as_u16(),
            url: response.url().to_string(),
        });
    }
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ClientError::Deserialize {
        context: context.to_string(),
        source: e,
    })
}
