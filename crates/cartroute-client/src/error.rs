use thiserror::Error;

/// Errors returned by the remote-service clients.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The service answered but found nothing for the query.
    #[error("{service} returned no results for \"{query}\"")]
    NoResults {
        service: &'static str,
        query: String,
    },

    /// The service's JSON envelope reported a failure status.
    #[error("{service} reported status {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Service {
        service: &'static str,
        status: String,
        message: Option<String>,
    },

    #[error("malformed encoded polyline: {0}")]
    InvalidPolyline(String),
}
