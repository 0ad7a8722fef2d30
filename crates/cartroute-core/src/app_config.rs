use crate::geo::GeoPosition;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub api_base_url: String,
    pub session_token: Option<String>,
    pub maps_api_key: String,
    pub maps_base_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub geolocation_timeout_ms: u64,
    pub click_feedback_ms: u64,
    pub default_zoom: u8,
    pub optimize_waypoints: bool,
    /// Fix reported by the command-line stand-in for the platform location service.
    pub current_position: Option<GeoPosition>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("api_base_url", &self.api_base_url)
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "[redacted]"),
            )
            .field("maps_api_key", &"[redacted]")
            .field("maps_base_url", &self.maps_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("geolocation_timeout_ms", &self.geolocation_timeout_ms)
            .field("click_feedback_ms", &self.click_feedback_ms)
            .field("default_zoom", &self.default_zoom)
            .field("optimize_waypoints", &self.optimize_waypoints)
            .field("current_position", &self.current_position)
            .finish()
    }
}
