use crate::app_config::{AppConfig, Environment};
use crate::geo::GeoPosition;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it from a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        match or_default(var, default).to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got \"{other}\""))),
        }
    };

    let api_base_url = require("CARTROUTE_API_BASE_URL")?;
    let maps_api_key = require("CARTROUTE_MAPS_API_KEY")?;

    let env = parse_environment(&or_default("CARTROUTE_ENV", "development"))?;
    let log_level = or_default("CARTROUTE_LOG_LEVEL", "info");
    let maps_base_url = or_default(
        "CARTROUTE_MAPS_BASE_URL",
        "https://maps.googleapis.com/maps/api/",
    );
    let session_token = lookup("CARTROUTE_SESSION_TOKEN")
        .ok()
        .filter(|t| !t.trim().is_empty());

    let request_timeout_secs = parse_u64("CARTROUTE_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("CARTROUTE_USER_AGENT", "cartroute/0.1 (shopping-routes)");
    let max_retries = parse_u32("CARTROUTE_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("CARTROUTE_RETRY_BACKOFF_BASE_MS", "500")?;
    let geolocation_timeout_ms = parse_u64("CARTROUTE_GEOLOCATION_TIMEOUT_MS", "5000")?;
    let click_feedback_ms = parse_u64("CARTROUTE_CLICK_FEEDBACK_MS", "600")?;
    let default_zoom = or_default("CARTROUTE_DEFAULT_ZOOM", "14")
        .parse::<u8>()
        .map_err(|e| invalid("CARTROUTE_DEFAULT_ZOOM", e.to_string()))?;
    let optimize_waypoints = parse_bool("CARTROUTE_OPTIMIZE_WAYPOINTS", "true")?;

    let current_position = match lookup("CARTROUTE_CURRENT_POSITION") {
        Ok(raw) => Some(
            raw.parse::<GeoPosition>()
                .map_err(|reason| invalid("CARTROUTE_CURRENT_POSITION", reason))?,
        ),
        Err(_) => None,
    };

    Ok(AppConfig {
        env,
        log_level,
        api_base_url,
        session_token,
        maps_api_key,
        maps_base_url,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        geolocation_timeout_ms,
        click_feedback_ms,
        default_zoom,
        optimize_waypoints,
        current_position,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CARTROUTE_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
