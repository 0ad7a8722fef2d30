use std::time::Duration;

use cartroute_core::AppConfig;

/// Workflow tunables taken from [`AppConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowSettings {
    pub geolocation_timeout: Duration,
    pub click_feedback: Duration,
    pub default_zoom: u8,
    /// Let the directions service reorder a candidate's interior stops.
    pub optimize_waypoints: bool,
}

impl WorkflowSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            geolocation_timeout: Duration::from_millis(config.geolocation_timeout_ms),
            click_feedback: Duration::from_millis(config.click_feedback_ms),
            default_zoom: config.default_zoom,
            optimize_waypoints: config.optimize_waypoints,
        }
    }
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            geolocation_timeout: Duration::from_millis(5000),
            click_feedback: Duration::from_millis(600),
            default_zoom: 14,
            optimize_waypoints: true,
        }
    }
}
