//! Feature flags configuration

use serde::Deserialize;

/// Feature flags for enabling/disabling node roles
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureFlags {
    /// Serve the `GET /send/:message` trigger (producer role)
    #[serde(default = "enabled")]
    pub http_trigger: bool,

    /// Register the `custom.event` logger (consumer role)
    #[serde(default = "enabled")]
    pub log_custom_events: bool,

    /// Broadcast join/leave presence announcements
    #[serde(default = "enabled")]
    pub announce_presence: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            http_trigger: true,
            log_custom_events: true,
            announce_presence: true,
        }
    }
}

fn enabled() -> bool {
    true
}
