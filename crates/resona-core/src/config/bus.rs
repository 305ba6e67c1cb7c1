//! Outbound cross-service bus configuration.

use serde::{Deserialize, Serialize};

/// Settings for the fire-and-forget outbound publisher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusConfig {
    /// Whether outbound publishing is enabled at all. When disabled the
    /// publisher is a no-op.
    #[serde(default)]
    pub enabled: bool,
    /// Transport URL (e.g. `redis://localhost:6379`).
    #[serde(default)]
    pub url: Option<String>,
    /// Prefix prepended to every published topic.
    #[serde(default = "default_topic_prefix")]
    pub topic_prefix: String,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: None,
            topic_prefix: default_topic_prefix(),
        }
    }
}

fn default_topic_prefix() -> String {
    "resona".to_string()
}
