//! Presence/connection registry configuration.

use serde::{Deserialize, Serialize};

/// Presence registry and push channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Maximum simultaneous connections per user; the oldest connection is
    /// evicted when the cap is exceeded.
    #[serde(default = "default_max_connections_per_user")]
    pub max_connections_per_user: usize,
    /// Buffer size of each connection's outbound message channel.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Keepalive ping interval in seconds.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
    /// Seconds without client activity before a connection is considered
    /// dead and swept.
    #[serde(default = "default_client_timeout")]
    pub client_timeout_seconds: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            max_connections_per_user: default_max_connections_per_user(),
            channel_buffer_size: default_channel_buffer(),
            ping_interval_seconds: default_ping_interval(),
            client_timeout_seconds: default_client_timeout(),
        }
    }
}

fn default_max_connections_per_user() -> usize {
    5
}

fn default_channel_buffer() -> usize {
    256
}

fn default_ping_interval() -> u64 {
    30
}

fn default_client_timeout() -> u64 {
    90
}
