//! Notification lifecycle configuration.

use serde::{Deserialize, Serialize};

/// Notification store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Days until a friend-request notification expires.
    #[serde(default = "default_friend_request_ttl_days")]
    pub friend_request_ttl_days: i64,
    /// Age in days past which handled notifications are deleted by the
    /// cleanup sweep.
    #[serde(default = "default_cleanup_after_days")]
    pub cleanup_after_days: i64,
    /// Maximum stored notifications per user; older ones are trimmed.
    #[serde(default = "default_max_stored_per_user")]
    pub max_stored_per_user: u64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            friend_request_ttl_days: default_friend_request_ttl_days(),
            cleanup_after_days: default_cleanup_after_days(),
            max_stored_per_user: default_max_stored_per_user(),
        }
    }
}

fn default_friend_request_ttl_days() -> i64 {
    30
}

fn default_cleanup_after_days() -> i64 {
    30
}

fn default_max_stored_per_user() -> u64 {
    1000
}
