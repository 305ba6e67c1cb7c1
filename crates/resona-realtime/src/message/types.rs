//! Outbound push event type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use resona_core::types::id::UserId;
use resona_entity::notification::NotificationKind;

/// Events pushed by the server to live client connections.
///
/// The correlation `data` field carries the boundary (JSON map) form of
/// the typed notification payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundEvent {
    /// A new notification for the receiving user.
    NewNotification {
        /// What kind of domain event produced it.
        kind: NotificationKind,
        /// Display title.
        title: String,
        /// Display body text.
        message: String,
        /// The user who triggered the event (if applicable).
        source_user_id: Option<UserId>,
        /// Display name of the triggering user.
        source_display_name: Option<String>,
        /// Avatar URL of the triggering user.
        source_avatar_url: Option<String>,
        /// Correlation data, map form.
        data: Option<serde_json::Value>,
        /// Optional deep-link into the client.
        action_url: Option<String>,
        /// When the event was fanned out.
        timestamp: DateTime<Utc>,
    },
    /// The receiving user's absolute unread notification count.
    UnreadCountUpdate {
        /// Unread, non-expired notification count.
        count: i64,
    },
    /// A friend's presence changed.
    PresenceChanged {
        /// The user whose presence changed.
        user_id: UserId,
        /// Whether the user is now online.
        online: bool,
        /// When the transition happened.
        timestamp: DateTime<Utc>,
    },
    /// Server keepalive ping.
    Ping {
        /// Server time of the ping.
        timestamp: DateTime<Utc>,
    },
}

impl OutboundEvent {
    /// Keepalive ping stamped with the current time.
    pub fn ping() -> Self {
        Self::Ping {
            timestamp: Utc::now(),
        }
    }
}
