//! Presence state value objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use resona_core::types::id::UserId;

/// An online/offline transition for a user.
///
/// Emitted by the presence registry when a user's first connection opens
/// or last connection closes; fanned out to the user's friend set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceChange {
    /// The user whose presence changed.
    pub user_id: UserId,
    /// `true` for offline → online, `false` for online → offline.
    pub online: bool,
    /// When the transition happened.
    pub at: DateTime<Utc>,
}

impl PresenceChange {
    /// An offline → online transition happening now.
    pub fn online(user_id: UserId) -> Self {
        Self {
            user_id,
            online: true,
            at: Utc::now(),
        }
    }

    /// An online → offline transition happening now.
    pub fn offline(user_id: UserId) -> Self {
        Self {
            user_id,
            online: false,
            at: Utc::now(),
        }
    }
}
