//! Notification record model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use resona_core::types::id::{NotificationId, UserId};

use super::kind::NotificationKind;
use super::payload::NotificationPayload;
use super::status::NotificationStatus;

/// A durable notification delivered to a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// The recipient user.
    pub target_user_id: UserId,
    /// The user who triggered the event (if applicable).
    pub source_user_id: Option<UserId>,
    /// What kind of domain event produced it.
    pub kind: NotificationKind,
    /// Lifecycle status.
    pub status: NotificationStatus,
    /// Display title.
    pub title: String,
    /// Display body text.
    pub message: String,
    /// Typed correlation payload.
    pub payload: NotificationPayload,
    /// Optional deep-link into the client.
    pub action_url: Option<String>,
    /// When the notification was created. Immutable.
    pub created_at: DateTime<Utc>,
    /// When the notification was read.
    pub read_at: Option<DateTime<Utc>>,
    /// When the notification was handled.
    pub handled_at: Option<DateTime<Utc>>,
    /// When the notification stops counting as active.
    pub expires_at: Option<DateTime<Utc>>,
}

impl NotificationRecord {
    /// Whether the notification is still unread.
    pub fn is_unread(&self) -> bool {
        self.status == NotificationStatus::Unread
    }

    /// Whether the notification had expired as of `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|exp| exp <= now).unwrap_or(false)
    }

    /// Whether the notification has expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Whether the notification participates in active queries (list,
    /// unread count) as of `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired_at(now)
    }
}

/// Input for creating a notification. The store assigns the id, the
/// creation timestamp, and the expiry per the kind policy.
#[derive(Debug, Clone)]
pub struct NewNotification {
    /// The recipient user.
    pub target_user_id: UserId,
    /// The user who triggered the event (if applicable).
    pub source_user_id: Option<UserId>,
    /// What kind of domain event produced it.
    pub kind: NotificationKind,
    /// Display title.
    pub title: String,
    /// Display body text.
    pub message: String,
    /// Typed correlation payload.
    pub payload: NotificationPayload,
    /// Optional deep-link into the client.
    pub action_url: Option<String>,
}

impl NewNotification {
    /// Materialize a full record with the given id, timestamps, and expiry.
    pub fn into_record(
        self,
        id: NotificationId,
        created_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> NotificationRecord {
        NotificationRecord {
            id,
            target_user_id: self.target_user_id,
            source_user_id: self.source_user_id,
            kind: self.kind,
            status: NotificationStatus::Unread,
            title: self.title,
            message: self.message,
            payload: self.payload,
            action_url: self.action_url,
            created_at,
            read_at: None,
            handled_at: None,
            expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(expires_at: Option<DateTime<Utc>>) -> NotificationRecord {
        NewNotification {
            target_user_id: UserId::new(),
            source_user_id: None,
            kind: NotificationKind::FriendRequest,
            title: "Friend request".to_string(),
            message: "Someone wants to connect".to_string(),
            payload: NotificationPayload::Empty,
            action_url: None,
        }
        .into_record(NotificationId::new(), Utc::now(), expires_at)
    }

    #[test]
    fn test_new_record_is_unread() {
        let r = record(None);
        assert!(r.is_unread());
        assert!(r.read_at.is_none());
        assert!(r.handled_at.is_none());
    }

    #[test]
    fn test_expiry_excludes_from_active() {
        let now = Utc::now();
        let expired = record(Some(now - Duration::hours(1)));
        assert!(expired.is_expired_at(now));
        assert!(!expired.is_active_at(now));

        let live = record(Some(now + Duration::hours(1)));
        assert!(live.is_active_at(now));

        let never = record(None);
        assert!(never.is_active_at(now));
    }
}
