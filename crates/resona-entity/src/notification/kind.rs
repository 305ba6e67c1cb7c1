//! Notification kind enumeration.

use serde::{Deserialize, Serialize};

/// What kind of domain event produced a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// An incoming friend request.
    FriendRequest,
    /// A previously sent friend request was accepted.
    FriendRequestAccepted,
    /// A previously sent friend request was declined.
    FriendRequestDeclined,
    /// An existing friendship was removed.
    FriendRemoved,
    /// A chat message addressed to the target user.
    Message,
    /// Anything else.
    Other,
}

impl NotificationKind {
    /// Return the kind as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FriendRequest => "friend_request",
            Self::FriendRequestAccepted => "friend_request_accepted",
            Self::FriendRequestDeclined => "friend_request_declined",
            Self::FriendRemoved => "friend_removed",
            Self::Message => "message",
            Self::Other => "other",
        }
    }

    /// Parse a kind from its stored string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "friend_request" => Some(Self::FriendRequest),
            "friend_request_accepted" => Some(Self::FriendRequestAccepted),
            "friend_request_declined" => Some(Self::FriendRequestDeclined),
            "friend_removed" => Some(Self::FriendRemoved),
            "message" => Some(Self::Message),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Whether this kind represents a friend-graph change that is also
    /// published to the outbound bus.
    pub fn is_friend_graph(&self) -> bool {
        matches!(
            self,
            Self::FriendRequest
                | Self::FriendRequestAccepted
                | Self::FriendRequestDeclined
                | Self::FriendRemoved
        )
    }

    /// Whether active-viewer suppression applies to this kind.
    pub fn is_suppressible(&self) -> bool {
        matches!(self, Self::Message)
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        for kind in [
            NotificationKind::FriendRequest,
            NotificationKind::FriendRequestAccepted,
            NotificationKind::FriendRequestDeclined,
            NotificationKind::FriendRemoved,
            NotificationKind::Message,
            NotificationKind::Other,
        ] {
            assert_eq!(NotificationKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(NotificationKind::parse("bogus"), None);
    }

    #[test]
    fn test_suppression_only_for_messages() {
        assert!(NotificationKind::Message.is_suppressible());
        assert!(!NotificationKind::FriendRequest.is_suppressible());
        assert!(!NotificationKind::Other.is_suppressible());
    }
}
