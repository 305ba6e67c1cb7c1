//! Notification status state machine.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a notification.
///
/// Transitions move forward only: `Unread → Read → Handled`, where
/// `Handled` may also be reached directly from `Unread`. Once `Handled`,
/// no further transition is permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    /// Not yet seen by the target user.
    Unread,
    /// Seen, still actionable.
    Read,
    /// Acted upon; terminal.
    Handled,
}

impl NotificationStatus {
    /// Return the status as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unread => "unread",
            Self::Read => "read",
            Self::Handled => "handled",
        }
    }

    /// Parse a status from its stored string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unread" => Some(Self::Unread),
            "read" => Some(Self::Read),
            "handled" => Some(Self::Handled),
            _ => None,
        }
    }

    /// Whether a transition from `self` to `next` is permitted.
    pub fn can_transition_to(&self, next: NotificationStatus) -> bool {
        match (self, next) {
            (Self::Unread, Self::Read) => true,
            (Self::Unread, Self::Handled) => true,
            (Self::Read, Self::Handled) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
