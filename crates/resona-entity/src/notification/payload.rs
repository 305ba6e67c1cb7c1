//! Typed notification correlation payloads.
//!
//! In memory a payload is one of a closed set of variants keyed by the
//! notification kind; the free-form JSON map form exists only at the
//! storage and wire boundaries ([`NotificationPayload::to_value`] /
//! [`NotificationPayload::from_value`]).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use resona_core::types::id::ConversationId;

use super::kind::NotificationKind;

/// Correlation data attached to a notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "payload", rename_all = "snake_case")]
pub enum NotificationPayload {
    /// Friend-request lifecycle correlation (request sent/accepted/declined).
    FriendRequest {
        /// The friend-request record id in the friend-graph service.
        request_id: Uuid,
    },
    /// Chat message correlation.
    Message {
        /// The conversation the message belongs to.
        conversation_id: ConversationId,
        /// The message record id.
        message_id: Uuid,
    },
    /// Free-form data carried by `Other` notifications.
    Custom(Map<String, Value>),
    /// No correlation data.
    Empty,
}

impl NotificationPayload {
    /// Serialize to the boundary map form. `Empty` maps to `None`.
    pub fn to_value(&self) -> Option<Value> {
        match self {
            Self::FriendRequest { request_id } => Some(json!({ "request_id": request_id })),
            Self::Message {
                conversation_id,
                message_id,
            } => Some(json!({
                "conversation_id": conversation_id,
                "message_id": message_id,
            })),
            Self::Custom(map) => Some(Value::Object(map.clone())),
            Self::Empty => None,
        }
    }

    /// Reconstruct the typed form from the boundary map, using the kind to
    /// pick the variant. Unparseable maps fall back to `Custom` so stored
    /// data is never dropped.
    pub fn from_value(kind: NotificationKind, value: Option<Value>) -> Self {
        let Some(value) = value else {
            return Self::Empty;
        };

        match kind {
            NotificationKind::FriendRequest
            | NotificationKind::FriendRequestAccepted
            | NotificationKind::FriendRequestDeclined
            | NotificationKind::FriendRemoved => {
                if let Some(request_id) = value
                    .get("request_id")
                    .and_then(Value::as_str)
                    .and_then(|s| Uuid::parse_str(s).ok())
                {
                    return Self::FriendRequest { request_id };
                }
                Self::custom_or_empty(value)
            }
            NotificationKind::Message => {
                let conversation_id = value
                    .get("conversation_id")
                    .and_then(Value::as_str)
                    .and_then(|s| s.parse::<ConversationId>().ok());
                let message_id = value
                    .get("message_id")
                    .and_then(Value::as_str)
                    .and_then(|s| Uuid::parse_str(s).ok());
                match (conversation_id, message_id) {
                    (Some(conversation_id), Some(message_id)) => Self::Message {
                        conversation_id,
                        message_id,
                    },
                    _ => Self::custom_or_empty(value),
                }
            }
            NotificationKind::Other => Self::custom_or_empty(value),
        }
    }

    fn custom_or_empty(value: Value) -> Self {
        match value {
            Value::Object(map) if !map.is_empty() => Self::Custom(map),
            _ => Self::Empty,
        }
    }
}
