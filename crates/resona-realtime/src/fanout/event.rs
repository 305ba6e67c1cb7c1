//! Fan-out input event.

use uuid::Uuid;

use resona_core::error::AppError;
use resona_core::result::AppResult;
use resona_core::types::id::{ConversationId, UserId};
use resona_entity::notification::{NewNotification, NotificationKind, NotificationPayload};

/// A domain event handed to the fan-out coordinator.
///
/// Carries everything needed for live delivery in hand, so a failed
/// store write never blocks the push.
#[derive(Debug, Clone)]
pub struct NotifyEvent {
    /// The recipient user.
    pub target_user_id: UserId,
    /// The user who triggered the event (if applicable).
    pub source_user_id: Option<UserId>,
    /// Display name of the triggering user.
    pub source_display_name: Option<String>,
    /// Avatar URL of the triggering user.
    pub source_avatar_url: Option<String>,
    /// What kind of domain event this is.
    pub kind: NotificationKind,
    /// Display title.
    pub title: String,
    /// Display body text.
    pub message: String,
    /// Typed correlation payload.
    pub payload: NotificationPayload,
    /// The conversation this event belongs to, for viewer suppression.
    pub conversation_id: Option<ConversationId>,
    /// Optional deep-link into the client.
    pub action_url: Option<String>,
}

impl NotifyEvent {
    /// An incoming friend request from `source` to `target`.
    pub fn friend_request(
        target_user_id: UserId,
        source_user_id: UserId,
        source_display_name: impl Into<String>,
        request_id: Uuid,
    ) -> Self {
        let name = source_display_name.into();
        Self {
            target_user_id,
            source_user_id: Some(source_user_id),
            source_display_name: Some(name.clone()),
            source_avatar_url: None,
            kind: NotificationKind::FriendRequest,
            title: "New friend request".to_string(),
            message: format!("{name} sent you a friend request"),
            payload: NotificationPayload::FriendRequest { request_id },
            conversation_id: None,
            action_url: Some("/friends/requests".to_string()),
        }
    }

    /// A chat message from `source` addressed to `target`.
    pub fn chat_message(
        target_user_id: UserId,
        source_user_id: UserId,
        source_display_name: impl Into<String>,
        conversation_id: ConversationId,
        message_id: Uuid,
        preview: impl Into<String>,
    ) -> Self {
        let name = source_display_name.into();
        Self {
            target_user_id,
            source_user_id: Some(source_user_id),
            source_display_name: Some(name.clone()),
            source_avatar_url: None,
            kind: NotificationKind::Message,
            title: name,
            message: preview.into(),
            payload: NotificationPayload::Message {
                conversation_id,
                message_id,
            },
            conversation_id: Some(conversation_id),
            action_url: Some(format!("/chat/{conversation_id}")),
        }
    }

    /// Validates caller input before fan-out.
    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::validation("Notification title must not be empty"));
        }
        if self.kind == NotificationKind::Message && self.conversation_id.is_none() {
            return Err(AppError::validation(
                "Message events must carry a conversation id",
            ));
        }
        Ok(())
    }

    /// The store-side creation input for this event.
    pub fn to_new_notification(&self) -> NewNotification {
        NewNotification {
            target_user_id: self.target_user_id,
            source_user_id: self.source_user_id,
            kind: self.kind,
            title: self.title.clone(),
            message: self.message.clone(),
            payload: self.payload.clone(),
            action_url: self.action_url.clone(),
        }
    }
}
