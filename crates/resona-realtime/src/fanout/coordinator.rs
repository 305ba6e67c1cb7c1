//! Fan-out coordinator — ties store, presence, viewers, and bus together.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use resona_core::events::{BusEnvelope, FriendshipEvent};
use resona_core::result::AppResult;
use resona_core::types::id::{NotificationId, UserId};
use resona_entity::notification::{NotificationKind, NotificationPayload};
use resona_entity::presence::PresenceChange;
use resona_store::NotificationStore;

use crate::bus::publisher::OutboundPublisher;
use crate::message::types::OutboundEvent;
use crate::presence::group::GroupKey;
use crate::presence::registry::PresenceRegistry;
use crate::viewer::tracker::ActiveViewerTracker;

use super::event::NotifyEvent;

/// What a `notify` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// The target was actively viewing the source conversation; nothing
    /// was stored or pushed.
    Suppressed,
    /// The event was fanned out.
    Delivered {
        /// Whether the durable record was persisted.
        stored: bool,
        /// How many live connections received the notification push.
        pushed: usize,
    },
}

/// Consumes domain events and drives the full fan-out pipeline.
///
/// Performs no deduplication: each call corresponds to exactly one
/// domain action, by caller contract. The bus is strictly outbound and
/// never looped back into this pipeline.
#[derive(Clone)]
pub struct FanoutCoordinator {
    store: NotificationStore,
    registry: Arc<PresenceRegistry>,
    viewers: Arc<ActiveViewerTracker>,
    publisher: Arc<OutboundPublisher>,
}

impl std::fmt::Debug for FanoutCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutCoordinator").finish()
    }
}

impl FanoutCoordinator {
    /// Creates a new coordinator.
    pub fn new(
        store: NotificationStore,
        registry: Arc<PresenceRegistry>,
        viewers: Arc<ActiveViewerTracker>,
        publisher: Arc<OutboundPublisher>,
    ) -> Self {
        Self {
            store,
            registry,
            viewers,
            publisher,
        }
    }

    /// Fans out one domain event: durable record, live push, unread
    /// counter, optional bus publish.
    ///
    /// Only caller input errors surface; every downstream collaborator
    /// failure is absorbed. The store write and the live push run
    /// concurrently so storage latency never delays delivery — a push
    /// may race ahead of durability, which the design tolerates.
    pub async fn notify(&self, event: NotifyEvent) -> AppResult<NotifyOutcome> {
        event.validate()?;

        if let Some(conversation_id) = event.conversation_id {
            if event.kind.is_suppressible()
                && self.viewers.is_viewing(conversation_id, event.target_user_id)
            {
                debug!(
                    target_user_id = %event.target_user_id,
                    conversation_id = %conversation_id,
                    "Target is viewing the conversation, suppressing"
                );
                return Ok(NotifyOutcome::Suppressed);
            }
        }

        let target = event.target_user_id;
        let group = GroupKey::User(target);
        let outbound = self.build_push(&event);
        let envelope = self.build_envelope(&event);

        let (stored, pushed) = tokio::join!(self.store.create(event.to_new_notification()), async {
            self.registry.push(&group, &outbound)
        });

        // Absolute count, recomputed after the write. Out-of-order
        // counter pushes from concurrent notify calls converge
        // client-side.
        let count = self.store.count_unread(target).await;
        self.registry
            .push(&group, &OutboundEvent::UnreadCountUpdate { count });

        if let Some(envelope) = envelope {
            self.publisher.publish(&envelope).await;
        }

        Ok(NotifyOutcome::Delivered {
            stored: stored.is_some(),
            pushed,
        })
    }

    /// Marks one notification read and pushes the fresh unread count to
    /// the user's live connections.
    pub async fn mark_read(&self, id: NotificationId, user_id: UserId) -> AppResult<bool> {
        let changed = self.store.mark_read(id, user_id).await?;
        if changed {
            self.push_unread_count(user_id).await;
        }
        Ok(changed)
    }

    /// Marks one notification handled and pushes the fresh unread count.
    pub async fn mark_handled(&self, id: NotificationId, user_id: UserId) -> AppResult<bool> {
        let changed = self.store.mark_handled(id, user_id).await?;
        if changed {
            self.push_unread_count(user_id).await;
        }
        Ok(changed)
    }

    /// Marks all of a user's notifications read and pushes the count
    /// (now zero) to every live connection.
    pub async fn mark_all_read(&self, user_id: UserId) -> AppResult<u64> {
        let affected = self.store.mark_all_read(user_id).await?;
        self.push_unread_count(user_id).await;
        Ok(affected)
    }

    /// Pushes a presence transition to each friend's personal group.
    ///
    /// The friend list is supplied by the caller; neither the registry
    /// nor the coordinator holds friend-graph knowledge.
    pub fn presence_changed(&self, change: PresenceChange, friend_ids: &[UserId]) {
        let event = OutboundEvent::PresenceChanged {
            user_id: change.user_id,
            online: change.online,
            timestamp: change.at,
        };
        for friend_id in friend_ids {
            self.registry.push(&GroupKey::User(*friend_id), &event);
        }
    }

    /// Recomputes and pushes the absolute unread count for a user.
    pub async fn push_unread_count(&self, user_id: UserId) {
        let count = self.store.count_unread(user_id).await;
        self.registry.push(
            &GroupKey::User(user_id),
            &OutboundEvent::UnreadCountUpdate { count },
        );
    }

    fn build_push(&self, event: &NotifyEvent) -> OutboundEvent {
        OutboundEvent::NewNotification {
            kind: event.kind,
            title: event.title.clone(),
            message: event.message.clone(),
            source_user_id: event.source_user_id,
            source_display_name: event.source_display_name.clone(),
            source_avatar_url: event.source_avatar_url.clone(),
            data: event.payload.to_value(),
            action_url: event.action_url.clone(),
            timestamp: Utc::now(),
        }
    }

    // Friend-graph events go out on the bus; anything else stays local.
    fn build_envelope(&self, event: &NotifyEvent) -> Option<BusEnvelope> {
        if !event.kind.is_friend_graph() || !self.publisher.is_enabled() {
            return None;
        }
        let Some(source) = event.source_user_id else {
            debug!(kind = %event.kind, "Friend-graph event without source, skipping bus publish");
            return None;
        };

        let request_id = match &event.payload {
            NotificationPayload::FriendRequest { request_id } => Some(*request_id),
            _ => None,
        };

        let friendship = match (event.kind, request_id) {
            (NotificationKind::FriendRequest, Some(request_id)) => FriendshipEvent::RequestSent {
                from_user_id: source,
                to_user_id: event.target_user_id,
                request_id,
            },
            (NotificationKind::FriendRequestAccepted, Some(request_id)) => {
                FriendshipEvent::RequestAccepted {
                    from_user_id: source,
                    to_user_id: event.target_user_id,
                    request_id,
                }
            }
            (NotificationKind::FriendRequestDeclined, Some(request_id)) => {
                FriendshipEvent::RequestDeclined {
                    from_user_id: source,
                    to_user_id: event.target_user_id,
                    request_id,
                }
            }
            (NotificationKind::FriendRemoved, _) => FriendshipEvent::FriendRemoved {
                from_user_id: source,
                to_user_id: event.target_user_id,
            },
            _ => {
                debug!(kind = %event.kind, "Friend-graph event without request id, skipping bus publish");
                return None;
            }
        };

        Some(BusEnvelope::new(friendship))
    }
}
