//! Friend-graph domain events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::id::UserId;

/// Events related to friend-graph changes, published for other services.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FriendshipEvent {
    /// A friend request was sent.
    RequestSent {
        /// The requesting user.
        from_user_id: UserId,
        /// The requested user.
        to_user_id: UserId,
        /// The friend-request record id.
        request_id: Uuid,
    },
    /// A friend request was accepted.
    RequestAccepted {
        /// The user who accepted.
        from_user_id: UserId,
        /// The original requester.
        to_user_id: UserId,
        /// The friend-request record id.
        request_id: Uuid,
    },
    /// A friend request was declined.
    RequestDeclined {
        /// The user who declined.
        from_user_id: UserId,
        /// The original requester.
        to_user_id: UserId,
        /// The friend-request record id.
        request_id: Uuid,
    },
    /// An existing friendship was removed.
    FriendRemoved {
        /// The user who removed the friendship.
        from_user_id: UserId,
        /// The removed friend.
        to_user_id: UserId,
    },
}
