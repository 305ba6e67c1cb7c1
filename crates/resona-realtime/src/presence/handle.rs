//! Individual live connection handle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::warn;

use resona_core::types::id::{ConnectionId, UserId};

use crate::message::types::OutboundEvent;

/// A handle to a single live client connection.
///
/// Holds the sender half of the connection's outbound channel; whatever
/// drains the receiver half (the push transport) is outside this crate.
/// A handle belongs to exactly one user for its lifetime.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// User who owns this connection.
    pub user_id: UserId,
    /// Sender for outbound events.
    sender: mpsc::Sender<OutboundEvent>,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    /// Last client activity (connect, pong, inbound traffic).
    last_seen: tokio::sync::RwLock<DateTime<Utc>>,
    /// Whether the connection is still alive.
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new connection handle.
    pub fn new(user_id: UserId, sender: mpsc::Sender<OutboundEvent>) -> Self {
        let now = Utc::now();
        Self {
            id: ConnectionId::new(),
            user_id,
            sender,
            connected_at: now,
            last_seen: tokio::sync::RwLock::new(now),
            alive: AtomicBool::new(true),
        }
    }

    /// Send an outbound event to this connection without blocking.
    ///
    /// Returns `false` if the event was dropped (dead connection, full
    /// buffer, or closed receiver). A closed receiver marks the handle
    /// dead so the next sweep removes it.
    pub fn send(&self, event: OutboundEvent) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(conn_id = %self.id, "Connection send buffer full, dropping event");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                false
            }
        }
    }

    /// Check if the connection is alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark the connection as dead.
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Record client activity.
    pub async fn touch(&self) {
        let mut seen = self.last_seen.write().await;
        *seen = Utc::now();
    }

    /// Last recorded client activity.
    pub async fn last_seen(&self) -> DateTime<Utc> {
        *self.last_seen.read().await
    }

    /// Whether the connection has been silent longer than `timeout`
    /// seconds as of `now`.
    pub async fn is_stale(&self, now: DateTime<Utc>, timeout_seconds: u64) -> bool {
        let seen = self.last_seen().await;
        (now - seen).num_seconds() >= timeout_seconds as i64
    }
}
