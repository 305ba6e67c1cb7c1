//! Presence registry — connection lifecycle, group push, online state.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use resona_core::config::realtime::RealtimeConfig;
use resona_core::types::id::{ConnectionId, UserId};
use resona_entity::presence::PresenceChange;

use crate::message::types::OutboundEvent;

use super::group::{GroupKey, GroupRegistry};
use super::handle::ConnectionHandle;
use super::pool::ConnectionPool;

/// Result of tearing down a connection.
#[derive(Debug)]
pub struct DisconnectOutcome {
    /// The user the connection belonged to.
    pub user_id: UserId,
    /// Set when this was the user's last connection.
    pub change: Option<PresenceChange>,
}

/// Owns connection-to-group mappings and the online set.
///
/// All operations are non-blocking, lock-striped, in-memory updates;
/// nothing here performs I/O. The registry holds no friend-graph
/// knowledge — presence fan-out to friends is the caller's job, driven
/// by the [`PresenceChange`] values returned here.
#[derive(Debug)]
pub struct PresenceRegistry {
    pool: ConnectionPool,
    groups: GroupRegistry,
    config: RealtimeConfig,
}

impl PresenceRegistry {
    /// Creates a new registry.
    pub fn new(config: RealtimeConfig) -> Self {
        Self {
            pool: ConnectionPool::new(),
            groups: GroupRegistry::new(),
            config,
        }
    }

    /// Registers a connection for an authenticated user.
    ///
    /// Returns the handle, the receiver the push transport must drain,
    /// and the presence transition if this was the user's first live
    /// connection. A user at the connection cap has their oldest
    /// connection evicted first.
    pub fn connect(
        &self,
        user_id: UserId,
    ) -> (
        Arc<ConnectionHandle>,
        mpsc::Receiver<OutboundEvent>,
        Option<PresenceChange>,
    ) {
        let went_online = !self.pool.has_connections(user_id);

        let existing = self.pool.user_connections(user_id);
        if existing.len() >= self.config.max_connections_per_user {
            if let Some(oldest) = existing.first() {
                warn!(
                    user_id = %user_id,
                    conn_id = %oldest.id,
                    max = self.config.max_connections_per_user,
                    "User at max connections, evicting oldest"
                );
                oldest.mark_dead();
                self.remove(oldest.id);
            }
        }

        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);
        let handle = Arc::new(ConnectionHandle::new(user_id, tx));

        self.pool.add(handle.clone());
        self.groups.join(&GroupKey::User(user_id), handle.id);
        self.groups.join(&GroupKey::Online, handle.id);

        info!(conn_id = %handle.id, user_id = %user_id, "Connection registered");

        let change = went_online.then(|| PresenceChange::online(user_id));
        (handle, rx, change)
    }

    /// Unregisters a connection and cleans up every group membership.
    ///
    /// Idempotent: a connection that never finished registering, or was
    /// already removed, is a safe no-op. Returns the owning user and the
    /// presence transition when the user's last connection closed.
    pub fn disconnect(&self, conn_id: ConnectionId) -> Option<DisconnectOutcome> {
        let handle = self.remove(conn_id)?;
        let user_id = handle.user_id;

        let change = if self.pool.has_connections(user_id) {
            None
        } else {
            Some(PresenceChange::offline(user_id))
        };

        info!(conn_id = %conn_id, user_id = %user_id, "Connection unregistered");
        Some(DisconnectOutcome { user_id, change })
    }

    /// Delivers an event to every live connection in a group.
    ///
    /// Connections that are not live simply do not receive it; the
    /// notification store is the durability mechanism, not this
    /// registry. Per-connection failures are swallowed. Returns the
    /// number of connections the event was handed to.
    pub fn push(&self, group: &GroupKey, event: &OutboundEvent) -> usize {
        let mut delivered = 0;
        for conn_id in self.groups.members(group) {
            if let Some(handle) = self.pool.get(conn_id) {
                if handle.send(event.clone()) {
                    delivered += 1;
                } else {
                    debug!(conn_id = %conn_id, group = %group, "Push skipped dead connection");
                }
            }
        }
        delivered
    }

    /// Whether the user has at least one live connection.
    pub fn is_online(&self, user_id: UserId) -> bool {
        self.pool.has_connections(user_id)
    }

    /// All currently online user IDs.
    pub fn online_user_ids(&self) -> Vec<UserId> {
        self.pool.connected_user_ids()
    }

    /// Number of unique online users.
    pub fn online_count(&self) -> usize {
        self.pool.user_count()
    }

    /// Total live connection count.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Records client activity on a connection (pong, inbound traffic).
    pub async fn record_activity(&self, conn_id: ConnectionId) {
        if let Some(handle) = self.pool.get(conn_id) {
            handle.touch().await;
        }
    }

    /// Pings every live connection and tears down those that have been
    /// silent past the client timeout or are already marked dead.
    ///
    /// Returns the presence transitions produced by the teardowns.
    pub async fn sweep_stale(&self) -> Vec<PresenceChange> {
        let now = Utc::now();
        let timeout = self.config.client_timeout_seconds;
        let mut changes = Vec::new();

        for handle in self.pool.all_connections() {
            if handle.is_alive() && !handle.is_stale(now, timeout).await {
                handle.send(OutboundEvent::ping());
                continue;
            }

            debug!(conn_id = %handle.id, user_id = %handle.user_id, "Sweeping stale connection");
            handle.mark_dead();
            if let Some(outcome) = self.disconnect(handle.id) {
                if let Some(change) = outcome.change {
                    changes.push(change);
                }
            }
        }

        changes
    }

    /// Tears down every connection (process shutdown). Returns the
    /// presence transitions produced.
    pub fn disconnect_all(&self) -> Vec<PresenceChange> {
        let mut changes = Vec::new();
        for handle in self.pool.all_connections() {
            if let Some(outcome) = self.disconnect(handle.id) {
                if let Some(change) = outcome.change {
                    changes.push(change);
                }
            }
        }
        changes
    }

    fn remove(&self, conn_id: ConnectionId) -> Option<Arc<ConnectionHandle>> {
        let handle = self.pool.remove(conn_id)?;
        handle.mark_dead();
        self.groups.leave_all(conn_id);
        Some(handle)
    }
}
