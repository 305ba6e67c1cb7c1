//! Top-level engine that ties the fan-out subsystems together.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::info;

use resona_core::config::AppConfig;
use resona_core::config::realtime::RealtimeConfig;
use resona_core::types::id::{ConnectionId, UserId};
use resona_store::{NotificationRepository, NotificationStore};

use crate::bus::publisher::OutboundPublisher;
use crate::fanout::coordinator::FanoutCoordinator;
use crate::message::types::OutboundEvent;
use crate::presence::handle::ConnectionHandle;
use crate::presence::registry::PresenceRegistry;
use crate::viewer::tracker::ActiveViewerTracker;

/// Supplies the friend-id list for presence fan-out.
///
/// The friend graph lives outside this crate; the engine only ever asks
/// "who should hear about this user's presence".
#[async_trait]
pub trait FriendDirectory: Send + Sync + 'static {
    /// The user ids that should receive presence changes for `user_id`.
    async fn friend_ids(&self, user_id: UserId) -> Vec<UserId>;
}

/// Central engine owning the presence registry, viewer tracker,
/// notification store, and fan-out coordinator.
///
/// Construct one per process (or per test); there is no ambient global
/// state anywhere in the crate.
#[derive(Clone)]
pub struct NotifyEngine {
    /// Presence registry.
    pub registry: Arc<PresenceRegistry>,
    /// Active-viewer tracker.
    pub viewers: Arc<ActiveViewerTracker>,
    /// Notification lifecycle store.
    pub store: NotificationStore,
    /// Fan-out coordinator.
    pub coordinator: Arc<FanoutCoordinator>,
    realtime_config: RealtimeConfig,
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for NotifyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyEngine").finish()
    }
}

impl NotifyEngine {
    /// Creates an engine with the publisher derived from configuration.
    pub fn new(config: AppConfig, repo: Arc<dyn NotificationRepository>) -> Self {
        let publisher = OutboundPublisher::from_config(&config.bus);
        Self::with_publisher(config, repo, publisher)
    }

    /// Creates an engine with an explicit outbound publisher (tests
    /// inject their own transport here).
    pub fn with_publisher(
        config: AppConfig,
        repo: Arc<dyn NotificationRepository>,
        publisher: OutboundPublisher,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let registry = Arc::new(PresenceRegistry::new(config.realtime.clone()));
        let viewers = Arc::new(ActiveViewerTracker::new());
        let store = NotificationStore::new(repo, config.notifications.clone());
        let coordinator = Arc::new(FanoutCoordinator::new(
            store.clone(),
            registry.clone(),
            viewers.clone(),
            Arc::new(publisher),
        ));

        info!("Notify engine initialized");

        Self {
            registry,
            viewers,
            store,
            coordinator,
            realtime_config: config.realtime,
            shutdown_tx,
        }
    }

    /// Registers a connection for an authenticated user and fans the
    /// presence change out to the supplied friend list.
    ///
    /// The returned receiver must be drained by the push transport.
    pub async fn connect(
        &self,
        user_id: UserId,
        friend_ids: &[UserId],
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<OutboundEvent>) {
        let (handle, rx, change) = self.registry.connect(user_id);
        if let Some(change) = change {
            self.coordinator.presence_changed(change, friend_ids);
        }
        (handle, rx)
    }

    /// Unconditionally tears down a connection.
    ///
    /// Runs even after an abnormal close and no-ops for a connection
    /// that never finished registering. When the user's last connection
    /// closed, the user is removed from every conversation view and the
    /// offline transition is fanned out to the friend list.
    pub async fn disconnect(&self, conn_id: ConnectionId, friend_ids: &[UserId]) {
        let Some(outcome) = self.registry.disconnect(conn_id) else {
            return;
        };
        if let Some(change) = outcome.change {
            self.viewers.leave_all(outcome.user_id);
            self.coordinator.presence_changed(change, friend_ids);
        }
    }

    /// Spawns the periodic keepalive/liveness sweep.
    ///
    /// Each tick pings live connections and tears down those silent past
    /// the client timeout, fanning the resulting offline transitions out
    /// via the friend directory. The task stops on shutdown.
    pub fn start_liveness_sweep(&self, friends: Arc<dyn FriendDirectory>) -> JoinHandle<()> {
        let registry = self.registry.clone();
        let viewers = self.viewers.clone();
        let coordinator = self.coordinator.clone();
        let interval = Duration::from_secs(self.realtime_config.ping_interval_seconds);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    _ = ticker.tick() => {
                        for change in registry.sweep_stale().await {
                            viewers.leave_all(change.user_id);
                            let friend_ids = friends.friend_ids(change.user_id).await;
                            coordinator.presence_changed(change, &friend_ids);
                        }
                    }
                }
            }
        })
    }

    /// Returns a shutdown receiver for graceful shutdown coordination.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Initiates a graceful shutdown: stops background tasks and tears
    /// down every connection.
    pub async fn shutdown(&self) {
        info!("Shutting down notify engine");
        let _ = self.shutdown_tx.send(());
        let closed = self.registry.disconnect_all();
        info!(count = closed.len(), "Notify engine shut down");
    }
}
