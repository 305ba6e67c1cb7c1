//! End-to-end fan-out scenarios over the in-memory repository.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use resona_core::config::AppConfig;
use resona_core::config::logging::LoggingConfig;
use resona_core::error::{AppError, ErrorKind};
use resona_core::result::AppResult;
use resona_core::types::id::{ConversationId, NotificationId, UserId};
use resona_core::types::pagination::{PageRequest, PageResponse};
use resona_entity::notification::{NotificationKind, NotificationRecord, NotificationStatus};
use resona_realtime::bus::publisher::BusTransport;
use resona_realtime::fanout::{NotifyEvent, NotifyOutcome};
use resona_realtime::message::OutboundEvent;
use resona_realtime::{FriendDirectory, NotifyEngine, OutboundPublisher};
use resona_store::{MemoryNotificationRepository, NotificationRepository};

struct StaticDirectory(Vec<UserId>);

#[async_trait]
impl FriendDirectory for StaticDirectory {
    async fn friend_ids(&self, _user_id: UserId) -> Vec<UserId> {
        self.0.clone()
    }
}

#[derive(Default)]
struct RecordingTransport {
    published: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl BusTransport for RecordingTransport {
    async fn publish(&self, topic: &str, payload: &str) -> AppResult<()> {
        self.published
            .lock()
            .unwrap()
            .push((topic.to_string(), payload.to_string()));
        Ok(())
    }
}

struct FailingTransport;

#[async_trait]
impl BusTransport for FailingTransport {
    async fn publish(&self, _topic: &str, _payload: &str) -> AppResult<()> {
        Err(AppError::bus("Bus unavailable"))
    }
}

/// A repository where every operation fails, simulating a store outage.
struct FailingRepository;

#[async_trait]
impl NotificationRepository for FailingRepository {
    async fn insert(&self, _record: &NotificationRecord) -> AppResult<()> {
        Err(AppError::store("Store unavailable"))
    }
    async fn find_by_id(&self, _id: NotificationId) -> AppResult<Option<NotificationRecord>> {
        Err(AppError::store("Store unavailable"))
    }
    async fn find_active_by_user(
        &self,
        _user_id: UserId,
        _now: DateTime<Utc>,
        _page: &PageRequest,
    ) -> AppResult<PageResponse<NotificationRecord>> {
        Err(AppError::store("Store unavailable"))
    }
    async fn count_unread(&self, _user_id: UserId, _now: DateTime<Utc>) -> AppResult<i64> {
        Err(AppError::store("Store unavailable"))
    }
    async fn mark_read(
        &self,
        _id: NotificationId,
        _user_id: UserId,
        _read_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        Err(AppError::store("Store unavailable"))
    }
    async fn mark_handled(
        &self,
        _id: NotificationId,
        _user_id: UserId,
        _handled_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        Err(AppError::store("Store unavailable"))
    }
    async fn mark_all_read(&self, _user_id: UserId, _read_at: DateTime<Utc>) -> AppResult<u64> {
        Err(AppError::store("Store unavailable"))
    }
    async fn delete_handled_before(
        &self,
        _user_id: UserId,
        _cutoff: DateTime<Utc>,
    ) -> AppResult<u64> {
        Err(AppError::store("Store unavailable"))
    }
    async fn trim_per_user(&self, _user_id: UserId, _keep: u64) -> AppResult<u64> {
        Err(AppError::store("Store unavailable"))
    }
}

fn engine() -> (Arc<MemoryNotificationRepository>, NotifyEngine) {
    resona_core::logging::init(&LoggingConfig::default());
    let repo = Arc::new(MemoryNotificationRepository::new());
    let engine = NotifyEngine::with_publisher(
        AppConfig::default(),
        repo.clone(),
        OutboundPublisher::disabled(),
    );
    (repo, engine)
}

fn engine_with_transport(transport: Arc<dyn BusTransport>) -> NotifyEngine {
    resona_core::logging::init(&LoggingConfig::default());
    let repo = Arc::new(MemoryNotificationRepository::new());
    NotifyEngine::with_publisher(
        AppConfig::default(),
        repo,
        OutboundPublisher::new(transport, "resona"),
    )
}

/// Scenario A: friend request to an offline user persists and waits.
#[tokio::test]
async fn test_offline_target_gets_durable_record_only() {
    let (repo, engine) = engine();
    let x = UserId::new();
    let y = UserId::new();

    let event = NotifyEvent::friend_request(y, x, "X", Uuid::new_v4());
    let outcome = engine.coordinator.notify(event).await.unwrap();

    assert_eq!(
        outcome,
        NotifyOutcome::Delivered {
            stored: true,
            pushed: 0
        }
    );
    assert_eq!(repo.len(), 1);

    let page = engine
        .store
        .list_for_user(y, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].kind, NotificationKind::FriendRequest);
    assert_eq!(page.items[0].status, NotificationStatus::Unread);
    assert_eq!(page.items[0].target_user_id, y);

    // When Y later connects, the unread count is waiting.
    assert_eq!(engine.store.count_unread(y).await, 1);
}

/// Scenario B: an active viewer gets neither a record nor a push.
#[tokio::test]
async fn test_active_viewer_suppresses_everything() {
    let (repo, engine) = engine();
    let x = UserId::new();
    let y = UserId::new();
    let conv = ConversationId::new();

    let (_handle, mut rx) = engine.connect(y, &[]).await;
    engine.viewers.enter(conv, y);

    let event = NotifyEvent::chat_message(y, x, "X", conv, Uuid::new_v4(), "hey");
    let outcome = engine.coordinator.notify(event).await.unwrap();

    assert_eq!(outcome, NotifyOutcome::Suppressed);
    assert_eq!(repo.len(), 0);
    assert!(rx.try_recv().is_err(), "no push of any kind");
    assert_eq!(engine.store.count_unread(y).await, 0);
}

/// Scenario C: a live, non-viewing target gets record + both pushes on
/// every connection, notification before counter.
#[tokio::test]
async fn test_live_target_gets_record_and_ordered_pushes() {
    let (repo, engine) = engine();
    let x = UserId::new();
    let y = UserId::new();
    let conv = ConversationId::new();

    let (_c1, mut rx1) = engine.connect(y, &[]).await;
    let (_c2, mut rx2) = engine.connect(y, &[]).await;

    let event = NotifyEvent::chat_message(y, x, "X", conv, Uuid::new_v4(), "hey");
    let outcome = engine.coordinator.notify(event).await.unwrap();

    assert_eq!(
        outcome,
        NotifyOutcome::Delivered {
            stored: true,
            pushed: 2
        }
    );
    assert_eq!(repo.len(), 1);

    for rx in [&mut rx1, &mut rx2] {
        match rx.try_recv().unwrap() {
            OutboundEvent::NewNotification {
                kind,
                source_user_id,
                data,
                ..
            } => {
                assert_eq!(kind, NotificationKind::Message);
                assert_eq!(source_user_id, Some(x));
                let data = data.expect("message payload present");
                assert_eq!(
                    data.get("conversation_id").unwrap().as_str().unwrap(),
                    conv.to_string()
                );
            }
            other => panic!("expected notification first, got {other:?}"),
        }
        match rx.try_recv().unwrap() {
            OutboundEvent::UnreadCountUpdate { count } => assert_eq!(count, 1),
            other => panic!("expected counter second, got {other:?}"),
        }
    }
}

/// Suppression lifts as soon as the viewer leaves.
#[tokio::test]
async fn test_suppression_lifts_after_leave() {
    let (repo, engine) = engine();
    let x = UserId::new();
    let y = UserId::new();
    let conv = ConversationId::new();

    let (_handle, mut rx) = engine.connect(y, &[]).await;
    engine.viewers.enter(conv, y);

    let event = NotifyEvent::chat_message(y, x, "X", conv, Uuid::new_v4(), "hey");
    let outcome = engine.coordinator.notify(event.clone()).await.unwrap();
    assert_eq!(outcome, NotifyOutcome::Suppressed);

    engine.viewers.leave(conv, y);
    let outcome = engine.coordinator.notify(event).await.unwrap();
    assert_eq!(
        outcome,
        NotifyOutcome::Delivered {
            stored: true,
            pushed: 1
        }
    );
    assert_eq!(repo.len(), 1);
    assert!(matches!(
        rx.try_recv().unwrap(),
        OutboundEvent::NewNotification { .. }
    ));
}

/// Suppression applies to messages only; other kinds go through even
/// while the target is viewing a conversation.
#[tokio::test]
async fn test_non_message_kinds_are_never_suppressed() {
    let (_repo, engine) = engine();
    let x = UserId::new();
    let y = UserId::new();
    let conv = ConversationId::new();

    let (_handle, _rx) = engine.connect(y, &[]).await;
    engine.viewers.enter(conv, y);

    // Even with a conversation id attached, a non-message kind goes out.
    let mut event = NotifyEvent::friend_request(y, x, "X", Uuid::new_v4());
    event.conversation_id = Some(conv);
    let outcome = engine.coordinator.notify(event).await.unwrap();
    assert!(matches!(outcome, NotifyOutcome::Delivered { .. }));
}

/// Scenario D: mark-all-read zeroes the counter on every live connection.
#[tokio::test]
async fn test_mark_all_read_pushes_zero_counter() {
    let (_repo, engine) = engine();
    let x = UserId::new();
    let y = UserId::new();

    for _ in 0..3 {
        let event = NotifyEvent::friend_request(y, x, "X", Uuid::new_v4());
        engine.coordinator.notify(event).await.unwrap();
    }

    let (_c1, mut rx1) = engine.connect(y, &[]).await;
    let (_c2, mut rx2) = engine.connect(y, &[]).await;

    let affected = engine.coordinator.mark_all_read(y).await.unwrap();
    assert_eq!(affected, 3);
    assert_eq!(engine.store.count_unread(y).await, 0);

    for rx in [&mut rx1, &mut rx2] {
        match rx.try_recv().unwrap() {
            OutboundEvent::UnreadCountUpdate { count } => assert_eq!(count, 0),
            other => panic!("expected counter push, got {other:?}"),
        }
    }
}

/// Marking a single notification read refreshes the counter.
#[tokio::test]
async fn test_mark_read_pushes_fresh_counter() {
    let (_repo, engine) = engine();
    let x = UserId::new();
    let y = UserId::new();

    let event = NotifyEvent::friend_request(y, x, "X", Uuid::new_v4());
    engine.coordinator.notify(event).await.unwrap();

    let (_handle, mut rx) = engine.connect(y, &[]).await;

    let page = engine
        .store
        .list_for_user(y, &PageRequest::default())
        .await
        .unwrap();
    let id = page.items[0].id;

    assert!(engine.coordinator.mark_read(id, y).await.unwrap());
    match rx.try_recv().unwrap() {
        OutboundEvent::UnreadCountUpdate { count } => assert_eq!(count, 0),
        other => panic!("expected counter push, got {other:?}"),
    }

    // Re-marking is a no-op and pushes nothing.
    assert!(!engine.coordinator.mark_read(id, y).await.unwrap());
    assert!(rx.try_recv().is_err());
}

/// A store outage never blocks live delivery.
#[tokio::test]
async fn test_store_outage_degrades_to_live_push() {
    resona_core::logging::init(&LoggingConfig::default());
    let engine = NotifyEngine::with_publisher(
        AppConfig::default(),
        Arc::new(FailingRepository),
        OutboundPublisher::disabled(),
    );
    let x = UserId::new();
    let y = UserId::new();

    let (_handle, mut rx) = engine.connect(y, &[]).await;

    let event = NotifyEvent::friend_request(y, x, "X", Uuid::new_v4());
    let outcome = engine.coordinator.notify(event).await.unwrap();

    assert_eq!(
        outcome,
        NotifyOutcome::Delivered {
            stored: false,
            pushed: 1
        }
    );
    assert!(matches!(
        rx.try_recv().unwrap(),
        OutboundEvent::NewNotification { .. }
    ));
    // The counter degrades to zero rather than aborting the fan-out.
    assert!(matches!(
        rx.try_recv().unwrap(),
        OutboundEvent::UnreadCountUpdate { count: 0 }
    ));
}

/// Friend-graph events go out on the bus with a correlation id.
#[tokio::test]
async fn test_friend_events_published_to_bus() {
    let transport = Arc::new(RecordingTransport::default());
    let engine = engine_with_transport(transport.clone());
    let x = UserId::new();
    let y = UserId::new();

    let event = NotifyEvent::friend_request(y, x, "X", Uuid::new_v4());
    engine.coordinator.notify(event).await.unwrap();

    let published = transport.published.lock().unwrap();
    assert_eq!(published.len(), 1);
    let (topic, payload) = &published[0];
    assert_eq!(topic, "resona:friendship");

    let envelope: serde_json::Value = serde_json::from_str(payload).unwrap();
    assert!(envelope.get("event_id").is_some(), "correlation id present");
    assert_eq!(
        envelope
            .get("event")
            .and_then(|e| e.get("type"))
            .and_then(|t| t.as_str()),
        Some("request_sent")
    );
}

/// Message events stay off the bus.
#[tokio::test]
async fn test_message_events_stay_off_the_bus() {
    let transport = Arc::new(RecordingTransport::default());
    let engine = engine_with_transport(transport.clone());
    let x = UserId::new();
    let y = UserId::new();

    let event = NotifyEvent::chat_message(y, x, "X", ConversationId::new(), Uuid::new_v4(), "hey");
    engine.coordinator.notify(event).await.unwrap();

    assert!(transport.published.lock().unwrap().is_empty());
}

/// Bus failures are swallowed; the fan-out still succeeds.
#[tokio::test]
async fn test_bus_failure_never_propagates() {
    let engine = engine_with_transport(Arc::new(FailingTransport));
    let x = UserId::new();
    let y = UserId::new();

    let (_handle, mut rx) = engine.connect(y, &[]).await;

    let event = NotifyEvent::friend_request(y, x, "X", Uuid::new_v4());
    let outcome = engine.coordinator.notify(event).await.unwrap();

    assert_eq!(
        outcome,
        NotifyOutcome::Delivered {
            stored: true,
            pushed: 1
        }
    );
    assert!(matches!(
        rx.try_recv().unwrap(),
        OutboundEvent::NewNotification { .. }
    ));
}

/// Caller input errors are the only ones that surface.
#[tokio::test]
async fn test_malformed_event_is_rejected() {
    let (_repo, engine) = engine();
    let y = UserId::new();

    let mut event = NotifyEvent::friend_request(y, UserId::new(), "X", Uuid::new_v4());
    event.title = "  ".to_string();
    let err = engine.coordinator.notify(event).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let mut event = NotifyEvent::chat_message(
        y,
        UserId::new(),
        "X",
        ConversationId::new(),
        Uuid::new_v4(),
        "hey",
    );
    event.conversation_id = None;
    let err = engine.coordinator.notify(event).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

/// Presence transitions reach friends' live connections.
#[tokio::test]
async fn test_presence_fans_out_to_friends() {
    let (_repo, engine) = engine();
    let user = UserId::new();
    let friend = UserId::new();

    let (_f, mut friend_rx) = engine.connect(friend, &[]).await;

    let (handle, _rx) = engine.connect(user, &[friend]).await;
    match friend_rx.try_recv().unwrap() {
        OutboundEvent::PresenceChanged {
            user_id, online, ..
        } => {
            assert_eq!(user_id, user);
            assert!(online);
        }
        other => panic!("expected presence change, got {other:?}"),
    }

    engine.disconnect(handle.id, &[friend]).await;
    match friend_rx.try_recv().unwrap() {
        OutboundEvent::PresenceChanged {
            user_id, online, ..
        } => {
            assert_eq!(user_id, user);
            assert!(!online);
        }
        other => panic!("expected presence change, got {other:?}"),
    }
}

/// A full disconnect clears the user from every conversation view.
#[tokio::test]
async fn test_disconnect_clears_viewer_state() {
    let (repo, engine) = engine();
    let x = UserId::new();
    let y = UserId::new();
    let conv = ConversationId::new();

    let (handle, _rx) = engine.connect(y, &[]).await;
    engine.viewers.enter(conv, y);

    engine.disconnect(handle.id, &[]).await;
    assert!(!engine.viewers.is_viewing(conv, y));

    // With the view gone, the next message is no longer suppressed.
    let event = NotifyEvent::chat_message(y, x, "X", conv, Uuid::new_v4(), "hey");
    let outcome = engine.coordinator.notify(event).await.unwrap();
    assert_eq!(
        outcome,
        NotifyOutcome::Delivered {
            stored: true,
            pushed: 0
        }
    );
    assert_eq!(repo.len(), 1);
}

/// The liveness sweep tears down silent connections end to end.
#[tokio::test]
async fn test_liveness_sweep_task() {
    resona_core::logging::init(&LoggingConfig::default());
    let repo = Arc::new(MemoryNotificationRepository::new());
    let mut config = AppConfig::default();
    config.realtime.client_timeout_seconds = 0;
    let engine = NotifyEngine::with_publisher(config, repo, OutboundPublisher::disabled());

    let user = UserId::new();
    let conv = ConversationId::new();
    let (_handle, _rx) = engine.connect(user, &[]).await;
    engine.viewers.enter(conv, user);

    let sweep = engine.start_liveness_sweep(Arc::new(StaticDirectory(Vec::new())));
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    assert!(!engine.registry.is_online(user));
    assert!(!engine.viewers.is_viewing(conv, user));

    engine.shutdown().await;
    let _ = sweep.await;
}
