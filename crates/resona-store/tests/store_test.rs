//! Lifecycle tests for the notification store over the in-memory repository.

use std::sync::Arc;

use chrono::{Duration, Utc};

use resona_core::config::notifications::NotificationsConfig;
use resona_core::error::ErrorKind;
use resona_core::types::id::{NotificationId, UserId};
use resona_core::types::pagination::PageRequest;
use resona_entity::notification::{
    NewNotification, NotificationKind, NotificationPayload, NotificationStatus,
};
use resona_store::{MemoryNotificationRepository, NotificationRepository, NotificationStore};

fn store() -> (Arc<MemoryNotificationRepository>, NotificationStore) {
    let repo = Arc::new(MemoryNotificationRepository::new());
    let store = NotificationStore::new(repo.clone(), NotificationsConfig::default());
    (repo, store)
}

fn new_notification(target: UserId, kind: NotificationKind) -> NewNotification {
    NewNotification {
        target_user_id: target,
        source_user_id: Some(UserId::new()),
        kind,
        title: "Test".to_string(),
        message: "Test message".to_string(),
        payload: NotificationPayload::Empty,
        action_url: None,
    }
}

#[tokio::test]
async fn test_friend_request_gets_thirty_day_expiry() {
    let (_, store) = store();
    let target = UserId::new();

    let record = store
        .create(new_notification(target, NotificationKind::FriendRequest))
        .await
        .expect("create should succeed");

    let expires_at = record.expires_at.expect("friend request must expire");
    assert_eq!(expires_at, record.created_at + Duration::days(30));
}

#[tokio::test]
async fn test_other_kinds_never_expire() {
    let (_, store) = store();
    let target = UserId::new();

    for kind in [
        NotificationKind::FriendRequestAccepted,
        NotificationKind::FriendRequestDeclined,
        NotificationKind::FriendRemoved,
        NotificationKind::Message,
        NotificationKind::Other,
    ] {
        let record = store
            .create(new_notification(target, kind))
            .await
            .expect("create should succeed");
        assert!(record.expires_at.is_none(), "kind {kind} must not expire");
    }
}

#[tokio::test]
async fn test_mark_read_is_idempotent() {
    let (repo, store) = store();
    let target = UserId::new();

    let record = store
        .create(new_notification(target, NotificationKind::Message))
        .await
        .unwrap();

    assert!(store.mark_read(record.id, target).await.unwrap());
    let first = repo.find_by_id(record.id).await.unwrap().unwrap();
    assert_eq!(first.status, NotificationStatus::Read);
    let read_at = first.read_at.expect("read_at set on transition");

    // Second call is a no-op and does not touch read_at.
    assert!(!store.mark_read(record.id, target).await.unwrap());
    let second = repo.find_by_id(record.id).await.unwrap().unwrap();
    assert_eq!(second.read_at, Some(read_at));
    assert_eq!(second.status, NotificationStatus::Read);
}

#[tokio::test]
async fn test_mark_handled_is_terminal() {
    let (repo, store) = store();
    let target = UserId::new();

    let record = store
        .create(new_notification(target, NotificationKind::FriendRequest))
        .await
        .unwrap();

    assert!(store.mark_handled(record.id, target).await.unwrap());
    let handled = repo.find_by_id(record.id).await.unwrap().unwrap();
    let handled_at = handled.handled_at.expect("handled_at set on transition");

    // Neither mark_read nor a second mark_handled changes anything.
    assert!(!store.mark_read(record.id, target).await.unwrap());
    assert!(!store.mark_handled(record.id, target).await.unwrap());

    let after = repo.find_by_id(record.id).await.unwrap().unwrap();
    assert_eq!(after.status, NotificationStatus::Handled);
    assert_eq!(after.handled_at, Some(handled_at));
    assert!(after.read_at.is_none());
}

#[tokio::test]
async fn test_mark_handled_allowed_from_read() {
    let (repo, store) = store();
    let target = UserId::new();

    let record = store
        .create(new_notification(target, NotificationKind::Message))
        .await
        .unwrap();

    assert!(store.mark_read(record.id, target).await.unwrap());
    assert!(store.mark_handled(record.id, target).await.unwrap());

    let after = repo.find_by_id(record.id).await.unwrap().unwrap();
    assert_eq!(after.status, NotificationStatus::Handled);
}

#[tokio::test]
async fn test_foreign_record_reads_as_not_found() {
    let (_, store) = store();
    let owner = UserId::new();
    let intruder = UserId::new();

    let record = store
        .create(new_notification(owner, NotificationKind::Message))
        .await
        .unwrap();

    let err = store.mark_read(record.id, intruder).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = store.mark_handled(record.id, intruder).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    // Same outcome as a record that never existed.
    let err = store
        .mark_read(NotificationId::new(), intruder)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_count_unread_excludes_expired() {
    let (repo, store) = store();
    let target = UserId::new();

    store
        .create(new_notification(target, NotificationKind::Message))
        .await
        .unwrap();

    // Inject an already-expired record directly.
    let expired = new_notification(target, NotificationKind::FriendRequest).into_record(
        NotificationId::new(),
        Utc::now() - Duration::days(31),
        Some(Utc::now() - Duration::days(1)),
    );
    repo.insert(&expired).await.unwrap();

    assert_eq!(store.count_unread(target).await, 1);

    let page = store
        .list_for_user(target, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn test_mark_all_read_returns_affected_count() {
    let (_, store) = store();
    let target = UserId::new();
    let bystander = UserId::new();

    for _ in 0..3 {
        store
            .create(new_notification(target, NotificationKind::Message))
            .await
            .unwrap();
    }
    store
        .create(new_notification(bystander, NotificationKind::Message))
        .await
        .unwrap();

    assert_eq!(store.mark_all_read(target).await.unwrap(), 3);
    assert_eq!(store.count_unread(target).await, 0);
    // The bystander's notification is untouched.
    assert_eq!(store.count_unread(bystander).await, 1);
    // Re-running affects nothing.
    assert_eq!(store.mark_all_read(target).await.unwrap(), 0);
}

#[tokio::test]
async fn test_list_pagination_newest_first() {
    let (repo, store) = store();
    let target = UserId::new();

    let base = Utc::now();
    for i in 0..5 {
        let record = new_notification(target, NotificationKind::Message).into_record(
            NotificationId::new(),
            base - Duration::minutes(i),
            None,
        );
        repo.insert(&record).await.unwrap();
    }

    let first = store
        .list_for_user(target, &PageRequest::new(2, 0))
        .await
        .unwrap();
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.total, 5);
    assert!(first.has_more());
    assert_eq!(first.items[0].created_at, base);

    let second = store
        .list_for_user(target, &PageRequest::new(2, 2))
        .await
        .unwrap();
    assert_eq!(second.items.len(), 2);
    assert!(second.items[0].created_at < first.items[1].created_at);
}

#[tokio::test]
async fn test_cleanup_deletes_only_old_handled() {
    let (repo, store) = store();
    let target = UserId::new();

    // Old and handled: swept.
    let mut old_handled = new_notification(target, NotificationKind::FriendRequest).into_record(
        NotificationId::new(),
        Utc::now() - Duration::days(60),
        None,
    );
    old_handled.status = NotificationStatus::Handled;
    old_handled.handled_at = Some(Utc::now() - Duration::days(59));
    repo.insert(&old_handled).await.unwrap();

    // Old but unread: kept.
    let old_unread = new_notification(target, NotificationKind::Message).into_record(
        NotificationId::new(),
        Utc::now() - Duration::days(60),
        None,
    );
    repo.insert(&old_unread).await.unwrap();

    // Recent and handled: kept.
    let mut recent_handled = new_notification(target, NotificationKind::Message).into_record(
        NotificationId::new(),
        Utc::now() - Duration::days(2),
        None,
    );
    recent_handled.status = NotificationStatus::Handled;
    repo.insert(&recent_handled).await.unwrap();

    let deleted = store.cleanup_expired_handled(target, 30).await.unwrap();
    assert_eq!(deleted, 1);
    assert!(repo.find_by_id(old_handled.id).await.unwrap().is_none());
    assert!(repo.find_by_id(old_unread.id).await.unwrap().is_some());
    assert!(repo.find_by_id(recent_handled.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_trim_keeps_newest() {
    let repo = Arc::new(MemoryNotificationRepository::new());
    let config = NotificationsConfig {
        max_stored_per_user: 2,
        ..Default::default()
    };
    let store = NotificationStore::new(repo.clone(), config);
    let target = UserId::new();

    let base = Utc::now();
    let mut ids = Vec::new();
    for i in 0..4 {
        let record = new_notification(target, NotificationKind::Message).into_record(
            NotificationId::new(),
            base - Duration::minutes(i),
            None,
        );
        ids.push(record.id);
        repo.insert(&record).await.unwrap();
    }

    assert_eq!(store.trim_for_user(target).await.unwrap(), 2);
    // The two newest survive.
    assert!(repo.find_by_id(ids[0]).await.unwrap().is_some());
    assert!(repo.find_by_id(ids[1]).await.unwrap().is_some());
    assert!(repo.find_by_id(ids[2]).await.unwrap().is_none());
    assert!(repo.find_by_id(ids[3]).await.unwrap().is_none());
}
