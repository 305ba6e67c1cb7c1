//! Notification lifecycle store.
//!
//! Layers the expiry policy, status state machine, ownership checks, and
//! best-effort failure semantics over a [`NotificationRepository`]. This
//! is the single writer of notification status; nothing else mutates a
//! record.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{error, warn};

use resona_core::config::notifications::NotificationsConfig;
use resona_core::error::AppError;
use resona_core::result::AppResult;
use resona_core::types::id::{NotificationId, UserId};
use resona_core::types::pagination::{PageRequest, PageResponse};
use resona_entity::notification::{NewNotification, NotificationKind, NotificationRecord};

use crate::repository::NotificationRepository;

/// Lifecycle operations over stored notifications.
#[derive(Clone)]
pub struct NotificationStore {
    repo: Arc<dyn NotificationRepository>,
    config: NotificationsConfig,
}

impl std::fmt::Debug for NotificationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationStore").finish()
    }
}

impl NotificationStore {
    /// Creates a new store over the given repository.
    pub fn new(repo: Arc<dyn NotificationRepository>, config: NotificationsConfig) -> Self {
        Self { repo, config }
    }

    /// Persists a new notification, assigning id, creation time, and
    /// expiry per the kind policy.
    ///
    /// Never fails: a repository error is logged and `None` is returned so
    /// the caller can still push the live copy from in-hand data.
    pub async fn create(&self, new: NewNotification) -> Option<NotificationRecord> {
        let created_at = Utc::now();
        let expires_at = match new.kind {
            NotificationKind::FriendRequest => {
                Some(created_at + Duration::days(self.config.friend_request_ttl_days))
            }
            _ => None,
        };
        let record = new.into_record(NotificationId::new(), created_at, expires_at);

        match self.repo.insert(&record).await {
            Ok(()) => Some(record),
            Err(e) => {
                error!(
                    target_user_id = %record.target_user_id,
                    kind = %record.kind,
                    error = %e,
                    "Failed to persist notification, continuing with live delivery"
                );
                None
            }
        }
    }

    /// Lists a user's non-expired notifications, most recent first.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<NotificationRecord>> {
        self.repo.find_active_by_user(user_id, Utc::now(), page).await
    }

    /// Counts a user's unread, non-expired notifications.
    ///
    /// Best-effort: a repository error degrades to 0 so counter pushes
    /// never abort the fan-out.
    pub async fn count_unread(&self, user_id: UserId) -> i64 {
        match self.repo.count_unread(user_id, Utc::now()).await {
            Ok(count) => count,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Failed to count unread, reporting 0");
                0
            }
        }
    }

    /// Marks one notification as read.
    ///
    /// Returns `Ok(true)` when the record transitioned, `Ok(false)` when
    /// it was already Read or Handled (idempotent no-op), and NotFound
    /// when the record does not exist or is owned by someone else — the
    /// two cases are deliberately indistinguishable.
    pub async fn mark_read(&self, id: NotificationId, user_id: UserId) -> AppResult<bool> {
        if self.repo.mark_read(id, user_id, Utc::now()).await? {
            return Ok(true);
        }
        self.resolve_noop(id, user_id).await
    }

    /// Marks one notification as handled (terminal).
    ///
    /// Permitted from Unread or Read; `Ok(false)` once already Handled.
    /// Ownership semantics match [`NotificationStore::mark_read`].
    pub async fn mark_handled(&self, id: NotificationId, user_id: UserId) -> AppResult<bool> {
        if self.repo.mark_handled(id, user_id, Utc::now()).await? {
            return Ok(true);
        }
        self.resolve_noop(id, user_id).await
    }

    /// Marks all of a user's unread notifications as read. Returns the
    /// number affected.
    pub async fn mark_all_read(&self, user_id: UserId) -> AppResult<u64> {
        self.repo.mark_all_read(user_id, Utc::now()).await
    }

    /// Deletes a user's Handled notifications older than the given age.
    /// Returns the number deleted.
    pub async fn cleanup_expired_handled(
        &self,
        user_id: UserId,
        older_than_days: i64,
    ) -> AppResult<u64> {
        let cutoff = Utc::now() - Duration::days(older_than_days);
        self.repo.delete_handled_before(user_id, cutoff).await
    }

    /// Trims a user's stored notifications to the configured maximum.
    /// Returns the number deleted.
    pub async fn trim_for_user(&self, user_id: UserId) -> AppResult<u64> {
        self.repo
            .trim_per_user(user_id, self.config.max_stored_per_user)
            .await
    }

    /// The cleanup age threshold from configuration.
    pub fn cleanup_after_days(&self) -> i64 {
        self.config.cleanup_after_days
    }

    // A conditional update touched no row: either the record is in a
    // state the transition treats as a no-op, or it is not visible to
    // this caller at all.
    async fn resolve_noop(&self, id: NotificationId, user_id: UserId) -> AppResult<bool> {
        match self.repo.find_by_id(id).await? {
            Some(record) if record.target_user_id == user_id => Ok(false),
            _ => Err(AppError::not_found("Notification not found")),
        }
    }
}
