//! Persistence collaborator trait for notification records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use resona_core::result::AppResult;
use resona_core::types::id::{NotificationId, UserId};
use resona_core::types::pagination::{PageRequest, PageResponse};
use resona_entity::notification::NotificationRecord;

/// Insert/update/query primitives over the notification collection.
///
/// Implementations must make the conditional updates atomic with respect
/// to concurrent callers (a status predicate that no longer holds means
/// zero rows updated, never a lost write). Entity-specific query methods
/// are defined here rather than on a generic CRUD trait because the
/// lifecycle layer needs status- and expiry-predicated updates.
#[async_trait]
pub trait NotificationRepository: Send + Sync + 'static {
    /// Persist a fully materialized record.
    async fn insert(&self, record: &NotificationRecord) -> AppResult<()>;

    /// Find a record by id, regardless of owner or expiry.
    async fn find_by_id(&self, id: NotificationId) -> AppResult<Option<NotificationRecord>>;

    /// Page through a user's non-expired records, most recent first.
    async fn find_active_by_user(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<NotificationRecord>>;

    /// Count a user's unread, non-expired records.
    async fn count_unread(&self, user_id: UserId, now: DateTime<Utc>) -> AppResult<i64>;

    /// Transition one record Unread → Read iff it is owned by `user_id`
    /// and currently Unread. Returns whether a row transitioned.
    async fn mark_read(
        &self,
        id: NotificationId,
        user_id: UserId,
        read_at: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Transition one record to Handled iff it is owned by `user_id` and
    /// currently Unread or Read. Returns whether a row transitioned.
    async fn mark_handled(
        &self,
        id: NotificationId,
        user_id: UserId,
        handled_at: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Transition all of a user's Unread records to Read. Returns the
    /// number of rows transitioned.
    async fn mark_all_read(&self, user_id: UserId, read_at: DateTime<Utc>) -> AppResult<u64>;

    /// Delete a user's Handled records created before `cutoff`. Returns
    /// the number of rows deleted.
    async fn delete_handled_before(&self, user_id: UserId, cutoff: DateTime<Utc>)
    -> AppResult<u64>;

    /// Keep only the newest `keep` records for a user, deleting the rest.
    /// Returns the number of rows deleted.
    async fn trim_per_user(&self, user_id: UserId, keep: u64) -> AppResult<u64>;
}
