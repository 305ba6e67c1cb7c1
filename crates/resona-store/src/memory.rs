//! In-memory notification repository for single-node use and tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use resona_core::result::AppResult;
use resona_core::types::id::{NotificationId, UserId};
use resona_core::types::pagination::{PageRequest, PageResponse};
use resona_entity::notification::{NotificationRecord, NotificationStatus};

use crate::repository::NotificationRepository;

/// DashMap-backed notification repository.
///
/// Conditional updates hold the per-record entry lock, so the status
/// predicates are atomic with respect to concurrent callers.
#[derive(Debug, Default)]
pub struct MemoryNotificationRepository {
    records: DashMap<NotificationId, NotificationRecord>,
}

impl MemoryNotificationRepository {
    /// Create a new empty repository.
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Total record count, including read/handled/expired.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the repository holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn sorted_for_user(&self, user_id: UserId) -> Vec<NotificationRecord> {
        let mut records: Vec<NotificationRecord> = self
            .records
            .iter()
            .filter(|r| r.value().target_user_id == user_id)
            .map(|r| r.value().clone())
            .collect();
        // Newest first; id breaks creation-time ties deterministically.
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.to_string().cmp(&a.id.to_string()))
        });
        records
    }
}

#[async_trait]
impl NotificationRepository for MemoryNotificationRepository {
    async fn insert(&self, record: &NotificationRecord) -> AppResult<()> {
        self.records.insert(record.id, record.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: NotificationId) -> AppResult<Option<NotificationRecord>> {
        Ok(self.records.get(&id).map(|r| r.value().clone()))
    }

    async fn find_active_by_user(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<NotificationRecord>> {
        let active: Vec<NotificationRecord> = self
            .sorted_for_user(user_id)
            .into_iter()
            .filter(|r| r.is_active_at(now))
            .collect();

        let total = active.len() as u64;
        let items = active
            .into_iter()
            .skip(page.skip as usize)
            .take(page.limit as usize)
            .collect();

        Ok(PageResponse::new(items, total, page))
    }

    async fn count_unread(&self, user_id: UserId, now: DateTime<Utc>) -> AppResult<i64> {
        let count = self
            .records
            .iter()
            .filter(|r| {
                let r = r.value();
                r.target_user_id == user_id && r.is_unread() && r.is_active_at(now)
            })
            .count();
        Ok(count as i64)
    }

    async fn mark_read(
        &self,
        id: NotificationId,
        user_id: UserId,
        read_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        if let Some(mut record) = self.records.get_mut(&id) {
            if record.target_user_id == user_id && record.status == NotificationStatus::Unread {
                record.status = NotificationStatus::Read;
                record.read_at = Some(read_at);
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn mark_handled(
        &self,
        id: NotificationId,
        user_id: UserId,
        handled_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        if let Some(mut record) = self.records.get_mut(&id) {
            if record.target_user_id == user_id
                && record.status.can_transition_to(NotificationStatus::Handled)
            {
                record.status = NotificationStatus::Handled;
                record.handled_at = Some(handled_at);
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn mark_all_read(&self, user_id: UserId, read_at: DateTime<Utc>) -> AppResult<u64> {
        let mut affected = 0u64;
        for mut record in self.records.iter_mut() {
            let record = record.value_mut();
            if record.target_user_id == user_id && record.status == NotificationStatus::Unread {
                record.status = NotificationStatus::Read;
                record.read_at = Some(read_at);
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn delete_handled_before(
        &self,
        user_id: UserId,
        cutoff: DateTime<Utc>,
    ) -> AppResult<u64> {
        let before = self.records.len();
        self.records.retain(|_, r| {
            !(r.target_user_id == user_id
                && r.status == NotificationStatus::Handled
                && r.created_at < cutoff)
        });
        Ok((before - self.records.len()) as u64)
    }

    async fn trim_per_user(&self, user_id: UserId, keep: u64) -> AppResult<u64> {
        let records = self.sorted_for_user(user_id);
        let excess: Vec<NotificationId> = records
            .into_iter()
            .skip(keep as usize)
            .map(|r| r.id)
            .collect();

        let deleted = excess.len() as u64;
        for id in excess {
            self.records.remove(&id);
        }
        Ok(deleted)
    }
}
