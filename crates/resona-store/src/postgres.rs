//! PostgreSQL notification repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use resona_core::error::{AppError, ErrorKind};
use resona_core::result::AppResult;
use resona_core::types::id::{NotificationId, UserId};
use resona_core::types::pagination::{PageRequest, PageResponse};
use resona_entity::notification::{
    NotificationKind, NotificationPayload, NotificationRecord, NotificationStatus,
};

use crate::repository::NotificationRepository;

/// Repository for notification CRUD operations against PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgNotificationRepository {
    pool: PgPool,
}

/// Raw row shape; the typed payload is reconstructed on conversion.
#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    target_user_id: Uuid,
    source_user_id: Option<Uuid>,
    kind: String,
    status: String,
    title: String,
    message: String,
    payload: Option<serde_json::Value>,
    action_url: Option<String>,
    created_at: DateTime<Utc>,
    read_at: Option<DateTime<Utc>>,
    handled_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
}

impl NotificationRow {
    fn into_record(self) -> AppResult<NotificationRecord> {
        let kind = NotificationKind::parse(&self.kind).ok_or_else(|| {
            AppError::new(
                ErrorKind::Store,
                format!("Unknown notification kind '{}'", self.kind),
            )
        })?;
        let status = NotificationStatus::parse(&self.status).ok_or_else(|| {
            AppError::new(
                ErrorKind::Store,
                format!("Unknown notification status '{}'", self.status),
            )
        })?;

        Ok(NotificationRecord {
            id: NotificationId::from_uuid(self.id),
            target_user_id: UserId::from_uuid(self.target_user_id),
            source_user_id: self.source_user_id.map(UserId::from_uuid),
            kind,
            status,
            title: self.title,
            message: self.message,
            payload: NotificationPayload::from_value(kind, self.payload),
            action_url: self.action_url,
            created_at: self.created_at,
            read_at: self.read_at,
            handled_at: self.handled_at,
            expires_at: self.expires_at,
        })
    }
}

impl PgNotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn insert(&self, record: &NotificationRecord) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO notifications \
             (id, target_user_id, source_user_id, kind, status, title, message, payload, action_url, created_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(record.id)
        .bind(record.target_user_id)
        .bind(record.source_user_id)
        .bind(record.kind.as_str())
        .bind(record.status.as_str())
        .bind(&record.title)
        .bind(&record.message)
        .bind(record.payload.to_value())
        .bind(&record.action_url)
        .bind(record.created_at)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Store, "Failed to insert notification", e))?;
        Ok(())
    }

    async fn find_by_id(&self, id: NotificationId) -> AppResult<Option<NotificationRecord>> {
        let row = sqlx::query_as::<_, NotificationRow>("SELECT * FROM notifications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Store, "Failed to find notification", e)
            })?;
        row.map(NotificationRow::into_record).transpose()
    }

    async fn find_active_by_user(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<NotificationRecord>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications \
             WHERE target_user_id = $1 AND (expires_at IS NULL OR expires_at > $2)",
        )
        .bind(user_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Store, "Failed to count notifications", e))?;

        let rows = sqlx::query_as::<_, NotificationRow>(
            "SELECT * FROM notifications \
             WHERE target_user_id = $1 AND (expires_at IS NULL OR expires_at > $2) \
             ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4",
        )
        .bind(user_id)
        .bind(now)
        .bind(page.limit as i64)
        .bind(page.skip as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Store, "Failed to list notifications", e))?;

        let items = rows
            .into_iter()
            .map(NotificationRow::into_record)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(PageResponse::new(items, total as u64, page))
    }

    async fn count_unread(&self, user_id: UserId, now: DateTime<Utc>) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications \
             WHERE target_user_id = $1 AND status = 'unread' \
             AND (expires_at IS NULL OR expires_at > $2)",
        )
        .bind(user_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Store, "Failed to count unread", e))
    }

    async fn mark_read(
        &self,
        id: NotificationId,
        user_id: UserId,
        read_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET status = 'read', read_at = $3 \
             WHERE id = $1 AND target_user_id = $2 AND status = 'unread'",
        )
        .bind(id)
        .bind(user_id)
        .bind(read_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Store, "Failed to mark read", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_handled(
        &self,
        id: NotificationId,
        user_id: UserId,
        handled_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET status = 'handled', handled_at = $3 \
             WHERE id = $1 AND target_user_id = $2 AND status IN ('unread', 'read')",
        )
        .bind(id)
        .bind(user_id)
        .bind(handled_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Store, "Failed to mark handled", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_read(&self, user_id: UserId, read_at: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET status = 'read', read_at = $2 \
             WHERE target_user_id = $1 AND status = 'unread'",
        )
        .bind(user_id)
        .bind(read_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Store, "Failed to mark all read", e))?;
        Ok(result.rows_affected())
    }

    async fn delete_handled_before(
        &self,
        user_id: UserId,
        cutoff: DateTime<Utc>,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM notifications \
             WHERE target_user_id = $1 AND status = 'handled' AND created_at < $2",
        )
        .bind(user_id)
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Store, "Failed to cleanup notifications", e)
        })?;
        Ok(result.rows_affected())
    }

    async fn trim_per_user(&self, user_id: UserId, keep: u64) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM notifications WHERE id IN (\
                SELECT id FROM (\
                    SELECT id, ROW_NUMBER() OVER (ORDER BY created_at DESC, id DESC) AS r_num \
                    FROM notifications WHERE target_user_id = $1\
                ) t WHERE t.r_num > $2\
             )",
        )
        .bind(user_id)
        .bind(keep as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Store, "Failed to trim notifications", e))?;
        Ok(result.rows_affected())
    }
}
