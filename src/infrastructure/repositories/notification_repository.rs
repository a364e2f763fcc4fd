//! Notification Repository Implementation
//!
//! PostgreSQL implementation of the NotificationRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{NewNotification, Notification, NotificationKind, NotificationRepository};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: i64,
    user_id: i64,
    sender_id: i64,
    kind: String,
    post_id: Option<i64>,
    is_read: bool,
    created_at: DateTime<Utc>,
    sender_username: Option<String>,
    sender_avatar: Option<String>,
    post_title: Option<String>,
}

impl NotificationRow {
    fn into_entity(self) -> Option<Notification> {
        let kind = NotificationKind::parse(&self.kind)?;
        Some(Notification {
            id: self.id,
            user_id: self.user_id,
            sender_id: self.sender_id,
            kind,
            post_id: self.post_id,
            is_read: self.is_read,
            created_at: self.created_at,
            sender_username: self.sender_username,
            sender_avatar: self.sender_avatar,
            post_title: self.post_title,
        })
    }
}

/// PostgreSQL notification repository implementation.
#[derive(Clone)]
pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn create(&self, notification: &NewNotification) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO notifications (user_id, sender_id, type, post_id) VALUES ($1, $2, $3, $4)",
        )
        .bind(notification.user_id)
        .bind(notification.sender_id)
        .bind(notification.kind.as_str())
        .bind(notification.post_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list(
        &self,
        user_id: i64,
        limit: i64,
        offset: i64,
        unread_only: bool,
    ) -> Result<Vec<Notification>, AppError> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT n.id, n.user_id, n.sender_id, n.type AS kind, n.post_id, n.is_read, n.created_at,
                   s.username AS sender_username, s.avatar AS sender_avatar,
                   p.title AS post_title
            FROM notifications n
            LEFT JOIN users s ON s.id = n.sender_id
            LEFT JOIN posts p ON p.id = n.post_id
            WHERE n.user_id = $1 AND ($2 = FALSE OR n.is_read = FALSE)
            ORDER BY n.created_at DESC, n.id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id)
        .bind(unread_only)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(NotificationRow::into_entity)
            .collect())
    }

    async fn unread_count(&self, user_id: i64) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn count_since(&self, user_id: i64, since: DateTime<Utc>) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = FALSE AND created_at > $2",
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn mark_read(&self, id: i64, user_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_read(&self, user_id: i64) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_older_than(&self, days: i64) -> Result<u64, AppError> {
        let result = sqlx::query(
            "DELETE FROM notifications WHERE created_at < NOW() - make_interval(days => $1::INT)",
        )
        .bind(days)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
