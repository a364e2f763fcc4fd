//! Subscription Repository Implementation
//!
//! PostgreSQL implementation of the SubscriptionRepository trait.

use async_trait::async_trait;
use sqlx::PgPool;

use super::user_repository::UserSummaryRow;
use crate::domain::{FollowCounts, SubscriptionRepository, UserSummary};
use crate::shared::error::AppError;

/// PostgreSQL subscription repository implementation.
#[derive(Clone)]
pub struct PgSubscriptionRepository {
    pool: PgPool,
}

impl PgSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for PgSubscriptionRepository {
    async fn exists(&self, user_id: i64, follower_id: i64) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM subscriptions WHERE user_id = $1 AND follower_id = $2)",
        )
        .bind(user_id)
        .bind(follower_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn create(&self, user_id: i64, follower_id: i64) -> Result<(), AppError> {
        sqlx::query("INSERT INTO subscriptions (user_id, follower_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(follower_id)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                    AppError::BadRequest("Already subscribed to this user".into())
                }
                _ => AppError::Database(e),
            })?;
        Ok(())
    }

    async fn delete(&self, user_id: i64, follower_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE user_id = $1 AND follower_id = $2")
            .bind(user_id)
            .bind(follower_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn followers(&self, user_id: i64) -> Result<Vec<UserSummary>, AppError> {
        let rows = sqlx::query_as::<_, UserSummaryRow>(
            r#"
            SELECT u.id, u.username, u.avatar, u.about, u.created_at
            FROM subscriptions s
            JOIN users u ON u.id = s.follower_id
            WHERE s.user_id = $1
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(UserSummaryRow::into_summary).collect())
    }

    async fn subscriptions(&self, follower_id: i64) -> Result<Vec<UserSummary>, AppError> {
        let rows = sqlx::query_as::<_, UserSummaryRow>(
            r#"
            SELECT u.id, u.username, u.avatar, u.about, u.created_at
            FROM subscriptions s
            JOIN users u ON u.id = s.user_id
            WHERE s.follower_id = $1
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(follower_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(UserSummaryRow::into_summary).collect())
    }

    async fn counts(&self, user_id: i64) -> Result<FollowCounts, AppError> {
        let (followers, subscriptions): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM subscriptions WHERE user_id = $1),
                (SELECT COUNT(*) FROM subscriptions WHERE follower_id = $1)
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(FollowCounts {
            followers,
            subscriptions,
        })
    }
}
