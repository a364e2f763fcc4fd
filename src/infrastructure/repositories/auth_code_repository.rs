//! Auth Code Repository Implementation
//!
//! PostgreSQL implementation of the AuthCodeRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{AuthCode, AuthCodeRepository};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct AuthCodeRow {
    id: i64,
    chat_id: i64,
    code: String,
    expires_at: DateTime<Utc>,
    is_used: bool,
    created_at: DateTime<Utc>,
}

impl AuthCodeRow {
    fn into_entity(self) -> AuthCode {
        AuthCode {
            id: self.id,
            chat_id: self.chat_id,
            code: self.code,
            expires_at: self.expires_at,
            is_used: self.is_used,
            created_at: self.created_at,
        }
    }
}

/// PostgreSQL auth code repository implementation.
#[derive(Clone)]
pub struct PgAuthCodeRepository {
    pool: PgPool,
}

impl PgAuthCodeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthCodeRepository for PgAuthCodeRepository {
    async fn create(
        &self,
        chat_id: i64,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<AuthCode, AppError> {
        let row = sqlx::query_as::<_, AuthCodeRow>(
            r#"
            INSERT INTO telegram_auth_codes (chat_id, code, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, chat_id, code, expires_at, is_used, created_at
            "#,
        )
        .bind(chat_id)
        .bind(code)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_entity())
    }

    /// Single conditional update: concurrent redeemers of the same code
    /// cannot both see a row returned.
    async fn redeem(&self, code: &str) -> Result<Option<AuthCode>, AppError> {
        let row = sqlx::query_as::<_, AuthCodeRow>(
            r#"
            UPDATE telegram_auth_codes
            SET is_used = TRUE
            WHERE id = (
                SELECT id
                FROM telegram_auth_codes
                WHERE code = $1 AND is_used = FALSE AND expires_at > NOW()
                ORDER BY created_at, id
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            AND is_used = FALSE
            RETURNING id, chat_id, code, expires_at, is_used, created_at
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AuthCodeRow::into_entity))
    }

    async fn purge_stale(&self) -> Result<u64, AppError> {
        let result = sqlx::query(
            "DELETE FROM telegram_auth_codes WHERE is_used = TRUE OR expires_at < NOW()",
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
