//! User Repository Implementation
//!
//! PostgreSQL implementation of the UserRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{NewUser, ProfileChanges, User, UserRepository, UserSummary, UserWithRole};
use crate::shared::error::AppError;

const USER_COLUMNS: &str = "id, username, phone, password_hash, telegram_id, role_id, avatar, about, created_at";

/// Database row representation matching the users table schema.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    phone: Option<String>,
    password_hash: Option<String>,
    telegram_id: Option<i64>,
    role_id: i32,
    avatar: Option<String>,
    about: Option<String>,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            phone: self.phone,
            password_hash: self.password_hash,
            telegram_id: self.telegram_id,
            role_id: self.role_id,
            avatar: self.avatar,
            about: self.about,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserSummaryRow {
    id: i64,
    username: String,
    avatar: Option<String>,
    about: Option<String>,
    created_at: DateTime<Utc>,
}

impl UserSummaryRow {
    pub(crate) fn into_summary(self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username,
            avatar: self.avatar,
            about: self.about,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserWithRoleRow {
    id: i64,
    username: String,
    phone: Option<String>,
    created_at: DateTime<Utc>,
    role_id: i32,
    role_name: String,
}

/// Map unique violations on users to a conflict.
fn map_unique(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("User with this username or phone already exists".to_string())
        }
        _ => AppError::Database(e),
    }
}

/// PostgreSQL user repository implementation.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE phone = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(phone)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn find_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE telegram_id = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(telegram_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn phone_exists(&self, phone: &str) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE phone = $1)")
            .bind(phone)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn usernames_with_suffix(&self, base: &str) -> Result<Vec<String>, AppError> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT username
            FROM users
            WHERE left(username, char_length($1)) = $1
              AND substring(username FROM char_length($1) + 1) ~ '^[0-9]*$'
            "#,
        )
        .bind(base)
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    async fn create(&self, user: &NewUser) -> Result<User, AppError> {
        let sql = format!(
            r#"
            INSERT INTO users (username, phone, password_hash, telegram_id, role_id, about)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&user.username)
            .bind(&user.phone)
            .bind(&user.password_hash)
            .bind(user.telegram_id)
            .bind(user.role_id)
            .bind(&user.about)
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique)?;

        Ok(row.into_user())
    }

    async fn update_profile(
        &self,
        id: i64,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, AppError> {
        let sql = format!(
            r#"
            UPDATE users
            SET username = COALESCE($2, username),
                phone = COALESCE($3, phone),
                about = COALESCE($4, about)
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(&changes.username)
            .bind(&changes.phone)
            .bind(&changes.about)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_unique)?;

        Ok(row.map(UserRow::into_user))
    }

    async fn set_avatar(&self, id: i64, avatar: Option<String>) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET avatar = $2 WHERE id = $1")
            .bind(id)
            .bind(avatar)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn newest(&self, limit: i64) -> Result<Vec<UserSummary>, AppError> {
        let rows = sqlx::query_as::<_, UserSummaryRow>(
            r#"
            SELECT id, username, avatar, about, created_at
            FROM users
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(UserSummaryRow::into_summary).collect())
    }

    async fn list_with_roles(&self) -> Result<Vec<UserWithRole>, AppError> {
        let rows = sqlx::query_as::<_, UserWithRoleRow>(
            r#"
            SELECT u.id, u.username, u.phone, u.created_at, u.role_id, r.name AS role_name
            FROM users u
            JOIN roles r ON r.id = u.role_id
            ORDER BY u.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| UserWithRole {
                id: r.id,
                username: r.username,
                phone: r.phone,
                created_at: r.created_at,
                role_id: r.role_id,
                role_name: r.role_name,
            })
            .collect())
    }

    async fn update_role(&self, id: i64, role_id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE users SET role_id = $2 WHERE id = $1")
            .bind(id)
            .bind(role_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
