//! User entity and repository trait.
//!
//! Maps to the `users` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Role;
use crate::shared::error::AppError;

/// Represents a user account.
///
/// Maps to the `users` table:
/// - id: BIGSERIAL PRIMARY KEY
/// - username: VARCHAR(64) NOT NULL UNIQUE
/// - phone: VARCHAR(32) NULL UNIQUE (absent for Telegram-only accounts)
/// - password_hash: VARCHAR(255) NULL
/// - telegram_id: BIGINT NULL UNIQUE
/// - role_id: INTEGER NOT NULL REFERENCES roles(id)
/// - avatar: TEXT NULL
/// - about: TEXT NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    pub username: String,

    pub phone: Option<String>,

    /// Argon2 password hash
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,

    /// Telegram chat identity the account was created from
    pub telegram_id: Option<i64>,

    pub role_id: i32,

    /// Public path of the avatar image
    pub avatar: Option<String>,

    pub about: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn role(&self) -> Option<Role> {
        Role::from_id(self.role_id)
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }
}

/// Fields for inserting a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub phone: Option<String>,
    pub password_hash: Option<String>,
    pub telegram_id: Option<i64>,
    pub role_id: i32,
    pub about: Option<String>,
}

/// Editable profile fields.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub phone: Option<String>,
    pub about: Option<String>,
}

/// Compact user view used in follower lists and author listings.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub avatar: Option<String>,
    pub about: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// User row joined with its role name, for the admin console.
#[derive(Debug, Clone, Serialize)]
pub struct UserWithRole {
    pub id: i64,
    pub username: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub role_id: i32,
    pub role_name: String,
}

/// Repository trait for User data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, AppError>;

    /// Find the account linked to a Telegram chat.
    async fn find_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>, AppError>;

    async fn username_exists(&self, username: &str) -> Result<bool, AppError>;

    async fn phone_exists(&self, phone: &str) -> Result<bool, AppError>;

    /// All usernames equal to `base` or `base` followed only by digits.
    async fn usernames_with_suffix(&self, base: &str) -> Result<Vec<String>, AppError>;

    async fn create(&self, user: &NewUser) -> Result<User, AppError>;

    /// Apply profile changes; `None` if the user does not exist.
    async fn update_profile(
        &self,
        id: i64,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, AppError>;

    async fn set_avatar(&self, id: i64, avatar: Option<String>) -> Result<(), AppError>;

    /// Most recently registered users.
    async fn newest(&self, limit: i64) -> Result<Vec<UserSummary>, AppError>;

    async fn list_with_roles(&self) -> Result<Vec<UserWithRole>, AppError>;

    /// Returns false when no user has the given id.
    async fn update_role(&self, id: i64, role_id: i32) -> Result<bool, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_user() -> User {
        User {
            id: 7,
            username: "alice".to_string(),
            phone: Some("+10000000000".to_string()),
            password_hash: Some("hashed_password".to_string()),
            telegram_id: None,
            role_id: Role::Member.id(),
            avatar: None,
            about: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_password_hash_not_serialized() {
        let user = create_test_user();

        let serialized = serde_json::to_string(&user).expect("Failed to serialize user");

        assert!(!serialized.contains("password_hash"));
        assert!(!serialized.contains("hashed_password"));
    }

    #[test]
    fn test_user_role() {
        let mut user = create_test_user();
        assert_eq!(user.role(), Some(Role::Member));
        assert!(!user.is_admin());

        user.role_id = 1;
        assert!(user.is_admin());
    }
}
