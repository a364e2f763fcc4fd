//! Authentication Service
//!
//! Password registration and login plus refresh-token exchange.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;

use super::token_service::{AuthTokens, TokenError, TokenKind, TokenService};
use crate::domain::{NewUser, Role, User, UserRepository};
use crate::shared::error::AppError;

/// Authentication service trait for dependency injection
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a password account with the member role
    async fn register(&self, username: &str, phone: &str, password: &str)
        -> Result<User, AuthError>;

    /// Authenticate by phone and password
    async fn login(&self, phone: &str, password: &str) -> Result<(User, AuthTokens), AuthError>;

    /// Exchange a refresh token for a new pair
    async fn refresh(&self, refresh_token: Option<&str>) -> Result<AuthTokens, AuthError>;
}

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid phone or password")]
    InvalidCredentials,

    #[error("Phone number already registered")]
    PhoneExists,

    #[error("Username already taken")]
    UsernameExists,

    #[error("Refresh token is required")]
    MissingRefreshToken,

    #[error("Invalid or expired refresh token")]
    InvalidToken,

    #[error("User not found")]
    UserNotFound,

    #[error(transparent)]
    Store(#[from] AppError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials | AuthError::InvalidToken => {
                AppError::Unauthorized(e.to_string())
            }
            AuthError::PhoneExists | AuthError::UsernameExists => AppError::Conflict(e.to_string()),
            AuthError::MissingRefreshToken => AppError::BadRequest(e.to_string()),
            AuthError::UserNotFound => AppError::NotFound(e.to_string()),
            AuthError::Store(inner) => inner,
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Signing(msg) => AuthError::Internal(msg),
            _ => AuthError::InvalidToken,
        }
    }
}

/// Hash a password using Argon2id
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AuthError::Internal(format!("Invalid password hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// AuthService implementation
pub struct AuthServiceImpl<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    tokens: TokenService,
}

impl<U> AuthServiceImpl<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, tokens: TokenService) -> Self {
        Self { user_repo, tokens }
    }
}

#[async_trait]
impl<U> AuthService for AuthServiceImpl<U>
where
    U: UserRepository + 'static,
{
    async fn register(
        &self,
        username: &str,
        phone: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        if self.user_repo.phone_exists(phone).await? {
            return Err(AuthError::PhoneExists);
        }
        if self.user_repo.username_exists(username).await? {
            return Err(AuthError::UsernameExists);
        }

        let password_hash = hash_password(password)?;
        let user = self
            .user_repo
            .create(&NewUser {
                username: username.to_string(),
                phone: Some(phone.to_string()),
                password_hash: Some(password_hash),
                telegram_id: None,
                role_id: Role::Member.id(),
                about: None,
            })
            .await?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(user)
    }

    async fn login(&self, phone: &str, password: &str) -> Result<(User, AuthTokens), AuthError> {
        let user = self
            .user_repo
            .find_by_phone(phone)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        // Telegram-created accounts have no password to check against.
        let hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(password, hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.tokens.issue_pair(&user)?;
        tracing::debug!(user_id = user.id, "User logged in");
        Ok((user, tokens))
    }

    async fn refresh(&self, refresh_token: Option<&str>) -> Result<AuthTokens, AuthError> {
        let token = refresh_token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingRefreshToken)?;

        let claims = self.tokens.decode(token, TokenKind::Refresh)?;
        let user_id = claims.user_id()?;

        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(self.tokens.issue_pair(&user)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::token_service::test_settings;
    use crate::domain::MockUserRepository;
    use chrono::Utc;
    use mockall::predicate::eq;

    fn stored_user(id: i64, password_hash: Option<String>, role: Role) -> User {
        User {
            id,
            username: "alice".into(),
            phone: Some("+15550001".into()),
            password_hash,
            telegram_id: None,
            role_id: role.id(),
            avatar: None,
            about: None,
            created_at: Utc::now(),
        }
    }

    fn service(repo: MockUserRepository) -> AuthServiceImpl<MockUserRepository> {
        AuthServiceImpl::new(Arc::new(repo), TokenService::new(test_settings()))
    }

    #[tokio::test]
    async fn register_rejects_duplicate_phone() {
        let mut repo = MockUserRepository::new();
        repo.expect_phone_exists().returning(|_| Ok(true));
        repo.expect_create().never();

        let err = service(repo)
            .register("alice", "+15550001", "secret")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::PhoneExists));
        assert_eq!(AppError::from(err).status(), axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn register_creates_member_with_hash() {
        let mut repo = MockUserRepository::new();
        repo.expect_phone_exists().returning(|_| Ok(false));
        repo.expect_username_exists().returning(|_| Ok(false));
        repo.expect_create()
            .withf(|u| {
                u.role_id == Role::Member.id()
                    && u.password_hash.as_deref().is_some_and(|h| h.starts_with("$argon2"))
            })
            .returning(|u| Ok(stored_user(7, u.password_hash.clone(), Role::Member)));

        let user = service(repo)
            .register("alice", "+15550001", "secret")
            .await
            .unwrap();
        assert_eq!(user.id, 7);
    }

    #[tokio::test]
    async fn login_checks_password() {
        let hash = hash_password("correct horse").unwrap();
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_phone()
            .returning(move |_| Ok(Some(stored_user(1, Some(hash.clone()), Role::Member))));
        let service = service(repo);

        assert!(matches!(
            service.login("+15550001", "wrong").await.unwrap_err(),
            AuthError::InvalidCredentials
        ));
        let (user, tokens) = service.login("+15550001", "correct horse").await.unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(tokens.token_type, "Bearer");
    }

    #[tokio::test]
    async fn login_rejects_account_without_password() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_phone()
            .returning(|_| Ok(Some(stored_user(1, None, Role::TelegramMember))));

        assert!(matches!(
            service(repo).login("+15550001", "anything").await.unwrap_err(),
            AuthError::InvalidCredentials
        ));
    }

    #[tokio::test]
    async fn refresh_uses_current_role() {
        let tokens = TokenService::new(test_settings());
        let issued = tokens
            .issue_pair(&stored_user(3, None, Role::Member))
            .unwrap();

        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .with(eq(3))
            .returning(|_| Ok(Some(stored_user(3, None, Role::Admin))));

        let renewed = service(repo)
            .refresh(Some(&issued.refresh_token))
            .await
            .unwrap();
        let claims = tokens.decode(&renewed.access_token, TokenKind::Access).unwrap();
        assert_eq!(claims.role, Role::Admin.id());
    }

    #[tokio::test]
    async fn refresh_error_cases() {
        let tokens = TokenService::new(test_settings());
        let issued = tokens.issue_pair(&stored_user(3, None, Role::Member)).unwrap();

        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        let service = service(repo);

        assert!(matches!(
            service.refresh(None).await.unwrap_err(),
            AuthError::MissingRefreshToken
        ));
        assert!(matches!(
            service.refresh(Some(&issued.access_token)).await.unwrap_err(),
            AuthError::InvalidToken
        ));
        assert!(matches!(
            service.refresh(Some(&issued.refresh_token)).await.unwrap_err(),
            AuthError::UserNotFound
        ));
    }
}
