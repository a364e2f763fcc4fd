//! Telegram Auth Service
//!
//! One-time code handshake: the bot issues a code to a chat, the web client
//! trades it for a session token. A code redeems at most once and only
//! before `expires_at`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::token_service::{TokenError, TokenService};
use crate::domain::services::{fallback_username, resolve_unique_username};
use crate::domain::{normalize_code, AuthCode, AuthCodeRepository, NewUser, Role, User, UserRepository};
use crate::infrastructure::metrics;
use crate::infrastructure::telegram::{ChatProfile, TelegramApi};
use crate::shared::error::AppError;

#[async_trait]
pub trait TelegramAuthService: Send + Sync {
    /// Generate and persist a code for `chat_id`.
    async fn issue_code(&self, chat_id: i64) -> Result<IssuedCode, TelegramAuthError>;

    /// Trade a code for a session token, creating the account on first use.
    async fn verify(&self, raw_code: Option<&str>) -> Result<TelegramLogin, TelegramAuthError>;
}

#[derive(Debug, Clone)]
pub struct IssuedCode {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// Result of a successful code exchange.
#[derive(Debug, Clone, Serialize)]
pub struct TelegramLogin {
    pub token: String,
    pub user: User,
    /// The Telegram username was taken and a numeric suffix was added.
    pub username_changed: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum TelegramAuthError {
    #[error("Code is required")]
    MissingCode,

    /// Unknown, already used and expired codes are indistinguishable.
    #[error("Invalid or expired code")]
    InvalidCode,

    #[error(transparent)]
    Store(#[from] AppError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<TelegramAuthError> for AppError {
    fn from(e: TelegramAuthError) -> Self {
        match e {
            TelegramAuthError::MissingCode => AppError::BadRequest(e.to_string()),
            TelegramAuthError::InvalidCode => AppError::NotFound(e.to_string()),
            TelegramAuthError::Store(inner) => inner,
            TelegramAuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<TokenError> for TelegramAuthError {
    fn from(e: TokenError) -> Self {
        TelegramAuthError::Internal(e.to_string())
    }
}

/// HTML reply carrying a freshly issued code.
pub fn code_message(code: &str, ttl_minutes: i64) -> String {
    format!(
        "Your StarsClub login code: <b>{}</b>\nIt is valid for {} minutes.",
        code, ttl_minutes
    )
}

/// Reply sent when a code could not be stored.
pub const UNAVAILABLE_MESSAGE: &str =
    "Login is temporarily unavailable. Please try again in a few minutes.";

fn welcome_message(username: &str, renamed: bool) -> String {
    if renamed {
        format!(
            "You are signed in to StarsClub. Your Telegram username was already taken, \
             so your account is named {}.",
            username
        )
    } else {
        format!("You are signed in to StarsClub as {}.", username)
    }
}

pub struct TelegramAuthServiceImpl<C, U>
where
    C: AuthCodeRepository,
    U: UserRepository,
{
    codes: Arc<C>,
    users: Arc<U>,
    telegram: Arc<dyn TelegramApi>,
    tokens: TokenService,
    code_ttl: Duration,
}

impl<C, U> TelegramAuthServiceImpl<C, U>
where
    C: AuthCodeRepository,
    U: UserRepository,
{
    pub fn new(
        codes: Arc<C>,
        users: Arc<U>,
        telegram: Arc<dyn TelegramApi>,
        tokens: TokenService,
        code_ttl_minutes: i64,
    ) -> Self {
        Self {
            codes,
            users,
            telegram,
            tokens,
            code_ttl: Duration::minutes(code_ttl_minutes),
        }
    }

    async fn chat_profile(&self, chat_id: i64) -> ChatProfile {
        match self.telegram.get_chat(chat_id).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(chat_id, error = %e, "getChat failed, using fallback profile");
                ChatProfile::default()
            }
        }
    }

    /// Find the account for a redeemed code or create it.
    async fn resolve_user(&self, redeemed: &AuthCode) -> Result<(User, bool), TelegramAuthError> {
        if let Some(user) = self.users.find_by_telegram_id(redeemed.chat_id).await? {
            return Ok((user, false));
        }

        let profile = self.chat_profile(redeemed.chat_id).await;
        let base = profile
            .username
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| fallback_username(redeemed.chat_id));

        let taken = self.users.usernames_with_suffix(&base).await?;
        let (username, renamed) = resolve_unique_username(&base, &taken);

        let user = self
            .users
            .create(&NewUser {
                username,
                phone: None,
                password_hash: None,
                telegram_id: Some(redeemed.chat_id),
                role_id: Role::TelegramMember.id(),
                about: profile.bio.filter(|bio| !bio.is_empty()),
            })
            .await?;

        info!(
            user_id = user.id,
            chat_id = redeemed.chat_id,
            username = %user.username,
            renamed,
            "Created account from Telegram"
        );
        Ok((user, renamed))
    }

    async fn exchange(&self, code: &str) -> Result<TelegramLogin, TelegramAuthError> {
        let redeemed = self
            .codes
            .redeem(code)
            .await?
            .ok_or(TelegramAuthError::InvalidCode)?;

        let (user, username_changed) = self.resolve_user(&redeemed).await?;
        let token = self.tokens.issue_session(&user)?;

        let text = welcome_message(&user.username, username_changed);
        if let Err(e) = self.telegram.send_message(redeemed.chat_id, &text, false).await {
            warn!(chat_id = redeemed.chat_id, error = %e, "Failed to send login confirmation");
        }

        Ok(TelegramLogin {
            token,
            user,
            username_changed,
        })
    }
}

#[async_trait]
impl<C, U> TelegramAuthService for TelegramAuthServiceImpl<C, U>
where
    C: AuthCodeRepository + 'static,
    U: UserRepository + 'static,
{
    async fn issue_code(&self, chat_id: i64) -> Result<IssuedCode, TelegramAuthError> {
        let code = AuthCode::generate_code();
        let expires_at = Utc::now() + self.code_ttl;
        self.codes.create(chat_id, &code, expires_at).await?;

        metrics::record_code_issued();
        debug!(chat_id, "Issued auth code");
        Ok(IssuedCode { code, expires_at })
    }

    async fn verify(&self, raw_code: Option<&str>) -> Result<TelegramLogin, TelegramAuthError> {
        let raw = raw_code
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or(TelegramAuthError::MissingCode)?;

        let result = match normalize_code(raw) {
            Some(code) => self.exchange(&code).await,
            None => Err(TelegramAuthError::InvalidCode),
        };

        metrics::record_code_verification(match &result {
            Ok(_) => "success",
            Err(TelegramAuthError::InvalidCode) => "invalid",
            Err(_) => "error",
        });
        result
    }
}
