//! Telegram one-time auth code entity and repository trait.
//!
//! Maps to the `telegram_auth_codes` table. A code moves from issued to
//! consumed exactly once; expiry is implicit in `expires_at`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::Serialize;

use crate::shared::error::AppError;

/// Number of characters in a code.
pub const CODE_LENGTH: usize = 6;

/// A one-time code handed out by the bot.
///
/// Maps to the `telegram_auth_codes` table:
/// - id: BIGSERIAL PRIMARY KEY
/// - chat_id: BIGINT NOT NULL
/// - code: CHAR(6) NOT NULL
/// - expires_at: TIMESTAMPTZ NOT NULL
/// - is_used: BOOLEAN NOT NULL DEFAULT FALSE
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, Serialize)]
pub struct AuthCode {
    pub id: i64,
    pub chat_id: i64,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub is_used: bool,
    pub created_at: DateTime<Utc>,
}

impl AuthCode {
    /// Generate a fresh uppercase hex code from the OS-seeded RNG.
    pub fn generate_code() -> String {
        let mut bytes = [0u8; CODE_LENGTH / 2];
        rand::rng().fill_bytes(&mut bytes);
        hex::encode_upper(bytes)
    }

    /// Whether the code can still be exchanged at `now`.
    pub fn is_redeemable_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_used && self.expires_at > now
    }

    /// Whether the janitor may delete the row at `now`.
    pub fn is_stale_at(&self, now: DateTime<Utc>) -> bool {
        self.is_used || self.expires_at < now
    }
}

/// Normalize user input into the stored code form.
pub fn normalize_code(raw: &str) -> Option<String> {
    let code = raw.trim().to_ascii_uppercase();
    if code.len() == CODE_LENGTH && code.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(code)
    } else {
        None
    }
}

/// Repository trait for auth code persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthCodeRepository: Send + Sync {
    async fn create(
        &self,
        chat_id: i64,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<AuthCode, AppError>;

    /// Atomically mark the oldest redeemable row with this code as used and
    /// return it. `None` when no such row exists.
    async fn redeem(&self, code: &str) -> Result<Option<AuthCode>, AppError>;

    /// Delete used or expired rows, returning how many were removed.
    async fn purge_stale(&self) -> Result<u64, AppError>;
}
