//! Token Service
//!
//! Signs and checks the HS256 JWTs handed to clients. Access and refresh
//! tokens share one secret and are told apart by the `kind` claim.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtSettings;
use crate::domain::User;

/// What a token may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Numeric role id at issue time
    pub role: i32,
    pub kind: TokenKind,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<i64, TokenError> {
        self.sub.parse().map_err(|_| TokenError::Invalid)
    }
}

/// Access and refresh token pair.
#[derive(Debug, Clone, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    pub token_type: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,

    #[error("Token cannot be used here")]
    WrongKind,

    #[error("Token generation failed: {0}")]
    Signing(String),
}

#[derive(Clone)]
pub struct TokenService {
    settings: JwtSettings,
}

impl TokenService {
    pub fn new(settings: JwtSettings) -> Self {
        Self { settings }
    }

    fn sign(&self, user_id: i64, role: i32, kind: TokenKind, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role,
            kind,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.settings.secret.as_bytes()),
        )
        .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Issue a fresh access/refresh pair for `user`.
    pub fn issue_pair(&self, user: &User) -> Result<AuthTokens, TokenError> {
        let access_ttl = Duration::minutes(self.settings.access_token_expiry_minutes);
        let refresh_ttl = Duration::days(self.settings.refresh_token_expiry_days);

        Ok(AuthTokens {
            access_token: self.sign(user.id, user.role_id, TokenKind::Access, access_ttl)?,
            refresh_token: self.sign(user.id, user.role_id, TokenKind::Refresh, refresh_ttl)?,
            expires_in: access_ttl.num_seconds(),
            token_type: "Bearer".to_string(),
        })
    }

    /// Access token handed out after a Telegram code exchange.
    pub fn issue_session(&self, user: &User) -> Result<String, TokenError> {
        self.sign(
            user.id,
            user.role_id,
            TokenKind::Access,
            Duration::minutes(self.settings.telegram_token_expiry_minutes),
        )
    }

    /// Verify signature and expiry, then require the given kind.
    pub fn decode(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.settings.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })?;

        if data.claims.kind != expected {
            return Err(TokenError::WrongKind);
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
pub(crate) fn test_settings() -> JwtSettings {
    JwtSettings {
        secret: "test-secret-key-with-at-least-32-characters".into(),
        access_token_expiry_minutes: 60,
        refresh_token_expiry_days: 7,
        telegram_token_expiry_minutes: 60,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use pretty_assertions::assert_eq;

    fn user(role: Role) -> User {
        User {
            id: 42,
            username: "alice".into(),
            phone: None,
            password_hash: None,
            telegram_id: None,
            role_id: role.id(),
            avatar: None,
            about: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn access_token_round_trips_claims() {
        let service = TokenService::new(test_settings());
        let tokens = service.issue_pair(&user(Role::Admin)).unwrap();

        let claims = service.decode(&tokens.access_token, TokenKind::Access).unwrap();
        assert_eq!(claims.user_id(), Ok(42));
        assert_eq!(claims.role, 1);
        assert_eq!(tokens.expires_in, 3600);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn kinds_are_not_interchangeable() {
        let service = TokenService::new(test_settings());
        let tokens = service.issue_pair(&user(Role::Member)).unwrap();

        assert_eq!(
            service.decode(&tokens.refresh_token, TokenKind::Access).unwrap_err(),
            TokenError::WrongKind
        );
        assert_eq!(
            service.decode(&tokens.access_token, TokenKind::Refresh).unwrap_err(),
            TokenError::WrongKind
        );
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let ours = TokenService::new(test_settings());
        let theirs = TokenService::new(JwtSettings {
            secret: "another-secret-key-with-at-least-32-chars".into(),
            ..test_settings()
        });
        let token = theirs.issue_session(&user(Role::Member)).unwrap();

        assert_eq!(ours.decode(&token, TokenKind::Access).unwrap_err(), TokenError::Invalid);
        assert_eq!(ours.decode("garbage", TokenKind::Access).unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn expired_token_is_rejected() {
        let service = TokenService::new(test_settings());
        let token = service
            .sign(1, 2, TokenKind::Access, Duration::hours(-2))
            .unwrap();

        assert_eq!(service.decode(&token, TokenKind::Access).unwrap_err(), TokenError::Expired);
    }
}
