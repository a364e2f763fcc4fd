//! Application settings and configuration structures.

use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server configuration (host, port)
    pub server: ServerSettings,

    /// Database configuration (PostgreSQL)
    pub database: DatabaseSettings,

    /// JWT authentication settings
    pub jwt: JwtSettings,

    /// Telegram bot settings
    pub telegram: TelegramSettings,

    /// Auth code cleanup schedule
    pub janitor: JanitorSettings,

    /// Local file storage for uploaded images
    pub uploads: UploadSettings,

    /// CORS configuration
    pub cors: CorsSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// PostgreSQL database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Database connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections to maintain
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub acquire_timeout: u64,
}

/// JWT authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens
    pub secret: String,

    /// Access token expiry in minutes
    pub access_token_expiry_minutes: i64,

    /// Refresh token expiry in days
    pub refresh_token_expiry_days: i64,

    /// Expiry of the token handed out after a Telegram code exchange
    pub telegram_token_expiry_minutes: i64,
}

/// Telegram Bot API configuration.
///
/// An empty `bot_token` disables the bot listener; code verification
/// keeps working for codes already issued.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramSettings {
    pub bot_token: String,
    pub api_base_url: String,

    /// Lifetime of a one-time auth code
    pub code_ttl_minutes: i64,

    /// Long-poll timeout passed to `getUpdates`
    pub poll_timeout_secs: u64,

    /// Pause before polling resumes after a transport error
    pub retry_delay_secs: u64,
}

impl TelegramSettings {
    pub fn is_enabled(&self) -> bool {
        !self.bot_token.trim().is_empty()
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

/// Janitor configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JanitorSettings {
    pub interval_secs: u64,
}

/// Upload storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadSettings {
    /// Root directory, served at `/uploads`
    pub dir: String,

    /// Maximum accepted image size in bytes
    pub max_file_size: usize,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins (comma-separated in env)
    pub allowed_origins: Vec<String>,
}

/// Minimum required length for JWT secret (256 bits = 32 bytes)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. Built-in defaults
    /// 2. config/default.toml (base configuration)
    /// 3. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 4. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if JWT secret is too short.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Config::builder()
            .set_default("environment", environment.clone())?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout", 30)?
            .set_default("jwt.access_token_expiry_minutes", 60)?
            .set_default("jwt.refresh_token_expiry_days", 7)?
            .set_default("jwt.telegram_token_expiry_minutes", 60)?
            .set_default("telegram.bot_token", "")?
            .set_default("telegram.api_base_url", "https://api.telegram.org")?
            .set_default("telegram.code_ttl_minutes", 5)?
            .set_default("telegram.poll_timeout_secs", 10)?
            .set_default("telegram.retry_delay_secs", 10)?
            .set_default("janitor.interval_secs", 600)?
            .set_default("uploads.dir", "uploads")?
            .set_default("uploads.max_file_size", 5 * 1024 * 1024)?
            .set_default("cors.allowed_origins", vec!["http://localhost:5173"])?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // APP__SERVER__PORT=5000 -> server.port = 5000
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("jwt.secret", std::env::var("JWT_SECRET").ok())?
            .set_override_option("telegram.bot_token", std::env::var("BOT_TOKEN").ok())?
            .set_override_option("uploads.dir", std::env::var("UPLOADS_DIR").ok())?
            .build()?
            .try_deserialize()
            .and_then(|settings: Self| {
                if settings.jwt.secret.len() < MIN_JWT_SECRET_LENGTH {
                    return Err(ConfigError::Message(format!(
                        "JWT secret must be at least {} characters for security. Current length: {}",
                        MIN_JWT_SECRET_LENGTH,
                        settings.jwt.secret.len()
                    )));
                }
                Ok(settings)
            })
    }

    /// Get the full server address as a string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Whether error responses may carry the underlying error text.
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn telegram_disabled_without_token() {
        let settings = TelegramSettings {
            bot_token: "  ".into(),
            api_base_url: "https://api.telegram.org".into(),
            code_ttl_minutes: 5,
            poll_timeout_secs: 10,
            retry_delay_secs: 10,
        };
        assert!(!settings.is_enabled());
        assert_eq!(settings.retry_delay(), Duration::from_secs(10));
    }
}
