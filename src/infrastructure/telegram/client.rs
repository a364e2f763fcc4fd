//! Telegram Bot API client.
//!
//! Only the four methods the platform needs: `getMe`, `getUpdates`,
//! `sendMessage` and `getChat`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::config::TelegramSettings;

/// Errors talking to the Bot API.
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("Telegram transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram API error: {0}")]
    Api(String),
}

/// Envelope every Bot API response is wrapped in.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

/// The bot's own account, from `getMe`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BotIdentity {
    pub id: i64,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct IncomingMessage {
    pub chat: Chat,
    pub text: Option<String>,
}

/// One entry from `getUpdates`; only messages are requested.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<IncomingMessage>,
}

/// Public profile of a chat, from `getChat`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ChatProfile {
    pub username: Option<String>,
    pub bio: Option<String>,
}

#[derive(Serialize)]
struct GetUpdates<'a> {
    offset: i64,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
}

#[derive(Serialize)]
struct GetChat {
    chat_id: i64,
}

/// Messaging channel used by the auth handshake.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TelegramApi: Send + Sync {
    async fn get_me(&self) -> Result<BotIdentity, TelegramError>;

    /// Long-poll for updates after `offset`.
    async fn get_updates(&self, offset: i64, timeout_secs: u64)
        -> Result<Vec<Update>, TelegramError>;

    /// Send a message, HTML-formatted when `html` is set.
    async fn send_message(&self, chat_id: i64, text: &str, html: bool)
        -> Result<(), TelegramError>;

    async fn get_chat(&self, chat_id: i64) -> Result<ChatProfile, TelegramError>;
}

/// HTTPS client for the Bot API.
#[derive(Clone)]
pub struct BotApiClient {
    http: Client,
    base_url: String,
}

impl BotApiClient {
    pub fn new(settings: &TelegramSettings) -> Self {
        Self {
            http: Client::new(),
            base_url: format!(
                "{}/bot{}",
                settings.api_base_url.trim_end_matches('/'),
                settings.bot_token
            ),
        }
    }

    async fn call<B, T>(&self, method: &str, body: &B, timeout: Duration) -> Result<T, TelegramError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(format!("{}/{}", self.base_url, method))
            .timeout(timeout)
            .json(body)
            .send()
            .await?
            .json::<ApiResponse<T>>()
            .await?;

        match (response.ok, response.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(TelegramError::Api(
                response
                    .description
                    .unwrap_or_else(|| format!("{} failed", method)),
            )),
        }
    }
}

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[async_trait]
impl TelegramApi for BotApiClient {
    async fn get_me(&self) -> Result<BotIdentity, TelegramError> {
        self.call("getMe", &serde_json::json!({}), REQUEST_TIMEOUT).await
    }

    async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        let body = GetUpdates {
            offset,
            timeout: timeout_secs,
            allowed_updates: &["message"],
        };
        // The HTTP timeout must outlast the long-poll window.
        let timeout = Duration::from_secs(timeout_secs) + REQUEST_TIMEOUT;
        self.call("getUpdates", &body, timeout).await
    }

    async fn send_message(&self, chat_id: i64, text: &str, html: bool) -> Result<(), TelegramError> {
        let body = SendMessage {
            chat_id,
            text,
            parse_mode: html.then_some("HTML"),
        };
        let _: serde_json::Value = self.call("sendMessage", &body, REQUEST_TIMEOUT).await?;
        Ok(())
    }

    async fn get_chat(&self, chat_id: i64) -> Result<ChatProfile, TelegramError> {
        self.call("getChat", &GetChat { chat_id }, REQUEST_TIMEOUT).await
    }
}
