//! Telegram Integration
//!
//! Bot API client used by the auth code handshake.

pub mod client;

pub use client::{
    BotApiClient, BotIdentity, Chat, ChatProfile, IncomingMessage, TelegramApi, TelegramError,
    Update,
};

#[cfg(test)]
pub use client::MockTelegramApi;
