//! Background Jobs
//!
//! Long-running tasks spawned next to the HTTP server: the Telegram bot
//! listener and the auth code janitor.

pub mod bot_listener;
pub mod janitor;

pub use bot_listener::BotListener;
pub use janitor::{run_janitor, sweep};
