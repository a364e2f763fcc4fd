//! Telegram bot long-poll loop.
//!
//! Answers `/start` with a fresh one-time login code. Transport errors
//! pause polling for the retry delay, then the bot identity is re-checked
//! before polling resumes.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::application::services::{code_message, TelegramAuthService, UNAVAILABLE_MESSAGE};
use crate::config::TelegramSettings;
use crate::infrastructure::telegram::{TelegramApi, Update};

const START_COMMAND: &str = "/start";

const HINT_MESSAGE: &str = "Send /start to receive a StarsClub login code.";

pub struct BotListener {
    telegram: Arc<dyn TelegramApi>,
    auth: Arc<dyn TelegramAuthService>,
    poll_timeout_secs: u64,
    retry_delay: Duration,
    code_ttl_minutes: i64,
}

impl BotListener {
    pub fn new(
        telegram: Arc<dyn TelegramApi>,
        auth: Arc<dyn TelegramAuthService>,
        settings: &TelegramSettings,
    ) -> Self {
        Self {
            telegram,
            auth,
            poll_timeout_secs: settings.poll_timeout_secs,
            retry_delay: settings.retry_delay(),
            code_ttl_minutes: settings.code_ttl_minutes,
        }
    }

    /// Poll forever. Intended to be spawned on its own task.
    pub async fn run(self) {
        self.wait_for_identity().await;

        let mut offset = 0;
        loop {
            match self.telegram.get_updates(offset, self.poll_timeout_secs).await {
                Ok(updates) => {
                    for update in updates {
                        offset = offset.max(update.update_id + 1);
                        self.handle(update).await;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "getUpdates failed, pausing bot listener");
                    tokio::time::sleep(self.retry_delay).await;
                    self.wait_for_identity().await;
                }
            }
        }
    }

    /// Block until `getMe` succeeds.
    async fn wait_for_identity(&self) {
        loop {
            match self.telegram.get_me().await {
                Ok(me) => {
                    info!(bot_id = me.id, username = ?me.username, "Telegram bot connected");
                    return;
                }
                Err(e) => {
                    error!(error = %e, "Telegram bot unreachable");
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }
    }

    /// React to one update.
    pub async fn handle(&self, update: Update) {
        let Some(message) = update.message else {
            return;
        };
        let chat_id = message.chat.id;
        let text = message.text.unwrap_or_default();

        let reply = if is_start(&text) {
            match self.auth.issue_code(chat_id).await {
                Ok(issued) => {
                    debug!(chat_id, "Sending auth code");
                    self.send(chat_id, &code_message(&issued.code, self.code_ttl_minutes), true)
                        .await;
                    return;
                }
                Err(e) => {
                    error!(chat_id, error = %e, "Failed to issue auth code");
                    UNAVAILABLE_MESSAGE
                }
            }
        } else {
            HINT_MESSAGE
        };
        self.send(chat_id, reply, false).await;
    }

    async fn send(&self, chat_id: i64, text: &str, html: bool) {
        if let Err(e) = self.telegram.send_message(chat_id, text, html).await {
            warn!(chat_id, error = %e, "sendMessage failed");
        }
    }
}

/// `/start`, optionally with a payload or `@botname` suffix.
fn is_start(text: &str) -> bool {
    text.split_whitespace()
        .next()
        .and_then(|cmd| cmd.split('@').next())
        .is_some_and(|cmd| cmd == START_COMMAND)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::token_service::test_settings;
    use crate::application::services::{TelegramAuthServiceImpl, TokenService};
    use crate::domain::{InMemoryAuthCodes, MockAuthCodeRepository, MockUserRepository};
    use crate::infrastructure::telegram::{Chat, IncomingMessage, MockTelegramApi};
    use crate::shared::error::AppError;
    use std::sync::Mutex;
    use test_case::test_case;

    fn settings() -> TelegramSettings {
        TelegramSettings {
            bot_token: "token".into(),
            api_base_url: "https://api.telegram.org".into(),
            code_ttl_minutes: 5,
            poll_timeout_secs: 10,
            retry_delay_secs: 10,
        }
    }

    fn update(chat_id: i64, text: &str) -> Update {
        Update {
            update_id: 1,
            message: Some(IncomingMessage {
                chat: Chat { id: chat_id },
                text: Some(text.to_string()),
            }),
        }
    }

    fn listener<C>(codes: Arc<C>, telegram: MockTelegramApi) -> BotListener
    where
        C: crate::domain::AuthCodeRepository + 'static,
    {
        let telegram: Arc<dyn TelegramApi> = Arc::new(telegram);
        let auth = TelegramAuthServiceImpl::new(
            codes,
            Arc::new(MockUserRepository::new()),
            telegram.clone(),
            TokenService::new(test_settings()),
            5,
        );
        BotListener::new(telegram, Arc::new(auth), &settings())
    }

    #[test_case("/start", true)]
    #[test_case("/start deeplink", true)]
    #[test_case("/start@StarsClubBot", true)]
    #[test_case("/stop", false)]
    #[test_case("hello", false)]
    fn recognizes_start(text: &str, expected: bool) {
        assert_eq!(is_start(text), expected);
    }

    #[tokio::test]
    async fn start_replies_with_stored_code() {
        let codes = Arc::new(InMemoryAuthCodes::default());
        let sent = Arc::new(Mutex::new(Vec::new()));

        let mut telegram = MockTelegramApi::new();
        let log = sent.clone();
        telegram
            .expect_send_message()
            .withf(|chat_id, _, html| *chat_id == 77 && *html)
            .times(1)
            .returning(move |_, text, _| {
                log.lock().unwrap().push(text.to_string());
                Ok(())
            });

        listener(codes.clone(), telegram).handle(update(77, "/start")).await;

        let stored = codes.codes();
        assert_eq!(stored.len(), 1);
        let sent = sent.lock().unwrap();
        assert!(sent[0].contains(&format!("<b>{}</b>", stored[0])));
    }

    #[tokio::test]
    async fn storage_failure_sends_unavailable_notice() {
        let mut codes = MockAuthCodeRepository::new();
        codes
            .expect_create()
            .returning(|_, _, _| Err(AppError::Internal("db down".into())));

        let mut telegram = MockTelegramApi::new();
        telegram
            .expect_send_message()
            .withf(|_, text, html| text.to_string() == UNAVAILABLE_MESSAGE && !*html)
            .times(1)
            .returning(|_, _, _| Ok(()));

        listener(Arc::new(codes), telegram).handle(update(5, "/start")).await;
    }

    #[tokio::test]
    async fn other_text_gets_hint() {
        let codes = Arc::new(InMemoryAuthCodes::default());
        let mut telegram = MockTelegramApi::new();
        telegram
            .expect_send_message()
            .withf(|_, text, _| text.to_string() == HINT_MESSAGE)
            .times(1)
            .returning(|_, _, _| Ok(()));

        listener(codes.clone(), telegram).handle(update(5, "hi")).await;
        assert!(codes.codes().is_empty());
    }
}
