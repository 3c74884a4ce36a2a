//! Telegram long-polling loop and per-update routing.
//!
//! Each update runs in its own task; one failing or panicking update only
//! costs that user an apology.

use super::commands::{self, main_keyboard, Command};
use super::message::MessagePipeline;
use crate::models::Reply;
use crate::services::metrics;
use crate::services::telegram::{BotError, CallbackQuery, Message, TelegramClient, Update};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

pub const APOLOGY_REPLY: &str = "⚠️ حدث خطأ غير متوقع، حاول مرة أخرى لاحقاً.";

/// Pause after a failed poll before asking again.
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(3);

#[derive(Clone)]
pub struct UpdateHandler {
    client: TelegramClient,
    pipeline: Arc<MessagePipeline>,
}

impl UpdateHandler {
    pub fn new(client: TelegramClient, pipeline: Arc<MessagePipeline>) -> Self {
        Self { client, pipeline }
    }

    /// Poll forever, spawning a task per update.
    pub async fn run_polling(&self, poll_timeout_secs: u64) {
        let mut offset = 0;
        tracing::info!(poll_timeout_secs, "Polling for Telegram updates");

        loop {
            match self.client.get_updates(offset, poll_timeout_secs).await {
                Ok(updates) => {
                    for update in updates {
                        offset = offset.max(update.update_id + 1);

                        let handler = self.clone();
                        let span = tracing::info_span!("update", update_id = update.update_id);
                        tokio::spawn(async move { handler.handle_update(update).await }.instrument(span));
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to fetch updates");
                    tokio::time::sleep(POLL_ERROR_BACKOFF).await;
                }
            }
        }
    }

    /// Handle one update, replying with an apology on any error or panic.
    pub async fn handle_update(&self, update: Update) {
        let chat_id = chat_id_of(&update);

        let outcome = AssertUnwindSafe(self.dispatch(update)).catch_unwind().await;

        let failed = match outcome {
            Ok(Ok(())) => false,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Update handling failed");
                true
            }
            Err(_) => {
                tracing::error!("Update handler panicked");
                true
            }
        };

        if let Some(chat_id) = chat_id.filter(|_| failed) {
            if let Err(e) = self.client.send_message(chat_id, APOLOGY_REPLY, None).await {
                tracing::error!(chat_id, error = %e, "Failed to send apology");
            }
        }
    }

    async fn dispatch(&self, update: Update) -> Result<(), BotError> {
        if let Some(callback) = update.callback_query {
            return self.handle_callback(callback).await;
        }
        if let Some(message) = update.message {
            return self.handle_message(message).await;
        }
        Ok(())
    }

    async fn handle_message(&self, message: Message) -> Result<(), BotError> {
        let Some(from) = message.from.as_ref().filter(|user| !user.is_bot) else {
            return Ok(());
        };
        let Some(text) = message.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(());
        };
        let chat_id = message.chat.id;

        if text.starts_with('/') {
            let Some(command) = Command::parse(text) else {
                tracing::debug!(user_id = from.id, "Ignoring unknown command");
                return Ok(());
            };
            metrics::record_message(command.name());
            let reply = commands::respond(command, from.id, &from.first_name, self.pipeline.usage());
            return self.send_reply(chat_id, &reply).await;
        }

        if let Err(e) = self.client.send_chat_action(chat_id, "typing").await {
            tracing::warn!(chat_id, error = %e, "Failed to send typing action");
        }

        let reply = self
            .pipeline
            .handle_text(from.id, &from.first_name, text)
            .await;
        self.send_reply(chat_id, &reply).await
    }

    async fn handle_callback(&self, callback: CallbackQuery) -> Result<(), BotError> {
        if let Err(e) = self.client.answer_callback_query(&callback.id).await {
            tracing::warn!(error = %e, "Failed to answer callback query");
        }

        let Some(chat_id) = callback.message.as_ref().map(|m| m.chat.id) else {
            return Ok(());
        };
        let Some(command) = callback.data.as_deref().and_then(Command::from_callback) else {
            tracing::debug!(data = ?callback.data, "Ignoring unknown callback");
            return Ok(());
        };

        metrics::record_message(command.name());
        let reply = commands::respond(
            command,
            callback.from.id,
            &callback.from.first_name,
            self.pipeline.usage(),
        );
        self.send_reply(chat_id, &reply).await
    }

    /// Send every message in order; the keyboard goes on the last one.
    async fn send_reply(&self, chat_id: i64, reply: &Reply) -> Result<(), BotError> {
        let keyboard = reply.keyboard.then(main_keyboard);
        let last = reply.messages.len().saturating_sub(1);

        for (index, text) in reply.messages.iter().enumerate() {
            if text.trim().is_empty() {
                continue;
            }
            let markup = if index == last { keyboard.as_ref() } else { None };
            self.client.send_message(chat_id, text, markup).await?;
        }

        Ok(())
    }
}

fn chat_id_of(update: &Update) -> Option<i64> {
    update
        .message
        .as_ref()
        .or_else(|| update.callback_query.as_ref().and_then(|c| c.message.as_ref()))
        .map(|m| m.chat.id)
}
