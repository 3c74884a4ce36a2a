//! Telegram Bot API client.
//!
//! Thin JSON-over-HTTP client covering the handful of methods the bot uses:
//! `getMe`, `getUpdates` (long polling), `sendMessage`, `sendChatAction` and
//! `answerCallbackQuery`.

use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Telegram Bot API base URL.
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Extra time granted to a long-poll request on top of its server-side timeout.
const POLL_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum BotError {
    #[error("Telegram request failed: {0}")]
    Http(String),

    #[error("Telegram API error {code}: {description}")]
    Api { code: i32, description: String },

    #[error("Unexpected Telegram response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub token: Secret<String>,
    pub base_url: String,
    pub timeout: Duration,
}

impl TelegramConfig {
    pub fn new(token: Secret<String>) -> Self {
        Self {
            token,
            base_url: TELEGRAM_API_BASE.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Clone)]
pub struct TelegramClient {
    config: TelegramConfig,
    client: Client,
}

impl TelegramClient {
    pub fn new(config: TelegramConfig) -> Result<Self, BotError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BotError::Http(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.token.expose_secret(),
            method
        )
    }

    async fn call<P, R>(&self, method: &str, params: &P, timeout: Option<Duration>) -> Result<R, BotError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut request = self.client.post(self.method_url(method)).json(params);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        // The URL embeds the token, so it is stripped from transport errors.
        let response = request
            .send()
            .await
            .map_err(|e| BotError::Http(e.without_url().to_string()))?;

        let status = response.status();
        let body: ApiResponse<R> = response
            .json()
            .await
            .map_err(|e| BotError::Decode(format!("{} ({})", e.without_url(), status)))?;

        if !body.ok {
            return Err(BotError::Api {
                code: body.error_code.unwrap_or(status.as_u16() as i32),
                description: body.description.unwrap_or_default(),
            });
        }

        body.result
            .ok_or_else(|| BotError::Decode(format!("{} returned ok without a result", method)))
    }

    /// Identity of the bot; used to validate the token at startup.
    pub async fn get_me(&self) -> Result<User, BotError> {
        self.call("getMe", &serde_json::json!({}), None).await
    }

    /// Long-poll for updates with id >= `offset`.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>, BotError> {
        let params = GetUpdates {
            offset,
            timeout: timeout_secs,
            allowed_updates: &["message", "callback_query"],
        };

        self.call(
            "getUpdates",
            &params,
            Some(Duration::from_secs(timeout_secs) + POLL_GRACE),
        )
        .await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<Message, BotError> {
        let params = SendMessage {
            chat_id,
            text,
            reply_markup: keyboard,
        };

        self.call("sendMessage", &params, None).await
    }

    /// Show a transient status such as `typing` in the chat.
    pub async fn send_chat_action(&self, chat_id: i64, action: &str) -> Result<bool, BotError> {
        self.call(
            "sendChatAction",
            &serde_json::json!({ "chat_id": chat_id, "action": action }),
            None,
        )
        .await
    }

    pub async fn answer_callback_query(&self, callback_query_id: &str) -> Result<bool, BotError> {
        self.call(
            "answerCallbackQuery",
            &serde_json::json!({ "callback_query_id": callback_query_id }),
            None,
        )
        .await
    }
}

// ============================================================================
// Bot API Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i32>,
}

#[derive(Debug, Serialize)]
struct GetUpdates<'a> {
    offset: i64,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a InlineKeyboardMarkup>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Message>,
    pub data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_deserialization() {
        let raw = r#"{
            "update_id": 42,
            "message": {
                "message_id": 7,
                "chat": {"id": 100, "type": "private"},
                "from": {"id": 5, "is_bot": false, "first_name": "Amel"},
                "date": 1700000000,
                "text": "Bonjour"
            }
        }"#;

        let update: Update = serde_json::from_str(raw).unwrap();
        let message = update.message.unwrap();
        assert_eq!(update.update_id, 42);
        assert_eq!(message.chat.id, 100);
        assert_eq!(message.from.unwrap().first_name, "Amel");
        assert_eq!(message.text.as_deref(), Some("Bonjour"));
        assert!(update.callback_query.is_none());
    }

    #[test]
    fn test_send_message_omits_missing_keyboard() {
        let params = SendMessage {
            chat_id: 1,
            text: "hi",
            reply_markup: None,
        };
        let value = serde_json::to_value(&params).unwrap();
        assert!(value.get("reply_markup").is_none());
    }

    #[test]
    fn test_method_url_embeds_token() {
        let mut config = TelegramConfig::new(Secret::new("123:abc".to_string()));
        config.base_url = "http://localhost:9999/".to_string();
        let client = TelegramClient::new(config).unwrap();
        assert_eq!(client.method_url("getMe"), "http://localhost:9999/bot123:abc/getMe");
    }
}
