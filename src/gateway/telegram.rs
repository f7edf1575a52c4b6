//! Telegram Bot API transport.
//!
//! Long-polls `getUpdates` and sends replies through `sendMessage`. Every
//! outbound message carries the same persistent reply keyboard with the
//! "List" and "Clear all" quick-action buttons; the keyboard is the only UI
//! state the bot exposes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Gateway, GatewayError, InboundMessage};
use crate::models::ChatId;

/// One entry from `getUpdates`.
#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub from: Option<User>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct User {
    #[serde(default)]
    pub username: Option<String>,
}

impl Update {
    /// Extract the `(chat, text)` pair the bot cares about, if this update
    /// is a text message.
    pub fn into_inbound(self) -> Option<InboundMessage> {
        let message = self.message?;
        let text = message.text?;
        Some(InboundMessage {
            chat: ChatId(message.chat.id),
            text,
            username: message.from.and_then(|u| u.username),
        })
    }
}

/// Envelope every Bot API response arrives in.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct GetUpdatesRequest {
    offset: i64,
    timeout: u64,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    reply_markup: &'a ReplyKeyboardMarkup,
}

#[derive(Debug, Serialize)]
struct ReplyKeyboardMarkup {
    keyboard: Vec<Vec<KeyboardButton>>,
    resize_keyboard: bool,
}

#[derive(Debug, Serialize)]
struct KeyboardButton {
    text: String,
}

fn quick_action_keyboard() -> ReplyKeyboardMarkup {
    ReplyKeyboardMarkup {
        keyboard: vec![vec![
            KeyboardButton {
                text: "List".to_string(),
            },
            KeyboardButton {
                text: "Clear all".to_string(),
            },
        ]],
        resize_keyboard: true,
    }
}

/// Telegram Bot API client.
pub struct TelegramGateway {
    client: Client,
    base_url: String,
    poll_timeout: u64,
    keyboard: ReplyKeyboardMarkup,
}

impl TelegramGateway {
    /// Build a gateway for the given bot token.
    ///
    /// `api_root` is normally `https://api.telegram.org`; overridable for
    /// tests against a local stub. The HTTP timeout is set above the
    /// long-poll timeout so `getUpdates` is never cut short client-side.
    pub fn new(token: &str, api_root: &str, poll_timeout: u64) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(poll_timeout + 10))
            .build()?;

        Ok(Self {
            client,
            base_url: format!("{}/bot{}", api_root.trim_end_matches('/'), token),
            poll_timeout,
            keyboard: quick_action_keyboard(),
        })
    }

    /// Long-poll for new updates after `offset`.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, GatewayError> {
        let url = format!("{}/getUpdates", self.base_url);
        let request = GetUpdatesRequest {
            offset,
            timeout: self.poll_timeout,
        };

        let response = self.client.post(&url).json(&request).send().await?;
        let body: ApiResponse<Vec<Update>> = response.json().await?;

        if !body.ok {
            return Err(GatewayError::Api(
                body.description.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        Ok(body.result.unwrap_or_default())
    }
}

#[async_trait]
impl Gateway for TelegramGateway {
    async fn send_message(&self, chat: ChatId, text: &str) -> Result<(), GatewayError> {
        let url = format!("{}/sendMessage", self.base_url);
        let request = SendMessageRequest {
            chat_id: chat.0,
            text,
            reply_markup: &self.keyboard,
        };

        debug!(%chat, "sending message");

        let response = self.client.post(&url).json(&request).send().await?;
        let body: ApiResponse<serde_json::Value> = response.json().await?;

        if !body.ok {
            return Err(GatewayError::Api(
                body.description.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        Ok(())
    }
}
