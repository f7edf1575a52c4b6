//! Chat gateway boundary.
//!
//! The timer core needs exactly one thing from the transport: a way to push
//! an outbound message to a chat. Inbound delivery is the transport's own
//! loop handing `(chat, text)` pairs to the bot. The core makes no
//! assumption about message formatting or markup.

pub mod telegram;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::ChatId;

/// Errors that can occur talking to the transport.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport rejected the request: {0}")]
    Api(String),
}

/// Outbound side of the chat transport.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Deliver `text` to `chat`.
    async fn send_message(&self, chat: ChatId, text: &str) -> Result<(), GatewayError>;
}

/// An inbound message as handed to the bot by the transport.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub chat: ChatId,
    pub text: String,
    /// Sender's username, when the transport knows it. Used for logging
    /// only.
    pub username: Option<String>,
}
