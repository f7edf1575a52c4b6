//! Request handling.
//!
//! Classifies each inbound message, drives the timer registry, and sends
//! the reply. One spawned task per message, so a slow chat interaction
//! never stalls other chats or timers firing.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::codec;
use crate::gateway::{Gateway, InboundMessage};
use crate::models::{ChatId, Command};
use crate::registry::TimerRegistry;

/// Fixed notification text sent when a timer fires.
const ALARM_TEXT: &str = "Alarm";

/// The request handler: gateway for replies, registry for timer state.
pub struct Bot<G> {
    gateway: Arc<G>,
    registry: TimerRegistry,
}

impl<G> Clone for Bot<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            registry: self.registry.clone(),
        }
    }
}

impl<G: Gateway + 'static> Bot<G> {
    pub fn new(gateway: Arc<G>, registry: TimerRegistry) -> Self {
        Self { gateway, registry }
    }

    /// Handle one inbound message end to end: dispatch, then reply.
    ///
    /// A failed reply is logged and swallowed; registry state is already
    /// consistent by the time the reply goes out.
    pub async fn handle_message(&self, message: InboundMessage) {
        let user = message.username.as_deref().unwrap_or("-");
        info!(%message.chat, user, text = %message.text, "message received");

        let reply = self.dispatch(message.chat, &message.text).await;

        if let Err(e) = self.gateway.send_message(message.chat, &reply).await {
            warn!(%message.chat, error = %e, "failed to send reply");
        }
    }

    /// Run the command and produce the reply text.
    async fn dispatch(&self, chat: ChatId, text: &str) -> String {
        match Command::classify(text) {
            Command::List => self.list_reply(chat).await,
            Command::ClearAll => {
                self.registry.clear_all(chat).await;
                "Done".to_string()
            }
            Command::Schedule => match codec::parse_duration_seconds(text) {
                Some(total_secs) => {
                    self.schedule(chat, total_secs).await;
                    codec::format_seconds(total_secs)
                }
                // No numeric tokens at all: echo the message back verbatim.
                None => text.to_string(),
            },
        }
    }

    async fn list_reply(&self, chat: ChatId) -> String {
        let timers = self.registry.list(chat).await;
        if timers.is_empty() {
            return "List is empty".to_string();
        }

        let mut reply = String::from("List");
        for status in &timers {
            reply.push_str(&format!(
                "\n{} ({})",
                codec::format_seconds(status.remaining.as_secs()),
                codec::format_seconds(status.total.as_secs()),
            ));
        }
        reply
    }

    async fn schedule(&self, chat: ChatId, total_secs: u64) {
        let gateway = Arc::clone(&self.gateway);
        self.registry
            .schedule(chat, Duration::from_secs(total_secs), move || async move {
                if let Err(e) = gateway.send_message(chat, ALARM_TEXT).await {
                    warn!(%chat, error = %e, "failed to deliver alarm");
                }
            })
            .await;
    }
}
