//! Core identifier types and the inbound command surface.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identity of a conversation, supplied by the transport.
///
/// For Telegram this is the numeric chat id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of a timer, unique within one chat's collection.
///
/// Allocated in creation order; no cross-chat uniqueness is needed or
/// provided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(pub u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What an inbound message asks the bot to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Show pending timers for this chat.
    List,

    /// Cancel every timer for this chat.
    ClearAll,

    /// Anything else: try to parse a duration and schedule, or echo.
    Schedule,
}

impl Command {
    /// Classify a message text.
    ///
    /// Matching is exact and case-sensitive ("List", "Clear all"), same as
    /// the reply-keyboard button labels that produce these messages.
    pub fn classify(text: &str) -> Self {
        match text {
            "List" => Command::List,
            "Clear all" => Command::ClearAll,
            _ => Command::Schedule,
        }
    }
}
