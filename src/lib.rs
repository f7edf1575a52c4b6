//! # Alarm Bot
//!
//! A Telegram reminder bot: send a duration ("1h 30", "90s", "45"), get an
//! "Alarm" message back when it elapses. "List" shows pending timers,
//! "Clear all" cancels them. All state is in-memory for the process
//! lifetime; nothing survives a restart.
//!
//! ## Architecture
//!
//! - **codec**: duration text parsing and formatting (pure functions)
//! - **models**: chat/timer identifiers and the command surface
//! - **timer**: a single deadline-vs-cancel race, fires at most once
//! - **registry**: concurrency-safe per-chat store of active timers
//! - **gateway**: transport boundary and the Telegram Bot API client
//! - **bot**: request handling and replies
//! - **config**: settings file and the token secret

pub mod bot;
pub mod codec;
pub mod config;
pub mod gateway;
pub mod models;
pub mod registry;
pub mod timer;

pub use models::{ChatId, Command, TimerId};
