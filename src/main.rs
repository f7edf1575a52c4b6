use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use alarm_bot::bot::Bot;
use alarm_bot::config::{self, AppConfig};
use alarm_bot::gateway::telegram::TelegramGateway;
use alarm_bot::registry::TimerRegistry;

#[derive(Parser)]
#[command(name = "alarm-bot")]
#[command(about = "Telegram alarm/reminder bot with per-chat one-shot timers")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting alarm-bot v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::from_file_or_default(&cli.config)
        .with_context(|| format!("loading config from {:?}", cli.config))?;
    let token = config::bot_token_from_env()?;

    let gateway = Arc::new(TelegramGateway::new(
        &token,
        &config.api_root,
        config.poll_timeout_seconds,
    )?);
    let registry = TimerRegistry::new();
    let bot = Bot::new(Arc::clone(&gateway), registry);

    run_poll_loop(bot, gateway).await
}

/// Long-poll for updates and hand each text message to its own task.
async fn run_poll_loop(bot: Bot<TelegramGateway>, gateway: Arc<TelegramGateway>) -> Result<()> {
    let mut offset = 0i64;

    loop {
        match gateway.get_updates(offset).await {
            Ok(updates) => {
                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    if let Some(inbound) = update.into_inbound() {
                        let bot = bot.clone();
                        tokio::spawn(async move {
                            bot.handle_message(inbound).await;
                        });
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "getUpdates failed, backing off");
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
        }
    }
}
