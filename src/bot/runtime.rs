//! Bot runtime - polling, webhook and offline runners.

use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use tracing::info;

use super::dispatcher::build_dispatcher;
use super::webhook::start_webhook;
use crate::config::{BotMode, Config};
use crate::database::Repositories;

/// Run the bot with the configured mode.
///
/// The repositories must already be loaded.
pub async fn run(config: &Config, repos: Arc<Repositories>) -> Result<()> {
    if config.bot_mode == BotMode::Offline {
        report(&repos);
        return Ok(());
    }

    let bot = Bot::new(&config.bot_token);

    let me = bot.get_me().await?;
    info!("Bot username: @{}", me.username());
    repos
        .users
        .ensure_bot_in_db(me.id.0 as i64, me.username())
        .await?;

    let mut dispatcher = build_dispatcher(bot.clone(), repos);

    match config.bot_mode {
        BotMode::Webhook => {
            info!("Starting bot in webhook mode...");
            start_webhook(config, dispatcher, bot).await?;
        }
        _ => {
            info!("Starting bot in polling mode...");
            dispatcher.dispatch().await;
        }
    }

    Ok(())
}

/// Log what every feature holds.
fn report(repos: &Repositories) {
    info!("Offline mode: stores loaded, not connecting to Telegram");
    for (feature, cached) in repos.stats() {
        info!("  {:<18} {} records", feature, cached);
    }
}
