//! chatvault binary: load configuration, connect and load the stores, then
//! run the bot.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use chatvault::bot;
use chatvault::config::Config;
use chatvault::database::{Repositories, Storage};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("chatvault=info,teloxide=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting chatvault...");

    let config = Config::from_env()?;
    info!("Configuration loaded successfully");
    info!("Bot mode: {:?}, store: {:?}", config.bot_mode, config.store_backend);

    let storage = Storage::connect(&config).await?;

    // Every store is loaded before the first update is handled
    let repos = Arc::new(Repositories::new(&storage));
    repos.load_all().await?;

    bot::run(&config, repos).await
}
