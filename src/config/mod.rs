//! Configuration module for chatvault.
//!
//! Loads configuration from environment variables.

use std::env;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Bot running mode
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BotMode {
    #[default]
    Polling,
    Webhook,
    /// Load the stores, report their sizes and exit without connecting to Telegram.
    Offline,
}

/// Backing store selection
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Mongo,
    Sqlite,
    Memory,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    // Telegram
    pub bot_token: String,
    pub bot_mode: BotMode,
    pub webhook_url: Option<String>,
    pub webhook_port: u16,
    pub webhook_secret: Option<String>,

    // Storage
    pub store_backend: StoreBackend,
    pub mongodb_uri: String,
    pub mongodb_database: String,
    pub sqlite_url: String,
}

impl Config {
    /// Load configuration from the environment (and `.env` if present).
    ///
    /// # Errors
    /// Returns error if a required variable is missing or a value is invalid.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bot_mode = match var("BOT_MODE")
            .unwrap_or_else(|| "polling".to_string())
            .to_lowercase()
            .as_str()
        {
            "polling" => BotMode::Polling,
            "webhook" => BotMode::Webhook,
            "offline" => BotMode::Offline,
            other => bail!("unknown BOT_MODE '{other}' (expected polling, webhook or offline)"),
        };

        let store_backend = match var("STORE_BACKEND")
            .unwrap_or_else(|| "mongo".to_string())
            .to_lowercase()
            .as_str()
        {
            "mongo" | "mongodb" => StoreBackend::Mongo,
            "sqlite" => StoreBackend::Sqlite,
            "memory" => StoreBackend::Memory,
            other => bail!("unknown STORE_BACKEND '{other}' (expected mongo, sqlite or memory)"),
        };

        let webhook_url = var("WEBHOOK_URL").filter(|s| !s.is_empty());

        // Validate webhook URL is set if mode is webhook
        if bot_mode == BotMode::Webhook && webhook_url.is_none() {
            bail!("WEBHOOK_URL must be set when BOT_MODE is webhook");
        }

        let webhook_port = match var("WEBHOOK_PORT") {
            Some(port) => port
                .parse()
                .with_context(|| format!("invalid WEBHOOK_PORT '{port}'"))?,
            None => 8443,
        };

        let bot_token = match var("BOT_TOKEN") {
            Some(token) => token,
            None if bot_mode == BotMode::Offline => String::new(),
            None => bail!("BOT_TOKEN must be set"),
        };

        let mongodb_uri = match var("MONGODB_URI") {
            Some(uri) => uri,
            None if store_backend == StoreBackend::Mongo => {
                bail!("MONGODB_URI must be set when STORE_BACKEND is mongo")
            }
            None => String::new(),
        };

        Ok(Self {
            bot_token,
            bot_mode,
            webhook_url,
            webhook_port,
            webhook_secret: var("WEBHOOK_SECRET").filter(|s| !s.is_empty()),
            store_backend,
            mongodb_uri,
            mongodb_database: var("MONGODB_DATABASE").unwrap_or_else(|| "chatvault".to_string()),
            sqlite_url: var("SQLITE_URL").unwrap_or_else(|| "sqlite://chatvault.db".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("BOT_TOKEN", "123:abc"), ("MONGODB_URI", "mongodb://localhost")]).unwrap();
        assert_eq!(config.bot_mode, BotMode::Polling);
        assert_eq!(config.store_backend, StoreBackend::Mongo);
        assert_eq!(config.webhook_port, 8443);
        assert_eq!(config.mongodb_database, "chatvault");
        assert_eq!(config.sqlite_url, "sqlite://chatvault.db");
    }

    #[test]
    fn test_webhook_requires_url() {
        let err = load(&[
            ("BOT_TOKEN", "t"),
            ("BOT_MODE", "webhook"),
            ("STORE_BACKEND", "memory"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("WEBHOOK_URL"));
    }

    #[test]
    fn test_mongo_requires_uri_but_sqlite_does_not() {
        assert!(load(&[("BOT_TOKEN", "t")]).is_err());

        let config = load(&[("BOT_TOKEN", "t"), ("STORE_BACKEND", "SQLite")]).unwrap();
        assert_eq!(config.store_backend, StoreBackend::Sqlite);
    }

    #[test]
    fn test_offline_needs_no_token() {
        let config = load(&[("BOT_MODE", "offline"), ("STORE_BACKEND", "memory")]).unwrap();
        assert_eq!(config.bot_mode, BotMode::Offline);
        assert!(config.bot_token.is_empty());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(load(&[("BOT_TOKEN", "t"), ("BOT_MODE", "carrier-pigeon")]).is_err());
        assert!(load(&[("BOT_TOKEN", "t"), ("STORE_BACKEND", "redis")]).is_err());
        assert!(load(&[
            ("BOT_TOKEN", "t"),
            ("STORE_BACKEND", "memory"),
            ("WEBHOOK_PORT", "eighty")
        ])
        .is_err());
    }
}
