//! Log channel repository.

use async_trait::async_trait;

use super::Feature;
use crate::cache::{Change, KeyedCacheStore, MigratePolicy};
use crate::database::models::LogChannel;
use crate::database::{ChatKey, Storage, StoreResult};

pub struct LogChannelRepository {
    channels: KeyedCacheStore<LogChannel>,
}

impl LogChannelRepository {
    pub fn new(storage: &Storage) -> Self {
        Self {
            channels: KeyedCacheStore::new(
                storage.partition("log_channels"),
                MigratePolicy::ReplaceTarget,
            ),
        }
    }

    pub async fn set_chat_log_channel(&self, chat_id: &str, log_channel: &str) -> StoreResult<()> {
        self.channels
            .upsert(LogChannel {
                chat_id: chat_id.to_string(),
                log_channel: log_channel.to_string(),
            })
            .await
    }

    pub fn get_chat_log_channel(&self, chat_id: &str) -> Option<String> {
        self.channels
            .get(&ChatKey::new(chat_id))
            .map(|c| c.log_channel)
    }

    /// Stop logging, returning the channel that was in use.
    pub async fn stop_chat_logging(&self, chat_id: &str) -> StoreResult<Option<String>> {
        self.channels
            .modify(&ChatKey::new(chat_id), |current| match current {
                Some(channel) => (Change::Remove, Some(channel.log_channel.clone())),
                None => (Change::Keep, None),
            })
            .await
    }

    pub async fn num_logchannels(&self) -> StoreResult<u64> {
        self.channels.count_store().await
    }
}

#[async_trait]
impl Feature for LogChannelRepository {
    fn name(&self) -> &str {
        "log_channels"
    }

    async fn load_all(&self) -> StoreResult<usize> {
        self.channels.load_all().await
    }

    async fn migrate_chat(&self, old_chat: &str, new_chat: &str) -> StoreResult<u64> {
        self.channels.migrate_chat(old_chat, new_chat).await
    }

    fn cached(&self) -> usize {
        self.channels.len()
    }
}
