//! Rules repository.

use async_trait::async_trait;

use super::Feature;
use crate::cache::{KeyedCacheStore, MigratePolicy};
use crate::database::models::ChatRules;
use crate::database::{ChatKey, Storage, StoreResult};

/// Repository for chat rules.
pub struct RulesRepository {
    rules: KeyedCacheStore<ChatRules>,
}

impl RulesRepository {
    pub fn new(storage: &Storage) -> Self {
        Self {
            rules: KeyedCacheStore::new(storage.partition("rules"), MigratePolicy::ReplaceTarget),
        }
    }

    /// Set (or replace) the rules of a chat.
    pub async fn set_rules(&self, chat_id: &str, rules: &str) -> StoreResult<()> {
        self.rules
            .upsert(ChatRules {
                chat_id: chat_id.to_string(),
                rules: rules.to_string(),
            })
            .await
    }

    /// Get the rules of a chat, or `None` if never set.
    pub fn get_rules(&self, chat_id: &str) -> Option<String> {
        self.rules.get(&ChatKey::new(chat_id)).map(|r| r.rules)
    }

    /// Remove the rules of a chat. Returns whether any were set.
    pub async fn clear_rules(&self, chat_id: &str) -> StoreResult<bool> {
        self.rules.delete(&ChatKey::new(chat_id)).await
    }

    /// Number of chats with rules.
    pub async fn num_chats(&self) -> StoreResult<u64> {
        self.rules.distinct_chats_store().await
    }
}

#[async_trait]
impl Feature for RulesRepository {
    fn name(&self) -> &str {
        "rules"
    }

    async fn load_all(&self) -> StoreResult<usize> {
        self.rules.load_all().await
    }

    async fn migrate_chat(&self, old_chat: &str, new_chat: &str) -> StoreResult<u64> {
        self.rules.migrate_chat(old_chat, new_chat).await
    }

    fn cached(&self) -> usize {
        self.rules.len()
    }
}
