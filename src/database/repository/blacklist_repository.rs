//! Blacklist repository.

use std::collections::BTreeSet;

use async_trait::async_trait;

use super::Feature;
use crate::cache::{KeyedCacheStore, MigratePolicy};
use crate::database::models::BlacklistTrigger;
use crate::database::{Record, Storage, StoreResult};

pub struct BlacklistRepository {
    triggers: KeyedCacheStore<BlacklistTrigger>,
}

impl BlacklistRepository {
    pub fn new(storage: &Storage) -> Self {
        Self {
            triggers: KeyedCacheStore::new(storage.partition("blacklist"), MigratePolicy::Union),
        }
    }

    /// Blacklist a trigger. Triggers are case-insensitive.
    pub async fn add_to_blacklist(&self, chat_id: &str, trigger: &str) -> StoreResult<()> {
        self.triggers
            .upsert(BlacklistTrigger::new(chat_id, trigger))
            .await
    }

    pub async fn rm_from_blacklist(&self, chat_id: &str, trigger: &str) -> StoreResult<bool> {
        let key = BlacklistTrigger::new(chat_id, trigger).key();
        self.triggers.delete(&key).await
    }

    pub fn get_chat_blacklist(&self, chat_id: &str) -> BTreeSet<String> {
        self.triggers
            .chat(chat_id)
            .into_iter()
            .map(|t| t.trigger)
            .collect()
    }

    pub async fn num_blacklist_filters(&self) -> StoreResult<u64> {
        self.triggers.count_store().await
    }

    pub async fn num_blacklist_chat_filters(&self, chat_id: &str) -> StoreResult<u64> {
        self.triggers.count_store_chat(chat_id).await
    }

    pub async fn num_blacklist_filter_chats(&self) -> StoreResult<u64> {
        self.triggers.distinct_chats_store().await
    }
}

#[async_trait]
impl Feature for BlacklistRepository {
    fn name(&self) -> &str {
        "blacklist"
    }

    async fn load_all(&self) -> StoreResult<usize> {
        self.triggers.load_all().await
    }

    async fn migrate_chat(&self, old_chat: &str, new_chat: &str) -> StoreResult<u64> {
        self.triggers.migrate_chat(old_chat, new_chat).await
    }

    fn cached(&self) -> usize {
        self.triggers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repo() -> BlacklistRepository {
        let repo = BlacklistRepository::new(&Storage::Memory);
        repo.load_all().await.unwrap();
        repo
    }

    #[tokio::test]
    async fn test_triggers_are_case_insensitive() {
        let repo = repo().await;
        repo.add_to_blacklist("-1", "Spam").await.unwrap();
        repo.add_to_blacklist("-1", "spam").await.unwrap();
        repo.add_to_blacklist("-1", "scam").await.unwrap();

        let triggers: Vec<String> = repo.get_chat_blacklist("-1").into_iter().collect();
        assert_eq!(triggers, vec!["scam", "spam"]);
        assert!(repo.rm_from_blacklist("-1", "SPAM").await.unwrap());
        assert_eq!(repo.num_blacklist_chat_filters("-1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_migration_unions_triggers() {
        let repo = repo().await;
        repo.add_to_blacklist("-1", "a").await.unwrap();
        repo.add_to_blacklist("-1", "b").await.unwrap();
        repo.add_to_blacklist("-100", "b").await.unwrap();
        repo.add_to_blacklist("-100", "c").await.unwrap();

        repo.migrate_chat("-1", "-100").await.unwrap();

        let merged: Vec<String> = repo.get_chat_blacklist("-100").into_iter().collect();
        assert_eq!(merged, vec!["a", "b", "c"]);
        assert!(repo.get_chat_blacklist("-1").is_empty());
        assert_eq!(repo.num_blacklist_filters().await.unwrap(), 3);
        assert_eq!(repo.num_blacklist_filter_chats().await.unwrap(), 1);
    }
}
