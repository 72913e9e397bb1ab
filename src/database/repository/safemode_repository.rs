//! Safe mode repository.

use async_trait::async_trait;

use super::Feature;
use crate::cache::{KeyedCacheStore, MigratePolicy};
use crate::database::models::SafeMode;
use crate::database::{ChatKey, Storage, StoreResult};

pub struct SafeModeRepository {
    settings: KeyedCacheStore<SafeMode>,
}

impl SafeModeRepository {
    pub fn new(storage: &Storage) -> Self {
        Self {
            settings: KeyedCacheStore::new(
                storage.partition("safemode"),
                MigratePolicy::ReplaceTarget,
            ),
        }
    }

    pub async fn set_safemode(&self, chat_id: &str, safemode: bool) -> StoreResult<()> {
        self.settings
            .upsert(SafeMode {
                chat_id: chat_id.to_string(),
                safemode,
            })
            .await
    }

    /// Off unless explicitly enabled.
    pub fn is_safemoded(&self, chat_id: &str) -> bool {
        self.settings
            .get(&ChatKey::new(chat_id))
            .is_some_and(|s| s.safemode)
    }
}

#[async_trait]
impl Feature for SafeModeRepository {
    fn name(&self) -> &str {
        "safemode"
    }

    async fn load_all(&self) -> StoreResult<usize> {
        self.settings.load_all().await
    }

    async fn migrate_chat(&self, old_chat: &str, new_chat: &str) -> StoreResult<u64> {
        self.settings.migrate_chat(old_chat, new_chat).await
    }

    fn cached(&self) -> usize {
        self.settings.len()
    }
}
