//! Disabled commands repository.

use std::collections::BTreeSet;

use async_trait::async_trait;

use super::Feature;
use crate::cache::{Change, KeyedCacheStore, MigratePolicy};
use crate::database::models::disabled::CommandKey;
use crate::database::models::DisabledCommand;
use crate::database::{Storage, StoreResult};

pub struct DisabledRepository {
    commands: KeyedCacheStore<DisabledCommand>,
}

fn command_key(chat_id: &str, command: &str) -> CommandKey {
    CommandKey {
        chat_id: chat_id.to_string(),
        command: command.to_string(),
    }
}

impl DisabledRepository {
    pub fn new(storage: &Storage) -> Self {
        Self {
            commands: KeyedCacheStore::new(
                storage.partition("disabled_commands"),
                MigratePolicy::Union,
            ),
        }
    }

    /// Disable a command. Returns `false` if it was already disabled.
    pub async fn disable_command(&self, chat_id: &str, command: &str) -> StoreResult<bool> {
        let key = command_key(chat_id, command);
        self.commands
            .modify(&key, |current| match current {
                Some(_) => (Change::Keep, false),
                None => (
                    Change::Put(DisabledCommand {
                        chat_id: chat_id.to_string(),
                        command: command.to_string(),
                    }),
                    true,
                ),
            })
            .await
    }

    /// Re-enable a command. Returns whether it was disabled.
    pub async fn enable_command(&self, chat_id: &str, command: &str) -> StoreResult<bool> {
        self.commands.delete(&command_key(chat_id, command)).await
    }

    pub fn is_command_disabled(&self, chat_id: &str, command: &str) -> bool {
        self.commands.contains(&command_key(chat_id, command))
    }

    pub fn get_all_disabled(&self, chat_id: &str) -> BTreeSet<String> {
        self.commands
            .chat(chat_id)
            .into_iter()
            .map(|c| c.command)
            .collect()
    }

    pub async fn num_chats(&self) -> StoreResult<u64> {
        self.commands.distinct_chats_store().await
    }

    pub async fn num_disabled(&self) -> StoreResult<u64> {
        self.commands.count_store().await
    }
}

#[async_trait]
impl Feature for DisabledRepository {
    fn name(&self) -> &str {
        "disabled_commands"
    }

    async fn load_all(&self) -> StoreResult<usize> {
        self.commands.load_all().await
    }

    async fn migrate_chat(&self, old_chat: &str, new_chat: &str) -> StoreResult<u64> {
        self.commands.migrate_chat(old_chat, new_chat).await
    }

    fn cached(&self) -> usize {
        self.commands.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disable_is_idempotent() {
        let repo = DisabledRepository::new(&Storage::Memory);
        repo.load_all().await.unwrap();

        assert!(repo.disable_command("-1", "kickme").await.unwrap());
        assert!(!repo.disable_command("-1", "kickme").await.unwrap());
        assert!(repo.is_command_disabled("-1", "kickme"));
        assert!(!repo.is_command_disabled("-2", "kickme"));
        assert_eq!(repo.num_disabled().await.unwrap(), 1);

        assert!(repo.enable_command("-1", "kickme").await.unwrap());
        assert!(!repo.enable_command("-1", "kickme").await.unwrap());
        assert!(repo.get_all_disabled("-1").is_empty());
    }
}
