//! Antiflood repository.
//!
//! The limit is persisted; the per-chat flood tracker is in-memory only and
//! starts empty after a restart.

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use super::Feature;
use crate::cache::{KeyedCacheStore, MigratePolicy};
use crate::database::models::FloodControl;
use crate::database::{ChatId, ChatKey, Storage, StoreResult, UserId};

/// Last sender of a chat and how many messages in a row they sent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct FloodState {
    user_id: Option<UserId>,
    count: u32,
}

pub struct AntifloodRepository {
    limits: KeyedCacheStore<FloodControl>,
    tracker: DashMap<ChatId, FloodState>,
}

impl AntifloodRepository {
    pub fn new(storage: &Storage) -> Self {
        Self {
            limits: KeyedCacheStore::new(
                storage.partition("antiflood"),
                MigratePolicy::ReplaceTarget,
            ),
            tracker: DashMap::new(),
        }
    }

    /// Set the flood limit (0 disables) and restart counting.
    pub async fn set_flood(&self, chat_id: &str, limit: u32) -> StoreResult<()> {
        self.limits
            .upsert(FloodControl {
                chat_id: chat_id.to_string(),
                limit,
            })
            .await?;

        self.tracker.insert(chat_id.to_string(), FloodState::default());
        Ok(())
    }

    /// Current limit, 0 when unset.
    pub fn get_flood_limit(&self, chat_id: &str) -> u32 {
        self.limits
            .get(&ChatKey::new(chat_id))
            .map_or(0, |f| f.limit)
    }

    /// Count a message from `user_id` and report whether it is a flood.
    ///
    /// A different (or anonymous) sender restarts the count. Once the same
    /// sender exceeds the limit, the tracker resets and `true` is returned.
    pub fn update_flood(&self, chat_id: &str, user_id: Option<UserId>) -> bool {
        let limit = self.get_flood_limit(chat_id);
        if limit == 0 {
            return false;
        }

        let mut state = self.tracker.entry(chat_id.to_string()).or_default();

        if user_id.is_none() || state.user_id != user_id {
            *state = FloodState { user_id, count: 1 };
            return false;
        }

        state.count += 1;
        if state.count > limit {
            debug!("Flood detected in chat {} from {:?}", chat_id, user_id);
            *state = FloodState::default();
            return true;
        }

        false
    }
}

#[async_trait]
impl Feature for AntifloodRepository {
    fn name(&self) -> &str {
        "antiflood"
    }

    async fn load_all(&self) -> StoreResult<usize> {
        self.limits.load_all().await
    }

    async fn migrate_chat(&self, old_chat: &str, new_chat: &str) -> StoreResult<u64> {
        let moved = self.limits.migrate_chat(old_chat, new_chat).await?;

        if let Some((_, state)) = self.tracker.remove(old_chat) {
            self.tracker.insert(new_chat.to_string(), state);
        }
        Ok(moved)
    }

    fn cached(&self) -> usize {
        self.limits.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repo() -> AntifloodRepository {
        let repo = AntifloodRepository::new(&Storage::Memory);
        repo.load_all().await.unwrap();
        repo
    }

    #[tokio::test]
    async fn test_unset_or_zero_never_floods() {
        let repo = repo().await;
        for _ in 0..10 {
            assert!(!repo.update_flood("-1", Some(1)));
        }

        repo.set_flood("-1", 0).await.unwrap();
        for _ in 0..10 {
            assert!(!repo.update_flood("-1", Some(1)));
        }
    }

    #[tokio::test]
    async fn test_same_sender_exceeding_limit_floods() {
        let repo = repo().await;
        repo.set_flood("-1", 3).await.unwrap();

        assert!(!repo.update_flood("-1", Some(1)));
        assert!(!repo.update_flood("-1", Some(1)));
        assert!(!repo.update_flood("-1", Some(1)));
        assert!(repo.update_flood("-1", Some(1)));
        // Tracker was reset.
        assert!(!repo.update_flood("-1", Some(1)));
    }

    #[tokio::test]
    async fn test_other_sender_restarts_count() {
        let repo = repo().await;
        repo.set_flood("-1", 2).await.unwrap();

        assert!(!repo.update_flood("-1", Some(1)));
        assert!(!repo.update_flood("-1", Some(1)));
        assert!(!repo.update_flood("-1", Some(2)));
        assert!(!repo.update_flood("-1", None));
        assert!(!repo.update_flood("-1", None));
        assert!(!repo.update_flood("-1", None));
    }

    #[tokio::test]
    async fn test_migration_moves_limit_and_tracker() {
        let repo = repo().await;
        repo.set_flood("-1", 2).await.unwrap();
        repo.update_flood("-1", Some(5));
        repo.update_flood("-1", Some(5));

        repo.migrate_chat("-1", "-100").await.unwrap();
        assert_eq!(repo.get_flood_limit("-100"), 2);
        assert_eq!(repo.get_flood_limit("-1"), 0);
        assert!(repo.update_flood("-100", Some(5)));
    }
}
