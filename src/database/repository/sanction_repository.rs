//! Global sanction repository, shared by global bans and global mutes.
//!
//! The sanctioned-user list is global. Each chat may opt out of enforcing it.

use async_trait::async_trait;

use super::Feature;
use crate::cache::{Change, KeyedCacheStore, MigratePolicy};
use crate::database::models::{SanctionSetting, SanctionedUser};
use crate::database::{ChatKey, Storage, StoreResult, UserId, UserKey};

pub struct GlobalSanctionRepository {
    name: &'static str,
    users: KeyedCacheStore<SanctionedUser>,
    settings: KeyedCacheStore<SanctionSetting>,
}

impl GlobalSanctionRepository {
    /// Global bans, stored in `gbans` / `gban_settings`.
    pub fn gbans(storage: &Storage) -> Self {
        Self::new(storage, "gbans", "gban_settings")
    }

    /// Global mutes, stored in `gmutes` / `gmute_settings`.
    pub fn gmutes(storage: &Storage) -> Self {
        Self::new(storage, "gmutes", "gmute_settings")
    }

    fn new(storage: &Storage, name: &'static str, settings: &str) -> Self {
        Self {
            name,
            users: KeyedCacheStore::new(storage.partition(name), MigratePolicy::Reinsert),
            settings: KeyedCacheStore::new(
                storage.partition(settings),
                MigratePolicy::ReplaceTarget,
            ),
        }
    }

    /// Sanction a user, replacing name and reason if already sanctioned.
    pub async fn add(&self, user_id: UserId, name: &str, reason: Option<&str>) -> StoreResult<()> {
        self.users
            .upsert(SanctionedUser {
                user_id,
                name: name.to_string(),
                reason: reason.map(str::to_string),
            })
            .await
    }

    /// Update name and reason of an existing sanction.
    ///
    /// Returns the record as it was before, or `None` (and writes nothing) if
    /// the user is not sanctioned.
    pub async fn update_reason(
        &self,
        user_id: UserId,
        name: &str,
        reason: Option<&str>,
    ) -> StoreResult<Option<SanctionedUser>> {
        self.users
            .modify(&UserKey::new(user_id), |current| match current {
                Some(previous) => {
                    let updated = SanctionedUser {
                        user_id,
                        name: name.to_string(),
                        reason: reason.map(str::to_string),
                    };
                    (Change::Put(updated), Some(previous.clone()))
                }
                None => (Change::Keep, None),
            })
            .await
    }

    pub async fn remove(&self, user_id: UserId) -> StoreResult<bool> {
        self.users.delete(&UserKey::new(user_id)).await
    }

    pub fn is_sanctioned(&self, user_id: UserId) -> bool {
        self.users.contains(&UserKey::new(user_id))
    }

    pub fn get(&self, user_id: UserId) -> Option<SanctionedUser> {
        self.users.get(&UserKey::new(user_id))
    }

    pub fn list(&self) -> Vec<SanctionedUser> {
        self.users.scan(|_| true)
    }

    pub async fn enable_in_chat(&self, chat_id: &str) -> StoreResult<()> {
        self.set_enforce(chat_id, true).await
    }

    pub async fn disable_in_chat(&self, chat_id: &str) -> StoreResult<()> {
        self.set_enforce(chat_id, false).await
    }

    async fn set_enforce(&self, chat_id: &str, enforce: bool) -> StoreResult<()> {
        self.settings
            .upsert(SanctionSetting {
                chat_id: chat_id.to_string(),
                enforce,
            })
            .await
    }

    /// Chats enforce the list unless they opted out.
    pub fn chat_enforces(&self, chat_id: &str) -> bool {
        self.settings
            .get(&ChatKey::new(chat_id))
            .is_none_or(|s| s.enforce)
    }

    pub fn count(&self) -> usize {
        self.users.len()
    }
}

#[async_trait]
impl Feature for GlobalSanctionRepository {
    fn name(&self) -> &str {
        self.name
    }

    async fn load_all(&self) -> StoreResult<usize> {
        Ok(self.users.load_all().await? + self.settings.load_all().await?)
    }

    async fn migrate_chat(&self, old_chat: &str, new_chat: &str) -> StoreResult<u64> {
        self.settings.migrate_chat(old_chat, new_chat).await
    }

    fn cached(&self) -> usize {
        self.users.len() + self.settings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repo() -> GlobalSanctionRepository {
        let repo = GlobalSanctionRepository::gbans(&Storage::Memory);
        repo.load_all().await.unwrap();
        repo
    }

    #[tokio::test]
    async fn test_update_reason_returns_previous() {
        let repo = repo().await;
        assert_eq!(repo.update_reason(9, "spammer", Some("x")).await.unwrap(), None);
        assert!(!repo.is_sanctioned(9));

        repo.add(9, "spammer", Some("spam")).await.unwrap();
        let previous = repo
            .update_reason(9, "spammer2", Some("more spam"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(previous.reason.as_deref(), Some("spam"));
        assert_eq!(repo.get(9).unwrap().name, "spammer2");
        assert_eq!(repo.count(), 1);

        assert!(repo.remove(9).await.unwrap());
        assert!(repo.list().is_empty());
    }

    #[tokio::test]
    async fn test_chat_enforcement_defaults_on() {
        let repo = repo().await;
        assert!(repo.chat_enforces("-1"));

        repo.disable_in_chat("-1").await.unwrap();
        assert!(!repo.chat_enforces("-1"));

        repo.migrate_chat("-1", "-100").await.unwrap();
        assert!(!repo.chat_enforces("-100"));
        assert!(repo.chat_enforces("-1"));

        repo.enable_in_chat("-100").await.unwrap();
        assert!(repo.chat_enforces("-100"));
    }

    #[tokio::test]
    async fn test_gbans_and_gmutes_are_separate() {
        let storage = Storage::Memory;
        let gbans = GlobalSanctionRepository::gbans(&storage);
        let gmutes = GlobalSanctionRepository::gmutes(&storage);
        gbans.load_all().await.unwrap();
        gmutes.load_all().await.unwrap();

        gbans.add(1, "a", None).await.unwrap();
        assert!(gbans.is_sanctioned(1));
        assert!(!gmutes.is_sanctioned(1));
        assert_eq!(gmutes.name(), "gmutes");
    }
}
