//! AFK repository.

use async_trait::async_trait;

use super::Feature;
use crate::cache::{KeyedCacheStore, MigratePolicy};
use crate::database::models::AfkUser;
use crate::database::{Storage, StoreResult, UserId, UserKey};

pub struct AfkRepository {
    users: KeyedCacheStore<AfkUser>,
}

impl AfkRepository {
    pub fn new(storage: &Storage) -> Self {
        Self {
            users: KeyedCacheStore::new(storage.partition("afk_users"), MigratePolicy::Reinsert),
        }
    }

    /// Mark a user as away. Overwrites a previous reason.
    pub async fn set_afk(&self, user_id: UserId, reason: &str) -> StoreResult<()> {
        self.users.upsert(AfkUser::new(user_id, reason)).await
    }

    /// Clear the AFK status. Returns whether the user was away.
    pub async fn rm_afk(&self, user_id: UserId) -> StoreResult<bool> {
        self.users.delete(&UserKey::new(user_id)).await
    }

    pub fn is_afk(&self, user_id: UserId) -> bool {
        self.users.contains(&UserKey::new(user_id))
    }

    pub fn check_afk_status(&self, user_id: UserId) -> Option<AfkUser> {
        self.users.get(&UserKey::new(user_id))
    }
}

#[async_trait]
impl Feature for AfkRepository {
    fn name(&self) -> &str {
        "afk"
    }

    async fn load_all(&self) -> StoreResult<usize> {
        self.users.load_all().await
    }

    fn cached(&self) -> usize {
        self.users.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_afk_lifecycle() {
        let repo = AfkRepository::new(&Storage::Memory);
        repo.load_all().await.unwrap();

        repo.set_afk(42, "lunch").await.unwrap();
        assert!(repo.is_afk(42));
        assert_eq!(repo.check_afk_status(42).map(|a| a.reason).as_deref(), Some("lunch"));

        assert!(repo.rm_afk(42).await.unwrap());
        assert!(!repo.rm_afk(42).await.unwrap());
        assert!(!repo.is_afk(42));
    }
}
