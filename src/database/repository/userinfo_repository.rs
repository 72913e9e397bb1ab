//! User info and bio repository.

use async_trait::async_trait;

use super::Feature;
use crate::cache::{KeyedCacheStore, MigratePolicy};
use crate::database::models::{UserBio, UserInfo};
use crate::database::{Storage, StoreResult, UserId, UserKey};

pub struct UserInfoRepository {
    info: KeyedCacheStore<UserInfo>,
    bios: KeyedCacheStore<UserBio>,
}

impl UserInfoRepository {
    pub fn new(storage: &Storage) -> Self {
        Self {
            info: KeyedCacheStore::new(storage.partition("userinfo"), MigratePolicy::Reinsert),
            bios: KeyedCacheStore::new(storage.partition("userbio"), MigratePolicy::Reinsert),
        }
    }

    /// Info the user wrote about themselves.
    pub fn get_info(&self, user_id: UserId) -> Option<String> {
        self.info.get(&UserKey::new(user_id)).map(|i| i.info)
    }

    pub async fn set_info(&self, user_id: UserId, info: &str) -> StoreResult<()> {
        self.info
            .upsert(UserInfo {
                user_id,
                info: info.to_string(),
            })
            .await
    }

    pub async fn clear_info(&self, user_id: UserId) -> StoreResult<bool> {
        self.info.delete(&UserKey::new(user_id)).await
    }

    /// Bio written about the user by someone else.
    pub fn get_bio(&self, user_id: UserId) -> Option<String> {
        self.bios.get(&UserKey::new(user_id)).map(|b| b.bio)
    }

    pub async fn set_bio(&self, user_id: UserId, bio: &str) -> StoreResult<()> {
        self.bios
            .upsert(UserBio {
                user_id,
                bio: bio.to_string(),
            })
            .await
    }

    pub async fn clear_bio(&self, user_id: UserId) -> StoreResult<bool> {
        self.bios.delete(&UserKey::new(user_id)).await
    }
}

#[async_trait]
impl Feature for UserInfoRepository {
    fn name(&self) -> &str {
        "userinfo"
    }

    async fn load_all(&self) -> StoreResult<usize> {
        Ok(self.info.load_all().await? + self.bios.load_all().await?)
    }

    fn cached(&self) -> usize {
        self.info.len() + self.bios.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_info_and_bio_are_independent() {
        let repo = UserInfoRepository::new(&Storage::Memory);
        repo.load_all().await.unwrap();

        repo.set_info(1, "rustacean").await.unwrap();
        repo.set_bio(1, "writes parsers").await.unwrap();
        assert!(repo.clear_info(1).await.unwrap());

        assert_eq!(repo.get_info(1), None);
        assert_eq!(repo.get_bio(1).as_deref(), Some("writes parsers"));
        assert!(!repo.clear_info(1).await.unwrap());
    }
}
