//! Locks and restrictions repository.

use async_trait::async_trait;

use super::Feature;
use crate::cache::{Change, KeyedCacheStore, MigratePolicy};
use crate::database::models::{ChatPermissions, ChatRestrictions, LockType, RestrictionType};
use crate::database::{ChatKey, Storage, StoreResult};

pub struct LocksRepository {
    permissions: KeyedCacheStore<ChatPermissions>,
    restrictions: KeyedCacheStore<ChatRestrictions>,
}

impl LocksRepository {
    pub fn new(storage: &Storage) -> Self {
        Self {
            permissions: KeyedCacheStore::new(
                storage.partition("permissions"),
                MigratePolicy::ReplaceTarget,
            ),
            restrictions: KeyedCacheStore::new(
                storage.partition("restrictions"),
                MigratePolicy::ReplaceTarget,
            ),
        }
    }

    /// Create the chat's lock record, or wipe it when `reset` is set.
    pub async fn init_permissions(&self, chat_id: &str, reset: bool) -> StoreResult<ChatPermissions> {
        self.permissions
            .modify(&ChatKey::new(chat_id), |current| match current {
                Some(perms) if !reset => (Change::Keep, perms.clone()),
                _ => {
                    let fresh = ChatPermissions::new(chat_id);
                    (Change::Put(fresh.clone()), fresh)
                }
            })
            .await
    }

    /// Create the chat's restriction record, or wipe it when `reset` is set.
    pub async fn init_restrictions(
        &self,
        chat_id: &str,
        reset: bool,
    ) -> StoreResult<ChatRestrictions> {
        self.restrictions
            .modify(&ChatKey::new(chat_id), |current| match current {
                Some(restr) if !reset => (Change::Keep, restr.clone()),
                _ => {
                    let fresh = ChatRestrictions::new(chat_id);
                    (Change::Put(fresh.clone()), fresh)
                }
            })
            .await
    }

    pub async fn update_lock(&self, chat_id: &str, lock: LockType, locked: bool) -> StoreResult<()> {
        self.permissions
            .modify(&ChatKey::new(chat_id), |current| {
                let mut perms = current
                    .cloned()
                    .unwrap_or_else(|| ChatPermissions::new(chat_id));
                perms.set(lock, locked);
                (Change::Put(perms), ())
            })
            .await
    }

    pub async fn update_restriction(
        &self,
        chat_id: &str,
        restriction: RestrictionType,
        locked: bool,
    ) -> StoreResult<()> {
        self.restrictions
            .modify(&ChatKey::new(chat_id), |current| {
                let mut restr = current
                    .cloned()
                    .unwrap_or_else(|| ChatRestrictions::new(chat_id));
                restr.set(restriction, locked);
                (Change::Put(restr), ())
            })
            .await
    }

    pub fn is_locked(&self, chat_id: &str, lock: LockType) -> bool {
        self.permissions
            .get(&ChatKey::new(chat_id))
            .is_some_and(|p| p.is_locked(lock))
    }

    pub fn is_restr_locked(&self, chat_id: &str, restriction: RestrictionType) -> bool {
        self.restrictions
            .get(&ChatKey::new(chat_id))
            .is_some_and(|r| r.is_restricted(restriction))
    }

    pub fn get_locks(&self, chat_id: &str) -> Option<ChatPermissions> {
        self.permissions.get(&ChatKey::new(chat_id))
    }

    pub fn get_restr(&self, chat_id: &str) -> Option<ChatRestrictions> {
        self.restrictions.get(&ChatKey::new(chat_id))
    }
}

#[async_trait]
impl Feature for LocksRepository {
    fn name(&self) -> &str {
        "locks"
    }

    async fn load_all(&self) -> StoreResult<usize> {
        Ok(self.permissions.load_all().await? + self.restrictions.load_all().await?)
    }

    async fn migrate_chat(&self, old_chat: &str, new_chat: &str) -> StoreResult<u64> {
        let moved = self.permissions.migrate_chat(old_chat, new_chat).await?;
        Ok(moved + self.restrictions.migrate_chat(old_chat, new_chat).await?)
    }

    fn cached(&self) -> usize {
        self.permissions.len() + self.restrictions.len()
    }
}
