//! Write-through keyed cache over a single backend partition.
//!
//! Reads are served from memory only. Every mutation takes the store's async
//! write lock, writes to the backend, and touches the in-memory map only once
//! the backend write has succeeded, so a failed write leaves the cache as it
//! was.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::slots::Slots;
use super::MigratePolicy;
use crate::database::{Backend, Record, StoreError, StoreResult};

/// Outcome of a [`KeyedCacheStore::modify`] closure.
#[derive(Debug)]
pub enum Change<R> {
    /// Leave the record as it is.
    Keep,
    /// Store this record. It must carry the key that was modified.
    Put(R),
    /// Delete the record.
    Remove,
}

/// Write-through cache for one record type.
pub struct KeyedCacheStore<R: Record> {
    name: String,
    policy: MigratePolicy,
    backend: Arc<dyn Backend<R>>,
    slots: RwLock<Slots<R>>,
    write_lock: Mutex<()>,
    ready: AtomicBool,
}

impl<R: Record> KeyedCacheStore<R> {
    pub fn new(backend: Arc<dyn Backend<R>>, policy: MigratePolicy) -> Self {
        Self {
            name: backend.partition().to_string(),
            policy,
            backend,
            slots: RwLock::new(Slots::default()),
            write_lock: Mutex::new(()),
            ready: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> MigratePolicy {
        self.policy
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn ensure_ready(&self) -> StoreResult<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(StoreError::NotReady(self.name.clone()))
        }
    }

    /// Prepare the backend and replace the cache with the partition's contents.
    ///
    /// Runs once during startup. Calling it again rebuilds the cache.
    pub async fn load_all(&self) -> StoreResult<usize> {
        let _guard = self.write_lock.lock().await;

        self.backend.prepare().await?;
        let records = self.backend.scan().await?;
        let slots = Slots::from_records(records);
        let loaded = slots.len();

        *self.slots.write() = slots;
        self.ready.store(true, Ordering::Release);

        info!("Loaded {} records into {}", loaded, self.name);
        Ok(loaded)
    }

    // --- reads ---

    pub fn get(&self, key: &R::Key) -> Option<R> {
        self.slots.read().get(key).cloned()
    }

    pub fn contains(&self, key: &R::Key) -> bool {
        self.slots.read().get(key).is_some()
    }

    /// Every cached record of one chat, in key order.
    pub fn chat(&self, chat_id: &str) -> Vec<R> {
        self.slots.read().chat(chat_id).cloned().collect()
    }

    /// Cached records matching `pred`.
    pub fn scan(&self, pred: impl Fn(&R) -> bool) -> Vec<R> {
        self.slots
            .read()
            .iter()
            .filter(|record| pred(record))
            .cloned()
            .collect()
    }

    /// Backend records matching `pred`, bypassing the cache.
    pub async fn scan_store(&self, pred: impl Fn(&R) -> bool + Send) -> StoreResult<Vec<R>> {
        let records = self.backend.scan().await?;
        Ok(records.into_iter().filter(|record| pred(record)).collect())
    }

    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of chats with at least one cached record.
    pub fn chat_count(&self) -> usize {
        self.slots.read().chat_count()
    }

    pub async fn count_store(&self) -> StoreResult<u64> {
        self.backend.count().await
    }

    pub async fn count_store_chat(&self, chat_id: &str) -> StoreResult<u64> {
        self.backend.count_chat(chat_id).await
    }

    pub async fn distinct_chats_store(&self) -> StoreResult<u64> {
        self.backend.distinct_chats().await
    }

    // --- writes ---

    /// Insert or replace the record under its key.
    pub async fn upsert(&self, record: R) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        self.ensure_ready()?;

        self.backend.upsert(&record).await?;
        debug!("Upserted {:?} in {}", record.key(), self.name);
        self.slots.write().insert(record);

        Ok(())
    }

    /// Insert a record whose key must not exist yet.
    pub async fn insert(&self, record: R) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        self.ensure_ready()?;

        self.backend.insert(&record).await?;
        debug!("Inserted {:?} in {}", record.key(), self.name);
        self.slots.write().insert(record);

        Ok(())
    }

    /// Atomic read-modify-write of one key.
    ///
    /// `f` sees the cached record (if any) and decides the change; the change
    /// is written through before the lock is released. `f`'s second return
    /// value is handed back to the caller.
    pub async fn modify<T, F>(&self, key: &R::Key, f: F) -> StoreResult<T>
    where
        F: FnOnce(Option<&R>) -> (Change<R>, T) + Send,
        T: Send,
    {
        let _guard = self.write_lock.lock().await;
        self.ensure_ready()?;

        let (change, out) = {
            let slots = self.slots.read();
            f(slots.get(key))
        };

        match change {
            Change::Keep => {}
            Change::Put(record) => {
                debug_assert_eq!(&record.key(), key);
                self.backend.upsert(&record).await?;
                debug!("Modified {:?} in {}", key, self.name);
                self.slots.write().insert(record);
            }
            Change::Remove => {
                self.backend.delete(key).await?;
                debug!("Removed {:?} from {}", key, self.name);
                self.slots.write().remove(key);
            }
        }

        Ok(out)
    }

    /// Build a new record from a chat's current records and insert it, all
    /// under the write lock.
    ///
    /// `build` sees the chat's cached records in key order, so keys derived
    /// from them (next position, next sequence number) cannot collide with a
    /// concurrent append.
    pub async fn append<F>(&self, chat_id: &str, build: F) -> StoreResult<R::Key>
    where
        F: FnOnce(&[R]) -> R + Send,
    {
        let _guard = self.write_lock.lock().await;
        self.ensure_ready()?;

        let record = {
            let current = self.chat(chat_id);
            build(&current)
        };
        let key = record.key();

        self.backend.insert(&record).await?;
        debug!("Appended {:?} to {}", key, self.name);
        self.slots.write().insert(record);

        Ok(key)
    }

    /// Delete by key. Returns whether the key existed.
    pub async fn delete(&self, key: &R::Key) -> StoreResult<bool> {
        let _guard = self.write_lock.lock().await;
        self.ensure_ready()?;

        let existed = self.backend.delete(key).await?;
        let cached = self.slots.write().remove(key).is_some();

        if existed || cached {
            debug!("Deleted {:?} from {}", key, self.name);
        }
        Ok(existed || cached)
    }

    /// Delete every record of a chat.
    pub async fn delete_chat(&self, chat_id: &str) -> StoreResult<u64> {
        let _guard = self.write_lock.lock().await;
        self.ensure_ready()?;

        let removed = self.backend.delete_chat(chat_id).await?;
        self.slots.write().take_chat(chat_id);

        debug!("Deleted {} records of chat {} from {}", removed, chat_id, self.name);
        Ok(removed)
    }

    /// Delete the records of a chat matching `pred`.
    pub async fn delete_where(
        &self,
        chat_id: &str,
        pred: impl Fn(&R) -> bool + Send,
    ) -> StoreResult<u64> {
        let _guard = self.write_lock.lock().await;
        self.ensure_ready()?;

        let keys: Vec<R::Key> = self
            .slots
            .read()
            .chat(chat_id)
            .filter(|record| pred(record))
            .map(|record| record.key())
            .collect();

        let mut removed = 0;
        for key in &keys {
            if self.backend.delete(key).await? {
                removed += 1;
            }
            self.slots.write().remove(key);
        }

        if removed > 0 {
            debug!("Deleted {} records of chat {} from {}", removed, chat_id, self.name);
        }
        Ok(removed)
    }

    /// Move every record of `old_chat` to `new_chat`.
    ///
    /// Collisions with records already under `new_chat` follow the store's
    /// [`MigratePolicy`]. A backend failure stops the move; records already
    /// moved stay moved and the old chat keeps whatever was not yet moved.
    pub async fn migrate_chat(&self, old_chat: &str, new_chat: &str) -> StoreResult<u64> {
        if old_chat == new_chat {
            return Ok(0);
        }

        let _guard = self.write_lock.lock().await;
        self.ensure_ready()?;

        let records = self.backend.scan_chat(old_chat).await?;
        if records.is_empty() {
            return Ok(0);
        }

        if self.policy.clears_target() {
            self.backend.delete_chat(new_chat).await?;
            self.slots.write().take_chat(new_chat);
        }

        let mut moved = 0;
        for record in records {
            let record = record.rekey(new_chat);
            self.backend.upsert(&record).await?;
            self.slots.write().insert(record);
            moved += 1;
        }

        self.backend.delete_chat(old_chat).await?;
        self.slots.write().take_chat(old_chat);

        info!(
            "Migrated {} records in {} from {} to {} ({})",
            moved, self.name, old_chat, new_chat, self.policy
        );
        Ok(moved)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::database::{ChatUserKey, MemoryBackend};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Score {
        chat_id: String,
        user_id: i64,
        points: u32,
    }

    impl Record for Score {
        type Key = ChatUserKey;

        fn key(&self) -> ChatUserKey {
            ChatUserKey::new(self.chat_id.clone(), self.user_id)
        }

        fn rekey(mut self, chat_id: &str) -> Self {
            self.chat_id = chat_id.to_string();
            self
        }
    }

    fn score(chat_id: &str, user_id: i64, points: u32) -> Score {
        Score {
            chat_id: chat_id.to_string(),
            user_id,
            points,
        }
    }

    /// Memory backend whose writes can be switched to fail.
    struct FlakyBackend<R: Record> {
        inner: MemoryBackend<R>,
        failing: AtomicBool,
    }

    impl<R: Record> FlakyBackend<R> {
        fn new(partition: &str) -> Self {
            Self {
                inner: MemoryBackend::new(partition),
                failing: AtomicBool::new(false),
            }
        }

        fn check(&self) -> StoreResult<()> {
            if self.failing.load(Ordering::SeqCst) {
                Err(StoreError::Backend("connection reset".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl<R: Record> Backend<R> for FlakyBackend<R> {
        fn partition(&self) -> &str {
            self.inner.partition()
        }

        async fn get(&self, key: &R::Key) -> StoreResult<Option<R>> {
            self.inner.get(key).await
        }

        async fn upsert(&self, record: &R) -> StoreResult<()> {
            self.check()?;
            self.inner.upsert(record).await
        }

        async fn insert(&self, record: &R) -> StoreResult<()> {
            self.check()?;
            self.inner.insert(record).await
        }

        async fn delete(&self, key: &R::Key) -> StoreResult<bool> {
            self.check()?;
            self.inner.delete(key).await
        }

        async fn delete_chat(&self, chat_id: &str) -> StoreResult<u64> {
            self.check()?;
            self.inner.delete_chat(chat_id).await
        }

        async fn scan(&self) -> StoreResult<Vec<R>> {
            self.inner.scan().await
        }

        async fn scan_chat(&self, chat_id: &str) -> StoreResult<Vec<R>> {
            self.inner.scan_chat(chat_id).await
        }

        async fn count(&self) -> StoreResult<u64> {
            self.inner.count().await
        }

        async fn count_chat(&self, chat_id: &str) -> StoreResult<u64> {
            self.inner.count_chat(chat_id).await
        }

        async fn distinct_chats(&self) -> StoreResult<u64> {
            self.inner.distinct_chats().await
        }
    }

    async fn store(policy: MigratePolicy) -> KeyedCacheStore<Score> {
        let store = KeyedCacheStore::new(Arc::new(MemoryBackend::<Score>::new("scores")), policy);
        store.load_all().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_upsert_then_get() {
        let store = store(MigratePolicy::Union).await;
        store.upsert(score("-1", 7, 3)).await.unwrap();
        store.upsert(score("-1", 7, 4)).await.unwrap();

        assert_eq!(store.get(&ChatUserKey::new("-1", 7)), Some(score("-1", 7, 4)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.count_store().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let store = store(MigratePolicy::Union).await;
        store.upsert(score("-1", 7, 3)).await.unwrap();

        let key = ChatUserKey::new("-1", 7);
        assert!(store.delete(&key).await.unwrap());
        assert!(!store.delete(&key).await.unwrap());
        assert!(store.get(&key).is_none());
    }

    #[tokio::test]
    async fn test_not_ready_before_load() {
        let backend = Arc::new(MemoryBackend::<Score>::new("scores"));
        backend.upsert(&score("-1", 1, 1)).await.unwrap();
        let store = KeyedCacheStore::new(backend, MigratePolicy::Union);

        assert!(store.get(&ChatUserKey::new("-1", 1)).is_none());
        let err = store.upsert(score("-1", 2, 1)).await.unwrap_err();
        assert!(matches!(err, StoreError::NotReady(name) if name == "scores"));

        assert_eq!(store.load_all().await.unwrap(), 1);
        assert!(store.contains(&ChatUserKey::new("-1", 1)));
        store.upsert(score("-1", 2, 1)).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_write_leaves_cache_untouched() {
        let backend = Arc::new(FlakyBackend::<Score>::new("scores"));
        let store = KeyedCacheStore::new(backend.clone(), MigratePolicy::Union);
        store.load_all().await.unwrap();
        store.upsert(score("-1", 1, 1)).await.unwrap();

        backend.failing.store(true, Ordering::SeqCst);
        assert!(store.upsert(score("-1", 1, 9)).await.is_err());
        assert!(store.delete(&ChatUserKey::new("-1", 1)).await.is_err());
        assert!(store.migrate_chat("-1", "-2").await.is_err());

        assert_eq!(store.get(&ChatUserKey::new("-1", 1)), Some(score("-1", 1, 1)));
        assert!(store.chat("-2").is_empty());
    }

    #[tokio::test]
    async fn test_insert_existing_key_is_constraint() {
        let store = store(MigratePolicy::Union).await;
        store.insert(score("-1", 1, 1)).await.unwrap();

        let err = store.insert(score("-1", 1, 5)).await.unwrap_err();
        assert!(err.is_constraint());
        assert_eq!(store.get(&ChatUserKey::new("-1", 1)).map(|s| s.points), Some(1));
    }

    #[tokio::test]
    async fn test_modify_returns_value_and_writes_through() {
        let store = store(MigratePolicy::Carry).await;
        let key = ChatUserKey::new("-1", 5);

        for _ in 0..3 {
            store
                .modify(&key, |current| {
                    let points = current.map_or(0, |s| s.points) + 1;
                    (Change::Put(score("-1", 5, points)), points)
                })
                .await
                .unwrap();
        }
        let seen = store
            .modify(&key, |current| (Change::Keep, current.map(|s| s.points)))
            .await
            .unwrap();
        assert_eq!(seen, Some(3));

        store.modify(&key, |_| (Change::Remove, ())).await.unwrap();
        assert!(store.get(&key).is_none());
        assert_eq!(store.count_store().await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_modify_is_serialized() {
        let store = Arc::new(store(MigratePolicy::Carry).await);
        let key = ChatUserKey::new("-1", 1);

        let mut handles = Vec::new();
        for _ in 0..50 {
            let store = Arc::clone(&store);
            let key = key.clone();
            handles.push(tokio::spawn(async move {
                store
                    .modify(&key, |current| {
                        let points = current.map_or(0, |s| s.points) + 1;
                        (Change::Put(score("-1", 1, points)), ())
                    })
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.get(&key).map(|s| s.points), Some(50));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_upserts_to_distinct_keys() {
        let store = Arc::new(store(MigratePolicy::Union).await);

        let mut handles = Vec::new();
        for user_id in 0..64 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.upsert(score("-1", user_id, user_id as u32)).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.len(), 64);
        for user_id in 0..64 {
            assert_eq!(
                store.get(&ChatUserKey::new("-1", user_id)),
                Some(score("-1", user_id, user_id as u32))
            );
        }
        assert_eq!(store.count_store().await.unwrap(), 64);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_appends_get_distinct_keys() {
        let store = Arc::new(store(MigratePolicy::Union).await);

        let mut handles = Vec::new();
        for _ in 0..32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .append("-1", |current| {
                        let next = current.last().map_or(0, |s| s.user_id + 1);
                        score("-1", next, 0)
                    })
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let users: Vec<i64> = store.chat("-1").iter().map(|s| s.user_id).collect();
        assert_eq!(users, (0..32).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_delete_chat_and_delete_where() {
        let store = store(MigratePolicy::Union).await;
        store.upsert(score("-1", 1, 1)).await.unwrap();
        store.upsert(score("-1", 2, 5)).await.unwrap();
        store.upsert(score("-1", 3, 9)).await.unwrap();
        store.upsert(score("-2", 1, 1)).await.unwrap();

        assert_eq!(store.delete_where("-1", |s| s.points > 4).await.unwrap(), 2);
        assert_eq!(store.chat("-1"), vec![score("-1", 1, 1)]);

        assert_eq!(store.delete_chat("-1").await.unwrap(), 1);
        assert!(store.chat("-1").is_empty());
        assert_eq!(store.chat_count(), 1);
        assert_eq!(store.distinct_chats_store().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_migrate_union_keeps_target_rows() {
        let store = store(MigratePolicy::Union).await;
        store.upsert(score("-1", 1, 1)).await.unwrap();
        store.upsert(score("-1", 2, 2)).await.unwrap();
        store.upsert(score("-9", 3, 3)).await.unwrap();

        assert_eq!(store.migrate_chat("-1", "-9").await.unwrap(), 2);

        assert!(store.chat("-1").is_empty());
        let users: Vec<i64> = store.chat("-9").iter().map(|s| s.user_id).collect();
        assert_eq!(users, vec![1, 2, 3]);
        assert_eq!(store.count_store_chat("-1").await.unwrap(), 0);
        assert_eq!(store.count_store_chat("-9").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_migrate_replace_target_drops_target_rows() {
        let store = store(MigratePolicy::ReplaceTarget).await;
        store.upsert(score("-1", 1, 1)).await.unwrap();
        store.upsert(score("-9", 3, 3)).await.unwrap();

        assert_eq!(store.migrate_chat("-1", "-9").await.unwrap(), 1);
        assert_eq!(store.chat("-9"), vec![score("-9", 1, 1)]);
        assert_eq!(store.count_store().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_migrate_collision_takes_migrated_row() {
        let store = store(MigratePolicy::Reinsert).await;
        store.upsert(score("-1", 1, 10)).await.unwrap();
        store.upsert(score("-9", 1, 99)).await.unwrap();

        store.migrate_chat("-1", "-9").await.unwrap();
        assert_eq!(store.get(&ChatUserKey::new("-9", 1)), Some(score("-9", 1, 10)));
    }

    #[tokio::test]
    async fn test_migrate_noop_cases() {
        let store = store(MigratePolicy::ReplaceTarget).await;
        store.upsert(score("-9", 1, 1)).await.unwrap();

        assert_eq!(store.migrate_chat("-9", "-9").await.unwrap(), 0);
        // Nothing to move, so the target is not cleared either.
        assert_eq!(store.migrate_chat("-1", "-9").await.unwrap(), 0);
        assert_eq!(store.chat("-9").len(), 1);
    }
}
