//! Process-memory backend, used for tests and for running without a database.

use std::collections::BTreeMap;
use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::Backend;
use crate::database::error::{StoreError, StoreResult};
use crate::database::record::{Record, StoreKey};

pub struct MemoryBackend<R: Record> {
    partition: String,
    rows: RwLock<BTreeMap<R::Key, R>>,
}

impl<R: Record> MemoryBackend<R> {
    pub fn new(partition: &str) -> Self {
        Self {
            partition: partition.to_string(),
            rows: RwLock::new(BTreeMap::new()),
        }
    }
}

fn in_chat<K: StoreKey>(key: &K, chat_id: &str) -> bool {
    key.chat_id() == Some(chat_id)
}

#[async_trait]
impl<R: Record> Backend<R> for MemoryBackend<R> {
    fn partition(&self) -> &str {
        &self.partition
    }

    async fn get(&self, key: &R::Key) -> StoreResult<Option<R>> {
        Ok(self.rows.read().get(key).cloned())
    }

    async fn upsert(&self, record: &R) -> StoreResult<()> {
        self.rows.write().insert(record.key(), record.clone());
        Ok(())
    }

    async fn insert(&self, record: &R) -> StoreResult<()> {
        let key = record.key();
        let mut rows = self.rows.write();

        if rows.contains_key(&key) {
            return Err(StoreError::Constraint(format!(
                "duplicate key {:?} in {}",
                key, self.partition
            )));
        }

        rows.insert(key, record.clone());
        Ok(())
    }

    async fn delete(&self, key: &R::Key) -> StoreResult<bool> {
        Ok(self.rows.write().remove(key).is_some())
    }

    async fn delete_chat(&self, chat_id: &str) -> StoreResult<u64> {
        let mut rows = self.rows.write();
        let before = rows.len();
        rows.retain(|key, _| !in_chat(key, chat_id));
        Ok((before - rows.len()) as u64)
    }

    async fn scan(&self) -> StoreResult<Vec<R>> {
        Ok(self.rows.read().values().cloned().collect())
    }

    async fn scan_chat(&self, chat_id: &str) -> StoreResult<Vec<R>> {
        Ok(self
            .rows
            .read()
            .iter()
            .filter(|(key, _)| in_chat(*key, chat_id))
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.rows.read().len() as u64)
    }

    async fn count_chat(&self, chat_id: &str) -> StoreResult<u64> {
        Ok(self
            .rows
            .read()
            .keys()
            .filter(|key| in_chat(*key, chat_id))
            .count() as u64)
    }

    async fn distinct_chats(&self) -> StoreResult<u64> {
        let rows = self.rows.read();
        let chats: HashSet<&str> = rows.keys().filter_map(|key| key.chat_id()).collect();
        Ok(chats.len() as u64)
    }
}
