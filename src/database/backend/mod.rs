//! Backing-store contract and its adapters.
//!
//! A [`Backend`] owns one partition (a MongoDB collection, or a slice of the
//! SQLite `records` table) holding records of a single type. [`Storage`] picks
//! the adapter from configuration and hands out one backend per partition.

mod memory;
mod mongo;
mod sqlite;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use super::error::StoreResult;
use super::record::Record;
use crate::config::{Config, StoreBackend};

pub use memory::MemoryBackend;
pub use mongo::{Database, MongoBackend};
pub use sqlite::{SqliteBackend, SqliteDatabase};

/// Durable store for one partition of records.
///
/// Writes are insert-or-replace by full key unless stated otherwise.
/// Chat-scoped operations match on the key's chat component and are no-ops for
/// partitions without one.
#[async_trait]
pub trait Backend<R: Record>: Send + Sync {
    /// Partition (collection/table slice) name.
    fn partition(&self) -> &str;

    /// Create indexes or tables this partition needs. Idempotent.
    async fn prepare(&self) -> StoreResult<()> {
        Ok(())
    }

    /// Point lookup by key.
    async fn get(&self, key: &R::Key) -> StoreResult<Option<R>>;

    /// Insert or replace the record stored under its key.
    async fn upsert(&self, record: &R) -> StoreResult<()>;

    /// Strict insert. An existing key is a constraint failure.
    async fn insert(&self, record: &R) -> StoreResult<()>;

    /// Delete by key, returning whether a record existed.
    async fn delete(&self, key: &R::Key) -> StoreResult<bool>;

    /// Delete every record of a chat, returning how many were removed.
    async fn delete_chat(&self, chat_id: &str) -> StoreResult<u64>;

    /// Every record in the partition.
    async fn scan(&self) -> StoreResult<Vec<R>>;

    /// Every record of one chat.
    async fn scan_chat(&self, chat_id: &str) -> StoreResult<Vec<R>>;

    /// Number of records in the partition.
    async fn count(&self) -> StoreResult<u64>;

    /// Number of records of one chat.
    async fn count_chat(&self, chat_id: &str) -> StoreResult<u64>;

    /// Number of distinct chats with at least one record.
    async fn distinct_chats(&self) -> StoreResult<u64>;
}

/// Connected storage, selecting the adapter for every partition.
#[derive(Debug, Clone)]
pub enum Storage {
    /// MongoDB, one collection per partition.
    Mongo(Database),
    /// SQLite, one shared table keyed by partition.
    Sqlite(SqliteDatabase),
    /// Process memory only. Nothing survives a restart.
    Memory,
}

impl Storage {
    /// Connect to the backend selected in the configuration.
    pub async fn connect(config: &Config) -> Result<Self> {
        let storage = match config.store_backend {
            StoreBackend::Mongo => {
                info!("Connecting to MongoDB...");
                Self::Mongo(Database::connect(&config.mongodb_uri, &config.mongodb_database).await?)
            }
            StoreBackend::Sqlite => {
                info!("Opening SQLite database {}", config.sqlite_url);
                Self::Sqlite(SqliteDatabase::connect(&config.sqlite_url).await?)
            }
            StoreBackend::Memory => {
                info!("Using in-memory storage (data is not persisted)");
                Self::Memory
            }
        };

        Ok(storage)
    }

    /// Backend for the named partition.
    pub fn partition<R: Record>(&self, name: &str) -> Arc<dyn Backend<R>> {
        match self {
            Self::Mongo(db) => Arc::new(MongoBackend::new(db, name)),
            Self::Sqlite(db) => Arc::new(SqliteBackend::new(db, name)),
            Self::Memory => Arc::new(MemoryBackend::new(name)),
        }
    }
}
