//! SQLite backend.
//!
//! All partitions share one `records` table. Keys and bodies are stored as
//! JSON; the chat component is kept in its own column so scan-by-chat and
//! delete-by-chat stay index lookups.

use std::marker::PhantomData;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use super::Backend;
use crate::database::error::StoreResult;
use crate::database::record::{Record, StoreKey};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS records (
    partition TEXT NOT NULL,
    key TEXT NOT NULL,
    chat_id TEXT,
    body TEXT NOT NULL,
    PRIMARY KEY (partition, key)
)";

const CREATE_CHAT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS records_by_chat ON records (partition, chat_id)";

/// SQLite connection pool.
#[derive(Debug, Clone)]
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// Open (creating if missing) the database at `url`.
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        info!("Successfully opened SQLite database");
        Ok(Self { pool })
    }

    /// Private in-memory database.
    ///
    /// Pinned to a single connection that never expires, since every SQLite
    /// memory connection is its own database.
    pub async fn in_memory() -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// One partition of the shared `records` table.
pub struct SqliteBackend<R: Record> {
    pool: SqlitePool,
    partition: String,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> SqliteBackend<R> {
    pub fn new(db: &SqliteDatabase, partition: &str) -> Self {
        Self {
            pool: db.pool().clone(),
            partition: partition.to_string(),
            _record: PhantomData,
        }
    }

    fn encode_key(key: &R::Key) -> StoreResult<String> {
        Ok(serde_json::to_string(key)?)
    }

    fn decode_rows(rows: Vec<(String,)>) -> StoreResult<Vec<R>> {
        rows.into_iter()
            .map(|(body,)| Ok(serde_json::from_str(&body)?))
            .collect()
    }
}

#[async_trait]
impl<R: Record> Backend<R> for SqliteBackend<R> {
    fn partition(&self) -> &str {
        &self.partition
    }

    async fn prepare(&self) -> StoreResult<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_CHAT_INDEX).execute(&self.pool).await?;
        debug!("Ensured records table for {}", self.partition);
        Ok(())
    }

    async fn get(&self, key: &R::Key) -> StoreResult<Option<R>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT body FROM records WHERE partition = ? AND key = ?")
                .bind(&self.partition)
                .bind(Self::encode_key(key)?)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some((body,)) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }

    async fn upsert(&self, record: &R) -> StoreResult<()> {
        let key = record.key();

        sqlx::query(
            "INSERT INTO records (partition, key, chat_id, body) VALUES (?, ?, ?, ?)
             ON CONFLICT (partition, key) DO UPDATE SET chat_id = excluded.chat_id, body = excluded.body",
        )
        .bind(&self.partition)
        .bind(Self::encode_key(&key)?)
        .bind(key.chat_id().map(str::to_string))
        .bind(serde_json::to_string(record)?)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert(&self, record: &R) -> StoreResult<()> {
        let key = record.key();

        sqlx::query("INSERT INTO records (partition, key, chat_id, body) VALUES (?, ?, ?, ?)")
            .bind(&self.partition)
            .bind(Self::encode_key(&key)?)
            .bind(key.chat_id().map(str::to_string))
            .bind(serde_json::to_string(record)?)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete(&self, key: &R::Key) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM records WHERE partition = ? AND key = ?")
            .bind(&self.partition)
            .bind(Self::encode_key(key)?)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_chat(&self, chat_id: &str) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM records WHERE partition = ? AND chat_id = ?")
            .bind(&self.partition)
            .bind(chat_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn scan(&self) -> StoreResult<Vec<R>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT body FROM records WHERE partition = ? ORDER BY rowid")
                .bind(&self.partition)
                .fetch_all(&self.pool)
                .await?;

        Self::decode_rows(rows)
    }

    async fn scan_chat(&self, chat_id: &str) -> StoreResult<Vec<R>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT body FROM records WHERE partition = ? AND chat_id = ? ORDER BY rowid",
        )
        .bind(&self.partition)
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await?;

        Self::decode_rows(rows)
    }

    async fn count(&self) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM records WHERE partition = ?")
            .bind(&self.partition)
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }

    async fn count_chat(&self, chat_id: &str) -> StoreResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM records WHERE partition = ? AND chat_id = ?")
                .bind(&self.partition)
                .bind(chat_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count as u64)
    }

    async fn distinct_chats(&self) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT chat_id) FROM records WHERE partition = ?",
        )
        .bind(&self.partition)
        .fetch_one(&self.pool)
        .await?;

        Ok(count as u64)
    }
}
