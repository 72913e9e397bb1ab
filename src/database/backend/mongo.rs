//! MongoDB database wrapper and document-store backend.

use std::marker::PhantomData;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::{ClientOptions, IndexOptions, ReplaceOptions};
use mongodb::{Client, Collection, IndexModel};
use tracing::{debug, info};

use super::Backend;
use crate::database::error::StoreResult;
use crate::database::record::{Record, StoreKey};

/// Database wrapper for MongoDB operations.
#[derive(Debug, Clone)]
pub struct Database {
    db: mongodb::Database,
}

impl Database {
    /// Connect to MongoDB with the given URI and database name.
    ///
    /// # Errors
    /// Returns error if connection or the initial ping fails.
    pub async fn connect(uri: &str, db_name: &str) -> anyhow::Result<Self> {
        let options = ClientOptions::parse(uri).await?;
        let client = Client::with_options(options)?;

        // Ping the database to verify connection
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;

        info!("Successfully connected to MongoDB");

        let db = client.database(db_name);

        Ok(Self { db })
    }

    /// Get a typed collection from the database.
    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }
}

/// One collection per partition. Records are stored as plain documents whose
/// key fields double as the unique index.
pub struct MongoBackend<R: Record> {
    collection: Collection<R>,
    partition: String,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> MongoBackend<R> {
    pub fn new(db: &Database, partition: &str) -> Self {
        Self {
            collection: db.collection(partition),
            partition: partition.to_string(),
            _record: PhantomData,
        }
    }

    fn chat_filter(chat_id: &str) -> Document {
        doc! { "chat_id": chat_id }
    }
}

#[async_trait]
impl<R: Record> Backend<R> for MongoBackend<R> {
    fn partition(&self) -> &str {
        &self.partition
    }

    async fn prepare(&self) -> StoreResult<()> {
        let mut keys = Document::new();
        for field in R::Key::FIELDS {
            keys.insert(*field, 1);
        }

        let index = IndexModel::builder()
            .keys(keys)
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.collection.create_index(index).await?;
        debug!("Ensured unique key index on {}", self.partition);
        Ok(())
    }

    async fn get(&self, key: &R::Key) -> StoreResult<Option<R>> {
        let filter = key.to_document()?;
        Ok(self.collection.find_one(filter).await?)
    }

    async fn upsert(&self, record: &R) -> StoreResult<()> {
        let filter = record.key().to_document()?;
        let options = ReplaceOptions::builder().upsert(true).build();

        self.collection
            .replace_one(filter, record)
            .with_options(options)
            .await?;

        Ok(())
    }

    async fn insert(&self, record: &R) -> StoreResult<()> {
        self.collection.insert_one(record).await?;
        Ok(())
    }

    async fn delete(&self, key: &R::Key) -> StoreResult<bool> {
        let filter = key.to_document()?;
        let result = self.collection.delete_one(filter).await?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_chat(&self, chat_id: &str) -> StoreResult<u64> {
        let result = self
            .collection
            .delete_many(Self::chat_filter(chat_id))
            .await?;
        Ok(result.deleted_count)
    }

    async fn scan(&self) -> StoreResult<Vec<R>> {
        let cursor = self.collection.find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn scan_chat(&self, chat_id: &str) -> StoreResult<Vec<R>> {
        let cursor = self.collection.find(Self::chat_filter(chat_id)).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }

    async fn count_chat(&self, chat_id: &str) -> StoreResult<u64> {
        Ok(self
            .collection
            .count_documents(Self::chat_filter(chat_id))
            .await?)
    }

    async fn distinct_chats(&self) -> StoreResult<u64> {
        let chats: Vec<Bson> = self.collection.distinct("chat_id", doc! {}).await?;
        Ok(chats.len() as u64)
    }
}
