//! Database module exports.
//!
//! Layering, bottom-up: [`record`] key/record traits, [`backend`] adapters
//! behind one contract, the write-through cache in `crate::cache`, and the
//! per-feature repositories on top.

mod backend;
mod error;
pub mod models;
mod record;
mod repository;

pub use backend::{Backend, Database, MemoryBackend, MongoBackend, SqliteBackend, SqliteDatabase, Storage};
pub use error::{StoreError, StoreResult};
pub use record::{ChatId, ChatKey, ChatUserKey, KeywordKey, Record, StoreKey, UserId, UserKey};
pub use repository::*;
