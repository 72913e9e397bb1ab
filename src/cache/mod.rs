//! Cache module - write-through caches over the backing store.
//!
//! Each feature owns one [`KeyedCacheStore`] per record type. The store is
//! loaded from its backend partition at startup and then kept in step with it
//! on every write; there is no eviction and no fall-through on a miss.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let rules = KeyedCacheStore::new(storage.partition("rules"), MigratePolicy::ReplaceTarget);
//! rules.load_all().await?;
//!
//! rules.upsert(ChatRules::new(chat_id, text)).await?;
//! let current = rules.get(&ChatKey::new(chat_id));
//! ```

mod keyed;
mod policy;
mod slots;

pub use keyed::{Change, KeyedCacheStore};
pub use policy::MigratePolicy;
