//! In-memory record map, bucketed by chat.

use std::collections::{BTreeMap, HashMap};

use crate::database::{ChatId, Record, StoreKey};

/// Records held by a cache store.
///
/// Chat-scoped records live in one ordered bucket per chat so listing a chat
/// is a single lookup; records without a chat component share one bucket.
/// Empty chat buckets are dropped.
pub(crate) struct Slots<R: Record> {
    unscoped: BTreeMap<R::Key, R>,
    chats: HashMap<ChatId, BTreeMap<R::Key, R>>,
}

impl<R: Record> Default for Slots<R> {
    fn default() -> Self {
        Self {
            unscoped: BTreeMap::new(),
            chats: HashMap::new(),
        }
    }
}

impl<R: Record> Slots<R> {
    pub fn from_records(records: impl IntoIterator<Item = R>) -> Self {
        let mut slots = Self::default();
        for record in records {
            slots.insert(record);
        }
        slots
    }

    pub fn get(&self, key: &R::Key) -> Option<&R> {
        match key.chat_id() {
            Some(chat_id) => self.chats.get(chat_id)?.get(key),
            None => self.unscoped.get(key),
        }
    }

    pub fn insert(&mut self, record: R) -> Option<R> {
        let key = record.key();
        match key.chat_id() {
            Some(chat_id) => self
                .chats
                .entry(chat_id.to_string())
                .or_default()
                .insert(key, record),
            None => self.unscoped.insert(key, record),
        }
    }

    pub fn remove(&mut self, key: &R::Key) -> Option<R> {
        let Some(chat_id) = key.chat_id() else {
            return self.unscoped.remove(key);
        };

        let bucket = self.chats.get_mut(chat_id)?;
        let removed = bucket.remove(key);
        if bucket.is_empty() {
            self.chats.remove(chat_id);
        }
        removed
    }

    /// Detach a chat's bucket.
    pub fn take_chat(&mut self, chat_id: &str) -> BTreeMap<R::Key, R> {
        self.chats.remove(chat_id).unwrap_or_default()
    }

    pub fn chat(&self, chat_id: &str) -> impl Iterator<Item = &R> {
        self.chats.get(chat_id).into_iter().flat_map(|bucket| bucket.values())
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.unscoped
            .values()
            .chain(self.chats.values().flat_map(|bucket| bucket.values()))
    }

    pub fn len(&self) -> usize {
        self.unscoped.len() + self.chats.values().map(BTreeMap::len).sum::<usize>()
    }

    pub fn chat_count(&self) -> usize {
        self.chats.len()
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::database::KeywordKey;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Word {
        chat_id: String,
        keyword: String,
    }

    impl Record for Word {
        type Key = KeywordKey;

        fn key(&self) -> KeywordKey {
            KeywordKey::new(self.chat_id.clone(), self.keyword.clone())
        }

        fn rekey(mut self, chat_id: &str) -> Self {
            self.chat_id = chat_id.to_string();
            self
        }
    }

    fn word(chat_id: &str, keyword: &str) -> Word {
        Word {
            chat_id: chat_id.to_string(),
            keyword: keyword.to_string(),
        }
    }

    #[test]
    fn test_chat_bucket_is_ordered_and_dropped_when_empty() {
        let mut slots = Slots::from_records([word("-1", "b"), word("-1", "a"), word("-2", "c")]);
        assert_eq!(slots.len(), 3);
        assert_eq!(slots.chat_count(), 2);

        let listed: Vec<&str> = slots.chat("-1").map(|w| w.keyword.as_str()).collect();
        assert_eq!(listed, vec!["a", "b"]);

        assert!(slots.remove(&KeywordKey::new("-2", "c")).is_some());
        assert_eq!(slots.chat_count(), 1);
        assert!(slots.remove(&KeywordKey::new("-2", "c")).is_none());
    }

    #[test]
    fn test_take_chat_detaches_bucket() {
        let mut slots = Slots::from_records([word("-1", "a"), word("-1", "b")]);
        let taken = slots.take_chat("-1");
        assert_eq!(taken.len(), 2);
        assert_eq!(slots.len(), 0);
        assert!(slots.take_chat("-1").is_empty());
    }
}
