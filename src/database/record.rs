//! Record and key traits shared by every feature.
//!
//! A record carries its own key fields. Chat-scoped keys always put the chat
//! component first and serialize it as `chat_id`, which is what the backends
//! use for scan-by-chat and delete-by-chat.

use std::fmt::Debug;

use mongodb::bson::Document;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::StoreResult;

/// Chat identifier as stored (string-typed chat component).
pub type ChatId = String;

/// Telegram user identifier.
pub type UserId = i64;

/// Key of a record inside one partition.
pub trait StoreKey:
    Clone + Debug + Eq + Ord + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Field names making up the key, chat component first.
    const FIELDS: &'static [&'static str];

    /// Chat component, or `None` for user-scoped and global keys.
    fn chat_id(&self) -> Option<&str>;

    /// Same key with the chat component replaced.
    fn with_chat_id(&self, chat_id: &str) -> Self;

    /// Point filter document for the document store.
    fn to_document(&self) -> StoreResult<Document> {
        Ok(mongodb::bson::to_document(self)?)
    }
}

/// A typed record persisted in one partition.
pub trait Record:
    Clone + Debug + Serialize + DeserializeOwned + Send + Sync + Unpin + 'static
{
    type Key: StoreKey;

    /// Derive this record's key.
    fn key(&self) -> Self::Key;

    /// The same record moved to another chat.
    ///
    /// Records without a chat component are returned unchanged.
    fn rekey(self, chat_id: &str) -> Self;
}

/// Declare a chat-scoped key struct.
///
/// The generated struct has a leading `chat_id` followed by the listed fields,
/// all public, with field order matching the key order.
macro_rules! chat_key {
    ($(#[$meta:meta])* $name:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
        pub struct $name {
            pub chat_id: $crate::database::ChatId,
            $(pub $field: $ty,)*
        }

        impl $crate::database::StoreKey for $name {
            const FIELDS: &'static [&'static str] = &["chat_id" $(, stringify!($field))*];

            fn chat_id(&self) -> Option<&str> {
                Some(&self.chat_id)
            }

            #[allow(clippy::needless_update)]
            fn with_chat_id(&self, chat_id: &str) -> Self {
                Self {
                    chat_id: chat_id.to_string(),
                    ..self.clone()
                }
            }
        }
    };
}

pub(crate) use chat_key;

chat_key! {
    /// Key of per-chat singleton settings.
    ChatKey {}
}

impl ChatKey {
    pub fn new(chat_id: impl Into<ChatId>) -> Self {
        Self {
            chat_id: chat_id.into(),
        }
    }
}

chat_key! {
    /// Key of records owned by a user within a chat.
    ChatUserKey { user_id: UserId }
}

impl ChatUserKey {
    pub fn new(chat_id: impl Into<ChatId>, user_id: UserId) -> Self {
        Self {
            chat_id: chat_id.into(),
            user_id,
        }
    }
}

chat_key! {
    /// Key of keyword-addressed rows (custom filters, warn filters).
    KeywordKey { keyword: String }
}

impl KeywordKey {
    pub fn new(chat_id: impl Into<ChatId>, keyword: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            keyword: keyword.into(),
        }
    }
}

/// Key of user-scoped records. Has no chat component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserKey {
    pub user_id: UserId,
}

impl UserKey {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}

impl StoreKey for UserKey {
    const FIELDS: &'static [&'static str] = &["user_id"];

    fn chat_id(&self) -> Option<&str> {
        None
    }

    fn with_chat_id(&self, _chat_id: &str) -> Self {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_key_fields_and_rekey() {
        let key = ChatUserKey::new("-100", 42);
        assert_eq!(ChatUserKey::FIELDS, &["chat_id", "user_id"]);
        assert_eq!(key.chat_id(), Some("-100"));

        let moved = key.with_chat_id("-200");
        assert_eq!(moved.chat_id, "-200");
        assert_eq!(moved.user_id, 42);
    }

    #[test]
    fn test_key_document_uses_field_names() {
        let doc = KeywordKey::new("-1", "spam").to_document().unwrap();
        assert_eq!(doc.get_str("chat_id").unwrap(), "-1");
        assert_eq!(doc.get_str("keyword").unwrap(), "spam");
    }

    #[test]
    fn test_user_key_has_no_chat() {
        let key = UserKey::new(7);
        assert_eq!(key.chat_id(), None);
        assert_eq!(key.with_chat_id("-5"), key);
        assert_eq!(ChatKey::FIELDS, &["chat_id"]);
    }
}
