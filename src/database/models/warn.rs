//! Warning system models.
//!
//! Data structures for user warnings in groups.

use serde::{Deserialize, Serialize};

use crate::database::{ChatId, ChatKey, ChatUserKey, KeywordKey, Record, UserId};

/// Warnings a user has collected in a chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserWarns {
    pub chat_id: ChatId,
    pub user_id: UserId,
    /// Current warn count
    #[serde(default)]
    pub num_warns: u32,
    /// Reasons given, oldest first
    #[serde(default)]
    pub reasons: Vec<String>,
}

impl UserWarns {
    pub fn new(chat_id: impl Into<ChatId>, user_id: UserId) -> Self {
        Self {
            chat_id: chat_id.into(),
            user_id,
            num_warns: 0,
            reasons: Vec::new(),
        }
    }
}

impl Record for UserWarns {
    type Key = ChatUserKey;

    fn key(&self) -> ChatUserKey {
        ChatUserKey::new(self.chat_id.clone(), self.user_id)
    }

    fn rekey(mut self, chat_id: &str) -> Self {
        self.chat_id = chat_id.to_string();
        self
    }
}

/// A keyword that warns whoever says it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarnFilter {
    pub chat_id: ChatId,
    /// Trigger, stored lowercase
    pub keyword: String,
    /// Reason attached to the warn
    pub reply: String,
}

impl Record for WarnFilter {
    type Key = KeywordKey;

    fn key(&self) -> KeywordKey {
        KeywordKey::new(self.chat_id.clone(), self.keyword.clone())
    }

    fn rekey(mut self, chat_id: &str) -> Self {
        self.chat_id = chat_id.to_string();
        self
    }
}

/// Warning configuration per group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarnSettings {
    pub chat_id: ChatId,
    /// Maximum warnings before action (default: 3)
    #[serde(default = "default_limit")]
    pub warn_limit: u32,
    /// Kick instead of ban when the limit is reached
    #[serde(default)]
    pub soft_warn: bool,
}

fn default_limit() -> u32 {
    3
}

impl WarnSettings {
    pub fn new(chat_id: impl Into<ChatId>) -> Self {
        Self {
            chat_id: chat_id.into(),
            warn_limit: default_limit(),
            soft_warn: false,
        }
    }
}

impl Record for WarnSettings {
    type Key = ChatKey;

    fn key(&self) -> ChatKey {
        ChatKey::new(self.chat_id.clone())
    }

    fn rekey(mut self, chat_id: &str) -> Self {
        self.chat_id = chat_id.to_string();
        self
    }
}
