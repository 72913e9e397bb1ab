//! Known users, chats and chat memberships.
//!
//! Filled in from every update the bot sees; used to resolve usernames to
//! ids and to list the chats a user shares with the bot.

use serde::{Deserialize, Serialize};

use crate::database::{ChatId, ChatKey, ChatUserKey, Record, UserId, UserKey};

/// A Telegram user seen by the bot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TgUser {
    /// Telegram user ID.
    pub user_id: UserId,
    /// Username without @, case preserved. Falls back to the first name.
    pub username: Option<String>,
}

impl TgUser {
    pub fn new(user_id: UserId, username: Option<String>) -> Self {
        Self { user_id, username }
    }
}

impl Record for TgUser {
    type Key = UserKey;

    fn key(&self) -> UserKey {
        UserKey::new(self.user_id)
    }

    fn rekey(self, _chat_id: &str) -> Self {
        self
    }
}

/// A chat the bot is in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TgChat {
    pub chat_id: ChatId,
    /// Title at the time it was last seen.
    #[serde(default)]
    pub chat_name: String,
}

impl Record for TgChat {
    type Key = ChatKey;

    fn key(&self) -> ChatKey {
        ChatKey::new(self.chat_id.clone())
    }

    fn rekey(mut self, chat_id: &str) -> Self {
        self.chat_id = chat_id.to_string();
        self
    }
}

/// A user seen in a chat.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMember {
    pub chat_id: ChatId,
    pub user_id: UserId,
}

impl Record for ChatMember {
    type Key = ChatUserKey;

    fn key(&self) -> ChatUserKey {
        ChatUserKey::new(self.chat_id.clone(), self.user_id)
    }

    fn rekey(mut self, chat_id: &str) -> Self {
        self.chat_id = chat_id.to_string();
        self
    }
}
