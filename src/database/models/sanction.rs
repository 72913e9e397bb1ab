//! Global ban / global mute models.
//!
//! Both sanctions share the same shape; they live in separate partitions.

use serde::{Deserialize, Serialize};

use crate::database::{ChatId, ChatKey, Record, UserId, UserKey};

/// A user under a global sanction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanctionedUser {
    pub user_id: UserId,
    /// Display name at the time of the sanction
    pub name: String,
    #[serde(default)]
    pub reason: Option<String>,
}

impl Record for SanctionedUser {
    type Key = UserKey;

    fn key(&self) -> UserKey {
        UserKey::new(self.user_id)
    }

    fn rekey(self, _chat_id: &str) -> Self {
        self
    }
}

/// Whether a chat enforces a global sanction list. Absent means enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanctionSetting {
    pub chat_id: ChatId,
    pub enforce: bool,
}

impl Record for SanctionSetting {
    type Key = ChatKey;

    fn key(&self) -> ChatKey {
        ChatKey::new(self.chat_id.clone())
    }

    fn rekey(mut self, chat_id: &str) -> Self {
        self.chat_id = chat_id.to_string();
        self
    }
}
