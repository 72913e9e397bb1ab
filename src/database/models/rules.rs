//! Chat rules model.

use serde::{Deserialize, Serialize};

use crate::database::{ChatId, ChatKey, Record};

/// Rules text of a chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRules {
    pub chat_id: ChatId,
    /// Rules text (may contain formatting)
    #[serde(default)]
    pub rules: String,
}

impl Record for ChatRules {
    type Key = ChatKey;

    fn key(&self) -> ChatKey {
        ChatKey::new(self.chat_id.clone())
    }

    fn rekey(mut self, chat_id: &str) -> Self {
        self.chat_id = chat_id.to_string();
        self
    }
}
