//! Safe mode flag.

use serde::{Deserialize, Serialize};

use crate::database::{ChatId, ChatKey, Record};

/// Safe mode setting of a chat. New members are muted while it is on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeMode {
    pub chat_id: ChatId,
    pub safemode: bool,
}

impl Record for SafeMode {
    type Key = ChatKey;

    fn key(&self) -> ChatKey {
        ChatKey::new(self.chat_id.clone())
    }

    fn rekey(mut self, chat_id: &str) -> Self {
        self.chat_id = chat_id.to_string();
        self
    }
}
