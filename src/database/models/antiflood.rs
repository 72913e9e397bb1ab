//! Antiflood configuration model.

use serde::{Deserialize, Serialize};

use crate::database::{ChatId, ChatKey, Record};

/// Flood limit of a chat. A limit of 0 disables flood control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloodControl {
    pub chat_id: ChatId,
    /// Consecutive messages allowed from one user
    #[serde(default)]
    pub limit: u32,
}

impl Record for FloodControl {
    type Key = ChatKey;

    fn key(&self) -> ChatKey {
        ChatKey::new(self.chat_id.clone())
    }

    fn rekey(mut self, chat_id: &str) -> Self {
        self.chat_id = chat_id.to_string();
        self
    }
}
