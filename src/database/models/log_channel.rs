//! Log channel model.

use serde::{Deserialize, Serialize};

use crate::database::{ChatId, ChatKey, Record};

/// Channel receiving a chat's admin log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogChannel {
    pub chat_id: ChatId,
    pub log_channel: String,
}

impl Record for LogChannel {
    type Key = ChatKey;

    fn key(&self) -> ChatKey {
        ChatKey::new(self.chat_id.clone())
    }

    fn rekey(mut self, chat_id: &str) -> Self {
        self.chat_id = chat_id.to_string();
        self
    }
}
