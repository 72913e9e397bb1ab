//! Blacklisted trigger words.

use serde::{Deserialize, Serialize};

use crate::database::record::chat_key;
use crate::database::{ChatId, Record};

chat_key! {
    TriggerKey { trigger: String }
}

/// A blacklisted trigger in a chat. Triggers are stored lowercase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlacklistTrigger {
    pub chat_id: ChatId,
    pub trigger: String,
}

impl BlacklistTrigger {
    pub fn new(chat_id: impl Into<ChatId>, trigger: &str) -> Self {
        Self {
            chat_id: chat_id.into(),
            trigger: trigger.to_lowercase(),
        }
    }
}

impl Record for BlacklistTrigger {
    type Key = TriggerKey;

    fn key(&self) -> TriggerKey {
        TriggerKey {
            chat_id: self.chat_id.clone(),
            trigger: self.trigger.clone(),
        }
    }

    fn rekey(mut self, chat_id: &str) -> Self {
        self.chat_id = chat_id.to_string();
        self
    }
}
