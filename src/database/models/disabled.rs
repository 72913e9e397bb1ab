//! Disabled command model.

use serde::{Deserialize, Serialize};

use crate::database::record::chat_key;
use crate::database::{ChatId, Record};

chat_key! {
    CommandKey { command: String }
}

/// A command switched off in a chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisabledCommand {
    pub chat_id: ChatId,
    pub command: String,
}

impl Record for DisabledCommand {
    type Key = CommandKey;

    fn key(&self) -> CommandKey {
        CommandKey {
            chat_id: self.chat_id.clone(),
            command: self.command.clone(),
        }
    }

    fn rekey(mut self, chat_id: &str) -> Self {
        self.chat_id = chat_id.to_string();
        self
    }
}
