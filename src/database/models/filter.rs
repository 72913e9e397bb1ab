//! Filter models for auto-reply triggers.

use serde::{Deserialize, Serialize};

use super::common::{InlineButton, MessageKind};
use crate::database::record::chat_key;
use crate::database::{ChatId, KeywordKey, Record};

/// A chat filter for auto-replies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFilter {
    /// Chat ID this filter belongs to
    pub chat_id: ChatId,
    /// Trigger word/phrase
    pub keyword: String,
    /// Reply text, or a file id for media replies
    pub reply: String,
    /// What kind of content `reply` holds
    #[serde(default)]
    pub kind: MessageKind,
    /// Whether buttons are attached
    #[serde(default)]
    pub has_buttons: bool,
}

impl Record for CustomFilter {
    type Key = KeywordKey;

    fn key(&self) -> KeywordKey {
        KeywordKey::new(self.chat_id.clone(), self.keyword.clone())
    }

    fn rekey(mut self, chat_id: &str) -> Self {
        self.chat_id = chat_id.to_string();
        self
    }
}

chat_key! {
    FilterButtonKey { keyword: String, position: u32 }
}

/// A button attached to a filter's reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterButton {
    pub chat_id: ChatId,
    pub keyword: String,
    /// Order of the button within the filter
    pub position: u32,
    #[serde(flatten)]
    pub button: InlineButton,
}

impl Record for FilterButton {
    type Key = FilterButtonKey;

    fn key(&self) -> FilterButtonKey {
        FilterButtonKey {
            chat_id: self.chat_id.clone(),
            keyword: self.keyword.clone(),
            position: self.position,
        }
    }

    fn rekey(mut self, chat_id: &str) -> Self {
        self.chat_id = chat_id.to_string();
        self
    }
}
