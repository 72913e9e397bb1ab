//! Saved notes and their buttons.

use serde::{Deserialize, Serialize};

use super::common::{InlineButton, MessageKind};
use crate::database::record::chat_key;
use crate::database::{ChatId, Record};

chat_key! {
    NoteKey { name: String }
}

/// A saved note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Chat ID this note belongs to
    pub chat_id: ChatId,
    /// Note name
    pub name: String,
    /// Note content (text, or caption for media)
    pub value: String,
    /// Media file ID (if any)
    #[serde(default)]
    pub file: Option<String>,
    /// Content kind
    #[serde(default)]
    pub msg_type: MessageKind,
    /// Whether the note was saved from a reply
    #[serde(default)]
    pub is_reply: bool,
    /// Whether buttons are attached
    #[serde(default)]
    pub has_buttons: bool,
}

impl Record for Note {
    type Key = NoteKey;

    fn key(&self) -> NoteKey {
        NoteKey {
            chat_id: self.chat_id.clone(),
            name: self.name.clone(),
        }
    }

    fn rekey(mut self, chat_id: &str) -> Self {
        self.chat_id = chat_id.to_string();
        self
    }
}

chat_key! {
    NoteButtonKey { note_name: String, position: u32 }
}

/// A button attached to a note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteButton {
    pub chat_id: ChatId,
    pub note_name: String,
    /// Order of the button within the note
    pub position: u32,
    #[serde(flatten)]
    pub button: InlineButton,
}

impl Record for NoteButton {
    type Key = NoteButtonKey;

    fn key(&self) -> NoteButtonKey {
        NoteButtonKey {
            chat_id: self.chat_id.clone(),
            note_name: self.note_name.clone(),
            position: self.position,
        }
    }

    fn rekey(mut self, chat_id: &str) -> Self {
        self.chat_id = chat_id.to_string();
        self
    }
}
