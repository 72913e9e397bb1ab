//! Common shared models.

use serde::{Deserialize, Serialize};

/// Generic inline URL button attached to a stored message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineButton {
    /// Button text
    pub name: String,
    /// URL to open when clicked
    pub url: String,
    /// Render on the same row as the previous button
    #[serde(default)]
    pub same_line: bool,
}

impl InlineButton {
    /// Create a new inline button on its own row.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            same_line: false,
        }
    }

    /// Place this button on the previous button's row.
    pub fn same_line(mut self) -> Self {
        self.same_line = true;
        self
    }
}

/// Kind of stored message content.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    #[default]
    Text,
    ButtonText,
    Sticker,
    Document,
    Photo,
    Audio,
    Voice,
    Video,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::ButtonText => "button_text",
            Self::Sticker => "sticker",
            Self::Document => "document",
            Self::Photo => "photo",
            Self::Audio => "audio",
            Self::Voice => "voice",
            Self::Video => "video",
        }
    }

    /// Whether the content is a media file id rather than text.
    pub fn is_media(&self) -> bool {
        !matches!(self, Self::Text | Self::ButtonText)
    }
}
