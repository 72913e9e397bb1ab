//! Message-type locks and member restrictions.

use serde::{Deserialize, Serialize};

use crate::database::{ChatId, ChatKey, Record};

/// Lockable message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockType {
    Audio,
    Voice,
    Contact,
    Video,
    VideoNote,
    Document,
    Photo,
    Sticker,
    Gif,
    Url,
    Bots,
    Forward,
    Game,
    Location,
}

impl LockType {
    pub const ALL: [LockType; 14] = [
        Self::Audio,
        Self::Voice,
        Self::Contact,
        Self::Video,
        Self::VideoNote,
        Self::Document,
        Self::Photo,
        Self::Sticker,
        Self::Gif,
        Self::Url,
        Self::Bots,
        Self::Forward,
        Self::Game,
        Self::Location,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "audio" => Some(Self::Audio),
            "voice" => Some(Self::Voice),
            "contact" => Some(Self::Contact),
            "video" => Some(Self::Video),
            "videonote" => Some(Self::VideoNote),
            "document" => Some(Self::Document),
            "photo" => Some(Self::Photo),
            "sticker" => Some(Self::Sticker),
            "gif" => Some(Self::Gif),
            "url" => Some(Self::Url),
            "bots" => Some(Self::Bots),
            "forward" => Some(Self::Forward),
            "game" => Some(Self::Game),
            "location" => Some(Self::Location),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Voice => "voice",
            Self::Contact => "contact",
            Self::Video => "video",
            Self::VideoNote => "videonote",
            Self::Document => "document",
            Self::Photo => "photo",
            Self::Sticker => "sticker",
            Self::Gif => "gif",
            Self::Url => "url",
            Self::Bots => "bots",
            Self::Forward => "forward",
            Self::Game => "game",
            Self::Location => "location",
        }
    }
}

/// Restrictable member capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestrictionType {
    Messages,
    Media,
    Other,
    Preview,
    /// Every restriction at once
    All,
}

impl RestrictionType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "messages" => Some(Self::Messages),
            "media" => Some(Self::Media),
            "other" => Some(Self::Other),
            "preview" | "previews" => Some(Self::Preview),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Messages => "messages",
            Self::Media => "media",
            Self::Other => "other",
            Self::Preview => "preview",
            Self::All => "all",
        }
    }
}

/// Locked message types of a chat.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatPermissions {
    pub chat_id: ChatId,
    #[serde(default)]
    pub audio: bool,
    #[serde(default)]
    pub voice: bool,
    #[serde(default)]
    pub contact: bool,
    #[serde(default)]
    pub video: bool,
    #[serde(default)]
    pub videonote: bool,
    #[serde(default)]
    pub document: bool,
    #[serde(default)]
    pub photo: bool,
    #[serde(default)]
    pub sticker: bool,
    #[serde(default)]
    pub gif: bool,
    #[serde(default)]
    pub url: bool,
    #[serde(default)]
    pub bots: bool,
    #[serde(default)]
    pub forward: bool,
    #[serde(default)]
    pub game: bool,
    #[serde(default)]
    pub location: bool,
}

impl ChatPermissions {
    /// Nothing locked.
    pub fn new(chat_id: impl Into<ChatId>) -> Self {
        Self {
            chat_id: chat_id.into(),
            ..Default::default()
        }
    }

    fn flag_mut(&mut self, lock: LockType) -> &mut bool {
        match lock {
            LockType::Audio => &mut self.audio,
            LockType::Voice => &mut self.voice,
            LockType::Contact => &mut self.contact,
            LockType::Video => &mut self.video,
            LockType::VideoNote => &mut self.videonote,
            LockType::Document => &mut self.document,
            LockType::Photo => &mut self.photo,
            LockType::Sticker => &mut self.sticker,
            LockType::Gif => &mut self.gif,
            LockType::Url => &mut self.url,
            LockType::Bots => &mut self.bots,
            LockType::Forward => &mut self.forward,
            LockType::Game => &mut self.game,
            LockType::Location => &mut self.location,
        }
    }

    pub fn is_locked(&self, lock: LockType) -> bool {
        match lock {
            LockType::Audio => self.audio,
            LockType::Voice => self.voice,
            LockType::Contact => self.contact,
            LockType::Video => self.video,
            LockType::VideoNote => self.videonote,
            LockType::Document => self.document,
            LockType::Photo => self.photo,
            LockType::Sticker => self.sticker,
            LockType::Gif => self.gif,
            LockType::Url => self.url,
            LockType::Bots => self.bots,
            LockType::Forward => self.forward,
            LockType::Game => self.game,
            LockType::Location => self.location,
        }
    }

    pub fn set(&mut self, lock: LockType, locked: bool) {
        *self.flag_mut(lock) = locked;
    }
}

impl Record for ChatPermissions {
    type Key = ChatKey;

    fn key(&self) -> ChatKey {
        ChatKey::new(self.chat_id.clone())
    }

    fn rekey(mut self, chat_id: &str) -> Self {
        self.chat_id = chat_id.to_string();
        self
    }
}

/// Member restrictions of a chat.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRestrictions {
    pub chat_id: ChatId,
    #[serde(default)]
    pub messages: bool,
    #[serde(default)]
    pub media: bool,
    #[serde(default)]
    pub other: bool,
    #[serde(default)]
    pub preview: bool,
}

impl ChatRestrictions {
    /// Nothing restricted.
    pub fn new(chat_id: impl Into<ChatId>) -> Self {
        Self {
            chat_id: chat_id.into(),
            ..Default::default()
        }
    }

    pub fn is_restricted(&self, restriction: RestrictionType) -> bool {
        match restriction {
            RestrictionType::Messages => self.messages,
            RestrictionType::Media => self.media,
            RestrictionType::Other => self.other,
            RestrictionType::Preview => self.preview,
            RestrictionType::All => self.messages && self.media && self.other && self.preview,
        }
    }

    pub fn set(&mut self, restriction: RestrictionType, locked: bool) {
        match restriction {
            RestrictionType::Messages => self.messages = locked,
            RestrictionType::Media => self.media = locked,
            RestrictionType::Other => self.other = locked,
            RestrictionType::Preview => self.preview = locked,
            RestrictionType::All => {
                self.messages = locked;
                self.media = locked;
                self.other = locked;
                self.preview = locked;
            }
        }
    }
}

impl Record for ChatRestrictions {
    type Key = ChatKey;

    fn key(&self) -> ChatKey {
        ChatKey::new(self.chat_id.clone())
    }

    fn rekey(mut self, chat_id: &str) -> Self {
        self.chat_id = chat_id.to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_type_names_round_trip() {
        for lock in LockType::ALL {
            assert_eq!(LockType::from_str(lock.as_str()), Some(lock));
        }
        assert_eq!(LockType::from_str("STICKER"), Some(LockType::Sticker));
        assert_eq!(LockType::from_str("polls"), None);
    }

    #[test]
    fn test_restriction_aliases_and_all() {
        assert_eq!(RestrictionType::from_str("previews"), Some(RestrictionType::Preview));

        let mut restr = ChatRestrictions::new("-1");
        restr.set(RestrictionType::Media, true);
        assert!(!restr.is_restricted(RestrictionType::All));

        restr.set(RestrictionType::All, true);
        assert!(restr.is_restricted(RestrictionType::All));
        assert!(restr.messages && restr.preview);
    }
}
