//! Welcome and goodbye configuration models.

use serde::{Deserialize, Serialize};

use super::common::{InlineButton, MessageKind};
use crate::database::record::chat_key;
use crate::database::{ChatId, ChatKey, Record};

pub const DEFAULT_WELCOME: &str = "Hey {first}, how are you?";
pub const DEFAULT_GOODBYE: &str = "Nice knowing ya!";

/// Welcome/goodbye preferences of a chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WelcomePrefs {
    pub chat_id: ChatId,

    /// Whether welcome messages are sent
    #[serde(default = "default_true")]
    pub should_welcome: bool,

    /// Whether goodbye messages are sent
    #[serde(default = "default_true")]
    pub should_goodbye: bool,

    /// Welcome message template (text, or file id for media)
    /// Placeholders: {first}, {last}, {fullname}, {username}, {mention}, {id}, {count}, {chatname}
    #[serde(default = "default_welcome")]
    pub custom_welcome: String,

    #[serde(default)]
    pub welcome_type: MessageKind,

    /// Goodbye message template
    #[serde(default = "default_goodbye")]
    pub custom_leave: String,

    #[serde(default)]
    pub leave_type: MessageKind,

    /// Id of the last welcome message to delete when the next one is sent
    #[serde(default)]
    pub clean_welcome: Option<i64>,

    /// Delete "user joined" service messages
    #[serde(default)]
    pub del_joined: bool,
}

fn default_true() -> bool {
    true
}

fn default_welcome() -> String {
    DEFAULT_WELCOME.to_string()
}

fn default_goodbye() -> String {
    DEFAULT_GOODBYE.to_string()
}

impl WelcomePrefs {
    /// Default preferences for a chat.
    pub fn new(chat_id: impl Into<ChatId>) -> Self {
        Self {
            chat_id: chat_id.into(),
            should_welcome: true,
            should_goodbye: true,
            custom_welcome: default_welcome(),
            welcome_type: MessageKind::Text,
            custom_leave: default_goodbye(),
            leave_type: MessageKind::Text,
            clean_welcome: None,
            del_joined: false,
        }
    }
}

impl Record for WelcomePrefs {
    type Key = ChatKey;

    fn key(&self) -> ChatKey {
        ChatKey::new(self.chat_id.clone())
    }

    fn rekey(mut self, chat_id: &str) -> Self {
        self.chat_id = chat_id.to_string();
        self
    }
}

chat_key! {
    GreetingButtonKey { position: u32 }
}

/// A button of a welcome or goodbye message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreetingButton {
    pub chat_id: ChatId,
    pub position: u32,
    #[serde(flatten)]
    pub button: InlineButton,
}

impl GreetingButton {
    /// Number a chat's buttons in order.
    pub fn numbered(chat_id: &str, buttons: Vec<InlineButton>) -> Vec<Self> {
        buttons
            .into_iter()
            .zip(0..)
            .map(|(button, position)| Self {
                chat_id: chat_id.to_string(),
                position,
                button,
            })
            .collect()
    }
}

impl Record for GreetingButton {
    type Key = GreetingButtonKey;

    fn key(&self) -> GreetingButtonKey {
        GreetingButtonKey {
            chat_id: self.chat_id.clone(),
            position: self.position,
        }
    }

    fn rekey(mut self, chat_id: &str) -> Self {
        self.chat_id = chat_id.to_string();
        self
    }
}
