//! Report opt-in settings.

use serde::{Deserialize, Serialize};

use crate::database::{ChatId, ChatKey, Record, UserId, UserKey};

/// Whether a chat forwards `/report` to its admins. Absent means off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReportSetting {
    pub chat_id: ChatId,
    pub should_report: bool,
}

impl Record for ChatReportSetting {
    type Key = ChatKey;

    fn key(&self) -> ChatKey {
        ChatKey::new(self.chat_id.clone())
    }

    fn rekey(mut self, chat_id: &str) -> Self {
        self.chat_id = chat_id.to_string();
        self
    }
}

/// Whether an admin receives reports. Absent means on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserReportSetting {
    pub user_id: UserId,
    pub should_report: bool,
}

impl Record for UserReportSetting {
    type Key = UserKey;

    fn key(&self) -> UserKey {
        UserKey::new(self.user_id)
    }

    fn rekey(self, _chat_id: &str) -> Self {
        self
    }
}
