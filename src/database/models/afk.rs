//! AFK (Away From Keyboard) model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::{Record, UserId, UserKey};

/// AFK status for a user. Present only while the user is away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AfkUser {
    /// Telegram user ID
    pub user_id: UserId,
    /// Reason for being AFK (may be empty)
    #[serde(default)]
    pub reason: String,
    /// When the user went AFK
    pub since: DateTime<Utc>,
}

impl AfkUser {
    /// Mark a user away as of now.
    pub fn new(user_id: UserId, reason: impl Into<String>) -> Self {
        Self {
            user_id,
            reason: reason.into(),
            since: Utc::now(),
        }
    }

    /// Get duration since AFK started in seconds.
    pub fn duration_secs(&self) -> u64 {
        let now = Utc::now();
        (now - self.since).num_seconds().max(0) as u64
    }
}

impl Record for AfkUser {
    type Key = UserKey;

    fn key(&self) -> UserKey {
        UserKey::new(self.user_id)
    }

    fn rekey(self, _chat_id: &str) -> Self {
        self
    }
}
