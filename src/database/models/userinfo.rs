//! Self-written info and bios written by others.

use serde::{Deserialize, Serialize};

use crate::database::{Record, UserId, UserKey};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub user_id: UserId,
    pub info: String,
}

impl Record for UserInfo {
    type Key = UserKey;

    fn key(&self) -> UserKey {
        UserKey::new(self.user_id)
    }

    fn rekey(self, _chat_id: &str) -> Self {
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserBio {
    pub user_id: UserId,
    pub bio: String,
}

impl Record for UserBio {
    type Key = UserKey;

    fn key(&self) -> UserKey {
        UserKey::new(self.user_id)
    }

    fn rekey(self, _chat_id: &str) -> Self {
        self
    }
}
