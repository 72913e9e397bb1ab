//! RSS feed subscriptions.

use serde::{Deserialize, Serialize};

use crate::database::record::chat_key;
use crate::database::{ChatId, Record};

chat_key! {
    FeedKey { feed_link: String }
}

/// A feed a chat is subscribed to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RssFeed {
    pub chat_id: ChatId,
    pub feed_link: String,
    /// Link of the newest entry already posted
    #[serde(default)]
    pub old_entry_link: String,
}

impl Record for RssFeed {
    type Key = FeedKey;

    fn key(&self) -> FeedKey {
        FeedKey {
            chat_id: self.chat_id.clone(),
            feed_link: self.feed_link.clone(),
        }
    }

    fn rekey(mut self, chat_id: &str) -> Self {
        self.chat_id = chat_id.to_string();
        self
    }
}
