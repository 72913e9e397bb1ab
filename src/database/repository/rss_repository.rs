//! RSS feed subscription repository.

use async_trait::async_trait;

use super::Feature;
use crate::cache::{Change, KeyedCacheStore, MigratePolicy};
use crate::database::models::rss::FeedKey;
use crate::database::models::RssFeed;
use crate::database::{Storage, StoreResult};

pub struct RssRepository {
    feeds: KeyedCacheStore<RssFeed>,
}

fn feed_key(chat_id: &str, feed_link: &str) -> FeedKey {
    FeedKey {
        chat_id: chat_id.to_string(),
        feed_link: feed_link.to_string(),
    }
}

impl RssRepository {
    pub fn new(storage: &Storage) -> Self {
        Self {
            feeds: KeyedCacheStore::new(storage.partition("rss_feed"), MigratePolicy::Reinsert),
        }
    }

    /// Whether the chat already follows this feed.
    pub fn check_url_availability(&self, chat_id: &str, feed_link: &str) -> bool {
        self.feeds.contains(&feed_key(chat_id, feed_link))
    }

    pub async fn add_url(
        &self,
        chat_id: &str,
        feed_link: &str,
        old_entry_link: &str,
    ) -> StoreResult<()> {
        self.feeds
            .upsert(RssFeed {
                chat_id: chat_id.to_string(),
                feed_link: feed_link.to_string(),
                old_entry_link: old_entry_link.to_string(),
            })
            .await
    }

    pub async fn remove_url(&self, chat_id: &str, feed_link: &str) -> StoreResult<bool> {
        self.feeds.delete(&feed_key(chat_id, feed_link)).await
    }

    pub fn get_urls(&self, chat_id: &str) -> Vec<RssFeed> {
        self.feeds.chat(chat_id)
    }

    pub fn get_all(&self) -> Vec<RssFeed> {
        self.feeds.scan(|_| true)
    }

    /// Record the newest posted entry. Returns `false` if the chat does not
    /// follow the feed.
    pub async fn update_url(
        &self,
        chat_id: &str,
        feed_link: &str,
        new_entry_link: &str,
    ) -> StoreResult<bool> {
        self.feeds
            .modify(&feed_key(chat_id, feed_link), |current| match current {
                Some(feed) => {
                    let mut feed = feed.clone();
                    feed.old_entry_link = new_entry_link.to_string();
                    (Change::Put(feed), true)
                }
                None => (Change::Keep, false),
            })
            .await
    }
}

#[async_trait]
impl Feature for RssRepository {
    fn name(&self) -> &str {
        "rss_feed"
    }

    async fn load_all(&self) -> StoreResult<usize> {
        self.feeds.load_all().await
    }

    async fn migrate_chat(&self, old_chat: &str, new_chat: &str) -> StoreResult<u64> {
        self.feeds.migrate_chat(old_chat, new_chat).await
    }

    fn cached(&self) -> usize {
        self.feeds.len()
    }
}
