//! Report settings repository.

use async_trait::async_trait;

use super::Feature;
use crate::cache::{KeyedCacheStore, MigratePolicy};
use crate::database::models::{ChatReportSetting, UserReportSetting};
use crate::database::{ChatKey, Storage, StoreResult, UserId, UserKey};

pub struct ReportingRepository {
    chats: KeyedCacheStore<ChatReportSetting>,
    users: KeyedCacheStore<UserReportSetting>,
}

impl ReportingRepository {
    pub fn new(storage: &Storage) -> Self {
        Self {
            chats: KeyedCacheStore::new(
                storage.partition("chat_report_settings"),
                MigratePolicy::ReplaceTarget,
            ),
            users: KeyedCacheStore::new(
                storage.partition("user_report_settings"),
                MigratePolicy::Reinsert,
            ),
        }
    }

    /// Chats do not forward reports until enabled.
    pub fn chat_should_report(&self, chat_id: &str) -> bool {
        self.chats
            .get(&ChatKey::new(chat_id))
            .is_some_and(|s| s.should_report)
    }

    /// Admins receive reports until they opt out.
    pub fn user_should_report(&self, user_id: UserId) -> bool {
        self.users
            .get(&UserKey::new(user_id))
            .is_none_or(|s| s.should_report)
    }

    pub async fn set_chat_setting(&self, chat_id: &str, should_report: bool) -> StoreResult<()> {
        self.chats
            .upsert(ChatReportSetting {
                chat_id: chat_id.to_string(),
                should_report,
            })
            .await
    }

    pub async fn set_user_setting(&self, user_id: UserId, should_report: bool) -> StoreResult<()> {
        self.users
            .upsert(UserReportSetting {
                user_id,
                should_report,
            })
            .await
    }
}

#[async_trait]
impl Feature for ReportingRepository {
    fn name(&self) -> &str {
        "reporting"
    }

    async fn load_all(&self) -> StoreResult<usize> {
        Ok(self.chats.load_all().await? + self.users.load_all().await?)
    }

    async fn migrate_chat(&self, old_chat: &str, new_chat: &str) -> StoreResult<u64> {
        self.chats.migrate_chat(old_chat, new_chat).await
    }

    fn cached(&self) -> usize {
        self.chats.len() + self.users.len()
    }
}
