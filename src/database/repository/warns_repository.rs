//! Warns repository.
//!
//! Warn counters, warn filters and per-chat warn settings.

use async_trait::async_trait;

use super::Feature;
use crate::cache::{Change, KeyedCacheStore, MigratePolicy};
use crate::database::models::{UserWarns, WarnFilter, WarnSettings};
use crate::database::{ChatKey, ChatUserKey, KeywordKey, Storage, StoreResult, UserId};

/// Repository for warns data.
pub struct WarnsRepository {
    warns: KeyedCacheStore<UserWarns>,
    filters: KeyedCacheStore<WarnFilter>,
    settings: KeyedCacheStore<WarnSettings>,
}

impl WarnsRepository {
    pub fn new(storage: &Storage) -> Self {
        Self {
            warns: KeyedCacheStore::new(storage.partition("warns"), MigratePolicy::Carry),
            filters: KeyedCacheStore::new(storage.partition("warn_filters"), MigratePolicy::Union),
            settings: KeyedCacheStore::new(
                storage.partition("warn_settings"),
                MigratePolicy::ReplaceTarget,
            ),
        }
    }

    /// Add a warn. Returns the new count and every reason so far.
    pub async fn warn_user(
        &self,
        user_id: UserId,
        chat_id: &str,
        reason: Option<&str>,
    ) -> StoreResult<(u32, Vec<String>)> {
        self.warns
            .modify(&ChatUserKey::new(chat_id, user_id), |current| {
                let mut warns = current
                    .cloned()
                    .unwrap_or_else(|| UserWarns::new(chat_id, user_id));
                warns.num_warns += 1;
                if let Some(reason) = reason {
                    warns.reasons.push(reason.to_string());
                }
                let out = (warns.num_warns, warns.reasons.clone());
                (Change::Put(warns), out)
            })
            .await
    }

    /// Take back one warn. Recorded reasons are kept. Returns `false` if
    /// there was none.
    pub async fn remove_warn(&self, user_id: UserId, chat_id: &str) -> StoreResult<bool> {
        self.warns
            .modify(&ChatUserKey::new(chat_id, user_id), |current| match current {
                Some(warns) if warns.num_warns > 0 => {
                    let mut warns = warns.clone();
                    warns.num_warns -= 1;
                    (Change::Put(warns), true)
                }
                _ => (Change::Keep, false),
            })
            .await
    }

    /// Zero the counter and drop every reason.
    pub async fn reset_warns(&self, user_id: UserId, chat_id: &str) -> StoreResult<()> {
        self.warns
            .modify(&ChatUserKey::new(chat_id, user_id), |current| match current {
                Some(_) => (Change::Put(UserWarns::new(chat_id, user_id)), ()),
                None => (Change::Keep, ()),
            })
            .await
    }

    pub fn get_warns(&self, user_id: UserId, chat_id: &str) -> Option<(u32, Vec<String>)> {
        self.warns
            .get(&ChatUserKey::new(chat_id, user_id))
            .map(|w| (w.num_warns, w.reasons))
    }

    /// Add or replace a warn filter. Keywords are case-insensitive.
    pub async fn add_warn_filter(&self, chat_id: &str, keyword: &str, reply: &str) -> StoreResult<()> {
        self.filters
            .upsert(WarnFilter {
                chat_id: chat_id.to_string(),
                keyword: keyword.to_lowercase(),
                reply: reply.to_string(),
            })
            .await
    }

    pub async fn remove_warn_filter(&self, chat_id: &str, keyword: &str) -> StoreResult<bool> {
        self.filters
            .delete(&KeywordKey::new(chat_id, keyword.to_lowercase()))
            .await
    }

    /// Keywords of a chat, longest first, ties in lexical order.
    pub fn get_chat_warn_triggers(&self, chat_id: &str) -> Vec<String> {
        let mut triggers: Vec<String> = self
            .filters
            .chat(chat_id)
            .into_iter()
            .map(|f| f.keyword)
            .collect();
        triggers.sort_by(|a, b| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| a.cmp(b))
        });
        triggers
    }

    pub fn get_chat_warn_filters(&self, chat_id: &str) -> Vec<WarnFilter> {
        self.filters.chat(chat_id)
    }

    pub fn get_warn_filter(&self, chat_id: &str, keyword: &str) -> Option<WarnFilter> {
        self.filters
            .get(&KeywordKey::new(chat_id, keyword.to_lowercase()))
    }

    pub async fn set_warn_limit(&self, chat_id: &str, warn_limit: u32) -> StoreResult<()> {
        self.update_settings(chat_id, |s| s.warn_limit = warn_limit).await
    }

    pub async fn set_warn_strength(&self, chat_id: &str, soft_warn: bool) -> StoreResult<()> {
        self.update_settings(chat_id, |s| s.soft_warn = soft_warn).await
    }

    async fn update_settings(
        &self,
        chat_id: &str,
        update: impl FnOnce(&mut WarnSettings) + Send,
    ) -> StoreResult<()> {
        self.settings
            .modify(&ChatKey::new(chat_id), |current| {
                let mut settings = current
                    .cloned()
                    .unwrap_or_else(|| WarnSettings::new(chat_id));
                update(&mut settings);
                (Change::Put(settings), ())
            })
            .await
    }

    /// `(warn_limit, soft_warn)`, `(3, false)` when unset.
    pub fn get_warn_setting(&self, chat_id: &str) -> (u32, bool) {
        let settings = self
            .settings
            .get(&ChatKey::new(chat_id))
            .unwrap_or_else(|| WarnSettings::new(chat_id));
        (settings.warn_limit, settings.soft_warn)
    }

    /// Total warns across every chat.
    pub async fn num_warns(&self) -> StoreResult<u64> {
        let warns = self.warns.scan_store(|_| true).await?;
        Ok(warns.iter().map(|w| u64::from(w.num_warns)).sum())
    }

    pub async fn num_warn_chats(&self) -> StoreResult<u64> {
        self.warns.distinct_chats_store().await
    }

    pub async fn num_warn_filters(&self) -> StoreResult<u64> {
        self.filters.count_store().await
    }

    pub async fn num_warn_chat_filters(&self, chat_id: &str) -> StoreResult<u64> {
        self.filters.count_store_chat(chat_id).await
    }

    pub async fn num_warn_filter_chats(&self) -> StoreResult<u64> {
        self.filters.distinct_chats_store().await
    }
}

#[async_trait]
impl Feature for WarnsRepository {
    fn name(&self) -> &str {
        "warns"
    }

    async fn load_all(&self) -> StoreResult<usize> {
        Ok(self.warns.load_all().await?
            + self.filters.load_all().await?
            + self.settings.load_all().await?)
    }

    async fn migrate_chat(&self, old_chat: &str, new_chat: &str) -> StoreResult<u64> {
        let mut moved = self.warns.migrate_chat(old_chat, new_chat).await?;
        moved += self.filters.migrate_chat(old_chat, new_chat).await?;
        moved += self.settings.migrate_chat(old_chat, new_chat).await?;
        Ok(moved)
    }

    fn cached(&self) -> usize {
        self.warns.len() + self.filters.len() + self.settings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repo() -> WarnsRepository {
        let repo = WarnsRepository::new(&Storage::Memory);
        repo.load_all().await.unwrap();
        repo
    }

    #[tokio::test]
    async fn test_warn_past_limit_then_reset() {
        let repo = repo().await;
        let (limit, soft) = repo.get_warn_setting("-1");
        assert_eq!((limit, soft), (3, false));

        for i in 1..=3 {
            let (count, _) = repo.warn_user(5, "-1", Some("spam")).await.unwrap();
            assert_eq!(count, i);
        }
        let (count, reasons) = repo.warn_user(5, "-1", Some("flood")).await.unwrap();
        assert_eq!(count, 4);
        assert!(count > limit);
        assert_eq!(reasons, vec!["spam", "spam", "spam", "flood"]);

        repo.reset_warns(5, "-1").await.unwrap();
        assert_eq!(repo.get_warns(5, "-1"), Some((0, vec![])));
    }

    #[tokio::test]
    async fn test_remove_warn_stops_at_zero() {
        let repo = repo().await;
        assert!(!repo.remove_warn(5, "-1").await.unwrap());

        repo.warn_user(5, "-1", Some("a")).await.unwrap();
        repo.warn_user(5, "-1", None).await.unwrap();
        assert!(repo.remove_warn(5, "-1").await.unwrap());
        assert!(repo.remove_warn(5, "-1").await.unwrap());
        assert!(!repo.remove_warn(5, "-1").await.unwrap());
        assert_eq!(repo.get_warns(5, "-1"), Some((0, vec!["a".to_string()])));
    }

    #[tokio::test]
    async fn test_remove_warn_keeps_reasons() {
        let repo = repo().await;
        repo.warn_user(5, "-1", Some("spam")).await.unwrap();
        repo.warn_user(5, "-1", Some("flood")).await.unwrap();

        assert!(repo.remove_warn(5, "-1").await.unwrap());
        assert_eq!(
            repo.get_warns(5, "-1"),
            Some((1, vec!["spam".to_string(), "flood".to_string()]))
        );
    }

    #[tokio::test]
    async fn test_warn_filters() {
        let repo = repo().await;
        repo.add_warn_filter("-1", "Crypto", "no shilling").await.unwrap();
        repo.add_warn_filter("-1", "nft", "no shilling").await.unwrap();
        repo.add_warn_filter("-1", "ico", "no shilling").await.unwrap();

        assert_eq!(repo.get_chat_warn_triggers("-1"), vec!["crypto", "ico", "nft"]);
        assert!(repo.get_warn_filter("-1", "CRYPTO").is_some());
        assert!(repo.remove_warn_filter("-1", "crypto").await.unwrap());
        assert_eq!(repo.num_warn_chat_filters("-1").await.unwrap(), 2);
        assert_eq!(repo.get_chat_warn_filters("-1").len(), 2);
    }

    #[tokio::test]
    async fn test_warn_triggers_count_characters() {
        let repo = repo().await;
        repo.add_warn_filter("-1", "äää", "x").await.unwrap();
        repo.add_warn_filter("-1", "abcde", "x").await.unwrap();

        assert_eq!(repo.get_chat_warn_triggers("-1"), vec!["abcde", "äää"]);
    }

    #[tokio::test]
    async fn test_settings_and_totals() {
        let repo = repo().await;
        repo.set_warn_limit("-1", 5).await.unwrap();
        repo.set_warn_strength("-1", true).await.unwrap();
        assert_eq!(repo.get_warn_setting("-1"), (5, true));

        repo.warn_user(1, "-1", None).await.unwrap();
        repo.warn_user(1, "-1", None).await.unwrap();
        repo.warn_user(2, "-2", None).await.unwrap();
        assert_eq!(repo.num_warns().await.unwrap(), 3);
        assert_eq!(repo.num_warn_chats().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_migration_carries_counters() {
        let repo = repo().await;
        repo.warn_user(1, "-1", Some("x")).await.unwrap();
        repo.warn_user(1, "-1", Some("y")).await.unwrap();
        repo.warn_user(1, "-100", Some("z")).await.unwrap();
        repo.set_warn_limit("-1", 7).await.unwrap();

        repo.migrate_chat("-1", "-100").await.unwrap();

        // The migrated counter replaces the one already at the new chat.
        assert_eq!(repo.get_warns(1, "-100"), Some((2, vec!["x".into(), "y".into()])));
        assert_eq!(repo.get_warns(1, "-1"), None);
        assert_eq!(repo.get_warn_setting("-100"), (7, false));
    }
}
