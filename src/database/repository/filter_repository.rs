//! Custom filter repository.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::debug;

use super::Feature;
use crate::cache::{KeyedCacheStore, MigratePolicy};
use crate::database::models::{CustomFilter, FilterButton, InlineButton, MessageKind};
use crate::database::{KeywordKey, Storage, StoreResult};

/// Repository for auto-reply filters and their buttons.
pub struct FilterRepository {
    filters: KeyedCacheStore<CustomFilter>,
    buttons: KeyedCacheStore<FilterButton>,
}

impl FilterRepository {
    pub fn new(storage: &Storage) -> Self {
        Self {
            filters: KeyedCacheStore::new(storage.partition("cust_filters"), MigratePolicy::Reinsert),
            buttons: KeyedCacheStore::new(storage.partition("cust_buttons"), MigratePolicy::Reinsert),
        }
    }

    /// Add a filter, replacing an existing one with the same keyword along
    /// with its buttons.
    pub async fn add_filter(
        &self,
        chat_id: &str,
        keyword: &str,
        reply: &str,
        kind: MessageKind,
        buttons: Vec<InlineButton>,
    ) -> StoreResult<()> {
        self.delete_buttons(chat_id, keyword).await?;

        self.filters
            .upsert(CustomFilter {
                chat_id: chat_id.to_string(),
                keyword: keyword.to_string(),
                reply: reply.to_string(),
                kind,
                has_buttons: !buttons.is_empty(),
            })
            .await?;

        for (button, position) in buttons.into_iter().zip(0..) {
            self.buttons
                .upsert(FilterButton {
                    chat_id: chat_id.to_string(),
                    keyword: keyword.to_string(),
                    position,
                    button,
                })
                .await?;
        }

        debug!("Saved filter '{}' for chat {}", keyword, chat_id);
        Ok(())
    }

    /// Remove a filter and its buttons. Returns whether it existed.
    pub async fn remove_filter(&self, chat_id: &str, keyword: &str) -> StoreResult<bool> {
        let existed = self.filters.delete(&KeywordKey::new(chat_id, keyword)).await?;
        if existed {
            self.delete_buttons(chat_id, keyword).await?;
        }
        Ok(existed)
    }

    pub fn get_filter(&self, chat_id: &str, keyword: &str) -> Option<CustomFilter> {
        self.filters.get(&KeywordKey::new(chat_id, keyword))
    }

    /// Filters of a chat by keyword.
    pub fn get_chat_filters(&self, chat_id: &str) -> BTreeMap<String, CustomFilter> {
        self.filters
            .chat(chat_id)
            .into_iter()
            .map(|f| (f.keyword.clone(), f))
            .collect()
    }

    /// Keywords of a chat, longest first so longer phrases match before
    /// their prefixes.
    pub fn get_chat_triggers(&self, chat_id: &str) -> Vec<String> {
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

    /// Append a button to a filter.
    pub async fn add_button(
        &self,
        chat_id: &str,
        keyword: &str,
        button: InlineButton,
    ) -> StoreResult<()> {
        self.buttons
            .append(chat_id, |current| {
                let position = current
                    .iter()
                    .filter(|b| b.keyword == keyword)
                    .last()
                    .map_or(0, |b| b.position + 1);
                FilterButton {
                    chat_id: chat_id.to_string(),
                    keyword: keyword.to_string(),
                    position,
                    button,
                }
            })
            .await?;
        Ok(())
    }

    /// Buttons of a filter in the order they were added.
    pub fn get_buttons(&self, chat_id: &str, keyword: &str) -> Vec<InlineButton> {
        self.button_rows(chat_id, keyword)
            .into_iter()
            .map(|b| b.button)
            .collect()
    }

    fn button_rows(&self, chat_id: &str, keyword: &str) -> Vec<FilterButton> {
        let mut rows = self.buttons.chat(chat_id);
        rows.retain(|b| b.keyword == keyword);
        rows
    }

    pub async fn delete_buttons(&self, chat_id: &str, keyword: &str) -> StoreResult<u64> {
        self.buttons
            .delete_where(chat_id, |b| b.keyword == keyword)
            .await
    }

    pub fn get_all_filters(&self) -> Vec<CustomFilter> {
        self.filters.scan(|_| true)
    }

    pub async fn num_filters(&self) -> StoreResult<u64> {
        self.filters.count_store().await
    }

    pub async fn num_chats(&self) -> StoreResult<u64> {
        self.filters.distinct_chats_store().await
    }
}

#[async_trait]
impl Feature for FilterRepository {
    fn name(&self) -> &str {
        "cust_filters"
    }

    async fn load_all(&self) -> StoreResult<usize> {
        Ok(self.filters.load_all().await? + self.buttons.load_all().await?)
    }

    async fn migrate_chat(&self, old_chat: &str, new_chat: &str) -> StoreResult<u64> {
        let moved = self.filters.migrate_chat(old_chat, new_chat).await?;
        Ok(moved + self.buttons.migrate_chat(old_chat, new_chat).await?)
    }

    fn cached(&self) -> usize {
        self.filters.len() + self.buttons.len()
    }
}
