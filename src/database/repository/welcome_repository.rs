//! Welcome repository.
//!
//! Welcome and goodbye preferences share one record per chat; their buttons
//! live in two partitions that are replaced wholesale whenever the message is.

use async_trait::async_trait;

use super::Feature;
use crate::cache::{Change, KeyedCacheStore, MigratePolicy};
use crate::database::models::{GreetingButton, InlineButton, MessageKind, WelcomePrefs};
use crate::database::{ChatKey, Storage, StoreResult};

/// Repository for welcome/goodbye settings.
pub struct WelcomeRepository {
    prefs: KeyedCacheStore<WelcomePrefs>,
    welcome_buttons: KeyedCacheStore<GreetingButton>,
    leave_buttons: KeyedCacheStore<GreetingButton>,
}

impl WelcomeRepository {
    pub fn new(storage: &Storage) -> Self {
        Self {
            prefs: KeyedCacheStore::new(
                storage.partition("welcome_pref"),
                MigratePolicy::ReplaceTarget,
            ),
            welcome_buttons: KeyedCacheStore::new(
                storage.partition("welcome_urls"),
                MigratePolicy::Reinsert,
            ),
            leave_buttons: KeyedCacheStore::new(
                storage.partition("leave_urls"),
                MigratePolicy::Reinsert,
            ),
        }
    }

    fn prefs(&self, chat_id: &str) -> WelcomePrefs {
        self.prefs
            .get(&ChatKey::new(chat_id))
            .unwrap_or_else(|| WelcomePrefs::new(chat_id))
    }

    async fn update_prefs(
        &self,
        chat_id: &str,
        update: impl FnOnce(&mut WelcomePrefs) + Send,
    ) -> StoreResult<()> {
        self.prefs
            .modify(&ChatKey::new(chat_id), |current| {
                let mut prefs = current
                    .cloned()
                    .unwrap_or_else(|| WelcomePrefs::new(chat_id));
                update(&mut prefs);
                (Change::Put(prefs), ())
            })
            .await
    }

    async fn replace_buttons(
        store: &KeyedCacheStore<GreetingButton>,
        chat_id: &str,
        buttons: Vec<InlineButton>,
    ) -> StoreResult<()> {
        store.delete_chat(chat_id).await?;
        for button in GreetingButton::numbered(chat_id, buttons) {
            store.upsert(button).await?;
        }
        Ok(())
    }

    /// `(should_welcome, custom_welcome, welcome_type)`.
    pub fn get_welc_pref(&self, chat_id: &str) -> (bool, String, MessageKind) {
        let prefs = self.prefs(chat_id);
        (prefs.should_welcome, prefs.custom_welcome, prefs.welcome_type)
    }

    /// `(should_goodbye, custom_leave, leave_type)`.
    pub fn get_gdbye_pref(&self, chat_id: &str) -> (bool, String, MessageKind) {
        let prefs = self.prefs(chat_id);
        (prefs.should_goodbye, prefs.custom_leave, prefs.leave_type)
    }

    pub async fn set_welc_preference(&self, chat_id: &str, should_welcome: bool) -> StoreResult<()> {
        self.update_prefs(chat_id, |p| p.should_welcome = should_welcome)
            .await
    }

    pub async fn set_gdbye_preference(&self, chat_id: &str, should_goodbye: bool) -> StoreResult<()> {
        self.update_prefs(chat_id, |p| p.should_goodbye = should_goodbye)
            .await
    }

    /// Set the welcome message and replace its buttons.
    pub async fn set_custom_welcome(
        &self,
        chat_id: &str,
        custom_welcome: &str,
        welcome_type: MessageKind,
        buttons: Vec<InlineButton>,
    ) -> StoreResult<()> {
        self.update_prefs(chat_id, |p| {
            p.custom_welcome = custom_welcome.to_string();
            p.welcome_type = welcome_type;
        })
        .await?;

        Self::replace_buttons(&self.welcome_buttons, chat_id, buttons).await
    }

    pub fn get_custom_welcome(&self, chat_id: &str) -> String {
        self.prefs(chat_id).custom_welcome
    }

    /// Set the goodbye message and replace its buttons.
    pub async fn set_custom_gdbye(
        &self,
        chat_id: &str,
        custom_leave: &str,
        leave_type: MessageKind,
        buttons: Vec<InlineButton>,
    ) -> StoreResult<()> {
        self.update_prefs(chat_id, |p| {
            p.custom_leave = custom_leave.to_string();
            p.leave_type = leave_type;
        })
        .await?;

        Self::replace_buttons(&self.leave_buttons, chat_id, buttons).await
    }

    pub fn get_custom_gdbye(&self, chat_id: &str) -> String {
        self.prefs(chat_id).custom_leave
    }

    pub fn get_welc_buttons(&self, chat_id: &str) -> Vec<InlineButton> {
        self.welcome_buttons
            .chat(chat_id)
            .into_iter()
            .map(|b| b.button)
            .collect()
    }

    pub fn get_gdbye_buttons(&self, chat_id: &str) -> Vec<InlineButton> {
        self.leave_buttons
            .chat(chat_id)
            .into_iter()
            .map(|b| b.button)
            .collect()
    }

    /// Remember the last welcome message to clean up, or `None` to stop.
    pub async fn set_clean_welcome(&self, chat_id: &str, clean_welcome: Option<i64>) -> StoreResult<()> {
        self.update_prefs(chat_id, |p| p.clean_welcome = clean_welcome)
            .await
    }

    pub fn get_clean_pref(&self, chat_id: &str) -> Option<i64> {
        self.prefs(chat_id).clean_welcome
    }

    pub async fn set_del_joined(&self, chat_id: &str, del_joined: bool) -> StoreResult<()> {
        self.update_prefs(chat_id, |p| p.del_joined = del_joined).await
    }

    pub fn get_del_pref(&self, chat_id: &str) -> bool {
        self.prefs(chat_id).del_joined
    }
}

#[async_trait]
impl Feature for WelcomeRepository {
    fn name(&self) -> &str {
        "welcome"
    }

    async fn load_all(&self) -> StoreResult<usize> {
        Ok(self.prefs.load_all().await?
            + self.welcome_buttons.load_all().await?
            + self.leave_buttons.load_all().await?)
    }

    async fn migrate_chat(&self, old_chat: &str, new_chat: &str) -> StoreResult<u64> {
        let mut moved = self.prefs.migrate_chat(old_chat, new_chat).await?;
        moved += self.welcome_buttons.migrate_chat(old_chat, new_chat).await?;
        moved += self.leave_buttons.migrate_chat(old_chat, new_chat).await?;
        Ok(moved)
    }

    fn cached(&self) -> usize {
        self.prefs.len() + self.welcome_buttons.len() + self.leave_buttons.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::welcome::{DEFAULT_GOODBYE, DEFAULT_WELCOME};

    async fn repo() -> WelcomeRepository {
        let repo = WelcomeRepository::new(&Storage::Memory);
        repo.load_all().await.unwrap();
        repo
    }

    #[tokio::test]
    async fn test_defaults() {
        let repo = repo().await;
        assert_eq!(
            repo.get_welc_pref("-1"),
            (true, DEFAULT_WELCOME.to_string(), MessageKind::Text)
        );
        assert_eq!(repo.get_custom_gdbye("-1"), DEFAULT_GOODBYE);
        assert_eq!(repo.get_clean_pref("-1"), None);
        assert!(!repo.get_del_pref("-1"));
    }

    #[tokio::test]
    async fn test_custom_welcome_replaces_buttons() {
        let repo = repo().await;
        let first = vec![
            InlineButton::new("rules", "https://t.me/c/1"),
            InlineButton::new("site", "https://example.com").same_line(),
        ];
        repo.set_custom_welcome("-1", "Hi {first}!", MessageKind::ButtonText, first)
            .await
            .unwrap();
        assert_eq!(repo.get_welc_buttons("-1").len(), 2);

        repo.set_custom_welcome("-1", "Yo", MessageKind::ButtonText, vec![InlineButton::new("x", "https://x")])
            .await
            .unwrap();
        let buttons = repo.get_welc_buttons("-1");
        assert_eq!(buttons.len(), 1);
        assert_eq!(buttons[0].name, "x");
        assert_eq!(repo.get_custom_welcome("-1"), "Yo");
        assert!(repo.get_gdbye_buttons("-1").is_empty());
    }

    #[tokio::test]
    async fn test_preferences_persist_independently() {
        let repo = repo().await;
        repo.set_gdbye_preference("-1", false).await.unwrap();
        repo.set_clean_welcome("-1", Some(321)).await.unwrap();
        repo.set_del_joined("-1", true).await.unwrap();

        assert!(repo.get_welc_pref("-1").0);
        assert!(!repo.get_gdbye_pref("-1").0);
        assert_eq!(repo.get_clean_pref("-1"), Some(321));
        assert!(repo.get_del_pref("-1"));
    }

    #[tokio::test]
    async fn test_migration_moves_prefs_and_buttons() {
        let repo = repo().await;
        repo.set_custom_gdbye("-1", "Bye", MessageKind::Text, vec![InlineButton::new("b", "https://b")])
            .await
            .unwrap();
        repo.set_welc_preference("-100", false).await.unwrap();

        assert_eq!(repo.migrate_chat("-1", "-100").await.unwrap(), 2);
        assert_eq!(repo.get_custom_gdbye("-100"), "Bye");
        assert!(repo.get_welc_pref("-100").0);
        assert_eq!(repo.get_gdbye_buttons("-100").len(), 1);
        assert_eq!(repo.get_custom_gdbye("-1"), DEFAULT_GOODBYE);
    }
}
