//! Repository module - one accessor per bot feature.
//!
//! [`Repositories`] owns every feature repository. It is built once from the
//! connected [`Storage`], loaded with [`Repositories::load_all`] before the bot
//! starts taking updates, and shared from then on.

mod afk_repository;
mod antiflood_repository;
mod blacklist_repository;
mod disabled_repository;
mod filter_repository;
mod locks_repository;
mod log_channel_repository;
mod note_repository;
mod reporting_repository;
mod rss_repository;
mod rules_repository;
mod safemode_repository;
mod sanction_repository;
mod userinfo_repository;
mod users_repository;
mod warns_repository;
mod welcome_repository;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, warn};

use super::backend::Storage;
use super::error::StoreResult;

pub use afk_repository::AfkRepository;
pub use antiflood_repository::AntifloodRepository;
pub use blacklist_repository::BlacklistRepository;
pub use disabled_repository::DisabledRepository;
pub use filter_repository::FilterRepository;
pub use locks_repository::LocksRepository;
pub use log_channel_repository::LogChannelRepository;
pub use note_repository::NoteRepository;
pub use reporting_repository::ReportingRepository;
pub use rss_repository::RssRepository;
pub use rules_repository::RulesRepository;
pub use safemode_repository::SafeModeRepository;
pub use sanction_repository::GlobalSanctionRepository;
pub use userinfo_repository::UserInfoRepository;
pub use users_repository::UsersRepository;
pub use warns_repository::WarnsRepository;
pub use welcome_repository::WelcomeRepository;

/// Lifecycle shared by every feature repository.
#[async_trait]
pub trait Feature: Send + Sync {
    fn name(&self) -> &str;

    /// Load every store of the feature from the backend.
    async fn load_all(&self) -> StoreResult<usize>;

    /// Re-key the feature's chat-scoped records. Features without any keep
    /// the default.
    async fn migrate_chat(&self, _old_chat: &str, _new_chat: &str) -> StoreResult<u64> {
        Ok(0)
    }

    /// Records currently cached.
    fn cached(&self) -> usize;
}

/// Every feature repository.
pub struct Repositories {
    pub afk: AfkRepository,
    pub antiflood: AntifloodRepository,
    pub blacklist: BlacklistRepository,
    pub filters: FilterRepository,
    pub disabled: DisabledRepository,
    pub gbans: GlobalSanctionRepository,
    pub gmutes: GlobalSanctionRepository,
    pub locks: LocksRepository,
    pub log_channels: LogChannelRepository,
    pub notes: NoteRepository,
    pub reporting: ReportingRepository,
    pub rss: RssRepository,
    pub rules: RulesRepository,
    pub safemode: SafeModeRepository,
    pub userinfo: UserInfoRepository,
    pub users: UsersRepository,
    pub warns: WarnsRepository,
    pub welcome: WelcomeRepository,
}

impl Repositories {
    pub fn new(storage: &Storage) -> Self {
        Self {
            afk: AfkRepository::new(storage),
            antiflood: AntifloodRepository::new(storage),
            blacklist: BlacklistRepository::new(storage),
            filters: FilterRepository::new(storage),
            disabled: DisabledRepository::new(storage),
            gbans: GlobalSanctionRepository::gbans(storage),
            gmutes: GlobalSanctionRepository::gmutes(storage),
            locks: LocksRepository::new(storage),
            log_channels: LogChannelRepository::new(storage),
            notes: NoteRepository::new(storage),
            reporting: ReportingRepository::new(storage),
            rss: RssRepository::new(storage),
            rules: RulesRepository::new(storage),
            safemode: SafeModeRepository::new(storage),
            userinfo: UserInfoRepository::new(storage),
            users: UsersRepository::new(storage),
            warns: WarnsRepository::new(storage),
            welcome: WelcomeRepository::new(storage),
        }
    }

    fn features(&self) -> [&dyn Feature; 18] {
        [
            &self.afk,
            &self.antiflood,
            &self.blacklist,
            &self.filters,
            &self.disabled,
            &self.gbans,
            &self.gmutes,
            &self.locks,
            &self.log_channels,
            &self.notes,
            &self.reporting,
            &self.rss,
            &self.rules,
            &self.safemode,
            &self.userinfo,
            &self.users,
            &self.warns,
            &self.welcome,
        ]
    }

    /// Load every feature from the backend. Any failure is fatal.
    pub async fn load_all(&self) -> Result<usize> {
        let mut total = 0;
        for feature in self.features() {
            total += feature
                .load_all()
                .await
                .with_context(|| format!("failed to load {}", feature.name()))?;
        }

        info!("Loaded {} records across all features", total);
        Ok(total)
    }

    /// Move every feature's records of `old_chat` to `new_chat`.
    ///
    /// Features are migrated one after another. A failing feature does not
    /// stop the others; the first failure is returned once all have run.
    pub async fn migrate_chat(&self, old_chat: &str, new_chat: &str) -> StoreResult<u64> {
        let mut moved = 0;
        let mut first_error = None;

        for feature in self.features() {
            match feature.migrate_chat(old_chat, new_chat).await {
                Ok(count) => moved += count,
                Err(e) => {
                    warn!(
                        "Failed to migrate {} from {} to {}: {}",
                        feature.name(),
                        old_chat,
                        new_chat,
                        e
                    );
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                info!("Migrated chat {} to {} ({} records)", old_chat, new_chat, moved);
                Ok(moved)
            }
        }
    }

    /// Cached record count per feature.
    pub fn stats(&self) -> Vec<(String, usize)> {
        self.features()
            .iter()
            .map(|f| (f.name().to_string(), f.cached()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{InlineButton, LockType, MessageKind};

    async fn repos() -> Repositories {
        let repos = Repositories::new(&Storage::Memory);
        repos.load_all().await.unwrap();
        repos
    }

    #[tokio::test]
    async fn test_mutation_before_load_is_rejected() {
        let repos = Repositories::new(&Storage::Memory);
        let err = repos.rules.set_rules("-1", "x").await.unwrap_err();
        assert!(matches!(err, crate::database::StoreError::NotReady(_)));
    }

    #[tokio::test]
    async fn test_migrate_chat_fans_out_to_every_feature() {
        let repos = repos().await;
        repos.rules.set_rules("-1", "no spam").await.unwrap();
        repos.blacklist.add_to_blacklist("-1", "casino").await.unwrap();
        repos.warns.warn_user(7, "-1", Some("spam")).await.unwrap();
        repos
            .notes
            .add_note("-1", "faq", "see pinned", MessageKind::Text, vec![], None)
            .await
            .unwrap();
        repos
            .welcome
            .set_custom_welcome("-1", "hi", MessageKind::ButtonText, vec![InlineButton::new("a", "https://a")])
            .await
            .unwrap();
        repos.locks.update_lock("-1", LockType::Sticker, true).await.unwrap();
        repos.users.update_user(7, Some("seven"), Some(("-1", "group"))).await.unwrap();
        repos.afk.set_afk(7, "away").await.unwrap();

        let moved = repos.migrate_chat("-1", "-100").await.unwrap();
        assert_eq!(moved, 9);

        assert_eq!(repos.rules.get_rules("-100").as_deref(), Some("no spam"));
        assert!(repos.blacklist.get_chat_blacklist("-100").contains("casino"));
        assert_eq!(repos.warns.get_warns(7, "-100").map(|w| w.0), Some(1));
        assert!(repos.notes.get_note("-100", "faq").is_some());
        assert_eq!(repos.welcome.get_welc_buttons("-100").len(), 1);
        assert!(repos.locks.is_locked("-100", LockType::Sticker));
        assert_eq!(repos.users.get_chat_members("-100"), vec![7]);
        assert!(repos.afk.is_afk(7));

        assert_eq!(repos.rules.get_rules("-1"), None);
        assert!(repos.users.get_chat("-1").is_none());
    }

    #[tokio::test]
    async fn test_migrate_same_chat_is_noop() {
        let repos = repos().await;
        repos.rules.set_rules("-1", "x").await.unwrap();
        assert_eq!(repos.migrate_chat("-1", "-1").await.unwrap(), 0);
        assert_eq!(repos.rules.get_rules("-1").as_deref(), Some("x"));
    }

    #[tokio::test]
    async fn test_stats_lists_every_feature() {
        let repos = repos().await;
        repos.safemode.set_safemode("-1", true).await.unwrap();

        let stats = repos.stats();
        assert_eq!(stats.len(), 18);
        assert!(stats.contains(&("safemode".to_string(), 1)));
        assert!(stats.contains(&("gmutes".to_string(), 0)));
    }
}
