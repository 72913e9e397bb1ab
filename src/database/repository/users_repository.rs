//! Users, chats and memberships repository.
//!
//! Every message the bot sees passes through [`UsersRepository::update_user`],
//! so writes are skipped when nothing changed.

use async_trait::async_trait;
use tracing::debug;

use super::Feature;
use crate::cache::{KeyedCacheStore, MigratePolicy};
use crate::database::models::{ChatMember, TgChat, TgUser};
use crate::database::{ChatKey, ChatUserKey, Record, Storage, StoreResult, UserId, UserKey};

/// Repository for tracking and resolving users.
pub struct UsersRepository {
    users: KeyedCacheStore<TgUser>,
    chats: KeyedCacheStore<TgChat>,
    members: KeyedCacheStore<ChatMember>,
}

impl UsersRepository {
    pub fn new(storage: &Storage) -> Self {
        Self {
            users: KeyedCacheStore::new(storage.partition("users"), MigratePolicy::Reinsert),
            chats: KeyedCacheStore::new(storage.partition("chats"), MigratePolicy::ReplaceTarget),
            members: KeyedCacheStore::new(storage.partition("chat_members"), MigratePolicy::Union),
        }
    }

    /// Record the bot itself so it resolves like any other user.
    pub async fn ensure_bot_in_db(&self, bot_id: UserId, username: &str) -> StoreResult<()> {
        self.update_user(bot_id, Some(username), None).await
    }

    /// Record a user, and optionally the chat they were seen in. A chat with
    /// an empty id or name is not recorded.
    pub async fn update_user(
        &self,
        user_id: UserId,
        username: Option<&str>,
        chat: Option<(&str, &str)>,
    ) -> StoreResult<()> {
        let user = TgUser::new(user_id, username.map(str::to_string));
        if self.users.get(&user.key()).as_ref() != Some(&user) {
            self.users.upsert(user).await?;
        }

        let Some((chat_id, chat_name)) = chat.filter(|(id, name)| !id.is_empty() && !name.is_empty())
        else {
            return Ok(());
        };

        let chat = TgChat {
            chat_id: chat_id.to_string(),
            chat_name: chat_name.to_string(),
        };
        if self.chats.get(&chat.key()).as_ref() != Some(&chat) {
            self.chats.upsert(chat).await?;
        }

        let member = ChatMember {
            chat_id: chat_id.to_string(),
            user_id,
        };
        if !self.members.contains(&member.key()) {
            self.members.upsert(member).await?;
        }

        Ok(())
    }

    /// Users whose username matches, ignoring case.
    pub fn get_userid_by_name(&self, username: &str) -> Vec<UserId> {
        let username = username.trim_start_matches('@');
        self.users
            .scan(|u| {
                u.username
                    .as_deref()
                    .is_some_and(|name| name.eq_ignore_ascii_case(username))
            })
            .into_iter()
            .map(|u| u.user_id)
            .collect()
    }

    pub fn get_name_by_userid(&self, user_id: UserId) -> Option<String> {
        self.users.get(&UserKey::new(user_id))?.username
    }

    pub fn get_chat_members(&self, chat_id: &str) -> Vec<UserId> {
        self.members
            .chat(chat_id)
            .into_iter()
            .map(|m| m.user_id)
            .collect()
    }

    pub fn get_all_chats(&self) -> Vec<TgChat> {
        self.chats.scan(|_| true)
    }

    /// Number of chats a user has been seen in.
    pub fn get_user_num_chats(&self, user_id: UserId) -> usize {
        self.members.scan(|m| m.user_id == user_id).len()
    }

    pub fn num_chats(&self) -> usize {
        self.chats.len()
    }

    pub fn num_users(&self) -> usize {
        self.users.len()
    }

    /// Forget a user and every membership recorded for them, known user or
    /// not. Returns whether the user row existed.
    pub async fn del_user(&self, user_id: UserId) -> StoreResult<bool> {
        for member in self.members.scan(|m| m.user_id == user_id) {
            self.members
                .delete(&ChatUserKey::new(member.chat_id, user_id))
                .await?;
        }

        let existed = self.users.delete(&UserKey::new(user_id)).await?;
        debug!("Deleted user {} and their memberships", user_id);
        Ok(existed)
    }

    pub fn get_chat(&self, chat_id: &str) -> Option<TgChat> {
        self.chats.get(&ChatKey::new(chat_id))
    }
}

#[async_trait]
impl Feature for UsersRepository {
    fn name(&self) -> &str {
        "users"
    }

    async fn load_all(&self) -> StoreResult<usize> {
        Ok(self.users.load_all().await?
            + self.chats.load_all().await?
            + self.members.load_all().await?)
    }

    async fn migrate_chat(&self, old_chat: &str, new_chat: &str) -> StoreResult<u64> {
        let moved = self.chats.migrate_chat(old_chat, new_chat).await?;
        Ok(moved + self.members.migrate_chat(old_chat, new_chat).await?)
    }

    fn cached(&self) -> usize {
        self.users.len() + self.chats.len() + self.members.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repo() -> UsersRepository {
        let repo = UsersRepository::new(&Storage::Memory);
        repo.load_all().await.unwrap();
        repo
    }

    #[tokio::test]
    async fn test_resolve_username_ignoring_case() {
        let repo = repo().await;
        repo.update_user(1, Some("Ferris"), Some(("-1", "Rustaceans")))
            .await
            .unwrap();
        repo.ensure_bot_in_db(99, "vault_bot").await.unwrap();

        assert_eq!(repo.get_userid_by_name("@ferris"), vec![1]);
        assert_eq!(repo.get_name_by_userid(99).as_deref(), Some("vault_bot"));
        assert_eq!(repo.num_users(), 2);
        assert_eq!(repo.get_chat("-1").unwrap().chat_name, "Rustaceans");
    }

    #[tokio::test]
    async fn test_memberships_and_cascade_delete() {
        let repo = repo().await;
        repo.update_user(1, Some("a"), Some(("-1", "one"))).await.unwrap();
        repo.update_user(1, Some("a"), Some(("-2", "two"))).await.unwrap();
        repo.update_user(2, Some("b"), Some(("-1", "one"))).await.unwrap();

        assert_eq!(repo.get_user_num_chats(1), 2);
        assert_eq!(repo.get_chat_members("-1"), vec![1, 2]);
        assert_eq!(repo.num_chats(), 2);

        assert!(repo.del_user(1).await.unwrap());
        assert!(!repo.del_user(1).await.unwrap());
        assert_eq!(repo.get_user_num_chats(1), 0);
        assert_eq!(repo.get_chat_members("-1"), vec![2]);
    }

    #[tokio::test]
    async fn test_untitled_chat_is_not_recorded() {
        let repo = repo().await;
        repo.update_user(1, Some("a"), Some(("-1", ""))).await.unwrap();

        assert_eq!(repo.num_users(), 1);
        assert!(repo.get_chat("-1").is_none());
        assert!(repo.get_chat_members("-1").is_empty());
    }

    #[tokio::test]
    async fn test_del_unknown_user_still_drops_memberships() {
        let repo = repo().await;
        repo.members
            .upsert(ChatMember {
                chat_id: "-1".to_string(),
                user_id: 3,
            })
            .await
            .unwrap();

        assert!(!repo.del_user(3).await.unwrap());
        assert!(repo.get_chat_members("-1").is_empty());
    }

    #[tokio::test]
    async fn test_migration_merges_members_and_replaces_chat() {
        let repo = repo().await;
        repo.update_user(1, Some("a"), Some(("-1", "group"))).await.unwrap();
        repo.update_user(2, Some("b"), Some(("-100", "supergroup"))).await.unwrap();

        repo.migrate_chat("-1", "-100").await.unwrap();

        assert_eq!(repo.get_chat_members("-100"), vec![1, 2]);
        assert!(repo.get_chat_members("-1").is_empty());
        assert_eq!(repo.get_chat("-100").unwrap().chat_name, "group");
        assert!(repo.get_chat("-1").is_none());
    }
}
