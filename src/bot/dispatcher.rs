//! Message dispatcher setup.
//!
//! Every message is used to keep the users feature current. Group-to-supergroup
//! migration notices re-key every feature's records to the new chat id.

use std::sync::Arc;

use teloxide::dispatching::{DefaultKey, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::User;
use tracing::{info, warn};

use crate::database::Repositories;

/// Dispatcher type used by both polling and webhook mode.
pub type VaultDispatcher = Dispatcher<Bot, anyhow::Error, DefaultKey>;

/// Build the dispatcher with the shared repositories.
pub fn build_dispatcher(bot: Bot, repos: Arc<Repositories>) -> VaultDispatcher {
    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![repos])
        .enable_ctrlc_handler()
        .build()
}

/// Build the handler schema.
fn schema() -> UpdateHandler<anyhow::Error> {
    Update::filter_message().endpoint(on_message)
}

async fn on_message(msg: Message, repos: Arc<Repositories>) -> anyhow::Result<()> {
    if let Some(new_chat) = msg.migrate_to_chat_id() {
        let old_chat = msg.chat.id.to_string();
        let new_chat = new_chat.to_string();

        info!("Chat {} migrated to supergroup {}", old_chat, new_chat);
        repos.migrate_chat(&old_chat, &new_chat).await?;
        return Ok(());
    }

    track_users(&msg, &repos).await;
    Ok(())
}

/// Record the sender, the replied-to user and the forward origin.
async fn track_users(msg: &Message, repos: &Repositories) {
    let chat_id = msg.chat.id.to_string();
    // Only titled chats are recorded; private chats have no title.
    let chat = msg.chat.title().map(|title| (chat_id.as_str(), title));

    if let Some(user) = msg.from.as_ref() {
        track(repos, user, chat).await;
    }

    if let Some(user) = msg.reply_to_message().and_then(|reply| reply.from.as_ref()) {
        track(repos, user, chat).await;
    }

    if let Some(user) = msg.forward_from_user() {
        track(repos, user, None).await;
    }
}

async fn track(repos: &Repositories, user: &User, chat: Option<(&str, &str)>) {
    let user_id = user.id.0 as i64;
    if let Err(e) = repos
        .users
        .update_user(user_id, user.username.as_deref(), chat)
        .await
    {
        warn!("Failed to record user {}: {}", user_id, e);
    }
}
