//! Note repository.
//!
//! Notes and their buttons live in separate partitions. Buttons are keyed by
//! note name and position so they come back in the order they were added.

use async_trait::async_trait;
use tracing::debug;

use super::Feature;
use crate::cache::{KeyedCacheStore, MigratePolicy};
use crate::database::models::notes::NoteKey;
use crate::database::models::{InlineButton, MessageKind, Note, NoteButton};
use crate::database::{Storage, StoreResult};

/// Repository for saved notes.
pub struct NoteRepository {
    notes: KeyedCacheStore<Note>,
    buttons: KeyedCacheStore<NoteButton>,
}

fn note_key(chat_id: &str, name: &str) -> NoteKey {
    NoteKey {
        chat_id: chat_id.to_string(),
        name: name.to_string(),
    }
}

impl NoteRepository {
    pub fn new(storage: &Storage) -> Self {
        Self {
            notes: KeyedCacheStore::new(storage.partition("notes"), MigratePolicy::Reinsert),
            buttons: KeyedCacheStore::new(
                storage.partition("note_buttons"),
                MigratePolicy::Reinsert,
            ),
        }
    }

    /// Save a note, replacing any note of the same name and its buttons.
    pub async fn add_note(
        &self,
        chat_id: &str,
        name: &str,
        value: &str,
        msg_type: MessageKind,
        buttons: Vec<InlineButton>,
        file: Option<String>,
    ) -> StoreResult<()> {
        self.delete_buttons(chat_id, name).await?;

        self.notes
            .upsert(Note {
                chat_id: chat_id.to_string(),
                name: name.to_string(),
                value: value.to_string(),
                file,
                msg_type,
                is_reply: false,
                has_buttons: !buttons.is_empty(),
            })
            .await?;

        for (button, position) in buttons.into_iter().zip(0..) {
            self.buttons
                .upsert(NoteButton {
                    chat_id: chat_id.to_string(),
                    note_name: name.to_string(),
                    position,
                    button,
                })
                .await?;
        }

        debug!("Saved note {} for chat {}", name, chat_id);
        Ok(())
    }

    pub fn get_note(&self, chat_id: &str, name: &str) -> Option<Note> {
        self.notes.get(&note_key(chat_id, name))
    }

    /// Delete a note and its buttons. Returns whether the note existed.
    pub async fn rm_note(&self, chat_id: &str, name: &str) -> StoreResult<bool> {
        let existed = self.notes.delete(&note_key(chat_id, name)).await?;
        if existed {
            self.delete_buttons(chat_id, name).await?;
        }
        Ok(existed)
    }

    /// Every note of a chat, sorted by name.
    pub fn get_all_chat_notes(&self, chat_id: &str) -> Vec<Note> {
        self.notes.chat(chat_id)
    }

    /// Append a button to a note.
    pub async fn add_note_button(
        &self,
        chat_id: &str,
        note_name: &str,
        button: InlineButton,
    ) -> StoreResult<()> {
        self.buttons
            .append(chat_id, |current| {
                let position = current
                    .iter()
                    .filter(|b| b.note_name == note_name)
                    .last()
                    .map_or(0, |b| b.position + 1);
                NoteButton {
                    chat_id: chat_id.to_string(),
                    note_name: note_name.to_string(),
                    position,
                    button,
                }
            })
            .await?;
        Ok(())
    }

    /// Buttons of a note in the order they were added.
    pub fn get_buttons(&self, chat_id: &str, note_name: &str) -> Vec<InlineButton> {
        self.button_rows(chat_id, note_name)
            .into_iter()
            .map(|b| b.button)
            .collect()
    }

    fn button_rows(&self, chat_id: &str, note_name: &str) -> Vec<NoteButton> {
        let mut rows = self.buttons.chat(chat_id);
        rows.retain(|b| b.note_name == note_name);
        rows
    }

    async fn delete_buttons(&self, chat_id: &str, note_name: &str) -> StoreResult<u64> {
        self.buttons
            .delete_where(chat_id, |b| b.note_name == note_name)
            .await
    }

    pub async fn num_notes(&self) -> StoreResult<u64> {
        self.notes.count_store().await
    }

    pub async fn num_chats(&self) -> StoreResult<u64> {
        self.notes.distinct_chats_store().await
    }
}

#[async_trait]
impl Feature for NoteRepository {
    fn name(&self) -> &str {
        "notes"
    }

    async fn load_all(&self) -> StoreResult<usize> {
        Ok(self.notes.load_all().await? + self.buttons.load_all().await?)
    }

    async fn migrate_chat(&self, old_chat: &str, new_chat: &str) -> StoreResult<u64> {
        let moved = self.notes.migrate_chat(old_chat, new_chat).await?;
        Ok(moved + self.buttons.migrate_chat(old_chat, new_chat).await?)
    }

    fn cached(&self) -> usize {
        self.notes.len() + self.buttons.len()
    }
}
