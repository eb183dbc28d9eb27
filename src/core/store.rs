//! The conversation store: an ordered list of conversations plus the
//! currently selected one, mirrored into a single persistence slot.
//!
//! Whenever the store holds at least one conversation, `selected_id` resolves
//! to one of them. Every mutating operation re-establishes that before it
//! returns and then writes the full list back to storage. Storage failures
//! are logged and never unwind the in-memory state.

use crate::core::conversation::{Conversation, ConversationId, IdGenerator};
use crate::core::message::Message;
use crate::core::storage::{KeyValueStorage, StorageError};
use std::collections::HashSet;
use std::error::Error as StdError;
use std::fmt;
use tracing::{debug, info, warn};

/// Name of the slot holding the JSON array of conversations.
pub const CONVERSATIONS_KEY: &str = "conversations";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    NotFound(ConversationId),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(id) => write!(f, "Conversation {id} not found"),
        }
    }
}

impl StdError for StoreError {}

/// Why `load` started from a fresh conversation instead of restoring one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOrigin {
    Restored { count: usize },
    Missing,
    Empty,
    Corrupt { reason: String },
}

pub struct ConversationStore<S> {
    storage: S,
    conversations: Vec<Conversation>,
    selected: Option<ConversationId>,
    ids: IdGenerator,
    origin: LoadOrigin,
}

impl<S: KeyValueStorage> ConversationStore<S> {
    /// Read the persisted slot. Absent, unreadable or malformed state is
    /// discarded and replaced by one fresh conversation; otherwise the last
    /// stored conversation is selected.
    pub fn load(storage: S) -> Self {
        let (origin, conversations) = match storage.get(CONVERSATIONS_KEY) {
            Ok(Some(raw)) => match parse_conversations(&raw) {
                Ok(conversations) if conversations.is_empty() => (LoadOrigin::Empty, Vec::new()),
                Ok(conversations) => (
                    LoadOrigin::Restored {
                        count: conversations.len(),
                    },
                    conversations,
                ),
                Err(reason) => (LoadOrigin::Corrupt { reason }, Vec::new()),
            },
            Ok(None) => (LoadOrigin::Missing, Vec::new()),
            Err(err) => (
                LoadOrigin::Corrupt {
                    reason: err.to_string(),
                },
                Vec::new(),
            ),
        };

        let mut ids = IdGenerator::new();
        for conversation in &conversations {
            ids.observe(conversation.id);
        }

        let mut store = Self {
            storage,
            selected: conversations.last().map(|c| c.id),
            conversations,
            ids,
            origin,
        };

        match &store.origin {
            LoadOrigin::Restored { count } => {
                info!(
                    count,
                    backend = store.storage.backend_name(),
                    "Restored conversations"
                );
            }
            LoadOrigin::Corrupt { reason } => {
                warn!(%reason, "Discarding unreadable conversation state");
                store.create();
            }
            LoadOrigin::Missing | LoadOrigin::Empty => {
                debug!(origin = ?store.origin, "Starting with a fresh conversation");
                store.create();
            }
        }
        store
    }

    pub fn origin(&self) -> &LoadOrigin {
        &self.origin
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    pub fn get(&self, id: ConversationId) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn selected_id(&self) -> Option<ConversationId> {
        self.selected
    }

    pub fn selected(&self) -> Option<&Conversation> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Append an empty conversation titled after the current count and
    /// select it.
    pub fn create(&mut self) -> ConversationId {
        let conversation = Conversation::new(self.ids.next_id(), self.conversations.len());
        let id = conversation.id;
        debug!(%id, title = %conversation.title, "Created conversation");
        self.conversations.push(conversation);
        self.selected = Some(id);
        self.persist_logged();
        id
    }

    pub fn select(&mut self, id: ConversationId) -> Result<(), StoreError> {
        if self.get(id).is_none() {
            return Err(StoreError::NotFound(id));
        }
        self.selected = Some(id);
        debug!(%id, "Selected conversation");
        Ok(())
    }

    /// Replace the message list of `id`, leaving every other field alone.
    pub fn update(&mut self, id: ConversationId, messages: Vec<Message>) -> Result<(), StoreError> {
        let conversation = self.get_mut(id)?;
        conversation.messages = messages;
        debug!(%id, count = conversation.messages.len(), "Updated conversation");
        self.persist_logged();
        Ok(())
    }

    pub fn append_message(
        &mut self,
        id: ConversationId,
        message: Message,
    ) -> Result<(), StoreError> {
        self.get_mut(id)?.messages.push(message);
        self.persist_logged();
        Ok(())
    }

    /// Remove `id`. A deleted selection falls over to the last remaining
    /// conversation, or to a brand-new one when none remain.
    pub fn delete(&mut self, id: ConversationId) -> Result<(), StoreError> {
        let index = self
            .conversations
            .iter()
            .position(|c| c.id == id)
            .ok_or(StoreError::NotFound(id))?;
        self.conversations.remove(index);
        debug!(%id, "Deleted conversation");

        if self.conversations.is_empty() {
            // create() persists the replacement
            self.create();
            return Ok(());
        }
        if self.selected == Some(id) {
            self.selected = self.conversations.last().map(|c| c.id);
        }
        self.persist_logged();
        Ok(())
    }

    /// Serialize the full list into the slot. An empty store is never
    /// written.
    pub fn persist(&self) -> Result<(), StorageError> {
        if self.conversations.is_empty() {
            return Ok(());
        }
        let serialized = match serde_json::to_string(&self.conversations) {
            Ok(serialized) => serialized,
            Err(err) => {
                // Plain strings and integers always serialize
                warn!(error = %err, "Failed to serialize conversations");
                return Ok(());
            }
        };
        self.storage.set(CONVERSATIONS_KEY, &serialized)
    }

    fn persist_logged(&self) {
        if let Err(err) = self.persist() {
            warn!(error = %err, "Failed to persist conversations");
        }
    }

    fn get_mut(&mut self, id: ConversationId) -> Result<&mut Conversation, StoreError> {
        self.conversations
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StoreError::NotFound(id))
    }
}

fn parse_conversations(raw: &str) -> Result<Vec<Conversation>, String> {
    let conversations: Vec<Conversation> =
        serde_json::from_str(raw).map_err(|err| err.to_string())?;
    let mut seen = HashSet::with_capacity(conversations.len());
    for conversation in &conversations {
        if !seen.insert(conversation.id) {
            return Err(format!("duplicate conversation id {}", conversation.id));
        }
    }
    Ok(conversations)
}
