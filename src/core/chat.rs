use crate::core::chat_client::{ChatSession, ChatTransport, SendOutcome, SendRejected};
use crate::core::conversation::ConversationId;
use crate::core::message::Message;
use crate::core::storage::KeyValueStorage;
use crate::core::store::{ConversationStore, StoreError};
use std::sync::Arc;
use tracing::warn;

/// Ties the conversation store to a backend session. A session belongs to one
/// conversation context, so switching conversations starts a new one.
pub struct ChatController<S> {
    store: ConversationStore<S>,
    transport: Arc<dyn ChatTransport>,
    session: ChatSession,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub conversation: ConversationId,
    pub reply: Message,
    pub fallback: bool,
}

impl<S: KeyValueStorage> ChatController<S> {
    pub fn new(store: ConversationStore<S>, transport: Arc<dyn ChatTransport>) -> Self {
        let session = ChatSession::new(Arc::clone(&transport));
        Self {
            store,
            transport,
            session,
        }
    }

    pub fn store(&self) -> &ConversationStore<S> {
        &self.store
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn new_conversation(&mut self) -> ConversationId {
        let id = self.store.create();
        self.restart_session();
        id
    }

    pub fn select(&mut self, id: ConversationId) -> Result<(), StoreError> {
        let previous = self.store.selected_id();
        self.store.select(id)?;
        if previous != Some(id) {
            self.restart_session();
        }
        Ok(())
    }

    pub fn delete(&mut self, id: ConversationId) -> Result<(), StoreError> {
        let previous = self.store.selected_id();
        self.store.delete(id)?;
        if self.store.selected_id() != previous {
            self.restart_session();
        }
        Ok(())
    }

    /// Send `input` in the selected conversation. Blank input is ignored and
    /// yields `Ok(None)`. Both the user message and the reply (or apology) are
    /// appended and persisted.
    pub async fn submit(&mut self, input: &str) -> Result<Option<Exchange>, SendRejected> {
        if input.trim().is_empty() {
            return Ok(None);
        }
        if self.session.is_sending() {
            return Err(SendRejected::Busy);
        }
        let Some(id) = self.store.selected_id() else {
            return Ok(None);
        };

        self.append(id, Message::user(input));
        let SendOutcome { text, fallback } = self.session.send(input).await?;
        let reply = Message::assistant(text);
        self.append(id, reply.clone());

        Ok(Some(Exchange {
            conversation: id,
            reply,
            fallback,
        }))
    }

    fn append(&mut self, id: ConversationId, message: Message) {
        if let Err(err) = self.store.append_message(id, message) {
            warn!(error = %err, "Dropping message for missing conversation");
        }
    }

    fn restart_session(&mut self) {
        self.session = ChatSession::new(Arc::clone(&self.transport));
    }
}
