//! The storage seam behind the inbox.
//!
//! [`ConversationRepository`] is what the inbox reads conversations from and
//! writes them back through.  [`MemoryRepository`] keeps everything in a
//! `Vec`; [`Database`](crate::Database) persists to SQLite.

use crate::error::{Result, StoreError};
use crate::models::Conversation;

pub trait ConversationRepository {
    /// All conversations, deleted ones included, in insertion order.
    fn list(&self) -> Result<Vec<Conversation>>;

    /// Insert a new conversation.  Fails with [`StoreError::Duplicate`] when
    /// the id is already taken.
    fn create(&mut self, conversation: &Conversation) -> Result<()>;

    /// Replace a stored conversation (metadata and messages) wholesale.
    /// Fails with [`StoreError::NotFound`] for an unknown id.
    fn update(&mut self, conversation: &Conversation) -> Result<()>;

    /// Replace several conversations as one write.  On error none of them
    /// has changed.
    fn update_all(&mut self, conversations: &[Conversation]) -> Result<()>;
}

impl<R: ConversationRepository + ?Sized> ConversationRepository for Box<R> {
    fn list(&self) -> Result<Vec<Conversation>> {
        (**self).list()
    }

    fn create(&mut self, conversation: &Conversation) -> Result<()> {
        (**self).create(conversation)
    }

    fn update(&mut self, conversation: &Conversation) -> Result<()> {
        (**self).update(conversation)
    }

    fn update_all(&mut self, conversations: &[Conversation]) -> Result<()> {
        (**self).update_all(conversations)
    }
}

/// In-memory repository, mostly for tests and fixtures.
#[derive(Debug, Default, Clone)]
pub struct MemoryRepository {
    conversations: Vec<Conversation>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(conversations: Vec<Conversation>) -> Self {
        Self { conversations }
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}

impl ConversationRepository for MemoryRepository {
    fn list(&self) -> Result<Vec<Conversation>> {
        Ok(self.conversations.clone())
    }

    fn create(&mut self, conversation: &Conversation) -> Result<()> {
        if self.conversations.iter().any(|c| c.id == conversation.id) {
            return Err(StoreError::Duplicate(conversation.id));
        }
        self.conversations.push(conversation.clone());
        Ok(())
    }

    fn update(&mut self, conversation: &Conversation) -> Result<()> {
        let slot = self
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation.id)
            .ok_or(StoreError::NotFound(conversation.id))?;
        *slot = conversation.clone();
        Ok(())
    }

    fn update_all(&mut self, conversations: &[Conversation]) -> Result<()> {
        let mut slots = Vec::with_capacity(conversations.len());
        for conv in conversations {
            let index = self
                .conversations
                .iter()
                .position(|c| c.id == conv.id)
                .ok_or(StoreError::NotFound(conv.id))?;
            slots.push(index);
        }
        for (index, conv) in slots.into_iter().zip(conversations) {
            self.conversations[index] = conv.clone();
        }
        Ok(())
    }
}
