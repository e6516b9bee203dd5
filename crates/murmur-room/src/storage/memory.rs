use std::sync::{Arc, PoisonError, RwLock};

use murmur_core::{Message, ParticipantId};

use super::{MessageStore, StorageError};

/// In-memory message history.
///
/// Messages live in a Vec in sequence order behind an `Arc<RwLock<>>`, so
/// clones share one history and queries run concurrently with each other.
/// Appends are O(1); queries are O(n) scans that return owned copies, so
/// callers never observe a history that is mutated underneath them.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<RwLock<Vec<Message>>>,
}

impl MemoryStorage {
    /// Create a new empty `MemoryStorage`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored messages.
    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether no message has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn filtered(&self, keep: impl Fn(&Message) -> bool) -> Vec<Message> {
        let messages = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        messages.iter().filter(|m| keep(m)).cloned().collect()
    }
}

impl MessageStore for MemoryStorage {
    fn save(&self, message: &Message) -> Result<(), StorageError> {
        let mut messages = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        let expected = messages.len() as u64 + 1;
        if message.sequence != expected {
            return Err(StorageError::Conflict { expected, got: message.sequence });
        }

        messages.push(message.clone());

        debug_assert_eq!(messages.len() as u64, message.sequence);
        Ok(())
    }

    fn latest_sequence(&self) -> Result<Option<u64>, StorageError> {
        let messages = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(messages.last().map(|m| m.sequence))
    }

    fn all_messages(&self) -> Result<Vec<Message>, StorageError> {
        Ok(self.filtered(|_| true))
    }

    fn messages_by_author(&self, author: ParticipantId) -> Result<Vec<Message>, StorageError> {
        Ok(self.filtered(|m| m.author_id == author))
    }

    fn messages_by_keyword(&self, keyword: &str) -> Result<Vec<Message>, StorageError> {
        Ok(self.filtered(|m| m.contains_keyword(keyword)))
    }
}
