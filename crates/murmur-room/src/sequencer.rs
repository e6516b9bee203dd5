//! Message sequencer with total ordering.
//!
//! Assigns monotonic sequence numbers to published messages. The sequencer is
//! the single owner of numbering: storage only checks contiguity. The next
//! number is cached after the first lookup and advanced only once a save has
//! succeeded, so a rejected publish never burns a number.
//!
//! Flow: load position from storage (first use or after [`Sequencer::reset`]),
//! hand out the next sequence, `commit` it after a successful save.

use crate::storage::{MessageStore, StorageError};

/// Assigns sequence numbers, starting at 1.
#[derive(Debug, Default)]
pub struct Sequencer {
    /// Next sequence to assign, `None` until loaded from storage
    next: Option<u64>,
}

impl Sequencer {
    /// Create a new sequencer (position unknown until first use).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence number for the next message.
    ///
    /// Does not advance the position; call [`commit`](Self::commit) once the
    /// message is stored. Fails only if the position has to be loaded and
    /// storage is unavailable.
    pub fn next_sequence<S: MessageStore>(&mut self, storage: &S) -> Result<u64, StorageError> {
        if let Some(next) = self.next {
            return Ok(next);
        }

        let next = storage.latest_sequence()?.map_or(1, |latest| latest + 1);
        self.next = Some(next);
        Ok(next)
    }

    /// Record that `sequence` was stored.
    pub fn commit(&mut self, sequence: u64) {
        debug_assert_eq!(self.next, Some(sequence), "committed sequence was not the next one");
        self.next = Some(sequence + 1);
    }

    /// Forget the cached position; the next call reloads it from storage.
    ///
    /// Used after a conflict, when the cache has drifted from storage.
    pub fn reset(&mut self) {
        self.next = None;
    }

    /// Cached next sequence, if loaded.
    pub fn peek(&self) -> Option<u64> {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use murmur_core::{Message, ParticipantId};

    use super::*;
    use crate::storage::{ChaoticStorage, MemoryStorage};

    fn message(sequence: u64) -> Message {
        Message {
            sequence,
            author_id: ParticipantId(1),
            author_name: "Alice".to_string(),
            body: format!("message {sequence}"),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn starts_at_one() {
        let storage = MemoryStorage::new();
        let mut sequencer = Sequencer::new();

        assert_eq!(sequencer.peek(), None);
        assert_eq!(sequencer.next_sequence(&storage).unwrap(), 1);
        assert_eq!(sequencer.peek(), Some(1));
    }

    #[test]
    fn advances_only_on_commit() {
        let storage = MemoryStorage::new();
        let mut sequencer = Sequencer::new();

        let seq = sequencer.next_sequence(&storage).unwrap();
        assert_eq!(sequencer.next_sequence(&storage).unwrap(), seq);

        storage.save(&message(seq)).unwrap();
        sequencer.commit(seq);

        assert_eq!(sequencer.next_sequence(&storage).unwrap(), 2);
    }

    #[test]
    fn resumes_from_storage() {
        let storage = MemoryStorage::new();
        for seq in 1..=5 {
            storage.save(&message(seq)).unwrap();
        }

        // A fresh sequencer (e.g. after a restart) picks up where storage is
        let mut sequencer = Sequencer::new();
        assert_eq!(sequencer.next_sequence(&storage).unwrap(), 6);
    }

    #[test]
    fn reset_reloads_position() {
        let storage = MemoryStorage::new();
        let mut sequencer = Sequencer::new();
        assert_eq!(sequencer.next_sequence(&storage).unwrap(), 1);

        // Someone else appended behind the sequencer's back
        storage.save(&message(1)).unwrap();
        assert_eq!(storage.save(&message(1)), Err(StorageError::Conflict { expected: 2, got: 1 }));

        sequencer.reset();
        assert_eq!(sequencer.next_sequence(&storage).unwrap(), 2);
    }

    #[test]
    fn load_failure_is_reported() {
        let storage = ChaoticStorage::new(MemoryStorage::new(), 1.0);
        let mut sequencer = Sequencer::new();

        assert!(sequencer.next_sequence(&storage).is_err());
        assert_eq!(sequencer.peek(), None);
    }
}
