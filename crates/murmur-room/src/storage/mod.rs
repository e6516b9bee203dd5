//! Storage abstraction for room history.
//!
//! Trait-based abstraction for persisting and querying messages. The trait is
//! synchronous (no async) so the broadcast engine can call it inline without
//! yielding in the middle of an event.

mod chaotic;
mod error;
mod memory;

pub use chaotic::ChaoticStorage;
pub use error::StorageError;
pub use memory::MemoryStorage;
use murmur_core::{Message, ParticipantId};

/// Storage abstraction for message history.
///
/// Must be Clone (the engine and the room facade both hold one), Send + Sync
/// (thread-safe), and synchronous. Implementations typically share internal
/// state via Arc, so clones access the same underlying history.
///
/// Sequence numbers are assigned by the engine's
/// [`Sequencer`](crate::Sequencer); the store only checks that appends stay
/// contiguous.
pub trait MessageStore: Clone + Send + Sync + 'static {
    /// Durably append a message.
    ///
    /// # Invariants
    ///
    /// - Pre: `message.sequence` equals the latest stored sequence plus one
    ///   (1 for an empty store)
    /// - Post: message is returned by every query it matches, exactly once
    fn save(&self, message: &Message) -> Result<(), StorageError>;

    /// Sequence number of the newest stored message. `None` if empty.
    fn latest_sequence(&self) -> Result<Option<u64>, StorageError>;

    /// All messages in insertion order.
    fn all_messages(&self) -> Result<Vec<Message>, StorageError>;

    /// Messages published by `author`, in insertion order.
    fn messages_by_author(&self, author: ParticipantId) -> Result<Vec<Message>, StorageError>;

    /// Messages whose body contains `keyword`, ignoring case.
    fn messages_by_keyword(&self, keyword: &str) -> Result<Vec<Message>, StorageError>;
}
