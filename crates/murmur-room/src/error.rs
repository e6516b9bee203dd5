//! Room error types.

use murmur_core::ParticipantId;
use thiserror::Error;

use crate::storage::StorageError;

/// Errors surfaced by [`Room`](crate::Room) operations.
///
/// None of these are fatal to the broadcast engine: the event that caused
/// one is dropped and the loop carries on with the next.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoomError {
    /// Publish referenced a participant that is not registered.
    ///
    /// Nothing was stored or delivered. Register first, then retry.
    #[error("author {0} is not a participant")]
    AuthorNotFound(ParticipantId),

    /// Subscribe referenced a participant that is not registered.
    #[error("participant {0} is not registered")]
    NotRegistered(ParticipantId),

    /// Storage rejected the message.
    ///
    /// The message was not distributed and its sequence number was not
    /// consumed. Retryable.
    #[error("failed to persist message: {0}")]
    PersistenceFailed(#[source] StorageError),

    /// A history query could not be served by storage.
    #[error("history unavailable: {0}")]
    HistoryUnavailable(#[source] StorageError),

    /// The broadcast engine has shut down; the room accepts no more events.
    #[error("broadcast engine stopped")]
    EngineStopped,
}
