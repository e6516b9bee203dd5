//! Storage error types.

use thiserror::Error;

/// Errors returned by [`MessageStore`](super::MessageStore) implementations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Backend I/O failed.
    ///
    /// Transient from the room's point of view: the publish is rejected and
    /// may be retried.
    #[error("storage I/O error: {0}")]
    Io(String),

    /// Append would leave a gap or overwrite history.
    ///
    /// The engine's cached sequence drifted from storage. The engine reloads
    /// its position before the next publish.
    #[error("sequence conflict: expected {expected}, got {got}")]
    Conflict {
        /// Sequence the store expected next
        expected: u64,
        /// Sequence the caller tried to write
        got: u64,
    },
}
