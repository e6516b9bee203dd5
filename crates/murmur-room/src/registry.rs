//! Participant registry: who is in the room and where their messages go.
//!
//! The registry pairs every participant with a bounded delivery buffer.
//! [`ParticipantRegistry`] is the plain table; [`RegistryHandle`] shares it
//! behind a reader/writer lock. The write side is crate-private and only the
//! broadcast engine takes it, so every mutation happens on the engine's single
//! control loop while lookups stay callable from any thread.

use std::{
    collections::HashMap,
    sync::{
        Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
        atomic::{AtomicU64, Ordering},
    },
};

use murmur_core::{Message, Participant, ParticipantId};
use tokio::sync::mpsc::error::TrySendError;

use crate::delivery::{self, BufferSender, DeliveryStream};

/// Outcome of [`ParticipantRegistry::register`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// New participant with a fresh delivery buffer
    Added,
    /// Known ID under a new display name; the buffer was kept
    Renamed {
        /// Display name before this registration
        previous: String,
    },
    /// Known ID, same display name; nothing changed
    Unchanged,
}

/// Outcome of fanning one message out to every buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Buffers that accepted the message
    pub delivered: usize,
    /// Participants whose buffer was full
    pub dropped: Vec<ParticipantId>,
}

struct ParticipantEntry {
    participant: Participant,
    buffer: BufferSender,
    stream: DeliveryStream,
    /// Messages dropped because the buffer was full
    dropped: AtomicU64,
}

/// Table of current participants and their delivery buffers.
///
/// Invariant: every participant has exactly one buffer, and a buffer exists
/// only while its participant is registered.
pub struct ParticipantRegistry {
    entries: HashMap<ParticipantId, ParticipantEntry>,
    buffer_capacity: usize,
}

impl ParticipantRegistry {
    /// Create an empty registry whose buffers hold `buffer_capacity` messages.
    pub fn new(buffer_capacity: usize) -> Self {
        Self { entries: HashMap::new(), buffer_capacity }
    }

    /// Add a participant, or rename one that is already registered.
    ///
    /// Re-registering an existing ID replaces its display name and keeps its
    /// buffer, so a consumer already reading the buffer is unaffected.
    pub fn register(&mut self, participant: Participant) -> Registration {
        if let Some(entry) = self.entries.get_mut(&participant.id) {
            if entry.participant.display_name == participant.display_name {
                return Registration::Unchanged;
            }
            let previous = std::mem::replace(&mut entry.participant, participant);
            return Registration::Renamed { previous: previous.display_name };
        }

        let (buffer, stream) = delivery::buffer(participant.id, self.buffer_capacity);
        self.entries.insert(
            participant.id,
            ParticipantEntry { participant, buffer, stream, dropped: AtomicU64::new(0) },
        );
        Registration::Added
    }

    /// Remove a participant and close its buffer.
    ///
    /// Dropping the buffer's only sender wakes any consumer blocked on it with
    /// end-of-stream. Returns `None` for unknown IDs.
    pub fn unregister(&mut self, id: ParticipantId) -> Option<Participant> {
        self.entries.remove(&id).map(|entry| entry.participant)
    }

    /// Remove every participant, closing all buffers.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    /// Check if a participant is registered.
    pub fn exists(&self, id: ParticipantId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Participant details. `None` if not registered.
    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.entries.get(&id).map(|entry| &entry.participant)
    }

    /// Handle to a participant's delivery buffer. `None` if not registered.
    pub fn stream_for(&self, id: ParticipantId) -> Option<DeliveryStream> {
        self.entries.get(&id).map(|entry| entry.stream.clone())
    }

    /// Messages dropped for a participant because its buffer was full.
    pub fn dropped_for(&self, id: ParticipantId) -> Option<u64> {
        self.entries.get(&id).map(|entry| entry.dropped.load(Ordering::Relaxed))
    }

    /// All registered participants, ordered by ID.
    pub fn participants(&self) -> Vec<Participant> {
        let mut participants: Vec<_> =
            self.entries.values().map(|entry| entry.participant.clone()).collect();
        participants.sort_by_key(|p| p.id);
        participants
    }

    /// Number of registered participants.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the room is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Offer `message` to every buffer without blocking.
    ///
    /// A full buffer drops the message for that participant only
    /// (drop-newest) and bumps its drop counter.
    pub fn deliver(&self, message: &Arc<Message>) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        for (id, entry) in &self.entries {
            match entry.buffer.try_send(Arc::clone(message)) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    entry.dropped.fetch_add(1, Ordering::Relaxed);
                    report.dropped.push(*id);
                },
                // The entry holds a receiver clone, so this only happens if
                // the buffer was torn down underneath us.
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(participant = %id, "delivery buffer closed, skipping");
                },
            }
        }

        report
    }
}

/// Shared, lock-protected view of the registry.
///
/// Cloning is cheap; all clones see the same table. Public methods are
/// point-in-time reads that hold the read lock only for the lookup.
#[derive(Clone)]
pub struct RegistryHandle {
    inner: Arc<RwLock<ParticipantRegistry>>,
}

impl RegistryHandle {
    pub(crate) fn new(buffer_capacity: usize) -> Self {
        Self { inner: Arc::new(RwLock::new(ParticipantRegistry::new(buffer_capacity))) }
    }

    /// Check if a participant is registered.
    pub fn exists(&self, id: ParticipantId) -> bool {
        self.read().exists(id)
    }

    /// Participant details. `None` if not registered.
    pub fn participant(&self, id: ParticipantId) -> Option<Participant> {
        self.read().participant(id).cloned()
    }

    /// Handle to a participant's delivery buffer. `None` if not registered.
    pub fn stream_for(&self, id: ParticipantId) -> Option<DeliveryStream> {
        self.read().stream_for(id)
    }

    /// Messages dropped for a participant because its buffer was full.
    pub fn dropped_for(&self, id: ParticipantId) -> Option<u64> {
        self.read().dropped_for(id)
    }

    /// All registered participants, ordered by ID.
    pub fn participants(&self) -> Vec<Participant> {
        self.read().participants()
    }

    /// Number of registered participants.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the room is empty.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, ParticipantRegistry> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write access. Only the broadcast engine calls this.
    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, ParticipantRegistry> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
