//! Room facade.
//!
//! Translates caller intent into room events for the broadcast engine and
//! serves read-only lookups directly. Enqueueing never blocks; only
//! [`Room::publish`] and [`Room::settle`] wait, each on its own reply channel.

use std::sync::Arc;

use murmur_core::{
    Message, Participant, ParticipantId,
    env::{Clock, SystemClock},
};
use tokio::sync::{mpsc, oneshot};

use crate::{
    config::{ConfigError, RoomConfig},
    delivery::DeliveryStream,
    engine::{BroadcastEngine, RoomEvent},
    error::RoomError,
    registry::RegistryHandle,
    stats::{RoomMetrics, RoomStats},
    storage::MessageStore,
};

/// Handle to a running broadcast room.
///
/// Cheap to clone; clones talk to the same engine. The engine stops on
/// [`Room::shutdown`] or once every clone has been dropped.
#[derive(Clone)]
pub struct Room<S: MessageStore, C: Clock = SystemClock> {
    events: mpsc::UnboundedSender<RoomEvent>,
    registry: RegistryHandle,
    storage: S,
    clock: C,
    metrics: Arc<RoomMetrics>,
}

impl<S: MessageStore> Room<S, SystemClock> {
    /// Start a room stamping messages with the system clock.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(storage: S, config: RoomConfig) -> Result<Self, ConfigError> {
        Self::spawn(storage, SystemClock::new(), config)
    }
}

impl<S: MessageStore, C: Clock> Room<S, C> {
    /// Validate `config` and spawn the broadcast engine on the current tokio
    /// runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(storage: S, clock: C, config: RoomConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let registry = RegistryHandle::new(config.buffer_capacity);
        let metrics = Arc::new(RoomMetrics::default());
        let (events, rx) = mpsc::unbounded_channel();

        let engine = BroadcastEngine::new(registry.clone(), storage.clone(), Arc::clone(&metrics));
        tokio::spawn(engine.run(rx));

        tracing::debug!(buffer_capacity = config.buffer_capacity, "room started");

        Ok(Self { events, registry, storage, clock, metrics })
    }

    /// Enqueue a registration. Returns as soon as it is queued.
    ///
    /// Use [`settle`](Self::settle) or [`exists`](Self::exists) to observe when
    /// it has been applied.
    pub fn register_participant(&self, participant: Participant) -> Result<(), RoomError> {
        self.send(RoomEvent::Register(participant))
    }

    /// Enqueue an unregistration. Unknown IDs are ignored by the engine.
    pub fn unregister_participant(&self, id: ParticipantId) -> Result<(), RoomError> {
        self.send(RoomEvent::Unregister(id))
    }

    /// Publish a message and wait for the engine's verdict.
    ///
    /// Success means the message was stored; whether each recipient's buffer
    /// had room for it is not part of the result.
    pub async fn publish(
        &self,
        author: ParticipantId,
        body: impl Into<String>,
    ) -> Result<Message, RoomError> {
        let (reply, verdict) = oneshot::channel();
        self.send(RoomEvent::Publish {
            author,
            body: body.into(),
            published_at: self.clock.now(),
            reply,
        })?;

        verdict.await.map_err(|_| RoomError::EngineStopped)?
    }

    /// Handle to a participant's delivery buffer.
    pub fn subscribe(&self, id: ParticipantId) -> Result<DeliveryStream, RoomError> {
        self.registry.stream_for(id).ok_or(RoomError::NotRegistered(id))
    }

    /// Check if a participant is currently registered.
    pub fn exists(&self, id: ParticipantId) -> bool {
        self.registry.exists(id)
    }

    /// Participant details. `None` if not registered.
    pub fn participant(&self, id: ParticipantId) -> Option<Participant> {
        self.registry.participant(id)
    }

    /// All registered participants, ordered by ID.
    pub fn participants(&self) -> Vec<Participant> {
        self.registry.participants()
    }

    /// All stored messages in sequence order.
    pub fn history(&self) -> Result<Vec<Message>, RoomError> {
        self.storage.all_messages().map_err(RoomError::HistoryUnavailable)
    }

    /// Stored messages by one author.
    pub fn history_by_author(&self, author: ParticipantId) -> Result<Vec<Message>, RoomError> {
        self.storage.messages_by_author(author).map_err(RoomError::HistoryUnavailable)
    }

    /// Stored messages whose body contains `keyword`, ignoring case.
    pub fn history_by_keyword(&self, keyword: &str) -> Result<Vec<Message>, RoomError> {
        self.storage.messages_by_keyword(keyword).map_err(RoomError::HistoryUnavailable)
    }

    /// Wait until every event enqueued before this call has been applied.
    pub async fn settle(&self) -> Result<(), RoomError> {
        let (reply, settled) = oneshot::channel();
        self.send(RoomEvent::Settle { reply })?;
        settled.await.map_err(|_| RoomError::EngineStopped)
    }

    /// Stop the engine after it has applied everything queued so far.
    ///
    /// Every delivery buffer is closed, so all consumers terminate. Later
    /// calls on any clone fail with [`RoomError::EngineStopped`].
    pub fn shutdown(&self) -> Result<(), RoomError> {
        self.send(RoomEvent::Shutdown)
    }

    /// Current counters.
    pub fn stats(&self) -> RoomStats {
        self.metrics.snapshot(self.registry.len())
    }

    /// Messages dropped for a participant because its buffer was full.
    pub fn dropped_for(&self, id: ParticipantId) -> Option<u64> {
        self.registry.dropped_for(id)
    }

    fn send(&self, event: RoomEvent) -> Result<(), RoomError> {
        self.events.send(event).map_err(|_| RoomError::EngineStopped)
    }
}
