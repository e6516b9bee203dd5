//! Broadcast engine.
//!
//! The engine is the room's single serialization point. Every membership
//! change and every publish arrives as a [`RoomEvent`] on one FIFO channel and
//! is applied to completion before the next event is looked at, so events are
//! processed strictly in arrival order with no priority between kinds.
//!
//! # Publish pipeline
//!
//! ```text
//!  Publish ─► resolve author ─► sequence ─► storage.save ─► fan out
//!                 │                             │              │
//!           AuthorNotFound               PersistenceFailed   try_send per
//!           (not stored)                 (not distributed)   buffer, drop
//!                                                            on full
//! ```
//!
//! # Overflow policy
//!
//! Distribution never waits. A participant whose buffer is full misses the
//! new message (drop-newest); nobody else is affected and the publisher is not
//! told. This favors liveness of the loop over delivery to slow consumers.

use std::{ops::ControlFlow, sync::Arc};

use chrono::{DateTime, Utc};
use murmur_core::{Message, Participant, ParticipantId};
use tokio::sync::{mpsc, oneshot};

use crate::{
    error::RoomError,
    registry::{Registration, RegistryHandle},
    sequencer::Sequencer,
    stats::RoomMetrics,
    storage::{MessageStore, StorageError},
};

/// Events the broadcast engine processes.
///
/// Produced by the [`Room`](crate::Room) facade.
#[derive(Debug)]
pub(crate) enum RoomEvent {
    /// Add a participant (or rename an existing one)
    Register(Participant),

    /// Remove a participant and close its delivery buffer
    Unregister(ParticipantId),

    /// Store and distribute a message
    Publish {
        /// Author of the message
        author: ParticipantId,
        /// Message text
        body: String,
        /// When the caller published
        published_at: DateTime<Utc>,
        /// Receives the stored message or the reason it was refused
        reply: oneshot::Sender<Result<Message, RoomError>>,
    },

    /// Acknowledge once every earlier event has been applied
    Settle {
        /// Completed when this event is reached
        reply: oneshot::Sender<()>,
    },

    /// Close every delivery buffer and stop the loop
    Shutdown,
}

/// Single-owner control loop over the registry and storage.
pub(crate) struct BroadcastEngine<S: MessageStore> {
    registry: RegistryHandle,
    storage: S,
    sequencer: Sequencer,
    metrics: Arc<RoomMetrics>,
}

impl<S: MessageStore> BroadcastEngine<S> {
    pub(crate) fn new(registry: RegistryHandle, storage: S, metrics: Arc<RoomMetrics>) -> Self {
        Self { registry, storage, sequencer: Sequencer::new(), metrics }
    }

    /// Run until shut down or until every event sender is gone.
    ///
    /// All delivery buffers are closed on the way out so consumers terminate.
    pub(crate) async fn run(mut self, mut events: mpsc::UnboundedReceiver<RoomEvent>) {
        tracing::debug!("broadcast engine started");

        while let Some(event) = events.recv().await {
            if self.process(event).is_break() {
                break;
            }
        }

        let closed = self.registry.write().clear();
        tracing::info!(closed, "broadcast engine stopped");
    }

    /// Apply one event. Returns `Break` on shutdown.
    ///
    /// Never fails: a refused publish is reported through its reply channel
    /// and the engine moves on.
    pub(crate) fn process(&mut self, event: RoomEvent) -> ControlFlow<()> {
        match event {
            RoomEvent::Register(participant) => self.register(participant),
            RoomEvent::Unregister(id) => self.unregister(id),
            RoomEvent::Publish { author, body, published_at, reply } => {
                let result = self.publish(author, body, published_at);
                // Publisher may have given up waiting; the outcome stands either way
                let _ = reply.send(result);
            },
            RoomEvent::Settle { reply } => {
                let _ = reply.send(());
            },
            RoomEvent::Shutdown => return ControlFlow::Break(()),
        }

        ControlFlow::Continue(())
    }

    fn register(&mut self, participant: Participant) {
        let id = participant.id;
        let name = participant.display_name.clone();

        match self.registry.write().register(participant) {
            Registration::Added => {
                tracing::info!(participant = %id, name = %name, "participant registered");
            },
            Registration::Renamed { previous } => {
                tracing::info!(participant = %id, %previous, name = %name, "participant renamed");
            },
            Registration::Unchanged => {
                tracing::debug!(participant = %id, "participant already registered");
            },
        }
    }

    fn unregister(&mut self, id: ParticipantId) {
        match self.registry.write().unregister(id) {
            Some(participant) => {
                tracing::info!(
                    participant = %id,
                    name = %participant.display_name,
                    "participant unregistered"
                );
            },
            None => tracing::debug!(participant = %id, "unregister for unknown participant"),
        }
    }

    fn publish(
        &mut self,
        author: ParticipantId,
        body: String,
        published_at: DateTime<Utc>,
    ) -> Result<Message, RoomError> {
        let author_name = match self.registry.read().participant(author) {
            Some(participant) => participant.display_name.clone(),
            None => {
                self.metrics.record_rejected();
                tracing::warn!(participant = %author, "publish from unknown author rejected");
                return Err(RoomError::AuthorNotFound(author));
            },
        };

        let sequence = self
            .sequencer
            .next_sequence(&self.storage)
            .map_err(|e| self.persist_failed(author, e))?;

        let message = Message { sequence, author_id: author, author_name, body, created_at: published_at };

        self.storage.save(&message).map_err(|e| self.persist_failed(author, e))?;
        self.sequencer.commit(sequence);
        self.metrics.record_published();

        tracing::debug!(participant = %author, sequence, "message stored");

        let message = Arc::new(message);
        self.distribute(&message);

        Ok(Message::clone(&message))
    }

    fn persist_failed(&mut self, author: ParticipantId, err: StorageError) -> RoomError {
        self.metrics.record_persistence_failure();
        tracing::error!(participant = %author, error = %err, "failed to persist message");

        // Cached sequence drifted from storage. Reload it on the next publish
        if let StorageError::Conflict { expected, got } = err {
            tracing::warn!(expected, got, "clearing sequencer state after sequence conflict");
            self.sequencer.reset();
        }

        RoomError::PersistenceFailed(err)
    }

    fn distribute(&self, message: &Arc<Message>) {
        let report = self.registry.read().deliver(message);

        for id in &report.dropped {
            tracing::warn!(
                participant = %id,
                sequence = message.sequence,
                "delivery buffer full, dropping message"
            );
        }
        self.metrics.record_dropped(report.dropped.len());

        tracing::debug!(
            sequence = message.sequence,
            delivered = report.delivered,
            dropped = report.dropped.len(),
            "message distributed"
        );
    }
}
