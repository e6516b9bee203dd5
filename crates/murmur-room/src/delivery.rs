//! Per-participant delivery buffers.
//!
//! Each registered participant owns one bounded `mpsc` channel. The registry
//! keeps the sending half and hands the receiving half out as a
//! [`DeliveryStream`]. Only the broadcast engine ever writes, and it only ever
//! uses `try_send`, so a full buffer costs the slow participant a message and
//! costs everyone else nothing.
//!
//! ```text
//!   BroadcastEngine ──try_send──► [ buffer (cap N) ] ──recv──► consumer task
//!                                        ▲
//!            unregister drops the Sender ┘  => recv() yields None
//! ```

use std::sync::Arc;

use murmur_core::{Message, ParticipantId};
use tokio::sync::{Mutex, mpsc};

/// Sending half of a delivery buffer, owned by the registry.
pub(crate) type BufferSender = mpsc::Sender<Arc<Message>>;

/// Allocate a bounded delivery buffer for `participant`.
pub(crate) fn buffer(participant: ParticipantId, capacity: usize) -> (BufferSender, DeliveryStream) {
    debug_assert!(capacity > 0);

    let (tx, rx) = mpsc::channel(capacity);
    let stream = DeliveryStream { participant, receiver: Arc::new(Mutex::new(rx)) };
    (tx, stream)
}

/// Read-only handle to a participant's delivery buffer.
///
/// Clones share the same buffer: each message is yielded to exactly one of
/// them. The stream ends (`None`) once the participant is unregistered or the
/// room shuts down and every already-buffered message has been consumed.
#[derive(Debug, Clone)]
pub struct DeliveryStream {
    participant: ParticipantId,
    receiver: Arc<Mutex<mpsc::Receiver<Arc<Message>>>>,
}

impl DeliveryStream {
    /// Participant this stream delivers to.
    pub fn participant(&self) -> ParticipantId {
        self.participant
    }

    /// Wait for the next message.
    ///
    /// Returns `None` when the buffer has been closed and drained.
    pub async fn recv(&self) -> Option<Arc<Message>> {
        self.receiver.lock().await.recv().await
    }

    /// Take the next message if one is ready, without waiting.
    ///
    /// Returns `None` if the buffer is empty, closed, or another clone is
    /// currently waiting on it.
    pub fn try_recv(&self) -> Option<Arc<Message>> {
        let mut receiver = self.receiver.try_lock().ok()?;
        receiver.try_recv().ok()
    }

    /// Blocking variant of [`recv`](Self::recv) for consumers running on
    /// plain OS threads.
    ///
    /// # Panics
    ///
    /// Panics if called from within an async execution context.
    pub fn blocking_recv(&self) -> Option<Arc<Message>> {
        self.receiver.blocking_lock().blocking_recv()
    }
}
