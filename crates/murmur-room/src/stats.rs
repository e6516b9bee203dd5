//! Room counters.
//!
//! Buffer overflow is deliberately not an error, so these counters are the
//! only place a dropped delivery shows up besides the `warn` log.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by the broadcast engine (writer) and the room facade
/// (reader).
#[derive(Debug, Default)]
pub(crate) struct RoomMetrics {
    published: AtomicU64,
    rejected: AtomicU64,
    persistence_failures: AtomicU64,
    dropped_deliveries: AtomicU64,
}

impl RoomMetrics {
    pub(crate) fn record_published(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_persistence_failure(&self) {
        self.persistence_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self, count: usize) {
        self.dropped_deliveries.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, participants: usize) -> RoomStats {
        RoomStats {
            participants,
            published: self.published.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            persistence_failures: self.persistence_failures.load(Ordering::Relaxed),
            dropped_deliveries: self.dropped_deliveries.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time room statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoomStats {
    /// Currently registered participants
    pub participants: usize,
    /// Messages stored and distributed
    pub published: u64,
    /// Publishes refused because the author was not registered
    pub rejected: u64,
    /// Publishes refused because storage failed
    pub persistence_failures: u64,
    /// Per-recipient deliveries dropped on a full buffer
    pub dropped_deliveries: u64,
}
