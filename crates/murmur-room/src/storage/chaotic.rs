//! Chaotic storage wrapper for fault injection testing
//!
//! Storage wrapper that randomly fails operations to test how the room
//! handles persistence failures. A publish whose save fails must be reported
//! to its author and never distributed; this wrapper makes that path easy to
//! drive from tests.

use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicUsize, Ordering},
};

use murmur_core::{Message, ParticipantId};

use super::{MessageStore, StorageError};

/// Chaotic storage wrapper that randomly injects failures
///
/// Delegates to an underlying store but fails operations with the configured
/// probability. The RNG sits behind `Arc<Mutex<>>` so clones share one failure
/// sequence, keeping a seeded run reproducible no matter which clone is used.
#[derive(Clone)]
pub struct ChaoticStorage<S: MessageStore> {
    inner: S,
    /// Failure rate (0.0 = never fail, 1.0 = always fail)
    failure_rate: f64,
    /// RNG state for deterministic chaos
    rng: Arc<Mutex<ChaoticRng>>,
    /// Operations attempted, failed or not
    operation_count: Arc<AtomicUsize>,
    /// Operations failed by injection
    failure_count: Arc<AtomicUsize>,
}

/// Linear congruential generator, deterministic for a given seed.
struct ChaoticRng {
    state: u64,
}

impl ChaoticRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Next value in [0.0, 1.0)
    fn next(&mut self) -> f64 {
        // Numerical Recipes constants
        const A: u64 = 1_664_525;
        const C: u64 = 1_013_904_223;
        const M: u64 = 1u64 << 32;

        self.state = (A.wrapping_mul(self.state).wrapping_add(C)) % M;
        (self.state as f64) / (M as f64)
    }

    fn should_fail(&mut self, failure_rate: f64) -> bool {
        self.next() < failure_rate
    }
}

impl<S: MessageStore> ChaoticStorage<S> {
    /// Create a new chaotic storage wrapper
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    pub fn new(inner: S, failure_rate: f64) -> Self {
        Self::with_seed(inner, failure_rate, 0x1234_5678_9ABC_DEF0)
    }

    /// Create with explicit seed for reproducible chaos
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    pub fn with_seed(inner: S, failure_rate: f64, seed: u64) -> Self {
        assert!(
            (0.0..=1.0).contains(&failure_rate),
            "failure_rate must be between 0.0 and 1.0, got {failure_rate}"
        );

        Self {
            inner,
            failure_rate,
            rng: Arc::new(Mutex::new(ChaoticRng::new(seed))),
            operation_count: Arc::new(AtomicUsize::new(0)),
            failure_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Underlying storage (for checking invariants after chaos).
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Total number of storage operations attempted.
    pub fn operation_count(&self) -> usize {
        self.operation_count.load(Ordering::Relaxed)
    }

    /// Number of operations that failed by injection.
    pub fn failure_count(&self) -> usize {
        self.failure_count.load(Ordering::Relaxed)
    }

    /// Count the operation and decide whether it fails.
    fn inject(&self) -> Result<(), StorageError> {
        self.operation_count.fetch_add(1, Ordering::Relaxed);

        let fail =
            self.rng.lock().unwrap_or_else(PoisonError::into_inner).should_fail(self.failure_rate);
        if fail {
            self.failure_count.fetch_add(1, Ordering::Relaxed);
            return Err(StorageError::Io("chaotic failure injection".to_string()));
        }
        Ok(())
    }
}

impl<S: MessageStore> MessageStore for ChaoticStorage<S> {
    fn save(&self, message: &Message) -> Result<(), StorageError> {
        self.inject()?;
        self.inner.save(message)
    }

    fn latest_sequence(&self) -> Result<Option<u64>, StorageError> {
        self.inject()?;
        self.inner.latest_sequence()
    }

    fn all_messages(&self) -> Result<Vec<Message>, StorageError> {
        self.inject()?;
        self.inner.all_messages()
    }

    fn messages_by_author(&self, author: ParticipantId) -> Result<Vec<Message>, StorageError> {
        self.inject()?;
        self.inner.messages_by_author(author)
    }

    fn messages_by_keyword(&self, keyword: &str) -> Result<Vec<Message>, StorageError> {
        self.inject()?;
        self.inner.messages_by_keyword(keyword)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::storage::MemoryStorage;

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
    fn test_chaotic_with_zero_failure_rate() {
        let chaotic = ChaoticStorage::new(MemoryStorage::new(), 0.0);

        for i in 1..=100 {
            chaotic.save(&message(i)).expect("should not fail with 0% rate");
        }

        assert_eq!(chaotic.latest_sequence().expect("query failed"), Some(100));
        assert_eq!(chaotic.failure_count(), 0);
    }

    #[test]
    fn test_chaotic_with_100_failure_rate() {
        let chaotic = ChaoticStorage::new(MemoryStorage::new(), 1.0);

        assert!(chaotic.save(&message(1)).is_err());
        assert!(chaotic.latest_sequence().is_err());
        assert!(chaotic.all_messages().is_err());
        assert!(chaotic.messages_by_keyword("message").is_err());

        assert_eq!(chaotic.operation_count(), 4);
        assert_eq!(chaotic.failure_count(), 4);
        assert!(chaotic.inner().is_empty());
    }

    #[test]
    fn test_chaotic_deterministic_with_seed() {
        let chaotic1 = ChaoticStorage::with_seed(MemoryStorage::new(), 0.5, 42);
        let chaotic2 = ChaoticStorage::with_seed(MemoryStorage::new(), 0.5, 42);

        let mut next1 = 1;
        let mut next2 = 1;
        for i in 0..100 {
            let result1 = chaotic1.save(&message(next1));
            let result2 = chaotic2.save(&message(next2));

            assert_eq!(result1.is_ok(), result2.is_ok(), "determinism violated at iteration {i}");
            if result1.is_ok() {
                next1 += 1;
            }
            if result2.is_ok() {
                next2 += 1;
            }
        }
    }

    #[test]
    fn test_chaotic_accesses_underlying_storage() {
        let chaotic = ChaoticStorage::new(MemoryStorage::new(), 0.0);

        chaotic.save(&message(1)).expect("save failed");

        assert_eq!(chaotic.inner().latest_sequence().expect("query failed"), Some(1));
    }

    #[test]
    #[should_panic(expected = "failure_rate must be between 0.0 and 1.0")]
    fn test_chaotic_rejects_invalid_failure_rate() {
        let _chaotic = ChaoticStorage::new(MemoryStorage::new(), 1.5);
    }
}
