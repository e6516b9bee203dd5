//! Chaos property tests for persistence failures.
//!
//! Publishes through a room backed by `ChaoticStorage` and checks that the
//! storage gate holds under random failures:
//! - A failed save is reported to the publisher and never distributed
//! - Sequence numbers stay contiguous (failures do not burn numbers)
//! - Recipients see exactly the stored messages, in order

use murmur_core::{Participant, ParticipantId};
use murmur_room::{
    ChaoticStorage, MemoryStorage, MessageStore, Room, RoomConfig, RoomError, StorageError,
};
use proptest::prelude::*;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build runtime")
}

#[test]
fn prop_failed_saves_are_never_distributed() {
    proptest!(|(
        failure_rate in 0.0..0.8,
        seed in any::<u64>(),
        publish_count in 1usize..60,
    )| {
        runtime().block_on(async {
            let storage = ChaoticStorage::with_seed(MemoryStorage::new(), failure_rate, seed);
            let room = Room::start(storage.clone(), RoomConfig::default())?;
            room.register_participant(Participant::new(1, "Alice"))?;
            room.register_participant(Participant::new(2, "Bob"))?;
            room.settle().await?;
            let bob = room.subscribe(ParticipantId(2))?;

            let mut stored = Vec::new();
            let mut failed = 0u64;
            for i in 0..publish_count {
                match room.publish(ParticipantId(1), format!("message {i}")).await {
                    Ok(message) => stored.push(message),
                    Err(RoomError::PersistenceFailed(StorageError::Io(_))) => failed += 1,
                    Err(e) => panic!("Unexpected error: {e:?}"),
                }
            }

            // ORACLE: storage holds exactly the acknowledged messages, gap-free
            let history = storage.inner().all_messages()?;
            prop_assert_eq!(&history, &stored);
            for (index, message) in history.iter().enumerate() {
                prop_assert_eq!(message.sequence, index as u64 + 1);
            }

            // ORACLE: Bob received exactly what was stored, nothing else
            let mut received = Vec::new();
            while let Some(message) = bob.try_recv() {
                received.push(message.sequence);
            }
            let expected: Vec<u64> = stored.iter().map(|m| m.sequence).collect();
            prop_assert_eq!(received, expected);

            let stats = room.stats();
            prop_assert_eq!(stats.published, stored.len() as u64);
            prop_assert_eq!(stats.persistence_failures, failed);

            Ok::<(), TestCaseError>(())
        })?;
    });
}

#[tokio::test]
async fn publish_can_be_retried_after_failure() {
    let storage = ChaoticStorage::with_seed(MemoryStorage::new(), 0.5, 7);
    let room = Room::start(storage.clone(), RoomConfig::default()).expect("valid config");
    room.register_participant(Participant::new(1, "Alice")).expect("engine running");

    let mut failures = 0;
    let mut sent = Vec::new();
    for body in ["one", "two", "three"] {
        // Retry the same publish on the same room until the store accepts it
        let message = loop {
            match room.publish(ParticipantId(1), body).await {
                Ok(message) => break message,
                Err(RoomError::PersistenceFailed(StorageError::Io(_))) => failures += 1,
                Err(e) => panic!("Unexpected error: {e:?}"),
            }
            assert!(failures < 100, "store never accepted the retry");
        };
        sent.push(message);
    }

    assert!(storage.failure_count() > 0, "seed should inject at least one failure");

    // Failed attempts never consumed a sequence number
    let sequences: Vec<u64> = sent.iter().map(|m| m.sequence).collect();
    assert_eq!(sequences, vec![1, 2, 3]);
    assert_eq!(storage.inner().all_messages().expect("query failed"), sent);
    assert_eq!(room.stats().persistence_failures, failures);
}
