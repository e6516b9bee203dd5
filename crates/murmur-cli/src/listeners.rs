//! Per-participant listener tasks.

use std::io::Write;

use murmur_core::{Participant, env::Clock};
use murmur_room::{MessageStore, Room, RoomError};
use tokio::task::JoinHandle;

use crate::output::SharedOutput;

/// Spawn one task per participant that prints everything delivered to it.
///
/// Each task ends when the participant's buffer is closed, i.e. on
/// unregistration or room shutdown. Fails if any participant is not
/// registered; callers should [`Room::settle`] after registering.
pub fn spawn_listeners<S, C, W>(
    room: &Room<S, C>,
    participants: &[Participant],
    output: &SharedOutput<W>,
) -> Result<Vec<JoinHandle<()>>, RoomError>
where
    S: MessageStore,
    C: Clock,
    W: Write + Send + 'static,
{
    let mut handles = Vec::with_capacity(participants.len());

    for participant in participants {
        let stream = room.subscribe(participant.id)?;
        let name = participant.display_name.clone();
        let output = output.clone();

        handles.push(tokio::spawn(async move {
            while let Some(message) = stream.recv().await {
                let line = format!("[{name} received] {message}");
                if let Err(e) = output.line(&line) {
                    tracing::warn!(participant = %stream.participant(), "listener output failed: {e}");
                    break;
                }
            }
            tracing::debug!(participant = %stream.participant(), "listener finished");
        }));
    }

    Ok(handles)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use murmur_core::{ParticipantId, env::FixedClock};
    use murmur_room::{MemoryStorage, RoomConfig};

    use super::*;

    #[tokio::test]
    async fn listeners_print_until_shutdown() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        let room = Room::spawn(MemoryStorage::new(), FixedClock(at), RoomConfig::default()).unwrap();
        let participants = vec![Participant::new(1, "Alice"), Participant::new(2, "Bob")];
        for participant in &participants {
            room.register_participant(participant.clone()).unwrap();
        }
        room.settle().await.unwrap();

        let output = SharedOutput::new(Vec::new());
        let handles = spawn_listeners(&room, &participants, &output).unwrap();

        room.publish(ParticipantId(1), "hi").await.unwrap();
        room.shutdown().unwrap();
        for handle in handles {
            handle.await.unwrap();
        }

        let text = output.with(|buf| String::from_utf8_lossy(buf).into_owned());
        let mut lines: Vec<&str> = text.lines().collect();
        lines.sort_unstable();
        assert_eq!(
            lines,
            vec![
                "[Alice received] [2024-03-09T14:05:00Z] Alice: hi",
                "[Bob received] [2024-03-09T14:05:00Z] Alice: hi",
            ]
        );
    }

    #[tokio::test]
    async fn unregistered_participant_is_rejected() {
        let room = Room::start(MemoryStorage::new(), RoomConfig::default()).unwrap();
        let output = SharedOutput::new(Vec::new());

        let result = spawn_listeners(&room, &[Participant::new(7, "Ghost")], &output);

        assert!(matches!(result, Err(RoomError::NotRegistered(ParticipantId(7)))));
    }
}
