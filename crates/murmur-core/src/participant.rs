//! Room participants.
//!
//! A participant is identified by a numeric ID that is unique within the
//! room. The display name travels with the identity but is copied into every
//! message at publish time, so renaming never rewrites history.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Unique identifier of a participant within a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticipantId(pub u64);

impl ParticipantId {
    /// Raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for ParticipantId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ParticipantId {
    type Err = ParseParticipantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| ParseParticipantError::InvalidId(s.trim().to_string()))
    }
}

/// A member of the room. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Participant {
    /// Identity, unique within the room
    pub id: ParticipantId,
    /// Name shown next to this participant's messages
    pub display_name: String,
}

impl Participant {
    /// Create a participant.
    pub fn new(id: impl Into<ParticipantId>, display_name: impl Into<String>) -> Self {
        Self { id: id.into(), display_name: display_name.into() }
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.id, self.display_name)
    }
}

/// Errors from parsing the `<id>=<name>` participant form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseParticipantError {
    /// Input had no `=` separator
    #[error("expected <id>=<name>, got {0:?}")]
    MissingSeparator(String),

    /// ID part was not an unsigned integer
    #[error("invalid participant id: {0:?}")]
    InvalidId(String),

    /// Name part was empty
    #[error("participant name must not be empty")]
    EmptyName,
}

impl FromStr for Participant {
    type Err = ParseParticipantError;

    /// Parse `"<id>=<name>"`, e.g. `"1=Alice"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, name) =
            s.split_once('=').ok_or_else(|| ParseParticipantError::MissingSeparator(s.to_string()))?;

        let id = id.parse::<ParticipantId>()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ParseParticipantError::EmptyName);
        }

        Ok(Self::new(id, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_participant() {
        let p: Participant = "1=Alice".parse().unwrap();
        assert_eq!(p, Participant::new(1, "Alice"));

        let p: Participant = " 42 = Bob Smith ".parse().unwrap();
        assert_eq!(p.id, ParticipantId(42));
        assert_eq!(p.display_name, "Bob Smith");
    }

    #[test]
    fn parse_participant_rejects_malformed_input() {
        assert_eq!(
            "Alice".parse::<Participant>(),
            Err(ParseParticipantError::MissingSeparator("Alice".to_string()))
        );
        assert_eq!(
            "x=Alice".parse::<Participant>(),
            Err(ParseParticipantError::InvalidId("x".to_string()))
        );
        assert_eq!("7=  ".parse::<Participant>(), Err(ParseParticipantError::EmptyName));
    }

    #[test]
    fn participant_display() {
        assert_eq!(Participant::new(3, "Charlie").to_string(), "3. Charlie");
    }
}
