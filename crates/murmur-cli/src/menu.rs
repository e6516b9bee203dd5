//! Menu choices and input validation.
//!
//! Pure parsing only; the console decides what to print and when to prompt.

use std::str::FromStr;

use murmur_core::{Participant, ParticipantId};
use thiserror::Error;

/// Menu shown before every command.
pub const MENU: &str = "\nChat Application Commands:\n\
1. Send a message\n\
2. View all messages\n\
3. Filter messages by user\n\
4. Search messages by keyword\n\
5. Exit\n";

/// A top-level menu choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Publish a message as one of the participants
    Send,
    /// Print the whole history
    ViewAll,
    /// Print one participant's messages
    FilterByAuthor,
    /// Print messages containing a keyword
    SearchKeyword,
    /// Leave the application
    Exit,
}

impl FromStr for Command {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Self::Send),
            "2" => Ok(Self::ViewAll),
            "3" => Ok(Self::FilterByAuthor),
            "4" => Ok(Self::SearchKeyword),
            "5" => Ok(Self::Exit),
            _ => Err(InputError::InvalidChoice),
        }
    }
}

/// Rejected user input. Displayed verbatim to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// Menu choice outside 1-5
    #[error("Invalid choice. Please try again.")]
    InvalidChoice,

    /// Participant ID was not a number
    #[error("Invalid user ID. Please enter a number.")]
    NotANumber,

    /// Participant ID is not one of the known participants
    #[error("User with that ID doesn't exist.")]
    UnknownParticipant,

    /// Search keyword was empty
    #[error("Keyword cannot be empty.")]
    EmptyKeyword,
}

/// Parse a participant ID and check it against the known participants.
pub fn parse_participant(
    input: &str,
    participants: &[Participant],
) -> Result<ParticipantId, InputError> {
    let id: ParticipantId = input.parse().map_err(|_| InputError::NotANumber)?;

    if participants.iter().any(|p| p.id == id) {
        Ok(id)
    } else {
        Err(InputError::UnknownParticipant)
    }
}

/// Validate a search keyword. Only empty input is rejected; the keyword is
/// used exactly as typed, whitespace included.
pub fn parse_keyword(input: &str) -> Result<&str, InputError> {
    if input.is_empty() { Err(InputError::EmptyKeyword) } else { Ok(input) }
}

/// Participants the application starts with when none are configured.
pub fn default_participants() -> Vec<Participant> {
    vec![Participant::new(1, "Alice"), Participant::new(2, "Bob"), Participant::new(3, "Charlie")]
}
