//! Murmur core types.
//!
//! Plain data shared by the broadcast room and its front-ends: who is in the
//! room ([`Participant`]), what they said ([`Message`]), and where time comes
//! from ([`env::Clock`]). Nothing in this crate performs I/O or spawns tasks.
//!
//! # Components
//!
//! - [`Participant`]: identity and display name of a room member
//! - [`Message`]: an immutable, sequenced chat message
//! - [`format_message`]: the `[timestamp] name: body` display form
//! - [`env::Clock`]: wall-clock abstraction for deterministic tests

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod env;
mod message;
mod participant;

pub use message::{Message, format_message};
pub use participant::{ParseParticipantError, Participant, ParticipantId};
