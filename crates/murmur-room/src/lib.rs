//! Murmur broadcast room.
//!
//! An in-process chat room: registered participants publish short messages
//! that are stored and fanned out to every participant's bounded delivery
//! buffer, with queryable history.
//!
//! # Architecture
//!
//! ```text
//!   callers ──► Room (facade) ──events──► BroadcastEngine (one task)
//!                  │                         │        │
//!                  │ read lock               │ write  │ save / query
//!                  ▼                         ▼        ▼
//!             RegistryHandle ◄───────── registry   MessageStore
//!                  │
//!                  └── DeliveryStream per participant ──► consumer tasks
//! ```
//!
//! The engine is the only writer of room state, so membership changes and
//! publishes are applied strictly in arrival order without fine-grained
//! locking. Other threads only take the registry's read lock for
//! point-in-time lookups.
//!
//! # Components
//!
//! - [`Room`]: public operations (register, publish, subscribe, history)
//! - `BroadcastEngine`: serializing control loop behind the facade
//! - [`ParticipantRegistry`]: participants and their delivery buffers
//! - [`Sequencer`]: sequence number assignment
//! - [`MessageStore`]: storage collaborator ([`MemoryStorage`],
//!   [`ChaoticStorage`])

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod delivery;
mod engine;
mod error;
mod registry;
mod room;
mod sequencer;
mod stats;
pub mod storage;

pub use config::{ConfigError, DEFAULT_BUFFER_CAPACITY, RoomConfig};
pub use delivery::DeliveryStream;
pub use error::RoomError;
pub use registry::{DeliveryReport, ParticipantRegistry, Registration, RegistryHandle};
pub use room::Room;
pub use sequencer::Sequencer;
pub use stats::RoomStats;
pub use storage::{ChaoticStorage, MemoryStorage, MessageStore, StorageError};
