//! Murmur command-line front-end.
//!
//! Menu-driven console over a [`murmur_room::Room`]: send messages as one of
//! the configured participants, browse and search history, and watch every
//! participant's deliveries arrive as they are broadcast.
//!
//! # Components
//!
//! - [`menu`]: command and input parsing
//! - [`Console`]: the interactive loop
//! - [`spawn_listeners`]: one printing task per participant
//! - [`SharedOutput`]: line-atomic writer shared by all of the above

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod console;
mod listeners;
pub mod menu;
mod output;

pub use console::{Console, ConsoleError};
pub use listeners::spawn_listeners;
pub use output::SharedOutput;
