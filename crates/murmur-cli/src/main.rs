//! Murmur console binary.
//!
//! # Usage
//!
//! ```bash
//! # Default participants (1=Alice, 2=Bob, 3=Charlie)
//! murmur
//!
//! # Custom participants and a small delivery buffer
//! murmur --participant 1=Ada --participant 2=Grace --buffer-capacity 8
//! ```

use std::io;

use clap::Parser;
use murmur_cli::{Console, SharedOutput, menu, spawn_listeners};
use murmur_core::Participant;
use murmur_room::{DEFAULT_BUFFER_CAPACITY, MemoryStorage, Room, RoomConfig};
use tokio::io::BufReader;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Murmur broadcast room console
#[derive(Parser, Debug)]
#[command(name = "murmur")]
#[command(about = "In-process broadcast chat room")]
#[command(version)]
struct Args {
    /// Participant as ID=NAME (repeatable)
    #[arg(short, long = "participant", value_name = "ID=NAME")]
    participants: Vec<Participant>,

    /// Pending messages each participant may hold before new ones are dropped
    #[arg(long, default_value_t = DEFAULT_BUFFER_CAPACITY)]
    buffer_capacity: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // stdout belongs to the console
    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    let participants =
        if args.participants.is_empty() { menu::default_participants() } else { args.participants };

    let room = Room::start(MemoryStorage::new(), RoomConfig { buffer_capacity: args.buffer_capacity })?;
    for participant in &participants {
        room.register_participant(participant.clone())?;
    }
    room.settle().await?;

    tracing::info!(participants = participants.len(), "murmur room ready");

    let output = SharedOutput::new(io::stdout());
    let listeners = spawn_listeners(&room, &participants, &output)?;

    let input = BufReader::new(tokio::io::stdin());
    let result = Console::new(input, output, room.clone(), participants).run().await;

    room.shutdown()?;
    for listener in listeners {
        listener.await?;
    }

    let stats = room.stats();
    tracing::info!(
        published = stats.published,
        rejected = stats.rejected,
        dropped = stats.dropped_deliveries,
        "murmur room closed"
    );

    result?;
    Ok(())
}
