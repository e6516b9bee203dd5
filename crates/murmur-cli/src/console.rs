//! Interactive menu loop.
//!
//! Reads commands line by line from any async buffered reader and writes to a
//! [`SharedOutput`], so the whole session can be driven from a byte slice in
//! tests. End of input is treated as an exit.

use std::io::{self, Write};

use murmur_core::{Message, Participant, ParticipantId, env::Clock};
use murmur_room::{MessageStore, Room, RoomError};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use crate::{
    menu::{self, Command, MENU},
    output::SharedOutput,
};

/// Failure that ends the console session.
///
/// Bad user input is not an error; it is reported and the menu is shown again.
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// Reading input or writing output failed
    #[error("console I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The room stopped underneath the console
    #[error(transparent)]
    Room(#[from] RoomError),
}

/// Menu-driven front-end over a [`Room`].
pub struct Console<R, W, S: MessageStore, C: Clock> {
    input: Lines<R>,
    output: SharedOutput<W>,
    room: Room<S, C>,
    participants: Vec<Participant>,
}

impl<R, W, S, C> Console<R, W, S, C>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    S: MessageStore,
    C: Clock,
{
    /// Create a console. `participants` are the identities offered at the
    /// prompts.
    pub fn new(
        input: R,
        output: SharedOutput<W>,
        room: Room<S, C>,
        participants: Vec<Participant>,
    ) -> Self {
        Self { input: input.lines(), output, room, participants }
    }

    /// Run the menu until the user exits or input ends.
    pub async fn run(&mut self) -> Result<(), ConsoleError> {
        loop {
            self.output.prompt(MENU)?;
            let Some(choice) = self.ask("\nEnter your choice: ").await? else {
                break;
            };

            match choice.parse::<Command>() {
                Ok(Command::Send) => self.send().await?,
                Ok(Command::ViewAll) => self.view_all()?,
                Ok(Command::FilterByAuthor) => self.filter_by_author().await?,
                Ok(Command::SearchKeyword) => self.search_keyword().await?,
                Ok(Command::Exit) => break,
                Err(e) => self.output.line(&e.to_string())?,
            }
        }

        self.output.line("Exiting chat application.")?;
        Ok(())
    }

    async fn send(&mut self) -> Result<(), ConsoleError> {
        let Some(author) = self.pick_participant().await? else {
            return Ok(());
        };
        let Some(body) = self.ask("Enter your message: ").await? else {
            return Ok(());
        };

        match self.room.publish(author, body).await {
            Ok(message) => {
                tracing::debug!(sequence = message.sequence, "sent from console");
                self.output.line("Message sent successfully.")?;
            },
            Err(RoomError::EngineStopped) => return Err(RoomError::EngineStopped.into()),
            Err(e) => self.output.line(&format!("Error sending message: {e}"))?,
        }
        Ok(())
    }

    fn view_all(&self) -> Result<(), ConsoleError> {
        let messages = self.room.history()?;
        if messages.is_empty() {
            self.output.line("No messages found.")?;
            return Ok(());
        }

        self.output.line("All Messages:")?;
        self.print_messages(&messages)
    }

    async fn filter_by_author(&mut self) -> Result<(), ConsoleError> {
        let Some(author) = self.pick_participant().await? else {
            return Ok(());
        };

        let messages = self.room.history_by_author(author)?;
        if messages.is_empty() {
            self.output.line("No messages found for this user.")?;
            return Ok(());
        }

        self.output.line(&format!("Messages from user ID {author}:"))?;
        self.print_messages(&messages)
    }

    async fn search_keyword(&mut self) -> Result<(), ConsoleError> {
        let Some(input) = self.ask("Enter keyword to search for: ").await? else {
            return Ok(());
        };
        let keyword = match menu::parse_keyword(&input) {
            Ok(keyword) => keyword,
            Err(e) => {
                self.output.line(&e.to_string())?;
                return Ok(());
            },
        };

        let messages = self.room.history_by_keyword(keyword)?;
        if messages.is_empty() {
            self.output.line(&format!("No messages found containing '{keyword}'."))?;
            return Ok(());
        }

        self.output.line(&format!("Messages containing '{keyword}':"))?;
        self.print_messages(&messages)
    }

    /// List the participants and read an ID. `None` if input was rejected
    /// (already reported) or ended.
    async fn pick_participant(&mut self) -> Result<Option<ParticipantId>, ConsoleError> {
        self.output.line("Available users:")?;
        for participant in &self.participants {
            self.output.line(&participant.to_string())?;
        }

        let Some(input) = self.ask("Enter user ID: ").await? else {
            return Ok(None);
        };

        match menu::parse_participant(&input, &self.participants) {
            Ok(id) => Ok(Some(id)),
            Err(e) => {
                self.output.line(&e.to_string())?;
                Ok(None)
            },
        }
    }

    fn print_messages(&self, messages: &[Message]) -> Result<(), ConsoleError> {
        for message in messages {
            self.output.line(&message.to_string())?;
        }
        Ok(())
    }

    async fn ask(&mut self, prompt: &str) -> Result<Option<String>, ConsoleError> {
        self.output.prompt(prompt)?;
        Ok(self.input.next_line().await?)
    }
}
