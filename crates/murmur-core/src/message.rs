//! Chat messages.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::ParticipantId;

/// A sequenced chat message. Immutable once created.
///
/// # Invariants
///
/// - `sequence` starts at 1 and increases by exactly one per stored message
/// - `author_name` is the author's display name when the message was
///   published, not their current one
/// - `created_at` is the publish time, not the time it reached storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Position in the room's history (1-based)
    pub sequence: u64,
    /// Who published the message
    pub author_id: ParticipantId,
    /// Author display name, denormalized at publish time
    pub author_name: String,
    /// Message text
    pub body: String,
    /// When the message was published
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Case-insensitive substring match on the body.
    ///
    /// An empty keyword matches every message.
    pub fn contains_keyword(&self, keyword: &str) -> bool {
        self.body.to_lowercase().contains(&keyword.to_lowercase())
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.author_name,
            self.body
        )
    }
}

/// Format a message for display as `[<RFC 3339 timestamp>] <name>: <body>`.
pub fn format_message(message: &Message) -> String {
    message.to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use proptest::prelude::*;

    use super::*;

    fn message(body: &str) -> Message {
        Message {
            sequence: 1,
            author_id: ParticipantId(1),
            author_name: "Alice".to_string(),
            body: body.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap(),
        }
    }

    #[test]
    fn format_message_display() {
        insta::assert_snapshot!(format_message(&message("hello")), @"[2024-03-09T14:05:00Z] Alice: hello");
    }

    #[test]
    fn keyword_match_ignores_case() {
        let msg = message("Hello World");

        assert!(msg.contains_keyword("HELL"));
        assert!(msg.contains_keyword("o w"));
        assert!(msg.contains_keyword(""));
        assert!(!msg.contains_keyword("bye"));
    }

    proptest! {
        /// Every substring of the body matches regardless of case.
        #[test]
        fn prop_substrings_always_match(
            body in "[a-zA-Z ]{1,40}",
            start in 0usize..40,
            len in 0usize..40,
            upper in any::<bool>(),
        ) {
            let msg = message(&body);
            let start = start.min(body.len());
            let end = (start + len).min(body.len());
            let keyword = &body[start..end];
            let keyword = if upper { keyword.to_uppercase() } else { keyword.to_lowercase() };

            prop_assert!(msg.contains_keyword(&keyword));
        }
    }
}
