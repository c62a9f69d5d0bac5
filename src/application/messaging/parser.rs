//! Command parser - Recognizes chat commands in message bodies

use crate::domain::entities::Command;

/// Parses message bodies into bot commands
pub struct CommandParser {
    command_prefix: String,
}

impl CommandParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
        }
    }

    /// Parse a message body; `None` means it is not a command
    ///
    /// Matching is case-insensitive on the trimmed body. `!ping` and
    /// `!flight` must stand alone, `!question` may carry a free-text query.
    pub fn parse(&self, body: &str) -> Option<Command> {
        let text = body.trim();
        let (head, tail) = match text.split_once(char::is_whitespace) {
            Some((head, tail)) => (head, tail.trim()),
            None => (text, ""),
        };

        let head = head.to_lowercase();
        let name = head.strip_prefix(&self.command_prefix)?;

        match (name, tail.is_empty()) {
            ("ping", true) => Some(Command::Ping),
            ("flight", true) => Some(Command::Flight),
            ("question", true) => Some(Command::Question { query: None }),
            ("question", false) => Some(Command::Question {
                query: Some(tail.to_string()),
            }),
            (other, _) if other.starts_with("question") => {
                Some(Command::Unrecognized(other.to_string()))
            }
            _ => None,
        }
    }
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new("!")
    }
}
