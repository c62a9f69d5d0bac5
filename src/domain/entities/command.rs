/// Chat commands the bot understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Liveness check, answered with "pong"
    Ping,
    /// Starts the flight-load inquiry form
    Flight,
    /// Opens the support menu, or answers a one-shot query when `query` is set
    Question { query: Option<String> },
    /// Looks like a command the bot owns but is not one (e.g. `!questions`)
    Unrecognized(String),
}

impl Command {
    pub fn name(&self) -> &str {
        match self {
            Command::Ping => "ping",
            Command::Flight => "flight",
            Command::Question { .. } => "question",
            Command::Unrecognized(name) => name,
        }
    }
}
