//! Domain entities - Core business objects with no external dependencies

pub mod chat;
pub mod command;
pub mod knowledge;
pub mod message;
pub mod session;

pub use chat::Chat;
pub use command::Command;
pub use knowledge::{KnowledgeBase, PriorityCode, RosterBucket, Rule, KNOWLEDGE};
pub use message::InboundMessage;
pub use session::{FlightStep, Flow, QuestionStep, UserSession};
