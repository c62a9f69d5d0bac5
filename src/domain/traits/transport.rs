use async_trait::async_trait;
use crate::domain::entities::{Chat, InboundMessage};
use crate::application::errors::BotError;

/// Transport trait - abstraction over the chat client that delivers and sends messages
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connect and begin delivering inbound messages
    async fn start(&self) -> Result<(), BotError>;

    /// Reply to an inbound message in the chat it came from
    async fn reply(&self, to: &InboundMessage, text: &str) -> Result<String, BotError>;

    /// Send a message to a chat or contact id
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<String, BotError>;

    /// List the chats the session has joined
    async fn get_chats(&self) -> Result<Vec<Chat>, BotError>;

    /// Get transport info
    fn info(&self) -> TransportInfo;
}

/// Transport information
#[derive(Debug, Clone)]
pub struct TransportInfo {
    pub id: String,
    pub name: String,
    pub platform: String,
}
