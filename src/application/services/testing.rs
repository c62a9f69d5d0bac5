//! Transport double that records every outbound message

use async_trait::async_trait;
use std::sync::Mutex;

use crate::application::errors::BotError;
use crate::domain::entities::{Chat, InboundMessage};
use crate::domain::traits::{Transport, TransportInfo};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Reply { chat_id: String, quoted: String, text: String },
    Direct { chat_id: String, text: String },
}

impl Sent {
    pub fn text(&self) -> &str {
        match self {
            Sent::Reply { text, .. } | Sent::Direct { text, .. } => text,
        }
    }
}

#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<Sent>>,
    pub chats: Vec<Chat>,
    /// Chat ids whose sends fail
    pub failing: Vec<String>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chats(mut self, chats: Vec<Chat>) -> Self {
        self.chats = chats;
        self
    }

    pub fn failing_for(mut self, chat_id: &str) -> Self {
        self.failing.push(chat_id.to_string());
        self
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent().iter().map(|s| s.text().to_string()).collect()
    }

    fn record(&self, chat_id: &str, sent: Sent) -> Result<String, BotError> {
        if self.failing.iter().any(|f| f == chat_id) {
            return Err(BotError::Transport(format!("send to {} failed", chat_id)));
        }
        let mut log = self.sent.lock().unwrap();
        log.push(sent);
        Ok(format!("sent-{}", log.len()))
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn start(&self) -> Result<(), BotError> {
        Ok(())
    }

    async fn reply(&self, to: &InboundMessage, text: &str) -> Result<String, BotError> {
        self.record(
            &to.chat_id,
            Sent::Reply {
                chat_id: to.chat_id.clone(),
                quoted: to.id.clone(),
                text: text.to_string(),
            },
        )
    }

    async fn send_message(&self, chat_id: &str, text: &str) -> Result<String, BotError> {
        self.record(
            chat_id,
            Sent::Direct {
                chat_id: chat_id.to_string(),
                text: text.to_string(),
            },
        )
    }

    async fn get_chats(&self) -> Result<Vec<Chat>, BotError> {
        Ok(self.chats.clone())
    }

    fn info(&self) -> TransportInfo {
        TransportInfo {
            id: "recording".to_string(),
            name: "recording".to_string(),
            platform: "test".to_string(),
        }
    }
}
