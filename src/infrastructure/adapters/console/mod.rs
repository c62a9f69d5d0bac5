//! Console adapter for development/testing
//!
//! Each stdin line becomes an inbound message from a single local user.
//! Prefix a line with `#` to send it "in the group" instead of as a DM.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::application::errors::BotError;
use crate::domain::entities::{Chat, InboundMessage};
use crate::domain::traits::{Transport, TransportInfo};

pub const CONSOLE_USER: &str = "console@c.us";
pub const CONSOLE_GROUP: &str = "console@g.us";

/// Console transport for local development
pub struct ConsoleAdapter {
    info: TransportInfo,
    group_name: String,
    sender: mpsc::Sender<InboundMessage>,
}

impl ConsoleAdapter {
    pub fn new(group_name: impl Into<String>, sender: mpsc::Sender<InboundMessage>) -> Self {
        Self {
            info: TransportInfo {
                id: "console".to_string(),
                name: "console".to_string(),
                platform: "console".to_string(),
            },
            group_name: group_name.into(),
            sender,
        }
    }

    /// Turn one input line into a message; blank lines are skipped
    pub fn to_message(line: &str) -> Option<InboundMessage> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return None;
        }

        let message = match line.strip_prefix('#') {
            Some(body) => InboundMessage::new(CONSOLE_GROUP, body.trim_start()).with_author(CONSOLE_USER),
            None => InboundMessage::new(CONSOLE_USER, line),
        };
        Some(message.with_platform("console"))
    }
}

#[async_trait]
impl Transport for ConsoleAdapter {
    async fn start(&self) -> Result<(), BotError> {
        tracing::info!("Starting console bot (dev mode)");
        println!("Type a message and press enter. Prefix with # to post in \"{}\".", self.group_name);

        let sender = self.sender.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let Some(message) = ConsoleAdapter::to_message(&line) else {
                            continue;
                        };
                        if sender.send(message).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => {
                        tracing::info!("Console input closed");
                        break;
                    }
                    Err(e) => {
                        tracing::error!("Failed to read console input: {}", e);
                        break;
                    }
                }
            }
        });

        Ok(())
    }

    async fn reply(&self, to: &InboundMessage, text: &str) -> Result<String, BotError> {
        self.send_message(&to.chat_id, text).await
    }

    async fn send_message(&self, chat_id: &str, text: &str) -> Result<String, BotError> {
        if chat_id == CONSOLE_USER || chat_id == CONSOLE_GROUP {
            println!("[BOT] {}", text);
        } else {
            println!("[BOT -> {}] {}", chat_id, text);
        }
        Ok(uuid::Uuid::new_v4().to_string())
    }

    async fn get_chats(&self) -> Result<Vec<Chat>, BotError> {
        Ok(vec![Chat::group(CONSOLE_GROUP, self.group_name.clone())])
    }

    fn info(&self) -> TransportInfo {
        self.info.clone()
    }
}
