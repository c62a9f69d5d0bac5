//! WhatsApp adapter over an Evolution API gateway
//!
//! Outbound traffic uses the gateway's REST endpoints; inbound messages
//! arrive as webhooks on the status server and are decoded by
//! [`parse_webhook`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::{json, Value};

use crate::application::errors::BotError;
use crate::domain::entities::{Chat, InboundMessage};
use crate::domain::traits::{Transport, TransportInfo};
use crate::infrastructure::config::WhatsAppConfig;
use crate::infrastructure::web::StatusBoard;

const PLATFORM: &str = "whatsapp";

/// Decoded gateway webhook
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookEvent {
    Messages(Vec<InboundMessage>),
    /// `true` once the session is open
    Connection(bool),
    Qr(String),
    Other(String),
}

/// Decode an Evolution API webhook payload
///
/// Event names are accepted in both `messages.upsert` and
/// `MESSAGES_UPSERT` spelling. Messages without text are dropped here;
/// self-sent ones are kept for the router to filter.
pub fn parse_webhook(payload: &Value) -> WebhookEvent {
    let event = payload["event"]
        .as_str()
        .unwrap_or("")
        .to_lowercase()
        .replace('_', ".");
    let data = &payload["data"];

    match event.as_str() {
        "messages.upsert" => {
            let items: Vec<&Value> = match data.as_array() {
                Some(items) => items.iter().collect(),
                None => vec![data],
            };
            WebhookEvent::Messages(items.into_iter().filter_map(parse_message).collect())
        }
        "connection.update" => {
            let state = data["state"].as_str().unwrap_or("");
            WebhookEvent::Connection(is_open(state))
        }
        "qrcode.updated" => {
            let qr = data["qrcode"]["base64"]
                .as_str()
                .or_else(|| data["qrcode"].as_str())
                .unwrap_or("");
            if qr.is_empty() {
                WebhookEvent::Other(event)
            } else {
                WebhookEvent::Qr(qr.to_string())
            }
        }
        _ => WebhookEvent::Other(event),
    }
}

fn parse_message(item: &Value) -> Option<InboundMessage> {
    let key = &item["key"];
    let id = key["id"].as_str().filter(|id| !id.is_empty())?;
    let remote_jid = key["remoteJid"].as_str().filter(|jid| !jid.is_empty())?;
    let text = item["message"]["conversation"]
        .as_str()
        .or_else(|| item["message"]["extendedTextMessage"]["text"].as_str())?;

    let mut message = InboundMessage::new(remote_jid, text)
        .with_id(id)
        .with_from_me(key["fromMe"].as_bool().unwrap_or(false))
        .with_platform(PLATFORM);

    if let Some(participant) = key["participant"].as_str().filter(|p| !p.is_empty()) {
        message = message.with_author(participant);
    }
    if let Some(ts) = item["messageTimestamp"]
        .as_i64()
        .or_else(|| item["messageTimestamp"].as_str().and_then(|s| s.parse().ok()))
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
    {
        message.timestamp = ts;
    }

    Some(message)
}

fn is_open(state: &str) -> bool {
    matches!(state, "open" | "connected")
}

#[derive(Debug, Serialize)]
struct SendText<'a> {
    number: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    quoted: Option<Value>,
}

/// Evolution API client
pub struct WhatsAppAdapter {
    config: WhatsAppConfig,
    client: Client,
    board: Arc<StatusBoard>,
    poll_interval: Duration,
    info: TransportInfo,
}

impl WhatsAppAdapter {
    pub fn new(config: WhatsAppConfig, board: Arc<StatusBoard>) -> Self {
        let info = TransportInfo {
            id: config.instance.clone(),
            name: format!("evolution:{}", config.instance),
            platform: PLATFORM.to_string(),
        };
        Self {
            config,
            client: Client::new(),
            board,
            poll_interval: Duration::from_secs(5),
            info,
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.api_url.trim_end_matches('/'),
            path,
            self.config.instance
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.header("apikey", key),
            None => request,
        }
    }

    async fn call(&self, request: RequestBuilder) -> Result<Value, BotError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Transport(format!("gateway returned {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))
    }

    /// Current session state as reported by the gateway, e.g. `open`
    pub async fn connection_state(&self) -> Result<String, BotError> {
        let body = self
            .call(self.client.get(self.url("instance/connectionState")))
            .await?;
        Ok(body["instance"]["state"]
            .as_str()
            .or_else(|| body["state"].as_str())
            .unwrap_or("")
            .to_string())
    }

    /// Ask the gateway for a pairing QR code
    pub async fn request_qr(&self) -> Result<Option<String>, BotError> {
        let body = self.call(self.client.get(self.url("instance/connect"))).await?;
        Ok(body["base64"]
            .as_str()
            .or_else(|| body["qrcode"]["base64"].as_str())
            .or_else(|| body["code"].as_str())
            .map(String::from))
    }

    async fn send_text(&self, number: &str, text: &str, quoted: Option<Value>) -> Result<String, BotError> {
        let payload = SendText { number, text, quoted };
        let body = self
            .call(self.client.post(self.url("message/sendText")).json(&payload))
            .await?;
        Ok(body["key"]["id"].as_str().unwrap_or_default().to_string())
    }
}

#[async_trait]
impl Transport for WhatsAppAdapter {
    /// Poll the gateway until the session is open, publishing a QR code meanwhile
    async fn start(&self) -> Result<(), BotError> {
        tracing::info!("Connecting to WhatsApp gateway at {}", self.config.api_url);
        let mut qr_requested = false;

        loop {
            match self.connection_state().await {
                Ok(state) if is_open(&state) => {
                    self.board.set_connected(true).await;
                    return Ok(());
                }
                Ok(state) => {
                    tracing::debug!("WhatsApp session state: {}", state);
                    if !qr_requested {
                        match self.request_qr().await {
                            Ok(Some(qr)) => self.board.set_qr(qr).await,
                            Ok(None) => tracing::debug!("Gateway returned no QR code"),
                            Err(e) => tracing::warn!("Failed to request QR code: {}", e),
                        }
                        qr_requested = true;
                    }
                }
                Err(e) => {
                    tracing::warn!("Connection check failed: {}", e);
                    self.board.record_error(&e).await;
                }
            }

            if self.board.snapshot().await.connected {
                return Ok(());
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn reply(&self, to: &InboundMessage, text: &str) -> Result<String, BotError> {
        let quoted = json!({
            "key": {
                "id": to.id,
                "remoteJid": to.chat_id,
                "fromMe": to.from_me,
                "participant": to.author_id,
            },
            "message": { "conversation": to.body },
        });
        self.send_text(&to.chat_id, text, Some(quoted)).await
    }

    async fn send_message(&self, chat_id: &str, text: &str) -> Result<String, BotError> {
        self.send_text(chat_id, text, None).await
    }

    async fn get_chats(&self) -> Result<Vec<Chat>, BotError> {
        let request = self
            .client
            .get(self.url("group/fetchAllGroups"))
            .query(&[("getParticipants", "false")]);
        let body = self.call(request).await?;

        let groups = body
            .as_array()
            .ok_or_else(|| BotError::Parse("expected a list of groups".to_string()))?;
        Ok(groups
            .iter()
            .filter_map(|group| {
                let id = group["id"].as_str()?;
                let name = group["subject"].as_str().unwrap_or("");
                Some(Chat::group(id, name))
            })
            .collect())
    }

    fn info(&self) -> TransportInfo {
        self.info.clone()
    }
}
