//! Status web server
//!
//! `GET /` renders the connection state, `GET /health` answers `OK`, and
//! `POST /webhook` accepts gateway events.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, Json},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, RwLock};

use crate::application::errors::BotError;
use crate::domain::entities::InboundMessage;
use crate::infrastructure::adapters::whatsapp::{parse_webhook, WebhookEvent};

/// Snapshot of what the status page shows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Status {
    pub connected: bool,
    /// Pending pairing code, either a `data:` image URL or raw text
    pub qr: Option<String>,
    pub last_error: Option<String>,
}

/// Shared, mutable connection state
pub struct StatusBoard {
    bot_name: String,
    group_name: String,
    started_at: DateTime<Utc>,
    status: RwLock<Status>,
}

impl StatusBoard {
    pub fn new(bot_name: impl Into<String>, group_name: impl Into<String>) -> Self {
        Self {
            bot_name: bot_name.into(),
            group_name: group_name.into(),
            started_at: Utc::now(),
            status: RwLock::new(Status::default()),
        }
    }

    pub async fn set_connected(&self, connected: bool) {
        let mut status = self.status.write().await;
        if connected && !status.connected {
            tracing::info!("Client is ready!");
        }
        status.connected = connected;
        if connected {
            status.qr = None;
        }
    }

    pub async fn set_qr(&self, qr: impl Into<String>) {
        let mut status = self.status.write().await;
        status.connected = false;
        status.qr = Some(qr.into());
        tracing::info!("QR code received, open the status page to scan it");
    }

    pub async fn record_error(&self, error: impl std::fmt::Display) {
        self.status.write().await.last_error = Some(error.to_string());
    }

    pub async fn snapshot(&self) -> Status {
        self.status.read().await.clone()
    }

    pub async fn apply(&self, event: &WebhookEvent) {
        match event {
            WebhookEvent::Connection(connected) => self.set_connected(*connected).await,
            WebhookEvent::Qr(qr) => self.set_qr(qr.clone()).await,
            WebhookEvent::Messages(_) | WebhookEvent::Other(_) => {}
        }
    }

    /// Render the status page for `now`
    pub fn render(&self, status: &Status, now: DateTime<Utc>) -> String {
        let uptime = (now - self.started_at).num_seconds().max(0);
        let state = if status.connected {
            "<p class=\"ok\">✅ Connected</p>".to_string()
        } else {
            match status.qr.as_deref() {
                Some(qr) if qr.starts_with("data:image") => format!(
                    "<p>Scan this QR code with WhatsApp:</p><img src=\"{}\" alt=\"QR code\">",
                    escape_html(qr)
                ),
                Some(qr) => format!(
                    "<p>Scan this QR code with WhatsApp:</p><pre>{}</pre>",
                    escape_html(qr)
                ),
                None => "<p>⏳ Waiting for connection...</p>".to_string(),
            }
        };
        let error = status
            .last_error
            .as_deref()
            .map(|e| format!("<p class=\"error\">Last error: {}</p>", escape_html(e)))
            .unwrap_or_default();

        format!(
            "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{name}</title>\
             <meta http-equiv=\"refresh\" content=\"10\"></head><body>\
             <h1>{name}</h1><p>Group: {group}</p>{state}{error}\
             <p>Uptime: {hours}h {minutes}m {seconds}s</p></body></html>",
            name = escape_html(&self.bot_name),
            group = escape_html(&self.group_name),
            state = state,
            error = error,
            hours = uptime / 3600,
            minutes = (uptime % 3600) / 60,
            seconds = uptime % 60,
        )
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Shared state for request handlers
pub struct StatusServer {
    board: Arc<StatusBoard>,
    inbound: mpsc::Sender<InboundMessage>,
}

impl StatusServer {
    pub fn new(board: Arc<StatusBoard>, inbound: mpsc::Sender<InboundMessage>) -> Self {
        Self { board, inbound }
    }

    /// Routes served by the status server
    pub fn router(self: Arc<Self>) -> Router {
        Router::new()
            .route("/", get(status_page))
            .route("/health", get(health))
            .route("/webhook", post(webhook))
            .layer(axum::extract::DefaultBodyLimit::max(1024 * 1024))
            .with_state(self)
    }

    /// Bind `addr` and serve until the process exits
    pub async fn run(self: Arc<Self>, addr: &str) -> Result<(), BotError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| BotError::Network(format!("Failed to bind status server on {}: {}", addr, e)))?;
        tracing::info!("Status server listening on {}", addr);

        axum::serve(listener, self.router())
            .await
            .map_err(|e| BotError::Network(e.to_string()))
    }

    async fn handle_webhook(&self, payload: &Value) {
        let event = parse_webhook(payload);
        self.board.apply(&event).await;

        match event {
            WebhookEvent::Messages(messages) => {
                for message in messages {
                    if self.inbound.send(message).await.is_err() {
                        tracing::error!("Message loop has stopped, dropping webhook message");
                        return;
                    }
                }
            }
            WebhookEvent::Other(name) => tracing::debug!("Ignoring webhook event {}", name),
            _ => {}
        }
    }
}

async fn status_page(State(server): State<Arc<StatusServer>>) -> Html<String> {
    let status = server.board.snapshot().await;
    Html(server.board.render(&status, Utc::now()))
}

async fn health() -> &'static str {
    "OK"
}

async fn webhook(
    State(server): State<Arc<StatusServer>>,
    body: Result<Json<Value>, JsonRejection>,
) -> (StatusCode, &'static str) {
    let Json(payload) = match body {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!("Ignoring malformed webhook payload: {}", e);
            return (StatusCode::BAD_REQUEST, "Bad Request");
        }
    };

    server.handle_webhook(&payload).await;
    (StatusCode::OK, "OK")
}
