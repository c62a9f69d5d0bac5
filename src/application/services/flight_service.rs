//! Flight-load inquiry: a fixed five-step form forwarded to the admin

use crate::application::errors::BotError;
use crate::domain::entities::{FlightStep, Flow, InboundMessage, UserSession};
use crate::domain::traits::{SessionStore, Transport};

pub const PROMPT_NAME: &str = "Welcome to the Flight Inquiry Service. Please enter your full name:";
pub const PROMPT_DATES: &str = "Thanks! What are your travel dates?";
pub const PROMPT_ROUTE: &str = "Got it. Where are you traveling from and to? (e.g., JFK to LAX)";
pub const PROMPT_FLIGHTS: &str =
    "Noted. Do you have any specific flights in mind? (If none, just type \"No\" or \"Any\")";
pub const CONFIRMATION: &str = "Thank you! Your inquiry has been sent to the admin.";

/// Drives the flight inquiry form for each user
pub struct FlightInquiryService {
    admin_chat_id: Option<String>,
}

impl FlightInquiryService {
    pub fn new(admin_chat_id: Option<String>) -> Self {
        Self { admin_chat_id }
    }

    /// Open (or restart) the form for the sender
    pub async fn start<S: SessionStore + ?Sized>(
        &self,
        sessions: &mut S,
        transport: &dyn Transport,
        message: &InboundMessage,
    ) -> Result<(), BotError> {
        sessions.put(UserSession::new(message.user_id(), Flow::Flight(FlightStep::Start)));
        self.handle(sessions, transport, message).await
    }

    /// Treat `message` as the answer to the sender's current step
    pub async fn handle<S: SessionStore + ?Sized>(
        &self,
        sessions: &mut S,
        transport: &dyn Transport,
        message: &InboundMessage,
    ) -> Result<(), BotError> {
        let user_id = message.user_id();
        let Some(session) = sessions.get_mut(user_id) else {
            return Ok(());
        };

        let step = match session.flow {
            Flow::Flight(step) => step,
            other => {
                tracing::warn!("Resetting {} session for {} found in flight flow", other.kind(), user_id);
                sessions.remove(user_id);
                return Ok(());
            }
        };

        if step != FlightStep::Start && message.body.trim().is_empty() {
            tracing::debug!("Ignoring empty answer from {} at {:?}", user_id, step);
            return Ok(());
        }

        if let Some(field) = step.field() {
            session.set_field(field, message.body.as_str());
        }

        let prompt = match step.next() {
            Some(FlightStep::Name) => PROMPT_NAME,
            Some(FlightStep::Dates) => PROMPT_DATES,
            Some(FlightStep::Route) => PROMPT_ROUTE,
            Some(FlightStep::Flights) => PROMPT_FLIGHTS,
            Some(FlightStep::Start) => {
                sessions.remove(user_id);
                return Ok(());
            }
            None => {
                let summary = format_summary(session);
                sessions.remove(user_id);
                return self.complete(transport, message, &summary).await;
            }
        };

        let next = step.next().map(Flow::Flight);
        transport.reply(message, prompt).await?;
        if let (Some(session), Some(next)) = (sessions.get_mut(user_id), next) {
            session.advance(next);
        }
        Ok(())
    }

    async fn complete(
        &self,
        transport: &dyn Transport,
        message: &InboundMessage,
        summary: &str,
    ) -> Result<(), BotError> {
        transport
            .reply(message, &format!("{}\n\nSummary:\n{}", CONFIRMATION, summary))
            .await?;

        match &self.admin_chat_id {
            Some(admin) => match transport.send_message(admin, summary).await {
                Ok(id) => tracing::info!("Flight inquiry from {} forwarded to admin ({})", message.user_id(), id),
                Err(e) => tracing::error!("Failed to forward flight inquiry to {}: {}", admin, e),
            },
            None => tracing::warn!("Admin number not configured, flight inquiry was not forwarded"),
        }

        Ok(())
    }
}

/// The text sent to the user and forwarded to the admin
pub fn format_summary(session: &UserSession) -> String {
    format!(
        "New Flight Inquiry:\n\
         👤 Name: {}\n\
         📅 Dates: {}\n\
         🛫 Route: {}\n\
         ✈️ Specific Flights: {}",
        session.field("name"),
        session.field("dates"),
        session.field("route"),
        session.field("flights"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::testing::{RecordingTransport, Sent};
    use crate::domain::entities::QuestionStep;
    use crate::infrastructure::storage::MemorySessionStore;

    fn msg(body: &str) -> InboundMessage {
        InboundMessage::new("100@g.us", body).with_author("7@c.us")
    }

    async fn run_form(service: &FlightInquiryService, transport: &RecordingTransport) -> MemorySessionStore {
        let mut sessions = MemorySessionStore::new();
        service.start(&mut sessions, transport, &msg("!flight")).await.unwrap();
        for answer in ["Jane Rider", "May 3 - May 9", "JFK to SJU", "B6 123"] {
            service.handle(&mut sessions, transport, &msg(answer)).await.unwrap();
        }
        sessions
    }

    #[tokio::test]
    async fn test_prompts_follow_the_steps() {
        let transport = RecordingTransport::new();
        let service = FlightInquiryService::new(None);
        let mut sessions = MemorySessionStore::new();

        service.start(&mut sessions, &transport, &msg("!flight")).await.unwrap();
        assert_eq!(sessions.get("7@c.us").unwrap().flow, Flow::Flight(FlightStep::Name));

        service.handle(&mut sessions, &transport, &msg("Jane")).await.unwrap();
        service.handle(&mut sessions, &transport, &msg("tomorrow")).await.unwrap();
        assert_eq!(sessions.get("7@c.us").unwrap().flow, Flow::Flight(FlightStep::Route));
        assert_eq!(transport.texts(), vec![PROMPT_NAME, PROMPT_DATES, PROMPT_ROUTE]);
    }

    #[tokio::test]
    async fn test_summary_contains_answers_in_order() {
        let transport = RecordingTransport::new();
        let service = FlightInquiryService::new(Some("1555@c.us".to_string()));
        let mut sessions = run_form(&service, &transport).await;

        assert!(sessions.is_empty());
        let sent = transport.sent();
        assert_eq!(sent.len(), 6);

        let confirmation = sent[4].text();
        let positions: Vec<usize> = ["Jane Rider", "May 3 - May 9", "JFK to SJU", "B6 123"]
            .iter()
            .map(|v| confirmation.find(v).expect("answer missing from summary"))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(confirmation.starts_with(CONFIRMATION));
        assert!(!sessions.contains("7@c.us"));
    }

    #[tokio::test]
    async fn test_admin_receives_identical_summary() {
        let transport = RecordingTransport::new();
        let service = FlightInquiryService::new(Some("1555@c.us".to_string()));
        run_form(&service, &transport).await;

        let sent = transport.sent();
        let Sent::Direct { chat_id, text } = &sent[5] else {
            panic!("expected admin forward, got {:?}", sent[5]);
        };
        assert_eq!(chat_id, "1555@c.us");
        assert!(text.starts_with("New Flight Inquiry:"));
        assert!(sent[4].text().ends_with(text.as_str()));
    }

    #[tokio::test]
    async fn test_no_admin_means_no_forward() {
        let transport = RecordingTransport::new();
        let service = FlightInquiryService::new(None);
        run_form(&service, &transport).await;

        let sent = transport.sent();
        assert_eq!(sent.len(), 5);
        assert!(sent.iter().all(|s| matches!(s, Sent::Reply { .. })));
    }

    #[tokio::test]
    async fn test_failed_admin_send_is_not_an_error() {
        let transport = RecordingTransport::new().failing_for("1555@c.us");
        let service = FlightInquiryService::new(Some("1555@c.us".to_string()));
        let sessions = run_form(&service, &transport).await;

        assert!(sessions.is_empty());
        assert_eq!(transport.sent().len(), 5);
    }

    #[tokio::test]
    async fn test_blank_answer_keeps_step() {
        let transport = RecordingTransport::new();
        let service = FlightInquiryService::new(None);
        let mut sessions = MemorySessionStore::new();

        service.start(&mut sessions, &transport, &msg("!flight")).await.unwrap();
        service.handle(&mut sessions, &transport, &msg("   ")).await.unwrap();

        assert_eq!(sessions.get("7@c.us").unwrap().flow, Flow::Flight(FlightStep::Name));
        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_foreign_session_is_reset() {
        let transport = RecordingTransport::new();
        let service = FlightInquiryService::new(None);
        let mut sessions = MemorySessionStore::new();
        sessions.put(UserSession::new("7@c.us", Flow::Question(QuestionStep::MenuSelection)));

        service.handle(&mut sessions, &transport, &msg("hello")).await.unwrap();

        assert!(sessions.is_empty());
        assert!(transport.sent().is_empty());
    }
}
