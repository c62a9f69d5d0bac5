use crate::application::errors::BotError;
use crate::domain::entities::InboundMessage;
use crate::domain::traits::Transport;

/// Keyword replies for messages no flow or command claimed
pub struct AutoResponder {
    entries: Vec<(String, String)>,
}

impl AutoResponder {
    pub fn new(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .filter(|(keyword, _)| !keyword.trim().is_empty())
                .map(|(keyword, reply)| (keyword.to_lowercase(), reply))
                .collect(),
        }
    }

    /// Reply for the first keyword, in table order, contained in `body`
    pub fn find(&self, body: &str) -> Option<&str> {
        let body = body.to_lowercase();
        self.entries
            .iter()
            .find(|(keyword, _)| body.contains(keyword.as_str()))
            .map(|(_, reply)| reply.as_str())
    }

    /// Send the matching reply, if any; returns whether one was sent
    pub async fn respond(&self, transport: &dyn Transport, message: &InboundMessage) -> Result<bool, BotError> {
        let Some(reply) = self.find(&message.body) else {
            return Ok(false);
        };
        transport.reply(message, reply).await?;
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::testing::RecordingTransport;

    fn responder() -> AutoResponder {
        AutoResponder::new(vec![
            ("price".to_string(), "Our membership price is $50/month.".to_string()),
            ("Hours".to_string(), "We are open 9 AM - 5 PM, Mon-Fri.".to_string()),
            ("".to_string(), "never".to_string()),
        ])
    }

    #[test]
    fn test_case_insensitive_substring() {
        let r = responder();
        assert_eq!(r.len(), 2);
        assert_eq!(r.find("What's the PRICE?"), Some("Our membership price is $50/month."));
        assert_eq!(r.find("opening hours?"), Some("We are open 9 AM - 5 PM, Mon-Fri."));
    }

    #[test]
    fn test_first_entry_wins() {
        assert_eq!(
            responder().find("hours and price"),
            Some("Our membership price is $50/month.")
        );
    }

    #[tokio::test]
    async fn test_no_keyword_no_reply() {
        let transport = RecordingTransport::new();
        let replied = responder()
            .respond(&transport, &InboundMessage::new("1@c.us", "good morning"))
            .await
            .unwrap();
        assert!(!replied);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_single_keyword_single_reply() {
        let transport = RecordingTransport::new();
        let replied = responder()
            .respond(&transport, &InboundMessage::new("1@c.us", "price please"))
            .await
            .unwrap();
        assert!(replied);
        assert_eq!(transport.texts(), vec!["Our membership price is $50/month."]);
    }
}
