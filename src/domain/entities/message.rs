use chrono::{DateTime, Utc};

/// An inbound message event delivered by the chat transport
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    /// Unique id assigned by the transport; redeliveries reuse it
    pub id: String,
    /// Chat the message arrived in (a contact for DMs, a group otherwise)
    pub chat_id: String,
    /// Participant who wrote the message when `chat_id` is a group
    pub author_id: Option<String>,
    pub body: String,
    pub from_me: bool,
    pub timestamp: DateTime<Utc>,
    pub platform: String,
}

impl InboundMessage {
    pub fn new(chat_id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            chat_id: chat_id.into(),
            author_id: None,
            body: body.into(),
            from_me: false,
            timestamp: Utc::now(),
            platform: "unknown".to_string(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_author(mut self, author_id: impl Into<String>) -> Self {
        self.author_id = Some(author_id.into());
        self
    }

    pub fn with_from_me(mut self, from_me: bool) -> Self {
        self.from_me = from_me;
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    /// The user a session belongs to: the author in groups, the chat in DMs
    pub fn user_id(&self) -> &str {
        self.author_id
            .as_deref()
            .filter(|a| !a.is_empty())
            .unwrap_or(&self.chat_id)
    }

    /// Short body preview for logs
    pub fn preview(&self) -> String {
        self.body.chars().take(50).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_prefers_author() {
        let msg = InboundMessage::new("123@g.us", "hi").with_author("555@c.us");
        assert_eq!(msg.user_id(), "555@c.us");

        let dm = InboundMessage::new("555@c.us", "hi");
        assert_eq!(dm.user_id(), "555@c.us");
    }

    #[test]
    fn test_empty_author_falls_back_to_chat() {
        let msg = InboundMessage::new("555@c.us", "hi").with_author("");
        assert_eq!(msg.user_id(), "555@c.us");
    }
}
