//! Rider support menu: rules, priority codes and roster

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::application::errors::BotError;
use crate::domain::entities::{Flow, InboundMessage, KnowledgeBase, QuestionStep, UserSession};
use crate::domain::traits::{SessionStore, Transport};

pub const ROOT_MENU: &str = "❓ **Rider Support**\n\n\
    What would you like to know?\n\
    1️⃣ **Rider Rules** (Dress code, trading, etc.)\n\
    2️⃣ **Priority Codes** (S6, S6.STND1 meanings)\n\
    3️⃣ **Rider Roster** (List of names & status)\n\n\
    Reply with `1`, `2`, or `3`. Type `exit` to close.";
pub const MENU_FOOTER: &str = "↩️ Reply with `1`, `2`, or `3` for more, or `exit` to close.";
pub const RULE_FOOTER: &str = "↩️ Pick another topic number, or `0` to go back to the menu.";
pub const INVALID_OPTION: &str = "❌ Invalid option. Please reply with `1`, `2`, or `3`.";
pub const UNKNOWN_OPTION: &str =
    "🤔 I didn't understand that. Reply with `1`, `2`, or `3`, or type `exit` to close.";
pub const GOODBYE: &str = "👋 Closing Rider Support. Type `!question` anytime to come back.";

const RESTART_COMMAND: &str = "!question";
const BACK_WORDS: &[&str] = &["0", "back", "menu"];
const EXIT_WORDS: &[&str] = &["exit", "cancel", "quit", "done"];
const PRIORITY_QUERY: &[&str] = &["code", "definition"];
const ROSTER_QUERY: &[&str] = &["list", "name", "roster", "priority"];

static TOKEN_SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[,\s.]+").expect("separator pattern is valid")
});

/// Root menu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuOption {
    Rules,
    Priority,
    Roster,
}

impl MenuOption {
    fn from_alias(token: &str) -> Option<Self> {
        match token {
            "1" | "rule" | "rules" => Some(MenuOption::Rules),
            "2" | "priority" | "code" | "codes" => Some(MenuOption::Priority),
            "3" | "roster" | "name" | "names" | "list" => Some(MenuOption::Roster),
            _ => None,
        }
    }
}

/// Outcome of one answer inside the flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub replies: Vec<String>,
    /// Step to continue at; `None` closes the session
    pub next: Option<QuestionStep>,
}

impl Transition {
    fn stay(step: QuestionStep, replies: Vec<String>) -> Self {
        Self { replies, next: Some(step) }
    }

    fn close(reply: &str) -> Self {
        Self { replies: vec![reply.to_string()], next: None }
    }
}

/// Drives the support menu for each user
pub struct QuestionService {
    kb: &'static KnowledgeBase,
}

impl QuestionService {
    pub fn new(kb: &'static KnowledgeBase) -> Self {
        Self { kb }
    }

    /// Open the root menu for the sender
    pub async fn start<S: SessionStore + ?Sized>(
        &self,
        sessions: &mut S,
        transport: &dyn Transport,
        message: &InboundMessage,
    ) -> Result<(), BotError> {
        sessions.put(UserSession::new(
            message.user_id(),
            Flow::Question(QuestionStep::MenuSelection),
        ));
        transport.reply(message, ROOT_MENU).await?;
        Ok(())
    }

    /// Answer `!question <text>` without opening a session
    pub async fn answer_once(
        &self,
        transport: &dyn Transport,
        message: &InboundMessage,
        query: &str,
    ) -> Result<(), BotError> {
        transport.reply(message, &self.classify(query)).await?;
        Ok(())
    }

    /// Feed the sender's message to their open session
    pub async fn handle<S: SessionStore + ?Sized>(
        &self,
        sessions: &mut S,
        transport: &dyn Transport,
        message: &InboundMessage,
    ) -> Result<(), BotError> {
        let user_id = message.user_id();
        if message.body.trim().eq_ignore_ascii_case(RESTART_COMMAND) {
            return self.start(sessions, transport, message).await;
        }
        let Some(session) = sessions.get_mut(user_id) else {
            return Ok(());
        };

        let step = match session.flow {
            Flow::Question(step) => step,
            other => {
                tracing::warn!("Resetting {} session for {} found in question flow", other.kind(), user_id);
                sessions.remove(user_id);
                return Ok(());
            }
        };

        let transition = self.transition(step, &message.body);
        match transition.next {
            Some(next) => session.advance(Flow::Question(next)),
            None => {
                sessions.remove(user_id);
            }
        }

        for reply in &transition.replies {
            transport.reply(message, reply).await?;
        }
        Ok(())
    }

    /// Pure step function of the menu state machine
    pub fn transition(&self, step: QuestionStep, body: &str) -> Transition {
        let text = body.trim().to_lowercase();
        if text.is_empty() {
            return Transition::stay(step, Vec::new());
        }
        if EXIT_WORDS.contains(&text.as_str()) {
            return Transition::close(GOODBYE);
        }
        if BACK_WORDS.contains(&text.as_str()) {
            return Transition::stay(QuestionStep::MenuSelection, vec![ROOT_MENU.to_string()]);
        }

        match step {
            QuestionStep::MenuSelection => self.select_option(&text),
            QuestionStep::RuleSelection => self.select_rule(&text),
        }
    }

    fn select_option(&self, text: &str) -> Transition {
        let mut chosen: Vec<MenuOption> = Vec::new();
        for option in TOKEN_SEPARATOR.split(text).filter_map(MenuOption::from_alias) {
            if !chosen.contains(&option) {
                chosen.push(option);
            }
        }

        if !chosen.is_empty() {
            let mut replies = Vec::new();
            if chosen.contains(&MenuOption::Priority) {
                replies.push(self.format_priority_list());
            }
            if chosen.contains(&MenuOption::Roster) {
                replies.push(self.format_roster());
            }
            // the topic list asks for a number, so it goes last
            if chosen.contains(&MenuOption::Rules) {
                replies.push(self.format_rules_menu());
                return Transition::stay(QuestionStep::RuleSelection, replies);
            }
            replies.push(MENU_FOOTER.to_string());
            return Transition::stay(QuestionStep::MenuSelection, replies);
        }

        if let Some(rule) = self.kb.find_rule(text) {
            return Transition::stay(
                QuestionStep::MenuSelection,
                vec![rule.content.to_string(), MENU_FOOTER.to_string()],
            );
        }

        let reply = if is_numeric(text) { INVALID_OPTION } else { UNKNOWN_OPTION };
        Transition::stay(QuestionStep::MenuSelection, vec![reply.to_string()])
    }

    fn select_rule(&self, text: &str) -> Transition {
        if is_numeric(text) {
            let rule = text.parse::<usize>().ok().and_then(|n| self.kb.rule_at(n));
            let reply = match rule {
                Some(rule) => vec![rule.content.to_string(), RULE_FOOTER.to_string()],
                None => vec![format!(
                    "❌ Invalid selection. Pick a number from 1 to {}, or `0` to go back.",
                    self.kb.rules.len()
                )],
            };
            return Transition::stay(QuestionStep::RuleSelection, reply);
        }

        match self.kb.find_rule_by_topic(text).or_else(|| self.kb.find_rule(text)) {
            Some(rule) => Transition::stay(
                QuestionStep::RuleSelection,
                vec![rule.content.to_string(), RULE_FOOTER.to_string()],
            ),
            // probably chatter in the group, not meant for the bot
            None => Transition::stay(QuestionStep::RuleSelection, Vec::new()),
        }
    }

    /// One-shot lookup: priority codes, then roster, then rule keywords
    pub fn classify(&self, query: &str) -> String {
        let query = query.trim().to_lowercase();

        if PRIORITY_QUERY.iter().any(|k| query.contains(k)) {
            return self.format_priority_list();
        }
        if ROSTER_QUERY.iter().any(|k| query.contains(k)) {
            return self.format_roster();
        }
        match self.kb.find_rule(&query) {
            Some(rule) => rule.content.to_string(),
            None => format!(
                "🤔 I couldn't find a specific rule for \"{}\".\n\nTry:\n{}",
                query,
                self.format_rules_menu()
            ),
        }
    }

    pub fn format_priority_list(&self) -> String {
        let mut message = String::from("📋 **Priority Codes Breakdown**:\n\n");
        for p in &self.kb.priority_codes {
            message.push_str(&format!("*{}*: {}\n_{}_\n\n", p.code, p.name, p.description));
        }
        message.trim_end().to_string()
    }

    pub fn format_roster(&self) -> String {
        let sections: Vec<String> = self
            .kb
            .roster
            .iter()
            .filter(|bucket| !bucket.entries.is_empty())
            .map(|bucket| {
                format!("*{} ({})*:\n{}", bucket.title, bucket.entries.len(), bucket.entries.join("\n"))
            })
            .collect();
        format!("✈️ **Rider Roster & Priority**:\n\n{}", sections.join("\n\n"))
    }

    pub fn format_rules_menu(&self) -> String {
        let mut message = String::from("📜 **Rider Rules Topics**:\n");
        for (index, rule) in self.kb.rules.iter().enumerate() {
            message.push_str(&format!("{}. {}\n", index + 1, rule.topic));
        }
        message.push_str("\nReply with the *number* or *keyword* (e.g., \"Raffles\") to learn more, or `0` to go back.");
        message
    }
}

fn is_numeric(text: &str) -> bool {
    text.parse::<i64>().is_ok()
}
