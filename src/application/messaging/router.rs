//! Message router - Entry point for every inbound message

use std::sync::Arc;

use super::middleware::{
    Context, DedupMiddleware, LoggingMiddleware, Middleware, MiddlewareChain, MiddlewareError,
    Next, SelfMessageFilter,
};
use super::parser::CommandParser;
use crate::application::errors::BotError;
use crate::application::services::{AutoResponder, FlightInquiryService, QuestionService};
use crate::domain::entities::{Command, Flow, InboundMessage};
use crate::domain::traits::{SessionStore, Transport};

/// Where a message ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Id already handled
    Duplicate,
    /// Dropped before dispatch or recognized but not answered
    Ignored(String),
    Flight,
    Question,
    /// A stateless command such as `!ping`
    Command(String),
    AutoReply { replied: bool },
}

/// Routes messages through middleware to the flows, commands and auto-replies
pub struct MessageRouter<S: SessionStore> {
    transport: Arc<dyn Transport>,
    parser: CommandParser,
    middleware: Vec<Arc<dyn Middleware>>,
    sessions: S,
    flight: FlightInquiryService,
    question: QuestionService,
    auto: AutoResponder,
}

impl<S: SessionStore> MessageRouter<S> {
    pub fn new(
        transport: Arc<dyn Transport>,
        sessions: S,
        flight: FlightInquiryService,
        question: QuestionService,
        auto: AutoResponder,
        dedup_capacity: usize,
    ) -> Self {
        let middleware = MiddlewareChain::new()
            .add(DedupMiddleware::new(dedup_capacity))
            .add(SelfMessageFilter)
            .add(LoggingMiddleware)
            .build();

        Self {
            transport,
            parser: CommandParser::default(),
            middleware,
            sessions,
            flight,
            question,
            auto,
        }
    }

    pub fn sessions_mut(&mut self) -> &mut S {
        &mut self.sessions
    }

    /// Handle one message to completion, including every send it causes
    pub async fn handle(&mut self, message: InboundMessage) -> Result<Route, BotError> {
        let ctx = match Next::new(self.middleware.clone()).run(Context::new(message)) {
            Ok(ctx) => ctx,
            Err(MiddlewareError::Duplicate(_)) => return Ok(Route::Duplicate),
            Err(MiddlewareError::Blocked(reason)) => return Ok(Route::Ignored(reason)),
            Err(MiddlewareError::Internal(msg)) => return Err(BotError::Internal(msg)),
        };

        let transport = self.transport.as_ref();
        let message = &ctx.message;
        let command = self.parser.parse(&message.body);

        match self.sessions.get(&ctx.user_id).map(|session| session.flow) {
            Some(Flow::Flight(_)) => {
                self.flight.handle(&mut self.sessions, transport, message).await?;
                return Ok(Route::Flight);
            }
            Some(Flow::Question(_)) => {
                self.question.handle(&mut self.sessions, transport, message).await?;
                return Ok(Route::Question);
            }
            None => {}
        }

        match command {
            Some(Command::Flight) => {
                tracing::info!("Starting flight inquiry for {}", ctx.user_id);
                self.flight.start(&mut self.sessions, transport, message).await?;
                Ok(Route::Flight)
            }
            Some(Command::Question { query: None }) => {
                tracing::info!("Opening rider support for {}", ctx.user_id);
                self.question.start(&mut self.sessions, transport, message).await?;
                Ok(Route::Question)
            }
            Some(Command::Question { query: Some(query) }) => {
                self.question.answer_once(transport, message, &query).await?;
                Ok(Route::Question)
            }
            Some(Command::Ping) => {
                transport.reply(message, "pong").await?;
                Ok(Route::Command(Command::Ping.name().to_string()))
            }
            Some(Command::Unrecognized(name)) => {
                tracing::debug!("Ignoring unrecognized command {}", name);
                Ok(Route::Ignored(format!("unrecognized command {}", name)))
            }
            _ => {
                let replied = self.auto.respond(transport, message).await?;
                Ok(Route::AutoReply { replied })
            }
        }
    }
}
