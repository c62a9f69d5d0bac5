//! Middleware system for message processing pipeline

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use crate::domain::entities::InboundMessage;

/// Context passed through middleware chain
#[derive(Debug, Clone)]
pub struct Context {
    pub message: InboundMessage,
    pub chat_id: String,
    pub user_id: String,
}

impl Context {
    pub fn new(message: InboundMessage) -> Self {
        let chat_id = message.chat_id.clone();
        let user_id = message.user_id().to_string();

        Self {
            message,
            chat_id,
            user_id,
        }
    }
}

/// Middleware trait - processors that can intercept and modify message handling
pub trait Middleware: Send + Sync {
    /// Process a message and optionally modify the context
    fn process(&self, ctx: Context, next: Next) -> MiddlewareResult;
}

/// Result of middleware processing
pub type MiddlewareResult = Result<Context, MiddlewareError>;

/// Middleware errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MiddlewareError {
    /// Stop processing silently
    Blocked(String),
    /// Message id was already handled
    Duplicate(String),
    /// Internal error
    Internal(String),
}

impl std::fmt::Display for MiddlewareError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MiddlewareError::Blocked(msg) => write!(f, "Blocked: {}", msg),
            MiddlewareError::Duplicate(id) => write!(f, "Duplicate message: {}", id),
            MiddlewareError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for MiddlewareError {}

/// Next middleware in chain
#[derive(Clone)]
pub struct Next {
    remaining: Arc<Vec<Arc<dyn Middleware>>>,
}

impl Next {
    pub fn new(middlewares: Vec<Arc<dyn Middleware>>) -> Self {
        Self {
            remaining: Arc::new(middlewares),
        }
    }

    /// Process remaining middleware
    pub fn run(self, ctx: Context) -> MiddlewareResult {
        if let Some(first) = self.remaining.first() {
            let remaining = self.remaining[1..].to_vec();
            let next = Next::new(remaining);
            first.process(ctx, next)
        } else {
            // No more middleware, processing complete
            Ok(ctx)
        }
    }
}

/// Middleware chain builder
pub struct MiddlewareChain {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
        }
    }

    pub fn add<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    pub fn build(self) -> Vec<Arc<dyn Middleware>> {
        self.middlewares
    }
}

impl Default for MiddlewareChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Bounded set of handled message ids
///
/// Not an LRU: a new id that takes the set past capacity clears the whole set,
/// itself included.
#[derive(Debug)]
pub struct ProcessedMessageCache {
    ids: HashSet<String>,
    capacity: usize,
}

impl ProcessedMessageCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            ids: HashSet::new(),
            capacity: capacity.max(1),
        }
    }

    /// Record `id`; returns false if it was already seen
    pub fn insert(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        self.ids.insert(id.to_string());
        if self.ids.len() > self.capacity {
            tracing::debug!("Processed message cache exceeded {} entries, clearing", self.capacity);
            self.ids.clear();
        }
        true
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Drops messages whose id has already been handled
pub struct DedupMiddleware {
    seen: Mutex<ProcessedMessageCache>,
}

impl DedupMiddleware {
    pub fn new(capacity: usize) -> Self {
        Self {
            seen: Mutex::new(ProcessedMessageCache::new(capacity)),
        }
    }
}

impl Middleware for DedupMiddleware {
    fn process(&self, ctx: Context, next: Next) -> MiddlewareResult {
        let fresh = self.seen.lock()
            .map_err(|_| MiddlewareError::Internal("Lock poisoned".to_string()))?
            .insert(&ctx.message.id);

        if !fresh {
            return Err(MiddlewareError::Duplicate(ctx.message.id.clone()));
        }

        next.run(ctx)
    }
}

/// Drops everything the bot's own account sent, so replies never loop
pub struct SelfMessageFilter;

impl Middleware for SelfMessageFilter {
    fn process(&self, ctx: Context, next: Next) -> MiddlewareResult {
        if ctx.message.from_me {
            return Err(MiddlewareError::Blocked("self-originated".to_string()));
        }
        next.run(ctx)
    }
}

/// Logging middleware for debugging
pub struct LoggingMiddleware;

impl Middleware for LoggingMiddleware {
    fn process(&self, ctx: Context, next: Next) -> MiddlewareResult {
        tracing::debug!("[{}] {}: {}", ctx.chat_id, ctx.user_id, ctx.message.preview());

        let result = next.run(ctx);

        if let Err(e) = &result {
            tracing::warn!("Middleware error: {}", e);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(capacity: usize) -> Vec<Arc<dyn Middleware>> {
        MiddlewareChain::new()
            .add(DedupMiddleware::new(capacity))
            .add(SelfMessageFilter)
            .add(LoggingMiddleware)
            .build()
    }

    fn run(chain: &[Arc<dyn Middleware>], message: InboundMessage) -> MiddlewareResult {
        Next::new(chain.to_vec()).run(Context::new(message))
    }

    #[test]
    fn test_cache_clears_wholesale_when_full() {
        let mut cache = ProcessedMessageCache::new(3);
        assert!(cache.insert("a"));
        assert!(cache.insert("b"));
        assert!(cache.insert("c"));
        assert!(!cache.insert("a"));
        assert_eq!(cache.len(), 3);

        // a fourth id takes it past capacity and resets the set
        assert!(cache.insert("d"));
        assert!(cache.is_empty());
        assert!(cache.insert("a"));
        assert!(cache.insert("d"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let chain = chain(1000);
        let msg = InboundMessage::new("1@c.us", "hello").with_id("ABC");

        assert!(run(&chain, msg.clone()).is_ok());
        assert_eq!(
            run(&chain, msg).unwrap_err(),
            MiddlewareError::Duplicate("ABC".to_string())
        );
    }

    #[test]
    fn test_self_messages_are_blocked() {
        let chain = chain(1000);
        let msg = InboundMessage::new("1@c.us", "!ping").with_from_me(true);
        assert!(matches!(run(&chain, msg), Err(MiddlewareError::Blocked(_))));
    }

    #[test]
    fn test_context_resolves_group_author() {
        let chain = chain(1000);
        let msg = InboundMessage::new("42@g.us", "hi").with_author("7@c.us");
        let ctx = run(&chain, msg).unwrap();
        assert_eq!(ctx.user_id, "7@c.us");
        assert_eq!(ctx.chat_id, "42@g.us");
    }
}
