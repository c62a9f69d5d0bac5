//! Message handling - Parsing, middleware and routing

pub mod middleware;
pub mod parser;
pub mod router;

pub use middleware::{Middleware, MiddlewareChain, MiddlewareError};
pub use parser::CommandParser;
pub use router::{MessageRouter, Route};
