//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Services: flight inquiry, rider support, broadcasts, auto-replies
//! - Messaging: command parsing, middleware, routing
//! - Errors: Domain-specific errors

pub mod errors;
pub mod messaging;
pub mod services;
