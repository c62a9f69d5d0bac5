//! Domain layer - Core business logic with no external dependencies
//! 
//! This layer contains:
//! - Entities: Core business objects (InboundMessage, Chat, UserSession, rider knowledge)
//! - Traits: Abstractions for infrastructure (Transport, SessionStore)

pub mod entities;
pub mod traits;
