//! B6 Pass Riders group bot
//!
//! Flight-load inquiries, a rider support menu, scheduled broadcasts and
//! keyword replies for a WhatsApp group.

pub mod application;
pub mod domain;
pub mod infrastructure;
