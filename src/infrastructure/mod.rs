//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Storage: Session storage
//! - Adapters: Platform integrations (console, WhatsApp)
//! - Web: Status page and webhook receiver

pub mod adapters;
pub mod config;
pub mod storage;
pub mod web;
