//! Transport adapters

pub mod console;
pub mod whatsapp;

pub use console::ConsoleAdapter;
pub use whatsapp::WhatsAppAdapter;
