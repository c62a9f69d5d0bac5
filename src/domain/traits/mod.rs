//! Domain traits - Abstractions for infrastructure implementations

pub mod store;
pub mod transport;

pub use store::SessionStore;
pub use transport::{Transport, TransportInfo};
