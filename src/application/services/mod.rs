//! Application services - Flows, broadcasts and keyword replies

pub mod auto_responder;
pub mod broadcast_service;
pub mod flight_service;
pub mod question_service;
pub mod schedule;

#[cfg(test)]
pub(crate) mod testing;

pub use auto_responder::AutoResponder;
pub use broadcast_service::{BroadcastJob, BroadcastScheduler, StartupAnnouncer};
pub use flight_service::FlightInquiryService;
pub use question_service::QuestionService;
pub use schedule::CronSchedule;
