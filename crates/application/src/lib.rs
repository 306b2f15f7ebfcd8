//! Application services for the scorecast core.
//!
//! Services own the use cases and depend on storage and transport only
//! through ports, so every service is testable against in-memory fakes.
//! The write path is gate, commit, publish: mutations pass the
//! authorization gate, commit through the store, and hand their change
//! set to the bus, from which a single dispatcher fans notifications out
//! to topics.

mod access_ports;
mod access_service;
mod change_bus;
mod connection_service;
mod exercise_service;
mod notification_service;
mod push_ports;
mod store_ports;
pub mod topics;

pub use access_ports::AccessRepository;
pub use access_service::AccessService;
pub use change_bus::{ChangeBus, ChangeBusReceiver};
pub use connection_service::ConnectionService;
pub use exercise_service::ExerciseService;
pub use notification_service::{NotificationService, TopicPublish};
pub use push_ports::{ConnectionId, PushTransport};
pub use store_ports::{ExerciseRepository, RelationLookupRepository};
