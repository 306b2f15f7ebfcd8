//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_exercise_store;
mod postgres_access_repository;
mod postgres_exercise_repository;
mod websocket_push_transport;

pub use in_memory_exercise_store::InMemoryExerciseStore;
pub use postgres_access_repository::PostgresAccessRepository;
pub use postgres_exercise_repository::PostgresExerciseRepository;
pub use websocket_push_transport::{PushFrame, PushFrameReceiver, WebSocketPushTransport};
