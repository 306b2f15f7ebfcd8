use std::sync::Arc;

use scorecast_application::{ConnectionService, ExerciseService};
use scorecast_infrastructure::WebSocketPushTransport;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub connection_service: ConnectionService,
    pub exercise_service: ExerciseService,
    pub transport: Arc<WebSocketPushTransport>,
}
