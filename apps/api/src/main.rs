//! Scorecast API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod dev_seed;
mod dto;
mod error;
mod handlers;
mod principal;
mod state;

use std::sync::Arc;

use scorecast_application::{
    AccessService, ChangeBus, ConnectionService, ExerciseService, NotificationService,
};
use scorecast_core::AppError;
use scorecast_domain::RoleCatalog;
use scorecast_infrastructure::{
    PostgresAccessRepository, PostgresExerciseRepository, WebSocketPushTransport,
};
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::api_config::ApiConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    api_config::init_tracing();

    let config = ApiConfig::load()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    if config.seed_dev_data {
        dev_seed::run(&pool).await?;
    }

    let access_repository = Arc::new(PostgresAccessRepository::new(pool.clone()));
    let exercise_repository = Arc::new(PostgresExerciseRepository::new(pool.clone()));
    let transport = Arc::new(WebSocketPushTransport::new());

    let access_service = AccessService::new(access_repository, Arc::new(RoleCatalog::seed()));
    let (bus, bus_receiver) = ChangeBus::channel();

    let connection_service = ConnectionService::new(
        access_service.clone(),
        exercise_repository.clone(),
        transport.clone(),
    );
    let exercise_service = ExerciseService::new(
        access_service,
        exercise_repository.clone(),
        exercise_repository.clone(),
        bus,
    );
    let notification_service =
        NotificationService::new(exercise_repository, transport.clone());

    let cancel = CancellationToken::new();
    let dispatcher = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if let Err(dispatch_error) = notification_service.run(bus_receiver, cancel).await {
                error!(%dispatch_error, "notification dispatch stopped");
            }
        }
    });

    let app_state = AppState {
        connection_service,
        exercise_service,
        transport,
    };

    let app = api_router::build_router(app_state, &config.frontend_url)?;
    let address = config.socket_address()?;

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "scorecast-api listening");

    let serve_result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")));

    cancel.cancel();
    dispatcher
        .await
        .map_err(|error| AppError::Internal(format!("dispatcher task failed: {error}")))?;

    serve_result
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(%error, "failed to install shutdown signal handler");
    }
}
