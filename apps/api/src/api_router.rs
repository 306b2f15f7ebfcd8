use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::routing::{delete, get, post, put};
use scorecast_core::AppError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let cors_layer = CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE]);

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/ws", get(handlers::ws::ws_handler))
        .route(
            "/api/submissions",
            put(handlers::submissions::save_submission_handler),
        )
        .route(
            "/api/submissions/{submission_id}",
            delete(handlers::submissions::delete_submission_handler),
        )
        .route(
            "/api/evaluations/{evaluation_id}/advance-move",
            post(handlers::evaluations::advance_move_handler),
        )
        .route(
            "/api/evaluations/{evaluation_id}/memberships",
            put(handlers::evaluations::save_evaluation_membership_handler)
                .delete(handlers::evaluations::remove_evaluation_membership_handler),
        )
        .route(
            "/api/teams/{team_id}/memberships",
            put(handlers::teams::save_team_membership_handler),
        )
        .route(
            "/api/teams/{team_id}/memberships/{user_id}",
            delete(handlers::teams::remove_team_membership_handler),
        )
        .route(
            "/api/teams/{team_id}/actions",
            put(handlers::teams::save_team_action_handler),
        )
        .route(
            "/api/teams/{team_id}/duties",
            put(handlers::teams::save_team_duty_handler),
        )
        .route(
            "/api/scoring-options",
            put(handlers::scoring_models::save_scoring_option_handler),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state))
}
