use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use scorecast_domain::ScoringOption;

use crate::dto::SaveScoringOptionRequest;
use crate::error::ApiResult;
use crate::principal::CurrentPrincipal;
use crate::state::AppState;

pub async fn save_scoring_option_handler(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Json(payload): Json<SaveScoringOptionRequest>,
) -> ApiResult<StatusCode> {
    let option = ScoringOption::from(payload);
    state
        .exercise_service
        .save_scoring_option(&principal, option)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
