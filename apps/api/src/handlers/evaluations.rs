use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use scorecast_core::EvaluationId;
use scorecast_domain::EvaluationMembership;

use crate::dto::{RemoveEvaluationMembershipRequest, SaveEvaluationMembershipRequest};
use crate::error::ApiResult;
use crate::principal::CurrentPrincipal;
use crate::state::AppState;

pub async fn advance_move_handler(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(evaluation_id): Path<EvaluationId>,
) -> ApiResult<StatusCode> {
    state
        .exercise_service
        .advance_move(&principal, evaluation_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn save_evaluation_membership_handler(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(evaluation_id): Path<EvaluationId>,
    Json(payload): Json<SaveEvaluationMembershipRequest>,
) -> ApiResult<StatusCode> {
    let membership = EvaluationMembership {
        evaluation_id,
        principal: payload.principal,
        role_id: payload.role_id,
    };
    state
        .exercise_service
        .save_evaluation_membership(&principal, membership)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_evaluation_membership_handler(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(evaluation_id): Path<EvaluationId>,
    Json(payload): Json<RemoveEvaluationMembershipRequest>,
) -> ApiResult<StatusCode> {
    state
        .exercise_service
        .remove_evaluation_membership(&principal, evaluation_id, payload.principal)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
