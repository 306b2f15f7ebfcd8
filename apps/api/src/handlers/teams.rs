use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use scorecast_core::{TeamId, UserId};
use scorecast_domain::{TeamAction, TeamDuty, TeamMembership};

use crate::dto::{SaveTeamActionRequest, SaveTeamDutyRequest, SaveTeamMembershipRequest};
use crate::error::ApiResult;
use crate::principal::CurrentPrincipal;
use crate::state::AppState;

pub async fn save_team_membership_handler(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(team_id): Path<TeamId>,
    Json(payload): Json<SaveTeamMembershipRequest>,
) -> ApiResult<StatusCode> {
    let membership = TeamMembership {
        team_id,
        user_id: payload.user_id,
        role_id: payload.role_id,
    };
    state
        .exercise_service
        .save_team_membership(&principal, membership)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_team_membership_handler(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path((team_id, user_id)): Path<(TeamId, UserId)>,
) -> ApiResult<StatusCode> {
    state
        .exercise_service
        .remove_team_membership(&principal, team_id, user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn save_team_action_handler(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(team_id): Path<TeamId>,
    Json(payload): Json<SaveTeamActionRequest>,
) -> ApiResult<StatusCode> {
    let action = TeamAction {
        id: payload.id.unwrap_or_default(),
        team_id,
        move_number: payload.move_number,
        title: payload.title,
        description: payload.description,
    };
    state
        .exercise_service
        .save_team_action(&principal, action)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn save_team_duty_handler(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(team_id): Path<TeamId>,
    Json(payload): Json<SaveTeamDutyRequest>,
) -> ApiResult<StatusCode> {
    let duty = TeamDuty {
        id: payload.id.unwrap_or_default(),
        team_id,
        holder_user_id: payload.holder_user_id,
        title: payload.title,
    };
    state
        .exercise_service
        .save_team_duty(&principal, duty)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
