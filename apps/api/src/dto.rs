use scorecast_core::{
    EvaluationId, RoleId, ScoringCategoryId, ScoringOptionId, SubmissionId, TeamActionId,
    TeamDutyId, UserId,
};
use scorecast_domain::{
    PrincipalRef, ScoringOption, Submission, SubmissionScope, SubmissionSelection,
};
use serde::{Deserialize, Serialize};

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Incoming payload for submission upserts. The id is optional so a first
/// write can let the server mint one.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSubmissionRequest {
    pub id: Option<SubmissionId>,
    pub evaluation_id: EvaluationId,
    pub move_number: u32,
    pub scope: SubmissionScope,
    pub score: f64,
    #[serde(default)]
    pub selections: Vec<SubmissionSelection>,
}

impl From<SaveSubmissionRequest> for Submission {
    fn from(value: SaveSubmissionRequest) -> Self {
        Self {
            id: value.id.unwrap_or_default(),
            evaluation_id: value.evaluation_id,
            move_number: value.move_number,
            scope: value.scope,
            score: value.score,
            selections: value.selections,
        }
    }
}

/// Incoming payload for granting an evaluation role.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveEvaluationMembershipRequest {
    pub principal: PrincipalRef,
    pub role_id: RoleId,
}

/// Incoming payload for revoking an evaluation role.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveEvaluationMembershipRequest {
    pub principal: PrincipalRef,
}

/// Incoming payload for granting a team role.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveTeamMembershipRequest {
    pub user_id: UserId,
    pub role_id: RoleId,
}

/// Incoming payload for team action upserts. The team id comes from the
/// request path.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveTeamActionRequest {
    pub id: Option<TeamActionId>,
    pub move_number: u32,
    pub title: String,
    pub description: String,
}

/// Incoming payload for team duty upserts.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveTeamDutyRequest {
    pub id: Option<TeamDutyId>,
    pub holder_user_id: Option<UserId>,
    pub title: String,
}

/// Incoming payload for scoring option upserts.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveScoringOptionRequest {
    pub id: Option<ScoringOptionId>,
    pub scoring_category_id: ScoringCategoryId,
    pub name: String,
    pub value: f64,
}

impl From<SaveScoringOptionRequest> for ScoringOption {
    fn from(value: SaveScoringOptionRequest) -> Self {
        Self {
            id: value.id.unwrap_or_default(),
            scoring_category_id: value.scoring_category_id,
            name: value.name,
            value: value.value,
        }
    }
}
