use serde_json::Value;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use scorecast_core::{
    AppError, AppResult, EvaluationId, RoleId, ScoringCategoryId, ScoringModelId,
    ScoringOptionId, SubmissionId, TeamActionId, TeamDutyId, TeamId, TeamTypeId, UserId,
};
use scorecast_domain::{
    Evaluation, EvaluationMembership, ScoringCategory, ScoringModel, ScoringOption, Submission,
    SubmissionScope, Team, TeamAction, TeamDuty, TeamMembership, TeamType,
};

use crate::postgres_access_repository::decode_principal;

mod lookups;
mod mutations;

/// PostgreSQL-backed repository for the exercise entities: lookups behind
/// topic derivation and the transactional mutations that produce commit
/// change sets.
#[derive(Clone)]
pub struct PostgresExerciseRepository {
    pool: PgPool,
}

impl PostgresExerciseRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct EvaluationRow {
    id: Uuid,
    name: String,
    scoring_model_id: Uuid,
    current_move_number: i64,
}

#[derive(Debug, FromRow)]
struct TeamRow {
    id: Uuid,
    evaluation_id: Uuid,
    team_type_id: Uuid,
    name: String,
}

#[derive(Debug, FromRow)]
struct TeamTypeRow {
    id: Uuid,
    name: String,
    show_type_average: bool,
}

#[derive(Debug, FromRow)]
struct TeamActionRow {
    id: Uuid,
    team_id: Uuid,
    move_number: i64,
    title: String,
    description: String,
}

#[derive(Debug, FromRow)]
struct TeamDutyRow {
    id: Uuid,
    team_id: Uuid,
    holder_user_id: Option<Uuid>,
    title: String,
}

#[derive(Debug, FromRow)]
struct ScoringModelRow {
    id: Uuid,
    name: String,
    equation: String,
}

#[derive(Debug, FromRow)]
struct ScoringCategoryRow {
    id: Uuid,
    scoring_model_id: Uuid,
    name: String,
    weight: f64,
}

#[derive(Debug, FromRow)]
struct ScoringOptionRow {
    id: Uuid,
    scoring_category_id: Uuid,
    name: String,
    value: f64,
}

#[derive(Debug, FromRow)]
struct SubmissionRow {
    id: Uuid,
    evaluation_id: Uuid,
    move_number: i64,
    scope_kind: String,
    scope_user_id: Option<Uuid>,
    scope_team_id: Option<Uuid>,
    score: f64,
    selections: Value,
}

#[derive(Debug, FromRow)]
struct EvaluationMembershipRow {
    evaluation_id: Uuid,
    principal_kind: String,
    principal_id: Uuid,
    role_id: Uuid,
}

#[derive(Debug, FromRow)]
struct TeamMembershipRow {
    team_id: Uuid,
    user_id: Uuid,
    role_id: Uuid,
}

fn evaluation_from_row(row: EvaluationRow) -> AppResult<Evaluation> {
    Ok(Evaluation {
        id: EvaluationId::from_uuid(row.id),
        name: row.name,
        scoring_model_id: ScoringModelId::from_uuid(row.scoring_model_id),
        current_move_number: move_number_from_column(row.current_move_number)?,
    })
}

fn team_from_row(row: TeamRow) -> Team {
    Team {
        id: TeamId::from_uuid(row.id),
        evaluation_id: EvaluationId::from_uuid(row.evaluation_id),
        team_type_id: TeamTypeId::from_uuid(row.team_type_id),
        name: row.name,
    }
}

fn team_type_from_row(row: TeamTypeRow) -> TeamType {
    TeamType {
        id: TeamTypeId::from_uuid(row.id),
        name: row.name,
        show_type_average: row.show_type_average,
    }
}

fn team_action_from_row(row: TeamActionRow) -> AppResult<TeamAction> {
    Ok(TeamAction {
        id: TeamActionId::from_uuid(row.id),
        team_id: TeamId::from_uuid(row.team_id),
        move_number: move_number_from_column(row.move_number)?,
        title: row.title,
        description: row.description,
    })
}

fn team_duty_from_row(row: TeamDutyRow) -> TeamDuty {
    TeamDuty {
        id: TeamDutyId::from_uuid(row.id),
        team_id: TeamId::from_uuid(row.team_id),
        holder_user_id: row.holder_user_id.map(UserId::from_uuid),
        title: row.title,
    }
}

fn scoring_model_from_row(row: ScoringModelRow) -> ScoringModel {
    ScoringModel {
        id: ScoringModelId::from_uuid(row.id),
        name: row.name,
        equation: row.equation,
    }
}

fn scoring_category_from_row(row: ScoringCategoryRow) -> ScoringCategory {
    ScoringCategory {
        id: ScoringCategoryId::from_uuid(row.id),
        scoring_model_id: ScoringModelId::from_uuid(row.scoring_model_id),
        name: row.name,
        weight: row.weight,
    }
}

fn scoring_option_from_row(row: ScoringOptionRow) -> ScoringOption {
    ScoringOption {
        id: ScoringOptionId::from_uuid(row.id),
        scoring_category_id: ScoringCategoryId::from_uuid(row.scoring_category_id),
        name: row.name,
        value: row.value,
    }
}

fn submission_from_row(row: SubmissionRow) -> AppResult<Submission> {
    let scope = match row.scope_kind.as_str() {
        "user" => {
            let user_id = row.scope_user_id.ok_or_else(|| {
                AppError::Internal("user-scoped submission row is missing scope_user_id".to_owned())
            })?;
            let team_id = row.scope_team_id.ok_or_else(|| {
                AppError::Internal("user-scoped submission row is missing scope_team_id".to_owned())
            })?;
            SubmissionScope::User {
                user_id: UserId::from_uuid(user_id),
                team_id: TeamId::from_uuid(team_id),
            }
        }
        "team" => {
            let team_id = row.scope_team_id.ok_or_else(|| {
                AppError::Internal("team-scoped submission row is missing scope_team_id".to_owned())
            })?;
            SubmissionScope::Team {
                team_id: TeamId::from_uuid(team_id),
            }
        }
        "evaluation_wide" => SubmissionScope::EvaluationWide,
        other => {
            return Err(AppError::Internal(format!(
                "unknown submission scope_kind '{other}'"
            )));
        }
    };

    Ok(Submission {
        id: SubmissionId::from_uuid(row.id),
        evaluation_id: EvaluationId::from_uuid(row.evaluation_id),
        move_number: move_number_from_column(row.move_number)?,
        scope,
        score: row.score,
        selections: serde_json::from_value(row.selections).map_err(|error| {
            AppError::Internal(format!("failed to decode submission selections: {error}"))
        })?,
    })
}

fn submission_scope_columns(scope: SubmissionScope) -> (&'static str, Option<Uuid>, Option<Uuid>) {
    match scope {
        SubmissionScope::User { user_id, team_id } => {
            ("user", Some(user_id.as_uuid()), Some(team_id.as_uuid()))
        }
        SubmissionScope::Team { team_id } => ("team", None, Some(team_id.as_uuid())),
        SubmissionScope::EvaluationWide => ("evaluation_wide", None, None),
    }
}

fn evaluation_membership_from_row(row: EvaluationMembershipRow) -> AppResult<EvaluationMembership> {
    Ok(EvaluationMembership {
        evaluation_id: EvaluationId::from_uuid(row.evaluation_id),
        principal: decode_principal(row.principal_kind.as_str(), row.principal_id)?,
        role_id: RoleId::from_uuid(row.role_id),
    })
}

fn team_membership_from_row(row: TeamMembershipRow) -> TeamMembership {
    TeamMembership {
        team_id: TeamId::from_uuid(row.team_id),
        user_id: UserId::from_uuid(row.user_id),
        role_id: RoleId::from_uuid(row.role_id),
    }
}

fn move_number_from_column(value: i64) -> AppResult<u32> {
    u32::try_from(value)
        .map_err(|error| AppError::Internal(format!("invalid move number in row: {error}")))
}
