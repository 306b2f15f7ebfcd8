use async_trait::async_trait;

use scorecast_application::ExerciseRepository;
use scorecast_core::{AppError, AppResult, EvaluationId, SubmissionId, TeamId, UserId};
use scorecast_domain::{
    Change, CommitChangeSet, EntityChange, EvaluationMembership, PrincipalRef, ScoringOption,
    Submission, TeamAction, TeamDuty, TeamMembership,
};

use crate::postgres_access_repository::encode_principal;

use super::{
    EvaluationMembershipRow, EvaluationRow, PostgresExerciseRepository, ScoringOptionRow,
    SubmissionRow, TeamActionRow, TeamDutyRow, TeamMembershipRow, evaluation_from_row,
    evaluation_membership_from_row, scoring_option_from_row, submission_from_row,
    team_action_from_row, team_duty_from_row, team_membership_from_row,
};

#[async_trait]
impl ExerciseRepository for PostgresExerciseRepository {
    async fn upsert_submission(&self, submission: Submission) -> AppResult<CommitChangeSet> {
        let mut tx = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        let previous = sqlx::query_as::<_, SubmissionRow>(
            r#"
            SELECT id, evaluation_id, move_number, scope_kind, scope_user_id, scope_team_id,
                   score, selections
            FROM submissions
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(submission.id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load submission: {error}")))?
        .map(submission_from_row)
        .transpose()?;

        let (scope_kind, scope_user_id, scope_team_id) =
            super::submission_scope_columns(submission.scope);
        let selections = serde_json::to_value(&submission.selections).map_err(|error| {
            AppError::Internal(format!("failed to encode submission selections: {error}"))
        })?;

        sqlx::query(
            r#"
            INSERT INTO submissions (
                id, evaluation_id, move_number, scope_kind, scope_user_id, scope_team_id,
                score, selections
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id)
            DO UPDATE SET
                move_number = EXCLUDED.move_number,
                scope_kind = EXCLUDED.scope_kind,
                scope_user_id = EXCLUDED.scope_user_id,
                scope_team_id = EXCLUDED.scope_team_id,
                score = EXCLUDED.score,
                selections = EXCLUDED.selections
            "#,
        )
        .bind(submission.id.as_uuid())
        .bind(submission.evaluation_id.as_uuid())
        .bind(i64::from(submission.move_number))
        .bind(scope_kind)
        .bind(scope_user_id)
        .bind(scope_team_id)
        .bind(submission.score)
        .bind(selections)
        .execute(&mut *tx)
        .await
        .map_err(|error| AppError::Internal(format!("failed to save submission: {error}")))?;

        tx.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit submission: {error}"))
        })?;

        let change = match previous {
            None => Change::Created(submission),
            Some(previous) => Change::Updated {
                changed_fields: submission.changed_fields(&previous),
                entity: submission,
            },
        };
        Ok(CommitChangeSet::single(EntityChange::Submission(change)))
    }

    async fn delete_submission(&self, submission_id: SubmissionId) -> AppResult<CommitChangeSet> {
        let mut tx = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        let existing = sqlx::query_as::<_, SubmissionRow>(
            r#"
            SELECT id, evaluation_id, move_number, scope_kind, scope_user_id, scope_team_id,
                   score, selections
            FROM submissions
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(submission_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load submission: {error}")))?
        .ok_or_else(|| {
            AppError::NotFound(format!("submission '{submission_id}' does not exist"))
        })?;
        let snapshot = submission_from_row(existing)?;

        sqlx::query("DELETE FROM submissions WHERE id = $1")
            .bind(submission_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to delete submission: {error}"))
            })?;

        tx.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit submission delete: {error}"))
        })?;

        Ok(CommitChangeSet::single(EntityChange::Submission(
            Change::Deleted(snapshot),
        )))
    }

    async fn advance_move(&self, evaluation_id: EvaluationId) -> AppResult<CommitChangeSet> {
        let row = sqlx::query_as::<_, EvaluationRow>(
            r#"
            UPDATE evaluations
            SET current_move_number = current_move_number + 1
            WHERE id = $1
            RETURNING id, name, scoring_model_id, current_move_number
            "#,
        )
        .bind(evaluation_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to advance move: {error}")))?
        .ok_or_else(|| {
            AppError::NotFound(format!("evaluation '{evaluation_id}' does not exist"))
        })?;

        Ok(CommitChangeSet::single(EntityChange::Evaluation(
            Change::Updated {
                entity: evaluation_from_row(row)?,
                changed_fields: vec!["currentMoveNumber".to_owned()],
            },
        )))
    }

    async fn save_evaluation_membership(
        &self,
        membership: EvaluationMembership,
    ) -> AppResult<CommitChangeSet> {
        let (principal_kind, principal_id) = encode_principal(membership.principal);
        let mut tx = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        let previous = sqlx::query_as::<_, EvaluationMembershipRow>(
            r#"
            SELECT evaluation_id, principal_kind, principal_id, role_id
            FROM evaluation_memberships
            WHERE evaluation_id = $1 AND principal_kind = $2 AND principal_id = $3
            FOR UPDATE
            "#,
        )
        .bind(membership.evaluation_id.as_uuid())
        .bind(principal_kind)
        .bind(principal_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load evaluation membership: {error}"))
        })?
        .map(evaluation_membership_from_row)
        .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO evaluation_memberships (evaluation_id, principal_kind, principal_id, role_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (evaluation_id, principal_kind, principal_id)
            DO UPDATE SET role_id = EXCLUDED.role_id
            "#,
        )
        .bind(membership.evaluation_id.as_uuid())
        .bind(principal_kind)
        .bind(principal_id)
        .bind(membership.role_id.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to save evaluation membership: {error}"))
        })?;

        tx.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit membership: {error}"))
        })?;

        let change = match previous {
            None => Change::Created(membership),
            Some(previous) => Change::Updated {
                changed_fields: membership.changed_fields(&previous),
                entity: membership,
            },
        };
        Ok(CommitChangeSet::single(EntityChange::EvaluationMembership(
            change,
        )))
    }

    async fn remove_evaluation_membership(
        &self,
        evaluation_id: EvaluationId,
        principal: PrincipalRef,
    ) -> AppResult<CommitChangeSet> {
        let (principal_kind, principal_id) = encode_principal(principal);
        let mut tx = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        let existing = sqlx::query_as::<_, EvaluationMembershipRow>(
            r#"
            SELECT evaluation_id, principal_kind, principal_id, role_id
            FROM evaluation_memberships
            WHERE evaluation_id = $1 AND principal_kind = $2 AND principal_id = $3
            FOR UPDATE
            "#,
        )
        .bind(evaluation_id.as_uuid())
        .bind(principal_kind)
        .bind(principal_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load evaluation membership: {error}"))
        })?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "no membership on evaluation '{evaluation_id}' for that principal"
            ))
        })?;
        let snapshot = evaluation_membership_from_row(existing)?;

        sqlx::query(
            r#"
            DELETE FROM evaluation_memberships
            WHERE evaluation_id = $1 AND principal_kind = $2 AND principal_id = $3
            "#,
        )
        .bind(evaluation_id.as_uuid())
        .bind(principal_kind)
        .bind(principal_id)
        .execute(&mut *tx)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to delete evaluation membership: {error}"))
        })?;

        tx.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit membership delete: {error}"))
        })?;

        Ok(CommitChangeSet::single(EntityChange::EvaluationMembership(
            Change::Deleted(snapshot),
        )))
    }

    async fn save_team_membership(
        &self,
        membership: TeamMembership,
    ) -> AppResult<CommitChangeSet> {
        let mut tx = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        let previous = sqlx::query_as::<_, TeamMembershipRow>(
            r#"
            SELECT team_id, user_id, role_id
            FROM team_memberships
            WHERE team_id = $1 AND user_id = $2
            FOR UPDATE
            "#,
        )
        .bind(membership.team_id.as_uuid())
        .bind(membership.user_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load team membership: {error}"))
        })?
        .map(team_membership_from_row);

        sqlx::query(
            r#"
            INSERT INTO team_memberships (team_id, user_id, role_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (team_id, user_id)
            DO UPDATE SET role_id = EXCLUDED.role_id
            "#,
        )
        .bind(membership.team_id.as_uuid())
        .bind(membership.user_id.as_uuid())
        .bind(membership.role_id.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to save team membership: {error}"))
        })?;

        tx.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit membership: {error}"))
        })?;

        let change = match previous {
            None => Change::Created(membership),
            Some(previous) => Change::Updated {
                changed_fields: membership.changed_fields(&previous),
                entity: membership,
            },
        };
        Ok(CommitChangeSet::single(EntityChange::TeamMembership(change)))
    }

    async fn remove_team_membership(
        &self,
        team_id: TeamId,
        user_id: UserId,
    ) -> AppResult<CommitChangeSet> {
        let mut tx = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        let existing = sqlx::query_as::<_, TeamMembershipRow>(
            r#"
            SELECT team_id, user_id, role_id
            FROM team_memberships
            WHERE team_id = $1 AND user_id = $2
            FOR UPDATE
            "#,
        )
        .bind(team_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load team membership: {error}"))
        })?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "user '{user_id}' has no membership on team '{team_id}'"
            ))
        })?;
        let snapshot = team_membership_from_row(existing);

        sqlx::query("DELETE FROM team_memberships WHERE team_id = $1 AND user_id = $2")
            .bind(team_id.as_uuid())
            .bind(user_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to delete team membership: {error}"))
            })?;

        tx.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit membership delete: {error}"))
        })?;

        Ok(CommitChangeSet::single(EntityChange::TeamMembership(
            Change::Deleted(snapshot),
        )))
    }

    async fn save_scoring_option(&self, option: ScoringOption) -> AppResult<CommitChangeSet> {
        let mut tx = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        let previous = sqlx::query_as::<_, ScoringOptionRow>(
            r#"
            SELECT id, scoring_category_id, name, value
            FROM scoring_options
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(option.id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load scoring option: {error}"))
        })?
        .map(scoring_option_from_row);

        sqlx::query(
            r#"
            INSERT INTO scoring_options (id, scoring_category_id, name, value)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id)
            DO UPDATE SET
                scoring_category_id = EXCLUDED.scoring_category_id,
                name = EXCLUDED.name,
                value = EXCLUDED.value
            "#,
        )
        .bind(option.id.as_uuid())
        .bind(option.scoring_category_id.as_uuid())
        .bind(option.name.as_str())
        .bind(option.value)
        .execute(&mut *tx)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to save scoring option: {error}"))
        })?;

        tx.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit scoring option: {error}"))
        })?;

        let change = match previous {
            None => Change::Created(option),
            Some(previous) => Change::Updated {
                changed_fields: option.changed_fields(&previous),
                entity: option,
            },
        };
        Ok(CommitChangeSet::single(EntityChange::ScoringOption(change)))
    }

    async fn save_team_action(&self, action: TeamAction) -> AppResult<CommitChangeSet> {
        let mut tx = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        let previous = sqlx::query_as::<_, TeamActionRow>(
            r#"
            SELECT id, team_id, move_number, title, description
            FROM team_actions
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(action.id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load team action: {error}")))?
        .map(team_action_from_row)
        .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO team_actions (id, team_id, move_number, title, description)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id)
            DO UPDATE SET
                team_id = EXCLUDED.team_id,
                move_number = EXCLUDED.move_number,
                title = EXCLUDED.title,
                description = EXCLUDED.description
            "#,
        )
        .bind(action.id.as_uuid())
        .bind(action.team_id.as_uuid())
        .bind(i64::from(action.move_number))
        .bind(action.title.as_str())
        .bind(action.description.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|error| AppError::Internal(format!("failed to save team action: {error}")))?;

        tx.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit team action: {error}"))
        })?;

        let change = match previous {
            None => Change::Created(action),
            Some(previous) => Change::Updated {
                changed_fields: action.changed_fields(&previous),
                entity: action,
            },
        };
        Ok(CommitChangeSet::single(EntityChange::TeamAction(change)))
    }

    async fn save_team_duty(&self, duty: TeamDuty) -> AppResult<CommitChangeSet> {
        let mut tx = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        let previous = sqlx::query_as::<_, TeamDutyRow>(
            r#"
            SELECT id, team_id, holder_user_id, title
            FROM team_duties
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(duty.id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load team duty: {error}")))?
        .map(team_duty_from_row);

        sqlx::query(
            r#"
            INSERT INTO team_duties (id, team_id, holder_user_id, title)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id)
            DO UPDATE SET
                team_id = EXCLUDED.team_id,
                holder_user_id = EXCLUDED.holder_user_id,
                title = EXCLUDED.title
            "#,
        )
        .bind(duty.id.as_uuid())
        .bind(duty.team_id.as_uuid())
        .bind(duty.holder_user_id.map(|id| id.as_uuid()))
        .bind(duty.title.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|error| AppError::Internal(format!("failed to save team duty: {error}")))?;

        tx.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit team duty: {error}"))
        })?;

        let change = match previous {
            None => Change::Created(duty),
            Some(previous) => Change::Updated {
                changed_fields: duty.changed_fields(&previous),
                entity: duty,
            },
        };
        Ok(CommitChangeSet::single(EntityChange::TeamDuty(change)))
    }
}
