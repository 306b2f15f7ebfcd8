use async_trait::async_trait;

use scorecast_application::RelationLookupRepository;
use scorecast_core::{
    AppError, AppResult, EvaluationId, ScoringCategoryId, ScoringModelId, SubmissionId, TeamId,
    TeamTypeId,
};
use scorecast_domain::{
    Evaluation, ScoringCategory, ScoringCategoryTree, ScoringModelTree, ScoringOption,
    Submission, Team, TeamType,
};

use super::{
    EvaluationRow, PostgresExerciseRepository, ScoringCategoryRow, ScoringModelRow,
    ScoringOptionRow, SubmissionRow, TeamRow, TeamTypeRow, evaluation_from_row,
    scoring_category_from_row, scoring_model_from_row, scoring_option_from_row,
    submission_from_row, team_from_row, team_type_from_row,
};

#[async_trait]
impl RelationLookupRepository for PostgresExerciseRepository {
    async fn find_evaluation(&self, evaluation_id: EvaluationId)
    -> AppResult<Option<Evaluation>> {
        let row = sqlx::query_as::<_, EvaluationRow>(
            r#"
            SELECT id, name, scoring_model_id, current_move_number
            FROM evaluations
            WHERE id = $1
            "#,
        )
        .bind(evaluation_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load evaluation: {error}")))?;

        row.map(evaluation_from_row).transpose()
    }

    async fn find_team(&self, team_id: TeamId) -> AppResult<Option<Team>> {
        let row = sqlx::query_as::<_, TeamRow>(
            r#"
            SELECT id, evaluation_id, team_type_id, name
            FROM teams
            WHERE id = $1
            "#,
        )
        .bind(team_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load team: {error}")))?;

        Ok(row.map(team_from_row))
    }

    async fn find_team_type(&self, team_type_id: TeamTypeId) -> AppResult<Option<TeamType>> {
        let row = sqlx::query_as::<_, TeamTypeRow>(
            r#"
            SELECT id, name, show_type_average
            FROM team_types
            WHERE id = $1
            "#,
        )
        .bind(team_type_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load team type: {error}")))?;

        Ok(row.map(team_type_from_row))
    }

    async fn find_submission(
        &self,
        submission_id: SubmissionId,
    ) -> AppResult<Option<Submission>> {
        let row = sqlx::query_as::<_, SubmissionRow>(
            r#"
            SELECT id, evaluation_id, move_number, scope_kind, scope_user_id, scope_team_id,
                   score, selections
            FROM submissions
            WHERE id = $1
            "#,
        )
        .bind(submission_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load submission: {error}")))?;

        row.map(submission_from_row).transpose()
    }

    async fn find_scoring_category(
        &self,
        scoring_category_id: ScoringCategoryId,
    ) -> AppResult<Option<ScoringCategory>> {
        let row = sqlx::query_as::<_, ScoringCategoryRow>(
            r#"
            SELECT id, scoring_model_id, name, weight
            FROM scoring_categories
            WHERE id = $1
            "#,
        )
        .bind(scoring_category_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load scoring category: {error}"))
        })?;

        Ok(row.map(scoring_category_from_row))
    }

    async fn load_scoring_model_tree(
        &self,
        scoring_model_id: ScoringModelId,
    ) -> AppResult<Option<ScoringModelTree>> {
        let model_row = sqlx::query_as::<_, ScoringModelRow>(
            r#"
            SELECT id, name, equation
            FROM scoring_models
            WHERE id = $1
            "#,
        )
        .bind(scoring_model_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load scoring model: {error}")))?;

        let Some(model_row) = model_row else {
            return Ok(None);
        };

        let category_rows = sqlx::query_as::<_, ScoringCategoryRow>(
            r#"
            SELECT id, scoring_model_id, name, weight
            FROM scoring_categories
            WHERE scoring_model_id = $1
            ORDER BY name
            "#,
        )
        .bind(scoring_model_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load scoring categories: {error}"))
        })?;

        let option_rows = sqlx::query_as::<_, ScoringOptionRow>(
            r#"
            SELECT options.id, options.scoring_category_id, options.name, options.value
            FROM scoring_options AS options
            INNER JOIN scoring_categories AS categories
                ON categories.id = options.scoring_category_id
            WHERE categories.scoring_model_id = $1
            ORDER BY options.name
            "#,
        )
        .bind(scoring_model_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load scoring options: {error}"))
        })?;

        let options: Vec<ScoringOption> =
            option_rows.into_iter().map(scoring_option_from_row).collect();
        let categories = category_rows
            .into_iter()
            .map(scoring_category_from_row)
            .map(|category| {
                let listed = options
                    .iter()
                    .filter(|option| option.scoring_category_id == category.id)
                    .cloned()
                    .collect();
                ScoringCategoryTree {
                    category,
                    options: listed,
                }
            })
            .collect();

        Ok(Some(ScoringModelTree {
            model: scoring_model_from_row(model_row),
            categories,
        }))
    }

    async fn list_user_submissions_for_team(
        &self,
        team_id: TeamId,
        move_number: u32,
    ) -> AppResult<Vec<Submission>> {
        let rows = sqlx::query_as::<_, SubmissionRow>(
            r#"
            SELECT id, evaluation_id, move_number, scope_kind, scope_user_id, scope_team_id,
                   score, selections
            FROM submissions
            WHERE scope_kind = 'user' AND scope_team_id = $1 AND move_number = $2
            "#,
        )
        .bind(team_id.as_uuid())
        .bind(i64::from(move_number))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list user submissions: {error}"))
        })?;

        rows.into_iter().map(submission_from_row).collect()
    }

    async fn list_team_submissions_for_type(
        &self,
        evaluation_id: EvaluationId,
        team_type_id: TeamTypeId,
        move_number: u32,
    ) -> AppResult<Vec<Submission>> {
        let rows = sqlx::query_as::<_, SubmissionRow>(
            r#"
            SELECT submissions.id, submissions.evaluation_id, submissions.move_number,
                   submissions.scope_kind, submissions.scope_user_id, submissions.scope_team_id,
                   submissions.score, submissions.selections
            FROM submissions
            INNER JOIN teams ON teams.id = submissions.scope_team_id
            WHERE submissions.scope_kind = 'team'
              AND submissions.evaluation_id = $1
              AND teams.team_type_id = $2
              AND submissions.move_number = $3
            "#,
        )
        .bind(evaluation_id.as_uuid())
        .bind(team_type_id.as_uuid())
        .bind(i64::from(move_number))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list team submissions: {error}"))
        })?;

        rows.into_iter().map(submission_from_row).collect()
    }
}
