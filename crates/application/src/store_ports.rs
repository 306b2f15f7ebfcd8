use async_trait::async_trait;

use scorecast_core::{
    AppResult, EvaluationId, ScoringCategoryId, ScoringModelId, SubmissionId, TeamId, TeamTypeId,
    UserId,
};
use scorecast_domain::{
    CommitChangeSet, Evaluation, EvaluationMembership, PrincipalRef, ScoringCategory,
    ScoringModelTree, ScoringOption, Submission, Team, TeamAction, TeamDuty, TeamMembership,
    TeamType,
};

/// Repository port for the direct relational lookups topic derivation and
/// average projection depend on.
///
/// Each deriver states its data dependencies through these explicit queries
/// instead of assuming a pre-loaded object graph. Implementations must serve
/// the post-commit, durable view of the data.
#[async_trait]
pub trait RelationLookupRepository: Send + Sync {
    /// Returns one evaluation by id.
    async fn find_evaluation(&self, evaluation_id: EvaluationId)
    -> AppResult<Option<Evaluation>>;

    /// Returns one team by id.
    async fn find_team(&self, team_id: TeamId) -> AppResult<Option<Team>>;

    /// Returns one team type by id.
    async fn find_team_type(&self, team_type_id: TeamTypeId) -> AppResult<Option<TeamType>>;

    /// Returns one submission by id.
    async fn find_submission(&self, submission_id: SubmissionId)
    -> AppResult<Option<Submission>>;

    /// Returns one scoring category by id.
    async fn find_scoring_category(
        &self,
        scoring_category_id: ScoringCategoryId,
    ) -> AppResult<Option<ScoringCategory>>;

    /// Loads one scoring model with every nested category and option, the
    /// shape republished on any change below the model.
    async fn load_scoring_model_tree(
        &self,
        scoring_model_id: ScoringModelId,
    ) -> AppResult<Option<ScoringModelTree>>;

    /// Lists one team's user-scoped submissions for one move.
    async fn list_user_submissions_for_team(
        &self,
        team_id: TeamId,
        move_number: u32,
    ) -> AppResult<Vec<Submission>>;

    /// Lists the team-scoped submissions of every team of one type within an
    /// evaluation, for one move.
    async fn list_team_submissions_for_type(
        &self,
        evaluation_id: EvaluationId,
        team_type_id: TeamTypeId,
        move_number: u32,
    ) -> AppResult<Vec<Submission>>;
}

/// Repository port for the mutations this core drives through storage.
///
/// Every mutation commits transactionally and returns the typed change set
/// for that commit, one change per affected row; the caller hands the set to
/// the change bus once the commit is durable.
#[async_trait]
pub trait ExerciseRepository: Send + Sync {
    /// Inserts or updates a submission.
    async fn upsert_submission(&self, submission: Submission) -> AppResult<CommitChangeSet>;

    /// Deletes a submission. The change set carries the pre-deletion
    /// snapshot.
    async fn delete_submission(&self, submission_id: SubmissionId) -> AppResult<CommitChangeSet>;

    /// Increments an evaluation's current move number.
    async fn advance_move(&self, evaluation_id: EvaluationId) -> AppResult<CommitChangeSet>;

    /// Inserts a membership row, or updates the role on the existing row for
    /// the same `(resource, principal)` pair. Role changes are updates, not
    /// delete-and-insert.
    async fn save_evaluation_membership(
        &self,
        membership: EvaluationMembership,
    ) -> AppResult<CommitChangeSet>;

    /// Removes a membership row.
    async fn remove_evaluation_membership(
        &self,
        evaluation_id: EvaluationId,
        principal: PrincipalRef,
    ) -> AppResult<CommitChangeSet>;

    /// Inserts a team membership row, or updates the role on the existing
    /// row for the same `(team, user)` pair.
    async fn save_team_membership(
        &self,
        membership: TeamMembership,
    ) -> AppResult<CommitChangeSet>;

    /// Removes a team membership row.
    async fn remove_team_membership(
        &self,
        team_id: TeamId,
        user_id: UserId,
    ) -> AppResult<CommitChangeSet>;

    /// Inserts or updates a scoring option.
    async fn save_scoring_option(&self, option: ScoringOption) -> AppResult<CommitChangeSet>;

    /// Inserts or updates a team action.
    async fn save_team_action(&self, action: TeamAction) -> AppResult<CommitChangeSet>;

    /// Inserts or updates a team duty.
    async fn save_team_duty(&self, duty: TeamDuty) -> AppResult<CommitChangeSet>;
}
