use async_trait::async_trait;
use scorecast_core::{AppResult, EvaluationId, GroupId, ScoringModelId, TeamId, UserId};
use scorecast_domain::{EvaluationMembership, ScoringModelMembership, TeamMembership, User};

/// Repository port for membership and group lookups used by permission
/// resolution.
///
/// Implementations must serve the post-commit, durable view of the data:
/// resolution correctness depends on the current relational graph, never on
/// request-time caches. Deleted memberships must never be returned.
#[async_trait]
pub trait AccessRepository: Send + Sync {
    /// Returns one user by id.
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>>;

    /// Returns the ids of every group the user currently belongs to.
    /// Group expansion is one level only; nested groups are not followed.
    async fn group_ids_for_user(&self, user_id: UserId) -> AppResult<Vec<GroupId>>;

    /// Lists every membership row on one evaluation.
    async fn list_evaluation_memberships(
        &self,
        evaluation_id: EvaluationId,
    ) -> AppResult<Vec<EvaluationMembership>>;

    /// Lists every membership row on one scoring model.
    async fn list_scoring_model_memberships(
        &self,
        scoring_model_id: ScoringModelId,
    ) -> AppResult<Vec<ScoringModelMembership>>;

    /// Returns the user's membership on one team, if any. Team memberships
    /// are always direct; there is no group indirection to expand.
    async fn find_team_membership(
        &self,
        team_id: TeamId,
        user_id: UserId,
    ) -> AppResult<Option<TeamMembership>>;
}
