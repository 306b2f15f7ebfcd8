use std::sync::Arc;

use scorecast_core::{
    AppError, AppResult, EvaluationId, NonEmptyString, Principal, SubmissionId, TeamId, UserId,
};
use scorecast_domain::{
    AccessRequest, EvaluationMembership, EvaluationPermission, PrincipalRef, ScoringModelPermission,
    ScoringOption, Submission, SubmissionScope, TeamAction, TeamDuty, TeamMembership,
    TeamPermission,
};
use tracing::info;

use crate::access_service::AccessService;
use crate::change_bus::ChangeBus;
use crate::store_ports::{ExerciseRepository, RelationLookupRepository};


/// Application service driving every write of the exercise core.
///
/// Each mutation follows the same shape: gate the request through the
/// authorization service, commit through the store, then hand the commit's
/// change set to the bus. Nothing is published for a rejected or failed
/// commit.
#[derive(Clone)]
pub struct ExerciseService {
    access: AccessService,
    lookups: Arc<dyn RelationLookupRepository>,
    repository: Arc<dyn ExerciseRepository>,
    bus: ChangeBus,
}

impl ExerciseService {
    /// Creates an exercise service.
    #[must_use]
    pub fn new(
        access: AccessService,
        lookups: Arc<dyn RelationLookupRepository>,
        repository: Arc<dyn ExerciseRepository>,
        bus: ChangeBus,
    ) -> Self {
        Self {
            access,
            lookups,
            repository,
            bus,
        }
    }

    /// Creates or updates a submission on behalf of the acting principal.
    pub async fn upsert_submission(
        &self,
        principal: &Principal,
        submission: Submission,
    ) -> AppResult<()> {
        self.gate_submission(principal, &submission).await?;

        let change_set = self.repository.upsert_submission(submission).await?;
        self.bus.publish(change_set)
    }

    /// Deletes a submission. The gate applies to the stored submission's
    /// scope, not to anything the caller claims about it.
    pub async fn delete_submission(
        &self,
        principal: &Principal,
        submission_id: SubmissionId,
    ) -> AppResult<()> {
        let submission = self
            .lookups
            .find_submission(submission_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("submission '{submission_id}' does not exist"))
            })?;
        self.gate_submission(principal, &submission).await?;

        let change_set = self.repository.delete_submission(submission_id).await?;
        self.bus.publish(change_set)
    }

    /// Advances an evaluation to its next move, opening the previous move's
    /// withheld evaluation-wide scores to every evaluation subscriber.
    pub async fn advance_move(
        &self,
        principal: &Principal,
        evaluation_id: EvaluationId,
    ) -> AppResult<()> {
        self.access
            .require_permission(
                principal.user_id(),
                AccessRequest::Evaluation(evaluation_id, EvaluationPermission::AdvanceMove),
            )
            .await?;

        let change_set = self.repository.advance_move(evaluation_id).await?;
        info!(evaluation_id = %evaluation_id, "evaluation move advanced");
        self.bus.publish(change_set)
    }

    /// Grants or changes a principal's role on an evaluation.
    pub async fn save_evaluation_membership(
        &self,
        principal: &Principal,
        membership: EvaluationMembership,
    ) -> AppResult<()> {
        self.access
            .require_permission(
                principal.user_id(),
                AccessRequest::Evaluation(
                    membership.evaluation_id,
                    EvaluationPermission::ManageEvaluationUsers,
                ),
            )
            .await?;

        let change_set = self.repository.save_evaluation_membership(membership).await?;
        self.bus.publish(change_set)
    }

    /// Revokes a principal's role on an evaluation.
    pub async fn remove_evaluation_membership(
        &self,
        principal: &Principal,
        evaluation_id: EvaluationId,
        member: PrincipalRef,
    ) -> AppResult<()> {
        self.access
            .require_permission(
                principal.user_id(),
                AccessRequest::Evaluation(
                    evaluation_id,
                    EvaluationPermission::ManageEvaluationUsers,
                ),
            )
            .await?;

        let change_set = self
            .repository
            .remove_evaluation_membership(evaluation_id, member)
            .await?;
        self.bus.publish(change_set)
    }

    /// Grants or changes a user's role on a team. Allowed for team-level
    /// user managers and for evaluation-level team managers, so a fresh
    /// team's first member can be added by the evaluation facilitator.
    pub async fn save_team_membership(
        &self,
        principal: &Principal,
        membership: TeamMembership,
    ) -> AppResult<()> {
        self.gate_team_management(principal, membership.team_id)
            .await?;

        let change_set = self.repository.save_team_membership(membership).await?;
        self.bus.publish(change_set)
    }

    /// Revokes a user's role on a team.
    pub async fn remove_team_membership(
        &self,
        principal: &Principal,
        team_id: TeamId,
        user_id: UserId,
    ) -> AppResult<()> {
        self.gate_team_management(principal, team_id).await?;

        let change_set = self
            .repository
            .remove_team_membership(team_id, user_id)
            .await?;
        self.bus.publish(change_set)
    }

    /// Creates or updates a scoring option. Editing is gated on the owning
    /// model, resolved through the option's category.
    pub async fn save_scoring_option(
        &self,
        principal: &Principal,
        option: ScoringOption,
    ) -> AppResult<()> {
        NonEmptyString::new(option.name.as_str())
            .map_err(|_| AppError::Validation("scoring option name must not be empty".to_owned()))?;
        let category = self
            .lookups
            .find_scoring_category(option.scoring_category_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "scoring category '{}' does not exist",
                    option.scoring_category_id
                ))
            })?;
        self.access
            .require_permission(
                principal.user_id(),
                AccessRequest::ScoringModel(
                    category.scoring_model_id,
                    ScoringModelPermission::EditScoringModel,
                ),
            )
            .await?;

        let change_set = self.repository.save_scoring_option(option).await?;
        self.bus.publish(change_set)
    }

    /// Records or updates an action on a team's log for a move.
    pub async fn save_team_action(
        &self,
        principal: &Principal,
        action: TeamAction,
    ) -> AppResult<()> {
        self.access
            .require_permission(
                principal.user_id(),
                AccessRequest::Team(action.team_id, TeamPermission::EditTeam),
            )
            .await?;

        let change_set = self.repository.save_team_action(action).await?;
        self.bus.publish(change_set)
    }

    /// Creates a duty on a team or reassigns its holder.
    pub async fn save_team_duty(&self, principal: &Principal, duty: TeamDuty) -> AppResult<()> {
        self.access
            .require_permission(
                principal.user_id(),
                AccessRequest::Team(duty.team_id, TeamPermission::EditTeam),
            )
            .await?;

        let change_set = self.repository.save_team_duty(duty).await?;
        self.bus.publish(change_set)
    }

    /// Gates one submission write by its scope. User-scoped submissions can
    /// only be written by the scoped user themselves.
    async fn gate_submission(
        &self,
        principal: &Principal,
        submission: &Submission,
    ) -> AppResult<()> {
        let actor = principal.user_id();
        match submission.scope {
            SubmissionScope::User { user_id, team_id } => {
                if user_id != actor {
                    return Err(AppError::Forbidden(format!(
                        "user '{actor}' cannot write another user's submission"
                    )));
                }
                self.access
                    .require_permission(
                        actor,
                        AccessRequest::Team(team_id, TeamPermission::SubmitScores),
                    )
                    .await
            }
            SubmissionScope::Team { team_id } => {
                self.access
                    .require_permission(
                        actor,
                        AccessRequest::Team(team_id, TeamPermission::SubmitScores),
                    )
                    .await
            }
            SubmissionScope::EvaluationWide => {
                self.access
                    .require_permission(
                        actor,
                        AccessRequest::Evaluation(
                            submission.evaluation_id,
                            EvaluationPermission::EditEvaluation,
                        ),
                    )
                    .await
            }
        }
    }

    async fn gate_team_management(
        &self,
        principal: &Principal,
        team_id: TeamId,
    ) -> AppResult<()> {
        let actor = principal.user_id();
        if self
            .access
            .authorize(
                actor,
                AccessRequest::Team(team_id, TeamPermission::ManageTeamUsers),
            )
            .await
        {
            return Ok(());
        }

        let team = self
            .lookups
            .find_team(team_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("team '{team_id}' does not exist")))?;
        self.access
            .require_permission(
                actor,
                AccessRequest::Evaluation(team.evaluation_id, EvaluationPermission::ManageTeams),
            )
            .await
    }
}
