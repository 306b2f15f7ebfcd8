use std::collections::HashMap;

use async_trait::async_trait;

use scorecast_application::{AccessRepository, ExerciseRepository, RelationLookupRepository};
use scorecast_core::{
    AppError, AppResult, EvaluationId, GroupId, ScoringCategoryId, ScoringModelId,
    ScoringOptionId, SubmissionId, TeamActionId, TeamDutyId, TeamId, TeamTypeId, UserId,
};
use scorecast_domain::{
    Change, CommitChangeSet, EntityChange, Evaluation, EvaluationMembership, Group,
    GroupMembership, PrincipalRef, ScoringCategory, ScoringCategoryTree, ScoringModel,
    ScoringModelMembership, ScoringModelTree, ScoringOption, Submission, SubmissionScope, Team,
    TeamAction, TeamDuty, TeamMembership, TeamType, User,
};
use tokio::sync::RwLock;

/// In-memory implementation of every store port, for tests and local
/// development without a database.
///
/// One struct backs all three ports because the lookup and mutation ports
/// interlock on the same rows; splitting the state would force the fakes out
/// of sync.
#[derive(Debug, Default)]
pub struct InMemoryExerciseStore {
    users: RwLock<HashMap<UserId, User>>,
    groups: RwLock<HashMap<GroupId, Group>>,
    group_memberships: RwLock<Vec<GroupMembership>>,
    evaluations: RwLock<HashMap<EvaluationId, Evaluation>>,
    team_types: RwLock<HashMap<TeamTypeId, TeamType>>,
    teams: RwLock<HashMap<TeamId, Team>>,
    team_actions: RwLock<HashMap<TeamActionId, TeamAction>>,
    team_duties: RwLock<HashMap<TeamDutyId, TeamDuty>>,
    scoring_models: RwLock<HashMap<ScoringModelId, ScoringModel>>,
    scoring_categories: RwLock<HashMap<ScoringCategoryId, ScoringCategory>>,
    scoring_options: RwLock<HashMap<ScoringOptionId, ScoringOption>>,
    submissions: RwLock<HashMap<SubmissionId, Submission>>,
    evaluation_memberships: RwLock<HashMap<(EvaluationId, PrincipalRef), EvaluationMembership>>,
    scoring_model_memberships:
        RwLock<HashMap<(ScoringModelId, PrincipalRef), ScoringModelMembership>>,
    team_memberships: RwLock<HashMap<(TeamId, UserId), TeamMembership>>,
}

impl InMemoryExerciseStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a user.
    pub async fn insert_user(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }

    /// Seeds a group.
    pub async fn insert_group(&self, group: Group) {
        self.groups.write().await.insert(group.id, group);
    }

    /// Seeds one user's group membership.
    pub async fn insert_group_membership(&self, membership: GroupMembership) {
        self.group_memberships.write().await.push(membership);
    }

    /// Seeds an evaluation.
    pub async fn insert_evaluation(&self, evaluation: Evaluation) {
        self.evaluations
            .write()
            .await
            .insert(evaluation.id, evaluation);
    }

    /// Seeds a team type.
    pub async fn insert_team_type(&self, team_type: TeamType) {
        self.team_types
            .write()
            .await
            .insert(team_type.id, team_type);
    }

    /// Seeds a team.
    pub async fn insert_team(&self, team: Team) {
        self.teams.write().await.insert(team.id, team);
    }

    /// Seeds a scoring model row.
    pub async fn insert_scoring_model(&self, model: ScoringModel) {
        self.scoring_models.write().await.insert(model.id, model);
    }

    /// Seeds a scoring category row.
    pub async fn insert_scoring_category(&self, category: ScoringCategory) {
        self.scoring_categories
            .write()
            .await
            .insert(category.id, category);
    }

    /// Seeds a scoring model membership without going through a commit.
    pub async fn insert_scoring_model_membership(&self, membership: ScoringModelMembership) {
        self.scoring_model_memberships
            .write()
            .await
            .insert((membership.scoring_model_id, membership.principal), membership);
    }
}

#[async_trait]
impl AccessRepository for InMemoryExerciseStore {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn group_ids_for_user(&self, user_id: UserId) -> AppResult<Vec<GroupId>> {
        Ok(self
            .group_memberships
            .read()
            .await
            .iter()
            .filter(|membership| membership.user_id == user_id)
            .map(|membership| membership.group_id)
            .collect())
    }

    async fn list_evaluation_memberships(
        &self,
        evaluation_id: EvaluationId,
    ) -> AppResult<Vec<EvaluationMembership>> {
        Ok(self
            .evaluation_memberships
            .read()
            .await
            .values()
            .filter(|membership| membership.evaluation_id == evaluation_id)
            .cloned()
            .collect())
    }

    async fn list_scoring_model_memberships(
        &self,
        scoring_model_id: ScoringModelId,
    ) -> AppResult<Vec<ScoringModelMembership>> {
        Ok(self
            .scoring_model_memberships
            .read()
            .await
            .values()
            .filter(|membership| membership.scoring_model_id == scoring_model_id)
            .cloned()
            .collect())
    }

    async fn find_team_membership(
        &self,
        team_id: TeamId,
        user_id: UserId,
    ) -> AppResult<Option<TeamMembership>> {
        Ok(self
            .team_memberships
            .read()
            .await
            .get(&(team_id, user_id))
            .cloned())
    }
}

#[async_trait]
impl RelationLookupRepository for InMemoryExerciseStore {
    async fn find_evaluation(&self, evaluation_id: EvaluationId)
    -> AppResult<Option<Evaluation>> {
        Ok(self.evaluations.read().await.get(&evaluation_id).cloned())
    }

    async fn find_team(&self, team_id: TeamId) -> AppResult<Option<Team>> {
        Ok(self.teams.read().await.get(&team_id).cloned())
    }

    async fn find_team_type(&self, team_type_id: TeamTypeId) -> AppResult<Option<TeamType>> {
        Ok(self.team_types.read().await.get(&team_type_id).cloned())
    }

    async fn find_submission(
        &self,
        submission_id: SubmissionId,
    ) -> AppResult<Option<Submission>> {
        Ok(self.submissions.read().await.get(&submission_id).cloned())
    }

    async fn find_scoring_category(
        &self,
        scoring_category_id: ScoringCategoryId,
    ) -> AppResult<Option<ScoringCategory>> {
        Ok(self
            .scoring_categories
            .read()
            .await
            .get(&scoring_category_id)
            .cloned())
    }

    async fn load_scoring_model_tree(
        &self,
        scoring_model_id: ScoringModelId,
    ) -> AppResult<Option<ScoringModelTree>> {
        let Some(model) = self.scoring_models.read().await.get(&scoring_model_id).cloned()
        else {
            return Ok(None);
        };

        let categories = self.scoring_categories.read().await;
        let options = self.scoring_options.read().await;

        let mut category_trees: Vec<ScoringCategoryTree> = categories
            .values()
            .filter(|category| category.scoring_model_id == scoring_model_id)
            .map(|category| {
                let mut listed: Vec<ScoringOption> = options
                    .values()
                    .filter(|option| option.scoring_category_id == category.id)
                    .cloned()
                    .collect();
                listed.sort_by(|left, right| left.name.cmp(&right.name));
                ScoringCategoryTree {
                    category: category.clone(),
                    options: listed,
                }
            })
            .collect();
        category_trees.sort_by(|left, right| left.category.name.cmp(&right.category.name));

        Ok(Some(ScoringModelTree {
            model,
            categories: category_trees,
        }))
    }

    async fn list_user_submissions_for_team(
        &self,
        team_id: TeamId,
        move_number: u32,
    ) -> AppResult<Vec<Submission>> {
        Ok(self
            .submissions
            .read()
            .await
            .values()
            .filter(|submission| {
                submission.move_number == move_number
                    && matches!(
                        submission.scope,
                        SubmissionScope::User { team_id: owner, .. } if owner == team_id
                    )
            })
            .cloned()
            .collect())
    }

    async fn list_team_submissions_for_type(
        &self,
        evaluation_id: EvaluationId,
        team_type_id: TeamTypeId,
        move_number: u32,
    ) -> AppResult<Vec<Submission>> {
        let teams = self.teams.read().await;
        Ok(self
            .submissions
            .read()
            .await
            .values()
            .filter(|submission| {
                submission.evaluation_id == evaluation_id
                    && submission.move_number == move_number
                    && match submission.scope {
                        SubmissionScope::Team { team_id } => teams
                            .get(&team_id)
                            .map(|team| team.team_type_id == team_type_id)
                            .unwrap_or(false),
                        _ => false,
                    }
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ExerciseRepository for InMemoryExerciseStore {
    async fn upsert_submission(&self, submission: Submission) -> AppResult<CommitChangeSet> {
        let previous = self
            .submissions
            .write()
            .await
            .insert(submission.id, submission.clone());

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
        let removed = self
            .submissions
            .write()
            .await
            .remove(&submission_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("submission '{submission_id}' does not exist"))
            })?;

        Ok(CommitChangeSet::single(EntityChange::Submission(
            Change::Deleted(removed),
        )))
    }

    async fn advance_move(&self, evaluation_id: EvaluationId) -> AppResult<CommitChangeSet> {
        let mut evaluations = self.evaluations.write().await;
        let evaluation = evaluations.get_mut(&evaluation_id).ok_or_else(|| {
            AppError::NotFound(format!("evaluation '{evaluation_id}' does not exist"))
        })?;

        evaluation.current_move_number += 1;
        Ok(CommitChangeSet::single(EntityChange::Evaluation(
            Change::Updated {
                entity: evaluation.clone(),
                changed_fields: vec!["currentMoveNumber".to_owned()],
            },
        )))
    }

    async fn save_evaluation_membership(
        &self,
        membership: EvaluationMembership,
    ) -> AppResult<CommitChangeSet> {
        let key = (membership.evaluation_id, membership.principal);
        let previous = self
            .evaluation_memberships
            .write()
            .await
            .insert(key, membership.clone());

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
        let removed = self
            .evaluation_memberships
            .write()
            .await
            .remove(&(evaluation_id, principal))
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "no membership on evaluation '{evaluation_id}' for that principal"
                ))
            })?;

        Ok(CommitChangeSet::single(EntityChange::EvaluationMembership(
            Change::Deleted(removed),
        )))
    }

    async fn save_team_membership(
        &self,
        membership: TeamMembership,
    ) -> AppResult<CommitChangeSet> {
        let key = (membership.team_id, membership.user_id);
        let previous = self
            .team_memberships
            .write()
            .await
            .insert(key, membership.clone());

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
        let removed = self
            .team_memberships
            .write()
            .await
            .remove(&(team_id, user_id))
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "user '{user_id}' has no membership on team '{team_id}'"
                ))
            })?;

        Ok(CommitChangeSet::single(EntityChange::TeamMembership(
            Change::Deleted(removed),
        )))
    }

    async fn save_scoring_option(&self, option: ScoringOption) -> AppResult<CommitChangeSet> {
        let previous = self
            .scoring_options
            .write()
            .await
            .insert(option.id, option.clone());

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
        let previous = self
            .team_actions
            .write()
            .await
            .insert(action.id, action.clone());

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
        let previous = self.team_duties.write().await.insert(duty.id, duty.clone());

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

#[cfg(test)]
mod tests {
    use scorecast_application::{ExerciseRepository, RelationLookupRepository};
    use scorecast_core::{EvaluationId, ScoringModelId, SubmissionId, TeamId, UserId};
    use scorecast_domain::{
        ChangeKind, CommitChangeSet, EntityChange, Evaluation, ScoringCategory, ScoringModel,
        ScoringOption, Submission, SubmissionScope,
    };

    use super::InMemoryExerciseStore;

    fn submission() -> Submission {
        Submission {
            id: SubmissionId::new(),
            evaluation_id: EvaluationId::new(),
            move_number: 1,
            scope: SubmissionScope::User {
                user_id: UserId::new(),
                team_id: TeamId::new(),
            },
            score: 42.0,
            selections: Vec::new(),
        }
    }

    fn single_change(change_set: &CommitChangeSet) -> &EntityChange {
        let [change] = change_set.changes.as_slice() else {
            panic!("expected exactly one change, got {}", change_set.changes.len());
        };
        change
    }

    #[tokio::test]
    async fn upsert_reports_created_then_updated_with_diff() {
        let store = InMemoryExerciseStore::new();
        let submission = submission();

        let created = store.upsert_submission(submission.clone()).await;
        assert!(created.is_ok());
        let created = created.unwrap_or_default();
        assert_eq!(single_change(&created).kind(), ChangeKind::Created);

        let mut updated = submission;
        updated.score = 55.0;
        let change_set = store.upsert_submission(updated).await;
        assert!(change_set.is_ok());
        let change_set = change_set.unwrap_or_default();
        let change = single_change(&change_set);
        assert_eq!(change.kind(), ChangeKind::Updated);
        assert_eq!(change.changed_fields(), ["score".to_owned()]);
    }

    #[tokio::test]
    async fn delete_carries_the_pre_deletion_snapshot() {
        let store = InMemoryExerciseStore::new();
        let submission = submission();
        assert!(store.upsert_submission(submission.clone()).await.is_ok());

        let change_set = store.delete_submission(submission.id).await;
        assert!(change_set.is_ok());
        let change_set = change_set.unwrap_or_default();
        let EntityChange::Submission(change) = single_change(&change_set) else {
            panic!("expected a submission change");
        };
        assert_eq!(change.kind(), ChangeKind::Deleted);
        assert_eq!(change.entity(), &submission);

        assert!(store.delete_submission(submission.id).await.is_err());
    }

    #[tokio::test]
    async fn advance_move_increments_and_reports_the_field() {
        let store = InMemoryExerciseStore::new();
        let evaluation = Evaluation {
            id: EvaluationId::new(),
            name: "Exercise".to_owned(),
            scoring_model_id: ScoringModelId::new(),
            current_move_number: 3,
        };
        store.insert_evaluation(evaluation.clone()).await;

        let change_set = store.advance_move(evaluation.id).await;
        assert!(change_set.is_ok());

        let reloaded = store.find_evaluation(evaluation.id).await;
        assert!(reloaded.is_ok());
        let Ok(Some(reloaded)) = reloaded else {
            panic!("evaluation vanished");
        };
        assert_eq!(reloaded.current_move_number, 4);
    }

    #[tokio::test]
    async fn model_tree_assembles_nested_categories_and_options() {
        let store = InMemoryExerciseStore::new();
        let model = ScoringModel {
            id: ScoringModelId::new(),
            name: "Readiness".to_owned(),
            equation: "sum(categories)".to_owned(),
        };
        let category = ScoringCategory {
            id: scorecast_core::ScoringCategoryId::new(),
            scoring_model_id: model.id,
            name: "Response".to_owned(),
            weight: 1.0,
        };
        let option = ScoringOption {
            id: scorecast_core::ScoringOptionId::new(),
            scoring_category_id: category.id,
            name: "Contained".to_owned(),
            value: 5.0,
        };
        store.insert_scoring_model(model.clone()).await;
        store.insert_scoring_category(category.clone()).await;
        assert!(store.save_scoring_option(option.clone()).await.is_ok());

        let tree = store.load_scoring_model_tree(model.id).await;
        assert!(tree.is_ok());
        let Ok(Some(tree)) = tree else {
            panic!("model tree missing");
        };
        assert_eq!(tree.model, model);
        assert_eq!(tree.categories.len(), 1);
        assert_eq!(tree.categories[0].options, vec![option]);
    }
}
