use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use scorecast_core::{AppResult, EvaluationId, GroupId, ScoringModelId, TeamId, UserId};
use scorecast_domain::{
    AccessRequest, EvaluationMembership, EvaluationPermission, PrincipalRef, RoleCatalog,
    ScoringModelMembership, SystemPermission, TeamMembership, TeamPermission, User,
};
use tokio::sync::Mutex;

use super::AccessService;
use crate::access_ports::AccessRepository;

#[derive(Default)]
struct FakeAccessRepository {
    users: HashMap<UserId, User>,
    group_memberships: Mutex<HashMap<UserId, Vec<GroupId>>>,
    evaluation_memberships: Mutex<HashMap<EvaluationId, Vec<EvaluationMembership>>>,
    scoring_model_memberships: HashMap<ScoringModelId, Vec<ScoringModelMembership>>,
    team_memberships: HashMap<(TeamId, UserId), TeamMembership>,
}

#[async_trait]
impl AccessRepository for FakeAccessRepository {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        Ok(self.users.get(&user_id).cloned())
    }

    async fn group_ids_for_user(&self, user_id: UserId) -> AppResult<Vec<GroupId>> {
        Ok(self
            .group_memberships
            .lock()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_evaluation_memberships(
        &self,
        evaluation_id: EvaluationId,
    ) -> AppResult<Vec<EvaluationMembership>> {
        Ok(self
            .evaluation_memberships
            .lock()
            .await
            .get(&evaluation_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_scoring_model_memberships(
        &self,
        scoring_model_id: ScoringModelId,
    ) -> AppResult<Vec<ScoringModelMembership>> {
        Ok(self
            .scoring_model_memberships
            .get(&scoring_model_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn find_team_membership(
        &self,
        team_id: TeamId,
        user_id: UserId,
    ) -> AppResult<Option<TeamMembership>> {
        Ok(self.team_memberships.get(&(team_id, user_id)).cloned())
    }
}

fn service(repository: FakeAccessRepository) -> AccessService {
    AccessService::new(Arc::new(repository), Arc::new(RoleCatalog::seed()))
}

#[tokio::test]
async fn no_membership_resolves_to_empty_set() {
    let service = service(FakeAccessRepository::default());
    let permissions = service
        .evaluation_permissions(UserId::new(), EvaluationId::new())
        .await;
    assert!(permissions.is_ok_and(|set| set.is_empty()));
}

#[tokio::test]
async fn authorize_denies_without_membership() {
    let service = service(FakeAccessRepository::default());
    let allowed = service
        .authorize(
            UserId::new(),
            AccessRequest::Evaluation(EvaluationId::new(), EvaluationPermission::ViewEvaluation),
        )
        .await;
    assert!(!allowed);
}

#[tokio::test]
async fn all_permissions_role_grants_every_permission() {
    let user_id = UserId::new();
    let evaluation_id = EvaluationId::new();
    let repository = FakeAccessRepository {
        evaluation_memberships: Mutex::new(HashMap::from([(
            evaluation_id,
            vec![EvaluationMembership {
                evaluation_id,
                principal: PrincipalRef::User(user_id),
                role_id: RoleCatalog::EVALUATION_FACILITATOR,
            }],
        )])),
        ..FakeAccessRepository::default()
    };
    let service = service(repository);

    let permissions = service.evaluation_permissions(user_id, evaluation_id).await;
    assert!(permissions.is_ok_and(|set| set.is_full()));
}

#[tokio::test]
async fn group_indirect_membership_grants_the_member_role() {
    let user_id = UserId::new();
    let group_id = GroupId::new();
    let evaluation_id = EvaluationId::new();
    let repository = FakeAccessRepository {
        group_memberships: Mutex::new(HashMap::from([(user_id, vec![group_id])])),
        evaluation_memberships: Mutex::new(HashMap::from([(
            evaluation_id,
            vec![EvaluationMembership {
                evaluation_id,
                principal: PrincipalRef::Group(group_id),
                role_id: RoleCatalog::EVALUATION_MEMBER,
            }],
        )])),
        ..FakeAccessRepository::default()
    };
    let service = service(repository);

    let permissions = service
        .evaluation_permissions(user_id, evaluation_id)
        .await
        .unwrap_or_default();
    assert!(permissions.contains(EvaluationPermission::ViewEvaluation));
    assert_eq!(
        permissions.to_vec(),
        vec![EvaluationPermission::ViewEvaluation]
    );

    // Removing the user from the group drops access without touching the
    // evaluation's membership rows.
    let repository = FakeAccessRepository {
        evaluation_memberships: Mutex::new(HashMap::from([(
            evaluation_id,
            vec![EvaluationMembership {
                evaluation_id,
                principal: PrincipalRef::Group(group_id),
                role_id: RoleCatalog::EVALUATION_MEMBER,
            }],
        )])),
        ..FakeAccessRepository::default()
    };
    let service = self::service(repository);
    let permissions = service
        .evaluation_permissions(user_id, evaluation_id)
        .await
        .unwrap_or_default();
    assert!(permissions.is_empty());
}

#[tokio::test]
async fn two_group_roles_union_additively() {
    let user_id = UserId::new();
    let observers = GroupId::new();
    let contributors = GroupId::new();
    let evaluation_id = EvaluationId::new();
    let repository = FakeAccessRepository {
        group_memberships: Mutex::new(HashMap::from([(
            user_id,
            vec![observers, contributors],
        )])),
        evaluation_memberships: Mutex::new(HashMap::from([(
            evaluation_id,
            vec![
                EvaluationMembership {
                    evaluation_id,
                    principal: PrincipalRef::Group(observers),
                    role_id: RoleCatalog::EVALUATION_OBSERVER,
                },
                EvaluationMembership {
                    evaluation_id,
                    principal: PrincipalRef::Group(contributors),
                    role_id: RoleCatalog::EVALUATION_SCORE_CONTRIBUTOR,
                },
            ],
        )])),
        ..FakeAccessRepository::default()
    };
    let service = service(repository);

    let permissions = service
        .evaluation_permissions(user_id, evaluation_id)
        .await
        .unwrap_or_default();
    assert!(permissions.contains(EvaluationPermission::ViewAsObserver));
    assert!(permissions.contains(EvaluationPermission::ViewOfficialScores));
    assert!(permissions.contains(EvaluationPermission::ViewEvaluation));
}

#[tokio::test]
async fn adding_a_membership_never_removes_permissions() {
    let user_id = UserId::new();
    let evaluation_id = EvaluationId::new();
    let memberships = Mutex::new(HashMap::from([(
        evaluation_id,
        vec![EvaluationMembership {
            evaluation_id,
            principal: PrincipalRef::User(user_id),
            role_id: RoleCatalog::EVALUATION_OBSERVER,
        }],
    )]));
    let repository = FakeAccessRepository {
        evaluation_memberships: memberships,
        ..FakeAccessRepository::default()
    };
    let service = service(repository);

    let before = service
        .evaluation_permissions(user_id, evaluation_id)
        .await
        .unwrap_or_default();

    let repository = FakeAccessRepository {
        evaluation_memberships: Mutex::new(HashMap::from([(
            evaluation_id,
            vec![
                EvaluationMembership {
                    evaluation_id,
                    principal: PrincipalRef::User(user_id),
                    role_id: RoleCatalog::EVALUATION_OBSERVER,
                },
                EvaluationMembership {
                    evaluation_id,
                    principal: PrincipalRef::User(user_id),
                    role_id: RoleCatalog::EVALUATION_SCORE_CONTRIBUTOR,
                },
            ],
        )])),
        ..FakeAccessRepository::default()
    };
    let service = self::service(repository);
    let after = service
        .evaluation_permissions(user_id, evaluation_id)
        .await
        .unwrap_or_default();

    for permission in before.to_vec() {
        assert!(after.contains(permission));
    }
}

#[tokio::test]
async fn dangling_role_reference_is_ignored_not_fatal() {
    let user_id = UserId::new();
    let evaluation_id = EvaluationId::new();
    let repository = FakeAccessRepository {
        evaluation_memberships: Mutex::new(HashMap::from([(
            evaluation_id,
            vec![EvaluationMembership {
                evaluation_id,
                principal: PrincipalRef::User(user_id),
                role_id: scorecast_core::RoleId::new(),
            }],
        )])),
        ..FakeAccessRepository::default()
    };
    let service = service(repository);

    let permissions = service.evaluation_permissions(user_id, evaluation_id).await;
    assert!(permissions.is_ok_and(|set| set.is_empty()));
}

#[tokio::test]
async fn system_role_field_resolves_without_membership_table() {
    let user_id = UserId::new();
    let repository = FakeAccessRepository {
        users: HashMap::from([(
            user_id,
            User {
                id: user_id,
                display_name: "Casey".to_owned(),
                system_role_id: Some(RoleCatalog::SYSTEM_CONTENT_DEVELOPER),
            },
        )]),
        ..FakeAccessRepository::default()
    };
    let service = service(repository);

    assert!(
        service
            .authorize(user_id, AccessRequest::System(SystemPermission::CreateEvaluation))
            .await
    );
    assert!(
        !service
            .authorize(user_id, AccessRequest::System(SystemPermission::ManageUsers))
            .await
    );
}

#[tokio::test]
async fn team_permissions_come_from_the_direct_membership() {
    let user_id = UserId::new();
    let team_id = TeamId::new();
    let repository = FakeAccessRepository {
        team_memberships: HashMap::from([(
            (team_id, user_id),
            TeamMembership {
                team_id,
                user_id,
                role_id: RoleCatalog::TEAM_MEMBER,
            },
        )]),
        ..FakeAccessRepository::default()
    };
    let service = service(repository);

    let permissions = service
        .team_permissions(user_id, team_id)
        .await
        .unwrap_or_default();
    assert!(permissions.contains(TeamPermission::SubmitScores));
    assert!(!permissions.contains(TeamPermission::ManageTeamUsers));
}
