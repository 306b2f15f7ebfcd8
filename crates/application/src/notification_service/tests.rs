use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use scorecast_core::{
    AppError, AppResult, EvaluationId, MoveId, ScoringCategoryId, ScoringModelId, SubmissionId,
    TeamActionId, TeamDutyId, TeamId, TeamTypeId, UserId,
};
use scorecast_domain::{
    Change, CommitChangeSet, EntityChange, Evaluation, EvaluationMembership, EvaluationMove,
    PrincipalRef, RoleCatalog, ScoringCategory, ScoringCategoryTree, ScoringModel,
    ScoringModelTree, ScoringOption, Submission, SubmissionScope, Team, TeamAction, TeamDuty,
    TeamType,
};
use serde_json::Value;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::change_bus::ChangeBus;
use crate::push_ports::{ConnectionId, PushTransport};
use crate::store_ports::RelationLookupRepository;
use crate::topics;

use super::NotificationService;

#[derive(Default)]
struct FakeLookups {
    evaluations: HashMap<EvaluationId, Evaluation>,
    teams: HashMap<TeamId, Team>,
    team_types: HashMap<TeamTypeId, TeamType>,
    categories: HashMap<ScoringCategoryId, ScoringCategory>,
    model_trees: HashMap<ScoringModelId, ScoringModelTree>,
    user_submissions: HashMap<(TeamId, u32), Vec<Submission>>,
    team_submissions: HashMap<(EvaluationId, TeamTypeId, u32), Vec<Submission>>,
}

#[async_trait]
impl RelationLookupRepository for FakeLookups {
    async fn find_evaluation(
        &self,
        evaluation_id: EvaluationId,
    ) -> AppResult<Option<Evaluation>> {
        Ok(self.evaluations.get(&evaluation_id).cloned())
    }

    async fn find_team(&self, team_id: TeamId) -> AppResult<Option<Team>> {
        Ok(self.teams.get(&team_id).cloned())
    }

    async fn find_team_type(&self, team_type_id: TeamTypeId) -> AppResult<Option<TeamType>> {
        Ok(self.team_types.get(&team_type_id).cloned())
    }

    async fn find_submission(
        &self,
        _submission_id: SubmissionId,
    ) -> AppResult<Option<Submission>> {
        Ok(None)
    }

    async fn find_scoring_category(
        &self,
        scoring_category_id: ScoringCategoryId,
    ) -> AppResult<Option<ScoringCategory>> {
        Ok(self.categories.get(&scoring_category_id).cloned())
    }

    async fn load_scoring_model_tree(
        &self,
        scoring_model_id: ScoringModelId,
    ) -> AppResult<Option<ScoringModelTree>> {
        Ok(self.model_trees.get(&scoring_model_id).cloned())
    }

    async fn list_user_submissions_for_team(
        &self,
        team_id: TeamId,
        move_number: u32,
    ) -> AppResult<Vec<Submission>> {
        Ok(self
            .user_submissions
            .get(&(team_id, move_number))
            .cloned()
            .unwrap_or_default())
    }

    async fn list_team_submissions_for_type(
        &self,
        evaluation_id: EvaluationId,
        team_type_id: TeamTypeId,
        move_number: u32,
    ) -> AppResult<Vec<Submission>> {
        Ok(self
            .team_submissions
            .get(&(evaluation_id, team_type_id, move_number))
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct PublishRecord {
    topic: String,
    method: String,
    payload: Value,
    changed_fields: Vec<String>,
}

#[derive(Default)]
struct RecordingTransport {
    records: Mutex<Vec<PublishRecord>>,
    failing_topics: HashSet<String>,
}

#[async_trait]
impl PushTransport for RecordingTransport {
    async fn join_topic(&self, _connection_id: &ConnectionId, _topic: &str) -> AppResult<()> {
        Ok(())
    }

    async fn leave_topic(&self, _connection_id: &ConnectionId, _topic: &str) -> AppResult<()> {
        Ok(())
    }

    async fn publish_to_topic(
        &self,
        topic: &str,
        method: &str,
        payload: Value,
        changed_fields: &[String],
    ) -> AppResult<()> {
        if self.failing_topics.contains(topic) {
            return Err(AppError::Internal(format!("transport down for '{topic}'")));
        }
        self.records.lock().await.push(PublishRecord {
            topic: topic.to_owned(),
            method: method.to_owned(),
            payload,
            changed_fields: changed_fields.to_vec(),
        });
        Ok(())
    }
}

struct Fixture {
    service: NotificationService,
    transport: Arc<RecordingTransport>,
}

fn fixture(lookups: FakeLookups) -> Fixture {
    fixture_with_transport(lookups, RecordingTransport::default())
}

fn fixture_with_transport(lookups: FakeLookups, transport: RecordingTransport) -> Fixture {
    let transport = Arc::new(transport);
    Fixture {
        service: NotificationService::new(Arc::new(lookups), transport.clone()),
        transport,
    }
}

fn evaluation(current_move_number: u32) -> Evaluation {
    Evaluation {
        id: EvaluationId::new(),
        name: "Autumn Exercise".to_owned(),
        scoring_model_id: ScoringModelId::new(),
        current_move_number,
    }
}

fn wide_submission(evaluation_id: EvaluationId, move_number: u32) -> Submission {
    Submission {
        id: SubmissionId::new(),
        evaluation_id,
        move_number,
        scope: SubmissionScope::EvaluationWide,
        score: 72.0,
        selections: Vec::new(),
    }
}

fn user_submission(evaluation_id: EvaluationId, team_id: TeamId, score: f64) -> Submission {
    Submission {
        id: SubmissionId::new(),
        evaluation_id,
        move_number: 2,
        scope: SubmissionScope::User {
            user_id: UserId::new(),
            team_id,
        },
        score,
        selections: Vec::new(),
    }
}

fn topic_set(publishes: &[super::TopicPublish]) -> HashSet<String> {
    publishes.iter().map(|publish| publish.topic.clone()).collect()
}

#[tokio::test]
async fn past_move_wide_submission_targets_the_open_evaluation_topic() {
    let evaluation = evaluation(5);
    let submission = wide_submission(evaluation.id, 4);
    let fixture = fixture(FakeLookups {
        evaluations: HashMap::from([(evaluation.id, evaluation.clone())]),
        ..FakeLookups::default()
    });

    let change = EntityChange::Submission(Change::Created(submission.clone()));
    let publishes = fixture.service.derive_publishes(&change).await;

    let topics_hit = topic_set(&publishes);
    assert!(topics_hit.contains(&topics::for_id(evaluation.id)));
    assert!(!topics_hit.contains(&topics::official_scores(evaluation.id)));
    assert!(topics_hit.contains(&topics::for_id(submission.id)));
    assert!(topics_hit.contains(topics::ADMIN_TOPIC));
}

#[tokio::test]
async fn current_move_wide_submission_is_withheld_on_the_official_topic() {
    let evaluation = evaluation(5);
    let fixture = fixture(FakeLookups {
        evaluations: HashMap::from([(evaluation.id, evaluation.clone())]),
        ..FakeLookups::default()
    });

    for move_number in [5, 6] {
        let change = EntityChange::Submission(Change::Created(wide_submission(
            evaluation.id,
            move_number,
        )));
        let publishes = fixture.service.derive_publishes(&change).await;
        let topics_hit = topic_set(&publishes);
        assert!(topics_hit.contains(&topics::official_scores(evaluation.id)));
        assert!(!topics_hit.contains(&topics::for_id(evaluation.id)));
    }
}

#[tokio::test]
async fn user_scoped_submission_targets_the_user_topic() {
    let fixture = fixture(FakeLookups::default());
    let user_id = UserId::new();
    let submission = Submission {
        id: SubmissionId::new(),
        evaluation_id: EvaluationId::new(),
        move_number: 1,
        scope: SubmissionScope::User {
            user_id,
            team_id: TeamId::new(),
        },
        score: 10.0,
        selections: Vec::new(),
    };

    let change = EntityChange::Submission(Change::Created(submission));
    let publishes = fixture.service.derive_publishes(&change).await;
    assert!(topic_set(&publishes).contains(&topics::for_id(user_id)));
}

#[tokio::test]
async fn missing_evaluation_skips_only_the_primary_topic() {
    let fixture = fixture(FakeLookups::default());
    let submission = wide_submission(EvaluationId::new(), 3);
    let change = EntityChange::Submission(Change::Created(submission.clone()));

    let publishes = fixture.service.derive_publishes(&change).await;
    let topics_hit = topic_set(&publishes);
    assert_eq!(topics_hit.len(), 2);
    assert!(topics_hit.contains(&topics::for_id(submission.id)));
    assert!(topics_hit.contains(topics::ADMIN_TOPIC));
}

#[tokio::test]
async fn delete_reuses_the_pre_image_for_topic_derivation() {
    let evaluation = evaluation(5);
    let submission = wide_submission(evaluation.id, 4);
    let fixture = fixture(FakeLookups {
        evaluations: HashMap::from([(evaluation.id, evaluation.clone())]),
        ..FakeLookups::default()
    });

    let updated = EntityChange::Submission(Change::Updated {
        entity: submission.clone(),
        changed_fields: vec!["score".to_owned()],
    });
    let deleted = EntityChange::Submission(Change::Deleted(submission));

    let updated_topics = topic_set(&fixture.service.derive_publishes(&updated).await);
    let deleted_topics = topic_set(&fixture.service.derive_publishes(&deleted).await);
    assert_eq!(updated_topics, deleted_topics);
}

#[tokio::test]
async fn option_change_republishes_the_whole_model() {
    let model = ScoringModel {
        id: ScoringModelId::new(),
        name: "Readiness".to_owned(),
        equation: "sum(categories)".to_owned(),
    };
    let category = ScoringCategory {
        id: ScoringCategoryId::new(),
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
    let tree = ScoringModelTree {
        model: model.clone(),
        categories: vec![ScoringCategoryTree {
            category: category.clone(),
            options: vec![option.clone()],
        }],
    };
    let fixture = fixture(FakeLookups {
        categories: HashMap::from([(category.id, category.clone())]),
        model_trees: HashMap::from([(model.id, tree)]),
        ..FakeLookups::default()
    });

    let change = EntityChange::ScoringOption(Change::Updated {
        entity: option,
        changed_fields: vec!["value".to_owned()],
    });
    let publishes = fixture.service.derive_publishes(&change).await;

    assert_eq!(publishes.len(), 2);
    for publish in &publishes {
        assert_eq!(publish.method, "ScoringModelUpdated");
        assert_eq!(
            publish.payload.get("id").and_then(Value::as_str),
            Some(model.id.to_string().as_str())
        );
        assert!(publish.payload.get("categories").is_some());
    }
    let topics_hit = topic_set(&publishes);
    assert!(topics_hit.contains(&topics::for_id(model.id)));
    assert!(topics_hit.contains(topics::ADMIN_TOPIC));
}

#[tokio::test]
async fn membership_changes_use_the_well_known_topic() {
    let fixture = fixture(FakeLookups::default());
    let change = EntityChange::EvaluationMembership(Change::Created(EvaluationMembership {
        evaluation_id: EvaluationId::new(),
        principal: PrincipalRef::User(UserId::new()),
        role_id: RoleCatalog::EVALUATION_MEMBER,
    }));

    let publishes = fixture.service.derive_publishes(&change).await;
    let topics_hit = topic_set(&publishes);
    assert!(topics_hit.contains(topics::EVALUATION_MEMBERSHIPS_TOPIC));
    assert!(topics_hit.contains(topics::ADMIN_TOPIC));
}

#[tokio::test]
async fn team_changes_target_both_the_team_and_its_evaluation() {
    let fixture = fixture(FakeLookups::default());
    let team = Team {
        id: TeamId::new(),
        evaluation_id: EvaluationId::new(),
        team_type_id: TeamTypeId::new(),
        name: "Blue One".to_owned(),
    };

    let change = EntityChange::Team(Change::Created(team.clone()));
    let publishes = fixture.service.derive_publishes(&change).await;

    let topics_hit = topic_set(&publishes);
    assert_eq!(topics_hit.len(), 3);
    assert!(topics_hit.contains(&topics::for_id(team.id)));
    assert!(topics_hit.contains(&topics::for_id(team.evaluation_id)));
    assert!(topics_hit.contains(topics::ADMIN_TOPIC));
}

#[tokio::test]
async fn team_action_changes_stay_on_the_team_topic() {
    let fixture = fixture(FakeLookups::default());
    let action = TeamAction {
        id: TeamActionId::new(),
        team_id: TeamId::new(),
        move_number: 2,
        title: "Isolated the segment".to_owned(),
        description: "Pulled the uplink on the affected switch.".to_owned(),
    };

    let change = EntityChange::TeamAction(Change::Updated {
        entity: action.clone(),
        changed_fields: vec!["description".to_owned()],
    });
    let publishes = fixture.service.derive_publishes(&change).await;

    let topics_hit = topic_set(&publishes);
    assert_eq!(topics_hit.len(), 2);
    assert!(topics_hit.contains(&topics::for_id(action.team_id)));
    assert!(topics_hit.contains(topics::ADMIN_TOPIC));
    for publish in &publishes {
        assert_eq!(publish.method, "TeamActionUpdated");
    }
}

#[tokio::test]
async fn team_duty_changes_stay_on_the_team_topic() {
    let fixture = fixture(FakeLookups::default());
    let duty = TeamDuty {
        id: TeamDutyId::new(),
        team_id: TeamId::new(),
        holder_user_id: Some(UserId::new()),
        title: "Incident scribe".to_owned(),
    };

    let change = EntityChange::TeamDuty(Change::Created(duty.clone()));
    let publishes = fixture.service.derive_publishes(&change).await;

    let topics_hit = topic_set(&publishes);
    assert_eq!(topics_hit.len(), 2);
    assert!(topics_hit.contains(&topics::for_id(duty.team_id)));
    assert!(topics_hit.contains(topics::ADMIN_TOPIC));
}

#[tokio::test]
async fn move_changes_target_the_owning_evaluation() {
    let fixture = fixture(FakeLookups::default());
    let evaluation_move = EvaluationMove {
        id: MoveId::new(),
        evaluation_id: EvaluationId::new(),
        number: 3,
        title: "Escalation".to_owned(),
    };

    let change = EntityChange::Move(Change::Created(evaluation_move.clone()));
    let publishes = fixture.service.derive_publishes(&change).await;

    let topics_hit = topic_set(&publishes);
    assert_eq!(topics_hit.len(), 2);
    assert!(topics_hit.contains(&topics::for_id(evaluation_move.evaluation_id)));
    assert!(topics_hit.contains(topics::ADMIN_TOPIC));
}

#[tokio::test]
async fn lone_member_submission_suppresses_the_team_average() {
    let evaluation_id = EvaluationId::new();
    let team_id = TeamId::new();
    let submission = user_submission(evaluation_id, team_id, 50.0);
    let fixture = fixture(FakeLookups {
        user_submissions: HashMap::from([(
            (team_id, submission.move_number),
            vec![submission.clone()],
        )]),
        ..FakeLookups::default()
    });

    let change = EntityChange::Submission(Change::Created(submission));
    let publishes = fixture.service.average_publishes(&change).await;
    assert!(publishes.is_empty());
}

#[tokio::test]
async fn sibling_submissions_produce_a_team_average() {
    let evaluation_id = EvaluationId::new();
    let team_id = TeamId::new();
    let first = user_submission(evaluation_id, team_id, 40.0);
    let second = user_submission(evaluation_id, team_id, 60.0);
    let fixture = fixture(FakeLookups {
        user_submissions: HashMap::from([(
            (team_id, first.move_number),
            vec![first.clone(), second.clone()],
        )]),
        ..FakeLookups::default()
    });

    let change = EntityChange::Submission(Change::Updated {
        entity: second,
        changed_fields: vec!["score".to_owned()],
    });
    let publishes = fixture.service.average_publishes(&change).await;

    assert!(topic_set(&publishes).contains(&topics::for_id(team_id)));
    let Some(publish) = publishes.first() else {
        panic!("expected an average publish");
    };
    assert_eq!(publish.method, "AverageSubmissionUpdated");
    assert_eq!(publish.payload.get("score").and_then(Value::as_f64), Some(50.0));
    assert_eq!(
        publish.payload.get("sampleSize").and_then(Value::as_u64),
        Some(2)
    );
}

#[tokio::test]
async fn type_average_respects_the_team_type_flag() {
    let evaluation_id = EvaluationId::new();
    let team_type = TeamType {
        id: TeamTypeId::new(),
        name: "Blue Cell".to_owned(),
        show_type_average: false,
    };
    let team = Team {
        id: TeamId::new(),
        evaluation_id,
        team_type_id: team_type.id,
        name: "Blue One".to_owned(),
    };
    let submission = Submission {
        id: SubmissionId::new(),
        evaluation_id,
        move_number: 2,
        scope: SubmissionScope::Team { team_id: team.id },
        score: 30.0,
        selections: Vec::new(),
    };
    let mut lookups = FakeLookups {
        teams: HashMap::from([(team.id, team.clone())]),
        team_types: HashMap::from([(team_type.id, team_type.clone())]),
        team_submissions: HashMap::from([(
            (evaluation_id, team_type.id, 2),
            vec![submission.clone()],
        )]),
        ..FakeLookups::default()
    };

    let change = EntityChange::Submission(Change::Created(submission.clone()));
    let fixture_off = fixture(std::mem::take(&mut lookups));
    assert!(fixture_off.service.average_publishes(&change).await.is_empty());

    let enabled_type = TeamType {
        show_type_average: true,
        ..team_type.clone()
    };
    let fixture_on = fixture(FakeLookups {
        teams: HashMap::from([(team.id, team)]),
        team_types: HashMap::from([(enabled_type.id, enabled_type.clone())]),
        team_submissions: HashMap::from([(
            (evaluation_id, enabled_type.id, 2),
            vec![submission.clone()],
        )]),
        ..FakeLookups::default()
    });

    let publishes = fixture_on.service.average_publishes(&change).await;
    assert!(
        topic_set(&publishes).contains(&topics::type_average(evaluation_id, enabled_type.id))
    );
}

#[tokio::test]
async fn one_failing_topic_does_not_block_the_others() {
    let evaluation = evaluation(5);
    let submission = wide_submission(evaluation.id, 4);
    let fixture = fixture_with_transport(
        FakeLookups {
            evaluations: HashMap::from([(evaluation.id, evaluation.clone())]),
            ..FakeLookups::default()
        },
        RecordingTransport {
            failing_topics: HashSet::from([topics::for_id(evaluation.id)]),
            ..RecordingTransport::default()
        },
    );

    let change = EntityChange::Submission(Change::Created(submission.clone()));
    fixture
        .service
        .dispatch_commit(CommitChangeSet::single(change), &CancellationToken::new())
        .await;

    let records = fixture.transport.records.lock().await;
    let delivered: HashSet<String> = records.iter().map(|record| record.topic.clone()).collect();
    assert!(delivered.contains(&topics::for_id(submission.id)));
    assert!(delivered.contains(topics::ADMIN_TOPIC));
    assert!(!delivered.contains(&topics::for_id(evaluation.id)));
}

#[tokio::test]
async fn updates_carry_camel_cased_changed_fields() {
    let evaluation = evaluation(3);
    let fixture = fixture(FakeLookups {
        evaluations: HashMap::from([(evaluation.id, evaluation.clone())]),
        ..FakeLookups::default()
    });

    let mut renamed = evaluation.clone();
    renamed.current_move_number = 4;
    let change = EntityChange::Evaluation(Change::Updated {
        changed_fields: renamed.changed_fields(&evaluation),
        entity: renamed,
    });

    fixture
        .service
        .dispatch_commit(CommitChangeSet::single(change), &CancellationToken::new())
        .await;

    let records = fixture.transport.records.lock().await;
    let Some(record) = records.first() else {
        panic!("expected a publish");
    };
    assert_eq!(record.method, "EvaluationUpdated");
    assert_eq!(record.changed_fields, vec!["currentMoveNumber".to_owned()]);
}

#[tokio::test]
async fn dispatcher_stops_with_an_error_when_the_bus_is_lost() {
    let fixture = fixture(FakeLookups::default());
    let (bus, receiver) = ChangeBus::channel();
    drop(bus);

    let result = fixture.service.run(receiver, CancellationToken::new()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn dispatcher_exits_cleanly_on_cancellation() {
    let fixture = fixture(FakeLookups::default());
    let (_bus, receiver) = ChangeBus::channel();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = fixture.service.run(receiver, cancel).await;
    assert!(result.is_ok());
}
