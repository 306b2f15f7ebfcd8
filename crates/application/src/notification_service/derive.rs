//! Per-kind topic derivation.
//!
//! Each arm computes the topics one changed entity must reach, from the
//! carried entity state plus direct lookups of its owning relationships.
//! Deletions reuse the pre-deletion snapshot carried by the event, so the
//! same arms serve updates and deletes. A failed lookup drops that
//! derivation step only; remaining topics for the event still publish.

use scorecast_core::ScoringModelId;
use scorecast_domain::{Change, EntityChange, Submission, SubmissionScope};
use tracing::warn;

use crate::topics;

use super::{NotificationService, TopicPublish};

impl NotificationService {
    /// Resolves every publish for one change event. The admin topic is
    /// always included so administrative observers receive a superset of
    /// all traffic.
    pub(crate) async fn derive_publishes(&self, change: &EntityChange) -> Vec<TopicPublish> {
        match change {
            EntityChange::Evaluation(inner) => {
                self.publish_to(change, vec![topics::for_id(inner.entity().id)])
            }
            EntityChange::Move(inner) => {
                self.publish_to(change, vec![topics::for_id(inner.entity().evaluation_id)])
            }
            EntityChange::Team(inner) => self.publish_to(
                change,
                vec![
                    topics::for_id(inner.entity().id),
                    topics::for_id(inner.entity().evaluation_id),
                ],
            ),
            EntityChange::TeamAction(inner) => {
                self.publish_to(change, vec![topics::for_id(inner.entity().team_id)])
            }
            EntityChange::TeamDuty(inner) => {
                self.publish_to(change, vec![topics::for_id(inner.entity().team_id)])
            }
            EntityChange::ScoringModel(inner) => self.scoring_model_publishes(change, inner).await,
            EntityChange::ScoringCategory(inner) => {
                self.bubble_to_model(inner.entity().scoring_model_id).await
            }
            EntityChange::ScoringOption(inner) => {
                let category_id = inner.entity().scoring_category_id;
                match self.lookups.find_scoring_category(category_id).await {
                    Ok(Some(category)) => self.bubble_to_model(category.scoring_model_id).await,
                    Ok(None) => {
                        warn!(
                            scoring_category_id = %category_id,
                            "scoring option change references missing category, dropping derivation"
                        );
                        Vec::new()
                    }
                    Err(error) => {
                        warn!(
                            scoring_category_id = %category_id,
                            error = %error,
                            "category lookup failed, dropping derivation"
                        );
                        Vec::new()
                    }
                }
            }
            EntityChange::Submission(inner) => self.submission_publishes(change, inner).await,
            EntityChange::EvaluationMembership(_) => {
                self.publish_to(change, vec![topics::EVALUATION_MEMBERSHIPS_TOPIC.to_owned()])
            }
            EntityChange::ScoringModelMembership(_) => self.publish_to(
                change,
                vec![topics::SCORING_MODEL_MEMBERSHIPS_TOPIC.to_owned()],
            ),
            EntityChange::TeamMembership(_) => {
                self.publish_to(change, vec![topics::TEAM_MEMBERSHIPS_TOPIC.to_owned()])
            }
            EntityChange::GroupMembership(_) => {
                self.publish_to(change, vec![topics::GROUP_MEMBERSHIPS_TOPIC.to_owned()])
            }
        }
    }

    /// Builds one publish per topic (plus the admin topic) carrying the
    /// change's own method name and payload.
    fn publish_to(&self, change: &EntityChange, mut topic_names: Vec<String>) -> Vec<TopicPublish> {
        let payload = match change.payload() {
            Ok(payload) => payload,
            Err(error) => {
                warn!(
                    entity_kind = change.entity_kind(),
                    error = %error,
                    "failed to build change payload, dropping event"
                );
                return Vec::new();
            }
        };

        topic_names.push(topics::ADMIN_TOPIC.to_owned());
        topic_names
            .into_iter()
            .map(|topic| TopicPublish {
                topic,
                method: change.method_name(),
                payload: payload.clone(),
                changed_fields: change.changed_fields().to_vec(),
            })
            .collect()
    }

    /// Model-level changes republish the whole model tree so subscribers at
    /// model granularity never see a partial view. Deletions fall back to
    /// the snapshot since the tree is gone from the store.
    async fn scoring_model_publishes(
        &self,
        change: &EntityChange,
        inner: &Change<scorecast_domain::ScoringModel>,
    ) -> Vec<TopicPublish> {
        let model_id = inner.entity().id;
        let topic_names = vec![topics::for_id(model_id), topics::ADMIN_TOPIC.to_owned()];

        let payload = match self.lookups.load_scoring_model_tree(model_id).await {
            Ok(Some(tree)) => match serde_json::to_value(&tree) {
                Ok(payload) => payload,
                Err(error) => {
                    warn!(
                        scoring_model_id = %model_id,
                        error = %error,
                        "failed to serialize scoring model tree, dropping event"
                    );
                    return Vec::new();
                }
            },
            // Deleted (or racing delete): publish the carried snapshot.
            Ok(None) => match change.payload() {
                Ok(payload) => payload,
                Err(error) => {
                    warn!(scoring_model_id = %model_id, error = %error, "dropping event");
                    return Vec::new();
                }
            },
            Err(error) => {
                warn!(
                    scoring_model_id = %model_id,
                    error = %error,
                    "scoring model tree lookup failed, dropping derivation"
                );
                return Vec::new();
            }
        };

        topic_names
            .into_iter()
            .map(|topic| TopicPublish {
                topic,
                method: change.method_name(),
                payload: payload.clone(),
                changed_fields: change.changed_fields().to_vec(),
            })
            .collect()
    }

    /// Category and option changes re-resolve to the owning model and
    /// republish it whole as a `ScoringModelUpdated`, because clients
    /// subscribe at model granularity, never at sub-entity granularity.
    async fn bubble_to_model(&self, model_id: ScoringModelId) -> Vec<TopicPublish> {
        let tree = match self.lookups.load_scoring_model_tree(model_id).await {
            Ok(Some(tree)) => tree,
            Ok(None) => {
                warn!(
                    scoring_model_id = %model_id,
                    "sub-entity change references missing model, dropping derivation"
                );
                return Vec::new();
            }
            Err(error) => {
                warn!(
                    scoring_model_id = %model_id,
                    error = %error,
                    "scoring model tree lookup failed, dropping derivation"
                );
                return Vec::new();
            }
        };

        let payload = match serde_json::to_value(&tree) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(scoring_model_id = %model_id, error = %error, "dropping event");
                return Vec::new();
            }
        };

        [topics::for_id(model_id), topics::ADMIN_TOPIC.to_owned()]
            .into_iter()
            .map(|topic| TopicPublish {
                topic,
                method: "ScoringModelUpdated".to_owned(),
                payload: payload.clone(),
                changed_fields: Vec::new(),
            })
            .collect()
    }

    /// A submission reaches its own id topic, the admin topic, and exactly
    /// one primary topic chosen in priority order user, team,
    /// evaluation-wide. The evaluation-wide case gates on the move number:
    /// past moves are open to every evaluation subscriber, while the current
    /// move (and not-yet-current moves) stays on the official-score topic
    /// until the move advances.
    async fn submission_publishes(
        &self,
        change: &EntityChange,
        inner: &Change<Submission>,
    ) -> Vec<TopicPublish> {
        let submission = inner.entity();
        let mut topic_names = vec![topics::for_id(submission.id)];

        match submission.scope {
            SubmissionScope::User { user_id, .. } => topic_names.push(topics::for_id(user_id)),
            SubmissionScope::Team { team_id } => topic_names.push(topics::for_id(team_id)),
            SubmissionScope::EvaluationWide => {
                match self.lookups.find_evaluation(submission.evaluation_id).await {
                    Ok(Some(evaluation)) => {
                        if submission.move_number < evaluation.current_move_number {
                            topic_names.push(topics::for_id(evaluation.id));
                        } else {
                            topic_names.push(topics::official_scores(evaluation.id));
                        }
                    }
                    Ok(None) => {
                        warn!(
                            evaluation_id = %submission.evaluation_id,
                            "submission references missing evaluation, skipping primary topic"
                        );
                    }
                    Err(error) => {
                        warn!(
                            evaluation_id = %submission.evaluation_id,
                            error = %error,
                            "evaluation lookup failed, skipping primary topic"
                        );
                    }
                }
            }
        }

        self.publish_to(change, topic_names)
    }
}
