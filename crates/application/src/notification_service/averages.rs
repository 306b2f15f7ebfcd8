//! Average projections pushed alongside submission changes.
//!
//! Both averages are read-only projections recomputed from the store on
//! every constituent change; they are never persisted as rows. Recompute
//! on write keeps the logic trivially correct at the cost of one query per
//! change, which is acceptable at exercise scale.

use scorecast_core::TeamId;
use scorecast_domain::{
    AverageScope, AverageSubmission, ChangeKind, EntityChange, Submission, SubmissionScope,
};
use tracing::warn;

use crate::topics;

use super::{NotificationService, TopicPublish};

/// Method name for pushed average projections.
const AVERAGE_METHOD: &str = "AverageSubmissionUpdated";

impl NotificationService {
    /// Resolves the average publishes triggered by one change event.
    /// Only submission creates and updates project averages.
    pub(crate) async fn average_publishes(&self, change: &EntityChange) -> Vec<TopicPublish> {
        let EntityChange::Submission(inner) = change else {
            return Vec::new();
        };
        if inner.kind() == ChangeKind::Deleted {
            return Vec::new();
        }

        let submission = inner.entity();
        match submission.scope {
            SubmissionScope::User { team_id, .. } => self.team_average(submission, team_id).await,
            SubmissionScope::Team { team_id } => self.type_average(submission, team_id).await,
            SubmissionScope::EvaluationWide => Vec::new(),
        }
    }

    /// Mean across one team's user-scoped submissions for the move. A lone
    /// submission has no siblings to average with, so the projection is
    /// suppressed rather than pushed as a single-sample "average".
    async fn team_average(&self, submission: &Submission, team_id: TeamId) -> Vec<TopicPublish> {
        let rows = match self
            .lookups
            .list_user_submissions_for_team(team_id, submission.move_number)
            .await
        {
            Ok(rows) => rows,
            Err(error) => {
                warn!(team_id = %team_id, error = %error, "team average query failed, skipping");
                return Vec::new();
            }
        };

        if rows.len() < 2 {
            return Vec::new();
        }

        let average = AverageSubmission {
            evaluation_id: submission.evaluation_id,
            move_number: submission.move_number,
            scope: AverageScope::Team { team_id },
            score: mean_score(&rows),
            sample_size: rows.len(),
        };

        average_publishes_for(average, topics::for_id(team_id))
    }

    /// Mean across the team-scoped submissions of every team of the same
    /// type, pushed only when the type opts in via `show_type_average`.
    async fn type_average(&self, submission: &Submission, team_id: TeamId) -> Vec<TopicPublish> {
        let team = match self.lookups.find_team(team_id).await {
            Ok(Some(team)) => team,
            Ok(None) => {
                warn!(team_id = %team_id, "submission references missing team, skipping average");
                return Vec::new();
            }
            Err(error) => {
                warn!(team_id = %team_id, error = %error, "team lookup failed, skipping average");
                return Vec::new();
            }
        };

        let team_type = match self.lookups.find_team_type(team.team_type_id).await {
            Ok(Some(team_type)) => team_type,
            Ok(None) => {
                warn!(
                    team_type_id = %team.team_type_id,
                    "team references missing team type, skipping average"
                );
                return Vec::new();
            }
            Err(error) => {
                warn!(
                    team_type_id = %team.team_type_id,
                    error = %error,
                    "team type lookup failed, skipping average"
                );
                return Vec::new();
            }
        };

        if !team_type.show_type_average {
            return Vec::new();
        }

        let rows = match self
            .lookups
            .list_team_submissions_for_type(
                submission.evaluation_id,
                team.team_type_id,
                submission.move_number,
            )
            .await
        {
            Ok(rows) => rows,
            Err(error) => {
                warn!(
                    team_type_id = %team.team_type_id,
                    error = %error,
                    "type average query failed, skipping"
                );
                return Vec::new();
            }
        };

        if rows.is_empty() {
            return Vec::new();
        }

        let average = AverageSubmission {
            evaluation_id: submission.evaluation_id,
            move_number: submission.move_number,
            scope: AverageScope::TeamType {
                team_type_id: team.team_type_id,
            },
            score: mean_score(&rows),
            sample_size: rows.len(),
        };

        average_publishes_for(
            average,
            topics::type_average(submission.evaluation_id, team.team_type_id),
        )
    }
}

fn mean_score(rows: &[Submission]) -> f64 {
    let total: f64 = rows.iter().map(|row| row.score).sum();
    total / rows.len() as f64
}

fn average_publishes_for(average: AverageSubmission, topic: String) -> Vec<TopicPublish> {
    let payload = match serde_json::to_value(&average) {
        Ok(payload) => payload,
        Err(error) => {
            warn!(error = %error, "failed to serialize average projection, skipping");
            return Vec::new();
        }
    };

    [topic, topics::ADMIN_TOPIC.to_owned()]
        .into_iter()
        .map(|topic| TopicPublish {
            topic,
            method: AVERAGE_METHOD.to_owned(),
            payload: payload.clone(),
            changed_fields: Vec::new(),
        })
        .collect()
}
