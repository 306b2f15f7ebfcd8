//! Score submissions and the synthetic average projections derived from them.

use scorecast_core::{
    EvaluationId, ScoringCategoryId, ScoringOptionId, SubmissionId, TeamId, TeamTypeId, UserId,
};
use serde::{Deserialize, Serialize};

/// The single scope a submission is recorded against.
///
/// Exactly one of user, team or evaluation-wide holds per submission; the sum
/// type rules out the multi-scope rows a nullable-column layout would allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum SubmissionScope {
    /// Personal submission by one member of a team.
    #[serde(rename_all = "camelCase")]
    User {
        /// Submitting user.
        user_id: UserId,
        /// Team the user submitted for.
        team_id: TeamId,
    },
    /// A team's collective submission.
    #[serde(rename_all = "camelCase")]
    Team {
        /// Submitting team.
        team_id: TeamId,
    },
    /// Evaluation-wide official submission.
    EvaluationWide,
}

/// One selected option within a category, as part of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSelection {
    /// Category the selection belongs to.
    pub scoring_category_id: ScoringCategoryId,
    /// Options chosen within the category.
    pub scoring_option_ids: Vec<ScoringOptionId>,
}

/// A persisted score submission for one move of an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Stable submission identifier.
    pub id: SubmissionId,
    /// Owning evaluation.
    pub evaluation_id: EvaluationId,
    /// Move the submission applies to.
    pub move_number: u32,
    /// Scope the submission is recorded against.
    pub scope: SubmissionScope,
    /// Computed numeric score.
    pub score: f64,
    /// Nested category and option selections behind the score.
    pub selections: Vec<SubmissionSelection>,
}

impl Submission {
    /// Returns the camel-cased names of fields that differ from `previous`.
    #[must_use]
    pub fn changed_fields(&self, previous: &Self) -> Vec<String> {
        let mut changed = Vec::new();
        if self.move_number != previous.move_number {
            changed.push("moveNumber".to_owned());
        }
        if self.scope != previous.scope {
            changed.push("scope".to_owned());
        }
        if self.score != previous.score {
            changed.push("score".to_owned());
        }
        if self.selections != previous.selections {
            changed.push("selections".to_owned());
        }
        changed
    }
}

/// Scope of a computed average projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum AverageScope {
    /// Mean across one team's user-scoped submissions.
    #[serde(rename_all = "camelCase")]
    Team {
        /// Team the average is computed for.
        team_id: TeamId,
    },
    /// Mean across all teams of one type.
    #[serde(rename_all = "camelCase")]
    TeamType {
        /// Team type the average is computed for.
        team_type_id: TeamTypeId,
    },
}

/// A computed, never-persisted aggregate submission view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AverageSubmission {
    /// Evaluation the average belongs to.
    pub evaluation_id: EvaluationId,
    /// Move the average is computed for.
    pub move_number: u32,
    /// Team or team-type scope of the average.
    pub scope: AverageScope,
    /// Arithmetic mean of the constituent scores.
    pub score: f64,
    /// Number of submissions behind the mean.
    pub sample_size: usize,
}
