//! Evaluation exercises and their moves.

use scorecast_core::{EvaluationId, MoveId, ScoringModelId};
use serde::{Deserialize, Serialize};

/// One scoring exercise. Belongs to exactly one scoring model and tracks the
/// move currently being played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    /// Stable evaluation identifier.
    pub id: EvaluationId,
    /// Display name.
    pub name: String,
    /// Scoring model this evaluation is scored against.
    pub scoring_model_id: ScoringModelId,
    /// Number of the move currently being played. Evaluation-wide submissions
    /// for this move and later are gated behind the official-score topic.
    pub current_move_number: u32,
}

impl Evaluation {
    /// Returns the camel-cased names of fields that differ from `previous`.
    #[must_use]
    pub fn changed_fields(&self, previous: &Self) -> Vec<String> {
        let mut changed = Vec::new();
        if self.name != previous.name {
            changed.push("name".to_owned());
        }
        if self.scoring_model_id != previous.scoring_model_id {
            changed.push("scoringModelId".to_owned());
        }
        if self.current_move_number != previous.current_move_number {
            changed.push("currentMoveNumber".to_owned());
        }
        changed
    }
}

/// One move within an evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationMove {
    /// Stable move identifier.
    pub id: MoveId,
    /// Owning evaluation.
    pub evaluation_id: EvaluationId,
    /// Position of the move within the evaluation, starting at 1.
    pub number: u32,
    /// Display title.
    pub title: String,
}

impl EvaluationMove {
    /// Returns the camel-cased names of fields that differ from `previous`.
    #[must_use]
    pub fn changed_fields(&self, previous: &Self) -> Vec<String> {
        let mut changed = Vec::new();
        if self.number != previous.number {
            changed.push("number".to_owned());
        }
        if self.title != previous.title {
            changed.push("title".to_owned());
        }
        changed
    }
}
