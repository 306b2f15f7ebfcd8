//! Topic naming conventions.
//!
//! Topics are opaque strings on the wire; everything here is convention
//! shared between the deriver and the join protocol.

use std::fmt::Display;

use scorecast_core::{EvaluationId, TeamTypeId};

/// Topic receiving a superset of all traffic, for administrative observers.
pub const ADMIN_TOPIC: &str = "admin";

/// Suffix gating current-move official scores away from general evaluation
/// subscribers.
pub const OFFICIAL_SCORE_SUFFIX: &str = "-official";

/// Well-known topic for evaluation membership changes.
pub const EVALUATION_MEMBERSHIPS_TOPIC: &str = "evaluation-memberships";

/// Well-known topic for scoring model membership changes.
pub const SCORING_MODEL_MEMBERSHIPS_TOPIC: &str = "scoring-model-memberships";

/// Well-known topic for team membership changes.
pub const TEAM_MEMBERSHIPS_TOPIC: &str = "team-memberships";

/// Well-known topic for group membership changes.
pub const GROUP_MEMBERSHIPS_TOPIC: &str = "group-memberships";

/// Returns the topic named after a resource id.
#[must_use]
pub fn for_id(id: impl Display) -> String {
    id.to_string()
}

/// Returns the official-score topic of an evaluation, visible only to
/// official-score contributors.
#[must_use]
pub fn official_scores(evaluation_id: EvaluationId) -> String {
    format!("{evaluation_id}{OFFICIAL_SCORE_SUFFIX}")
}

/// Returns the type-average topic for one team type within an evaluation.
#[must_use]
pub fn type_average(evaluation_id: EvaluationId, team_type_id: TeamTypeId) -> String {
    format!("{evaluation_id}-{team_type_id}")
}
