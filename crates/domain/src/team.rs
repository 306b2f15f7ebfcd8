//! Teams, team types and team-scoped content.

use scorecast_core::{EvaluationId, TeamActionId, TeamDutyId, TeamId, TeamTypeId, UserId};
use serde::{Deserialize, Serialize};

/// A grouping of similar teams across an evaluation, e.g. "Blue Cell".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamType {
    /// Stable team type identifier.
    pub id: TeamTypeId,
    /// Display name.
    pub name: String,
    /// Whether a cross-team average is computed and pushed for this type.
    pub show_type_average: bool,
}

impl TeamType {
    /// Returns the camel-cased names of fields that differ from `previous`.
    #[must_use]
    pub fn changed_fields(&self, previous: &Self) -> Vec<String> {
        let mut changed = Vec::new();
        if self.name != previous.name {
            changed.push("name".to_owned());
        }
        if self.show_type_average != previous.show_type_average {
            changed.push("showTypeAverage".to_owned());
        }
        changed
    }
}

/// One team participating in an evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    /// Stable team identifier.
    pub id: TeamId,
    /// Owning evaluation.
    pub evaluation_id: EvaluationId,
    /// Type this team belongs to.
    pub team_type_id: TeamTypeId,
    /// Display name.
    pub name: String,
}

impl Team {
    /// Returns the camel-cased names of fields that differ from `previous`.
    #[must_use]
    pub fn changed_fields(&self, previous: &Self) -> Vec<String> {
        let mut changed = Vec::new();
        if self.team_type_id != previous.team_type_id {
            changed.push("teamTypeId".to_owned());
        }
        if self.name != previous.name {
            changed.push("name".to_owned());
        }
        changed
    }
}

/// An action a team records during a move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamAction {
    /// Stable action identifier.
    pub id: TeamActionId,
    /// Owning team.
    pub team_id: TeamId,
    /// Move the action was recorded in.
    pub move_number: u32,
    /// Short title.
    pub title: String,
    /// Longer free-form description.
    pub description: String,
}

impl TeamAction {
    /// Returns the camel-cased names of fields that differ from `previous`.
    #[must_use]
    pub fn changed_fields(&self, previous: &Self) -> Vec<String> {
        let mut changed = Vec::new();
        if self.move_number != previous.move_number {
            changed.push("moveNumber".to_owned());
        }
        if self.title != previous.title {
            changed.push("title".to_owned());
        }
        if self.description != previous.description {
            changed.push("description".to_owned());
        }
        changed
    }
}

/// A duty assigned within a team, optionally held by a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDuty {
    /// Stable duty identifier.
    pub id: TeamDutyId,
    /// Owning team.
    pub team_id: TeamId,
    /// Member currently holding the duty, if assigned.
    pub holder_user_id: Option<UserId>,
    /// Short title.
    pub title: String,
}

impl TeamDuty {
    /// Returns the camel-cased names of fields that differ from `previous`.
    #[must_use]
    pub fn changed_fields(&self, previous: &Self) -> Vec<String> {
        let mut changed = Vec::new();
        if self.holder_user_id != previous.holder_user_id {
            changed.push("holderUserId".to_owned());
        }
        if self.title != previous.title {
            changed.push("title".to_owned());
        }
        changed
    }
}
