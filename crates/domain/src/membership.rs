//! Role grants binding principals to resource instances.

use scorecast_core::{EvaluationId, GroupId, RoleId, ScoringModelId, TeamId, UserId};
use serde::{Deserialize, Serialize};

/// The principal side of a membership row.
///
/// Group grants expand to all current group members at resolution time, not
/// at grant time. Modelling this as a sum type rules out the invalid
/// "both set / both null" states of a two-nullable-column row by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrincipalRef {
    /// Direct grant to one user.
    User(UserId),
    /// Indirect grant to every current member of a group.
    Group(GroupId),
}

impl PrincipalRef {
    /// Returns whether this grant applies to the given user with the given
    /// current group memberships. Group expansion is one level only; nested
    /// groups are not followed.
    #[must_use]
    pub fn applies_to(&self, user_id: UserId, group_ids: &[GroupId]) -> bool {
        match self {
            Self::User(id) => *id == user_id,
            Self::Group(id) => group_ids.contains(id),
        }
    }
}

/// A role grant on one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationMembership {
    /// Evaluation the grant applies to.
    pub evaluation_id: EvaluationId,
    /// User or group receiving the grant.
    pub principal: PrincipalRef,
    /// Granted evaluation role.
    pub role_id: RoleId,
}

impl EvaluationMembership {
    /// Returns the camel-cased names of fields that differ from `previous`.
    #[must_use]
    pub fn changed_fields(&self, previous: &Self) -> Vec<String> {
        let mut changed = Vec::new();
        if self.role_id != previous.role_id {
            changed.push("roleId".to_owned());
        }
        changed
    }
}

/// A role grant on one scoring model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringModelMembership {
    /// Scoring model the grant applies to.
    pub scoring_model_id: ScoringModelId,
    /// User or group receiving the grant.
    pub principal: PrincipalRef,
    /// Granted scoring model role.
    pub role_id: RoleId,
}

impl ScoringModelMembership {
    /// Returns the camel-cased names of fields that differ from `previous`.
    #[must_use]
    pub fn changed_fields(&self, previous: &Self) -> Vec<String> {
        let mut changed = Vec::new();
        if self.role_id != previous.role_id {
            changed.push("roleId".to_owned());
        }
        changed
    }
}

/// A role grant on one team. Team grants are always direct to a user; the
/// group indirection of the other membership kinds does not apply here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMembership {
    /// Team the grant applies to.
    pub team_id: TeamId,
    /// User receiving the grant.
    pub user_id: UserId,
    /// Granted team role.
    pub role_id: RoleId,
}

impl TeamMembership {
    /// Returns the camel-cased names of fields that differ from `previous`.
    #[must_use]
    pub fn changed_fields(&self, previous: &Self) -> Vec<String> {
        let mut changed = Vec::new();
        if self.role_id != previous.role_id {
            changed.push("roleId".to_owned());
        }
        changed
    }
}

/// A named collection of users, used purely as an indirection for granting
/// roles to many users at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Stable group identifier.
    pub id: GroupId,
    /// Display name.
    pub name: String,
}

/// One user's membership in one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMembership {
    /// Group containing the user.
    pub group_id: GroupId,
    /// Member user.
    pub user_id: UserId,
}
