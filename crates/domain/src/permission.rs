//! Permission catalog for every resource kind.
//!
//! Persisted role rows reference permissions by ordinal, so the explicit
//! discriminants below are a storage contract: renumbering them is a breaking
//! migration, not a code change.

use std::collections::BTreeSet;
use std::fmt::Debug;
use std::hash::Hash;

use scorecast_core::{AppError, AppResult, EvaluationId, ScoringModelId, TeamId};
use serde::{Deserialize, Serialize};

/// Resource kinds that carry their own permission enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Global, instance-less scope.
    System,
    /// One evaluation exercise.
    Evaluation,
    /// One scoring model.
    ScoringModel,
    /// One team within an evaluation.
    Team,
}

impl ResourceKind {
    /// Returns a stable storage value for this resource kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Evaluation => "evaluation",
            Self::ScoringModel => "scoring_model",
            Self::Team => "team",
        }
    }
}

/// Common contract of every per-kind permission enumeration.
pub trait Permission:
    Copy + Eq + Ord + Hash + Debug + Send + Sync + Serialize + 'static
{
    /// Resource kind this permission enumeration belongs to.
    const KIND: ResourceKind;

    /// Returns all permissions defined for the resource kind, in ordinal order.
    fn all() -> &'static [Self];

    /// Returns the stable persisted ordinal of this permission.
    fn as_ordinal(&self) -> u16;

    /// Parses a persisted ordinal back into a permission.
    fn from_ordinal(ordinal: u16) -> AppResult<Self>;

    /// Returns a stable human-readable value for this permission.
    fn as_str(&self) -> &'static str;
}

macro_rules! permission_enum {
    (
        $(#[$docs:meta])*
        $name:ident for $kind:expr;
        $( $(#[$variant_docs:meta])* $variant:ident = $ordinal:literal => $label:literal ),+ $(,)?
    ) => {
        $(#[$docs])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$variant_docs])* $variant = $ordinal, )+
        }

        impl Permission for $name {
            const KIND: ResourceKind = $kind;

            fn all() -> &'static [Self] {
                const ALL: &[$name] = &[ $( $name::$variant, )+ ];
                ALL
            }

            fn as_ordinal(&self) -> u16 {
                *self as u16
            }

            fn from_ordinal(ordinal: u16) -> AppResult<Self> {
                match ordinal {
                    $( $ordinal => Ok(Self::$variant), )+
                    other => Err(AppError::Validation(format!(
                        "unknown {} permission ordinal {other}",
                        Self::KIND.as_str()
                    ))),
                }
            }

            fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $label, )+
                }
            }
        }
    };
}

permission_enum!(
    /// Permissions applying to the whole installation.
    SystemPermission for ResourceKind::System;
    /// Allows creating, editing and deleting user accounts.
    ManageUsers = 0 => "system.manage_users",
    /// Allows creating, editing and deleting groups.
    ManageGroups = 1 => "system.manage_groups",
    /// Allows creating new evaluations.
    CreateEvaluation = 2 => "system.create_evaluation",
    /// Allows creating new scoring models.
    CreateScoringModel = 3 => "system.create_scoring_model",
    /// Allows read access to every evaluation without a per-evaluation grant.
    ViewAllEvaluations = 4 => "system.view_all_evaluations",
);

permission_enum!(
    /// Permissions scoped to one evaluation.
    EvaluationPermission for ResourceKind::Evaluation;
    /// Allows viewing the evaluation and its non-gated content.
    ViewEvaluation = 0 => "evaluation.view",
    /// Allows editing evaluation settings.
    EditEvaluation = 1 => "evaluation.edit",
    /// Allows granting and revoking evaluation memberships.
    ManageEvaluationUsers = 2 => "evaluation.manage_users",
    /// Allows creating, editing and deleting teams.
    ManageTeams = 3 => "evaluation.manage_teams",
    /// Allows advancing the current move number.
    AdvanceMove = 4 => "evaluation.advance_move",
    /// Allows observer access to every team in the evaluation.
    ViewAsObserver = 5 => "evaluation.view_as_observer",
    /// Allows seeing current-move official scores before the move advances.
    ViewOfficialScores = 6 => "evaluation.view_official_scores",
);

permission_enum!(
    /// Permissions scoped to one scoring model.
    ScoringModelPermission for ResourceKind::ScoringModel;
    /// Allows viewing the model, its categories and options.
    ViewScoringModel = 0 => "scoring_model.view",
    /// Allows editing the model, its categories and options.
    EditScoringModel = 1 => "scoring_model.edit",
    /// Allows granting and revoking scoring model memberships.
    ManageScoringModelUsers = 2 => "scoring_model.manage_users",
);

permission_enum!(
    /// Permissions scoped to one team.
    TeamPermission for ResourceKind::Team;
    /// Allows viewing the team and its content.
    ViewTeam = 0 => "team.view",
    /// Allows editing team content such as actions and duties.
    EditTeam = 1 => "team.edit",
    /// Allows submitting scores on behalf of the team.
    SubmitScores = 2 => "team.submit_scores",
    /// Allows granting and revoking team memberships.
    ManageTeamUsers = 3 => "team.manage_users",
);

/// Effective permission set resolved for one principal on one resource.
///
/// `all` is the `all_permissions` escape hatch from owner/admin roles; it is a
/// superset of the explicit set regardless of what the explicit set holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionSet<P: Permission> {
    all: bool,
    explicit: BTreeSet<P>,
}

impl<P: Permission> PermissionSet<P> {
    /// Creates an empty set, the default-deny result.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            all: false,
            explicit: BTreeSet::new(),
        }
    }

    /// Creates the full set covering every permission of the resource kind.
    #[must_use]
    pub fn full() -> Self {
        Self {
            all: true,
            explicit: BTreeSet::new(),
        }
    }

    /// Creates a set from explicit permissions.
    #[must_use]
    pub fn from_iter(permissions: impl IntoIterator<Item = P>) -> Self {
        Self {
            all: false,
            explicit: permissions.into_iter().collect(),
        }
    }

    /// Returns whether the set grants the given permission.
    #[must_use]
    pub fn contains(&self, permission: P) -> bool {
        self.all || self.explicit.contains(&permission)
    }

    /// Returns whether the set grants nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.all && self.explicit.is_empty()
    }

    /// Returns whether the set covers every permission of the resource kind.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.all || P::all().iter().all(|permission| self.explicit.contains(permission))
    }

    /// Unions another set into this one. Permissions are additive, never
    /// subtractive; there is no explicit-deny concept.
    pub fn union_with(&mut self, other: &Self) {
        if other.all {
            self.all = true;
        }
        self.explicit.extend(other.explicit.iter().copied());
    }

    /// Returns the granted permissions as a sorted list.
    #[must_use]
    pub fn to_vec(&self) -> Vec<P> {
        if self.all {
            P::all().to_vec()
        } else {
            self.explicit.iter().copied().collect()
        }
    }
}

impl<P: Permission> Default for PermissionSet<P> {
    fn default() -> Self {
        Self::empty()
    }
}

/// One permission check against one resource instance.
///
/// Pairing the resource id with its kind-specific permission by construction
/// rules out checking a team permission against an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRequest {
    /// System-wide permission check.
    System(SystemPermission),
    /// Permission check against one evaluation.
    Evaluation(EvaluationId, EvaluationPermission),
    /// Permission check against one scoring model.
    ScoringModel(ScoringModelId, ScoringModelPermission),
    /// Permission check against one team.
    Team(TeamId, TeamPermission),
}

impl AccessRequest {
    /// Returns the resource kind this request targets.
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::System(_) => ResourceKind::System,
            Self::Evaluation(_, _) => ResourceKind::Evaluation,
            Self::ScoringModel(_, _) => ResourceKind::ScoringModel,
            Self::Team(_, _) => ResourceKind::Team,
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{
        EvaluationPermission, Permission, PermissionSet, SystemPermission, TeamPermission,
    };

    #[test]
    fn ordinals_are_stable_and_dense() {
        for (index, permission) in EvaluationPermission::all().iter().enumerate() {
            assert_eq!(usize::from(permission.as_ordinal()), index);
        }
    }

    #[test]
    fn full_set_contains_every_permission() {
        let set = PermissionSet::<TeamPermission>::full();
        for permission in TeamPermission::all() {
            assert!(set.contains(*permission));
        }
    }

    #[test]
    fn union_is_monotonic() {
        let mut set = PermissionSet::from_iter([EvaluationPermission::ViewEvaluation]);
        let before = set.to_vec();
        set.union_with(&PermissionSet::from_iter([
            EvaluationPermission::AdvanceMove,
        ]));
        for permission in before {
            assert!(set.contains(permission));
        }
        assert!(set.contains(EvaluationPermission::AdvanceMove));
    }

    proptest! {
        #[test]
        fn system_ordinal_roundtrip(index in 0usize..SystemPermission::all().len()) {
            let permission = SystemPermission::all()[index];
            let restored = SystemPermission::from_ordinal(permission.as_ordinal());
            prop_assert_eq!(restored.ok(), Some(permission));
        }

        #[test]
        fn unknown_ordinal_is_rejected(ordinal in 100u16..u16::MAX) {
            prop_assert!(EvaluationPermission::from_ordinal(ordinal).is_err());
        }
    }
}
