//! Seed roles built from the permission catalog.
//!
//! Roles are immutable reference data loaded at startup. Membership rows
//! reference them by id, so every seed id below is a fixed UUID.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use scorecast_core::RoleId;
use uuid::Uuid;

use crate::permission::{
    EvaluationPermission, Permission, PermissionSet, ScoringModelPermission, SystemPermission,
    TeamPermission,
};

/// A named grant preset over one resource kind's permission enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role<P: Permission> {
    id: RoleId,
    name: String,
    description: String,
    all_permissions: bool,
    permissions: BTreeSet<P>,
    immutable: bool,
}

impl<P: Permission> Role<P> {
    /// Creates a role granting an explicit permission set.
    #[must_use]
    pub fn new(
        id: RoleId,
        name: impl Into<String>,
        description: impl Into<String>,
        permissions: impl IntoIterator<Item = P>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            all_permissions: false,
            permissions: permissions.into_iter().collect(),
            immutable: false,
        }
    }

    /// Creates an owner/admin role granting every permission of the kind.
    #[must_use]
    pub fn with_all_permissions(
        id: RoleId,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            all_permissions: true,
            permissions: BTreeSet::new(),
            immutable: false,
        }
    }

    /// Marks the role as a protected built-in that cannot be deleted.
    #[must_use]
    pub fn immutable(mut self) -> Self {
        self.immutable = true;
        self
    }

    /// Returns the stable role identifier.
    #[must_use]
    pub fn id(&self) -> RoleId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the description shown in admin surfaces.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns whether the role grants every permission of its kind.
    #[must_use]
    pub fn all_permissions(&self) -> bool {
        self.all_permissions
    }

    /// Returns whether the role is a protected built-in.
    #[must_use]
    pub fn is_immutable(&self) -> bool {
        self.immutable
    }

    /// Expands the role into the permission set it grants.
    #[must_use]
    pub fn effective(&self) -> PermissionSet<P> {
        if self.all_permissions {
            PermissionSet::full()
        } else {
            PermissionSet::from_iter(self.permissions.iter().copied())
        }
    }
}

const fn seed_role_id(value: u128) -> RoleId {
    RoleId::from_uuid(Uuid::from_u128(value))
}

/// Immutable catalog of seed roles, indexed by role id per resource kind.
#[derive(Debug, Clone)]
pub struct RoleCatalog {
    system: BTreeMap<RoleId, Role<SystemPermission>>,
    evaluation: BTreeMap<RoleId, Role<EvaluationPermission>>,
    scoring_model: BTreeMap<RoleId, Role<ScoringModelPermission>>,
    team: BTreeMap<RoleId, Role<TeamPermission>>,
}

impl RoleCatalog {
    /// System administrator: every system permission.
    pub const SYSTEM_ADMINISTRATOR: RoleId = seed_role_id(0x0000_0000_0000_0000_0000_0000_0000_0101);
    /// System content developer: may create evaluations and scoring models.
    pub const SYSTEM_CONTENT_DEVELOPER: RoleId =
        seed_role_id(0x0000_0000_0000_0000_0000_0000_0000_0102);
    /// System observer: read access to every evaluation.
    pub const SYSTEM_OBSERVER: RoleId = seed_role_id(0x0000_0000_0000_0000_0000_0000_0000_0103);

    /// Evaluation facilitator: every evaluation permission.
    pub const EVALUATION_FACILITATOR: RoleId =
        seed_role_id(0x0000_0000_0000_0000_0000_0000_0000_0201);
    /// Evaluation member: plain participant.
    pub const EVALUATION_MEMBER: RoleId = seed_role_id(0x0000_0000_0000_0000_0000_0000_0000_0202);
    /// Evaluation observer: read access across teams.
    pub const EVALUATION_OBSERVER: RoleId = seed_role_id(0x0000_0000_0000_0000_0000_0000_0000_0203);
    /// Evaluation score contributor: sees current-move official scores.
    pub const EVALUATION_SCORE_CONTRIBUTOR: RoleId =
        seed_role_id(0x0000_0000_0000_0000_0000_0000_0000_0204);

    /// Scoring model owner: every scoring model permission.
    pub const SCORING_MODEL_OWNER: RoleId = seed_role_id(0x0000_0000_0000_0000_0000_0000_0000_0301);
    /// Scoring model editor: may edit categories and options.
    pub const SCORING_MODEL_EDITOR: RoleId =
        seed_role_id(0x0000_0000_0000_0000_0000_0000_0000_0302);
    /// Scoring model reviewer: read-only access.
    pub const SCORING_MODEL_REVIEWER: RoleId =
        seed_role_id(0x0000_0000_0000_0000_0000_0000_0000_0303);

    /// Team facilitator: every team permission.
    pub const TEAM_FACILITATOR: RoleId = seed_role_id(0x0000_0000_0000_0000_0000_0000_0000_0401);
    /// Team member: may view the team and submit scores.
    pub const TEAM_MEMBER: RoleId = seed_role_id(0x0000_0000_0000_0000_0000_0000_0000_0402);
    /// Team observer: read-only access to the team.
    pub const TEAM_OBSERVER: RoleId = seed_role_id(0x0000_0000_0000_0000_0000_0000_0000_0403);

    /// Builds the catalog of built-in roles.
    #[must_use]
    pub fn seed() -> Self {
        let system = [
            Role::with_all_permissions(
                Self::SYSTEM_ADMINISTRATOR,
                "Administrator",
                "Full control over users, groups, evaluations and scoring models.",
            )
            .immutable(),
            Role::new(
                Self::SYSTEM_CONTENT_DEVELOPER,
                "Content Developer",
                "May create evaluations and scoring models.",
                [
                    SystemPermission::CreateEvaluation,
                    SystemPermission::CreateScoringModel,
                ],
            )
            .immutable(),
            Role::new(
                Self::SYSTEM_OBSERVER,
                "Observer",
                "Read access to every evaluation.",
                [SystemPermission::ViewAllEvaluations],
            )
            .immutable(),
        ];

        let evaluation = [
            Role::with_all_permissions(
                Self::EVALUATION_FACILITATOR,
                "Facilitator",
                "Runs the evaluation, including move advancement and team setup.",
            ),
            Role::new(
                Self::EVALUATION_MEMBER,
                "Member",
                "Participates in the evaluation.",
                [EvaluationPermission::ViewEvaluation],
            ),
            Role::new(
                Self::EVALUATION_OBSERVER,
                "Observer",
                "Observes every team without contributing.",
                [
                    EvaluationPermission::ViewEvaluation,
                    EvaluationPermission::ViewAsObserver,
                ],
            ),
            Role::new(
                Self::EVALUATION_SCORE_CONTRIBUTOR,
                "Score Contributor",
                "Sees current-move official scores before the move advances.",
                [
                    EvaluationPermission::ViewEvaluation,
                    EvaluationPermission::ViewOfficialScores,
                ],
            ),
        ];

        let scoring_model = [
            Role::with_all_permissions(
                Self::SCORING_MODEL_OWNER,
                "Owner",
                "Full control over the scoring model.",
            ),
            Role::new(
                Self::SCORING_MODEL_EDITOR,
                "Editor",
                "May edit the model, its categories and options.",
                [
                    ScoringModelPermission::ViewScoringModel,
                    ScoringModelPermission::EditScoringModel,
                ],
            ),
            Role::new(
                Self::SCORING_MODEL_REVIEWER,
                "Reviewer",
                "Read-only access to the scoring model.",
                [ScoringModelPermission::ViewScoringModel],
            ),
        ];

        let team = [
            Role::with_all_permissions(
                Self::TEAM_FACILITATOR,
                "Facilitator",
                "Full control over the team.",
            ),
            Role::new(
                Self::TEAM_MEMBER,
                "Member",
                "May view the team and submit scores.",
                [TeamPermission::ViewTeam, TeamPermission::SubmitScores],
            ),
            Role::new(
                Self::TEAM_OBSERVER,
                "Observer",
                "Read-only access to the team.",
                [TeamPermission::ViewTeam],
            ),
        ];

        Self {
            system: system.into_iter().map(|role| (role.id(), role)).collect(),
            evaluation: evaluation
                .into_iter()
                .map(|role| (role.id(), role))
                .collect(),
            scoring_model: scoring_model
                .into_iter()
                .map(|role| (role.id(), role))
                .collect(),
            team: team.into_iter().map(|role| (role.id(), role)).collect(),
        }
    }

    /// Looks up a system role by id.
    #[must_use]
    pub fn system_role(&self, id: RoleId) -> Option<&Role<SystemPermission>> {
        self.system.get(&id)
    }

    /// Looks up an evaluation role by id.
    #[must_use]
    pub fn evaluation_role(&self, id: RoleId) -> Option<&Role<EvaluationPermission>> {
        self.evaluation.get(&id)
    }

    /// Looks up a scoring model role by id.
    #[must_use]
    pub fn scoring_model_role(&self, id: RoleId) -> Option<&Role<ScoringModelPermission>> {
        self.scoring_model.get(&id)
    }

    /// Looks up a team role by id.
    #[must_use]
    pub fn team_role(&self, id: RoleId) -> Option<&Role<TeamPermission>> {
        self.team.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use crate::permission::{EvaluationPermission, SystemPermission};

    use super::RoleCatalog;

    #[test]
    fn seed_catalog_resolves_every_builtin() {
        let catalog = RoleCatalog::seed();
        assert!(catalog.system_role(RoleCatalog::SYSTEM_ADMINISTRATOR).is_some());
        assert!(catalog.evaluation_role(RoleCatalog::EVALUATION_MEMBER).is_some());
        assert!(catalog.scoring_model_role(RoleCatalog::SCORING_MODEL_EDITOR).is_some());
        assert!(catalog.team_role(RoleCatalog::TEAM_OBSERVER).is_some());
    }

    #[test]
    fn all_permissions_role_expands_to_full_set() {
        let catalog = RoleCatalog::seed();
        let facilitator = catalog.evaluation_role(RoleCatalog::EVALUATION_FACILITATOR);
        let Some(facilitator) = facilitator else {
            panic!("facilitator seed role missing");
        };
        let effective = facilitator.effective();
        assert!(effective.contains(EvaluationPermission::AdvanceMove));
        assert!(effective.contains(EvaluationPermission::ViewOfficialScores));
        assert!(effective.is_full());
    }

    #[test]
    fn system_builtins_are_immutable() {
        let catalog = RoleCatalog::seed();
        let Some(observer) = catalog.system_role(RoleCatalog::SYSTEM_OBSERVER) else {
            panic!("observer seed role missing");
        };
        assert!(observer.is_immutable());
        assert!(observer.effective().contains(SystemPermission::ViewAllEvaluations));
    }
}
