use std::sync::Arc;

use scorecast_core::{AppError, AppResult, EvaluationId, RoleId, ScoringModelId, TeamId, UserId};
use scorecast_domain::{
    AccessRequest, EvaluationPermission, Permission, PermissionSet, Role, RoleCatalog,
    ScoringModelPermission, SystemPermission, TeamPermission,
};
use tracing::warn;

use crate::access_ports::AccessRepository;

#[cfg(test)]
mod tests;

/// Application service resolving effective permissions and gating requests.
///
/// Resolution is a monotonic union over every role reachable directly or
/// through one level of group membership; there is no explicit-deny concept
/// and no ordering between competing roles.
#[derive(Clone)]
pub struct AccessService {
    repository: Arc<dyn AccessRepository>,
    catalog: Arc<RoleCatalog>,
}

impl AccessService {
    /// Creates an access service from a repository and the seed role catalog.
    #[must_use]
    pub fn new(repository: Arc<dyn AccessRepository>, catalog: Arc<RoleCatalog>) -> Self {
        Self {
            repository,
            catalog,
        }
    }

    /// Returns the seed role catalog.
    #[must_use]
    pub fn catalog(&self) -> &RoleCatalog {
        self.catalog.as_ref()
    }

    /// Resolves the user's effective system permissions from the single
    /// system role field on the account. No membership table is involved.
    pub async fn system_permissions(
        &self,
        user_id: UserId,
    ) -> AppResult<PermissionSet<SystemPermission>> {
        let Some(user) = self.repository.find_user(user_id).await? else {
            return Ok(PermissionSet::empty());
        };
        let Some(role_id) = user.system_role_id else {
            return Ok(PermissionSet::empty());
        };

        Ok(resolve_roles([role_id], |id| self.catalog.system_role(id)))
    }

    /// Resolves the user's effective permissions on one evaluation.
    pub async fn evaluation_permissions(
        &self,
        user_id: UserId,
        evaluation_id: EvaluationId,
    ) -> AppResult<PermissionSet<EvaluationPermission>> {
        let group_ids = self.repository.group_ids_for_user(user_id).await?;
        let role_ids = self
            .repository
            .list_evaluation_memberships(evaluation_id)
            .await?
            .into_iter()
            .filter(|row| row.principal.applies_to(user_id, &group_ids))
            .map(|row| row.role_id);

        Ok(resolve_roles(role_ids, |id| self.catalog.evaluation_role(id)))
    }

    /// Resolves the user's effective permissions on one scoring model.
    pub async fn scoring_model_permissions(
        &self,
        user_id: UserId,
        scoring_model_id: ScoringModelId,
    ) -> AppResult<PermissionSet<ScoringModelPermission>> {
        let group_ids = self.repository.group_ids_for_user(user_id).await?;
        let role_ids = self
            .repository
            .list_scoring_model_memberships(scoring_model_id)
            .await?
            .into_iter()
            .filter(|row| row.principal.applies_to(user_id, &group_ids))
            .map(|row| row.role_id);

        Ok(resolve_roles(role_ids, |id| {
            self.catalog.scoring_model_role(id)
        }))
    }

    /// Resolves the user's effective permissions on one team.
    pub async fn team_permissions(
        &self,
        user_id: UserId,
        team_id: TeamId,
    ) -> AppResult<PermissionSet<TeamPermission>> {
        let role_ids = self
            .repository
            .find_team_membership(team_id, user_id)
            .await?
            .map(|row| row.role_id);

        Ok(resolve_roles(role_ids, |id| self.catalog.team_role(id)))
    }

    /// Decides one permission check. Fails closed: any resolution error is
    /// logged and yields `false`, never an error that could bypass a check,
    /// and a legitimate deny is a plain `false`.
    pub async fn authorize(&self, user_id: UserId, request: AccessRequest) -> bool {
        match self.permitted(user_id, request).await {
            Ok(permitted) => permitted,
            Err(error) => {
                warn!(
                    user_id = %user_id,
                    error = %error,
                    "permission resolution failed, denying by default"
                );
                false
            }
        }
    }

    /// Ensures the user holds the required permission, for callers that want
    /// a typed rejection instead of a boolean.
    pub async fn require_permission(
        &self,
        user_id: UserId,
        request: AccessRequest,
    ) -> AppResult<()> {
        if self.authorize(user_id, request).await {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "user '{user_id}' is missing a required {} permission",
                request.kind().as_str()
            )))
        }
    }

    async fn permitted(&self, user_id: UserId, request: AccessRequest) -> AppResult<bool> {
        match request {
            AccessRequest::System(permission) => Ok(self
                .system_permissions(user_id)
                .await?
                .contains(permission)),
            AccessRequest::Evaluation(evaluation_id, permission) => Ok(self
                .evaluation_permissions(user_id, evaluation_id)
                .await?
                .contains(permission)),
            AccessRequest::ScoringModel(scoring_model_id, permission) => Ok(self
                .scoring_model_permissions(user_id, scoring_model_id)
                .await?
                .contains(permission)),
            AccessRequest::Team(team_id, permission) => Ok(self
                .team_permissions(user_id, team_id)
                .await?
                .contains(permission)),
        }
    }
}

/// Unions the permission sets of every matched role. A role with
/// `all_permissions` short-circuits to the full set; a dangling role id
/// contributes nothing and is logged, never treated as a fault.
fn resolve_roles<'a, P: Permission>(
    role_ids: impl IntoIterator<Item = RoleId>,
    lookup: impl Fn(RoleId) -> Option<&'a Role<P>>,
) -> PermissionSet<P> {
    let mut effective = PermissionSet::empty();
    for role_id in role_ids {
        match lookup(role_id) {
            Some(role) => {
                if role.all_permissions() {
                    return PermissionSet::full();
                }
                effective.union_with(&role.effective());
            }
            None => {
                warn!(role_id = %role_id, "membership references unknown role, ignoring");
            }
        }
    }

    effective
}
