use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use scorecast_application::AccessRepository;
use scorecast_core::{
    AppError, AppResult, EvaluationId, GroupId, RoleId, ScoringModelId, TeamId, UserId,
};
use scorecast_domain::{
    EvaluationMembership, PrincipalRef, ScoringModelMembership, TeamMembership, User,
};

/// PostgreSQL-backed repository for the membership rows behind permission
/// resolution.
#[derive(Clone)]
pub struct PostgresAccessRepository {
    pool: PgPool,
}

impl PostgresAccessRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    display_name: String,
    system_role_id: Option<Uuid>,
}

#[derive(Debug, FromRow)]
struct GroupIdRow {
    group_id: Uuid,
}

#[derive(Debug, FromRow)]
struct EvaluationMembershipRow {
    evaluation_id: Uuid,
    principal_kind: String,
    principal_id: Uuid,
    role_id: Uuid,
}

#[derive(Debug, FromRow)]
struct ScoringModelMembershipRow {
    scoring_model_id: Uuid,
    principal_kind: String,
    principal_id: Uuid,
    role_id: Uuid,
}

#[derive(Debug, FromRow)]
struct TeamMembershipRow {
    team_id: Uuid,
    user_id: Uuid,
    role_id: Uuid,
}

/// Decodes the two-column principal encoding of a membership row.
pub(crate) fn decode_principal(kind: &str, id: Uuid) -> AppResult<PrincipalRef> {
    match kind {
        "user" => Ok(PrincipalRef::User(UserId::from_uuid(id))),
        "group" => Ok(PrincipalRef::Group(GroupId::from_uuid(id))),
        other => Err(AppError::Internal(format!(
            "unknown principal kind '{other}' in membership row"
        ))),
    }
}

/// Encodes a principal into its two-column form.
pub(crate) fn encode_principal(principal: PrincipalRef) -> (&'static str, Uuid) {
    match principal {
        PrincipalRef::User(user_id) => ("user", user_id.as_uuid()),
        PrincipalRef::Group(group_id) => ("group", group_id.as_uuid()),
    }
}

#[async_trait]
impl AccessRepository for PostgresAccessRepository {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, display_name, system_role_id
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load user: {error}")))?;

        Ok(row.map(|row| User {
            id: UserId::from_uuid(row.id),
            display_name: row.display_name,
            system_role_id: row.system_role_id.map(RoleId::from_uuid),
        }))
    }

    async fn group_ids_for_user(&self, user_id: UserId) -> AppResult<Vec<GroupId>> {
        let rows = sqlx::query_as::<_, GroupIdRow>(
            r#"
            SELECT group_id
            FROM group_memberships
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load group memberships: {error}"))
        })?;

        Ok(rows
            .into_iter()
            .map(|row| GroupId::from_uuid(row.group_id))
            .collect())
    }

    async fn list_evaluation_memberships(
        &self,
        evaluation_id: EvaluationId,
    ) -> AppResult<Vec<EvaluationMembership>> {
        let rows = sqlx::query_as::<_, EvaluationMembershipRow>(
            r#"
            SELECT evaluation_id, principal_kind, principal_id, role_id
            FROM evaluation_memberships
            WHERE evaluation_id = $1
            "#,
        )
        .bind(evaluation_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load evaluation memberships: {error}"))
        })?;

        rows.into_iter()
            .map(|row| {
                Ok(EvaluationMembership {
                    evaluation_id: EvaluationId::from_uuid(row.evaluation_id),
                    principal: decode_principal(row.principal_kind.as_str(), row.principal_id)?,
                    role_id: RoleId::from_uuid(row.role_id),
                })
            })
            .collect()
    }

    async fn list_scoring_model_memberships(
        &self,
        scoring_model_id: ScoringModelId,
    ) -> AppResult<Vec<ScoringModelMembership>> {
        let rows = sqlx::query_as::<_, ScoringModelMembershipRow>(
            r#"
            SELECT scoring_model_id, principal_kind, principal_id, role_id
            FROM scoring_model_memberships
            WHERE scoring_model_id = $1
            "#,
        )
        .bind(scoring_model_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load scoring model memberships: {error}"))
        })?;

        rows.into_iter()
            .map(|row| {
                Ok(ScoringModelMembership {
                    scoring_model_id: ScoringModelId::from_uuid(row.scoring_model_id),
                    principal: decode_principal(row.principal_kind.as_str(), row.principal_id)?,
                    role_id: RoleId::from_uuid(row.role_id),
                })
            })
            .collect()
    }

    async fn find_team_membership(
        &self,
        team_id: TeamId,
        user_id: UserId,
    ) -> AppResult<Option<TeamMembership>> {
        let row = sqlx::query_as::<_, TeamMembershipRow>(
            r#"
            SELECT team_id, user_id, role_id
            FROM team_memberships
            WHERE team_id = $1 AND user_id = $2
            "#,
        )
        .bind(team_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load team membership: {error}"))
        })?;

        Ok(row.map(|row| TeamMembership {
            team_id: TeamId::from_uuid(row.team_id),
            user_id: UserId::from_uuid(row.user_id),
            role_id: RoleId::from_uuid(row.role_id),
        }))
    }
}
