use std::sync::Arc;

use scorecast_core::{AppError, AppResult, Principal, TeamId};
use scorecast_domain::{AccessRequest, EvaluationPermission, SystemPermission, TeamPermission};
use tracing::info;

use crate::access_service::AccessService;
use crate::push_ports::{ConnectionId, PushTransport};
use crate::store_ports::RelationLookupRepository;
use crate::topics;

/// Application service implementing the client-facing join protocol.
///
/// Joins are access-controlled: the transport's topic membership table is
/// only ever mutated after the authorization gate has allowed the
/// subscription.
#[derive(Clone)]
pub struct ConnectionService {
    access: AccessService,
    lookups: Arc<dyn RelationLookupRepository>,
    transport: Arc<dyn PushTransport>,
}

impl ConnectionService {
    /// Creates a connection service.
    #[must_use]
    pub fn new(
        access: AccessService,
        lookups: Arc<dyn RelationLookupRepository>,
        transport: Arc<dyn PushTransport>,
    ) -> Self {
        Self {
            access,
            lookups,
            transport,
        }
    }

    /// Registers a fresh connection. Every client is always subscribed to
    /// its own principal-id topic.
    pub async fn register_connection(
        &self,
        connection_id: &ConnectionId,
        principal: &Principal,
    ) -> AppResult<()> {
        self.transport
            .join_topic(connection_id, topics::for_id(principal.user_id()).as_str())
            .await?;

        info!(
            connection_id = %connection_id,
            user_id = %principal.user_id(),
            "connection registered"
        );
        Ok(())
    }

    /// Subscribes a connection to a team's topic, verifying that the
    /// principal currently has access to the team, directly or as an
    /// evaluation observer. A granted join side-effect joins the parent
    /// evaluation and scoring model topics.
    pub async fn join_team_topics(
        &self,
        connection_id: &ConnectionId,
        principal: &Principal,
        team_id: TeamId,
    ) -> AppResult<()> {
        let team = self
            .lookups
            .find_team(team_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("team '{team_id}' does not exist")))?;

        let user_id = principal.user_id();
        let direct = self
            .access
            .authorize(user_id, AccessRequest::Team(team_id, TeamPermission::ViewTeam))
            .await;
        let as_observer = if direct {
            true
        } else {
            self.access
                .authorize(
                    user_id,
                    AccessRequest::Evaluation(
                        team.evaluation_id,
                        EvaluationPermission::ViewAsObserver,
                    ),
                )
                .await
        };

        if !direct && !as_observer {
            return Err(AppError::Forbidden(format!(
                "user '{user_id}' has no access to team '{team_id}'"
            )));
        }

        let evaluation = self
            .lookups
            .find_evaluation(team.evaluation_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "evaluation '{}' does not exist",
                    team.evaluation_id
                ))
            })?;

        self.transport
            .join_topic(connection_id, topics::for_id(team_id).as_str())
            .await?;
        self.transport
            .join_topic(connection_id, topics::for_id(evaluation.id).as_str())
            .await?;
        self.transport
            .join_topic(
                connection_id,
                topics::for_id(evaluation.scoring_model_id).as_str(),
            )
            .await?;

        Ok(())
    }

    /// Unsubscribes a connection from a team's topic. The parent evaluation
    /// and scoring model subscriptions stay, since other teams of the same
    /// evaluation may still be joined.
    pub async fn leave_team_topics(
        &self,
        connection_id: &ConnectionId,
        team_id: TeamId,
    ) -> AppResult<()> {
        self.transport
            .leave_topic(connection_id, topics::for_id(team_id).as_str())
            .await
    }

    /// Subscribes a connection to the admin topic carrying a superset of
    /// all traffic. Reserved for principals that may view every evaluation.
    pub async fn join_admin_topic(
        &self,
        connection_id: &ConnectionId,
        principal: &Principal,
    ) -> AppResult<()> {
        self.access
            .require_permission(
                principal.user_id(),
                AccessRequest::System(SystemPermission::ViewAllEvaluations),
            )
            .await?;

        self.transport
            .join_topic(connection_id, topics::ADMIN_TOPIC)
            .await
    }
}
