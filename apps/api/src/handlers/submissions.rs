use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use scorecast_core::SubmissionId;
use scorecast_domain::Submission;

use crate::dto::SaveSubmissionRequest;
use crate::error::ApiResult;
use crate::principal::CurrentPrincipal;
use crate::state::AppState;

pub async fn save_submission_handler(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Json(payload): Json<SaveSubmissionRequest>,
) -> ApiResult<StatusCode> {
    let submission = Submission::from(payload);
    state
        .exercise_service
        .upsert_submission(&principal, submission)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_submission_handler(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(submission_id): Path<SubmissionId>,
) -> ApiResult<StatusCode> {
    state
        .exercise_service
        .delete_submission(&principal, submission_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::Json;
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use scorecast_application::{
        AccessService, ChangeBus, ChangeBusReceiver, ConnectionService, ExerciseRepository,
        ExerciseService,
    };
    use scorecast_core::{EvaluationId, Principal, TeamId, UserId};
    use scorecast_domain::{RoleCatalog, SubmissionScope, TeamMembership};
    use scorecast_infrastructure::{InMemoryExerciseStore, WebSocketPushTransport};

    use crate::dto::SaveSubmissionRequest;
    use crate::principal::CurrentPrincipal;
    use crate::state::AppState;

    use super::save_submission_handler;

    // Mirrors the production wiring in main, with the in-memory store
    // standing in for the database.
    fn app_state(store: Arc<InMemoryExerciseStore>) -> (AppState, ChangeBusReceiver) {
        let transport = Arc::new(WebSocketPushTransport::new());
        let access = AccessService::new(store.clone(), Arc::new(RoleCatalog::seed()));
        let (bus, receiver) = ChangeBus::channel();

        let state = AppState {
            connection_service: ConnectionService::new(
                access.clone(),
                store.clone(),
                transport.clone(),
            ),
            exercise_service: ExerciseService::new(access, store.clone(), store, bus),
            transport,
        };
        (state, receiver)
    }

    fn request(user_id: UserId, team_id: TeamId) -> SaveSubmissionRequest {
        SaveSubmissionRequest {
            id: None,
            evaluation_id: EvaluationId::new(),
            move_number: 1,
            scope: SubmissionScope::User { user_id, team_id },
            score: 64.0,
            selections: Vec::new(),
        }
    }

    #[tokio::test]
    async fn team_member_saves_through_the_handler_and_store() {
        let user_id = UserId::new();
        let team_id = TeamId::new();
        let store = Arc::new(InMemoryExerciseStore::new());
        let seeded = store
            .save_team_membership(TeamMembership {
                team_id,
                user_id,
                role_id: RoleCatalog::TEAM_MEMBER,
            })
            .await;
        assert!(seeded.is_ok());
        let (state, mut receiver) = app_state(store);

        let result = save_submission_handler(
            State(state),
            CurrentPrincipal(Principal::new(user_id, "Robin")),
            Json(request(user_id, team_id)),
        )
        .await;

        let Ok(status) = result else {
            panic!("expected the submission to be accepted");
        };
        assert_eq!(status, StatusCode::NO_CONTENT);
        let Some(change_set) = receiver.try_recv().ok() else {
            panic!("expected the committed change set on the bus");
        };
        assert_eq!(change_set.changes.len(), 1);
    }

    #[tokio::test]
    async fn handler_maps_a_denied_write_to_forbidden() {
        let store = Arc::new(InMemoryExerciseStore::new());
        let (state, mut receiver) = app_state(store);

        let result = save_submission_handler(
            State(state),
            CurrentPrincipal(Principal::new(UserId::new(), "Robin")),
            Json(request(UserId::new(), TeamId::new())),
        )
        .await;

        let Err(error) = result else {
            panic!("expected the write to be rejected");
        };
        assert_eq!(error.into_response().status(), StatusCode::FORBIDDEN);
        assert!(receiver.try_recv().is_err());
    }
}
