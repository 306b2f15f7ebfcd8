use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use scorecast_application::ConnectionId;
use scorecast_core::{Principal, TeamId};
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::principal::CurrentPrincipal;
use crate::state::AppState;

/// Commands a client may send over its socket after connecting.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", tag = "action")]
enum ClientCommand {
    #[serde(rename_all = "camelCase")]
    JoinTeam { team_id: TeamId },
    #[serde(rename_all = "camelCase")]
    LeaveTeam { team_id: TeamId },
    JoinAdmin,
}

pub async fn ws_handler(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    upgrade: WebSocketUpgrade,
) -> Response {
    upgrade.on_upgrade(move |socket| serve_connection(state, principal, socket))
}

/// Drives one websocket connection: drains the push frame queue into the
/// socket while applying join and leave commands from the client. A denied
/// join is logged and ignored; it never terminates the connection.
async fn serve_connection(state: AppState, principal: Principal, mut socket: WebSocket) {
    let connection_id = ConnectionId::new(Uuid::new_v4().to_string());
    let mut frames = state
        .transport
        .register_connection(connection_id.clone())
        .await;

    if let Err(error) = state
        .connection_service
        .register_connection(&connection_id, &principal)
        .await
    {
        warn!(connection_id = %connection_id, %error, "connection registration failed");
        state.transport.unregister_connection(&connection_id).await;
        return;
    }

    loop {
        tokio::select! {
            frame = frames.recv() => {
                let Some(frame) = frame else {
                    break;
                };
                let text = match serde_json::to_string(&frame) {
                    Ok(text) => text,
                    Err(error) => {
                        warn!(connection_id = %connection_id, %error, "unserializable push frame");
                        continue;
                    }
                };
                if socket.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            message = socket.recv() => {
                match message {
                    Some(Ok(Message::Text(text))) => {
                        handle_command(&state, &connection_id, &principal, text.as_str()).await;
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    state.transport.unregister_connection(&connection_id).await;
    debug!(connection_id = %connection_id, "connection closed");
}

async fn handle_command(
    state: &AppState,
    connection_id: &ConnectionId,
    principal: &Principal,
    text: &str,
) {
    let command = match serde_json::from_str::<ClientCommand>(text) {
        Ok(command) => command,
        Err(error) => {
            warn!(connection_id = %connection_id, %error, "unparseable client command");
            return;
        }
    };

    let result = match command {
        ClientCommand::JoinTeam { team_id } => {
            state
                .connection_service
                .join_team_topics(connection_id, principal, team_id)
                .await
        }
        ClientCommand::LeaveTeam { team_id } => {
            state
                .connection_service
                .leave_team_topics(connection_id, team_id)
                .await
        }
        ClientCommand::JoinAdmin => {
            state
                .connection_service
                .join_admin_topic(connection_id, principal)
                .await
        }
    };

    if let Err(error) = result {
        warn!(connection_id = %connection_id, %error, "client command rejected");
    }
}
