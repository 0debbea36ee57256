use std::sync::Arc;

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use locker_core::board::BoardView;
use locker_core::error::CoreError;
use locker_events::BoardFeed;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{authenticate, AuthUser};
use crate::query::TokenParams;
use crate::state::AppState;
use crate::ws::manager::WsManager;

/// Outbound frame carrying the current board.
#[derive(Serialize)]
struct BoardMessage<'a> {
    r#type: &'static str,
    data: &'a BoardView,
}

fn board_frame(view: &BoardView) -> Option<Message> {
    let payload = BoardMessage {
        r#type: "board",
        data: view,
    };
    match serde_json::to_string(&payload) {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode board view");
            None
        }
    }
}

/// GET /api/v1/ws?token=<jwt>
///
/// Browsers cannot set headers on an upgrade request, so the access token
/// travels in the query string. The token is checked before the upgrade
/// request itself, so unauthenticated callers always get a 401.
pub async fn ws_handler(
    State(state): State<AppState>,
    Query(params): Query<TokenParams>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> AppResult<Response> {
    let token = params.token.ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized("Missing token query parameter".into()))
    })?;
    let user = authenticate(&token, &state.config.jwt)?;
    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return Ok(rejection.into_response()),
    };
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, user)))
}

/// Manage a single board connection after upgrade.
///
/// The connection owns a [`BoardFeed`]; every recomputed view is pushed to
/// the client. Disconnecting drops the feed and with it all of its
/// subscriptions.
async fn handle_socket(socket: WebSocket, state: AppState, user: AuthUser) {
    let ws_manager: Arc<WsManager> = Arc::clone(&state.ws_manager);
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, principal = %user.id(), "WebSocket connected");

    let mut rx = ws_manager.add(conn_id.clone(), user.id().to_string()).await;
    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    // Board task: push every view change.
    let feed = BoardFeed::start(Arc::clone(&state.store), &state.event_bus);
    let mut views = feed.subscribe();
    let board_manager = Arc::clone(&ws_manager);
    let board_conn_id = conn_id.clone();
    let board_task = tokio::spawn(async move {
        loop {
            let frame = board_frame(&views.borrow_and_update());
            if let Some(frame) = frame {
                if !board_manager.send_to(&board_conn_id, frame).await {
                    break;
                }
            }
            if views.changed().await.is_err() {
                break;
            }
        }
    });

    // Receiver loop: the board is push-only, inbound frames are ignored.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    board_task.abort();
    drop(feed);
    ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}
