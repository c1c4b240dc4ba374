//! Public display: a snapshot endpoint and a live WebSocket feed.
//!
//! A socket receives the current state as soon as it connects, then every
//! `DisplayEvent` the engine broadcasts, serialized as JSON text frames.
//! Client frames other than close are ignored.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use axum::{Json, Router, routing::get};
use futures::{Sink, SinkExt, StreamExt};
use quizroom_engine::DisplayEvent;
use quizroom_mechanics::RenderModel;
use tracing::{debug, info, instrument, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/v1/display
#[instrument(skip(state))]
async fn snapshot(State(state): State<AppState>) -> Result<Json<RenderModel>, ApiError> {
    Ok(Json(state.engine.current_render_context().await?))
}

/// GET /ws
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let hub = state.engine.display().clone();
    let mut subscription = hub.subscribe();
    let connection_id = subscription.id;

    info!(connection_id = %connection_id, "Display socket connected");

    let initial = match state.engine.current_render_context().await {
        Ok(render) => Some(DisplayEvent::state(render)),
        Err(e) => {
            warn!(connection_id = %connection_id, error = %e, "Initial display state unavailable");
            None
        }
    };

    let send_task = tokio::spawn(async move {
        if let Some(event) = initial {
            if !forward(&mut ws_sender, &event).await {
                return;
            }
        }
        while let Some(event) = subscription.receiver.recv().await {
            if !forward(&mut ws_sender, &event).await {
                break;
            }
        }
    });

    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Close(_)) => {
                debug!(connection_id = %connection_id, "Display socket closed by client");
                break;
            }
            Err(e) => {
                warn!(connection_id = %connection_id, error = %e, "Display socket error");
                break;
            }
            Ok(_) => {}
        }
    }

    hub.unsubscribe(connection_id);
    send_task.abort();

    info!(connection_id = %connection_id, "Display socket terminated");
}

/// Writes one event; `false` once the socket is gone.
async fn forward<S>(sender: &mut S, event: &DisplayEvent) -> bool
where
    S: Sink<Message> + Unpin,
{
    match serde_json::to_string(event) {
        Ok(json) => sender.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            warn!(event = event.name(), error = %e, "Display event not serializable");
            true
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/display", get(snapshot))
        .route("/ws", get(ws_handler))
}
