//! Moderator controls: step forward, step back, reset.

use axum::extract::State;
use axum::{Json, Router, routing::post};
use quizroom_engine::{AdvanceEvent, AdvanceOutcome, ResetEvent};
use quizroom_mechanics::RenderModel;
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Response body for POST /next and POST /prev.
#[derive(Debug, Serialize)]
pub struct AdvanceResponse {
    pub outcome: AdvanceOutcome,
    /// Display model after the transition.
    pub render: RenderModel,
}

/// Response body for POST /reset.
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    /// Whether a scenario file was found and loaded again.
    pub reloaded: bool,
    pub steps: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

async fn advance(state: &AppState, forward: bool) -> Result<Json<AdvanceResponse>, ApiError> {
    let command = AdvanceEvent {
        correlation_id: Uuid::new_v4(),
        forward,
    };

    info!(correlation_id = %command.correlation_id, forward, "handling advance command");

    let outcome = state.engine.advance(&command).await?;
    let render = state.engine.current_render_context().await?;

    Ok(Json(AdvanceResponse { outcome, render }))
}

/// POST /next
#[instrument(skip(state))]
async fn next(State(state): State<AppState>) -> Result<Json<AdvanceResponse>, ApiError> {
    advance(&state, true).await
}

/// POST /prev
#[instrument(skip(state))]
async fn prev(State(state): State<AppState>) -> Result<Json<AdvanceResponse>, ApiError> {
    advance(&state, false).await
}

/// POST /reset
#[instrument(skip(state))]
async fn reset(State(state): State<AppState>) -> Result<Json<ResetResponse>, ApiError> {
    let command = ResetEvent {
        correlation_id: Uuid::new_v4(),
    };

    info!(correlation_id = %command.correlation_id, "handling reset command");

    let report = state.engine.reset(&command).await?;

    Ok(Json(match report {
        Some(report) => ResetResponse {
            reloaded: true,
            steps: report.step_count,
            digest: Some(report.digest),
        },
        None => ResetResponse {
            reloaded: false,
            steps: 0,
            digest: None,
        },
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/next", post(next))
        .route("/prev", post(prev))
        .route("/reset", post(reset))
}
