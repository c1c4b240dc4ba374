//! Scenario inspection for the moderator.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use quizroom_scenario::{ScenarioPreview, preview};
use tracing::instrument;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /preview
///
/// Parses the configured scenario file without touching the store and
/// returns the step drafts it would produce.
#[instrument(skip(state))]
async fn preview_scenario(
    State(state): State<AppState>,
) -> Result<Json<ScenarioPreview>, ApiError> {
    let engine = &state.engine;
    Ok(Json(preview(engine.registry(), engine.scenario_path()).await?))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/preview", get(preview_scenario))
}
