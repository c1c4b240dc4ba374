//! Query handlers for the scenario context.

use std::path::Path;

use quizroom_core::model::StepDraft;
use quizroom_mechanics::MechanicRegistry;
use serde::Serialize;

use crate::application::command_handlers::read_source;
use crate::domain::document::{build_drafts, digest, parse_items};
use crate::domain::error::ScenarioError;

/// The steps a scenario file would produce, without touching the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioPreview {
    pub path: String,
    pub digest: String,
    pub steps: Vec<StepDraft>,
}

/// Parses and normalizes the scenario at `preferred` (or a fallback path).
///
/// # Errors
///
/// Returns `ScenarioError::Missing` if no file exists, or any read, parse
/// or registry error.
pub async fn preview(
    registry: &MechanicRegistry,
    preferred: &Path,
) -> Result<ScenarioPreview, ScenarioError> {
    let (path, text) = read_source(preferred).await?;
    let steps = build_drafts(&parse_items(&text)?, registry)?;
    Ok(ScenarioPreview {
        path: path.display().to_string(),
        digest: digest(&text),
        steps,
    })
}
