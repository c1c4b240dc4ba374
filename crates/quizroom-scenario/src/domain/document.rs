//! Scenario document parsing and normalization.
//!
//! A scenario is either a plain list of blocks or the legacy
//! `{ quiz: { steps: [...] } }` form. JSON is tried first, then YAML.
//! Normalization always wraps the blocks with a registration step at
//! position 0 and a leaderboard step at the end.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use quizroom_core::error::DomainError;
use quizroom_core::model::{Mechanic, StepDraft};
use quizroom_mechanics::{MechanicRegistry, ScenarioItem};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::domain::error::ScenarioError;

/// Block types from older scenarios that the engine now derives itself.
const IGNORED_KINDS: [&str; 2] = ["vote", "vote_results"];

/// Fallback file names tried in the working directory.
pub const FALLBACK_PATHS: [&str; 2] = ["scenario.yaml", "scenario.json"];

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScenarioFile {
    Blocks(Vec<ScenarioItem>),
    Legacy { quiz: LegacyQuiz },
}

#[derive(Debug, Deserialize)]
struct LegacyQuiz {
    #[serde(default)]
    steps: Vec<ScenarioItem>,
}

impl ScenarioFile {
    fn into_items(self) -> Vec<ScenarioItem> {
        match self {
            Self::Blocks(items) => items,
            Self::Legacy { quiz } => quiz.steps,
        }
    }
}

/// Parses scenario text into raw blocks.
///
/// # Errors
///
/// Returns `ScenarioError::Parse` if the text is neither valid JSON nor
/// valid YAML of a supported shape.
pub fn parse_items(text: &str) -> Result<Vec<ScenarioItem>, ScenarioError> {
    if let Ok(file) = serde_json::from_str::<ScenarioFile>(text) {
        return Ok(file.into_items());
    }
    serde_yaml::from_str::<ScenarioFile>(text)
        .map(ScenarioFile::into_items)
        .map_err(|e| {
            ScenarioError::Parse(format!(
                "expected a list of blocks or a legacy quiz.steps document: {e}"
            ))
        })
}

/// Returns `preferred` if it exists, else the first existing fallback.
#[must_use]
pub fn resolve_path(preferred: &Path) -> Option<PathBuf> {
    if preferred.is_file() {
        return Some(preferred.to_path_buf());
    }
    FALLBACK_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.is_file())
}

/// Lowercase hex SHA-256 of the scenario source.
#[must_use]
pub fn digest(text: &str) -> String {
    Sha256::digest(text.as_bytes())
        .iter()
        .fold(String::with_capacity(64), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        })
}

/// Converts raw blocks into positioned drafts.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the registry lacks a handler for a
/// mechanic named in the scenario.
pub fn build_drafts(
    items: &[ScenarioItem],
    registry: &MechanicRegistry,
) -> Result<Vec<StepDraft>, DomainError> {
    let mut drafts = vec![
        registry
            .handler(Mechanic::Registration)?
            .ingest(&ScenarioItem::of_kind(Mechanic::Registration.tag()), 0),
    ];

    for item in items {
        let kind = item
            .kind
            .as_deref()
            .map(|k| k.trim().to_ascii_lowercase())
            .unwrap_or_default();
        if IGNORED_KINDS.contains(&kind.as_str()) {
            debug!(kind, "Skipping legacy block");
            continue;
        }
        let Some(mechanic) = item.mechanic() else {
            warn!(kind, "Skipping block of unknown type");
            continue;
        };
        if matches!(mechanic, Mechanic::Registration | Mechanic::Leaderboard) {
            debug!(%mechanic, "Skipping block, added implicitly");
            continue;
        }
        let position = i32::try_from(drafts.len())
            .map_err(|_| DomainError::Validation("scenario has too many steps".to_owned()))?;
        drafts.push(registry.handler(mechanic)?.ingest(item, position));
    }

    let position = i32::try_from(drafts.len())
        .map_err(|_| DomainError::Validation("scenario has too many steps".to_owned()))?;
    drafts.push(
        registry
            .handler(Mechanic::Leaderboard)?
            .ingest(&ScenarioItem::of_kind(Mechanic::Leaderboard.tag()), position),
    );
    Ok(drafts)
}
