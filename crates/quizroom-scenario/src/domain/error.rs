//! Scenario errors.

use std::path::PathBuf;

use quizroom_core::error::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    /// No scenario file exists at the path or at the fallbacks.
    #[error("scenario file not found: {0}")]
    Missing(PathBuf),

    #[error("cannot read scenario {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is neither a list of blocks nor the legacy `quiz.steps` form.
    #[error("malformed scenario: {0}")]
    Parse(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}
