//! Commands for the scenario context.

use std::path::PathBuf;

use quizroom_core::command::Command;
use uuid::Uuid;

/// Command to load the scenario file into an empty store.
#[derive(Debug, Clone)]
pub struct LoadScenario {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Preferred scenario path; `scenario.yaml` and `scenario.json` are
    /// tried when it does not exist.
    pub path: PathBuf,
}

impl Command for LoadScenario {
    fn command_type(&self) -> &'static str {
        "scenario.load"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
