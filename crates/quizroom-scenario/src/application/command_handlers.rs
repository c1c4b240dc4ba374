//! Command handlers for the scenario context.

use std::path::{Path, PathBuf};

use quizroom_core::clock::Clock;
use quizroom_core::model::{GlobalState, StepId};
use quizroom_core::repository::QuizRepository;
use quizroom_mechanics::MechanicRegistry;
use tracing::{debug, info, warn};

use crate::domain::commands::LoadScenario;
use crate::domain::document::{build_drafts, digest, parse_items, resolve_path};
use crate::domain::error::ScenarioError;

/// What a successful load put into the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub path: PathBuf,
    /// SHA-256 of the scenario source.
    pub digest: String,
    pub step_count: usize,
    pub first_step_id: StepId,
}

/// Reads the scenario at `preferred` or at a fallback path.
pub(crate) async fn read_source(preferred: &Path) -> Result<(PathBuf, String), ScenarioError> {
    let path = resolve_path(preferred).ok_or_else(|| ScenarioError::Missing(preferred.to_path_buf()))?;
    let text = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| ScenarioError::Io {
            path: path.clone(),
            source,
        })?;
    Ok((path, text))
}

/// Handles the `LoadScenario` command.
///
/// # Errors
///
/// See [`load_if_empty`].
pub async fn handle_load_scenario(
    command: &LoadScenario,
    repo: &dyn QuizRepository,
    registry: &MechanicRegistry,
    clock: &dyn Clock,
) -> Result<Option<LoadReport>, ScenarioError> {
    debug!(correlation_id = %command.correlation_id, path = %command.path.display(), "Loading scenario");
    load_if_empty(repo, registry, clock, &command.path).await
}

/// Loads the scenario into the store unless it already holds steps, and
/// points the global state at the first step.
///
/// Returns `None` when the store was not empty or no scenario file exists.
///
/// # Errors
///
/// Returns `ScenarioError::Io` or `ScenarioError::Parse` for an unreadable
/// file, or `ScenarioError::Domain` if the store rejects a step.
pub async fn load_if_empty(
    repo: &dyn QuizRepository,
    registry: &MechanicRegistry,
    clock: &dyn Clock,
    preferred: &Path,
) -> Result<Option<LoadReport>, ScenarioError> {
    if !repo.steps().await?.is_empty() {
        debug!("Store already holds a scenario, skipping load");
        return Ok(None);
    }
    let (path, text) = match read_source(preferred).await {
        Ok(source) => source,
        Err(ScenarioError::Missing(missing)) => {
            warn!(path = %missing.display(), "No scenario file found, starting empty");
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    let drafts = build_drafts(&parse_items(&text)?, registry)?;
    let step_count = drafts.len();
    let mut first_step_id = None;
    for draft in drafts {
        let step = repo.insert_step(draft).await?;
        first_step_id.get_or_insert(step.id);
    }
    let Some(first_step_id) = first_step_id else {
        return Ok(None);
    };
    repo.save_global_state(GlobalState::at_step(Some(first_step_id), clock.now()))
        .await?;

    let report = LoadReport {
        digest: digest(&text),
        path,
        step_count,
        first_step_id,
    };
    info!(
        path = %report.path.display(),
        digest = %report.digest,
        steps = report.step_count,
        "Scenario loaded"
    );
    Ok(Some(report))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use quizroom_core::model::Mechanic;
    use quizroom_store::MemoryRepository;
    use quizroom_test_support::{FailingRepository, FixedClock};
    use uuid::Uuid;

    use super::*;

    fn scenario_file(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("quizroom-{}.yaml", Uuid::new_v4()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())
    }

    const SCENARIO: &str = "- type: quiz\n  title: Q1\n  options: [a, b, c]\n  correct: 1\n  points: 10\n";

    #[tokio::test]
    async fn test_load_if_empty_inserts_steps_and_points_at_first() {
        // Arrange
        let repo = MemoryRepository::new();
        let path = scenario_file(SCENARIO);

        // Act
        let report = load_if_empty(&repo, &MechanicRegistry::standard(), &clock(), &path)
            .await
            .unwrap()
            .unwrap();

        // Assert
        assert_eq!(report.step_count, 3);
        let steps = repo.steps().await.unwrap();
        let mechanics: Vec<Mechanic> = steps.iter().map(|s| s.mechanic).collect();
        assert_eq!(
            mechanics,
            vec![Mechanic::Registration, Mechanic::SingleChoice, Mechanic::Leaderboard]
        );
        assert_eq!(repo.options(steps[1].id).await.unwrap().len(), 3);
        let state = repo.global_state().await.unwrap().unwrap();
        assert_eq!(state.current_step_id, Some(report.first_step_id));
        assert_eq!(state.phase, 0);
        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_load_if_empty_skips_populated_store() {
        // Arrange
        let repo = MemoryRepository::new();
        let path = scenario_file(SCENARIO);
        let registry = MechanicRegistry::standard();
        load_if_empty(&repo, &registry, &clock(), &path).await.unwrap();

        // Act
        let second = load_if_empty(&repo, &registry, &clock(), &path).await.unwrap();

        // Assert
        assert!(second.is_none());
        assert_eq!(repo.steps().await.unwrap().len(), 3);
        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_load_scenario_command_reports_parse_errors() {
        let repo = MemoryRepository::new();
        let path = scenario_file("quiz: 42\n");
        let command = LoadScenario {
            correlation_id: Uuid::new_v4(),
            path: path.clone(),
        };

        let result =
            handle_load_scenario(&command, &repo, &MechanicRegistry::standard(), &clock()).await;

        assert!(matches!(result, Err(ScenarioError::Parse(_))));
        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_load_if_empty_propagates_repository_failure() {
        let path = scenario_file(SCENARIO);

        let result = load_if_empty(
            &FailingRepository,
            &MechanicRegistry::standard(),
            &clock(),
            &path,
        )
        .await;

        assert!(matches!(result, Err(ScenarioError::Domain(_))));
        std::fs::remove_file(path).unwrap();
    }
}
