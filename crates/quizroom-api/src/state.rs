//! Shared application state.

use std::sync::Arc;

use quizroom_engine::QuizEngine;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The engine facade every route talks to.
    pub engine: Arc<QuizEngine>,
}

impl AppState {
    #[must_use]
    pub fn new(engine: Arc<QuizEngine>) -> Self {
        Self { engine }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use quizroom_core::model::{GlobalState, Mechanic, StepDraft};
    use quizroom_core::repository::QuizRepository;
    use quizroom_engine::{EngineSettings, QuizEngine};
    use quizroom_mechanics::MechanicRegistry;
    use quizroom_store::MemoryRepository;
    use quizroom_test_support::{FixedClock, RecordingTransport};

    use super::AppState;

    /// State over registration, single choice (a/b/c, correct index 1, 10
    /// points) and leaderboard, positioned on registration. The scenario
    /// path points nowhere so resets come back empty.
    pub(crate) async fn seeded_state() -> (AppState, Arc<MemoryRepository>) {
        let t0 = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let repo = Arc::new(MemoryRepository::new());
        let registration = repo
            .insert_step(StepDraft::new(0, Mechanic::Registration, "Join"))
            .await
            .unwrap();
        let mut quiz = StepDraft::new(1, Mechanic::SingleChoice, "Pick");
        quiz.options = vec!["a".into(), "b".into(), "c".into()];
        quiz.correct_index = Some(1);
        quiz.points = Some(10);
        repo.insert_step(quiz).await.unwrap();
        repo.insert_step(StepDraft::new(2, Mechanic::Leaderboard, "Results"))
            .await
            .unwrap();
        repo.save_global_state(GlobalState::at_step(Some(registration.id), t0))
            .await
            .unwrap();

        let engine = QuizEngine::new(
            repo.clone(),
            Arc::new(FixedClock(t0)),
            Arc::new(MechanicRegistry::standard()),
            Arc::new(RecordingTransport::new()),
            EngineSettings {
                scenario_path: std::env::temp_dir().join("quizroom-missing-scenario.yaml"),
                send_delay: Duration::ZERO,
                ..EngineSettings::default()
            },
        );
        (AppState::new(Arc::new(engine)), repo)
    }
}
