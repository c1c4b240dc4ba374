//! Query handlers for the engine.

use quizroom_core::error::DomainError;
use quizroom_core::messaging::Prompt;
use quizroom_mechanics::{MechanicContext, MechanicRegistry, RenderModel};

use crate::application::state_machine::current;

/// Render model of the current step, or the idle model when no scenario is
/// loaded.
///
/// # Errors
///
/// Returns any repository or registry error.
pub async fn current_render_context(
    ctx: &MechanicContext<'_>,
    registry: &MechanicRegistry,
) -> Result<RenderModel, DomainError> {
    match current(ctx).await? {
        Some((step, state)) => registry.render(ctx, &step, &state).await,
        None => Ok(RenderModel::idle()),
    }
}

/// Prompts the participant should see for the current step and phase.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown participant, or any
/// repository or registry error.
pub async fn current_prompt(
    ctx: &MechanicContext<'_>,
    registry: &MechanicRegistry,
    participant_id: &str,
) -> Result<Vec<Prompt>, DomainError> {
    let participant = ctx
        .repo
        .participant(participant_id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("participant {participant_id}")))?;
    let Some((step, state)) = current(ctx).await? else {
        return Ok(Vec::new());
    };
    registry
        .handler(step.mechanic)?
        .participant_prompt(ctx, &participant, &step, state.phase)
        .await
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use quizroom_core::model::{GlobalState, LatencyBucket, LatencyCharge, Mechanic, StepDraft};
    use quizroom_core::repository::QuizRepository;
    use quizroom_mechanics::domain::render::RenderDetail;
    use quizroom_mechanics::domain::texts;
    use quizroom_store::MemoryRepository;
    use quizroom_test_support::FixedClock;

    use super::*;

    #[tokio::test]
    async fn test_render_context_is_idle_without_scenario() {
        let repo = MemoryRepository::new();
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap());
        let ctx = MechanicContext::new(&repo, &clock);

        let model = current_render_context(&ctx, &MechanicRegistry::standard())
            .await
            .unwrap();

        assert_eq!(model.detail, RenderDetail::Idle);
    }

    #[tokio::test]
    async fn test_render_context_fills_live_phase_count() {
        // Arrange
        let t0 = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let repo = MemoryRepository::new();
        let clock = FixedClock(t0);
        let ctx = MechanicContext::new(&repo, &clock);
        let step = repo
            .insert_step(StepDraft::new(1, Mechanic::OpenAnswer, "Ideas"))
            .await
            .unwrap();
        repo.save_global_state(GlobalState::at_step(Some(step.id), t0))
            .await
            .unwrap();
        repo.upsert_participant("ann", "Ann", t0).await.unwrap();

        // Act
        let before = current_render_context(&ctx, &MechanicRegistry::standard())
            .await
            .unwrap();
        let charge = LatencyCharge {
            bucket: LatencyBucket::Open,
            step_started_at: t0,
        };
        repo.put_idea(step.id, "ann", "Kites", t0, charge).await.unwrap();
        let after = current_render_context(&ctx, &MechanicRegistry::standard())
            .await
            .unwrap();

        // Assert
        assert_eq!(before.phase_count, 2);
        assert_eq!(after.phase_count, 3);
    }

    #[tokio::test]
    async fn test_prompt_for_unknown_participant_is_not_found() {
        let repo = MemoryRepository::new();
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap());
        let ctx = MechanicContext::new(&repo, &clock);

        let result = current_prompt(&ctx, &MechanicRegistry::standard(), "ghost").await;

        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_prompt_on_registration_greets_by_name() {
        let t0 = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let repo = MemoryRepository::new();
        let clock = FixedClock(t0);
        let ctx = MechanicContext::new(&repo, &clock);
        let step = repo
            .insert_step(StepDraft::new(0, Mechanic::Registration, "Join"))
            .await
            .unwrap();
        repo.save_global_state(GlobalState::at_step(Some(step.id), t0))
            .await
            .unwrap();
        repo.upsert_participant("ann", "Ann", t0).await.unwrap();

        let prompts = current_prompt(&ctx, &MechanicRegistry::standard(), "ann")
            .await
            .unwrap();

        assert_eq!(prompts, vec![Prompt::text(texts::registered("Ann"))]);
    }
}
