//! The phase state machine.
//!
//! Reads the global state, plans the move with live phase counts, persists
//! the new state and fires the phase-entry hook. Only this module writes the
//! global state during an event.

use quizroom_core::error::DomainError;
use quizroom_core::model::{GlobalState, Step};
use quizroom_mechanics::{MechanicContext, MechanicRegistry};
use tracing::{debug, info};

use crate::domain::transition::{AdvanceOutcome, Transition, plan_backward, plan_forward};

/// The current step and state, if a scenario is loaded.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the state points at a missing step,
/// or any repository error.
pub async fn current(ctx: &MechanicContext<'_>) -> Result<Option<(Step, GlobalState)>, DomainError> {
    let Some(state) = ctx.repo.global_state().await? else {
        return Ok(None);
    };
    let Some(step_id) = state.current_step_id else {
        return Ok(None);
    };
    let step = ctx
        .repo
        .step(step_id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("current step {step_id}")))?;
    Ok(Some((step, state)))
}

/// Moves one phase forward or back.
///
/// Callers serialize invocations; two overlapping calls would otherwise
/// read the same starting state.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for a dangling state or an unregistered
/// mechanic, or any repository or scoring error.
pub async fn advance(
    ctx: &MechanicContext<'_>,
    registry: &MechanicRegistry,
    forward: bool,
) -> Result<AdvanceOutcome, DomainError> {
    let Some((step, state)) = current(ctx).await? else {
        debug!("No scenario loaded, nothing to advance");
        return Ok(AdvanceOutcome::Unchanged);
    };

    let transition = if forward {
        let phase_count = registry.phase_count(ctx, &step).await?;
        let next = ctx.repo.step_after(step.position).await?;
        plan_forward(state.phase, phase_count, next.map(|s| s.id))
    } else {
        let previous = if state.phase == 0 {
            match ctx.repo.step_before(step.position).await? {
                Some(prev) => Some((prev.id, registry.phase_count(ctx, &prev).await?)),
                None => None,
            }
        } else {
            None
        };
        plan_backward(state.phase, previous)
    };

    let now = ctx.clock.now();
    match transition {
        Transition::Stay => {
            debug!(step_id = step.id, phase = state.phase, forward, "Transition is a no-op");
            Ok(AdvanceOutcome::Unchanged)
        }
        Transition::Phase(phase) => {
            ctx.repo
                .save_global_state(GlobalState {
                    phase,
                    phase_started_at: now,
                    ..state
                })
                .await?;
            info!(step_id = step.id, mechanic = %step.mechanic, phase, forward, "Phase changed");
            if forward {
                registry
                    .handler(step.mechanic)?
                    .on_enter_phase(ctx, &step, phase)
                    .await?;
            }
            Ok(AdvanceOutcome::Moved {
                step_id: step.id,
                phase,
                step_changed: false,
            })
        }
        Transition::Step { step_id, phase } => {
            ctx.repo
                .save_global_state(GlobalState {
                    phase,
                    ..GlobalState::at_step(Some(step_id), now)
                })
                .await?;
            info!(from = step.id, step_id, phase, forward, "Step changed");
            Ok(AdvanceOutcome::Moved {
                step_id,
                phase,
                step_changed: true,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use quizroom_core::model::{Mechanic, StepDraft};
    use quizroom_core::repository::QuizRepository;
    use quizroom_mechanics::MechanicHandler;
    use quizroom_mechanics::application::open_answer::OpenAnswerHandler;
    use quizroom_store::MemoryRepository;
    use quizroom_test_support::{FailingRepository, ManualClock};

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    async fn scenario(repo: &MemoryRepository) -> (Step, Step, Step) {
        let registration = repo
            .insert_step(StepDraft::new(0, Mechanic::Registration, "Join"))
            .await
            .unwrap();
        let open = repo
            .insert_step(StepDraft::new(1, Mechanic::OpenAnswer, "Ideas"))
            .await
            .unwrap();
        let board = repo
            .insert_step(StepDraft::new(2, Mechanic::Leaderboard, "Results"))
            .await
            .unwrap();
        repo.save_global_state(GlobalState::at_step(Some(registration.id), t0()))
            .await
            .unwrap();
        (registration, open, board)
    }

    #[tokio::test]
    async fn test_advance_and_retreat_through_three_phase_step() {
        // Arrange
        let repo = MemoryRepository::new();
        let clock = ManualClock::new(t0());
        let ctx = MechanicContext::new(&repo, &clock);
        let registry = MechanicRegistry::standard();
        let (_, open, _) = scenario(&repo).await;
        repo.upsert_participant("ann", "Ann", t0()).await.unwrap();
        advance(&ctx, &registry, true).await.unwrap();
        let ann = repo.participant("ann").await.unwrap().unwrap();
        let state = repo.global_state().await.unwrap().unwrap();
        OpenAnswerHandler
            .handle_text(&ctx, &ann, &open, &state, "Solar sails")
            .await
            .unwrap();

        // Act
        let mut phases = Vec::new();
        for _ in 0..2 {
            advance(&ctx, &registry, true).await.unwrap();
            phases.push(repo.global_state().await.unwrap().unwrap().phase);
        }
        for _ in 0..2 {
            advance(&ctx, &registry, false).await.unwrap();
            phases.push(repo.global_state().await.unwrap().unwrap().phase);
        }

        // Assert
        assert_eq!(phases, vec![1, 2, 1, 0]);
        let state = repo.global_state().await.unwrap().unwrap();
        assert_eq!(state.current_step_id, Some(open.id));
    }

    #[tokio::test]
    async fn test_retreat_lands_on_live_last_phase_of_previous_step() {
        // Arrange
        let repo = MemoryRepository::new();
        let clock = ManualClock::new(t0());
        let ctx = MechanicContext::new(&repo, &clock);
        let registry = MechanicRegistry::standard();
        let (_, open, board) = scenario(&repo).await;
        repo.save_global_state(GlobalState::at_step(Some(board.id), t0()))
            .await
            .unwrap();

        // Act
        let outcome = advance(&ctx, &registry, false).await.unwrap();

        // Assert
        assert_eq!(
            outcome,
            AdvanceOutcome::Moved {
                step_id: open.id,
                phase: 1,
                step_changed: true,
            }
        );
    }

    #[tokio::test]
    async fn test_step_change_resets_both_timestamps() {
        // Arrange
        let repo = MemoryRepository::new();
        let clock = ManualClock::new(t0());
        let ctx = MechanicContext::new(&repo, &clock);
        let registry = MechanicRegistry::standard();
        scenario(&repo).await;

        // Act
        clock.advance(Duration::seconds(30));
        advance(&ctx, &registry, true).await.unwrap();
        let entered = repo.global_state().await.unwrap().unwrap();
        clock.advance(Duration::seconds(10));
        advance(&ctx, &registry, true).await.unwrap();
        let voting = repo.global_state().await.unwrap().unwrap();

        // Assert
        assert_eq!(entered.step_started_at, t0() + Duration::seconds(30));
        assert_eq!(entered.phase_started_at, t0() + Duration::seconds(30));
        assert_eq!(voting.step_started_at, t0() + Duration::seconds(30));
        assert_eq!(voting.phase_started_at, t0() + Duration::seconds(40));
    }

    #[tokio::test]
    async fn test_edges_are_no_ops() {
        let repo = MemoryRepository::new();
        let clock = ManualClock::new(t0());
        let ctx = MechanicContext::new(&repo, &clock);
        let registry = MechanicRegistry::standard();
        let (_, _, board) = scenario(&repo).await;

        let before_first = advance(&ctx, &registry, false).await.unwrap();
        repo.save_global_state(GlobalState::at_step(Some(board.id), t0()))
            .await
            .unwrap();
        let after_last = advance(&ctx, &registry, true).await.unwrap();

        assert_eq!(before_first, AdvanceOutcome::Unchanged);
        assert_eq!(after_last, AdvanceOutcome::Unchanged);
    }

    #[tokio::test]
    async fn test_advance_without_scenario_is_unchanged() {
        let repo = MemoryRepository::new();
        let clock = ManualClock::new(t0());
        let ctx = MechanicContext::new(&repo, &clock);

        let outcome = advance(&ctx, &MechanicRegistry::standard(), true).await.unwrap();

        assert_eq!(outcome, AdvanceOutcome::Unchanged);
    }

    #[tokio::test]
    async fn test_advance_propagates_repository_failure() {
        let clock = ManualClock::new(t0());
        let ctx = MechanicContext::new(&FailingRepository, &clock);

        let result = advance(&ctx, &MechanicRegistry::standard(), true).await;

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }
}
