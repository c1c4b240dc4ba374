//! Pure transition planning for the phase state machine.
//!
//! Within a step the phase moves by one. Leaving a step forward lands on
//! phase 0 of the next step; leaving it backward lands on the last phase of
//! the previous step.

use quizroom_core::model::StepId;
use serde::Serialize;

/// Where the next transition goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Same step, new phase.
    Phase(u32),
    /// Another step at the given phase.
    Step { step_id: StepId, phase: u32 },
    /// Already at the first or last reachable phase.
    Stay,
}

/// Plans a forward move from `phase` of a step with `phase_count` phases.
#[must_use]
pub fn plan_forward(phase: u32, phase_count: u32, next_step: Option<StepId>) -> Transition {
    if phase + 1 < phase_count {
        return Transition::Phase(phase + 1);
    }
    match next_step {
        Some(step_id) => Transition::Step { step_id, phase: 0 },
        None => Transition::Stay,
    }
}

/// Plans a backward move. `previous` is the preceding step with its live
/// phase count; it is only consulted at phase 0.
#[must_use]
pub fn plan_backward(phase: u32, previous: Option<(StepId, u32)>) -> Transition {
    if phase > 0 {
        return Transition::Phase(phase - 1);
    }
    match previous {
        Some((step_id, phase_count)) => Transition::Step {
            step_id,
            phase: phase_count.saturating_sub(1),
        },
        None => Transition::Stay,
    }
}

/// What an advance or retreat did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AdvanceOutcome {
    Moved {
        step_id: StepId,
        phase: u32,
        /// The current step changed, not only its phase.
        step_changed: bool,
    },
    Unchanged,
}
