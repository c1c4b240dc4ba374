//! Display render model.
//!
//! The public display receives data only. Markup, templates and avatars are
//! the display client's concern.

use chrono::{DateTime, Utc};
use quizroom_core::model::{GlobalState, Mechanic, Step, StepId};
use quizroom_scoring::application::query_handlers::StandingView;
use serde::Serialize;

use crate::domain::format::timer_text;

/// Countdown shown on the display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimerView {
    /// Client-side element identifier.
    pub id: &'static str,
    /// `"MM:SS"` starting value.
    pub text: String,
    pub ms: u64,
}

impl TimerView {
    #[must_use]
    pub fn new(id: &'static str, ms: u64) -> Self {
        Self {
            id,
            text: timer_text(ms),
            ms,
        }
    }
}

/// What the status counter is counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusMode {
    Answers,
    Votes,
}

/// "current of total, last N seconds ago" counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusView {
    pub mode: StatusMode,
    pub current: usize,
    pub total: usize,
    /// Seconds since the latest answer or vote.
    pub last_secs: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantView {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionView {
    pub index: u32,
    pub text: String,
}

/// One submitted idea as the display shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdeaView {
    pub id: i64,
    pub author_id: String,
    pub author_name: String,
    pub text: String,
    /// Time from step start to submission, e.g. `"1 min 2 s"`.
    pub delay_text: String,
    pub votes: usize,
    /// Voter display names, filled on the results phase.
    pub voters: Vec<String>,
}

/// Per-option tallies of a closed choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceResults {
    pub counts: Vec<usize>,
    pub percents: Vec<u32>,
    pub correct: Vec<u32>,
    /// Names of the participants who picked each option.
    pub voters: Vec<Vec<String>>,
}

/// Tallies of a closed ordering question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderingResults {
    pub complete: usize,
    pub correct: usize,
}

/// Mechanic-specific part of the render model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderDetail {
    /// No step is active.
    Idle,
    Registration {
        participants: Vec<ParticipantView>,
    },
    OpenAnswer {
        /// Hidden while ideas are being collected.
        ideas: Vec<IdeaView>,
    },
    Choice {
        options: Vec<OptionView>,
        results: Option<ChoiceResults>,
    },
    Ordering {
        options: Vec<OptionView>,
        results: Option<OrderingResults>,
    },
    Leaderboard {
        rows: Vec<StandingView>,
    },
}

/// Everything the public display needs to draw the current state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderModel {
    pub step_id: Option<StepId>,
    pub position: Option<i32>,
    pub mechanic: Option<Mechanic>,
    pub title: String,
    pub body: Option<String>,
    pub phase: u32,
    pub phase_count: u32,
    /// When the current phase started.
    pub since: Option<DateTime<Utc>>,
    pub stage_title: String,
    pub instruction: String,
    pub timer: Option<TimerView>,
    pub status: Option<StatusView>,
    pub show_reset: bool,
    pub show_next: bool,
    pub content_class: String,
    pub detail: RenderDetail,
}

impl RenderModel {
    /// Model shown when no scenario is loaded.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            step_id: None,
            position: None,
            mechanic: None,
            title: String::new(),
            body: None,
            phase: 0,
            phase_count: 0,
            since: None,
            stage_title: String::new(),
            instruction: String::new(),
            timer: None,
            status: None,
            show_reset: true,
            show_next: false,
            content_class: String::new(),
            detail: RenderDetail::Idle,
        }
    }

    /// Base model for `step` at the phase recorded in `state`.
    #[must_use]
    pub fn for_step(step: &Step, state: &GlobalState, detail: RenderDetail) -> Self {
        Self {
            step_id: Some(step.id),
            position: Some(step.position),
            mechanic: Some(step.mechanic),
            title: step.title.clone(),
            body: step.body.clone(),
            phase: state.phase,
            phase_count: 0,
            since: Some(state.phase_started_at),
            stage_title: String::new(),
            instruction: String::new(),
            timer: None,
            status: None,
            show_reset: false,
            show_next: true,
            content_class: String::new(),
            detail,
        }
    }
}
