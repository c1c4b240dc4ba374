//! Quiz data model.
//!
//! Steps and options are created at scenario ingestion and are read-only
//! afterwards. Answers, ideas and votes are keyed so that each participant
//! holds at most one living record per step.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::elapsed_ms;

/// Database identifier of a step.
pub type StepId = i64;

/// Database identifier of an open-answer idea.
pub type IdeaId = i64;

/// Transport-level participant identifier (e.g. a chat id).
pub type ParticipantId = String;

/// The closed set of step mechanics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mechanic {
    /// Participants join and pick a display name.
    Registration,
    /// Freeform ideas followed by a vote.
    OpenAnswer,
    /// One correct option.
    SingleChoice,
    /// Several correct options.
    MultiChoice,
    /// Arrange options into the canonical order.
    Ordering,
    /// Final standings.
    Leaderboard,
}

impl Mechanic {
    /// Short tag used in scenario files.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Registration => "registration",
            Self::OpenAnswer => "open",
            Self::SingleChoice => "quiz",
            Self::MultiChoice => "multi",
            Self::Ordering => "sequence",
            Self::Leaderboard => "leaderboard",
        }
    }

    /// Parses a scenario tag. Both the short tags and the descriptive names
    /// are accepted.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "registration" => Some(Self::Registration),
            "open" | "open_answer" | "open-answer" => Some(Self::OpenAnswer),
            "quiz" | "single" | "single_choice" | "single-choice" => Some(Self::SingleChoice),
            "multi" | "multi_choice" | "multi-choice" => Some(Self::MultiChoice),
            "sequence" | "ordering" => Some(Self::Ordering),
            "leaderboard" => Some(Self::Leaderboard),
            _ => None,
        }
    }
}

impl fmt::Display for Mechanic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A persisted step of the scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Storage identifier.
    pub id: StepId,
    /// Sequence order, unique and immutable.
    pub position: i32,
    /// Mechanic driving this step.
    pub mechanic: Mechanic,
    /// Short title shown on the display.
    pub title: String,
    /// Optional body text.
    pub body: Option<String>,
    /// Correct option index for single-choice steps.
    pub correct_index: Option<u32>,
    /// Correct option indices for multi-choice steps.
    pub correct_indices: Option<BTreeSet<u32>>,
    /// Point value; mechanic defaults apply when absent.
    pub points: Option<i64>,
    /// Timer override in milliseconds.
    pub timer_ms: Option<u64>,
}

/// A step that has not been persisted yet, together with its options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepDraft {
    pub position: i32,
    pub mechanic: Mechanic,
    pub title: String,
    pub body: Option<String>,
    pub correct_index: Option<u32>,
    pub correct_indices: Option<BTreeSet<u32>>,
    pub points: Option<i64>,
    pub timer_ms: Option<u64>,
    pub options: Vec<String>,
}

impl StepDraft {
    /// Creates an empty draft for the given mechanic.
    #[must_use]
    pub fn new(position: i32, mechanic: Mechanic, title: impl Into<String>) -> Self {
        Self {
            position,
            mechanic,
            title: title.into(),
            body: None,
            correct_index: None,
            correct_indices: None,
            points: None,
            timer_ms: None,
            options: Vec::new(),
        }
    }
}

/// One selectable option of a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOption {
    pub step_id: StepId,
    /// Zero-based index, unique per step.
    pub index: u32,
    pub text: String,
}

/// The singleton orchestration state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalState {
    pub current_step_id: Option<StepId>,
    /// Zero-based phase within the current step.
    pub phase: u32,
    pub step_started_at: DateTime<Utc>,
    pub phase_started_at: DateTime<Utc>,
}

impl GlobalState {
    /// State pointing at `step_id`, phase 0, started at `now`.
    #[must_use]
    pub fn at_step(step_id: Option<StepId>, now: DateTime<Utc>) -> Self {
        Self {
            current_step_id: step_id,
            phase: 0,
            step_started_at: now,
            phase_started_at: now,
        }
    }
}

/// Mechanic-specific answer payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AnswerPayload {
    /// Single-choice option index.
    Choice(u32),
    /// Multi-choice index set.
    Multi(BTreeSet<u32>),
    /// Ordering permutation, possibly partial while being built.
    Ordering(Vec<u32>),
}

/// The living answer of one participant for one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub step_id: StepId,
    pub participant_id: ParticipantId,
    pub payload: AnswerPayload,
    /// Moment of the last write.
    pub answered_at: DateTime<Utc>,
    /// Whether the record counts toward latency. Partial orderings do not.
    pub counted: bool,
}

impl AnswerRecord {
    /// The submission moment that counts toward latency, if any.
    #[must_use]
    pub fn counted_at(&self) -> Option<DateTime<Utc>> {
        self.counted.then_some(self.answered_at)
    }
}

/// A freeform open-answer submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Idea {
    pub id: IdeaId,
    pub step_id: StepId,
    pub participant_id: ParticipantId,
    pub text: String,
    pub submitted_at: DateTime<Utc>,
}

/// One participant's vote for an idea.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeaVote {
    pub step_id: StepId,
    pub idea_id: IdeaId,
    pub voter_id: ParticipantId,
    pub created_at: DateTime<Utc>,
}

/// Per-mechanic latency bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyBucket {
    Open,
    Quiz,
}

/// A change to a participant's latency counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyAdjustment {
    pub bucket: LatencyBucket,
    /// Signed change to the accumulated milliseconds.
    pub delta_ms: i64,
    /// Signed change to the answer count.
    pub count_delta: i32,
}

/// How a write counts toward its author's latency counters.
///
/// Repositories apply the charge in the same critical section as the
/// write, against the record that write replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyCharge {
    pub bucket: LatencyBucket,
    pub step_started_at: DateTime<Utc>,
}

impl LatencyCharge {
    /// Adjustment that swaps the contribution of a submission counted at
    /// `previous` for one counted at `current`. `None` when nothing changes.
    #[must_use]
    pub fn between(
        &self,
        previous: Option<DateTime<Utc>>,
        current: Option<DateTime<Utc>>,
    ) -> Option<LatencyAdjustment> {
        let contribution = |at: Option<DateTime<Utc>>| {
            at.map_or((0, 0), |at| (elapsed_ms(self.step_started_at, at), 1))
        };
        let (before_ms, before_count) = contribution(previous);
        let (after_ms, after_count) = contribution(current);
        let adjustment = LatencyAdjustment {
            bucket: self.bucket,
            delta_ms: after_ms - before_ms,
            count_delta: after_count - before_count,
        };
        (adjustment.delta_ms != 0 || adjustment.count_delta != 0).then_some(adjustment)
    }
}

/// A registered participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub joined_at: DateTime<Utc>,
    /// Cumulative score, written only by scoring.
    pub total_score: i64,
    /// Cumulative answer latency, lower is better.
    pub total_answer_ms: i64,
    pub open_answer_ms: i64,
    pub open_answer_count: i32,
    pub quiz_answer_ms: i64,
    pub quiz_answer_count: i32,
}

impl Participant {
    /// A freshly joined participant with zeroed counters.
    #[must_use]
    pub fn new(id: impl Into<ParticipantId>, name: impl Into<String>, joined_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            joined_at,
            total_score: 0,
            total_answer_ms: 0,
            open_answer_ms: 0,
            open_answer_count: 0,
            quiz_answer_ms: 0,
            quiz_answer_count: 0,
        }
    }

    /// Applies a latency adjustment, keeping every counter non-negative.
    pub fn apply_latency(&mut self, adjustment: LatencyAdjustment) {
        let (ms, count) = match adjustment.bucket {
            LatencyBucket::Open => (&mut self.open_answer_ms, &mut self.open_answer_count),
            LatencyBucket::Quiz => (&mut self.quiz_answer_ms, &mut self.quiz_answer_count),
        };
        *ms = (*ms + adjustment.delta_ms).max(0);
        *count = (*count + adjustment.count_delta).max(0);
        self.total_answer_ms = (self.total_answer_ms + adjustment.delta_ms).max(0);
    }

    /// Mean open-answer latency in seconds, if any were recorded.
    #[must_use]
    pub fn open_average_secs(&self) -> Option<f64> {
        average_secs(self.open_answer_ms, self.open_answer_count)
    }

    /// Mean choice-answer latency in seconds, if any were recorded.
    #[must_use]
    pub fn quiz_average_secs(&self) -> Option<f64> {
        average_secs(self.quiz_answer_ms, self.quiz_answer_count)
    }
}

#[allow(clippy::cast_precision_loss)]
fn average_secs(total_ms: i64, count: i32) -> Option<f64> {
    (count > 0).then(|| total_ms as f64 / f64::from(count) / 1000.0)
}
