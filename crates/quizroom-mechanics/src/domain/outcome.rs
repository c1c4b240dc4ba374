//! Results of participant input.

use quizroom_core::messaging::Keyboard;
use serde::Serialize;

/// Partial progress pushed to the display after an accepted answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressUpdate {
    /// Open answer collection.
    IdeaProgress {
        count: usize,
        total: usize,
        /// Seconds since the latest idea.
        last: Option<i64>,
    },
    /// Open answer voting; `count` is the number of distinct voters.
    VoteProgress { count: usize, last: Option<i64> },
    /// Choice and ordering answers.
    AnswerProgress {
        count: usize,
        total: usize,
        last: Option<i64>,
    },
}

/// How a mechanic handled one piece of participant input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    /// Whether the input was taken into account.
    pub accepted: bool,
    /// Short participant-visible reply.
    pub reply: String,
    /// Progress counters for the display, if they changed.
    pub progress: Option<ProgressUpdate>,
    /// Refreshed inline keyboard reflecting the new selection.
    pub keyboard: Option<Keyboard>,
}

impl AnswerOutcome {
    /// Input accepted.
    #[must_use]
    pub fn accepted(reply: impl Into<String>) -> Self {
        Self {
            accepted: true,
            reply: reply.into(),
            progress: None,
            keyboard: None,
        }
    }

    /// Input refused; nothing was stored.
    #[must_use]
    pub fn rejected(reply: impl Into<String>) -> Self {
        Self {
            accepted: false,
            reply: reply.into(),
            progress: None,
            keyboard: None,
        }
    }

    #[must_use]
    pub fn with_progress(mut self, progress: ProgressUpdate) -> Self {
        self.progress = Some(progress);
        self
    }

    #[must_use]
    pub fn with_keyboard(mut self, keyboard: Option<Keyboard>) -> Self {
        self.keyboard = keyboard;
        self
    }
}
