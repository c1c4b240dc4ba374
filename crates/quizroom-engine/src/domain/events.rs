//! Events pushed to display connections.

use quizroom_mechanics::{ProgressUpdate, RenderModel};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DisplayEvent {
    /// Full render model after a transition or registration.
    State { render: Box<RenderModel> },
    /// Counter update after an accepted answer.
    Progress { progress: ProgressUpdate },
    /// Everything was wiped; clients should refetch.
    Reload,
}

impl DisplayEvent {
    #[must_use]
    pub fn state(render: RenderModel) -> Self {
        Self::State {
            render: Box::new(render),
        }
    }

    /// Event name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::State { .. } => "state",
            Self::Progress { .. } => "progress",
            Self::Reload => "reload",
        }
    }
}
