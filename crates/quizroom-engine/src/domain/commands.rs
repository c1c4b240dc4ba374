//! Commands accepted by the engine.

use quizroom_core::command::Command;
use quizroom_core::model::ParticipantId;
use uuid::Uuid;

/// Moderator moves the event one phase forward or back.
#[derive(Debug, Clone)]
pub struct AdvanceEvent {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// `false` retreats.
    pub forward: bool,
}

impl Command for AdvanceEvent {
    fn command_type(&self) -> &'static str {
        if self.forward {
            "engine.advance"
        } else {
            "engine.retreat"
        }
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Raw participant input as the bot transport delivers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParticipantInput {
    /// A typed message.
    Text(String),
    /// An inline keyboard press, `"<routing key>:<value>"`.
    Selection { payload: String },
}

/// A participant answers the current step.
#[derive(Debug, Clone)]
pub struct RecordAnswer {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    pub participant_id: ParticipantId,
    pub input: ParticipantInput,
}

impl Command for RecordAnswer {
    fn command_type(&self) -> &'static str {
        "engine.record_answer"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// A participant joins or renames itself.
#[derive(Debug, Clone)]
pub struct RegisterParticipant {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    pub participant_id: ParticipantId,
    pub name: String,
}

impl Command for RegisterParticipant {
    fn command_type(&self) -> &'static str {
        "engine.register_participant"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Wipe every record and reload the scenario.
#[derive(Debug, Clone)]
pub struct ResetEvent {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for ResetEvent {
    fn command_type(&self) -> &'static str {
        "engine.reset"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
