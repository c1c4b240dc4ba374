//! Command handlers for the engine.
//!
//! Each handler runs one command against the repository and the registry.
//! Fan-out to displays and participants is left to `QuizEngine`.

use quizroom_core::command::Command;
use quizroom_core::error::DomainError;
use quizroom_core::model::Participant;
use quizroom_mechanics::domain::texts;
use quizroom_mechanics::{AnswerOutcome, MechanicContext, MechanicRegistry};
use tracing::{debug, info};

use crate::application::state_machine::{advance, current};
use crate::domain::commands::{AdvanceEvent, ParticipantInput, RecordAnswer, RegisterParticipant};
use crate::domain::transition::AdvanceOutcome;

/// Handles the `AdvanceEvent` command.
///
/// # Errors
///
/// See [`advance`].
pub async fn handle_advance(
    command: &AdvanceEvent,
    ctx: &MechanicContext<'_>,
    registry: &MechanicRegistry,
) -> Result<AdvanceOutcome, DomainError> {
    debug!(
        command = command.command_type(),
        correlation_id = %command.correlation_id,
        "Handling transition"
    );
    advance(ctx, registry, command.forward).await
}

/// Handles the `RecordAnswer` command: routes the input to the handler of
/// the current step's mechanic.
///
/// Input that does not fit the current step is rejected with a short reply,
/// never with an error.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown participant, or any
/// repository error.
pub async fn handle_record_answer(
    command: &RecordAnswer,
    ctx: &MechanicContext<'_>,
    registry: &MechanicRegistry,
) -> Result<AnswerOutcome, DomainError> {
    let participant = ctx
        .repo
        .participant(&command.participant_id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("participant {}", command.participant_id)))?;

    let Some((step, state)) = current(ctx).await? else {
        return Ok(AnswerOutcome::rejected(match command.input {
            ParticipantInput::Text(_) => texts::TEXT_NOT_EXPECTED,
            ParticipantInput::Selection { .. } => texts::SELECTION_NOT_EXPECTED,
        }));
    };
    let handler = registry.handler(step.mechanic)?;

    let outcome = match &command.input {
        ParticipantInput::Text(text) => {
            handler
                .handle_text(ctx, &participant, &step, &state, text)
                .await?
        }
        ParticipantInput::Selection { payload } => {
            let routed = MechanicRegistry::split_selection(payload)
                .filter(|(key, _)| registry.by_routing_key(key) == Some(step.mechanic));
            match routed {
                Some((_, value)) => {
                    handler
                        .handle_selection(ctx, &participant, &step, &state, value)
                        .await?
                }
                None => AnswerOutcome::rejected(texts::SELECTION_NOT_EXPECTED),
            }
        }
    };
    debug!(
        correlation_id = %command.correlation_id,
        participant_id = %participant.id,
        step_id = step.id,
        accepted = outcome.accepted,
        "Participant input handled"
    );
    Ok(outcome)
}

/// Handles the `RegisterParticipant` command. Re-registering renames the
/// participant and keeps its score.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank id or name, or any
/// repository error.
pub async fn handle_register_participant(
    command: &RegisterParticipant,
    ctx: &MechanicContext<'_>,
) -> Result<Participant, DomainError> {
    let id = command.participant_id.trim();
    let name = command.name.trim();
    if id.is_empty() || name.is_empty() {
        return Err(DomainError::Validation(
            "participant id and name must not be blank".to_owned(),
        ));
    }
    let participant = ctx.repo.upsert_participant(id, name, ctx.clock.now()).await?;
    info!(
        correlation_id = %command.correlation_id,
        participant_id = %participant.id,
        "Participant registered"
    );
    Ok(participant)
}
