//! The capability bundle every mechanic provides.

use async_trait::async_trait;
use quizroom_core::clock::Clock;
use quizroom_core::error::DomainError;
use quizroom_core::messaging::Prompt;
use quizroom_core::model::{GlobalState, Mechanic, Participant, Step, StepDraft};
use quizroom_core::repository::QuizRepository;

use crate::domain::outcome::AnswerOutcome;
use crate::domain::render::RenderModel;
use crate::domain::scenario_item::ScenarioItem;
use crate::domain::texts;

/// Collaborators a handler needs to read and mutate records.
#[derive(Clone, Copy)]
pub struct MechanicContext<'a> {
    pub repo: &'a dyn QuizRepository,
    pub clock: &'a dyn Clock,
}

impl<'a> MechanicContext<'a> {
    #[must_use]
    pub fn new(repo: &'a dyn QuizRepository, clock: &'a dyn Clock) -> Self {
        Self { repo, clock }
    }
}

impl std::fmt::Debug for MechanicContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MechanicContext").finish_non_exhaustive()
    }
}

/// Behaviour of one step mechanic.
///
/// Optional capabilities default to "not supported": text and selection
/// input is rejected and entering a phase does nothing.
#[async_trait]
pub trait MechanicHandler: Send + Sync {
    /// The mechanic this handler drives.
    fn mechanic(&self) -> Mechanic;

    /// Prefix of inline keyboard payloads routed to this handler.
    fn routing_key(&self) -> Option<&'static str> {
        None
    }

    /// Number of phases of `step`, computed from current data.
    async fn phase_count(&self, ctx: &MechanicContext<'_>, step: &Step) -> Result<u32, DomainError>;

    /// Converts one scenario entry into a step draft.
    fn ingest(&self, item: &ScenarioItem, position: i32) -> StepDraft;

    /// Data for the public display.
    async fn display_context(
        &self,
        ctx: &MechanicContext<'_>,
        step: &Step,
        state: &GlobalState,
    ) -> Result<RenderModel, DomainError>;

    /// Messages for one participant at `phase`.
    async fn participant_prompt(
        &self,
        ctx: &MechanicContext<'_>,
        participant: &Participant,
        step: &Step,
        phase: u32,
    ) -> Result<Vec<Prompt>, DomainError>;

    /// Free text from a participant.
    async fn handle_text(
        &self,
        _ctx: &MechanicContext<'_>,
        _participant: &Participant,
        _step: &Step,
        _state: &GlobalState,
        _text: &str,
    ) -> Result<AnswerOutcome, DomainError> {
        Ok(AnswerOutcome::rejected(texts::TEXT_NOT_EXPECTED))
    }

    /// Keyboard selection; `value` is the payload after the routing key.
    async fn handle_selection(
        &self,
        _ctx: &MechanicContext<'_>,
        _participant: &Participant,
        _step: &Step,
        _state: &GlobalState,
        _value: &str,
    ) -> Result<AnswerOutcome, DomainError> {
        Ok(AnswerOutcome::rejected(texts::SELECTION_NOT_EXPECTED))
    }

    /// Fired once after the phase index of `step` changed and was persisted.
    async fn on_enter_phase(
        &self,
        _ctx: &MechanicContext<'_>,
        _step: &Step,
        _phase: u32,
    ) -> Result<(), DomainError> {
        Ok(())
    }
}
