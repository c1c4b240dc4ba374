//! Registration: participants join before the first question.

use async_trait::async_trait;
use quizroom_core::error::DomainError;
use quizroom_core::messaging::Prompt;
use quizroom_core::model::{GlobalState, Mechanic, Participant, Step, StepDraft};

use crate::application::handler::{MechanicContext, MechanicHandler};
use crate::application::ingest::base_draft;
use crate::domain::render::{ParticipantView, RenderDetail, RenderModel};
use crate::domain::scenario_item::ScenarioItem;
use crate::domain::texts;

#[derive(Debug, Clone, Copy)]
pub struct RegistrationHandler;

#[async_trait]
impl MechanicHandler for RegistrationHandler {
    fn mechanic(&self) -> Mechanic {
        Mechanic::Registration
    }

    async fn phase_count(&self, _ctx: &MechanicContext<'_>, _step: &Step) -> Result<u32, DomainError> {
        Ok(1)
    }

    fn ingest(&self, item: &ScenarioItem, position: i32) -> StepDraft {
        base_draft(item, position, Mechanic::Registration, texts::TITLE_REGISTRATION)
    }

    async fn display_context(
        &self,
        ctx: &MechanicContext<'_>,
        step: &Step,
        state: &GlobalState,
    ) -> Result<RenderModel, DomainError> {
        let participants = ctx
            .repo
            .participants()
            .await?
            .into_iter()
            .map(|p| ParticipantView {
                id: p.id,
                name: p.name,
            })
            .collect();
        let mut model =
            RenderModel::for_step(step, state, RenderDetail::Registration { participants });
        texts::TITLE_REGISTRATION.clone_into(&mut model.stage_title);
        model.show_reset = true;
        Ok(model)
    }

    async fn participant_prompt(
        &self,
        _ctx: &MechanicContext<'_>,
        participant: &Participant,
        _step: &Step,
        _phase: u32,
    ) -> Result<Vec<Prompt>, DomainError> {
        Ok(vec![Prompt::text(texts::registered(&participant.name))])
    }
}
