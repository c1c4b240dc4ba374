//! Leaderboard: the closing step with final standings.

use async_trait::async_trait;
use quizroom_core::error::DomainError;
use quizroom_core::messaging::Prompt;
use quizroom_core::model::{GlobalState, Mechanic, Participant, Step, StepDraft};
use quizroom_scoring::application::query_handlers::{leaderboard, standing_of};

use crate::application::handler::{MechanicContext, MechanicHandler};
use crate::application::ingest::base_draft;
use crate::domain::render::{RenderDetail, RenderModel};
use crate::domain::scenario_item::ScenarioItem;
use crate::domain::texts;

#[derive(Debug, Clone, Copy)]
pub struct LeaderboardHandler;

#[async_trait]
impl MechanicHandler for LeaderboardHandler {
    fn mechanic(&self) -> Mechanic {
        Mechanic::Leaderboard
    }

    async fn phase_count(&self, _ctx: &MechanicContext<'_>, _step: &Step) -> Result<u32, DomainError> {
        Ok(1)
    }

    fn ingest(&self, item: &ScenarioItem, position: i32) -> StepDraft {
        base_draft(item, position, Mechanic::Leaderboard, texts::TITLE_LEADERBOARD)
    }

    async fn display_context(
        &self,
        ctx: &MechanicContext<'_>,
        step: &Step,
        state: &GlobalState,
    ) -> Result<RenderModel, DomainError> {
        let rows = leaderboard(ctx.repo).await?;
        let mut model = RenderModel::for_step(step, state, RenderDetail::Leaderboard { rows });
        texts::TITLE_LEADERBOARD.clone_into(&mut model.stage_title);
        model.show_reset = true;
        model.show_next = false;
        "leaderboard-page".clone_into(&mut model.content_class);
        Ok(model)
    }

    async fn participant_prompt(
        &self,
        ctx: &MechanicContext<'_>,
        participant: &Participant,
        _step: &Step,
        _phase: u32,
    ) -> Result<Vec<Prompt>, DomainError> {
        let Some(standing) = standing_of(ctx.repo, &participant.id).await? else {
            return Ok(Vec::new());
        };
        Ok(vec![Prompt::text(texts::leaderboard(
            standing.place,
            standing.score,
            standing.open_average_secs.unwrap_or(0.0),
            standing.quiz_average_secs.unwrap_or(0.0),
        ))])
    }
}
