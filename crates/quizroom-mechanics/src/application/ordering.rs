//! Ordering: participants tap options into sequence; only the exact
//! canonical order scores.
//!
//! Options are stored in canonical order and shown in a per-step shuffled
//! order. Answer latency is counted only once the permutation is complete.

use async_trait::async_trait;
use quizroom_core::error::DomainError;
use quizroom_core::messaging::{Button, Keyboard, Prompt};
use quizroom_core::model::{
    AnswerPayload, AnswerRecord, GlobalState, LatencyBucket, Mechanic, Participant, Step,
    StepDraft, StepOption,
};
use quizroom_scoring::application::command_handlers::score_ordering;
use quizroom_scoring::domain::awards::{DEFAULT_ORDERING_POINTS, is_canonical_order};
use tracing::warn;

use crate::application::counters::{
    option_index, option_views, participant_total, question_text, seconds_since,
};
use crate::application::handler::{MechanicContext, MechanicHandler};
use crate::application::ingest::{base_draft, presentation_order};
use crate::application::latency;
use crate::domain::outcome::{AnswerOutcome, ProgressUpdate};
use crate::domain::render::{
    OrderingResults, RenderDetail, RenderModel, StatusMode, StatusView, TimerView,
};
use crate::domain::scenario_item::ScenarioItem;
use crate::domain::texts;

/// Default answering time.
pub const ANSWER_TIMER_MS: u64 = 60 * 1000;

const ROUTING_KEY: &str = "seq";
const RESET: &str = "reset";
const PHASE_ANSWER: u32 = 0;
const PHASE_RESULTS: u32 = 1;

#[derive(Debug, Clone, Copy)]
pub struct OrderingHandler;

impl OrderingHandler {
    /// Options in the shuffled order participants see.
    fn presented(step: &Step, options: &[StepOption]) -> Vec<StepOption> {
        presentation_order(options.len(), step.position)
            .into_iter()
            .filter_map(|i| options.get(i).cloned())
            .collect()
    }

    fn keyboard(step: &Step, options: &[StepOption], chosen: &[u32]) -> Keyboard {
        let mut buttons: Vec<Button> = Self::presented(step, options)
            .into_iter()
            .map(|o| {
                let label = match chosen.iter().position(|c| *c == o.index) {
                    Some(rank) => format!("{}. {}", rank + 1, o.text),
                    None => o.text.clone(),
                };
                Button::new(label, format!("{ROUTING_KEY}:{}", o.index))
            })
            .collect();
        buttons.push(Button::new(texts::SEQUENCE_RESET, format!("{ROUTING_KEY}:{RESET}")));
        Keyboard { buttons }
    }

    fn chosen(record: Option<&AnswerRecord>) -> Vec<u32> {
        match record.map(|r| &r.payload) {
            Some(AnswerPayload::Ordering(order)) => order.clone(),
            _ => Vec::new(),
        }
    }

    async fn complete_answers(
        ctx: &MechanicContext<'_>,
        step: &Step,
        option_count: usize,
    ) -> Result<Vec<Vec<u32>>, DomainError> {
        Ok(ctx
            .repo
            .answers(step.id)
            .await?
            .into_iter()
            .filter_map(|a| match a.payload {
                AnswerPayload::Ordering(order) if order.len() == option_count => Some(order),
                _ => None,
            })
            .collect())
    }

    async fn progress(
        ctx: &MechanicContext<'_>,
        step: &Step,
        option_count: usize,
    ) -> Result<ProgressUpdate, DomainError> {
        Ok(ProgressUpdate::AnswerProgress {
            count: Self::complete_answers(ctx, step, option_count).await?.len(),
            total: participant_total(ctx).await?,
            last: seconds_since(ctx, ctx.repo.last_answer_at(step.id).await?),
        })
    }
}

#[async_trait]
impl MechanicHandler for OrderingHandler {
    fn mechanic(&self) -> Mechanic {
        Mechanic::Ordering
    }

    fn routing_key(&self) -> Option<&'static str> {
        Some(ROUTING_KEY)
    }

    async fn phase_count(&self, _ctx: &MechanicContext<'_>, _step: &Step) -> Result<u32, DomainError> {
        Ok(2)
    }

    fn ingest(&self, item: &ScenarioItem, position: i32) -> StepDraft {
        let mut draft = base_draft(item, position, Mechanic::Ordering, texts::TITLE_SEQUENCE);
        draft.options = item.option_texts();
        if draft.options.len() < 2 {
            warn!(position, "Ordering step needs at least two options");
        }
        draft.points = Some(item.points_value().unwrap_or(DEFAULT_ORDERING_POINTS));
        draft
    }

    async fn display_context(
        &self,
        ctx: &MechanicContext<'_>,
        step: &Step,
        state: &GlobalState,
    ) -> Result<RenderModel, DomainError> {
        let options = ctx.repo.options(step.id).await?;
        let complete = Self::complete_answers(ctx, step, options.len()).await?;

        let (shown, results) = if state.phase >= PHASE_RESULTS {
            let correct = complete
                .iter()
                .filter(|order| is_canonical_order(order, options.len()))
                .count();
            let results = OrderingResults {
                complete: complete.len(),
                correct,
            };
            (option_views(&options), Some(results))
        } else {
            (option_views(&Self::presented(step, &options)), None)
        };

        let mut model = RenderModel::for_step(
            step,
            state,
            RenderDetail::Ordering {
                options: shown,
                results,
            },
        );
        if state.phase == PHASE_ANSWER {
            texts::TITLE_SEQUENCE.clone_into(&mut model.stage_title);
            texts::INSTR_CHOICE_DISPLAY.clone_into(&mut model.instruction);
            model.timer = Some(TimerView::new(
                "quizTimer",
                step.timer_ms.unwrap_or(ANSWER_TIMER_MS),
            ));
            model.status = Some(StatusView {
                mode: StatusMode::Answers,
                current: complete.len(),
                total: participant_total(ctx).await?,
                last_secs: seconds_since(ctx, ctx.repo.last_answer_at(step.id).await?),
            });
        } else {
            model.stage_title =
                format!("{}: {}", texts::TITLE_SEQUENCE, texts::STAGE_RESULTS_SUFFIX);
            "sequence-results".clone_into(&mut model.content_class);
        }
        Ok(model)
    }

    async fn participant_prompt(
        &self,
        ctx: &MechanicContext<'_>,
        participant: &Participant,
        step: &Step,
        phase: u32,
    ) -> Result<Vec<Prompt>, DomainError> {
        let options = ctx.repo.options(step.id).await?;
        let record = ctx.repo.answer(step.id, &participant.id).await?;
        let chosen = Self::chosen(record.as_ref());

        if phase == PHASE_ANSWER {
            return Ok(vec![Prompt {
                text: question_text(texts::SEQUENCE_HEADER, step, texts::SEQUENCE_INSTR),
                keyboard: Some(Self::keyboard(step, &options, &chosen)),
            }]);
        }

        let points = step.points.unwrap_or(DEFAULT_ORDERING_POINTS);
        let verdict = if chosen.len() != options.len() || options.is_empty() {
            texts::NO_ANSWER.to_owned()
        } else if is_canonical_order(&chosen, options.len()) {
            texts::correct(points)
        } else {
            texts::WRONG_SEQUENCE.to_owned()
        };
        Ok(vec![Prompt::text(verdict + texts::RESPONSES_CLOSED)])
    }

    async fn handle_selection(
        &self,
        ctx: &MechanicContext<'_>,
        participant: &Participant,
        step: &Step,
        state: &GlobalState,
        value: &str,
    ) -> Result<AnswerOutcome, DomainError> {
        if state.phase != PHASE_ANSWER {
            return Ok(AnswerOutcome::rejected(texts::NOT_ANSWER_PHASE));
        }
        let options = ctx.repo.options(step.id).await?;
        let option_count = options.len();
        let previous = ctx.repo.answer(step.id, &participant.id).await?;
        let before = Self::chosen(previous.as_ref());

        let after = if value.trim() == RESET {
            Vec::new()
        } else {
            let Some(index) = option_index(value, option_count) else {
                return Ok(AnswerOutcome::rejected(texts::UNKNOWN_OPTION));
            };
            let mut order = before.clone();
            match order.iter().position(|c| *c == index) {
                Some(at) => {
                    order.remove(at);
                }
                None => order.push(index),
            }
            order
        };
        let is_full = option_count > 0 && after.len() == option_count;

        let now = ctx.clock.now();
        let charge = latency::charge(state, LatencyBucket::Quiz);
        if after.is_empty() {
            ctx.repo.delete_answer(step.id, &participant.id, charge).await?;
        } else {
            ctx.repo
                .put_answer(
                    AnswerRecord {
                        step_id: step.id,
                        participant_id: participant.id.clone(),
                        payload: AnswerPayload::Ordering(after.clone()),
                        answered_at: now,
                        counted: is_full,
                    },
                    charge,
                )
                .await?;
        }

        let keyboard = Self::keyboard(step, &options, &after);
        Ok(AnswerOutcome::accepted(texts::ANSWER_SAVED)
            .with_progress(Self::progress(ctx, step, option_count).await?)
            .with_keyboard(Some(keyboard)))
    }

    async fn on_enter_phase(
        &self,
        ctx: &MechanicContext<'_>,
        step: &Step,
        phase: u32,
    ) -> Result<(), DomainError> {
        if phase == PHASE_RESULTS {
            score_ordering(step, ctx.repo).await?;
        }
        Ok(())
    }
}
