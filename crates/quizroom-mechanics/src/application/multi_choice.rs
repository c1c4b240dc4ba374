//! Multi choice: several correct options, partial credit for correct subsets.

use std::collections::BTreeSet;

use async_trait::async_trait;
use quizroom_core::error::DomainError;
use quizroom_core::messaging::Prompt;
use quizroom_core::model::{
    AnswerPayload, AnswerRecord, GlobalState, LatencyBucket, Mechanic, Participant, Step,
    StepDraft,
};
use quizroom_scoring::application::command_handlers::score_multi_choice;
use quizroom_scoring::domain::awards::multi_choice_award;
use serde_json::Value;
use tracing::warn;

use crate::application::counters::{
    answer_progress, answer_status, choice_keyboard, choice_results, option_index, option_views,
    question_text,
};
use crate::application::handler::{MechanicContext, MechanicHandler};
use crate::application::ingest::{base_draft, shuffle_choices};
use crate::application::latency;
use crate::domain::outcome::AnswerOutcome;
use crate::domain::render::{RenderDetail, RenderModel, TimerView};
use crate::domain::scenario_item::{ScenarioItem, correct_index, scalar_text};
use crate::domain::texts;

/// Default answering time.
pub const ANSWER_TIMER_MS: u64 = 60 * 1000;

const ROUTING_KEY: &str = "multi";
const PHASE_ANSWER: u32 = 0;
const PHASE_RESULTS: u32 = 1;

#[derive(Debug, Clone, Copy)]
pub struct MultiChoiceHandler;

impl MultiChoiceHandler {
    /// Options and correct indices from either the `options` + `correct`
    /// form or the `correct_options` + `other_options` form.
    fn read_options(item: &ScenarioItem) -> (Vec<String>, BTreeSet<u32>) {
        if !item.correct_options.is_empty() {
            let right: Vec<String> = item.correct_options.iter().filter_map(scalar_text).collect();
            let wrong = item.other_options.iter().filter_map(scalar_text);
            let correct = (0..u32::try_from(right.len()).unwrap_or(u32::MAX)).collect();
            let options = right.into_iter().chain(wrong).collect();
            return (options, correct);
        }

        let options = item.option_texts();
        let correct: BTreeSet<u32> = match item.correct.as_ref() {
            Some(Value::Array(values)) => values.iter().filter_map(correct_index).collect(),
            Some(single) => correct_index(single).into_iter().collect(),
            None => BTreeSet::new(),
        };
        let correct = correct
            .into_iter()
            .filter(|i| (*i as usize) < options.len())
            .collect();
        (options, correct)
    }

    fn selection(record: Option<&AnswerRecord>) -> BTreeSet<u32> {
        match record.map(|r| &r.payload) {
            Some(AnswerPayload::Multi(selected)) => selected.clone(),
            _ => BTreeSet::new(),
        }
    }
}

#[async_trait]
impl MechanicHandler for MultiChoiceHandler {
    fn mechanic(&self) -> Mechanic {
        Mechanic::MultiChoice
    }

    fn routing_key(&self) -> Option<&'static str> {
        Some(ROUTING_KEY)
    }

    async fn phase_count(&self, _ctx: &MechanicContext<'_>, _step: &Step) -> Result<u32, DomainError> {
        Ok(2)
    }

    fn ingest(&self, item: &ScenarioItem, position: i32) -> StepDraft {
        let mut draft = base_draft(item, position, Mechanic::MultiChoice, texts::TITLE_MULTI);
        let (options, correct) = Self::read_options(item);
        if options.is_empty() {
            warn!(position, "Multi-choice step has no options");
        } else if correct.is_empty() {
            warn!(position, "Multi-choice step has no valid correct answers");
        }

        let (options, correct) = shuffle_choices(options, &correct, position);
        draft.options = options;
        draft.correct_indices = (!correct.is_empty()).then_some(correct);
        draft.points = item.points_value();
        draft
    }

    async fn display_context(
        &self,
        ctx: &MechanicContext<'_>,
        step: &Step,
        state: &GlobalState,
    ) -> Result<RenderModel, DomainError> {
        let options = ctx.repo.options(step.id).await?;
        let results = if state.phase >= PHASE_RESULTS {
            let correct = step
                .correct_indices
                .as_ref()
                .map(|c| c.iter().copied().collect())
                .unwrap_or_default();
            Some(choice_results(ctx, step, &options, correct).await?)
        } else {
            None
        };
        let detail = RenderDetail::Choice {
            options: option_views(&options),
            results,
        };

        let mut model = RenderModel::for_step(step, state, detail);
        if state.phase == PHASE_ANSWER {
            texts::TITLE_MULTI.clone_into(&mut model.stage_title);
            texts::INSTR_CHOICE_DISPLAY.clone_into(&mut model.instruction);
            model.timer = Some(TimerView::new(
                "quizTimer",
                step.timer_ms.unwrap_or(ANSWER_TIMER_MS),
            ));
            model.status = Some(answer_status(ctx, step).await?);
        } else {
            model.stage_title = format!("{}: {}", texts::TITLE_MULTI, texts::STAGE_RESULTS_SUFFIX);
            "mcq-results".clone_into(&mut model.content_class);
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
        let record = ctx.repo.answer(step.id, &participant.id).await?;
        let selected = Self::selection(record.as_ref());

        if phase == PHASE_ANSWER {
            let options = ctx.repo.options(step.id).await?;
            return Ok(vec![Prompt {
                text: question_text(texts::MULTI_HEADER, step, texts::MULTI_INSTR),
                keyboard: Some(choice_keyboard(&options, ROUTING_KEY, &selected)),
            }]);
        }

        let correct = step.correct_indices.clone().unwrap_or_default();
        let verdict = if record.is_none() {
            texts::NO_ANSWER.to_owned()
        } else if !selected.is_subset(&correct) {
            texts::WRONG_ANSWER.to_owned()
        } else {
            texts::correct(multi_choice_award(
                &selected,
                &correct,
                step.points.unwrap_or(0),
            ))
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
        let Some(index) = option_index(value, options.len()) else {
            return Ok(AnswerOutcome::rejected(texts::UNKNOWN_OPTION));
        };

        let previous = ctx.repo.answer(step.id, &participant.id).await?;
        let mut selected = Self::selection(previous.as_ref());
        if !selected.remove(&index) {
            selected.insert(index);
        }

        let now = ctx.clock.now();
        ctx.repo
            .put_answer(
                AnswerRecord {
                    step_id: step.id,
                    participant_id: participant.id.clone(),
                    payload: AnswerPayload::Multi(selected.clone()),
                    answered_at: now,
                    counted: true,
                },
                latency::charge(state, LatencyBucket::Quiz),
            )
            .await?;

        let keyboard = choice_keyboard(&options, ROUTING_KEY, &selected);
        Ok(AnswerOutcome::accepted(texts::ANSWER_SAVED)
            .with_progress(answer_progress(ctx, step).await?)
            .with_keyboard(Some(keyboard)))
    }

    async fn on_enter_phase(
        &self,
        ctx: &MechanicContext<'_>,
        step: &Step,
        phase: u32,
    ) -> Result<(), DomainError> {
        if phase == PHASE_RESULTS {
            score_multi_choice(step, ctx.repo).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use quizroom_core::repository::QuizRepository;
    use quizroom_store::MemoryRepository;
    use quizroom_test_support::FixedClock;
    use serde_json::json;

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    fn texts_at(draft: &StepDraft) -> BTreeSet<String> {
        draft
            .correct_indices
            .iter()
            .flatten()
            .map(|i| draft.options[*i as usize].clone())
            .collect()
    }

    #[test]
    fn test_ingest_reads_correct_list_with_mixed_bases() {
        let item: ScenarioItem = serde_json::from_value(json!({
            "type": "multi",
            "options": ["2", "4", "5", "9"],
            "correct": ["1", 2],
            "points": 6
        }))
        .unwrap();

        let draft = MultiChoiceHandler.ingest(&item, 3);

        assert_eq!(
            texts_at(&draft),
            BTreeSet::from(["2".to_string(), "5".to_string()])
        );
    }

    #[test]
    fn test_ingest_reads_correct_and_other_options_form() {
        let item: ScenarioItem = serde_json::from_value(json!({
            "type": "multi",
            "correct_options": ["cat", "dog"],
            "other_options": ["trout"]
        }))
        .unwrap();

        let draft = MultiChoiceHandler.ingest(&item, 3);

        assert_eq!(draft.options.len(), 3);
        assert_eq!(
            texts_at(&draft),
            BTreeSet::from(["cat".to_string(), "dog".to_string()])
        );
    }

    #[tokio::test]
    async fn test_selections_toggle_and_score_partial_credit() {
        // Arrange
        let repo = MemoryRepository::new();
        let clock = FixedClock(t0());
        let ctx = MechanicContext::new(&repo, &clock);
        let mut draft = StepDraft::new(1, Mechanic::MultiChoice, "Primes");
        draft.options = vec!["2".into(), "4".into(), "5".into()];
        draft.correct_indices = Some(BTreeSet::from([0, 2]));
        draft.points = Some(6);
        let step = repo.insert_step(draft).await.unwrap();
        let ann = repo.upsert_participant("ann", "Ann", t0()).await.unwrap();
        let state = GlobalState::at_step(Some(step.id), t0());

        // Act: pick 0 and 1, then take 1 back
        for value in ["0", "1", "1"] {
            MultiChoiceHandler
                .handle_selection(&ctx, &ann, &step, &state, value)
                .await
                .unwrap();
        }
        MultiChoiceHandler.on_enter_phase(&ctx, &step, 1).await.unwrap();

        // Assert
        assert_eq!(
            repo.answer(step.id, "ann").await.unwrap().unwrap().payload,
            AnswerPayload::Multi(BTreeSet::from([0]))
        );
        let ann = repo.participant("ann").await.unwrap().unwrap();
        assert_eq!(ann.total_score, 3);
        assert_eq!(ann.quiz_answer_count, 1);
        let prompts = MultiChoiceHandler
            .participant_prompt(&ctx, &ann, &step, 1)
            .await
            .unwrap();
        assert!(prompts[0].text.starts_with(&texts::correct(3)));
    }
}
