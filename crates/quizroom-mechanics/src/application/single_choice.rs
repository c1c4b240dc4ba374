//! Single choice: one correct option, scored when results are revealed.

use std::collections::BTreeSet;

use async_trait::async_trait;
use quizroom_core::error::DomainError;
use quizroom_core::messaging::Prompt;
use quizroom_core::model::{
    AnswerPayload, AnswerRecord, GlobalState, LatencyBucket, Mechanic, Participant, Step,
    StepDraft,
};
use quizroom_scoring::application::command_handlers::score_single_choice;
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
use crate::domain::scenario_item::{ScenarioItem, correct_index};
use crate::domain::texts;

/// Default answering time.
pub const ANSWER_TIMER_MS: u64 = 60 * 1000;

const ROUTING_KEY: &str = "mcq";
const PHASE_ANSWER: u32 = 0;
const PHASE_RESULTS: u32 = 1;

#[derive(Debug, Clone, Copy)]
pub struct SingleChoiceHandler;

#[async_trait]
impl MechanicHandler for SingleChoiceHandler {
    fn mechanic(&self) -> Mechanic {
        Mechanic::SingleChoice
    }

    fn routing_key(&self) -> Option<&'static str> {
        Some(ROUTING_KEY)
    }

    async fn phase_count(&self, _ctx: &MechanicContext<'_>, _step: &Step) -> Result<u32, DomainError> {
        Ok(2)
    }

    fn ingest(&self, item: &ScenarioItem, position: i32) -> StepDraft {
        let mut draft = base_draft(item, position, Mechanic::SingleChoice, texts::TITLE_QUIZ);
        let options = item.option_texts();
        let correct: BTreeSet<u32> = item
            .correct
            .as_ref()
            .and_then(correct_index)
            .filter(|i| (*i as usize) < options.len())
            .into_iter()
            .collect();
        if options.is_empty() {
            warn!(position, "Single-choice step has no options");
        } else if correct.is_empty() {
            warn!(position, "Single-choice step has no valid correct answer");
        }

        let (options, correct) = shuffle_choices(options, &correct, position);
        draft.options = options;
        draft.correct_index = correct.into_iter().next();
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
            let correct = step.correct_index.into_iter().collect();
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
            texts::TITLE_QUIZ.clone_into(&mut model.stage_title);
            texts::INSTR_CHOICE_DISPLAY.clone_into(&mut model.instruction);
            model.timer = Some(TimerView::new(
                "quizTimer",
                step.timer_ms.unwrap_or(ANSWER_TIMER_MS),
            ));
            model.status = Some(answer_status(ctx, step).await?);
        } else {
            model.stage_title = format!("{}: {}", texts::TITLE_QUIZ, texts::STAGE_RESULTS_SUFFIX);
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
        let answer = ctx.repo.answer(step.id, &participant.id).await?;
        let choice = match answer.map(|a| a.payload) {
            Some(AnswerPayload::Choice(index)) => Some(index),
            _ => None,
        };

        if phase == PHASE_ANSWER {
            let options = ctx.repo.options(step.id).await?;
            let selected: BTreeSet<u32> = choice.into_iter().collect();
            return Ok(vec![Prompt {
                text: question_text(texts::QUIZ_HEADER, step, texts::QUIZ_INSTR),
                keyboard: Some(choice_keyboard(&options, ROUTING_KEY, &selected)),
            }]);
        }

        let verdict = match choice {
            None => texts::NO_ANSWER.to_owned(),
            Some(index) if step.correct_index == Some(index) => {
                texts::correct(step.points.unwrap_or(0))
            }
            Some(_) => texts::WRONG_ANSWER.to_owned(),
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
        if let Some(AnswerPayload::Choice(current)) = previous.as_ref().map(|a| &a.payload) {
            if *current == index {
                return Ok(AnswerOutcome::accepted(texts::ANSWER_UNCHANGED));
            }
        }

        let now = ctx.clock.now();
        ctx.repo
            .put_answer(
                AnswerRecord {
                    step_id: step.id,
                    participant_id: participant.id.clone(),
                    payload: AnswerPayload::Choice(index),
                    answered_at: now,
                    counted: true,
                },
                latency::charge(state, LatencyBucket::Quiz),
            )
            .await?;

        let keyboard = choice_keyboard(&options, ROUTING_KEY, &BTreeSet::from([index]));
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
            score_single_choice(step, ctx.repo).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use quizroom_core::repository::QuizRepository;
    use quizroom_store::MemoryRepository;
    use quizroom_test_support::ManualClock;
    use serde_json::json;

    use super::*;
    use crate::domain::outcome::ProgressUpdate;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    fn item() -> ScenarioItem {
        serde_json::from_value(json!({
            "type": "quiz",
            "title": "Largest planet?",
            "options": ["Mars", "Jupiter", "Venus", "Earth"],
            "correct": "2",
            "points": 10,
            "time": 30
        }))
        .unwrap()
    }

    fn state(step: &Step, phase: u32) -> GlobalState {
        GlobalState {
            phase,
            ..GlobalState::at_step(Some(step.id), t0())
        }
    }

    #[test]
    fn test_ingest_shuffles_options_and_tracks_correct_answer() {
        // Act
        let draft = SingleChoiceHandler.ingest(&item(), 5);

        // Assert
        assert_eq!(draft.options.len(), 4);
        let correct = draft.correct_index.unwrap() as usize;
        assert_eq!(draft.options[correct], "Jupiter");
        assert_eq!(draft.points, Some(10));
        assert_eq!(draft.timer_ms, Some(30_000));
        assert_eq!(SingleChoiceHandler.ingest(&item(), 5), draft);
    }

    #[test]
    fn test_ingest_accepts_zero_based_integer_correct() {
        let mut raw = item();
        raw.correct = Some(json!(0));

        let draft = SingleChoiceHandler.ingest(&raw, 2);

        let correct = draft.correct_index.unwrap() as usize;
        assert_eq!(draft.options[correct], "Mars");
    }

    #[tokio::test]
    async fn test_selection_latency_and_unchanged_reselect() {
        // Arrange
        let repo = MemoryRepository::new();
        let clock = ManualClock::new(t0());
        let ctx = MechanicContext::new(&repo, &clock);
        let step = repo.insert_step(SingleChoiceHandler.ingest(&item(), 1)).await.unwrap();
        let ann = repo.upsert_participant("ann", "Ann", t0()).await.unwrap();

        // Act
        clock.advance(Duration::seconds(3));
        let first = SingleChoiceHandler
            .handle_selection(&ctx, &ann, &step, &state(&step, 0), "0")
            .await
            .unwrap();
        clock.advance(Duration::seconds(2));
        let again = SingleChoiceHandler
            .handle_selection(&ctx, &ann, &step, &state(&step, 0), "0")
            .await
            .unwrap();
        let changed = SingleChoiceHandler
            .handle_selection(&ctx, &ann, &step, &state(&step, 0), "1")
            .await
            .unwrap();

        // Assert
        assert_eq!(first.reply, texts::ANSWER_SAVED);
        assert_eq!(
            first.progress,
            Some(ProgressUpdate::AnswerProgress {
                count: 1,
                total: 1,
                last: Some(0),
            })
        );
        assert_eq!(again.reply, texts::ANSWER_UNCHANGED);
        assert!(again.progress.is_none());
        assert_eq!(changed.reply, texts::ANSWER_SAVED);
        let ann = repo.participant("ann").await.unwrap().unwrap();
        assert_eq!(ann.quiz_answer_ms, 5_000);
        assert_eq!(ann.quiz_answer_count, 1);
        assert_eq!(
            repo.answer(step.id, "ann").await.unwrap().unwrap().payload,
            AnswerPayload::Choice(1)
        );
    }

    #[tokio::test]
    async fn test_selection_is_rejected_after_answers_close() {
        let repo = MemoryRepository::new();
        let clock = ManualClock::new(t0());
        let ctx = MechanicContext::new(&repo, &clock);
        let step = repo.insert_step(SingleChoiceHandler.ingest(&item(), 1)).await.unwrap();
        let ann = repo.upsert_participant("ann", "Ann", t0()).await.unwrap();

        let outcome = SingleChoiceHandler
            .handle_selection(&ctx, &ann, &step, &state(&step, 1), "0")
            .await
            .unwrap();

        assert!(!outcome.accepted);
        assert_eq!(repo.count_answers(step.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_option_is_rejected() {
        let repo = MemoryRepository::new();
        let clock = ManualClock::new(t0());
        let ctx = MechanicContext::new(&repo, &clock);
        let step = repo.insert_step(SingleChoiceHandler.ingest(&item(), 1)).await.unwrap();
        let ann = repo.upsert_participant("ann", "Ann", t0()).await.unwrap();

        let outcome = SingleChoiceHandler
            .handle_selection(&ctx, &ann, &step, &state(&step, 0), "9")
            .await
            .unwrap();

        assert_eq!(outcome.reply, texts::UNKNOWN_OPTION);
    }

    #[tokio::test]
    async fn test_results_show_counts_percents_and_names() {
        // Arrange
        let repo = MemoryRepository::new();
        let clock = ManualClock::new(t0());
        let ctx = MechanicContext::new(&repo, &clock);
        let step = repo.insert_step(SingleChoiceHandler.ingest(&item(), 1)).await.unwrap();
        let correct = step.correct_index.unwrap();
        for (id, pick) in [("ann", correct), ("bo", correct), ("cy", (correct + 1) % 4)] {
            let who = repo.upsert_participant(id, id, t0()).await.unwrap();
            SingleChoiceHandler
                .handle_selection(&ctx, &who, &step, &state(&step, 0), &pick.to_string())
                .await
                .unwrap();
        }

        // Act
        SingleChoiceHandler.on_enter_phase(&ctx, &step, 1).await.unwrap();
        let model = SingleChoiceHandler
            .display_context(&ctx, &step, &state(&step, 1))
            .await
            .unwrap();

        // Assert
        let RenderDetail::Choice { results: Some(results), .. } = model.detail else {
            panic!("expected choice results");
        };
        assert_eq!(results.counts[correct as usize], 2);
        assert_eq!(results.percents[correct as usize], 67);
        assert_eq!(results.correct, vec![correct]);
        assert_eq!(results.voters[correct as usize], vec!["ann", "bo"]);
        assert_eq!(model.content_class, "mcq-results");
        assert_eq!(repo.participant("ann").await.unwrap().unwrap().total_score, 10);
        assert_eq!(repo.participant("cy").await.unwrap().unwrap().total_score, 0);
    }

    #[tokio::test]
    async fn test_prompt_after_reveal_reports_verdict() {
        let repo = MemoryRepository::new();
        let clock = ManualClock::new(t0());
        let ctx = MechanicContext::new(&repo, &clock);
        let step = repo.insert_step(SingleChoiceHandler.ingest(&item(), 1)).await.unwrap();
        let ann = repo.upsert_participant("ann", "Ann", t0()).await.unwrap();
        let correct = step.correct_index.unwrap();
        SingleChoiceHandler
            .handle_selection(&ctx, &ann, &step, &state(&step, 0), &correct.to_string())
            .await
            .unwrap();

        let prompts = SingleChoiceHandler
            .participant_prompt(&ctx, &ann, &step, 1)
            .await
            .unwrap();

        assert_eq!(prompts[0].text, format!("{}{}", texts::correct(10), texts::RESPONSES_CLOSED));
        assert!(prompts[0].keyboard.is_none());
    }
}
