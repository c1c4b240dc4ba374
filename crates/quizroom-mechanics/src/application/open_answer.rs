//! Open answer: participants submit free-text ideas, then vote for each
//! other's ideas. Authors earn one point per distinct voter.
//!
//! Phases: 0 collects ideas, 1 collects votes, 2 shows results. With no
//! ideas submitted there is nothing to vote on and the step has only two
//! phases.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use quizroom_core::clock::elapsed_secs;
use quizroom_core::error::DomainError;
use quizroom_core::messaging::{Button, Keyboard, Prompt};
use quizroom_core::model::{
    GlobalState, Idea, IdeaVote, LatencyBucket, Mechanic, Participant, Step, StepDraft,
};
use quizroom_scoring::application::command_handlers::score_votes;
use tracing::debug;

use crate::application::counters::{participant_total, question_text, seconds_since};
use crate::application::handler::{MechanicContext, MechanicHandler};
use crate::application::ingest::base_draft;
use crate::application::latency;
use crate::domain::format::{button_excerpt, humanize_seconds};
use crate::domain::outcome::{AnswerOutcome, ProgressUpdate};
use crate::domain::render::{
    IdeaView, RenderDetail, RenderModel, StatusMode, StatusView, TimerView,
};
use crate::domain::scenario_item::ScenarioItem;
use crate::domain::texts;

/// Default idea collection time.
pub const COLLECT_TIMER_MS: u64 = 5 * 60 * 1000;
/// Voting time.
pub const VOTE_TIMER_MS: u64 = 60 * 1000;

const PHASE_COLLECT: u32 = 0;
const PHASE_VOTE: u32 = 1;
const PHASE_RESULTS: u32 = 2;

#[derive(Debug, Clone, Copy)]
pub struct OpenAnswerHandler;

impl OpenAnswerHandler {
    /// Voting keyboard for `voter`: every idea except their own, voted ones
    /// marked.
    async fn vote_keyboard(
        ctx: &MechanicContext<'_>,
        step: &Step,
        voter_id: &str,
    ) -> Result<Option<Keyboard>, DomainError> {
        let ideas = ctx.repo.ideas(step.id).await?;
        let voted: BTreeSet<i64> = ctx
            .repo
            .votes(step.id)
            .await?
            .into_iter()
            .filter(|v| v.voter_id == voter_id)
            .map(|v| v.idea_id)
            .collect();

        let buttons: Vec<Button> = ideas
            .iter()
            .enumerate()
            .filter(|(_, idea)| idea.participant_id != voter_id)
            .map(|(i, idea)| {
                let mark = if voted.contains(&idea.id) { "✅ " } else { "" };
                Button::new(
                    format!("{mark}{}. {}", i + 1, button_excerpt(&idea.text, 40)),
                    format!("vote:{}", idea.id),
                )
            })
            .collect();
        Ok((!buttons.is_empty()).then_some(Keyboard { buttons }))
    }

    fn idea_views(
        ideas: &[Idea],
        votes: &[IdeaVote],
        names: &HashMap<String, String>,
        state: &GlobalState,
        with_votes: bool,
    ) -> Vec<IdeaView> {
        let name_of = |id: &str| names.get(id).cloned().unwrap_or_default();
        ideas
            .iter()
            .map(|idea| {
                let voters: Vec<String> = if with_votes {
                    votes
                        .iter()
                        .filter(|v| v.idea_id == idea.id)
                        .map(|v| name_of(&v.voter_id))
                        .collect()
                } else {
                    Vec::new()
                };
                IdeaView {
                    id: idea.id,
                    author_id: idea.participant_id.clone(),
                    author_name: name_of(&idea.participant_id),
                    text: idea.text.clone(),
                    delay_text: humanize_seconds(elapsed_secs(
                        state.step_started_at,
                        idea.submitted_at,
                    )),
                    votes: voters.len(),
                    voters,
                }
            })
            .collect()
    }
}

#[async_trait]
impl MechanicHandler for OpenAnswerHandler {
    fn mechanic(&self) -> Mechanic {
        Mechanic::OpenAnswer
    }

    fn routing_key(&self) -> Option<&'static str> {
        Some("vote")
    }

    async fn phase_count(&self, ctx: &MechanicContext<'_>, step: &Step) -> Result<u32, DomainError> {
        let ideas = ctx.repo.count_ideas(step.id).await?;
        Ok(if ideas == 0 { 2 } else { 3 })
    }

    fn ingest(&self, item: &ScenarioItem, position: i32) -> StepDraft {
        base_draft(item, position, Mechanic::OpenAnswer, texts::TITLE_OPEN)
    }

    async fn display_context(
        &self,
        ctx: &MechanicContext<'_>,
        step: &Step,
        state: &GlobalState,
    ) -> Result<RenderModel, DomainError> {
        let ideas = ctx.repo.ideas(step.id).await?;
        let votes = ctx.repo.votes(step.id).await?;
        let participants = ctx.repo.participants().await?;
        let total = participants.len();
        let names: HashMap<String, String> =
            participants.into_iter().map(|p| (p.id, p.name)).collect();

        let mut views = match state.phase {
            PHASE_COLLECT => Vec::new(),
            PHASE_VOTE => Self::idea_views(&ideas, &votes, &names, state, false),
            _ => Self::idea_views(&ideas, &votes, &names, state, true),
        };
        if state.phase >= PHASE_RESULTS {
            views.sort_by(|a, b| b.votes.cmp(&a.votes));
        }

        let mut model =
            RenderModel::for_step(step, state, RenderDetail::OpenAnswer { ideas: views });
        match state.phase {
            PHASE_COLLECT => {
                texts::TITLE_OPEN.clone_into(&mut model.stage_title);
                texts::INSTR_OPEN_DISPLAY.clone_into(&mut model.instruction);
                model.timer = Some(TimerView::new(
                    "ideaTimer",
                    step.timer_ms.unwrap_or(COLLECT_TIMER_MS),
                ));
                model.status = Some(StatusView {
                    mode: StatusMode::Answers,
                    current: ideas.len(),
                    total,
                    last_secs: seconds_since(ctx, ideas.iter().map(|i| i.submitted_at).max()),
                });
                "description-page".clone_into(&mut model.content_class);
            }
            PHASE_VOTE => {
                model.stage_title = format!("{}: {}", texts::TITLE_OPEN, texts::STAGE_VOTING_SUFFIX);
                if !ideas.is_empty() {
                    texts::INSTR_VOTE_DISPLAY.clone_into(&mut model.instruction);
                    "ideas-page".clone_into(&mut model.content_class);
                    let voters: BTreeSet<&str> = votes.iter().map(|v| v.voter_id.as_str()).collect();
                    model.timer = Some(TimerView::new("voteTimer", VOTE_TIMER_MS));
                    model.status = Some(StatusView {
                        mode: StatusMode::Votes,
                        current: voters.len(),
                        total,
                        last_secs: seconds_since(ctx, votes.iter().map(|v| v.created_at).max()),
                    });
                }
            }
            _ => {
                model.stage_title =
                    format!("{}: {}", texts::TITLE_OPEN, texts::STAGE_RESULTS_SUFFIX);
                if !ideas.is_empty() {
                    "ideas-page".clone_into(&mut model.content_class);
                }
            }
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
        let prompt = match phase {
            PHASE_COLLECT => Prompt::text(question_text(texts::OPEN_HEADER, step, texts::OPEN_INSTR)),
            PHASE_VOTE => match Self::vote_keyboard(ctx, step, &participant.id).await? {
                Some(keyboard) => Prompt {
                    text: texts::VOTE_START.to_owned(),
                    keyboard: Some(keyboard),
                },
                None => Prompt::text(texts::VOTE_NO_OPTIONS),
            },
            PHASE_RESULTS => {
                let received = match ctx.repo.idea_by_author(step.id, &participant.id).await? {
                    Some(idea) => ctx
                        .repo
                        .votes(step.id)
                        .await?
                        .iter()
                        .filter(|v| v.idea_id == idea.id)
                        .count(),
                    None => 0,
                };
                Prompt::text(texts::vote_finished(received))
            }
            _ => return Ok(Vec::new()),
        };
        Ok(vec![prompt])
    }

    async fn handle_text(
        &self,
        ctx: &MechanicContext<'_>,
        participant: &Participant,
        step: &Step,
        state: &GlobalState,
        text: &str,
    ) -> Result<AnswerOutcome, DomainError> {
        if state.phase != PHASE_COLLECT {
            return Ok(AnswerOutcome::rejected(texts::NOT_COLLECTING_IDEAS));
        }
        let text = text.trim();
        if text.is_empty() {
            return Ok(AnswerOutcome::rejected(texts::IDEA_EMPTY));
        }

        let now = ctx.clock.now();
        ctx.repo
            .put_idea(
                step.id,
                &participant.id,
                text,
                now,
                latency::charge(state, LatencyBucket::Open),
            )
            .await?;
        debug!(step_id = step.id, participant_id = %participant.id, "Idea stored");

        let ideas = ctx.repo.ideas(step.id).await?;
        let progress = ProgressUpdate::IdeaProgress {
            count: ideas.len(),
            total: participant_total(ctx).await?,
            last: seconds_since(ctx, ideas.iter().map(|i| i.submitted_at).max()),
        };
        Ok(AnswerOutcome::accepted(texts::IDEA_ACCEPTED).with_progress(progress))
    }

    async fn handle_selection(
        &self,
        ctx: &MechanicContext<'_>,
        participant: &Participant,
        step: &Step,
        state: &GlobalState,
        value: &str,
    ) -> Result<AnswerOutcome, DomainError> {
        if state.phase != PHASE_VOTE {
            return Ok(AnswerOutcome::rejected(texts::NOT_VOTE_PHASE));
        }
        let Ok(idea_id) = value.trim().parse::<i64>() else {
            return Ok(AnswerOutcome::rejected(texts::UNKNOWN_OPTION));
        };
        let Some(idea) = ctx.repo.idea(idea_id).await?.filter(|i| i.step_id == step.id) else {
            return Ok(AnswerOutcome::rejected(texts::UNKNOWN_OPTION));
        };
        if idea.participant_id == participant.id {
            return Ok(AnswerOutcome::rejected(texts::VOTE_OWN_IDEA));
        }

        let reply = if ctx.repo.delete_vote(step.id, idea.id, &participant.id).await? {
            texts::VOTE_REMOVED
        } else {
            ctx.repo
                .insert_vote(step.id, idea.id, &participant.id, ctx.clock.now())
                .await?;
            texts::VOTE_COUNTED
        };

        let votes = ctx.repo.votes(step.id).await?;
        let voters: BTreeSet<&str> = votes.iter().map(|v| v.voter_id.as_str()).collect();
        let progress = ProgressUpdate::VoteProgress {
            count: voters.len(),
            last: seconds_since(ctx, votes.iter().map(|v| v.created_at).max()),
        };
        let keyboard = Self::vote_keyboard(ctx, step, &participant.id).await?;
        Ok(AnswerOutcome::accepted(reply)
            .with_progress(progress)
            .with_keyboard(keyboard))
    }

    async fn on_enter_phase(
        &self,
        ctx: &MechanicContext<'_>,
        step: &Step,
        phase: u32,
    ) -> Result<(), DomainError> {
        if phase == PHASE_RESULTS {
            score_votes(step, ctx.repo).await?;
        }
        Ok(())
    }
}
