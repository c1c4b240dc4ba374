//! Progress counters shared by the answer-collecting mechanics.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use quizroom_core::clock::elapsed_secs;
use quizroom_core::error::DomainError;
use quizroom_core::messaging::{Button, Keyboard};
use quizroom_core::model::{AnswerPayload, Step, StepOption};

use crate::application::handler::MechanicContext;
use crate::domain::format::percent;
use crate::domain::outcome::ProgressUpdate;
use crate::domain::render::{ChoiceResults, OptionView, StatusMode, StatusView};

/// Whole seconds from `at` to now.
#[must_use]
pub fn seconds_since(ctx: &MechanicContext<'_>, at: Option<DateTime<Utc>>) -> Option<i64> {
    at.map(|at| elapsed_secs(at, ctx.clock.now()))
}

/// Number of registered participants.
///
/// # Errors
///
/// Returns any repository error.
pub async fn participant_total(ctx: &MechanicContext<'_>) -> Result<usize, DomainError> {
    Ok(ctx.repo.participants().await?.len())
}

/// Answer counter for choice steps.
///
/// # Errors
///
/// Returns any repository error.
pub async fn answer_progress(
    ctx: &MechanicContext<'_>,
    step: &Step,
) -> Result<ProgressUpdate, DomainError> {
    Ok(ProgressUpdate::AnswerProgress {
        count: ctx.repo.count_answers(step.id).await?,
        total: participant_total(ctx).await?,
        last: seconds_since(ctx, ctx.repo.last_answer_at(step.id).await?),
    })
}

/// Display status line while answers are collected.
///
/// # Errors
///
/// Returns any repository error.
pub async fn answer_status(
    ctx: &MechanicContext<'_>,
    step: &Step,
) -> Result<StatusView, DomainError> {
    Ok(StatusView {
        mode: StatusMode::Answers,
        current: ctx.repo.count_answers(step.id).await?,
        total: participant_total(ctx).await?,
        last_secs: seconds_since(ctx, ctx.repo.last_answer_at(step.id).await?),
    })
}

#[must_use]
pub fn option_views(options: &[StepOption]) -> Vec<OptionView> {
    options
        .iter()
        .map(|o| OptionView {
            index: o.index,
            text: o.text.clone(),
        })
        .collect()
}

/// Question text: header, title, optional body and instruction,
/// separated by blank lines.
#[must_use]
pub fn question_text(header: &str, step: &Step, instruction: &str) -> String {
    let mut parts = vec![header.to_owned(), step.title.clone()];
    if let Some(body) = step.body.as_deref().filter(|b| !b.is_empty()) {
        parts.push(body.to_owned());
    }
    parts.push(instruction.to_owned());
    parts.join("\n\n")
}

/// Parses a keyboard value as an option index below `len`.
#[must_use]
pub fn option_index(value: &str, len: usize) -> Option<u32> {
    value
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|i| (*i as usize) < len)
}

/// One button per option, `"N. text"`, selected ones marked.
#[must_use]
pub fn choice_keyboard(
    options: &[StepOption],
    routing_key: &str,
    selected: &BTreeSet<u32>,
) -> Keyboard {
    let buttons = options
        .iter()
        .map(|o| {
            let mark = if selected.contains(&o.index) { "✅ " } else { "" };
            Button::new(
                format!("{mark}{}. {}", o.index + 1, o.text),
                format!("{routing_key}:{}", o.index),
            )
        })
        .collect();
    Keyboard { buttons }
}

/// Option indices picked by a choice answer.
#[must_use]
pub fn picked(payload: &AnswerPayload) -> BTreeSet<u32> {
    match payload {
        AnswerPayload::Choice(index) => BTreeSet::from([*index]),
        AnswerPayload::Multi(indices) => indices.clone(),
        AnswerPayload::Ordering(_) => BTreeSet::new(),
    }
}

/// Per-option tallies with the names of who picked what.
///
/// # Errors
///
/// Returns any repository error.
pub async fn choice_results(
    ctx: &MechanicContext<'_>,
    step: &Step,
    options: &[StepOption],
    correct: Vec<u32>,
) -> Result<ChoiceResults, DomainError> {
    let names: HashMap<String, String> = ctx
        .repo
        .participants()
        .await?
        .into_iter()
        .map(|p| (p.id, p.name))
        .collect();
    let answers = ctx.repo.answers(step.id).await?;

    let mut voters: Vec<Vec<String>> = vec![Vec::new(); options.len()];
    for answer in &answers {
        let name = names.get(&answer.participant_id).cloned().unwrap_or_default();
        for index in picked(&answer.payload) {
            if let Some(slot) = voters.get_mut(index as usize) {
                slot.push(name.clone());
            }
        }
    }
    let counts: Vec<usize> = voters.iter().map(Vec::len).collect();
    let total: usize = counts.iter().sum();
    Ok(ChoiceResults {
        percents: counts.iter().map(|c| percent(*c, total)).collect(),
        counts,
        correct,
        voters,
    })
}
