//! Pure award rules, one per scored mechanic.

use std::collections::{BTreeMap, BTreeSet};

use quizroom_core::model::{Idea, IdeaVote, ParticipantId};

/// Point value of an ordering step whose scenario entry omits `points`.
pub const DEFAULT_ORDERING_POINTS: i64 = 3;

/// Full points when the selection matches the correct index.
#[must_use]
pub fn single_choice_award(selected: u32, correct: u32, points: i64) -> i64 {
    if selected == correct { points } else { 0 }
}

/// Partial credit for a multi-choice selection.
///
/// The selection must be a non-empty subset of the correct set; any incorrect
/// index forfeits the step. The award is `points * |selected| / |correct|`,
/// floored.
#[must_use]
pub fn multi_choice_award(selected: &BTreeSet<u32>, correct: &BTreeSet<u32>, points: i64) -> i64 {
    if selected.is_empty() || correct.is_empty() || !selected.is_subset(correct) {
        return 0;
    }
    let chosen = i64::try_from(selected.len()).unwrap_or(i64::MAX);
    let total = i64::try_from(correct.len()).unwrap_or(i64::MAX);
    (points.saturating_mul(chosen)).div_euclid(total)
}

/// True when `permutation` is exactly `0..option_count` and non-empty.
#[must_use]
pub fn is_canonical_order(permutation: &[u32], option_count: usize) -> bool {
    option_count > 0
        && permutation.len() == option_count
        && permutation
            .iter()
            .zip(0u32..)
            .all(|(chosen, expected)| *chosen == expected)
}

/// All-or-nothing: the permutation must be exactly `0..option_count`.
#[must_use]
pub fn ordering_award(permutation: &[u32], option_count: usize, points: i64) -> i64 {
    if is_canonical_order(permutation, option_count) {
        points
    } else {
        0
    }
}

/// One point per distinct voter to the author of each voted idea.
#[must_use]
pub fn vote_awards(ideas: &[Idea], votes: &[IdeaVote]) -> BTreeMap<ParticipantId, i64> {
    let authors: BTreeMap<_, _> = ideas
        .iter()
        .map(|idea| (idea.id, idea.participant_id.as_str()))
        .collect();
    let distinct: BTreeSet<_> = votes
        .iter()
        .filter_map(|vote| {
            let author = authors.get(&vote.idea_id)?;
            (*author != vote.voter_id).then_some((vote.idea_id, vote.voter_id.as_str()))
        })
        .collect();

    let mut awards = BTreeMap::new();
    for (idea_id, _) in distinct {
        if let Some(author) = authors.get(&idea_id) {
            *awards.entry((*author).to_owned()).or_insert(0) += 1;
        }
    }
    awards
}
