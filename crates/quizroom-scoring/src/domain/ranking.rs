//! Leaderboard ordering.

use std::cmp::Ordering;

use quizroom_core::model::Participant;

/// Orders participants by score descending, then cumulative answer latency
/// ascending, then join time ascending.
#[must_use]
pub fn compare_standing(a: &Participant, b: &Participant) -> Ordering {
    b.total_score
        .cmp(&a.total_score)
        .then(a.total_answer_ms.cmp(&b.total_answer_ms))
        .then(a.joined_at.cmp(&b.joined_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sorts participants into leaderboard order.
#[must_use]
pub fn rank(mut participants: Vec<Participant>) -> Vec<Participant> {
    participants.sort_by(compare_standing);
    participants
}
