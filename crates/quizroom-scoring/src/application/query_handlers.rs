//! Query handlers for the scoring context.

use quizroom_core::error::DomainError;
use quizroom_core::model::{Participant, ParticipantId};
use quizroom_core::repository::QuizRepository;
use serde::Serialize;

use crate::domain::ranking::rank;

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandingView {
    /// One-based place.
    pub place: usize,
    pub participant_id: ParticipantId,
    pub name: String,
    pub score: i64,
    /// Cumulative answer latency in milliseconds.
    pub total_answer_ms: i64,
    /// Mean open-answer latency in seconds.
    pub open_average_secs: Option<f64>,
    /// Mean choice-answer latency in seconds.
    pub quiz_average_secs: Option<f64>,
}

impl StandingView {
    fn from_participant(place: usize, participant: Participant) -> Self {
        Self {
            place,
            open_average_secs: participant.open_average_secs(),
            quiz_average_secs: participant.quiz_average_secs(),
            participant_id: participant.id,
            name: participant.name,
            score: participant.total_score,
            total_answer_ms: participant.total_answer_ms,
        }
    }
}

/// Returns every participant in leaderboard order.
///
/// # Errors
///
/// Returns any repository error.
pub async fn leaderboard(repo: &dyn QuizRepository) -> Result<Vec<StandingView>, DomainError> {
    let ranked = rank(repo.participants().await?);
    Ok(ranked
        .into_iter()
        .enumerate()
        .map(|(i, p)| StandingView::from_participant(i + 1, p))
        .collect())
}

/// Returns the standing of one participant, if registered.
///
/// # Errors
///
/// Returns any repository error.
pub async fn standing_of(
    repo: &dyn QuizRepository,
    participant_id: &str,
) -> Result<Option<StandingView>, DomainError> {
    Ok(leaderboard(repo)
        .await?
        .into_iter()
        .find(|s| s.participant_id == participant_id))
}
