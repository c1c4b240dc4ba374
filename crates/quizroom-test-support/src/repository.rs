//! Test repositories: `QuizRepository` implementations for tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quizroom_core::error::DomainError;
use quizroom_core::model::{
    AnswerRecord, GlobalState, Idea, IdeaId, IdeaVote, LatencyCharge, Participant, ParticipantId,
    Step, StepDraft, StepId, StepOption,
};
use quizroom_core::repository::QuizRepository;

/// A repository that always returns an infrastructure error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingRepository;

fn unavailable<T>() -> Result<T, DomainError> {
    Err(DomainError::Infrastructure("connection refused".into()))
}

#[async_trait]
impl QuizRepository for FailingRepository {
    async fn insert_step(&self, _draft: StepDraft) -> Result<Step, DomainError> {
        unavailable()
    }

    async fn step(&self, _id: StepId) -> Result<Option<Step>, DomainError> {
        unavailable()
    }

    async fn step_at(&self, _position: i32) -> Result<Option<Step>, DomainError> {
        unavailable()
    }

    async fn step_after(&self, _position: i32) -> Result<Option<Step>, DomainError> {
        unavailable()
    }

    async fn step_before(&self, _position: i32) -> Result<Option<Step>, DomainError> {
        unavailable()
    }

    async fn steps(&self) -> Result<Vec<Step>, DomainError> {
        unavailable()
    }

    async fn options(&self, _step_id: StepId) -> Result<Vec<StepOption>, DomainError> {
        unavailable()
    }

    async fn global_state(&self) -> Result<Option<GlobalState>, DomainError> {
        unavailable()
    }

    async fn save_global_state(&self, _state: GlobalState) -> Result<(), DomainError> {
        unavailable()
    }

    async fn upsert_participant(&self, _id: &str, _name: &str, _now: DateTime<Utc>) -> Result<Participant, DomainError> {
        unavailable()
    }

    async fn participant(&self, _id: &str) -> Result<Option<Participant>, DomainError> {
        unavailable()
    }

    async fn participants(&self) -> Result<Vec<Participant>, DomainError> {
        unavailable()
    }

    async fn answer(&self, _step_id: StepId, _participant_id: &str) -> Result<Option<AnswerRecord>, DomainError> {
        unavailable()
    }

    async fn put_answer(&self, _record: AnswerRecord, _charge: LatencyCharge) -> Result<Option<AnswerRecord>, DomainError> {
        unavailable()
    }

    async fn delete_answer(&self, _step_id: StepId, _participant_id: &str, _charge: LatencyCharge) -> Result<Option<AnswerRecord>, DomainError> {
        unavailable()
    }

    async fn answers(&self, _step_id: StepId) -> Result<Vec<AnswerRecord>, DomainError> {
        unavailable()
    }

    async fn count_answers(&self, _step_id: StepId) -> Result<usize, DomainError> {
        unavailable()
    }

    async fn last_answer_at(&self, _step_id: StepId) -> Result<Option<DateTime<Utc>>, DomainError> {
        unavailable()
    }

    async fn idea_by_author(&self, _step_id: StepId, _participant_id: &str) -> Result<Option<Idea>, DomainError> {
        unavailable()
    }

    async fn idea(&self, _id: IdeaId) -> Result<Option<Idea>, DomainError> {
        unavailable()
    }

    async fn put_idea(&self, _step_id: StepId, _participant_id: &str, _text: &str, _now: DateTime<Utc>, _charge: LatencyCharge) -> Result<Idea, DomainError> {
        unavailable()
    }

    async fn ideas(&self, _step_id: StepId) -> Result<Vec<Idea>, DomainError> {
        unavailable()
    }

    async fn count_ideas(&self, _step_id: StepId) -> Result<usize, DomainError> {
        unavailable()
    }

    async fn insert_vote(&self, _step_id: StepId, _idea_id: IdeaId, _voter_id: &str, _now: DateTime<Utc>) -> Result<bool, DomainError> {
        unavailable()
    }

    async fn delete_vote(&self, _step_id: StepId, _idea_id: IdeaId, _voter_id: &str) -> Result<bool, DomainError> {
        unavailable()
    }

    async fn votes(&self, _step_id: StepId) -> Result<Vec<IdeaVote>, DomainError> {
        unavailable()
    }

    async fn replace_step_awards(&self, _step_id: StepId, _awards: &BTreeMap<ParticipantId, i64>) -> Result<(), DomainError> {
        unavailable()
    }

    async fn step_awards(&self, _step_id: StepId) -> Result<BTreeMap<ParticipantId, i64>, DomainError> {
        unavailable()
    }

    async fn reset(&self) -> Result<(), DomainError> {
        unavailable()
    }
}
