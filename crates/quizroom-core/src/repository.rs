//! Repository abstraction for quiz records.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::model::{
    AnswerRecord, GlobalState, Idea, IdeaId, IdeaVote, LatencyCharge, Participant, ParticipantId,
    Step, StepDraft, StepId, StepOption,
};

/// Storage seam for steps, answers, votes, participants and the global state.
///
/// Implementations must honour the uniqueness invariants: one step per
/// position, one answer and one idea per (step, participant), one vote per
/// (step, idea, voter) and no self-votes. Each method is atomic on its own.
#[async_trait]
pub trait QuizRepository: Send + Sync {
    // --- steps -----------------------------------------------------------

    /// Persists a draft and its options. Fails with `Conflict` if the
    /// position is taken.
    async fn insert_step(&self, draft: StepDraft) -> Result<Step, DomainError>;

    async fn step(&self, id: StepId) -> Result<Option<Step>, DomainError>;

    async fn step_at(&self, position: i32) -> Result<Option<Step>, DomainError>;

    /// The step with the smallest position greater than `position`.
    async fn step_after(&self, position: i32) -> Result<Option<Step>, DomainError>;

    /// The step with the greatest position less than `position`.
    async fn step_before(&self, position: i32) -> Result<Option<Step>, DomainError>;

    /// All steps ordered by position.
    async fn steps(&self) -> Result<Vec<Step>, DomainError>;

    /// Options of a step ordered by index.
    async fn options(&self, step_id: StepId) -> Result<Vec<StepOption>, DomainError>;

    // --- global state ----------------------------------------------------

    async fn global_state(&self) -> Result<Option<GlobalState>, DomainError>;

    async fn save_global_state(&self, state: GlobalState) -> Result<(), DomainError>;

    // --- participants ----------------------------------------------------

    /// Registers a participant, or renames an existing one keeping its
    /// score and join time.
    async fn upsert_participant(
        &self,
        id: &str,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<Participant, DomainError>;

    async fn participant(&self, id: &str) -> Result<Option<Participant>, DomainError>;

    /// All participants ordered by join time.
    async fn participants(&self) -> Result<Vec<Participant>, DomainError>;

    // --- answers ---------------------------------------------------------

    async fn answer(
        &self,
        step_id: StepId,
        participant_id: &str,
    ) -> Result<Option<AnswerRecord>, DomainError>;

    /// Inserts or overwrites the record for (step, participant) and moves the
    /// author's latency counters from the replaced record to the new one in
    /// the same critical section. Returns the replaced record.
    ///
    /// Fails with `NotFound` before writing anything if the step or the
    /// participant is unknown.
    async fn put_answer(
        &self,
        record: AnswerRecord,
        charge: LatencyCharge,
    ) -> Result<Option<AnswerRecord>, DomainError>;

    /// Removes the record and withdraws its latency contribution.
    /// Returns the removed record.
    async fn delete_answer(
        &self,
        step_id: StepId,
        participant_id: &str,
        charge: LatencyCharge,
    ) -> Result<Option<AnswerRecord>, DomainError>;

    async fn answers(&self, step_id: StepId) -> Result<Vec<AnswerRecord>, DomainError>;

    async fn count_answers(&self, step_id: StepId) -> Result<usize, DomainError>;

    async fn last_answer_at(&self, step_id: StepId) -> Result<Option<DateTime<Utc>>, DomainError>;

    // --- ideas and votes -------------------------------------------------

    async fn idea_by_author(
        &self,
        step_id: StepId,
        participant_id: &str,
    ) -> Result<Option<Idea>, DomainError>;

    async fn idea(&self, id: IdeaId) -> Result<Option<Idea>, DomainError>;

    /// Inserts or overwrites the author's idea for a step. The idea keeps its
    /// identifier across edits; latency is charged like `put_answer`.
    async fn put_idea(
        &self,
        step_id: StepId,
        participant_id: &str,
        text: &str,
        now: DateTime<Utc>,
        charge: LatencyCharge,
    ) -> Result<Idea, DomainError>;

    /// Ideas of a step ordered by submission time.
    async fn ideas(&self, step_id: StepId) -> Result<Vec<Idea>, DomainError>;

    async fn count_ideas(&self, step_id: StepId) -> Result<usize, DomainError>;

    /// Records a vote. Returns `false` if it already existed; fails with
    /// `Validation` on a self-vote.
    async fn insert_vote(
        &self,
        step_id: StepId,
        idea_id: IdeaId,
        voter_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Returns `true` if a vote was removed.
    async fn delete_vote(
        &self,
        step_id: StepId,
        idea_id: IdeaId,
        voter_id: &str,
    ) -> Result<bool, DomainError>;

    async fn votes(&self, step_id: StepId) -> Result<Vec<IdeaVote>, DomainError>;

    // --- scores ----------------------------------------------------------

    /// Replaces the award set of a step and moves every affected
    /// participant's total by the difference to their previous award.
    async fn replace_step_awards(
        &self,
        step_id: StepId,
        awards: &BTreeMap<ParticipantId, i64>,
    ) -> Result<(), DomainError>;

    async fn step_awards(&self, step_id: StepId)
    -> Result<BTreeMap<ParticipantId, i64>, DomainError>;

    // --- maintenance -----------------------------------------------------

    /// Deletes every record, including steps and the global state.
    async fn reset(&self) -> Result<(), DomainError>;
}
