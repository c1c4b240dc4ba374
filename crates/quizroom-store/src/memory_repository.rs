//! In-memory implementation of the `QuizRepository` trait.
//!
//! All tables live behind one `RwLock`, so every repository call is atomic
//! with respect to the others. Uniqueness invariants are enforced by the
//! map keys.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use quizroom_core::error::DomainError;
use quizroom_core::model::{
    AnswerRecord, GlobalState, Idea, IdeaId, IdeaVote, LatencyCharge, Participant, ParticipantId,
    Step, StepDraft, StepId, StepOption,
};
use quizroom_core::repository::QuizRepository;

type AnswerKey = (StepId, ParticipantId);
type VoteKey = (StepId, IdeaId, ParticipantId);

#[derive(Debug, Default)]
struct Tables {
    next_step_id: StepId,
    next_idea_id: IdeaId,
    steps: BTreeMap<StepId, Step>,
    positions: BTreeMap<i32, StepId>,
    options: HashMap<StepId, Vec<StepOption>>,
    global: Option<GlobalState>,
    participants: HashMap<ParticipantId, Participant>,
    answers: BTreeMap<AnswerKey, AnswerRecord>,
    ideas: BTreeMap<IdeaId, Idea>,
    votes: BTreeMap<VoteKey, IdeaVote>,
    awards: HashMap<StepId, BTreeMap<ParticipantId, i64>>,
}

impl Tables {
    fn step_by_position(&self, position: Option<&StepId>) -> Option<Step> {
        position.and_then(|id| self.steps.get(id)).cloned()
    }
}

/// Scenario store kept entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuizRepository for MemoryRepository {
    async fn insert_step(&self, draft: StepDraft) -> Result<Step, DomainError> {
        let mut tables = self.tables.write().await;
        if tables.positions.contains_key(&draft.position) {
            return Err(DomainError::Conflict(format!(
                "a step already exists at position {}",
                draft.position
            )));
        }

        tables.next_step_id += 1;
        let id = tables.next_step_id;
        let step = Step {
            id,
            position: draft.position,
            mechanic: draft.mechanic,
            title: draft.title,
            body: draft.body,
            correct_index: draft.correct_index,
            correct_indices: draft.correct_indices,
            points: draft.points,
            timer_ms: draft.timer_ms,
        };
        let options = draft
            .options
            .into_iter()
            .zip(0u32..)
            .map(|(text, index)| StepOption {
                step_id: id,
                index,
                text,
            })
            .collect();

        tables.positions.insert(step.position, id);
        tables.steps.insert(id, step.clone());
        tables.options.insert(id, options);
        debug!(step_id = id, position = step.position, mechanic = %step.mechanic, "Step stored");
        Ok(step)
    }

    async fn step(&self, id: StepId) -> Result<Option<Step>, DomainError> {
        Ok(self.tables.read().await.steps.get(&id).cloned())
    }

    async fn step_at(&self, position: i32) -> Result<Option<Step>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.step_by_position(tables.positions.get(&position)))
    }

    async fn step_after(&self, position: i32) -> Result<Option<Step>, DomainError> {
        let tables = self.tables.read().await;
        let next = tables
            .positions
            .range(position.saturating_add(1)..)
            .next()
            .map(|(_, id)| id);
        Ok(tables.step_by_position(next))
    }

    async fn step_before(&self, position: i32) -> Result<Option<Step>, DomainError> {
        let tables = self.tables.read().await;
        let previous = tables
            .positions
            .range(..position)
            .next_back()
            .map(|(_, id)| id);
        Ok(tables.step_by_position(previous))
    }

    async fn steps(&self) -> Result<Vec<Step>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .positions
            .values()
            .filter_map(|id| tables.steps.get(id).cloned())
            .collect())
    }

    async fn options(&self, step_id: StepId) -> Result<Vec<StepOption>, DomainError> {
        Ok(self
            .tables
            .read()
            .await
            .options
            .get(&step_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn global_state(&self) -> Result<Option<GlobalState>, DomainError> {
        Ok(self.tables.read().await.global)
    }

    async fn save_global_state(&self, state: GlobalState) -> Result<(), DomainError> {
        self.tables.write().await.global = Some(state);
        Ok(())
    }

    async fn upsert_participant(
        &self,
        id: &str,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<Participant, DomainError> {
        let mut tables = self.tables.write().await;
        let participant = tables
            .participants
            .entry(id.to_owned())
            .and_modify(|p| name.clone_into(&mut p.name))
            .or_insert_with(|| Participant::new(id, name, now));
        Ok(participant.clone())
    }

    async fn participant(&self, id: &str) -> Result<Option<Participant>, DomainError> {
        Ok(self.tables.read().await.participants.get(id).cloned())
    }

    async fn participants(&self) -> Result<Vec<Participant>, DomainError> {
        let mut all: Vec<Participant> = self
            .tables
            .read()
            .await
            .participants
            .values()
            .cloned()
            .collect();
        all.sort_by(|a, b| a.joined_at.cmp(&b.joined_at).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn answer(
        &self,
        step_id: StepId,
        participant_id: &str,
    ) -> Result<Option<AnswerRecord>, DomainError> {
        Ok(self
            .tables
            .read()
            .await
            .answers
            .get(&(step_id, participant_id.to_owned()))
            .cloned())
    }

    async fn put_answer(
        &self,
        record: AnswerRecord,
        charge: LatencyCharge,
    ) -> Result<Option<AnswerRecord>, DomainError> {
        let mut guard = self.tables.write().await;
        let tables = &mut *guard;
        if !tables.steps.contains_key(&record.step_id) {
            return Err(DomainError::NotFound(format!("step {}", record.step_id)));
        }
        let participant = tables
            .participants
            .get_mut(&record.participant_id)
            .ok_or_else(|| DomainError::NotFound(format!("participant {}", record.participant_id)))?;

        let current = record.counted_at();
        let previous = tables
            .answers
            .insert((record.step_id, record.participant_id.clone()), record);
        if let Some(adjustment) =
            charge.between(previous.as_ref().and_then(AnswerRecord::counted_at), current)
        {
            participant.apply_latency(adjustment);
        }
        Ok(previous)
    }

    async fn delete_answer(
        &self,
        step_id: StepId,
        participant_id: &str,
        charge: LatencyCharge,
    ) -> Result<Option<AnswerRecord>, DomainError> {
        let mut guard = self.tables.write().await;
        let tables = &mut *guard;
        let removed = tables.answers.remove(&(step_id, participant_id.to_owned()));
        let withdrawn = removed
            .as_ref()
            .and_then(|r| charge.between(r.counted_at(), None));
        if let (Some(adjustment), Some(participant)) =
            (withdrawn, tables.participants.get_mut(participant_id))
        {
            participant.apply_latency(adjustment);
        }
        Ok(removed)
    }

    async fn answers(&self, step_id: StepId) -> Result<Vec<AnswerRecord>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .answers
            .values()
            .filter(|a| a.step_id == step_id)
            .cloned()
            .collect())
    }

    async fn count_answers(&self, step_id: StepId) -> Result<usize, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.answers.keys().filter(|(s, _)| *s == step_id).count())
    }

    async fn last_answer_at(&self, step_id: StepId) -> Result<Option<DateTime<Utc>>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .answers
            .values()
            .filter(|a| a.step_id == step_id)
            .map(|a| a.answered_at)
            .max())
    }

    async fn idea_by_author(
        &self,
        step_id: StepId,
        participant_id: &str,
    ) -> Result<Option<Idea>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .ideas
            .values()
            .find(|i| i.step_id == step_id && i.participant_id == participant_id)
            .cloned())
    }

    async fn idea(&self, id: IdeaId) -> Result<Option<Idea>, DomainError> {
        Ok(self.tables.read().await.ideas.get(&id).cloned())
    }

    async fn put_idea(
        &self,
        step_id: StepId,
        participant_id: &str,
        text: &str,
        now: DateTime<Utc>,
        charge: LatencyCharge,
    ) -> Result<Idea, DomainError> {
        let mut guard = self.tables.write().await;
        let tables = &mut *guard;
        if !tables.steps.contains_key(&step_id) {
            return Err(DomainError::NotFound(format!("step {step_id}")));
        }
        let participant = tables
            .participants
            .get_mut(participant_id)
            .ok_or_else(|| DomainError::NotFound(format!("participant {participant_id}")))?;

        let existing = tables
            .ideas
            .values_mut()
            .find(|i| i.step_id == step_id && i.participant_id == participant_id);
        let (idea, previous) = if let Some(existing) = existing {
            let previous = existing.submitted_at;
            text.clone_into(&mut existing.text);
            existing.submitted_at = now;
            (existing.clone(), Some(previous))
        } else {
            tables.next_idea_id += 1;
            let idea = Idea {
                id: tables.next_idea_id,
                step_id,
                participant_id: participant_id.to_owned(),
                text: text.to_owned(),
                submitted_at: now,
            };
            tables.ideas.insert(idea.id, idea.clone());
            (idea, None)
        };

        if let Some(adjustment) = charge.between(previous, Some(now)) {
            participant.apply_latency(adjustment);
        }
        Ok(idea)
    }

    async fn ideas(&self, step_id: StepId) -> Result<Vec<Idea>, DomainError> {
        let tables = self.tables.read().await;
        let mut ideas: Vec<Idea> = tables
            .ideas
            .values()
            .filter(|i| i.step_id == step_id)
            .cloned()
            .collect();
        ideas.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at).then(a.id.cmp(&b.id)));
        Ok(ideas)
    }

    async fn count_ideas(&self, step_id: StepId) -> Result<usize, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.ideas.values().filter(|i| i.step_id == step_id).count())
    }

    async fn insert_vote(
        &self,
        step_id: StepId,
        idea_id: IdeaId,
        voter_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let mut tables = self.tables.write().await;
        let idea = tables
            .ideas
            .get(&idea_id)
            .filter(|i| i.step_id == step_id)
            .ok_or_else(|| DomainError::NotFound(format!("idea {idea_id} in step {step_id}")))?;
        if idea.participant_id == voter_id {
            return Err(DomainError::Validation(
                "participants cannot vote for their own idea".into(),
            ));
        }

        let key = (step_id, idea_id, voter_id.to_owned());
        if tables.votes.contains_key(&key) {
            return Ok(false);
        }
        tables.votes.insert(
            key,
            IdeaVote {
                step_id,
                idea_id,
                voter_id: voter_id.to_owned(),
                created_at: now,
            },
        );
        Ok(true)
    }

    async fn delete_vote(
        &self,
        step_id: StepId,
        idea_id: IdeaId,
        voter_id: &str,
    ) -> Result<bool, DomainError> {
        Ok(self
            .tables
            .write()
            .await
            .votes
            .remove(&(step_id, idea_id, voter_id.to_owned()))
            .is_some())
    }

    async fn votes(&self, step_id: StepId) -> Result<Vec<IdeaVote>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .votes
            .values()
            .filter(|v| v.step_id == step_id)
            .cloned()
            .collect())
    }

    async fn replace_step_awards(
        &self,
        step_id: StepId,
        awards: &BTreeMap<ParticipantId, i64>,
    ) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        let previous = tables.awards.remove(&step_id).unwrap_or_default();

        for (participant_id, participant) in &mut tables.participants {
            let old = previous.get(participant_id).copied().unwrap_or(0);
            let new = awards.get(participant_id).copied().unwrap_or(0);
            participant.total_score += new - old;
        }

        let kept: BTreeMap<ParticipantId, i64> = awards
            .iter()
            .filter(|(id, points)| **points != 0 && tables.participants.contains_key(*id))
            .map(|(id, points)| (id.clone(), *points))
            .collect();
        if !kept.is_empty() {
            tables.awards.insert(step_id, kept);
        }
        Ok(())
    }

    async fn step_awards(
        &self,
        step_id: StepId,
    ) -> Result<BTreeMap<ParticipantId, i64>, DomainError> {
        Ok(self
            .tables
            .read()
            .await
            .awards
            .get(&step_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn reset(&self) -> Result<(), DomainError> {
        *self.tables.write().await = Tables::default();
        debug!("All records deleted");
        Ok(())
    }
}
