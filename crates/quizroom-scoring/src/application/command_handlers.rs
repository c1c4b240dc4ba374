//! Command handlers for the scoring context.
//!
//! Each handler loads the answer records of one step, computes the award set
//! with the pure rules in `domain::awards` and replaces the step's awards in
//! the repository. Misconfigured steps (no correct answer, no points) are a
//! silent no-op.

use std::collections::BTreeMap;

use quizroom_core::error::DomainError;
use quizroom_core::model::{AnswerPayload, ParticipantId, Step};
use quizroom_core::repository::QuizRepository;
use tracing::{debug, info};

use crate::domain::awards::{
    DEFAULT_ORDERING_POINTS, multi_choice_award, ordering_award, single_choice_award, vote_awards,
};
/// Awards the step's point value to every participant whose choice matches
/// the correct index.
///
/// # Errors
///
/// Returns any repository error.
pub async fn score_single_choice(
    step: &Step,
    repo: &dyn QuizRepository,
) -> Result<Option<BTreeMap<ParticipantId, i64>>, DomainError> {
    let (Some(correct), Some(points)) = (step.correct_index, step.points) else {
        debug!(step_id = step.id, "Single-choice step has nothing to score");
        return Ok(None);
    };

    let awards = collect_awards(repo, step, |payload| match payload {
        AnswerPayload::Choice(selected) => single_choice_award(*selected, correct, points),
        _ => 0,
    })
    .await?;
    apply(step, repo, awards).await
}

/// Awards partial credit for subsets of the correct option set.
///
/// # Errors
///
/// Returns any repository error.
pub async fn score_multi_choice(
    step: &Step,
    repo: &dyn QuizRepository,
) -> Result<Option<BTreeMap<ParticipantId, i64>>, DomainError> {
    let (Some(correct), Some(points)) = (step.correct_indices.as_ref(), step.points) else {
        debug!(step_id = step.id, "Multi-choice step has nothing to score");
        return Ok(None);
    };
    if correct.is_empty() {
        return Ok(None);
    }

    let awards = collect_awards(repo, step, |payload| match payload {
        AnswerPayload::Multi(selected) => multi_choice_award(selected, correct, points),
        _ => 0,
    })
    .await?;
    apply(step, repo, awards).await
}

/// Awards full points to complete permutations in canonical order.
///
/// # Errors
///
/// Returns any repository error.
pub async fn score_ordering(
    step: &Step,
    repo: &dyn QuizRepository,
) -> Result<Option<BTreeMap<ParticipantId, i64>>, DomainError> {
    let option_count = repo.options(step.id).await?.len();
    if option_count == 0 {
        debug!(step_id = step.id, "Ordering step has no options");
        return Ok(None);
    }
    let points = step.points.unwrap_or(DEFAULT_ORDERING_POINTS);

    let awards = collect_awards(repo, step, |payload| match payload {
        AnswerPayload::Ordering(permutation) => ordering_award(permutation, option_count, points),
        _ => 0,
    })
    .await?;
    apply(step, repo, awards).await
}

/// Awards one point per distinct voter to each idea's author.
///
/// # Errors
///
/// Returns any repository error.
pub async fn score_votes(
    step: &Step,
    repo: &dyn QuizRepository,
) -> Result<Option<BTreeMap<ParticipantId, i64>>, DomainError> {
    let ideas = repo.ideas(step.id).await?;
    let votes = repo.votes(step.id).await?;
    let awards = vote_awards(&ideas, &votes);
    apply(step, repo, awards).await
}

async fn collect_awards(
    repo: &dyn QuizRepository,
    step: &Step,
    rule: impl Fn(&AnswerPayload) -> i64,
) -> Result<BTreeMap<ParticipantId, i64>, DomainError> {
    Ok(repo
        .answers(step.id)
        .await?
        .into_iter()
        .filter_map(|answer| {
            let points = rule(&answer.payload);
            (points != 0).then_some((answer.participant_id, points))
        })
        .collect())
}

async fn apply(
    step: &Step,
    repo: &dyn QuizRepository,
    awards: BTreeMap<ParticipantId, i64>,
) -> Result<Option<BTreeMap<ParticipantId, i64>>, DomainError> {
    repo.replace_step_awards(step.id, &awards).await?;
    info!(
        step_id = step.id,
        mechanic = %step.mechanic,
        awarded = awards.len(),
        "Step scored"
    );
    Ok(Some(awards))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::{DateTime, TimeZone, Utc};
    use quizroom_core::model::{AnswerRecord, LatencyBucket, LatencyCharge, Mechanic, StepDraft};
    use quizroom_store::MemoryRepository;
    use quizroom_test_support::FailingRepository;

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    fn charge(bucket: LatencyBucket) -> LatencyCharge {
        LatencyCharge {
            bucket,
            step_started_at: t0(),
        }
    }

    async fn answer(repo: &MemoryRepository, step: &Step, who: &str, payload: AnswerPayload) {
        repo.upsert_participant(who, who, t0()).await.unwrap();
        repo.put_answer(
            AnswerRecord {
                step_id: step.id,
                participant_id: who.to_owned(),
                payload,
                answered_at: t0(),
                counted: true,
            },
            charge(LatencyBucket::Quiz),
        )
        .await
        .unwrap();
    }

    async fn score_of(repo: &MemoryRepository, who: &str) -> i64 {
        repo.participant(who).await.unwrap().unwrap().total_score
    }

    async fn single_choice_step(repo: &MemoryRepository) -> Step {
        let mut draft = StepDraft::new(1, Mechanic::SingleChoice, "Capital?");
        draft.options = vec!["a".into(), "b".into(), "c".into()];
        draft.correct_index = Some(1);
        draft.points = Some(10);
        repo.insert_step(draft).await.unwrap()
    }

    #[tokio::test]
    async fn test_single_choice_scored_twice_awards_once() {
        // Arrange
        let repo = MemoryRepository::new();
        let step = single_choice_step(&repo).await;
        answer(&repo, &step, "ann", AnswerPayload::Choice(1)).await;
        answer(&repo, &step, "bo", AnswerPayload::Choice(2)).await;

        // Act
        score_single_choice(&step, &repo).await.unwrap();
        score_single_choice(&step, &repo).await.unwrap();

        // Assert
        assert_eq!(score_of(&repo, "ann").await, 10);
        assert_eq!(score_of(&repo, "bo").await, 0);
    }

    #[tokio::test]
    async fn test_rescoring_after_a_changed_answer_moves_points() {
        // Arrange
        let repo = MemoryRepository::new();
        let step = single_choice_step(&repo).await;
        answer(&repo, &step, "ann", AnswerPayload::Choice(1)).await;
        score_single_choice(&step, &repo).await.unwrap();

        // Act
        answer(&repo, &step, "ann", AnswerPayload::Choice(0)).await;
        score_single_choice(&step, &repo).await.unwrap();

        // Assert
        assert_eq!(score_of(&repo, "ann").await, 0);
    }

    #[tokio::test]
    async fn test_single_choice_without_correct_index_is_noop() {
        let repo = MemoryRepository::new();
        let mut draft = StepDraft::new(1, Mechanic::SingleChoice, "Opinion");
        draft.options = vec!["a".into(), "b".into()];
        draft.points = Some(10);
        let step = repo.insert_step(draft).await.unwrap();
        answer(&repo, &step, "ann", AnswerPayload::Choice(0)).await;

        let result = score_single_choice(&step, &repo).await.unwrap();

        assert!(result.is_none());
        assert_eq!(score_of(&repo, "ann").await, 0);
    }

    #[tokio::test]
    async fn test_multi_choice_scores_subsets_and_zeroes_wrong_picks() {
        // Arrange
        let repo = MemoryRepository::new();
        let mut draft = StepDraft::new(1, Mechanic::MultiChoice, "Pick primes");
        draft.options = vec!["2".into(), "4".into(), "5".into()];
        draft.correct_indices = Some(BTreeSet::from([0, 2]));
        draft.points = Some(6);
        let step = repo.insert_step(draft).await.unwrap();
        answer(&repo, &step, "half", AnswerPayload::Multi(BTreeSet::from([0]))).await;
        answer(&repo, &step, "full", AnswerPayload::Multi(BTreeSet::from([0, 2]))).await;
        answer(&repo, &step, "wrong", AnswerPayload::Multi(BTreeSet::from([0, 1]))).await;

        // Act
        score_multi_choice(&step, &repo).await.unwrap();

        // Assert
        assert_eq!(score_of(&repo, "half").await, 3);
        assert_eq!(score_of(&repo, "full").await, 6);
        assert_eq!(score_of(&repo, "wrong").await, 0);
    }

    #[tokio::test]
    async fn test_ordering_defaults_to_three_points() {
        // Arrange
        let repo = MemoryRepository::new();
        let mut draft = StepDraft::new(1, Mechanic::Ordering, "Sort");
        draft.options = vec!["x".into(), "y".into(), "z".into()];
        let step = repo.insert_step(draft).await.unwrap();
        answer(&repo, &step, "right", AnswerPayload::Ordering(vec![0, 1, 2])).await;
        answer(&repo, &step, "swap", AnswerPayload::Ordering(vec![1, 0, 2])).await;
        answer(&repo, &step, "short", AnswerPayload::Ordering(vec![0, 1])).await;

        // Act
        score_ordering(&step, &repo).await.unwrap();

        // Assert
        assert_eq!(score_of(&repo, "right").await, 3);
        assert_eq!(score_of(&repo, "swap").await, 0);
        assert_eq!(score_of(&repo, "short").await, 0);
    }

    #[tokio::test]
    async fn test_votes_award_authors() {
        // Arrange
        let repo = MemoryRepository::new();
        let step = repo
            .insert_step(StepDraft::new(1, Mechanic::OpenAnswer, "Ideas"))
            .await
            .unwrap();
        for who in ["ann", "bo", "cy"] {
            repo.upsert_participant(who, who, t0()).await.unwrap();
        }
        let idea = repo
            .put_idea(step.id, "ann", "picnic", t0(), charge(LatencyBucket::Open))
            .await
            .unwrap();
        repo.insert_vote(step.id, idea.id, "bo", t0()).await.unwrap();
        repo.insert_vote(step.id, idea.id, "cy", t0()).await.unwrap();

        // Act
        score_votes(&step, &repo).await.unwrap();
        score_votes(&step, &repo).await.unwrap();

        // Assert
        assert_eq!(score_of(&repo, "ann").await, 2);
    }

    #[tokio::test]
    async fn test_scoring_propagates_repository_failure() {
        let step = Step {
            id: 1,
            position: 1,
            mechanic: Mechanic::SingleChoice,
            title: "Capital?".into(),
            body: None,
            correct_index: Some(1),
            correct_indices: None,
            points: Some(10),
            timer_ms: None,
        };

        let result = score_single_choice(&step, &FailingRepository).await;

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }
}
