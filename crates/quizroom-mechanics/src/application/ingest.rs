//! Shared scenario ingestion helpers.

use std::collections::BTreeSet;

use quizroom_core::model::{Mechanic, StepDraft};
use quizroom_core::rng::{DeterministicRng, SeededRng, permutation};

use crate::domain::scenario_item::ScenarioItem;

/// Draft with the fields every mechanic reads: title, body and timer.
#[must_use]
pub fn base_draft(
    item: &ScenarioItem,
    position: i32,
    mechanic: Mechanic,
    default_title: &str,
) -> StepDraft {
    let mut draft = StepDraft::new(position, mechanic, item.title_or(default_title));
    draft.body = item.body();
    draft.timer_ms = item.timer_ms();
    draft
}

/// Presentation order of `len` options for the step at `position`.
///
/// `order[i]` is the canonical index shown in slot `i`. The order is stable
/// per position and differs between positions.
#[must_use]
pub fn presentation_order(len: usize, position: i32) -> Vec<usize> {
    let mut rng = SeededRng::for_position(position);
    permutation(len, &mut rng)
}

/// Shuffles choice options for the step at `position` and remaps the correct
/// indices to the new slots.
#[must_use]
pub fn shuffle_choices(
    options: Vec<String>,
    correct: &BTreeSet<u32>,
    position: i32,
) -> (Vec<String>, BTreeSet<u32>) {
    shuffle_choices_with(options, correct, &mut SeededRng::for_position(position))
}

/// Like [`shuffle_choices`], drawing the order from `rng`.
#[must_use]
pub fn shuffle_choices_with(
    options: Vec<String>,
    correct: &BTreeSet<u32>,
    rng: &mut dyn DeterministicRng,
) -> (Vec<String>, BTreeSet<u32>) {
    let order = permutation(options.len(), rng);
    let mut slots: Vec<Option<String>> = options.into_iter().map(Some).collect();
    let mut shuffled = Vec::with_capacity(slots.len());
    let mut remapped = BTreeSet::new();
    for (slot, original) in order.into_iter().enumerate() {
        if let Some(text) = slots.get_mut(original).and_then(Option::take) {
            shuffled.push(text);
        }
        let original = u32::try_from(original).unwrap_or(u32::MAX);
        if correct.contains(&original) {
            remapped.insert(u32::try_from(slot).unwrap_or(u32::MAX));
        }
    }
    (shuffled, remapped)
}

#[cfg(test)]
mod tests {
    use quizroom_test_support::SequenceRng;

    use super::*;

    fn letters() -> Vec<String> {
        ["a", "b", "c", "d"].into_iter().map(String::from).collect()
    }

    #[test]
    fn test_shuffle_choices_remaps_correct_indices_to_their_slots() {
        // Arrange: always swapping with slot 0 rotates the list left by one
        let mut rng = SequenceRng::new(vec![0, 0, 0]);

        // Act
        let (shuffled, remapped) = shuffle_choices_with(letters(), &BTreeSet::from([1, 3]), &mut rng);

        // Assert
        assert_eq!(shuffled, vec!["b", "c", "d", "a"]);
        assert_eq!(remapped, BTreeSet::from([0, 2]));
    }

    #[test]
    fn test_shuffle_choices_follows_the_drawn_swaps() {
        // Arrange: swaps slot 3 with 1, keeps slot 2, then swaps slot 1 with 0
        let mut rng = SequenceRng::new(vec![1, 2, 0]);

        // Act
        let (shuffled, remapped) = shuffle_choices_with(letters(), &BTreeSet::from([0]), &mut rng);

        // Assert
        assert_eq!(shuffled, vec!["d", "a", "c", "b"]);
        assert_eq!(remapped, BTreeSet::from([1]));
    }

    #[test]
    fn test_shuffle_choices_keeps_correct_answer_attached_to_its_text() {
        // Arrange
        let options: Vec<String> = ["red", "green", "blue", "cyan", "pink"]
            .into_iter()
            .map(String::from)
            .collect();
        let correct = BTreeSet::from([2]);

        // Act
        let (shuffled, remapped) = shuffle_choices(options, &correct, 4);

        // Assert
        assert_eq!(shuffled.len(), 5);
        assert_eq!(remapped.len(), 1);
        let slot = *remapped.iter().next().unwrap() as usize;
        assert_eq!(shuffled[slot], "blue");
    }

    #[test]
    fn test_presentation_order_is_stable_per_position() {
        assert_eq!(presentation_order(6, 3), presentation_order(6, 3));
        let mut sorted = presentation_order(6, 9);
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3, 4, 5]);
    }
}
