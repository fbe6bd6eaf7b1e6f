//! Completion and grade computation over a definition and one learner's state.

use std::collections::BTreeSet;

use crate::domain::ProblemDefinition;
use crate::learner::LearnerState;

/// Required, placed and correct item ids at one point in time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItemStats {
    pub required: BTreeSet<i64>,
    pub placed: BTreeSet<i64>,
    pub correct: BTreeSet<i64>,
}

impl ItemStats {
    /// Required items that were never placed.
    pub fn missing(&self) -> BTreeSet<i64> {
        self.required.difference(&self.placed).copied().collect()
    }

    /// Placed items that are not correct (decoys included).
    pub fn misplaced(&self) -> BTreeSet<i64> {
        self.placed.difference(&self.correct).copied().collect()
    }
}

pub struct ScoringEngine<'a> {
    definition: &'a ProblemDefinition,
    state: &'a LearnerState,
}

impl<'a> ScoringEngine<'a> {
    pub fn new(definition: &'a ProblemDefinition, state: &'a LearnerState) -> Self {
        Self { definition, state }
    }

    /// Non-decoy items.
    pub fn required_item_ids(&self) -> BTreeSet<i64> {
        self.definition
            .items
            .iter()
            .filter(|it| !it.is_decoy())
            .map(|it| it.id)
            .collect()
    }

    /// Defined items that have a stored placement. Stale records for items
    /// no longer in the definition are ignored.
    pub fn placed_item_ids(&self) -> BTreeSet<i64> {
        self.definition
            .items
            .iter()
            .filter(|it| self.state.placements.contains_key(&it.state_key()))
            .map(|it| it.id)
            .collect()
    }

    pub fn correct_item_ids(&self) -> BTreeSet<i64> {
        self.definition
            .items
            .iter()
            .filter(|it| {
                self.state
                    .placements
                    .get(&it.state_key())
                    .map(|p| p.correct)
                    .unwrap_or(false)
            })
            .map(|it| it.id)
            .collect()
    }

    pub fn stats(&self) -> ItemStats {
        ItemStats {
            required: self.required_item_ids(),
            placed: self.placed_item_ids(),
            correct: self.correct_item_ids(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.correct_item_ids().len() == self.required_item_ids().len()
    }

    /// Fraction of required items placed correctly, scaled by `weight`.
    /// A problem with no required items grades as 0.
    pub fn grade(&self, weight: f64) -> f64 {
        let required = self.required_item_ids().len();
        if required == 0 {
            return 0.0;
        }
        self.correct_item_ids().len() as f64 / required as f64 * weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learner::Placement;
    use crate::normalize::normalize_definition;
    use proptest::prelude::*;
    use serde_json::json;

    fn definition() -> ProblemDefinition {
        normalize_definition(&json!({
            "zones": [{"uid": "z1", "title": "Zone 1"}, {"uid": "z2", "title": "Zone 2"}],
            "items": [
                {"id": 0, "zones": ["z1"]},
                {"id": 1, "zones": ["z2"]},
                {"id": 2, "zones": []}
            ],
            "feedback": {"start": "start", "finish": "finish"}
        }))
        .unwrap()
    }

    fn place(state: &mut LearnerState, id: i64, zone: &str, correct: bool) {
        state.placements.insert(id.to_string(), Placement::new(zone, correct, "0%", "0%"));
    }

    #[test]
    fn test_decoys_are_not_required() {
        let def = definition();
        let state = LearnerState::default();
        let engine = ScoringEngine::new(&def, &state);
        assert_eq!(engine.required_item_ids(), BTreeSet::from([0, 1]));
        assert_eq!(engine.grade(1.0), 0.0);
        assert!(!engine.is_finished());
    }

    #[test]
    fn test_partial_and_full_grade() {
        let def = definition();
        let mut state = LearnerState::default();
        place(&mut state, 0, "z1", true);
        assert_eq!(ScoringEngine::new(&def, &state).grade(2.0), 1.0);
        place(&mut state, 1, "z2", true);
        let engine = ScoringEngine::new(&def, &state);
        assert_eq!(engine.grade(2.0), 2.0);
        assert!(engine.is_finished());
    }

    #[test]
    fn test_misplaced_and_missing() {
        let def = definition();
        let mut state = LearnerState::default();
        place(&mut state, 0, "z2", false);
        place(&mut state, 2, "z1", false);
        let stats = ScoringEngine::new(&def, &state).stats();
        assert_eq!(stats.misplaced(), BTreeSet::from([0, 2]));
        assert_eq!(stats.missing(), BTreeSet::from([1]));
        assert!(stats.correct.is_empty());
    }

    #[test]
    fn test_stale_placements_are_ignored() {
        let def = definition();
        let mut state = LearnerState::default();
        place(&mut state, 42, "z1", true);
        assert!(ScoringEngine::new(&def, &state).placed_item_ids().is_empty());
    }

    #[test]
    fn test_no_required_items_grades_zero() {
        let def = normalize_definition(&json!({"zones": [], "items": [{"id": 5}]})).unwrap();
        let state = LearnerState::default();
        let engine = ScoringEngine::new(&def, &state);
        assert_eq!(engine.grade(10.0), 0.0);
        assert!(engine.is_finished());
    }

    proptest! {
        #[test]
        fn grade_never_decreases_while_adding_correct_placements(order in Just(vec![0i64, 1]).prop_shuffle(), weight in 0.0f64..100.0) {
            let def = definition();
            let mut state = LearnerState::default();
            let mut last = ScoringEngine::new(&def, &state).grade(weight);
            for id in order {
                let zone = if id == 0 { "z1" } else { "z2" };
                place(&mut state, id, zone, true);
                let now = ScoringEngine::new(&def, &state).grade(weight);
                prop_assert!(now >= last);
                last = now;
            }
        }
    }
}
