//! Attempt controller: applies one learner action to a `LearnerState`.
//!
//! The controller follows one of two protocols chosen by `GradingMode`:
//!   - Standard: every drop is graded immediately; only correct drops are kept.
//!   - Assessment: drops are stored as-is and graded on explicit submission,
//!     after which misplaced items go back to the bank.
//!
//! Every action works on a copy of the state and writes it back only when the
//! whole action succeeded. Event publication never fails an action: a grade
//! that went out must stay recorded as `completed`.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument};

use crate::domain::{GradingConfig, GradingMode, Item, ProblemDefinition, Zone};
use crate::error::DragDropError;
use crate::events::{grade_payload, item_dropped_payload, EventPublisher, PublishError, GRADE_EVENT, ITEM_DROPPED_EVENT};
use crate::feedback::{compose, to_html, AttemptSummary};
use crate::learner::{LearnerState, LearnerView, Placement};
use crate::scoring::ScoringEngine;
use crate::validator::is_correct;

const STANDARD_MODE_ATTEMPT: &str = "do_attempt handler should only be called for assessment mode";

/// One drop of an item onto a zone, as sent by the client.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemDrop {
    pub item_id: i64,
    pub zone: String,
    pub x_percent: String,
    pub y_percent: String,
}

/// Immediate result of a Standard-mode drop.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PlacementFeedback {
    pub correct: bool,
    pub finished: bool,
    /// Problem `finish` text once everything is solved, otherwise null.
    pub overall_feedback: Option<String>,
    /// The item's own correct/incorrect feedback.
    pub feedback: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PlacementOutcome {
    Immediate(PlacementFeedback),
    /// Assessment mode: stored, results are revealed on submission.
    Deferred,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct AttemptOutcome {
    pub num_attempts: u32,
    /// Items that were misplaced at submission time (before returning them to the bank).
    pub misplaced_items: Vec<i64>,
    pub feedback: String,
}

pub struct AttemptController<'a> {
    definition: &'a ProblemDefinition,
    config: GradingConfig,
    publisher: &'a dyn EventPublisher,
}

impl<'a> AttemptController<'a> {
    pub fn new(definition: &'a ProblemDefinition, config: GradingConfig, publisher: &'a dyn EventPublisher) -> Self {
        Self { definition, config, publisher }
    }

    #[instrument(level = "debug", skip(self, state), fields(item = drop.item_id, zone = %drop.zone))]
    pub fn submit_placement(
        &self,
        state: &mut LearnerState,
        drop: &ItemDrop,
    ) -> Result<PlacementOutcome, DragDropError> {
        let zone = self
            .definition
            .zone(&drop.zone)
            .ok_or_else(|| DragDropError::InvalidZoneReference(drop.zone.clone()))?;
        let item = self
            .definition
            .item(drop.item_id)
            .ok_or(DragDropError::InvalidItemReference(drop.item_id))?;

        let mut next = state.clone();
        let outcome = match self.config.mode {
            GradingMode::Standard => PlacementOutcome::Immediate(self.place_standard(&mut next, item, zone, drop)),
            GradingMode::Assessment { .. } => {
                self.place_assessment(&mut next, item, zone, drop)?;
                PlacementOutcome::Deferred
            }
        };
        *state = next;
        Ok(outcome)
    }

    fn place_standard(
        &self,
        state: &mut LearnerState,
        item: &Item,
        zone: &Zone,
        drop: &ItemDrop,
    ) -> PlacementFeedback {
        let correct = is_correct(item, &zone.uid);
        // Incorrect drops leave the learner's previous state for the item alone.
        if correct {
            state
                .placements
                .insert(item.state_key(), Placement::new(&zone.uid, true, &drop.x_percent, &drop.y_percent));
        }
        debug!(target: "dragdrop", item = item.id, zone = %zone.uid, correct, "Standard drop graded");

        self.mark_complete_and_publish_grade(state);
        self.publish(ITEM_DROPPED_EVENT, item_dropped_payload(item.id, &zone.title, &zone.uid, correct));

        let finished = ScoringEngine::new(self.definition, state).is_finished();
        let feedback = if correct { &item.feedback.correct } else { &item.feedback.incorrect };
        PlacementFeedback {
            correct,
            finished,
            overall_feedback: finished.then(|| self.definition.feedback.finish.clone()),
            feedback: feedback.clone(),
        }
    }

    fn place_assessment(
        &self,
        state: &mut LearnerState,
        item: &Item,
        zone: &Zone,
        drop: &ItemDrop,
    ) -> Result<(), DragDropError> {
        if !self.config.attempts_remain(state.attempts_used) {
            return Err(DragDropError::AttemptsExhausted);
        }
        let correct = is_correct(item, &zone.uid);
        // Intermediate positions are always kept; grading happens on submission.
        state
            .placements
            .insert(item.state_key(), Placement::new(&zone.uid, correct, &drop.x_percent, &drop.y_percent));
        debug!(target: "dragdrop", item = item.id, zone = %zone.uid, correct, "Assessment drop stored");

        self.publish(ITEM_DROPPED_EVENT, item_dropped_payload(item.id, &zone.title, &zone.uid, correct));
        Ok(())
    }

    /// Grade the current placements as one attempt (Assessment mode only).
    #[instrument(level = "debug", skip(self, state), fields(attempts_used = state.attempts_used))]
    pub fn submit_attempt(&self, state: &mut LearnerState) -> Result<AttemptOutcome, DragDropError> {
        if let GradingMode::Standard = self.config.mode {
            return Err(DragDropError::ModeViolation(STANDARD_MODE_ATTEMPT.into()));
        }
        if !self.config.attempts_remain(state.attempts_used) {
            return Err(DragDropError::AttemptsExhausted);
        }

        let mut next = state.clone();
        next.attempts_used += 1;
        self.mark_complete_and_publish_grade(&mut next);

        let engine = ScoringEngine::new(self.definition, &next);
        let stats = engine.stats();
        let grade = engine.grade(self.config.weight);
        let misplaced = stats.misplaced();
        let missing = stats.missing();
        let attempts_remain = self.config.attempts_remain(next.attempts_used);

        let messages = compose(&AttemptSummary {
            correct: stats.correct.len(),
            misplaced: misplaced.len(),
            missing: missing.len(),
            attempts_remain,
            finish: &self.definition.feedback.finish,
            grade,
        });

        // Return misplaced items to the bank; missing ones were never stored.
        for id in &misplaced {
            next.placements.remove(&id.to_string());
        }

        info!(
            target: "dragdrop",
            attempt = next.attempts_used,
            correct = stats.correct.len(),
            misplaced = misplaced.len(),
            missing = missing.len(),
            grade,
            attempts_remain,
            "Attempt graded"
        );

        *state = next;
        Ok(AttemptOutcome {
            num_attempts: state.attempts_used,
            misplaced_items: misplaced.into_iter().collect(),
            feedback: to_html(&messages),
        })
    }

    /// Read model: placements (zones backfilled), finished flag, attempts and overall feedback.
    pub fn learner_view(&self, state: &LearnerState) -> LearnerView {
        let items = state
            .placements
            .iter()
            .map(|(key, placement)| (key.clone(), placement.view(self.definition.item_by_key(key))))
            .collect();
        let finished = ScoringEngine::new(self.definition, state).is_finished();
        let feedback = &self.definition.feedback;
        LearnerView {
            items,
            finished,
            num_attempts: state.attempts_used,
            overall_feedback: if finished { feedback.finish.clone() } else { feedback.start.clone() },
        }
    }

    /// Return every item to the bank. `attempts_used` and `completed` are untouched.
    pub fn reset(&self, state: &mut LearnerState) -> LearnerView {
        state.clear_placements();
        self.learner_view(state)
    }

    /// Set `completed` on the first solve or when attempts run out, publishing
    /// the grade at that moment only.
    fn mark_complete_and_publish_grade(&self, state: &mut LearnerState) {
        if state.completed {
            return;
        }
        let engine = ScoringEngine::new(self.definition, state);
        if !(engine.is_finished() || !self.config.attempts_remain(state.attempts_used)) {
            return;
        }
        let grade = engine.grade(self.config.weight);
        state.completed = true;
        info!(target: "dragdrop", grade, max_grade = self.config.weight, "Problem completed");
        self.publish(GRADE_EVENT, grade_payload(grade, self.config.weight))
    }

    /// Publish and move on; failures are logged only.
    fn publish(&self, name: &str, payload: Value) {
        match self.publisher.publish(name, &payload) {
            Ok(()) => {}
            Err(PublishError::NotSupported) => {
                debug!(target: "dragdrop", event = name, "Host does not publish events; ignoring");
            }
            Err(PublishError::Failed(msg)) => {
                error!(target: "dragdrop", event = name, error = %msg, %payload, "Event publication failed");
            }
        }
    }
}
