//! Per-learner state: placements, attempts used, and the sticky `completed` flag.
//!
//! The record is loaded from the host's field store at the start of an action
//! and saved back only when the action succeeds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::Item;
use crate::error::DragDropError;
use crate::store::{read_field, write_field, Field, FieldStore, Scope};

/// Zone reported for a legacy placement whose item has no correct zone.
pub const UNKNOWN_ZONE: &str = "unknown";

/// A learner's association of an item with a zone.
///
/// `zone` is absent only for records written before zones were tracked;
/// `top`/`left` only exist on those legacy records.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(from = "PlacementRecord")]
pub struct Placement {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub zone: Option<String>,
  pub correct: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub x_percent: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub y_percent: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub top: Option<Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub left: Option<Value>,
}

impl Placement {
  pub fn new(zone: &str, correct: bool, x_percent: &str, y_percent: &str) -> Self {
    Self {
      zone: Some(zone.to_string()),
      correct,
      x_percent: Some(x_percent.to_string()),
      y_percent: Some(y_percent.to_string()),
      top: None,
      left: None,
    }
  }

  /// Read-side view with the zone backfilled from the item definition:
  /// older records were only ever stored for a single correct zone.
  pub fn view(&self, item: Option<&Item>) -> PlacementView {
    let zone = self.zone.clone().unwrap_or_else(|| {
      item
        .and_then(|it| it.correct_zones.first().cloned())
        .unwrap_or_else(|| UNKNOWN_ZONE.to_string())
    });
    PlacementView {
      zone,
      correct: self.correct,
      x_percent: self.x_percent.clone(),
      y_percent: self.y_percent.clone(),
      top: self.top.clone(),
      left: self.left.clone(),
    }
  }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PlacementRecord {
  // Oldest format: a bare `[top, left]` pair, stored only for correct drops.
  Legacy(Value, Value),
  Current(PlacementFields),
}

#[derive(Deserialize)]
struct PlacementFields {
  #[serde(default)] zone: Option<String>,
  #[serde(default)] correct: bool,
  #[serde(default)] x_percent: Option<String>,
  #[serde(default)] y_percent: Option<String>,
  #[serde(default)] top: Option<Value>,
  #[serde(default)] left: Option<Value>,
}

impl From<PlacementRecord> for Placement {
  fn from(record: PlacementRecord) -> Self {
    match record {
      PlacementRecord::Legacy(top, left) => Placement {
        zone: None,
        correct: true,
        x_percent: None,
        y_percent: None,
        top: Some(top),
        left: Some(left),
      },
      PlacementRecord::Current(f) => Placement {
        zone: f.zone,
        correct: f.correct,
        x_percent: f.x_percent,
        y_percent: f.y_percent,
        top: f.top,
        left: f.left,
      },
    }
  }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PlacementView {
  pub zone: String,
  pub correct: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub x_percent: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub y_percent: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub top: Option<Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub left: Option<Value>,
}

/// What a learner (re)loading the problem sees.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct LearnerView {
  pub items: BTreeMap<String, PlacementView>,
  pub finished: bool,
  pub num_attempts: u32,
  pub overall_feedback: String,
}

pub const ITEM_STATE: Field<BTreeMap<String, Placement>> =
  Field::new("item_state", Scope::UserState, BTreeMap::new);
pub const NUM_ATTEMPTS: Field<u32> = Field::new("num_attempts", Scope::UserState, no_attempts);
pub const COMPLETED: Field<bool> = Field::new("completed", Scope::UserState, not_completed);

fn no_attempts() -> u32 { 0 }
fn not_completed() -> bool { false }

/// Store owner for one learner's record on one problem.
pub fn learner_owner(problem_id: &str, learner_id: &str) -> String {
  format!("{problem_id}/{learner_id}")
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LearnerState {
  /// Item id (as string) to placement. Absent key = item is in the bank.
  pub placements: BTreeMap<String, Placement>,
  /// Only ever incremented, by explicit attempt submissions.
  pub attempts_used: u32,
  /// Sticky: never returns to false once set.
  pub completed: bool,
}

impl LearnerState {
  pub fn load(store: &dyn FieldStore, owner: &str) -> Self {
    Self {
      placements: read_field(store, owner, &ITEM_STATE),
      attempts_used: read_field(store, owner, &NUM_ATTEMPTS),
      completed: read_field(store, owner, &COMPLETED),
    }
  }

  pub fn save(&self, store: &dyn FieldStore, owner: &str) -> Result<(), DragDropError> {
    write_field(store, owner, &ITEM_STATE, &self.placements)?;
    write_field(store, owner, &NUM_ATTEMPTS, &self.attempts_used)?;
    write_field(store, owner, &COMPLETED, &self.completed)
  }

  /// Return every item to the bank. Attempts and completion are kept.
  pub fn clear_placements(&mut self) {
    self.placements.clear();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::MemoryFieldStore;
  use serde_json::json;

  #[test]
  fn test_fresh_learner_defaults() {
    let store = MemoryFieldStore::new();
    let state = LearnerState::load(&store, &learner_owner("p", "l"));
    assert_eq!(state, LearnerState::default());
  }

  #[test]
  fn test_save_and_reload() {
    let store = MemoryFieldStore::new();
    let owner = learner_owner("p", "l");
    let mut state = LearnerState::default();
    state.placements.insert("0".into(), Placement::new("z1", true, "10%", "20%"));
    state.attempts_used = 2;
    state.completed = true;
    state.save(&store, &owner).unwrap();
    assert_eq!(LearnerState::load(&store, &owner), state);
  }

  #[test]
  fn test_legacy_pair_loads_as_correct_without_zone() {
    let store = MemoryFieldStore::new();
    let owner = learner_owner("p", "l");
    store.set(ITEM_STATE.key(&owner), json!({"1": [120, 45], "2": {"zone": "z2", "correct": false}}));
    let state = LearnerState::load(&store, &owner);
    let legacy = &state.placements["1"];
    assert_eq!(legacy.zone, None);
    assert!(legacy.correct);
    assert_eq!(legacy.top, Some(json!(120)));
    assert_eq!(legacy.left, Some(json!(45)));
    assert_eq!(state.placements["2"].zone.as_deref(), Some("z2"));
  }

  #[test]
  fn test_view_backfills_missing_zone() {
    let legacy = Placement { zone: None, correct: true, x_percent: None, y_percent: None, top: None, left: None };
    assert_eq!(legacy.view(None).zone, UNKNOWN_ZONE);
  }

  #[test]
  fn test_clear_keeps_attempts_and_completion() {
    let mut state = LearnerState {
      placements: BTreeMap::from([("0".to_string(), Placement::new("z1", true, "1%", "1%"))]),
      attempts_used: 3,
      completed: true,
    };
    state.clear_placements();
    assert!(state.placements.is_empty());
    assert_eq!(state.attempts_used, 3);
    assert!(state.completed);
  }
}
