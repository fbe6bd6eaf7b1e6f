//! Built-in problems so the service is useful without external config.

use serde_json::{json, Value};

use crate::domain::{Mode, ProblemSettings};

pub const DEMO_PROBLEM_ID: &str = "demo";
pub const DEMO_ASSESSMENT_ID: &str = "demo-assessment";

/// Authored data of the default problem: three stacked zones, one item per
/// zone plus a decoy.
pub fn default_data() -> Value {
  json!({
    "targetImgDescription": "An isosceles triangle with three layers of similar height. It is shown upright, so the widest layer is located at the bottom, and the narrowest layer is located at the top.",
    "zones": [
      {"uid": "top", "title": "The Top Zone", "description": "Use this zone to associate an item with the top layer of the triangle.", "x": 160, "y": 30, "width": 196, "height": 178},
      {"uid": "middle", "title": "The Middle Zone", "description": "Use this zone to associate an item with the middle layer of the triangle.", "x": 86, "y": 210, "width": 340, "height": 138},
      {"uid": "bottom", "title": "The Bottom Zone", "description": "Use this zone to associate an item with the bottom layer of the triangle.", "x": 15, "y": 350, "width": 485, "height": 135}
    ],
    "items": [
      {
        "id": 0,
        "displayName": "Goes to the top",
        "zones": ["top"],
        "feedback": {"correct": "Correct! This one belongs to The Top Zone.", "incorrect": "No, this item does not belong here. Try again."}
      },
      {
        "id": 1,
        "displayName": "Goes to the middle",
        "zones": ["middle"],
        "feedback": {"correct": "Correct! This one belongs to The Middle Zone.", "incorrect": "No, this item does not belong here. Try again."}
      },
      {
        "id": 2,
        "displayName": "Goes to the bottom",
        "zones": ["bottom"],
        "feedback": {"correct": "Correct! This one belongs to The Bottom Zone.", "incorrect": "No, this item does not belong here. Try again."}
      },
      {
        "id": 3,
        "displayName": "I don't belong anywhere",
        "zones": [],
        "feedback": {"correct": "", "incorrect": "You silly, there are no zones for this one."}
      }
    ],
    "feedback": {
      "start": "Drag the items onto the image above.",
      "finish": "Good work! You have completed this drag and drop problem."
    }
  })
}

/// `(id, settings, data)` of every built-in problem.
pub fn seed_problems() -> Vec<(String, ProblemSettings, Value)> {
  vec![
    (DEMO_PROBLEM_ID.to_string(), ProblemSettings::default(), default_data()),
    (
      DEMO_ASSESSMENT_ID.to_string(),
      ProblemSettings {
        display_name: "Drag and Drop (assessment)".into(),
        mode: Mode::Assessment,
        max_attempts: Some(3),
        ..Default::default()
      },
      default_data(),
    ),
  ]
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::normalize::normalize_definition;

  #[test]
  fn test_seed_data_normalizes() {
    for (id, _, data) in seed_problems() {
      let def = normalize_definition(&data).unwrap_or_else(|e| panic!("{id}: {e}"));
      assert_eq!(def.items.iter().filter(|i| i.is_decoy()).count(), 1);
    }
  }
}
