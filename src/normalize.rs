//! Normalization of authored problem data into the canonical `ProblemDefinition`.
//!
//! Three historical shapes are accepted:
//!   - current: items carry `zones: [uid, ...]`
//!   - legacy items: a singular `zone: uid | "none"`
//!   - legacy zones: no `uid`, keyed by `title`
//!
//! This pass runs once when a definition is loaded. Nothing downstream
//! branches on the legacy shapes. Normalizing a normalized definition
//! (serialized back to JSON) yields the same definition.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::domain::{Item, ItemFeedback, ProblemDefinition, ProblemFeedback, Zone};
use crate::error::DragDropError;

/// Singular legacy value meaning "no correct zone".
const LEGACY_NO_ZONE: &str = "none";

#[derive(Deserialize)]
struct RawDefinition {
  zones: Option<Vec<RawZone>>,
  items: Option<Vec<RawItem>>,
  #[serde(default)]
  feedback: Option<ProblemFeedback>,
  #[serde(default, rename = "targetImg")]
  target_img: Option<String>,
  #[serde(default, rename = "targetImgDescription")]
  target_img_description: Option<String>,
  #[serde(default, rename = "displayLabels")]
  display_labels: Option<bool>,
  #[serde(default, rename = "displayBorders")]
  display_borders: Option<bool>,
}

#[derive(Deserialize)]
struct RawZone {
  #[serde(default)] uid: Option<String>,
  #[serde(default)] title: Option<String>,
  #[serde(default)] description: Option<String>,
  // Obsolete positional identifiers; read so they do not leak into `extra`.
  #[serde(default)]
  #[allow(dead_code)]
  id: Option<Value>,
  #[serde(default)]
  #[allow(dead_code)]
  index: Option<Value>,
  #[serde(flatten)]
  extra: Map<String, Value>,
}

#[derive(Deserialize)]
struct RawItem {
  id: i64,
  #[serde(default)] zone: Option<String>,
  #[serde(default)] zones: Option<Vec<String>>,
  #[serde(default)] feedback: Option<ItemFeedback>,
  #[serde(default, rename = "displayName")] display_name: Option<String>,
  #[serde(default, rename = "imageURL")] image_url: Option<String>,
  #[serde(default, rename = "backgroundImage")] background_image: Option<String>,
  #[serde(flatten)]
  extra: Map<String, Value>,
}

/// Convert authored data (any supported shape) into a `ProblemDefinition`.
pub fn normalize_definition(raw: &Value) -> Result<ProblemDefinition, DragDropError> {
  if !raw.is_object() {
    return Err(DragDropError::MalformedDefinition("problem data must be an object".into()));
  }
  let parsed: RawDefinition = serde_json::from_value(raw.clone())
    .map_err(|e| DragDropError::MalformedDefinition(e.to_string()))?;

  let raw_zones = parsed
    .zones
    .ok_or_else(|| DragDropError::MalformedDefinition("missing 'zones'".into()))?;
  let raw_items = parsed
    .items
    .ok_or_else(|| DragDropError::MalformedDefinition("missing 'items'".into()))?;

  let zones = normalize_zones(raw_zones)?;
  let items = normalize_items(raw_items, &zones)?;

  let feedback = parsed.feedback.unwrap_or_else(|| {
    warn!(target: "dragdrop", "Problem data has no 'feedback'; using empty start/finish messages");
    ProblemFeedback::default()
  });

  Ok(ProblemDefinition {
    zones,
    items,
    feedback,
    target_img: parsed.target_img.filter(|s| !s.is_empty()),
    target_img_description: parsed.target_img_description.unwrap_or_default(),
    display_labels: parsed.display_labels.unwrap_or(false),
    display_borders: parsed.display_borders.unwrap_or(false),
  })
}

fn normalize_zones(raw: Vec<RawZone>) -> Result<Vec<Zone>, DragDropError> {
  let mut seen = HashSet::new();
  let mut zones = Vec::with_capacity(raw.len());
  for (pos, z) in raw.into_iter().enumerate() {
    // Older data used the title as the zone identity.
    let uid = match (z.uid, &z.title) {
      (Some(uid), _) => uid,
      (None, Some(title)) => {
        debug!(target: "dragdrop", zone = pos, %title, "Backfilling zone uid from title");
        title.clone()
      }
      (None, None) => {
        return Err(DragDropError::MalformedDefinition(format!(
          "zone #{pos} has neither 'uid' nor 'title'"
        )))
      }
    };
    if !seen.insert(uid.clone()) {
      return Err(DragDropError::MalformedDefinition(format!("duplicate zone uid '{uid}'")));
    }
    zones.push(Zone {
      title: z.title.unwrap_or_else(|| uid.clone()),
      uid,
      description: z.description,
      extra: z.extra,
    });
  }
  Ok(zones)
}

fn normalize_items(raw: Vec<RawItem>, zones: &[Zone]) -> Result<Vec<Item>, DragDropError> {
  let mut seen = HashSet::new();
  let mut items = Vec::with_capacity(raw.len());
  for it in raw {
    if !seen.insert(it.id) {
      return Err(DragDropError::MalformedDefinition(format!("duplicate item id {}", it.id)));
    }

    let correct_zones = correct_zones_of(it.zones, it.zone);
    for uid in &correct_zones {
      if !zones.iter().any(|z| &z.uid == uid) {
        warn!(target: "dragdrop", item = it.id, zone = %uid, "Item references a zone that is not defined; it can never be placed there");
      }
    }

    let image_url = it
      .image_url
      .filter(|s| !s.is_empty())
      .or(it.background_image)
      .unwrap_or_default();

    items.push(Item {
      id: it.id,
      display_name: it.display_name.unwrap_or_default(),
      image_url,
      correct_zones,
      feedback: it.feedback.unwrap_or_default(),
      extra: it.extra,
    });
  }
  Ok(items)
}

/// A present `zones` list wins; otherwise a singular `zone` other than
/// `"none"`; otherwise the item is a decoy.
fn correct_zones_of(zones: Option<Vec<String>>, zone: Option<String>) -> Vec<String> {
  let listed = match (zones, zone) {
    (Some(list), _) => list,
    (None, Some(single)) if single != LEGACY_NO_ZONE => vec![single],
    _ => Vec::new(),
  };
  let mut seen = HashSet::new();
  listed.into_iter().filter(|uid| seen.insert(uid.clone())).collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn current_shape() -> Value {
    json!({
      "zones": [
        {"uid": "z1", "title": "Zone 1", "x": 10, "y": 20},
        {"uid": "z2", "title": "Zone 2", "description": "lower half"}
      ],
      "items": [
        {"id": 0, "displayName": "A", "zones": ["z1"], "feedback": {"correct": "Yes A", "incorrect": "No A"}},
        {"id": 1, "displayName": "B", "zones": ["z1", "z2"], "feedback": {"correct": "Yes B", "incorrect": "No B"}},
        {"id": 2, "displayName": "decoy", "zones": [], "feedback": {"correct": "", "incorrect": ""}}
      ],
      "feedback": {"start": "Go", "finish": "Done"}
    })
  }

  #[test]
  fn test_current_shape() {
    let def = normalize_definition(&current_shape()).unwrap();
    assert_eq!(def.zones.len(), 2);
    assert_eq!(def.zones[0].extra.get("x"), Some(&json!(10)));
    assert_eq!(def.items[1].correct_zones, vec!["z1".to_string(), "z2".to_string()]);
    assert!(def.items[2].is_decoy());
    assert_eq!(def.feedback.finish, "Done");
  }

  #[test]
  fn test_legacy_single_zone_and_title_uids() {
    let raw = json!({
      "zones": [
        {"title": "Zone 1", "id": 0, "index": 1},
        {"title": "Zone 2", "id": 1, "index": 2}
      ],
      "items": [
        {"id": 0, "zone": "Zone 1", "feedback": {"correct": "Yes", "incorrect": "No"}},
        {"id": 1, "zone": "none", "backgroundImage": "/static/b.png"},
        {"id": 2}
      ],
      "feedback": {"start": "s", "finish": "f"}
    });
    let def = normalize_definition(&raw).unwrap();
    assert_eq!(def.zones[0].uid, "Zone 1");
    assert!(def.zones[0].extra.get("id").is_none());
    assert!(def.zones[0].extra.get("index").is_none());
    assert_eq!(def.items[0].correct_zones, vec!["Zone 1".to_string()]);
    assert!(def.items[1].is_decoy());
    assert_eq!(def.items[1].image_url, "/static/b.png");
    assert!(def.items[2].is_decoy());
  }

  #[test]
  fn test_zones_list_wins_over_singular_zone() {
    let raw = json!({
      "zones": [{"uid": "a", "title": "A"}, {"uid": "b", "title": "B"}],
      "items": [{"id": 7, "zone": "a", "zones": ["b", "b"]}],
    });
    let def = normalize_definition(&raw).unwrap();
    assert_eq!(def.items[0].correct_zones, vec!["b".to_string()]);
  }

  #[test]
  fn test_null_zones_falls_back_to_zone() {
    let raw = json!({
      "zones": [{"uid": "a", "title": "A"}],
      "items": [{"id": 1, "zone": "a", "zones": null}],
    });
    let def = normalize_definition(&raw).unwrap();
    assert_eq!(def.items[0].correct_zones, vec!["a".to_string()]);
  }

  #[test]
  fn test_idempotent() {
    for raw in [current_shape(), json!({
      "zones": [{"title": "Old"}],
      "items": [{"id": 3, "zone": "Old"}, {"id": 4, "zone": "none"}],
      "feedback": {"start": "", "finish": ""},
      "targetImg": "/static/bg.png",
      "displayLabels": true
    })] {
      let once = normalize_definition(&raw).unwrap();
      let twice = normalize_definition(&serde_json::to_value(&once).unwrap()).unwrap();
      assert_eq!(once, twice);
    }
  }

  #[test]
  fn test_missing_items_or_zones_is_malformed() {
    let no_items = json!({"zones": [], "feedback": {"start": "", "finish": ""}});
    let no_zones = json!({"items": []});
    assert!(matches!(normalize_definition(&no_items), Err(DragDropError::MalformedDefinition(_))));
    assert!(matches!(normalize_definition(&no_zones), Err(DragDropError::MalformedDefinition(_))));
    assert!(matches!(normalize_definition(&json!([1, 2])), Err(DragDropError::MalformedDefinition(_))));
  }

  #[test]
  fn test_duplicates_are_malformed() {
    let dup_zone = json!({"zones": [{"uid": "a"}, {"uid": "a"}], "items": []});
    let dup_item = json!({"zones": [], "items": [{"id": 1}, {"id": 1}]});
    assert!(normalize_definition(&dup_zone).is_err());
    assert!(normalize_definition(&dup_item).is_err());
  }

  #[test]
  fn test_missing_feedback_defaults_to_empty() {
    let def = normalize_definition(&json!({"zones": [], "items": []})).unwrap();
    assert_eq!(def.feedback, ProblemFeedback::default());
  }
}
