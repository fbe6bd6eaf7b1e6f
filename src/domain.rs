//! Domain models: normalized problem definition (zones, items, feedback),
//! author settings and the immutable grading configuration derived from them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Which protocol a problem follows.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
  /// Immediate feedback on every drop; only correct drops are kept.
  #[default]
  Standard,
  /// Drops are stored silently; feedback is revealed on explicit attempt submission.
  Assessment,
}

/// A drop target. `uid` is the identity key; presentation attributes
/// (geometry, alignment...) travel untouched in `extra`.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Zone {
  pub uid: String,
  pub title: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct ItemFeedback {
  #[serde(default)] pub correct: String,
  #[serde(default)] pub incorrect: String,
}

/// A draggable item. An empty `correct_zones` marks a decoy.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Item {
  pub id: i64,
  #[serde(rename = "displayName")]
  pub display_name: String,
  #[serde(rename = "imageURL")]
  pub image_url: String,
  #[serde(rename = "zones")]
  pub correct_zones: Vec<String>,
  pub feedback: ItemFeedback,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl Item {
  pub fn is_decoy(&self) -> bool {
    self.correct_zones.is_empty()
  }

  /// Key under which this item's placement is stored in learner state.
  pub fn state_key(&self) -> String {
    self.id.to_string()
  }
}

/// Problem-level feedback. `finish` may give away answers and is only shown
/// once the problem is solved.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct ProblemFeedback {
  #[serde(default)] pub start: String,
  #[serde(default)] pub finish: String,
}

/// Canonical in-memory shape of authored problem data. Produced only by
/// `normalize::normalize_definition`.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ProblemDefinition {
  pub zones: Vec<Zone>,
  pub items: Vec<Item>,
  pub feedback: ProblemFeedback,
  #[serde(rename = "targetImg", skip_serializing_if = "Option::is_none")]
  pub target_img: Option<String>,
  #[serde(rename = "targetImgDescription")]
  pub target_img_description: String,
  #[serde(rename = "displayLabels")]
  pub display_labels: bool,
  #[serde(rename = "displayBorders")]
  pub display_borders: bool,
}

impl ProblemDefinition {
  pub fn zone(&self, uid: &str) -> Option<&Zone> {
    self.zones.iter().find(|z| z.uid == uid)
  }

  pub fn item(&self, id: i64) -> Option<&Item> {
    self.items.iter().find(|i| i.id == id)
  }

  /// Look up an item by its learner-state key (the id rendered as a string).
  pub fn item_by_key(&self, key: &str) -> Option<&Item> {
    key.parse::<i64>().ok().and_then(|id| self.item(id))
  }
}

fn default_display_name() -> String { "Drag and Drop".into() }
fn default_weight() -> f64 { 1.0 }
fn default_true() -> bool { true }

/// Author-controlled settings of one problem.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProblemSettings {
  #[serde(default = "default_display_name")] pub display_name: String,
  #[serde(default)] pub mode: Mode,
  /// `None` or `0` means unlimited attempts.
  #[serde(default)] pub max_attempts: Option<u32>,
  #[serde(default = "default_weight")] pub weight: f64,
  #[serde(default = "default_true")] pub show_title: bool,
  #[serde(default)] pub question_text: String,
  #[serde(default = "default_true")] pub show_question_header: bool,
  #[serde(default)] pub item_background_color: String,
  #[serde(default)] pub item_text_color: String,
}

impl Default for ProblemSettings {
  fn default() -> Self {
    Self {
      display_name: default_display_name(),
      mode: Mode::Standard,
      max_attempts: None,
      weight: default_weight(),
      show_title: true,
      question_text: String::new(),
      show_question_header: true,
      item_background_color: String::new(),
      item_text_color: String::new(),
    }
  }
}

impl ProblemSettings {
  /// Freeze the grading-relevant settings for one controller.
  pub fn grading(&self) -> GradingConfig {
    let mode = match self.mode {
      Mode::Standard => GradingMode::Standard,
      Mode::Assessment => GradingMode::Assessment { max_attempts: self.max_attempts },
    };
    GradingConfig { mode, weight: self.weight.max(0.0) }
  }
}

/// Mode-tagged protocol. Standard mode has no attempt concept at all.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GradingMode {
  Standard,
  Assessment { max_attempts: Option<u32> },
}

/// Immutable grading configuration handed to the attempt controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradingConfig {
  pub mode: GradingMode,
  /// Maximum score.
  pub weight: f64,
}

impl GradingConfig {
  pub fn attempts_remain(&self, attempts_used: u32) -> bool {
    match self.mode {
      GradingMode::Standard => true,
      GradingMode::Assessment { max_attempts: None } | GradingMode::Assessment { max_attempts: Some(0) } => true,
      GradingMode::Assessment { max_attempts: Some(max) } => attempts_used < max,
    }
  }
}

/// One hosted problem: settings plus its normalized definition.
#[derive(Clone, Debug)]
pub struct Problem {
  pub id: String,
  pub settings: ProblemSettings,
  pub definition: ProblemDefinition,
}
