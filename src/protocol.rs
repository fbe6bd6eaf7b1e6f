//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::attempt::{AttemptOutcome, ItemDrop, PlacementFeedback, PlacementOutcome};
use crate::domain::{Mode, ProblemSettings, Zone};
use crate::learner::LearnerView;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    DropItem(DropItemIn),
    DoAttempt,
    GetState,
    Reset,
    GetConfiguration,
    PublishEvent {
        data: Value,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    DropResult {
        result: DropItemOut,
    },
    AttemptResult(AttemptOutcome),
    State {
        state: LearnerView,
    },
    Configuration {
        configuration: ConfigurationOut,
    },
    EventResult(ResultOut),
    Error {
        kind: String,
        message: String,
    },
}

//
// Learner actions
//

/// A drop as sent by the client (`val` is the item id).
#[derive(Clone, Debug, Deserialize)]
pub struct DropItemIn {
    pub val: i64,
    pub zone: String,
    #[serde(default)]
    pub x_percent: String,
    #[serde(default)]
    pub y_percent: String,
}

impl From<DropItemIn> for ItemDrop {
    fn from(d: DropItemIn) -> Self {
        ItemDrop { item_id: d.val, zone: d.zone, x_percent: d.x_percent, y_percent: d.y_percent }
    }
}

/// Standard mode answers with feedback, Assessment mode with `{}`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DropItemOut {
    Feedback(PlacementFeedback),
    Acknowledged(Ack),
}

#[derive(Debug, Serialize, Default)]
pub struct Ack {}

impl From<PlacementOutcome> for DropItemOut {
    fn from(o: PlacementOutcome) -> Self {
        match o {
            PlacementOutcome::Immediate(fb) => DropItemOut::Feedback(fb),
            PlacementOutcome::Deferred => DropItemOut::Acknowledged(Ack {}),
        }
    }
}

/// `{"result": "success"}` or `{"result": "error", "message": ...}`.
#[derive(Debug, Serialize, PartialEq)]
pub struct ResultOut {
    pub result: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ResultOut {
    pub fn success() -> Self {
        Self { result: "success", message: None }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { result: "error", message: Some(message.into()) }
    }
}

//
// Learner configuration view (no answers, no final feedback)
//

#[derive(Debug, Serialize)]
pub struct ConfigItemOut {
    pub id: i64,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    #[serde(rename = "expandedImageURL")]
    pub expanded_image_url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct ConfigurationOut {
    pub mode: Mode,
    pub max_attempts: Option<u32>,
    pub zones: Vec<Zone>,
    pub display_zone_labels: bool,
    pub display_zone_borders: bool,
    pub items: Vec<ConfigItemOut>,
    pub title: String,
    pub show_title: bool,
    pub problem_text: String,
    pub show_problem_header: bool,
    pub target_img_expanded_url: String,
    pub target_img_description: String,
    pub item_background_color: Option<String>,
    pub item_text_color: Option<String>,
    pub initial_feedback: String,
}

//
// Authoring
//

/// Author submission replacing a problem's settings and data.
#[derive(Debug, Deserialize)]
pub struct AuthorSubmissionIn {
    pub display_name: String,
    pub mode: Mode,
    #[serde(default)]
    pub max_attempts: Option<u32>,
    pub show_title: bool,
    pub problem_text: String,
    pub show_problem_header: bool,
    pub weight: f64,
    #[serde(default)]
    pub item_background_color: String,
    #[serde(default)]
    pub item_text_color: String,
    pub data: Value,
}

impl AuthorSubmissionIn {
    pub fn settings(&self) -> ProblemSettings {
        ProblemSettings {
            display_name: self.display_name.clone(),
            mode: self.mode,
            max_attempts: self.max_attempts,
            weight: self.weight,
            show_title: self.show_title,
            question_text: self.problem_text.clone(),
            show_question_header: self.show_problem_header,
            item_background_color: self.item_background_color.clone(),
            item_text_color: self.item_text_color.clone(),
        }
    }
}

//
// Misc HTTP DTOs
//

#[derive(Debug, Deserialize, Serialize)]
pub struct ExpandUrl {
    pub url: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub success: bool,
    pub kind: String,
    pub error: String,
}
