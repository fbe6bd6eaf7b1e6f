use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use dragdrop_backend::config::parse_config;
use dragdrop_backend::events::MemoryPublisher;
use dragdrop_backend::routes::build_router;
use dragdrop_backend::state::AppState;
use dragdrop_backend::store::MemoryFieldStore;

/// Two required items (z1, z2) plus one decoy, in both modes.
pub const CONFIG: &str = r#"
[[problems]]
id = "std"
weight = 1.0
[problems.data]
feedback = { start = "Intro", finish = "This is the final feedback." }
zones = [ { uid = "z1", title = "Zone 1" }, { uid = "z2", title = "Zone 2" } ]
items = [
  { id = 0, zones = ["z1"], feedback = { correct = "Yes 1", incorrect = "No 1" } },
  { id = 1, zones = ["z2"], feedback = { correct = "Yes 2", incorrect = "No 2" } },
  { id = 2, zones = [], feedback = { correct = "", incorrect = "" } },
]

[[problems]]
id = "quiz"
mode = "assessment"
max_attempts = 5
[problems.data]
feedback = { start = "Intro", finish = "This is the final feedback." }
zones = [ { uid = "z1", title = "Zone 1" }, { uid = "z2", title = "Zone 2" } ]
items = [
  { id = 0, zones = ["z1"] },
  { id = 1, zones = ["z2"] },
  { id = 2, zones = [] },
]
"#;

pub fn create_test_app() -> (Router, Arc<MemoryPublisher>) {
    let cfg = parse_config(CONFIG).expect("test config parses");
    let publisher = Arc::new(MemoryPublisher::new());
    let state = AppState::with_collaborators(&cfg, Arc::new(MemoryFieldStore::new()), publisher.clone());
    (build_router(Arc::new(state)), publisher)
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(v) => request.body(Body::from(v.to_string())).unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, json)
}
