//! Event publication collaborator (grades and analytics).
//!
//! Publication is fire-and-forget. Hosts that cannot publish at all (an
//! authoring preview, for instance) answer `PublishError::NotSupported`, which
//! callers treat as success.

use std::sync::Mutex;

use serde_json::{json, Value};
use thiserror::Error;
use tracing::info;

pub const GRADE_EVENT: &str = "grade";
pub const ITEM_DROPPED_EVENT: &str = "edx.drag_and_drop_v2.item.dropped";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PublishError {
    #[error("event publication is not supported by this host")]
    NotSupported,
    #[error("{0}")]
    Failed(String),
}

pub trait EventPublisher: Send + Sync {
    fn publish(&self, name: &str, payload: &Value) -> Result<(), PublishError>;
}

pub fn grade_payload(value: f64, max_value: f64) -> Value {
    json!({ "value": value, "max_value": max_value })
}

pub fn item_dropped_payload(item_id: i64, zone_title: &str, zone_uid: &str, is_correct: bool) -> Value {
    json!({
        "item_id": item_id,
        "location": zone_title,
        "location_id": zone_uid,
        "is_correct": is_correct,
    })
}

/// Emits every event as a structured log line on target `events`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingPublisher;

impl EventPublisher for TracingPublisher {
    fn publish(&self, name: &str, payload: &Value) -> Result<(), PublishError> {
        info!(target: "events", event = name, %payload, "Event published");
        Ok(())
    }
}

/// A host without event support.
#[derive(Clone, Copy, Debug, Default)]
pub struct PreviewPublisher;

impl EventPublisher for PreviewPublisher {
    fn publish(&self, _name: &str, _payload: &Value) -> Result<(), PublishError> {
        Err(PublishError::NotSupported)
    }
}

/// Keeps published events in memory, in order.
#[derive(Debug, Default)]
pub struct MemoryPublisher {
    events: Mutex<Vec<(String, Value)>>,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(String, Value)> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Payloads of all events published under `name`.
    pub fn named(&self, name: &str) -> Vec<Value> {
        self.events()
            .into_iter()
            .filter(|(n, _)| n == name)
            .map(|(_, p)| p)
            .collect()
    }
}

impl EventPublisher for MemoryPublisher {
    fn publish(&self, name: &str, payload: &Value) -> Result<(), PublishError> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((name.to_string(), payload.clone()));
        Ok(())
    }
}
