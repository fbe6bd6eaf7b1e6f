//! Error taxonomy shared by the grading core and the request layer.
//!
//! Every variant maps to a stable `kind` string and an HTTP-equivalent status so
//! both transports (HTTP and WebSocket) report failures the same way.

use thiserror::Error;

/// Failures surfaced to callers of the drag-and-drop actions.
///
/// Validation always happens before any learner state is touched, so receiving
/// one of these means the learner record was left as it was.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DragDropError {
    /// Authored data is missing required top-level keys or is otherwise unusable.
    #[error("malformed problem definition: {0}")]
    MalformedDefinition(String),

    /// The client referenced a zone uid that is not part of the definition.
    #[error("Item zone data invalid: unknown zone '{0}'")]
    InvalidZoneReference(String),

    /// The client referenced an item id that is not part of the definition.
    #[error("Item data invalid: unknown item {0}")]
    InvalidItemReference(i64),

    /// The action is not available in the problem's mode.
    #[error("{0}")]
    ModeViolation(String),

    /// No attempts remain for this learner.
    #[error("Max number of attempts reached")]
    AttemptsExhausted,

    #[error("unknown problem '{0}'")]
    UnknownProblem(String),

    /// The host rejected an event for a reason other than lack of support.
    #[error("event publication failed: {0}")]
    Publish(String),

    #[error("learner record could not be stored: {0}")]
    Storage(String),
}

impl DragDropError {
    /// Stable machine-readable identifier.
    pub fn kind(&self) -> &'static str {
        match self {
            DragDropError::MalformedDefinition(_) => "malformed_definition",
            DragDropError::InvalidZoneReference(_) => "invalid_zone_reference",
            DragDropError::InvalidItemReference(_) => "invalid_item_reference",
            DragDropError::ModeViolation(_) => "mode_violation",
            DragDropError::AttemptsExhausted => "attempts_exhausted",
            DragDropError::UnknownProblem(_) => "unknown_problem",
            DragDropError::Publish(_) => "publish_failed",
            DragDropError::Storage(_) => "storage_failed",
        }
    }

    /// HTTP-equivalent status code.
    pub fn status(&self) -> u16 {
        match self {
            DragDropError::MalformedDefinition(_)
            | DragDropError::InvalidZoneReference(_)
            | DragDropError::InvalidItemReference(_)
            | DragDropError::ModeViolation(_) => 400,
            DragDropError::AttemptsExhausted => 409,
            DragDropError::UnknownProblem(_) => 404,
            DragDropError::Publish(_) => 502,
            DragDropError::Storage(_) => 500,
        }
    }
}
