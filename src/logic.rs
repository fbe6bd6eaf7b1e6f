//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Learner actions (drop item, submit attempt, view, reset) run as one
//!     load-act-save cycle on the learner record
//!   - The learner-facing configuration view
//!   - Generic analytics passthrough, author submissions and asset URL expansion

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::attempt::{AttemptController, AttemptOutcome, ItemDrop};
use crate::error::DragDropError;
use crate::events::PublishError;
use crate::learner::{learner_owner, LearnerState, LearnerView};
use crate::protocol::{AuthorSubmissionIn, ConfigItemOut, ConfigurationOut, DropItemIn, DropItemOut, ExpandUrl, ResultOut};
use crate::state::{build_problem, AppState};
use crate::util::trunc_for_log;

/// Background shown when the author did not upload one.
pub const DEFAULT_BACKGROUND: &str = "public/img/triangle.png";

/// Run one action against a learner's record. The record is saved only when
/// the action succeeds.
async fn with_learner<T>(
  state: &AppState,
  problem_id: &str,
  learner_id: &str,
  save: bool,
  action: impl FnOnce(&AttemptController<'_>, &mut LearnerState) -> Result<T, DragDropError>,
) -> Result<T, DragDropError> {
  let problem = state.get_problem(problem_id).await?;
  let _guard = state.lock_learners().await;

  let owner = learner_owner(problem_id, learner_id);
  let mut learner = LearnerState::load(state.store.as_ref(), &owner);
  let ctl = AttemptController::new(&problem.definition, problem.settings.grading(), state.publisher.as_ref());
  let out = action(&ctl, &mut learner)?;
  if save {
    learner.save(state.store.as_ref(), &owner)?;
  }
  Ok(out)
}

#[instrument(level = "info", skip(state, body), fields(%problem_id, %learner_id, item = body.val, zone = %body.zone))]
pub async fn drop_item(state: &AppState, problem_id: &str, learner_id: &str, body: DropItemIn) -> Result<DropItemOut, DragDropError> {
  let outcome = with_learner(state, problem_id, learner_id, true, |ctl, learner| {
    ctl.submit_placement(learner, &ItemDrop::from(body))
  })
  .await?;
  Ok(outcome.into())
}

#[instrument(level = "info", skip(state), fields(%problem_id, %learner_id))]
pub async fn do_attempt(state: &AppState, problem_id: &str, learner_id: &str) -> Result<AttemptOutcome, DragDropError> {
  with_learner(state, problem_id, learner_id, true, |ctl, learner| ctl.submit_attempt(learner)).await
}

#[instrument(level = "info", skip(state), fields(%problem_id, %learner_id))]
pub async fn learner_state(state: &AppState, problem_id: &str, learner_id: &str) -> Result<LearnerView, DragDropError> {
  with_learner(state, problem_id, learner_id, false, |ctl, learner| Ok(ctl.learner_view(learner))).await
}

#[instrument(level = "info", skip(state), fields(%problem_id, %learner_id))]
pub async fn reset(state: &AppState, problem_id: &str, learner_id: &str) -> Result<LearnerView, DragDropError> {
  with_learner(state, problem_id, learner_id, true, |ctl, learner| Ok(ctl.reset(learner))).await
}

/// Everything the learner UI needs to render the problem, minus answers and
/// the final feedback.
#[instrument(level = "info", skip(state), fields(%problem_id))]
pub async fn configuration(state: &AppState, problem_id: &str) -> Result<ConfigurationOut, DragDropError> {
  let problem = state.get_problem(problem_id).await?;
  let def = &problem.definition;
  let settings = &problem.settings;
  let assets = state.assets.as_ref();

  let items = def
    .items
    .iter()
    .map(|it| ConfigItemOut {
      id: it.id,
      display_name: it.display_name.clone(),
      image_url: it.image_url.clone(),
      expanded_image_url: if it.image_url.is_empty() { String::new() } else { assets.expand(&it.image_url) },
      extra: it.extra.clone(),
    })
    .collect();

  let target_img_expanded_url = match &def.target_img {
    Some(img) => assets.expand(img),
    None => assets.local_resource(DEFAULT_BACKGROUND),
  };

  Ok(ConfigurationOut {
    mode: settings.mode,
    max_attempts: settings.max_attempts,
    zones: def.zones.clone(),
    display_zone_labels: def.display_labels,
    display_zone_borders: def.display_borders,
    items,
    title: settings.display_name.clone(),
    show_title: settings.show_title,
    problem_text: settings.question_text.clone(),
    show_problem_header: settings.show_question_header,
    target_img_expanded_url,
    target_img_description: def.target_img_description.clone(),
    item_background_color: Some(settings.item_background_color.clone()).filter(|c| !c.is_empty()),
    item_text_color: Some(settings.item_text_color.clone()).filter(|c| !c.is_empty()),
    initial_feedback: def.feedback.start.clone(),
  })
}

/// Forward a client-side analytics event raised on one problem. The event
/// name travels in `event_type`.
#[instrument(level = "info", skip(state, data), fields(%problem_id, %learner_id))]
pub async fn publish_event(state: &AppState, problem_id: &str, learner_id: &str, data: Value) -> Result<ResultOut, DragDropError> {
  state.get_problem(problem_id).await?;
  let mut payload = match data {
    Value::Object(map) => map,
    other => {
      warn!(target: "dragdrop_backend", payload = %trunc_for_log(&other.to_string(), 200), "Event payload is not an object");
      return Ok(ResultOut::error("Missing event_type in JSON data"));
    }
  };
  let event_type = match payload.remove("event_type") {
    Some(Value::String(name)) => name,
    _ => return Ok(ResultOut::error("Missing event_type in JSON data")),
  };

  match state.publisher.publish(&event_type, &Value::Object(payload)) {
    Ok(()) => {
      info!(target: "dragdrop_backend", %problem_id, %learner_id, %event_type, "Client event published");
      Ok(ResultOut::success())
    }
    Err(PublishError::NotSupported) => {
      debug!(target: "dragdrop_backend", %event_type, "Host does not publish events; ignoring");
      Ok(ResultOut::success())
    }
    Err(PublishError::Failed(msg)) => Err(DragDropError::Publish(msg)),
  }
}

/// Replace a problem's settings and data. The data is normalized first; a
/// malformed submission leaves the current problem in place.
#[instrument(level = "info", skip(state, body), fields(%problem_id, mode = ?body.mode))]
pub async fn update_problem(state: &AppState, problem_id: &str, body: AuthorSubmissionIn) -> Result<ResultOut, DragDropError> {
  let problem = build_problem(problem_id, body.settings(), &body.data)?;
  info!(
    target: "dragdrop_backend",
    %problem_id,
    zones = problem.definition.zones.len(),
    items = problem.definition.items.len(),
    "Problem updated by author"
  );
  state.insert_problem(problem).await;
  Ok(ResultOut::success())
}

pub fn expand_static_url(state: &AppState, url: &str) -> ExpandUrl {
  ExpandUrl { url: state.assets.expand(url) }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::ServiceConfig;
  use crate::events::{MemoryPublisher, GRADE_EVENT};
  use crate::seeds::{DEMO_ASSESSMENT_ID, DEMO_PROBLEM_ID};
  use crate::store::MemoryFieldStore;
  use serde_json::json;
  use std::sync::Arc;

  fn app() -> (AppState, Arc<MemoryPublisher>) {
    let publisher = Arc::new(MemoryPublisher::new());
    let state = AppState::with_collaborators(&ServiceConfig::default(), Arc::new(MemoryFieldStore::new()), publisher.clone());
    (state, publisher)
  }

  fn drop_on(val: i64, zone: &str) -> DropItemIn {
    DropItemIn { val, zone: zone.into(), x_percent: "10%".into(), y_percent: "20%".into() }
  }

  #[tokio::test]
  async fn test_state_persists_between_actions() {
    let (state, publisher) = app();
    for (val, zone) in [(0, "top"), (1, "middle"), (2, "bottom")] {
      drop_item(&state, DEMO_PROBLEM_ID, "ada", drop_on(val, zone)).await.unwrap();
    }
    let view = learner_state(&state, DEMO_PROBLEM_ID, "ada").await.unwrap();
    assert!(view.finished);
    assert_eq!(view.items.len(), 3);
    assert_eq!(view.overall_feedback, "Good work! You have completed this drag and drop problem.");
    assert_eq!(publisher.named(GRADE_EVENT).len(), 1);

    // Another learner is independent.
    let other = learner_state(&state, DEMO_PROBLEM_ID, "bob").await.unwrap();
    assert!(other.items.is_empty());
    assert_eq!(other.overall_feedback, "Drag the items onto the image above.");
  }

  #[tokio::test]
  async fn test_failed_action_is_not_saved() {
    let (state, _) = app();
    drop_item(&state, DEMO_ASSESSMENT_ID, "ada", drop_on(0, "middle")).await.unwrap();
    let err = drop_item(&state, DEMO_ASSESSMENT_ID, "ada", drop_on(1, "nowhere")).await.unwrap_err();
    assert_eq!(err.kind(), "invalid_zone_reference");
    let view = learner_state(&state, DEMO_ASSESSMENT_ID, "ada").await.unwrap();
    assert_eq!(view.items.len(), 1);
  }

  #[tokio::test]
  async fn test_configuration_hides_answers() {
    let (state, _) = app();
    let cfg = configuration(&state, DEMO_PROBLEM_ID).await.unwrap();
    let json = serde_json::to_value(&cfg).unwrap();
    for item in json["items"].as_array().unwrap() {
      assert!(item.get("zones").is_none());
      assert!(item.get("feedback").is_none());
    }
    assert_eq!(json["initial_feedback"], "Drag the items onto the image above.");
    assert!(!json.to_string().contains("Good work!"));
    assert_eq!(json["target_img_expanded_url"], "/static/public/img/triangle.png");
    assert_eq!(json["item_background_color"], Value::Null);
  }

  #[tokio::test]
  async fn test_publish_event_requires_event_type() {
    let (state, publisher) = app();
    let missing = publish_event(&state, DEMO_PROBLEM_ID, "ada", json!({"x": 1})).await.unwrap();
    assert_eq!(missing, ResultOut::error("Missing event_type in JSON data"));

    let ok = publish_event(
      &state,
      DEMO_PROBLEM_ID,
      "ada",
      json!({"event_type": "edx.drag_and_drop_v2.feedback.opened", "content": "hi"}),
    )
    .await
    .unwrap();
    assert_eq!(ok, ResultOut::success());
    assert_eq!(publisher.named("edx.drag_and_drop_v2.feedback.opened"), vec![json!({"content": "hi"})]);
  }

  #[tokio::test]
  async fn test_publish_event_requires_known_problem() {
    let (state, publisher) = app();
    let err = publish_event(&state, "nope", "ada", json!({"event_type": "edx.drag_and_drop_v2.feedback.opened"}))
      .await
      .unwrap_err();
    assert_eq!(err, DragDropError::UnknownProblem("nope".into()));
    assert!(publisher.events().is_empty());
  }

  #[tokio::test]
  async fn test_malformed_author_update_keeps_problem() {
    let (state, _) = app();
    let body: AuthorSubmissionIn = serde_json::from_value(json!({
      "display_name": "Broken", "mode": "standard", "show_title": true, "problem_text": "",
      "show_problem_header": true, "weight": 1.0, "data": {"zones": []}
    }))
    .unwrap();
    let err = update_problem(&state, DEMO_PROBLEM_ID, body).await.unwrap_err();
    assert!(matches!(err, DragDropError::MalformedDefinition(_)));
    let problem = state.get_problem(DEMO_PROBLEM_ID).await.unwrap();
    assert_eq!(problem.settings.display_name, "Drag and Drop");
  }
}
