//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::attempt::AttemptOutcome;
use crate::error::DragDropError;
use crate::learner::LearnerView;
use crate::logic;
use crate::protocol::*;
use crate::state::AppState;

impl IntoResponse for DragDropError {
  fn into_response(self) -> Response {
    let status = StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    warn!(target: "dragdrop_backend", kind = self.kind(), %status, error = %self, "Request rejected");
    let body = ErrorOut { success: false, kind: self.kind().to_string(), error: self.to_string() };
    (status, Json(body)).into_response()
  }
}

type ApiResult<T> = Result<Json<T>, DragDropError>;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_configuration(
  State(state): State<Arc<AppState>>,
  Path(problem_id): Path<String>,
) -> ApiResult<ConfigurationOut> {
  let cfg = logic::configuration(&state, &problem_id).await?;
  info!(target: "dragdrop_backend", %problem_id, items = cfg.items.len(), "HTTP configuration served");
  Ok(Json(cfg))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_put_problem(
  State(state): State<Arc<AppState>>,
  Path(problem_id): Path<String>,
  Json(body): Json<AuthorSubmissionIn>,
) -> ApiResult<ResultOut> {
  Ok(Json(logic::update_problem(&state, &problem_id, body).await?))
}

#[instrument(level = "info", skip(state, body), fields(item = body.val, zone = %body.zone))]
pub async fn http_post_drop_item(
  State(state): State<Arc<AppState>>,
  Path((problem_id, learner_id)): Path<(String, String)>,
  Json(body): Json<DropItemIn>,
) -> ApiResult<DropItemOut> {
  let out = logic::drop_item(&state, &problem_id, &learner_id, body).await?;
  info!(target: "dragdrop_backend", %problem_id, %learner_id, deferred = matches!(out, DropItemOut::Acknowledged(_)), "HTTP drop_item handled");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_do_attempt(
  State(state): State<Arc<AppState>>,
  Path((problem_id, learner_id)): Path<(String, String)>,
) -> ApiResult<AttemptOutcome> {
  let out = logic::do_attempt(&state, &problem_id, &learner_id).await?;
  info!(target: "dragdrop_backend", %problem_id, %learner_id, num_attempts = out.num_attempts, misplaced = out.misplaced_items.len(), "HTTP do_attempt evaluated");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_state(
  State(state): State<Arc<AppState>>,
  Path((problem_id, learner_id)): Path<(String, String)>,
) -> ApiResult<LearnerView> {
  Ok(Json(logic::learner_state(&state, &problem_id, &learner_id).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_reset(
  State(state): State<Arc<AppState>>,
  Path((problem_id, learner_id)): Path<(String, String)>,
) -> ApiResult<LearnerView> {
  let view = logic::reset(&state, &problem_id, &learner_id).await?;
  info!(target: "dragdrop_backend", %problem_id, %learner_id, "HTTP reset done");
  Ok(Json(view))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_publish_event(
  State(state): State<Arc<AppState>>,
  Path((problem_id, learner_id)): Path<(String, String)>,
  Json(body): Json<Value>,
) -> ApiResult<ResultOut> {
  Ok(Json(logic::publish_event(&state, &problem_id, &learner_id, body).await?))
}

#[instrument(level = "info", skip(state, body), fields(url_len = body.url.len()))]
pub async fn http_expand_static_url(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ExpandUrl>,
) -> Json<ExpandUrl> {
  Json(logic::expand_static_url(&state, &body.url))
}
