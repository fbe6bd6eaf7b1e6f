//! WebSocket upgrade + message loop. A connection is bound to one problem and
//! one learner (`/ws?problem=<id>&learner=<id>`); anonymous connections get a
//! fresh learner id. Each client message is parsed as JSON and forwarded to
//! core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    Query, State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use serde::Deserialize;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::error::DragDropError;
use crate::logic;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::seeds::DEMO_PROBLEM_ID;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
  pub problem: Option<String>,
  pub learner: Option<String>,
}

#[instrument(level = "info", skip(ws, state))]
pub async fn ws_upgrade(
  ws: WebSocketUpgrade,
  State(state): State<Arc<AppState>>,
  Query(q): Query<WsQuery>,
) -> impl IntoResponse {
  let problem_id = q.problem.unwrap_or_else(|| DEMO_PROBLEM_ID.to_string());
  let learner_id = q.learner.unwrap_or_else(|| format!("anon-{}", Uuid::new_v4()));
  info!(target: "dragdrop_backend", %problem_id, %learner_id, "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state, problem_id, learner_id))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>, problem_id: String, learner_id: String) {
  info!(target: "dragdrop_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "dragdrop_backend", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state, &problem_id, &learner_id).await
          }
          Err(e) => ServerWsMessage::Error { kind: "invalid_json".into(), message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "kind": "serialization", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "dragdrop_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "dragdrop_backend", "WebSocket disconnected");
}

fn ws_error(e: DragDropError) -> ServerWsMessage {
  ServerWsMessage::Error { kind: e.kind().into(), message: e.to_string() }
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState, problem_id: &str, learner_id: &str) -> ServerWsMessage {
  let reply = match msg {
    ClientWsMessage::Ping => Ok(ServerWsMessage::Pong),

    ClientWsMessage::DropItem(body) => logic::drop_item(state, problem_id, learner_id, body)
      .await
      .map(|result| ServerWsMessage::DropResult { result }),

    ClientWsMessage::DoAttempt => logic::do_attempt(state, problem_id, learner_id)
      .await
      .map(ServerWsMessage::AttemptResult),

    ClientWsMessage::GetState => logic::learner_state(state, problem_id, learner_id)
      .await
      .map(|state| ServerWsMessage::State { state }),

    ClientWsMessage::Reset => logic::reset(state, problem_id, learner_id)
      .await
      .map(|state| ServerWsMessage::State { state }),

    ClientWsMessage::GetConfiguration => logic::configuration(state, problem_id)
      .await
      .map(|configuration| ServerWsMessage::Configuration { configuration }),

    ClientWsMessage::PublishEvent { data } => logic::publish_event(state, problem_id, learner_id, data)
      .await
      .map(ServerWsMessage::EventResult),
  };
  reply.unwrap_or_else(ws_error)
}
