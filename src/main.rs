//! Drag-and-drop grading backend
//!
//! - Axum HTTP + WebSocket API
//! - Problems from TOML config (DND_CONFIG_PATH) plus built-in demos
//! - In-memory learner records; grade/analytics events to the log
//!
//! Important env variables:
//!   PORT            : u16 (default 3000)
//!   DND_CONFIG_PATH : path to TOML config (server options + problem bank)
//!   LOG_LEVEL       : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT      : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use dragdrop_backend::routes::build_router;
use dragdrop_backend::state::AppState;
use dragdrop_backend::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Problem registry, learner store and event publisher.
  let state = Arc::new(AppState::new());

  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "dragdrop_backend", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(async {
      let _ = tokio::signal::ctrl_c().await;
      info!(target: "dragdrop_backend", "Shutdown signal received");
    })
    .await?;
  Ok(())
}
