//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws` (bound to one problem + learner via query string)
/// - REST-ish API under `/api/v1/...`
/// - Bundled static files under `/static`
/// - CORS (allow any origin/method/headers), adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let learner = "/api/v1/problems/:problem_id/learners/:learner_id";

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/expand_static_url", post(http::http_expand_static_url))
        .route("/api/v1/problems/:problem_id", axum::routing::put(http::http_put_problem))
        .route("/api/v1/problems/:problem_id/configuration", get(http::http_get_configuration))
        .route(&format!("{learner}/drop_item"), post(http::http_post_drop_item))
        .route(&format!("{learner}/do_attempt"), post(http::http_post_do_attempt))
        .route(&format!("{learner}/state"), get(http::http_get_state))
        .route(&format!("{learner}/reset"), post(http::http_post_reset))
        .route(&format!("{learner}/publish_event"), post(http::http_post_publish_event))
        .nest_service("/static", ServeDir::new("./static"))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
}
