//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the websocket relay endpoint and a health probe under a
//! single Axum router. When a static directory is configured, the browser
//! bundle (markup, stylesheet, wasm) is served from it as the fallback.

pub mod ws;

use std::path::Path;

use axum::Router;
use axum::extract::State;
use axum::routing::get;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Relay routes plus optional static files.
pub fn app(state: AppState, static_dir: Option<&Path>) -> Router {
    let router = Router::new()
        .route("/ws", get(ws::handle_ws))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true)),
        None => router,
    }
}

/// Liveness probe. The body reports how many peers are connected.
async fn healthz(State(state): State<AppState>) -> String {
    let peers = crate::services::relay::peer_count(&state).await;
    format!("ok peers={peers}\n")
}
