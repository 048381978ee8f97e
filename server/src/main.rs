mod config;
mod routes;
mod services;
mod state;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load `.env` before the subscriber so `RUST_LOG` can come from it.
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "server=info,tower_http=info".into()),
        )
        .init();

    match dotenv {
        Ok(path) => tracing::info!(path = %path.display(), "loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "ignoring unreadable environment file"),
    }

    let config = config::RelayConfig::from_env().expect("invalid relay configuration");
    let state = state::AppState::new(config.peer_queue_capacity);
    let app = routes::app(state, config.static_dir.as_deref());

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");

    tracing::info!(%addr, static_dir = ?config.static_dir, "relay listening");
    axum::serve(listener, app).await.expect("server failed");
}
