//! teamsync Server - HTTP surface for teamsync
//!
//! Routes:
//! - `GET /` returns a fixed welcome text
//! - `GET /favicon.ico` returns 204 with no body
//! - `GET /pull_and_transfer` runs a synchronization pass and returns
//!   `[{"<team>": "<status>"}, ...]`, or `{"error": ...}` with 404 (no data),
//!   400 (unexpected structure) or 502 (store unreachable)

mod error;
mod routes;
mod state;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use error::ApiError;
pub use state::AppState;

/// Create the router with application state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::home))
        .route("/favicon.ico", get(routes::favicon))
        .route("/pull_and_transfer", get(routes::pull_and_transfer))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Serve `state` on `listener` until Ctrl+C or SIGTERM
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Starting server on {}", addr);
    }

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
