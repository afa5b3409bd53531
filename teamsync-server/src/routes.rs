//! Route handlers

use axum::{extract::State, http::StatusCode, Json};
use teamsync_core::SyncResult;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// Fixed landing text
pub async fn home() -> &'static str {
    "Welcome"
}

/// Browsers ask for a favicon; answer with no content
pub async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Run a full synchronization pass and return one result per team
pub async fn pull_and_transfer(
    State(state): State<AppState>,
) -> Result<Json<Vec<SyncResult>>, ApiError> {
    info!("Synchronization pass requested");

    match state.pass.run().await {
        Ok(results) => Ok(Json(results)),
        Err(e) => {
            warn!(error = %e, "Synchronization pass failed");
            Err(e.into())
        }
    }
}
