//! Application state shared by handlers

use std::sync::Arc;

use teamsync_core::SyncPass;

/// Application state containing the pass runner
#[derive(Clone, Debug)]
pub struct AppState {
    pub pass: Arc<SyncPass>,
}

impl AppState {
    /// Create state around a pass runner
    pub fn new(pass: SyncPass) -> Self {
        Self {
            pass: Arc::new(pass),
        }
    }
}
