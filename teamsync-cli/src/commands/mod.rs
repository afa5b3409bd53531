//! CLI command implementations

pub mod serve;
pub mod sync;

pub use serve::ServeArgs;
pub use sync::SyncArgs;

use std::sync::Arc;

use teamsync_core::{Config, GitCli, RecordSource, SyncPass, Synchronizer};
use teamsync_store::RealtimeDbClient;

/// Build the realtime database source from the store configuration
pub fn store_source(config: &Config) -> anyhow::Result<Arc<dyn RecordSource>> {
    let client = RealtimeDbClient::from_config(&config.store)?;
    Ok(Arc::new(client))
}

/// Wire a pass runner around `source` using the process-backed git client
pub fn build_pass(config: &Config, source: Arc<dyn RecordSource>) -> anyhow::Result<SyncPass> {
    let git = GitCli::from_config(&config.git);
    if !git.is_available() {
        anyhow::bail!(
            "git executable not found at '{}'. Is git installed?",
            config.git.git_path
        );
    }

    Ok(SyncPass::new(source, Synchronizer::new(Arc::new(git))))
}
