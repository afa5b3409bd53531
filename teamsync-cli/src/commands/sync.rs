//! Sync command - Run one synchronization pass from the command line

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use serde_json::Value;
use teamsync_core::{Config, RecordSource, StaticSource};

use super::{build_pass, store_source};

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Read the record tree from a JSON file instead of the database
    #[arg(short, long)]
    pub from_file: Option<PathBuf>,

    /// Pretty-print the JSON results
    #[arg(long)]
    pub pretty: bool,
}

impl SyncArgs {
    /// Execute the sync command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let source: Arc<dyn RecordSource> = match self.from_file {
            Some(ref path) => Arc::new(StaticSource::new(load_tree(path)?)),
            None => store_source(config)?,
        };

        let pass = build_pass(config, source)?;
        let results = pass.run().await?;

        let failed = results.iter().filter(|r| !r.status.is_success()).count();
        if failed > 0 {
            tracing::warn!(failed, total = results.len(), "Some teams failed to synchronize");
        }

        let output = if self.pretty {
            serde_json::to_string_pretty(&results)?
        } else {
            serde_json::to_string(&results)?
        };
        println!("{}", output);

        Ok(())
    }
}

/// Read a record tree from disk; a file holding `null` means no data
fn load_tree(path: &Path) -> anyhow::Result<Option<Value>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    let value: Value = serde_json::from_str(&contents)?;
    Ok(match value {
        Value::Null => None,
        other => Some(other),
    })
}
