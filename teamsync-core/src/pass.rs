//! A full synchronization pass: fetch, normalize, sync each record, aggregate

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::records::{RawRecord, RecordTree, TeamRecord};
use crate::source::RecordSource;
use crate::sync::{SyncResult, Synchronizer};
use crate::{Error, Result};

/// Synchronize every record in order and collect one result per record
pub fn aggregate<I>(records: I, synchronizer: &Synchronizer) -> Vec<SyncResult>
where
    I: IntoIterator<Item = RawRecord>,
{
    records
        .into_iter()
        .map(|raw| synchronizer.sync(&TeamRecord::from_raw(&raw)))
        .collect()
}

/// Runs synchronization passes against a record source
///
/// Passes are serialized: a second caller waits until the running pass has
/// finished, so a team directory is only ever touched by one pass.
pub struct SyncPass {
    source: Arc<dyn RecordSource>,
    synchronizer: Synchronizer,
    running: Arc<Mutex<()>>,
}

impl std::fmt::Debug for SyncPass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncPass")
            .field("source", &self.source.label())
            .finish_non_exhaustive()
    }
}

impl SyncPass {
    /// Create a pass runner
    pub fn new(source: Arc<dyn RecordSource>, synchronizer: Synchronizer) -> Self {
        Self {
            source,
            synchronizer,
            running: Arc::new(Mutex::new(())),
        }
    }

    /// Run one full pass
    ///
    /// Fails as a whole only when the source cannot be read, holds no data,
    /// or holds something that is neither a list nor a map. The per-record
    /// work runs on the blocking pool and keeps going if the caller goes away.
    pub async fn run(&self) -> Result<Vec<SyncResult>> {
        let guard = Arc::clone(&self.running).lock_owned().await;

        let tree = self.source.fetch_tree().await?;
        let records = match RecordTree::decode(tree).into_records() {
            Ok(records) => records,
            Err(e) => {
                warn!(source = %self.source.label(), error = %e, "Cannot synchronize");
                return Err(e);
            }
        };

        let synchronizer = self.synchronizer.clone();
        let results = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            aggregate(records, &synchronizer)
        })
        .await
        .map_err(|e| Error::Other(format!("Synchronization pass aborted: {}", e)))?;

        let succeeded = results.iter().filter(|r| r.status.is_success()).count();
        info!(
            teams = results.len(),
            succeeded,
            failed = results.len() - succeeded,
            "Synchronization pass finished"
        );

        Ok(results)
    }
}
