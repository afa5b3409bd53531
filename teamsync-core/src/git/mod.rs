//! Git operations for teamsync
//!
//! The synchronizer talks to git only through [`VersionControlClient`], so it
//! can be exercised against a fake. [`GitCli`] is the implementation that
//! shells out to the git executable.

mod cli;

use std::path::Path;

use crate::Result;

pub use cli::GitCli;

/// The narrow set of version-control operations the synchronizer needs
///
/// All calls block until the underlying command finishes. No timeout is
/// applied.
pub trait VersionControlClient: Send + Sync {
    /// Check whether `path` is inside a git working tree
    fn is_repository(&self, path: &Path) -> bool;

    /// Read the URL of the tracked remote, `None` when it is not configured
    fn current_remote_url(&self, path: &Path) -> Option<String>;

    /// Fetch remote tags and prune tags deleted upstream
    fn fetch_tags(&self, path: &Path) -> Result<()>;

    /// Check whether the local repository has at least one tag
    fn has_tag(&self, path: &Path) -> Result<bool>;

    /// Clone `url` into `path`, which must be absent or empty
    fn clone_repo(&self, url: &str, path: &Path) -> Result<()>;

    /// Pull the tracked branch from the tracked remote into `path`
    fn pull(&self, path: &Path) -> Result<()>;
}
