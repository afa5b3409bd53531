//! Per-team repository synchronization
//!
//! For each team record the synchronizer makes sure `local_path/name` is a
//! clone of the record's repository:
//!
//! - a repository with any tag is frozen and left untouched
//! - a repository tracking a different URL is deleted and cloned again
//! - a repository tracking the same URL is pulled
//! - anything that is not a repository is deleted and cloned
//!
//! Every failure is reported in the team's [`SyncResult`] and never aborts
//! processing of other teams.

use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{info, warn};

use crate::git::VersionControlClient;
use crate::records::TeamRecord;
use crate::{Error, Result};

/// Outcome of synchronizing one team
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    /// Cloned or pulled successfully
    Success,
    /// The local repository has tags and was not touched
    SkippedTagged,
    /// The record lacks a repository URL or base path
    MissingFields,
    /// The team directory could not be created
    DirectoryError(String),
    /// A git command failed; carries its stderr
    GitError(String),
    /// Any other failure
    Unexpected(String),
}

impl SyncStatus {
    /// Whether the team's repository is in its desired state
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success | Self::SkippedTagged)
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "Success"),
            Self::SkippedTagged => write!(f, "Skipped due to the presence of tags"),
            Self::MissingFields => write!(f, "Missing repository URL or local path"),
            Self::DirectoryError(detail) => write!(f, "Error creating directory: {}", detail),
            Self::GitError(stderr) => write!(f, "Error: {}", stderr),
            Self::Unexpected(message) => write!(f, "Unexpected error: {}", message),
        }
    }
}

/// Result for one team, serialized as `{"<team_name>": "<status>"}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResult {
    /// Name of the team
    pub team_name: String,
    /// What happened to the team's repository
    pub status: SyncStatus,
}

impl SyncResult {
    /// Create a result
    pub fn new(team_name: impl Into<String>, status: SyncStatus) -> Self {
        Self {
            team_name: team_name.into(),
            status,
        }
    }
}

impl Serialize for SyncResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.team_name, &self.status.to_string())?;
        map.end()
    }
}

/// What reconciliation did to an existing or new directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Cloned,
    Recloned,
    Pulled,
    SkippedTagged,
}

/// Reconciles team directories against their desired repository URL
#[derive(Clone)]
pub struct Synchronizer {
    vcs: Arc<dyn VersionControlClient>,
}

impl fmt::Debug for Synchronizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Synchronizer").finish_non_exhaustive()
    }
}

impl Synchronizer {
    /// Create a synchronizer backed by the given git client
    pub fn new(vcs: Arc<dyn VersionControlClient>) -> Self {
        Self { vcs }
    }

    /// Synchronize one team's repository
    pub fn sync(&self, record: &TeamRecord) -> SyncResult {
        let name = record.name.as_str();

        info!(
            team = %name,
            repository_url = ?record.repository_url,
            local_base_path = ?record.local_base_path,
            "Processing team"
        );

        let (Some(url), Some(base)) = (&record.repository_url, &record.local_base_path) else {
            warn!(team = %name, "Record is missing repository URL or local path");
            return SyncResult::new(name, SyncStatus::MissingFields);
        };

        let local_path = match team_dir(Path::new(base), name) {
            Ok(path) => path,
            Err(e) => {
                warn!(team = %name, error = %e, "Refusing team directory");
                return SyncResult::new(name, SyncStatus::DirectoryError(e.to_string()));
            }
        };

        if let Err(e) = fs::create_dir_all(&local_path) {
            warn!(team = %name, path = %local_path.display(), error = %e, "Error creating directory");
            return SyncResult::new(name, SyncStatus::DirectoryError(e.to_string()));
        }

        let status = match self.reconcile(name, url, &local_path) {
            Ok(action) => {
                info!(team = %name, action = ?action, "Team synchronized");
                match action {
                    Action::SkippedTagged => SyncStatus::SkippedTagged,
                    _ => SyncStatus::Success,
                }
            }
            Err(Error::Git { command, stderr }) => {
                warn!(team = %name, command = %command, stderr = %stderr, "Error processing team");
                SyncStatus::GitError(stderr)
            }
            Err(e) => {
                warn!(team = %name, error = %e, "Unexpected error");
                SyncStatus::Unexpected(e.to_string())
            }
        };

        SyncResult::new(name, status)
    }

    fn reconcile(&self, name: &str, url: &str, local_path: &Path) -> Result<Action> {
        if !self.vcs.is_repository(local_path) {
            info!(
                team = %name,
                path = %local_path.display(),
                "Not a valid git repository, cleaning up and cloning"
            );
            self.reclone(url, local_path)?;
            return Ok(Action::Cloned);
        }

        if self.has_any_tag(local_path) {
            info!(team = %name, "Repository has tags, skipping pull/clone");
            return Ok(Action::SkippedTagged);
        }

        let current = self.vcs.current_remote_url(local_path);
        if current.as_deref() != Some(url) {
            info!(
                team = %name,
                current = ?current,
                desired = %url,
                "Remote URL has changed, cleaning up and re-cloning"
            );
            self.reclone(url, local_path)?;
            return Ok(Action::Recloned);
        }

        info!(team = %name, "Pulling latest code");
        self.vcs.pull(local_path)?;
        Ok(Action::Pulled)
    }

    /// Fetch tags, then check for any. Fetch failures only get logged and a
    /// failed tag listing counts as no tags.
    fn has_any_tag(&self, local_path: &Path) -> bool {
        if let Err(e) = self.vcs.fetch_tags(local_path) {
            warn!(path = %local_path.display(), error = %e, "Failed to fetch and prune tags");
        }

        match self.vcs.has_tag(local_path) {
            Ok(tagged) => tagged,
            Err(e) => {
                warn!(
                    path = %local_path.display(),
                    error = %e,
                    "Listing tags failed, treating repository as untagged"
                );
                false
            }
        }
    }

    fn reclone(&self, url: &str, local_path: &Path) -> Result<()> {
        if local_path.exists() {
            fs::remove_dir_all(local_path)?;
        }
        fs::create_dir_all(local_path)?;

        info!(url = %url, path = %local_path.display(), "Cloning repository");
        self.vcs.clone_repo(url, local_path)
    }
}

/// Join the base path and team name, rejecting names that would escape the
/// base path or resolve to the base path itself
fn team_dir(base: &Path, name: &str) -> Result<PathBuf> {
    let escapes = name.is_empty()
        || Path::new(name).components().any(|c| {
            matches!(
                c,
                Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });

    if escapes {
        return Err(Error::Other(format!(
            "team name '{}' must stay inside {}",
            name,
            base.display()
        )));
    }

    Ok(base.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use crate::git::GitCli;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        FetchTags,
        Clone(String),
        Pull,
    }

    #[derive(Debug, Clone, Default)]
    struct FakeRepo {
        remote: Option<String>,
        tagged: bool,
    }

    /// In-memory git: repositories are keyed by path and marked on disk with a
    /// `.git` directory so deletions by the synchronizer are observable.
    #[derive(Default)]
    struct FakeVcs {
        repos: Mutex<HashMap<PathBuf, FakeRepo>>,
        calls: Mutex<Vec<Call>>,
        fail_fetch: bool,
        fail_tag_list: bool,
        clone_stderr: Option<String>,
        clone_error: Option<String>,
    }

    impl FakeVcs {
        fn with_repo(self, path: &Path, remote: Option<&str>, tagged: bool) -> Self {
            fs::create_dir_all(path.join(".git")).unwrap();
            self.repos.lock().unwrap().insert(
                path.to_path_buf(),
                FakeRepo {
                    remote: remote.map(str::to_string),
                    tagged,
                },
            );
            self
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl VersionControlClient for FakeVcs {
        fn is_repository(&self, path: &Path) -> bool {
            path.join(".git").exists() && self.repos.lock().unwrap().contains_key(path)
        }

        fn current_remote_url(&self, path: &Path) -> Option<String> {
            self.repos.lock().unwrap().get(path)?.remote.clone()
        }

        fn fetch_tags(&self, _path: &Path) -> Result<()> {
            self.record(Call::FetchTags);
            if self.fail_fetch {
                return Err(Error::Git {
                    command: "fetch".to_string(),
                    stderr: "fatal: unable to access remote".to_string(),
                });
            }
            Ok(())
        }

        fn has_tag(&self, path: &Path) -> Result<bool> {
            if self.fail_tag_list {
                return Err(Error::Git {
                    command: "tag".to_string(),
                    stderr: "fatal: broken".to_string(),
                });
            }
            Ok(self
                .repos
                .lock()
                .unwrap()
                .get(path)
                .map(|r| r.tagged)
                .unwrap_or(false))
        }

        fn clone_repo(&self, url: &str, path: &Path) -> Result<()> {
            self.record(Call::Clone(url.to_string()));
            if let Some(ref stderr) = self.clone_stderr {
                return Err(Error::Git {
                    command: "clone".to_string(),
                    stderr: stderr.clone(),
                });
            }
            if let Some(ref message) = self.clone_error {
                return Err(Error::Other(message.clone()));
            }
            assert!(
                fs::read_dir(path).unwrap().next().is_none(),
                "clone target must be empty"
            );
            fs::create_dir_all(path.join(".git")).unwrap();
            self.repos.lock().unwrap().insert(
                path.to_path_buf(),
                FakeRepo {
                    remote: Some(url.to_string()),
                    tagged: false,
                },
            );
            Ok(())
        }

        fn pull(&self, _path: &Path) -> Result<()> {
            self.record(Call::Pull);
            Ok(())
        }
    }

    fn record(base: &Path, name: &str, url: &str) -> TeamRecord {
        TeamRecord::new(name, url, base.to_str().unwrap())
    }

    fn run(vcs: &Arc<FakeVcs>, record: &TeamRecord) -> SyncResult {
        let dyn_vcs: Arc<dyn VersionControlClient> = vcs.clone();
        Synchronizer::new(dyn_vcs).sync(record)
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(SyncStatus::Success.to_string(), "Success");
        assert_eq!(
            SyncStatus::SkippedTagged.to_string(),
            "Skipped due to the presence of tags"
        );
        assert_eq!(
            SyncStatus::MissingFields.to_string(),
            "Missing repository URL or local path"
        );
        assert_eq!(
            SyncStatus::DirectoryError("denied".into()).to_string(),
            "Error creating directory: denied"
        );
        assert_eq!(SyncStatus::GitError("boom".into()).to_string(), "Error: boom");
        assert_eq!(
            SyncStatus::Unexpected("oops".into()).to_string(),
            "Unexpected error: oops"
        );
    }

    #[test]
    fn test_result_serializes_as_single_entry_map() {
        let result = SyncResult::new("Alpha", SyncStatus::Success);
        assert_eq!(serde_json::to_string(&result).unwrap(), r#"{"Alpha":"Success"}"#);
    }

    #[test]
    fn test_missing_fields_touch_nothing() {
        let base = TempDir::new().unwrap();
        let vcs = Arc::new(FakeVcs::default());

        let mut no_url = record(base.path(), "Alpha", "https://example/a.git");
        no_url.repository_url = None;
        let mut no_path = record(base.path(), "Beta", "https://example/b.git");
        no_path.local_base_path = None;

        for rec in [no_url, no_path] {
            let result = run(&vcs, &rec);
            assert_eq!(result.status, SyncStatus::MissingFields);
            assert!(!base.path().join(&rec.name).exists());
        }
        assert!(vcs.calls().is_empty());
    }

    #[test]
    fn test_fresh_directory_is_cloned() {
        let base = TempDir::new().unwrap();
        let vcs = Arc::new(FakeVcs::default());
        let rec = record(base.path(), "Alpha", "https://example/a.git");

        let result = run(&vcs, &rec);

        assert_eq!(result, SyncResult::new("Alpha", SyncStatus::Success));
        assert_eq!(vcs.calls(), vec![Call::Clone("https://example/a.git".into())]);
        assert!(vcs.is_repository(&base.path().join("Alpha")));
    }

    #[test]
    fn test_tagged_repository_is_skipped_even_when_url_differs() {
        let base = TempDir::new().unwrap();
        let local = base.path().join("Alpha");
        let vcs = Arc::new(FakeVcs::default().with_repo(&local, Some("https://old/a.git"), true));
        fs::write(local.join("keep.txt"), "local work").unwrap();

        let result = run(&vcs, &record(base.path(), "Alpha", "https://new/a.git"));

        assert_eq!(result.status, SyncStatus::SkippedTagged);
        assert_eq!(vcs.calls(), vec![Call::FetchTags]);
        assert!(local.join("keep.txt").exists());
    }

    #[test]
    fn test_same_url_is_pulled_without_deletion() {
        let base = TempDir::new().unwrap();
        let local = base.path().join("Alpha");
        let url = "https://example/a.git";
        let vcs = Arc::new(FakeVcs::default().with_repo(&local, Some(url), false));
        fs::write(local.join("keep.txt"), "local work").unwrap();

        let result = run(&vcs, &record(base.path(), "Alpha", url));

        assert_eq!(result.status, SyncStatus::Success);
        assert_eq!(vcs.calls(), vec![Call::FetchTags, Call::Pull]);
        assert!(local.join("keep.txt").exists());
    }

    #[test]
    fn test_changed_url_deletes_and_reclones() {
        let base = TempDir::new().unwrap();
        let local = base.path().join("Alpha");
        let vcs = Arc::new(FakeVcs::default().with_repo(&local, Some("https://old/a.git"), false));
        fs::write(local.join("keep.txt"), "local work").unwrap();

        let result = run(&vcs, &record(base.path(), "Alpha", "https://new/a.git"));

        assert_eq!(result.status, SyncStatus::Success);
        assert_eq!(
            vcs.calls(),
            vec![Call::FetchTags, Call::Clone("https://new/a.git".into())]
        );
        assert!(!local.join("keep.txt").exists());
        assert_eq!(
            vcs.current_remote_url(&local).as_deref(),
            Some("https://new/a.git")
        );
    }

    #[test]
    fn test_unset_remote_counts_as_changed() {
        let base = TempDir::new().unwrap();
        let local = base.path().join("Alpha");
        let vcs = Arc::new(FakeVcs::default().with_repo(&local, None, false));

        let result = run(&vcs, &record(base.path(), "Alpha", "https://example/a.git"));

        assert_eq!(result.status, SyncStatus::Success);
        assert_eq!(
            vcs.calls(),
            vec![Call::FetchTags, Call::Clone("https://example/a.git".into())]
        );
    }

    #[test]
    fn test_non_repository_directory_is_replaced() {
        let base = TempDir::new().unwrap();
        let local = base.path().join("Alpha");
        fs::create_dir_all(&local).unwrap();
        fs::write(local.join("stray.txt"), "junk").unwrap();
        let vcs = Arc::new(FakeVcs::default());

        let result = run(&vcs, &record(base.path(), "Alpha", "https://example/a.git"));

        assert_eq!(result.status, SyncStatus::Success);
        assert!(!local.join("stray.txt").exists());
        assert_eq!(vcs.calls(), vec![Call::Clone("https://example/a.git".into())]);
    }

    #[test]
    fn test_fetch_failure_is_not_fatal() {
        let base = TempDir::new().unwrap();
        let local = base.path().join("Alpha");
        let url = "https://example/a.git";
        let vcs = Arc::new(FakeVcs {
            fail_fetch: true,
            ..FakeVcs::default()
        }
        .with_repo(&local, Some(url), true));

        let result = run(&vcs, &record(base.path(), "Alpha", url));
        assert_eq!(result.status, SyncStatus::SkippedTagged);
    }

    #[test]
    fn test_tag_list_failure_means_untagged() {
        let base = TempDir::new().unwrap();
        let local = base.path().join("Alpha");
        let url = "https://example/a.git";
        let vcs = Arc::new(FakeVcs {
            fail_tag_list: true,
            ..FakeVcs::default()
        }
        .with_repo(&local, Some(url), true));

        let result = run(&vcs, &record(base.path(), "Alpha", url));
        assert_eq!(result.status, SyncStatus::Success);
        assert_eq!(vcs.calls(), vec![Call::FetchTags, Call::Pull]);
    }

    #[test]
    fn test_git_failure_reports_stderr() {
        let base = TempDir::new().unwrap();
        let vcs = Arc::new(FakeVcs {
            clone_stderr: Some("fatal: repository not found".to_string()),
            ..FakeVcs::default()
        });

        let result = run(&vcs, &record(base.path(), "Alpha", "https://example/a.git"));
        assert_eq!(
            result.status.to_string(),
            "Error: fatal: repository not found"
        );
    }

    #[test]
    fn test_non_git_failure_is_unexpected_error() {
        let base = TempDir::new().unwrap();
        let vcs = Arc::new(FakeVcs {
            clone_error: Some("Failed to run git clone: No such file or directory".to_string()),
            ..FakeVcs::default()
        });

        let result = run(&vcs, &record(base.path(), "Alpha", "https://example/a.git"));

        assert_eq!(result.team_name, "Alpha");
        assert!(matches!(result.status, SyncStatus::Unexpected(_)));
        assert_eq!(
            result.status.to_string(),
            "Unexpected error: Failed to run git clone: No such file or directory"
        );
        assert_eq!(vcs.calls(), vec![Call::Clone("https://example/a.git".to_string())]);
    }

    #[test]
    fn test_missing_git_executable_is_unexpected_error() {
        let base = TempDir::new().unwrap();
        let git = GitCli::new().with_git_path("/nonexistent/bin/git");
        let synchronizer = Synchronizer::new(Arc::new(git));

        let result = synchronizer.sync(&record(base.path(), "Alpha", "https://example/a.git"));

        assert_eq!(result.team_name, "Alpha");
        assert!(result
            .status
            .to_string()
            .starts_with("Unexpected error: Failed to run git clone"));
        assert!(!result.status.is_success());
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_creation_failure() {
        let base = TempDir::new().unwrap();
        let blocker = base.path().join("file");
        fs::write(&blocker, "not a directory").unwrap();
        let vcs = Arc::new(FakeVcs::default());

        let result = run(&vcs, &record(&blocker, "Alpha", "https://example/a.git"));

        assert!(matches!(result.status, SyncStatus::DirectoryError(_)));
        assert!(result.status.to_string().starts_with("Error creating directory: "));
        assert!(vcs.calls().is_empty());
    }

    #[test]
    fn test_team_name_cannot_escape_base() {
        let base = TempDir::new().unwrap();
        let vcs = Arc::new(FakeVcs::default());

        for name in ["../outside", "/absolute"] {
            let result = run(&vcs, &record(base.path(), name, "https://example/a.git"));
            assert!(matches!(result.status, SyncStatus::DirectoryError(_)));
        }
        assert!(vcs.calls().is_empty());
    }

    #[test]
    fn test_team_name_cannot_be_base_itself() {
        let base = TempDir::new().unwrap();
        let keep = base.path().join("notes.txt");
        fs::write(&keep, "keep me").unwrap();
        let vcs = Arc::new(FakeVcs::default());

        for name in [".", "./", ""] {
            let result = run(&vcs, &record(base.path(), name, "https://example/a.git"));
            assert!(matches!(result.status, SyncStatus::DirectoryError(_)), "{:?}", name);
        }

        assert!(vcs.calls().is_empty());
        assert_eq!(fs::read_to_string(&keep).unwrap(), "keep me");
    }

    #[test]
    fn test_team_dir_joins_name() {
        let path = team_dir(Path::new("/tmp/x"), "Alpha").unwrap();
        assert_eq!(path, PathBuf::from("/tmp/x/Alpha"));
    }
}
