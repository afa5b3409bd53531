//! Process-backed git client

use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Output};

use tracing::debug;

use super::VersionControlClient;
use crate::config::GitConfig;
use crate::{Error, Result};

/// Git client that runs the git executable for every operation
#[derive(Debug, Clone)]
pub struct GitCli {
    /// Path to the git executable
    git_path: String,
    /// Remote compared against and pulled from
    remote: String,
    /// Branch pulled into existing working trees
    branch: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::from_config(&GitConfig::default())
    }
}

impl GitCli {
    /// Create a client with default settings (`git`, `origin`, `main`)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client from the git section of the configuration
    pub fn from_config(config: &GitConfig) -> Self {
        Self {
            git_path: config.git_path.clone(),
            remote: config.remote.clone(),
            branch: config.branch.clone(),
        }
    }

    /// Set a custom path to the git executable
    pub fn with_git_path(mut self, path: impl Into<String>) -> Self {
        self.git_path = path.into();
        self
    }

    /// Check if the git executable can be run
    pub fn is_available(&self) -> bool {
        Command::new(&self.git_path)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// Run git with `args`, optionally inside `dir` via `-C`
    ///
    /// Returns the output of a successful command. A non-zero exit becomes
    /// [`Error::Git`] carrying the captured stderr.
    fn run<I, S>(&self, dir: Option<&Path>, args: I) -> Result<Output>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<_> = args.into_iter().map(|a| a.as_ref().to_os_string()).collect();
        let subcommand = args
            .first()
            .map(|a| a.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut cmd = Command::new(&self.git_path);
        if let Some(dir) = dir {
            cmd.arg("-C").arg(dir);
        }
        cmd.args(&args);

        debug!(command = ?cmd, "Running git");

        let output = cmd
            .output()
            .map_err(|e| Error::Other(format!("Failed to run git {}: {}", subcommand, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            return Err(Error::Git {
                command: subcommand,
                stderr,
            });
        }

        Ok(output)
    }
}

impl VersionControlClient for GitCli {
    fn is_repository(&self, path: &Path) -> bool {
        self.run(Some(path), ["rev-parse", "--is-inside-work-tree"])
            .is_ok()
    }

    fn current_remote_url(&self, path: &Path) -> Option<String> {
        let key = format!("remote.{}.url", self.remote);
        let output = self.run(Some(path), ["config", "--get", key.as_str()]).ok()?;
        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn fetch_tags(&self, path: &Path) -> Result<()> {
        self.run(Some(path), ["fetch", "--tags", "--prune"])?;
        self.run(
            Some(path),
            [
                "fetch",
                "--prune",
                self.remote.as_str(),
                "+refs/tags/*:refs/tags/*",
            ],
        )?;
        debug!(path = %path.display(), "Fetched and pruned tags");
        Ok(())
    }

    fn has_tag(&self, path: &Path) -> Result<bool> {
        let output = self.run(Some(path), ["tag"])?;
        Ok(!String::from_utf8_lossy(&output.stdout).trim().is_empty())
    }

    fn clone_repo(&self, url: &str, path: &Path) -> Result<()> {
        self.run(None, [OsStr::new("clone"), OsStr::new(url), path.as_os_str()])?;
        Ok(())
    }

    fn pull(&self, path: &Path) -> Result<()> {
        self.run(
            Some(path),
            ["pull", self.remote.as_str(), self.branch.as_str()],
        )?;
        Ok(())
    }
}
