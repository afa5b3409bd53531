//! Configuration management for teamsync
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (TEAMSYNC_*)
//! 3. Config file (~/.config/teamsync/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP server listens on
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
        }
    }
}

/// Document store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base URL of the realtime database
    pub database_url: String,

    /// Path of the team records inside the database
    pub records_path: String,

    /// Request timeout for store reads
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// File holding the database secret, one token on a single line
    ///
    /// Falls back to `~/.config/teamsync/store.token` when unset.
    pub token_file: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: "https://ai-in-music-default-rtdb.firebaseio.com/".to_string(),
            records_path: "/16O4emZAUibrcYEoLiwYb0bdLCYs-Y-nar3XhqtU3V4M/page1".to_string(),
            timeout: Duration::from_secs(30),
            token_file: None,
        }
    }
}

/// Git-related configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitConfig {
    /// Path to the git executable
    pub git_path: String,

    /// Remote that is compared against and pulled from
    pub remote: String,

    /// Branch pulled into existing working trees
    pub branch: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            git_path: "git".to_string(),
            remote: "origin".to_string(),
            branch: "main".to_string(),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Document store configuration
    pub store: StoreConfig,

    /// Git configuration
    pub git: GitConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/teamsync/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("teamsync").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - TEAMSYNC_BIND: Server listen address
    /// - TEAMSYNC_DATABASE_URL: Realtime database base URL
    /// - TEAMSYNC_RECORDS_PATH: Path of the team records
    /// - TEAMSYNC_GIT_PATH: Path to git executable
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(bind) = std::env::var("TEAMSYNC_BIND") {
            self.server.bind = bind;
        }

        if let Ok(url) = std::env::var("TEAMSYNC_DATABASE_URL") {
            self.store.database_url = url;
        }

        if let Ok(path) = std::env::var("TEAMSYNC_RECORDS_PATH") {
            self.store.records_path = path;
        }

        if let Ok(git_path) = std::env::var("TEAMSYNC_GIT_PATH") {
            self.git.git_path = git_path;
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, bind: Option<String>, git_path: Option<String>) -> Self {
        if let Some(bind) = bind {
            self.server.bind = bind;
        }

        if let Some(path) = git_path {
            self.git.git_path = path;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults. An explicit `config_file`
    /// replaces the default location and must exist.
    pub fn load_with_overrides(
        config_file: Option<&Path>,
        bind: Option<String>,
        git_path: Option<String>,
    ) -> Result<Self> {
        let base = match config_file {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load()?,
        };

        let config = base.with_env_overrides().with_cli_overrides(bind, git_path);
        config.validate()?;
        Ok(config)
    }

    /// Check values that would otherwise fail late, at request time
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.store.database_url).map_err(|e| {
            Error::Config(format!(
                "Invalid database_url '{}': {}",
                self.store.database_url, e
            ))
        })?;

        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(Error::Config(format!(
                "database_url must be http(s), got '{}'",
                url.scheme()
            )));
        }

        if self.git.branch.trim().is_empty() || self.git.remote.trim().is_empty() {
            return Err(Error::Config(
                "git.remote and git.branch must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
