//! Realtime database credentials
//!
//! The store token travels as the `auth` query parameter of every read, so it
//! is validated up front: only RFC 3986 unreserved characters are accepted,
//! which covers database secrets and ID tokens alike.
//!
//! Loading priority:
//! 1. Environment variable (TEAMSYNC_STORE_TOKEN)
//! 2. `store.token_file` from the config
//! 3. Default token file (~/.config/teamsync/store.token), if present

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::StoreConfig;
use crate::{Error, Result};

/// Environment variable holding the store token
pub const STORE_TOKEN_ENV: &str = "TEAMSYNC_STORE_TOKEN";

/// Database secret or access token sent as the `auth` parameter
#[derive(Clone, PartialEq, Eq)]
pub struct StoreToken(String);

impl StoreToken {
    /// Validate a token, ignoring surrounding whitespace
    pub fn parse(raw: &str) -> Result<Self> {
        let token = raw.trim();
        if token.is_empty() {
            return Err(Error::Config("Store token is empty".to_string()));
        }

        // Report the position only; the token itself never reaches an error
        if let Some(pos) = token.find(|c: char| !is_query_safe(c)) {
            return Err(Error::Config(format!(
                "Store token has a character at byte {} that cannot be sent as the auth parameter",
                pos
            )));
        }

        Ok(Self(token.to_string()))
    }

    /// The raw token, for building request URLs
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for StoreToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StoreToken(<redacted>)")
    }
}

fn is_query_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~')
}

/// Get the default token file path
///
/// Returns `~/.config/teamsync/store.token` on Unix
pub fn default_token_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("teamsync").join("store.token"))
}

/// Resolve the store token for `config` from the environment or token file
pub fn store_token(config: &StoreConfig) -> Result<Option<StoreToken>> {
    resolve_store_token(std::env::var(STORE_TOKEN_ENV).ok(), config)
}

/// Resolve the store token from an already-read environment value
///
/// An explicit `token_file` must exist; the default location is optional.
pub fn resolve_store_token(
    env_value: Option<String>,
    config: &StoreConfig,
) -> Result<Option<StoreToken>> {
    if let Some(value) = env_value.filter(|v| !v.trim().is_empty()) {
        debug!("Using store token from {} environment variable", STORE_TOKEN_ENV);
        return StoreToken::parse(&value).map(Some);
    }

    if let Some(ref path) = config.token_file {
        return read_token_file(path).map(Some);
    }

    match default_token_path() {
        Some(path) if path.exists() => read_token_file(&path).map(Some),
        _ => Ok(None),
    }
}

/// Read a token file, refusing files other users can read
pub fn read_token_file(path: &Path) -> Result<StoreToken> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let metadata = std::fs::metadata(path).map_err(Error::Io)?;
        let mode = metadata.permissions().mode();

        if mode & 0o077 != 0 {
            return Err(Error::Config(format!(
                "Token file {} has insecure permissions {:o}. \
                 Please run: chmod 600 {}",
                path.display(),
                mode & 0o777,
                path.display()
            )));
        }
    }

    let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
    let token = StoreToken::parse(&contents).map_err(|e| match e {
        Error::Config(msg) => Error::Config(format!("Token file {}: {}", path.display(), msg)),
        other => other,
    })?;

    debug!(path = %path.display(), "Using store token from token file");
    Ok(token)
}
