//! Error types for teamsync

use thiserror::Error;

/// Result type alias for teamsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for teamsync operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A git command ran but exited unsuccessfully
    #[error("git {command} failed: {stderr}")]
    Git {
        /// The git subcommand that failed (e.g., "clone")
        command: String,
        /// Captured standard error of the command
        stderr: String,
    },

    /// The record source returned nothing at the configured path
    #[error("No data found at the specified path.")]
    NoData,

    /// The record tree was neither a list nor a map
    #[error("Unexpected data structure.")]
    UnexpectedStructure,

    /// The record source could not be read
    #[error("Failed to fetch team records: {0}")]
    Source(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
