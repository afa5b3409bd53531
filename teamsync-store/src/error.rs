//! Error types for document store access

use thiserror::Error;

/// Result type for document store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading from the document store
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure (connect, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status
    #[error("store returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, usually a JSON error object
        body: String,
    },

    /// Invalid database URL or path
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The store token could not be loaded or is malformed
    #[error("Store credentials: {0}")]
    Credentials(#[from] teamsync_core::Error),

    /// The response body was not JSON
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl From<Error> for teamsync_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Credentials(inner) => inner,
            other => teamsync_core::Error::Source(other.to_string()),
        }
    }
}
