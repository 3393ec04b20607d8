//! Error types for lsbranch

use thiserror::Error;

/// Result type alias for lsbranch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal error type for lsbranch operations
///
/// Expected per-repository failures are not represented here; those are
/// [`crate::RepoError`] values carried inside a [`crate::RepoStatus`].
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

    /// The git executable could not be launched
    #[error("Git error: {0}")]
    Git(String),

    /// One or more unique repo properties are already taken
    #[error("{}", .0.join("; "))]
    Duplicate(Vec<String>),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
