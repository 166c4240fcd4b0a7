use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Errors that can occur while orchestrating test runs
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Vitest API error: {0}")]
    Api(#[from] anyhow::Error),

    #[error("Failed to enable coverage: {0}")]
    CoverageUnavailable(String),

    #[error("Coverage report {} did not appear within {}ms", path.display(), timeout.as_millis())]
    CoverageTimeout { path: PathBuf, timeout: Duration },

    #[error("Coverage error: {0}")]
    CoverageError(String),

    #[error("Debug session error: {0}")]
    DebugError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for vitest-explorer operations
pub type Result<T> = std::result::Result<T, Error>;
