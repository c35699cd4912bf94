//! Error types for bandsite.
//!
//! Library crates use [`BandsiteError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all bandsite operations.
///
/// Every variant is fatal for a pipeline run: nothing is retried locally and
/// no partial site is written.
#[derive(Debug, thiserror::Error)]
pub enum BandsiteError {
    /// A message-start line carried a date/time no known pattern accepts.
    #[error("malformed timestamp on line {line}: {value:?}")]
    MalformedTimestamp { line: usize, value: String },

    /// A message record is missing required fields or is not valid JSON.
    #[error("malformed export: {message}")]
    MalformedExport { message: String },

    /// The extraction or generation collaborator failed or returned
    /// data that does not conform to the expected shape.
    #[error("{stage} collaborator failed: {message}")]
    CollaboratorFailure { stage: String, message: String },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON serialization of an output artifact failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BandsiteError>;

impl BandsiteError {
    /// Create a malformed-export error from any displayable message.
    pub fn malformed_export(msg: impl Into<String>) -> Self {
        Self::MalformedExport {
            message: msg.into(),
        }
    }

    /// Create a collaborator failure for the given pipeline stage
    /// (`"extraction"` or `"generation"`).
    pub fn collaborator(stage: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::CollaboratorFailure {
            stage: stage.into(),
            message: msg.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
