//! Error types for the evaluation harness.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our custom error.
pub type Result<T> = std::result::Result<T, EvalError>;

/// Errors that can occur in the evaluation harness.
#[derive(Error, Debug)]
pub enum EvalError {
    /// No test case with the given id exists in the catalog.
    #[error("Test case '{0}' not found")]
    NotFound(String),

    /// A judgment or request field failed validation.
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// The model backend did not answer within the allotted time.
    #[error("Model '{model}' timed out after {timeout_secs:.1}s")]
    Timeout { model: String, timeout_secs: f64 },

    /// Connection-level failure talking to the model backend.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The model backend answered with a non-success status or an unreadable body.
    #[error("Backend error ({status_code}): {body}")]
    Backend { status_code: u16, body: String },

    /// Error reading or writing files.
    #[error("I/O error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No judgment snapshot exists in the output directory.
    #[error("No judgment snapshot found in '{0}'")]
    SnapshotNotFound(PathBuf),

    /// Error during serialization/deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification of an [`EvalError`], used by callers to decide
/// whether to ask for corrected input, retry, or report persistence lag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Timeout,
    Transport,
    Backend,
    Io,
    Config,
}

impl EvalError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a validation error for the named field.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::NotFound(_) => ErrorKind::NotFound,
            EvalError::Validation { .. } => ErrorKind::Validation,
            EvalError::Timeout { .. } => ErrorKind::Timeout,
            EvalError::Transport(_) => ErrorKind::Transport,
            EvalError::Backend { .. } => ErrorKind::Backend,
            EvalError::Io { .. } | EvalError::SnapshotNotFound(_) | EvalError::Serialization(_) => {
                ErrorKind::Io
            }
            EvalError::Config(_) => ErrorKind::Config,
        }
    }

    /// Only timeouts and transport failures are worth retrying; everything
    /// else needs corrected input or operator attention.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Timeout | ErrorKind::Transport)
    }

    /// The invalid field, if this is a validation error.
    pub fn invalid_field(&self) -> Option<&'static str> {
        match self {
            EvalError::Validation { field, .. } => Some(*field),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for EvalError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            EvalError::Config(format!("Invalid backend request: {}", err))
        } else {
            EvalError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for EvalError {
    fn from(err: serde_json::Error) -> Self {
        EvalError::Serialization(err.to_string())
    }
}
