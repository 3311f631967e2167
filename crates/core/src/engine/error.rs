//! Error types for the extraction engine.

use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by an extraction engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Engine binary not found.
    #[error("yt-dlp not found at path: {path}")]
    BinaryNotFound { path: PathBuf },

    /// Listing the available streams failed.
    #[error("Catalogue failed: {reason}")]
    CatalogueFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// Fetching the output file failed.
    #[error("Materialize failed: {reason}")]
    MaterializeFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// The engine did not finish in time.
    #[error("Engine call timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Failed to parse the engine's metadata output.
    #[error("Failed to parse engine output: {reason}")]
    ParseError { reason: String },

    /// I/O error while driving the engine.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Creates a new catalogue failure with optional stderr output.
    pub fn catalogue_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::CatalogueFailed {
            reason: reason.into(),
            stderr,
        }
    }

    /// Creates a new materialize failure with optional stderr output.
    pub fn materialize_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::MaterializeFailed {
            reason: reason.into(),
            stderr,
        }
    }

    /// Captured engine stderr, if any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::CatalogueFailed { stderr, .. } | Self::MaterializeFailed { stderr, .. } => {
                stderr.as_deref()
            }
            _ => None,
        }
    }

    /// Whether retrying the same call might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stderr_accessor() {
        let err = EngineError::materialize_failed("exit 1", Some("ERROR: no video".to_string()));
        assert_eq!(err.stderr(), Some("ERROR: no video"));
        assert!(EngineError::Timeout { timeout_secs: 5 }.stderr().is_none());
    }

    #[test]
    fn test_is_retryable() {
        assert!(EngineError::Timeout { timeout_secs: 5 }.is_retryable());
        assert!(!EngineError::catalogue_failed("private video", None).is_retryable());
    }
}
