//! Error taxonomy surfaced by the media service.
//!
//! Callers branch on [`ErrorKind`], never on message text.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::engine::EngineError;

/// Coarse classification of a [`ServiceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing or malformed input; the caller's fault.
    InvalidInput,
    /// Unknown session.
    NotFound,
    /// No formats discoverable, or no directive constructible.
    ResolutionFailure,
    /// The extraction engine failed.
    EngineFailure,
    /// Best-effort file cleanup failed. Logged, never returned to clients.
    ResourceCleanupFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::NotFound => "not_found",
            Self::ResolutionFailure => "resolution_failure",
            Self::EngineFailure => "engine_failure",
            Self::ResourceCleanupFailure => "resource_cleanup_failure",
        }
    }
}

/// Errors returned by discovery, download and cleanup.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("No formats found for {url}")]
    NoFormats { url: String },

    #[error("No formats available for session {session_id}")]
    NoFormatsForSession { session_id: String },

    #[error("Cannot construct a retrieval directive for quality {quality}")]
    NoDirective { quality: String },

    #[error("Failed to list formats for {url}")]
    Discovery {
        url: String,
        #[source]
        source: EngineError,
    },

    #[error("Download failed: {reason}")]
    DownloadFailed {
        reason: String,
        #[source]
        source: Option<EngineError>,
    },

    #[error("Failed to remove {path}")]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::SessionNotFound(_) => ErrorKind::NotFound,
            Self::NoFormats { .. }
            | Self::NoFormatsForSession { .. }
            | Self::NoDirective { .. } => ErrorKind::ResolutionFailure,
            Self::Discovery { .. } | Self::DownloadFailed { .. } => ErrorKind::EngineFailure,
            Self::Cleanup { .. } => ErrorKind::ResourceCleanupFailure,
        }
    }

    pub fn download_failed(reason: impl Into<String>, source: Option<EngineError>) -> Self {
        Self::DownloadFailed {
            reason: reason.into(),
            source,
        }
    }
}
