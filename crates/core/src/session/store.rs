//! Session storage trait.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::formats::ResolvedFormats;

use super::types::Session;

/// Error type for session store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Session does not exist (never created, cleaned up or expired).
    #[error("Session not found: {0}")]
    NotFound(Uuid),

    /// A file was already recorded for this session.
    #[error("Session {id} already has a file: {existing}")]
    AlreadyMaterialized { id: Uuid, existing: String },
}

/// Concurrency-safe storage for sessions.
///
/// Every method is one atomic step with respect to every other. In
/// particular, removing a session hands its record to exactly one caller,
/// and that caller alone owns the backing file.
pub trait SessionStore: Send + Sync {
    /// Store a new session and return its fresh identifier.
    fn create(&self, source_url: String, formats: ResolvedFormats) -> Uuid;

    /// Get a snapshot of a session.
    fn get(&self, id: &Uuid) -> Option<Session>;

    /// Record the materialized file name. Succeeds only once per session.
    fn set_filename(&self, id: &Uuid, filename: String) -> Result<(), SessionError>;

    /// Remove a session, returning it if it was present.
    fn remove(&self, id: &Uuid) -> Option<Session>;

    /// Remove a session. Returns `false` if it was already gone.
    fn delete(&self, id: &Uuid) -> bool {
        self.remove(id).is_some()
    }

    /// Remove and return every session older than `ttl` at `now`.
    fn remove_expired(&self, now: DateTime<Utc>, ttl: Duration) -> Vec<Session>;

    /// Snapshot of all sessions.
    fn list(&self) -> Vec<Session>;

    /// Number of live sessions.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
