//! Session types.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::formats::{FormatEntry, ResolvedFormats};

/// Server-side record tying a source URL and its resolved formats to a
/// lifetime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub id: Uuid,
    /// Normalized source URL.
    pub source_url: String,
    pub format_map: HashMap<String, FormatEntry>,
    /// Known labels, ascending by height.
    pub labels: Vec<String>,
    pub best_audio_stream_id: Option<String>,
    /// Name of the materialized file inside the download directory.
    pub filename: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: Uuid, source_url: String, formats: ResolvedFormats, now: DateTime<Utc>) -> Self {
        Self {
            id,
            source_url,
            format_map: formats.format_map,
            labels: formats.labels,
            best_audio_stream_id: formats.best_audio_stream_id,
            filename: None,
            created_at: now,
        }
    }

    /// Whether this session outlived `ttl` at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        is_expired(now, self.created_at, ttl)
    }

    /// When this session becomes eligible for reaping.
    ///
    /// A TTL reaching past the representable range saturates.
    pub fn expires_at(&self, ttl: Duration) -> DateTime<Utc> {
        self.created_at
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Expiry rule: strictly older than the TTL.
pub fn is_expired(now: DateTime<Utc>, created_at: DateTime<Utc>, ttl: Duration) -> bool {
    now - created_at > ttl
}
