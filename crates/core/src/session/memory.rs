//! In-memory session store.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;
use uuid::Uuid;

use crate::formats::ResolvedFormats;

use super::store::{SessionError, SessionStore};
use super::types::Session;

/// Session store backed by a single mutex-guarded map.
///
/// Each operation holds the lock for a short, non-suspending critical
/// section, so operations on one session id are sequentially consistent.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<Uuid, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session stamped with an explicit creation time.
    pub fn create_at(
        &self,
        source_url: String,
        formats: ResolvedFormats,
        created_at: DateTime<Utc>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        let session = Session::new(id, source_url, formats, created_at);
        // A v4 collision would overwrite; not worth guarding against
        self.lock().insert(id, session);
        debug!(session_id = %id, "Session created");
        id
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Session>> {
        // No critical section can leave the map half-updated, so a panic
        // elsewhere does not invalidate it
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for InMemorySessionStore {
    fn create(&self, source_url: String, formats: ResolvedFormats) -> Uuid {
        self.create_at(source_url, formats, Utc::now())
    }

    fn get(&self, id: &Uuid) -> Option<Session> {
        self.lock().get(id).cloned()
    }

    fn set_filename(&self, id: &Uuid, filename: String) -> Result<(), SessionError> {
        let mut sessions = self.lock();
        let session = sessions.get_mut(id).ok_or(SessionError::NotFound(*id))?;

        if let Some(existing) = &session.filename {
            return Err(SessionError::AlreadyMaterialized {
                id: *id,
                existing: existing.clone(),
            });
        }

        session.filename = Some(filename);
        Ok(())
    }

    fn remove(&self, id: &Uuid) -> Option<Session> {
        self.lock().remove(id)
    }

    fn remove_expired(&self, now: DateTime<Utc>, ttl: Duration) -> Vec<Session> {
        let mut sessions = self.lock();
        let expired_ids: Vec<Uuid> = sessions
            .values()
            .filter(|s| s.is_expired(now, ttl))
            .map(|s| s.id)
            .collect();

        expired_ids
            .iter()
            .filter_map(|id| sessions.remove(id))
            .collect()
    }

    fn list(&self) -> Vec<Session> {
        self.lock().values().cloned().collect()
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}
