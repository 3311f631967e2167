//! Media service facade.
//!
//! Composes discovery, download and cleanup over one engine and one
//! session store. Everything surfaced from here is a [`ServiceError`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::download::{DownloadOrchestrator, DownloadedFile};
use crate::engine::ExtractionEngine;
use crate::error::{ErrorKind, ServiceError};
use crate::formats::resolve_formats;
use crate::metrics::{ARTIFACTS_RECLAIMED, DISCOVERY_REQUESTS, SESSIONS_CREATED, SESSIONS_REMOVED};
use crate::reaper::{ReaperConfig, SessionReaper};
use crate::session::{reclaim_artifact, ArtifactReclaim, SessionStore};
use crate::url::normalize_url;

/// Result of a successful discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryOutcome {
    pub session_id: Uuid,
    /// Normalized URL the session was created for.
    pub source_url: String,
    /// Available quality labels, ascending by height.
    pub labels: Vec<String>,
}

/// Result of an explicit cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupOutcome {
    pub session_id: Uuid,
    /// A recorded file was deleted by this call.
    pub file_removed: bool,
}

/// Read-only view of a live session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub source_url: String,
    pub labels: Vec<String>,
    /// A file has been materialized for this session.
    pub ready: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// The discovery -> download -> cleanup service.
pub struct MediaService {
    engine: Arc<dyn ExtractionEngine>,
    store: Arc<dyn SessionStore>,
    downloads: DownloadOrchestrator,
    download_dir: PathBuf,
    reaper_config: ReaperConfig,
}

impl MediaService {
    pub fn new(
        engine: Arc<dyn ExtractionEngine>,
        store: Arc<dyn SessionStore>,
        download_dir: impl Into<PathBuf>,
        reaper_config: ReaperConfig,
    ) -> Self {
        let download_dir = download_dir.into();
        let downloads = DownloadOrchestrator::new(
            Arc::clone(&engine),
            Arc::clone(&store),
            download_dir.clone(),
        );

        Self {
            engine,
            store,
            downloads,
            download_dir,
            reaper_config,
        }
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// A reaper over this service's store and download directory.
    pub fn reaper(&self) -> SessionReaper {
        SessionReaper::new(
            self.reaper_config.clone(),
            Arc::clone(&self.store),
            self.download_dir.clone(),
        )
    }

    /// List the quality labels for `url` and open a session for them.
    pub async fn discover(&self, url: &str) -> Result<DiscoveryOutcome, ServiceError> {
        if url.trim().is_empty() {
            return Err(ServiceError::InvalidInput("url is required".to_string()));
        }

        let source_url = normalize_url(url);
        info!(url = %source_url, "Discovering formats");

        let streams = self.engine.catalogue(&source_url).await.map_err(|e| {
            DISCOVERY_REQUESTS.with_label_values(&["engine_error"]).inc();
            warn!(url = %source_url, error = %e, stderr = ?e.stderr(), "Format discovery failed");
            ServiceError::Discovery {
                url: source_url.clone(),
                source: e,
            }
        })?;

        let formats = resolve_formats(&streams);
        if formats.is_empty() {
            DISCOVERY_REQUESTS.with_label_values(&["no_formats"]).inc();
            info!(url = %source_url, streams = streams.len(), "No usable formats");
            return Err(ServiceError::NoFormats { url: source_url });
        }

        let labels = formats.labels.clone();
        let session_id = self.store.create(source_url.clone(), formats);
        DISCOVERY_REQUESTS.with_label_values(&["success"]).inc();
        SESSIONS_CREATED.inc();
        info!(
            session_id = %session_id,
            url = %source_url,
            labels = ?labels,
            "Session created"
        );

        Ok(DiscoveryOutcome {
            session_id,
            source_url,
            labels,
        })
    }

    /// Materialize `quality` for a session, or return its existing file.
    pub async fn download(
        &self,
        session_id: &str,
        quality: &str,
    ) -> Result<DownloadedFile, ServiceError> {
        if quality.trim().is_empty() {
            return Err(ServiceError::InvalidInput("quality is required".to_string()));
        }
        let id = parse_session_id(session_id)?;
        self.downloads.download(&id, quality.trim()).await
    }

    /// Remove a session and its file.
    ///
    /// File deletion problems are logged; the session is gone either way.
    pub async fn cleanup(&self, session_id: &str) -> Result<CleanupOutcome, ServiceError> {
        let id = parse_session_id(session_id)?;
        let session = self
            .store
            .remove(&id)
            .ok_or_else(|| ServiceError::SessionNotFound(id.to_string()))?;
        SESSIONS_REMOVED.with_label_values(&["cleanup"]).inc();

        let mut file_removed = false;
        if let Some(filename) = session.filename.as_deref() {
            match reclaim_artifact(&self.download_dir, filename).await {
                Ok(ArtifactReclaim::Removed) => {
                    ARTIFACTS_RECLAIMED.with_label_values(&["removed"]).inc();
                    file_removed = true;
                }
                Ok(ArtifactReclaim::Missing) => {
                    ARTIFACTS_RECLAIMED.with_label_values(&["missing"]).inc();
                    info!(session_id = %id, file = %filename, "Session file already gone");
                }
                Err(e) => {
                    ARTIFACTS_RECLAIMED.with_label_values(&["failed"]).inc();
                    let err = ServiceError::Cleanup {
                        path: self.download_dir.join(filename),
                        source: e,
                    };
                    error!(
                        session_id = %id,
                        kind = ErrorKind::ResourceCleanupFailure.as_str(),
                        error = %err,
                        "Failed to delete session file"
                    );
                }
            }
        }

        info!(session_id = %id, file_removed, "Session cleaned up");
        Ok(CleanupOutcome {
            session_id: id,
            file_removed,
        })
    }

    /// Look up a live session.
    pub fn session(&self, session_id: &str) -> Result<SessionSummary, ServiceError> {
        let id = parse_session_id(session_id)?;
        let session = self
            .store
            .get(&id)
            .ok_or_else(|| ServiceError::SessionNotFound(id.to_string()))?;

        Ok(SessionSummary {
            session_id: session.id,
            ready: session.filename.is_some(),
            expires_at: session.expires_at(self.reaper_config.ttl()),
            created_at: session.created_at,
            labels: session.labels,
            source_url: session.source_url,
        })
    }
}

/// Blank ids are invalid input; ids that cannot name a session are not found.
fn parse_session_id(raw: &str) -> Result<Uuid, ServiceError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ServiceError::InvalidInput("sessionId is required".to_string()));
    }
    Uuid::parse_str(raw).map_err(|_| ServiceError::SessionNotFound(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineError;
    use crate::session::InMemorySessionStore;
    use crate::testing::{fixtures, MockExtractionEngine};
    use tempfile::TempDir;

    struct Harness {
        dir: TempDir,
        engine: Arc<MockExtractionEngine>,
        service: MediaService,
    }

    async fn harness() -> Harness {
        let dir = TempDir::new().unwrap();
        let engine = Arc::new(MockExtractionEngine::new());
        engine.set_catalogue(fixtures::typical_catalogue()).await;
        let service = MediaService::new(
            Arc::clone(&engine) as Arc<dyn ExtractionEngine>,
            Arc::new(InMemorySessionStore::new()),
            dir.path(),
            ReaperConfig::default(),
        );
        Harness {
            dir,
            engine,
            service,
        }
    }

    #[tokio::test]
    async fn test_session_summary_with_huge_ttl() {
        let dir = TempDir::new().unwrap();
        let engine = Arc::new(MockExtractionEngine::new());
        engine.set_catalogue(fixtures::typical_catalogue()).await;
        let service = MediaService::new(
            engine as Arc<dyn ExtractionEngine>,
            Arc::new(InMemorySessionStore::new()),
            dir.path(),
            ReaperConfig::default().with_ttl_secs(10_000_000_000_000),
        );

        let outcome = service.discover("https://example.com/a").await.unwrap();
        let summary = service.session(&outcome.session_id.to_string()).unwrap();
        assert!(summary.expires_at > summary.created_at);
    }

    #[tokio::test]
    async fn test_discover_normalizes_url_and_lists_labels() {
        let h = harness().await;
        let outcome = h.service.discover("  https://youtu.be/abc123  ").await.unwrap();

        assert_eq!(outcome.source_url, "https://www.youtube.com/watch?v=abc123");
        assert_eq!(outcome.labels, vec!["360p", "480p", "720p", "1080p", "1080p60"]);
        assert_eq!(h.service.store().len(), 1);
    }

    #[tokio::test]
    async fn test_discover_rejects_blank_url() {
        let h = harness().await;
        let err = h.service.discover("   ").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(h.engine.catalogue_count(), 0);
    }

    #[tokio::test]
    async fn test_discover_without_usable_formats_creates_no_session() {
        let h = harness().await;
        h.engine.set_catalogue(fixtures::audio_only_catalogue()).await;

        let err = h.service.discover("https://example.com/a").await.unwrap_err();
        assert!(matches!(err, ServiceError::NoFormats { .. }));
        assert!(h.service.store().is_empty());
    }

    #[tokio::test]
    async fn test_discover_wraps_engine_errors() {
        let h = harness().await;
        h.engine
            .set_next_error(EngineError::catalogue_failed("exit 1", Some("boom".into())))
            .await;

        let err = h.service.discover("https://example.com/a").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EngineFailure);
        assert!(!err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_download_input_validation() {
        let h = harness().await;
        let outcome = h.service.discover("https://example.com/a").await.unwrap();
        let id = outcome.session_id.to_string();

        let err = h.service.download(&id, "").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = h.service.download("", "720p").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = h.service.download("not-a-uuid", "720p").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_cleanup_twice() {
        let h = harness().await;
        let outcome = h.service.discover("https://example.com/a").await.unwrap();
        let id = outcome.session_id.to_string();
        let file = h.service.download(&id, "720p").await.unwrap();
        assert!(h.dir.path().join(&file.filename).exists());

        let first = h.service.cleanup(&id).await.unwrap();
        assert!(first.file_removed);
        assert!(!h.dir.path().join(&file.filename).exists());

        let second = h.service.cleanup(&id).await.unwrap_err();
        assert_eq!(second.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_cleanup_without_file() {
        let h = harness().await;
        let outcome = h.service.discover("https://example.com/a").await.unwrap();

        let result = h
            .service
            .cleanup(&outcome.session_id.to_string())
            .await
            .unwrap();
        assert!(!result.file_removed);
    }

    #[tokio::test]
    async fn test_session_summary() {
        let h = harness().await;
        let outcome = h.service.discover("https://example.com/a").await.unwrap();
        let id = outcome.session_id.to_string();

        let summary = h.service.session(&id).unwrap();
        assert!(!summary.ready);
        assert_eq!(summary.expires_at - summary.created_at, chrono::Duration::seconds(1800));

        h.service.download(&id, "480p").await.unwrap();
        assert!(h.service.session(&id).unwrap().ready);

        let err = h.service.session(&Uuid::new_v4().to_string()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
