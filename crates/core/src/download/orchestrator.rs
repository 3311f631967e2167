//! Download orchestrator implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::engine::{ExtractionEngine, MaterializeRequest};
use crate::error::ServiceError;
use crate::formats::{nearest_label, RetrievalDirective};
use crate::metrics::{DIRECTIVES, DOWNLOADS, DOWNLOAD_DURATION};
use crate::session::{reclaim_artifact, Session, SessionError, SessionStore};

use super::locate::locate_output;

/// The label chosen for a request and how to fetch it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectivePlan {
    /// Label actually served (may differ from the requested one).
    pub label: String,
    /// Whether the requested label matched exactly.
    pub exact: bool,
    pub directive: RetrievalDirective,
}

/// A file materialized for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub session_id: Uuid,
    /// File name inside the download directory.
    pub filename: String,
    pub path: PathBuf,
    /// Label that was fetched, when this call fetched it.
    pub label: Option<String>,
    /// The file had already been materialized by an earlier request.
    pub reused: bool,
}

/// Resolve a requested label against a session.
///
/// Exact matches win; otherwise the label with the closest height is used,
/// ties going to the earliest label in the session's order.
pub fn plan_directive(session: &Session, requested: &str) -> Result<DirectivePlan, ServiceError> {
    let (label, exact) = if session.format_map.contains_key(requested) {
        (requested.to_string(), true)
    } else {
        let nearest = nearest_label(&session.labels, requested).ok_or_else(|| {
            ServiceError::NoFormatsForSession {
                session_id: session.id.to_string(),
            }
        })?;
        (nearest.to_string(), false)
    };

    let entry = session
        .format_map
        .get(&label)
        .ok_or_else(|| ServiceError::NoDirective {
            quality: label.clone(),
        })?;

    let directive =
        RetrievalDirective::for_entry(entry, session.best_audio_stream_id.as_deref())
            .ok_or_else(|| ServiceError::NoDirective {
                quality: label.clone(),
            })?;

    Ok(DirectivePlan {
        label,
        exact,
        directive,
    })
}

/// Turns (session, quality) requests into files on disk.
pub struct DownloadOrchestrator {
    engine: Arc<dyn ExtractionEngine>,
    store: Arc<dyn SessionStore>,
    download_dir: PathBuf,
}

impl DownloadOrchestrator {
    pub fn new(
        engine: Arc<dyn ExtractionEngine>,
        store: Arc<dyn SessionStore>,
        download_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            engine,
            store,
            download_dir: download_dir.into(),
        }
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Materialize `quality` for a session.
    ///
    /// A session produces at most one file. If one is already recorded it
    /// is returned without calling the engine.
    pub async fn download(
        &self,
        session_id: &Uuid,
        quality: &str,
    ) -> Result<DownloadedFile, ServiceError> {
        let session = self
            .store
            .get(session_id)
            .ok_or_else(|| ServiceError::SessionNotFound(session_id.to_string()))?;

        if let Some(filename) = &session.filename {
            return self.reuse_recorded(session_id, filename, quality).await;
        }

        let plan = plan_directive(&session, quality)?;
        if !plan.exact {
            warn!(
                session_id = %session_id,
                requested = %quality,
                chosen = %plan.label,
                "Requested quality not available, using nearest"
            );
        }
        DIRECTIVES
            .with_label_values(&[
                plan.directive.kind(),
                if plan.exact { "exact" } else { "nearest" },
            ])
            .inc();

        let file_id = Uuid::new_v4().to_string();
        let request = MaterializeRequest {
            url: session.source_url.clone(),
            directive: plan.directive.selector(),
            output_template: self.download_dir.join(format!("{}.%(ext)s", file_id)),
        };

        info!(
            session_id = %session_id,
            url = %session.source_url,
            quality = %plan.label,
            directive = %request.directive,
            "Starting download"
        );

        let start = Instant::now();
        let path = match self.materialize(request, &file_id).await {
            Ok(path) => path,
            Err(e) => {
                DOWNLOADS.with_label_values(&["failed"]).inc();
                DOWNLOAD_DURATION
                    .with_label_values(&["failed"])
                    .observe(start.elapsed().as_secs_f64());
                return Err(e);
            }
        };
        DOWNLOAD_DURATION
            .with_label_values(&["success"])
            .observe(start.elapsed().as_secs_f64());

        let filename = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => {
                self.discard(&path).await;
                DOWNLOADS.with_label_values(&["failed"]).inc();
                return Err(ServiceError::download_failed(
                    format!("unusable output file name: {}", path.display()),
                    None,
                ));
            }
        };

        match self.store.set_filename(session_id, filename.clone()) {
            Ok(()) => {
                DOWNLOADS.with_label_values(&["success"]).inc();
                info!(session_id = %session_id, file = %filename, "Download complete");
                Ok(DownloadedFile {
                    session_id: *session_id,
                    filename,
                    path,
                    label: Some(plan.label),
                    reused: false,
                })
            }
            Err(SessionError::NotFound(_)) => {
                // Cleaned up or expired while the engine was running
                info!(session_id = %session_id, "Session removed during download, discarding file");
                self.discard(&path).await;
                DOWNLOADS.with_label_values(&["failed"]).inc();
                Err(ServiceError::SessionNotFound(session_id.to_string()))
            }
            Err(SessionError::AlreadyMaterialized { existing, .. }) => {
                debug!(
                    session_id = %session_id,
                    existing = %existing,
                    "Concurrent download won, discarding duplicate"
                );
                self.discard(&path).await;
                self.reuse_recorded(session_id, &existing, quality).await
            }
        }
    }

    async fn materialize(
        &self,
        request: MaterializeRequest,
        file_id: &str,
    ) -> Result<PathBuf, ServiceError> {
        let output = self.engine.materialize(request).await.map_err(|e| {
            warn!(error = %e, stderr = ?e.stderr(), "Engine download failed");
            ServiceError::download_failed("extraction engine reported an error", Some(e))
        })?;

        let located = locate_output(&self.download_dir, file_id, output.reported_path.as_deref())
            .await
            .map_err(|e| {
                ServiceError::download_failed(format!("failed to scan download dir: {}", e), None)
            })?;

        located.ok_or_else(|| {
            warn!(file_id = %file_id, "Engine succeeded but produced no output file");
            ServiceError::download_failed("no output file was produced", None)
        })
    }

    async fn reuse_recorded(
        &self,
        session_id: &Uuid,
        filename: &str,
        quality: &str,
    ) -> Result<DownloadedFile, ServiceError> {
        let path = self.download_dir.join(filename);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            DOWNLOADS.with_label_values(&["failed"]).inc();
            return Err(ServiceError::download_failed(
                format!("recorded file {} no longer exists", filename),
                None,
            ));
        }

        warn!(
            session_id = %session_id,
            requested = %quality,
            filename = %filename,
            "Session already materialized, serving the recorded file"
        );
        DOWNLOADS.with_label_values(&["reused"]).inc();
        Ok(DownloadedFile {
            session_id: *session_id,
            filename: filename.to_string(),
            path,
            label: None,
            reused: true,
        })
    }

    async fn discard(&self, path: &Path) {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return;
        };
        if let Err(e) = reclaim_artifact(&self.download_dir, name).await {
            warn!(path = %path.display(), error = %e, "Failed to discard orphaned file");
        }
    }
}
