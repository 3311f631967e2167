//! Session reaper implementation.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::ErrorKind;
use crate::metrics::{ARTIFACTS_RECLAIMED, SESSIONS_REMOVED};
use crate::session::{reclaim_artifact, ArtifactReclaim, SessionStore};

use super::config::ReaperConfig;
use super::types::ReapReport;

/// Evicts expired sessions and their files on a fixed interval.
pub struct SessionReaper {
    config: ReaperConfig,
    store: Arc<dyn SessionStore>,
    download_dir: PathBuf,

    // Runtime state
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl SessionReaper {
    pub fn new(
        config: ReaperConfig,
        store: Arc<dyn SessionStore>,
        download_dir: impl Into<PathBuf>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            store,
            download_dir: download_dir.into(),
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
            handle: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ReaperConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Start the sweep loop.
    pub async fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Reaper already running");
            return;
        }

        info!(
            ttl_secs = self.config.ttl_secs,
            interval_secs = self.config.interval_secs,
            "Starting session reaper"
        );

        let running = Arc::clone(&self.running);
        let store = Arc::clone(&self.store);
        let download_dir = self.download_dir.clone();
        let config = self.config.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        debug!("Reaper received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(config.interval()) => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        let report = sweep(&store, &download_dir, &config, Utc::now()).await;
                        if !report.is_empty() {
                            info!(
                                evicted = report.evicted,
                                files_removed = report.files_removed,
                                files_missing = report.files_missing,
                                failures = report.failures,
                                "Reaped expired sessions"
                            );
                        }
                    }
                }
            }
            info!("Session reaper stopped");
        });

        *self.handle.lock().await = Some(handle);
    }

    /// Signal the loop to stop and wait for it to finish.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Reaper not running");
            return;
        }

        info!("Stopping session reaper");
        let _ = self.shutdown_tx.send(());

        if let Some(handle) = self.handle.lock().await.take() {
            if let Err(e) = handle.await {
                error!(error = %e, "Reaper task ended abnormally");
            }
        }
    }

    /// Run one sweep now.
    pub async fn sweep(&self) -> ReapReport {
        self.sweep_at(Utc::now()).await
    }

    /// Run one sweep as if the current time were `now`.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> ReapReport {
        sweep(&self.store, &self.download_dir, &self.config, now).await
    }
}

async fn sweep(
    store: &Arc<dyn SessionStore>,
    download_dir: &std::path::Path,
    config: &ReaperConfig,
    now: DateTime<Utc>,
) -> ReapReport {
    let expired = store.remove_expired(now, config.ttl());
    let mut report = ReapReport {
        evicted: expired.len(),
        ..Default::default()
    };

    for session in expired {
        SESSIONS_REMOVED.with_label_values(&["expired"]).inc();
        debug!(session_id = %session.id, created_at = %session.created_at, "Session expired");

        let Some(filename) = session.filename.as_deref() else {
            continue;
        };

        match reclaim_artifact(download_dir, filename).await {
            Ok(ArtifactReclaim::Removed) => {
                ARTIFACTS_RECLAIMED.with_label_values(&["removed"]).inc();
                report.files_removed += 1;
            }
            Ok(ArtifactReclaim::Missing) => {
                ARTIFACTS_RECLAIMED.with_label_values(&["missing"]).inc();
                info!(
                    session_id = %session.id,
                    file = %filename,
                    "Expired session file already gone"
                );
                report.files_missing += 1;
            }
            Err(e) => {
                ARTIFACTS_RECLAIMED.with_label_values(&["failed"]).inc();
                error!(
                    session_id = %session.id,
                    file = %filename,
                    kind = ErrorKind::ResourceCleanupFailure.as_str(),
                    error = %e,
                    "Failed to delete expired session file"
                );
                report.failures += 1;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::ResolvedFormats;
    use crate::session::InMemorySessionStore;
    use chrono::Duration;
    use tempfile::TempDir;

    fn reaper(dir: &TempDir, store: &Arc<InMemorySessionStore>) -> SessionReaper {
        SessionReaper::new(
            ReaperConfig::default(),
            Arc::clone(store) as Arc<dyn SessionStore>,
            dir.path(),
        )
    }

    #[tokio::test]
    async fn test_sweep_respects_ttl() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(InMemorySessionStore::new());
        let created = Utc::now();
        let id = store.create_at("u".into(), ResolvedFormats::default(), created);
        let reaper = reaper(&dir, &store);

        let report = reaper.sweep_at(created + Duration::seconds(1799)).await;
        assert_eq!(report.evicted, 0);
        assert!(store.get(&id).is_some());

        let report = reaper.sweep_at(created + Duration::seconds(1801)).await;
        assert_eq!(report.evicted, 1);
        assert!(store.get(&id).is_none());
    }

    #[tokio::test]
    async fn test_sweep_deletes_recorded_file() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(InMemorySessionStore::new());
        let created = Utc::now();
        let id = store.create_at("u".into(), ResolvedFormats::default(), created);
        std::fs::write(dir.path().join("f.mp4"), b"x").unwrap();
        store.set_filename(&id, "f.mp4".into()).unwrap();

        let report = reaper(&dir, &store)
            .sweep_at(created + Duration::seconds(3600))
            .await;
        assert_eq!(report.files_removed, 1);
        assert!(!dir.path().join("f.mp4").exists());
    }

    #[tokio::test]
    async fn test_sweep_missing_file_is_not_a_failure() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(InMemorySessionStore::new());
        let created = Utc::now();
        let id = store.create_at("u".into(), ResolvedFormats::default(), created);
        store.set_filename(&id, "gone.mp4".into()).unwrap();

        let report = reaper(&dir, &store)
            .sweep_at(created + Duration::seconds(3600))
            .await;
        assert_eq!(report.evicted, 1);
        assert_eq!(report.files_missing, 1);
        assert_eq!(report.failures, 0);
    }

    #[tokio::test]
    async fn test_start_stop() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(InMemorySessionStore::new());
        let reaper = reaper(&dir, &store);

        reaper.start().await;
        assert!(reaper.is_running());
        // Second start is a no-op
        reaper.start().await;

        reaper.stop().await;
        assert!(!reaper.is_running());
        assert!(reaper.handle.lock().await.is_none());
    }

    #[tokio::test]
    async fn test_loop_evicts_on_interval() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(InMemorySessionStore::new());
        let id = store.create_at(
            "u".into(),
            ResolvedFormats::default(),
            Utc::now() - Duration::seconds(7200),
        );
        let reaper = SessionReaper::new(
            ReaperConfig::default().with_interval_secs(1),
            Arc::clone(&store) as Arc<dyn SessionStore>,
            dir.path(),
        );

        reaper.start().await;
        tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
        reaper.stop().await;

        assert!(store.get(&id).is_none());
    }
}
