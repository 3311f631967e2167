//! Mock extraction engine for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::engine::{
    EngineError, ExtractionEngine, MaterializeRequest, MaterializedOutput, StreamDescriptor,
};

type MaterializeHook = Arc<dyn Fn() + Send + Sync>;

/// Mock implementation of the ExtractionEngine trait.
///
/// Provides controllable behavior for testing:
/// - Configure catalogues, globally or per URL
/// - Simulate failures and slow downloads
/// - Write real output files into the requested template
/// - Record every materialize request for assertions
///
/// # Example
///
/// ```rust,ignore
/// use tubefetch_core::testing::{fixtures, MockExtractionEngine};
///
/// let engine = MockExtractionEngine::new();
/// engine.set_catalogue(fixtures::typical_catalogue()).await;
///
/// let streams = engine.catalogue("https://youtu.be/abc").await?;
/// ```
pub struct MockExtractionEngine {
    /// Catalogue returned for URLs without a specific entry.
    catalogue: Arc<RwLock<Vec<StreamDescriptor>>>,
    /// Catalogues by exact URL.
    catalogues_by_url: Arc<RwLock<HashMap<String, Vec<StreamDescriptor>>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<EngineError>>>,
    /// Extension substituted for `%(ext)s`.
    output_extension: Arc<RwLock<String>>,
    /// Whether materialize writes a file at all.
    write_output: Arc<RwLock<bool>>,
    /// Whether materialize reports the written path back.
    report_path: Arc<RwLock<bool>>,
    /// Simulated download duration.
    materialize_delay: Arc<RwLock<Duration>>,
    /// Called after the file is written, before returning.
    on_materialize: Arc<RwLock<Option<MaterializeHook>>>,
    /// Recorded materialize requests.
    materializations: Arc<RwLock<Vec<MaterializeRequest>>>,
    catalogue_calls: AtomicUsize,
}

impl Default for MockExtractionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExtractionEngine {
    /// Create a new mock engine with an empty catalogue.
    pub fn new() -> Self {
        Self {
            catalogue: Arc::new(RwLock::new(Vec::new())),
            catalogues_by_url: Arc::new(RwLock::new(HashMap::new())),
            next_error: Arc::new(RwLock::new(None)),
            output_extension: Arc::new(RwLock::new("mp4".to_string())),
            write_output: Arc::new(RwLock::new(true)),
            report_path: Arc::new(RwLock::new(true)),
            materialize_delay: Arc::new(RwLock::new(Duration::ZERO)),
            on_materialize: Arc::new(RwLock::new(None)),
            materializations: Arc::new(RwLock::new(Vec::new())),
            catalogue_calls: AtomicUsize::new(0),
        }
    }

    /// Set the catalogue returned for any URL.
    pub async fn set_catalogue(&self, streams: Vec<StreamDescriptor>) {
        *self.catalogue.write().await = streams;
    }

    /// Set the catalogue returned for one URL.
    pub async fn set_catalogue_for(&self, url: impl Into<String>, streams: Vec<StreamDescriptor>) {
        self.catalogues_by_url
            .write()
            .await
            .insert(url.into(), streams);
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: EngineError) {
        *self.next_error.write().await = Some(error);
    }

    /// Clear any pending error.
    pub async fn clear_next_error(&self) {
        *self.next_error.write().await = None;
    }

    /// Set the extension of produced files.
    pub async fn set_output_extension(&self, extension: impl Into<String>) {
        *self.output_extension.write().await = extension.into();
    }

    /// When false, materialize succeeds without producing a file.
    pub async fn set_write_output(&self, write: bool) {
        *self.write_output.write().await = write;
    }

    /// When false, the produced path is not reported back.
    pub async fn set_report_path(&self, report: bool) {
        *self.report_path.write().await = report;
    }

    /// Set the simulated download duration.
    pub async fn set_materialize_delay(&self, delay: Duration) {
        *self.materialize_delay.write().await = delay;
    }

    /// Run `hook` during every materialize call, after the file is written.
    pub async fn set_on_materialize(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.on_materialize.write().await = Some(Arc::new(hook));
    }

    /// Get all recorded materialize requests.
    pub async fn recorded_materializations(&self) -> Vec<MaterializeRequest> {
        self.materializations.read().await.clone()
    }

    /// Get the number of materialize calls.
    pub async fn materialize_count(&self) -> usize {
        self.materializations.read().await.len()
    }

    /// Get the number of catalogue calls.
    pub fn catalogue_count(&self) -> usize {
        self.catalogue_calls.load(Ordering::SeqCst)
    }

    /// Take the next error if set.
    async fn take_error(&self) -> Option<EngineError> {
        self.next_error.write().await.take()
    }

    fn output_path(template: &std::path::Path, extension: &str) -> PathBuf {
        let rendered = template.to_string_lossy().replace("%(ext)s", extension);
        PathBuf::from(rendered)
    }
}

#[async_trait]
impl ExtractionEngine for MockExtractionEngine {
    fn name(&self) -> &str {
        "mock"
    }

    async fn catalogue(&self, url: &str) -> Result<Vec<StreamDescriptor>, EngineError> {
        self.catalogue_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        if let Some(streams) = self.catalogues_by_url.read().await.get(url) {
            return Ok(streams.clone());
        }
        Ok(self.catalogue.read().await.clone())
    }

    async fn materialize(
        &self,
        request: MaterializeRequest,
    ) -> Result<MaterializedOutput, EngineError> {
        self.materializations.write().await.push(request.clone());

        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let delay = *self.materialize_delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut output = MaterializedOutput::default();
        if *self.write_output.read().await {
            let extension = self.output_extension.read().await.clone();
            let path = Self::output_path(&request.output_template, &extension);
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, format!("mock media for {}", request.directive)).await?;
            if *self.report_path.read().await {
                output.reported_path = Some(path);
            }
        }

        let hook = self.on_materialize.read().await.clone();
        if let Some(hook) = hook {
            hook();
        }

        Ok(output)
    }
}
