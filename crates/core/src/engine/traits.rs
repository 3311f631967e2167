//! Trait definitions for the extraction engine.

use async_trait::async_trait;

use super::error::EngineError;
use super::types::{MaterializeRequest, MaterializedOutput, StreamDescriptor};

/// An engine that can list and fetch media streams for a URL.
#[async_trait]
pub trait ExtractionEngine: Send + Sync {
    /// Returns the name of this engine implementation.
    fn name(&self) -> &str;

    /// Lists the raw streams available for `url` without fetching payload.
    async fn catalogue(&self, url: &str) -> Result<Vec<StreamDescriptor>, EngineError>;

    /// Fetches a single output file according to the request.
    ///
    /// The engine picks the final file extension. Callers must not assume
    /// one; the output may be reported back or left for discovery on disk.
    async fn materialize(
        &self,
        request: MaterializeRequest,
    ) -> Result<MaterializedOutput, EngineError>;

    /// Validates that the engine is installed and usable.
    async fn validate(&self) -> Result<(), EngineError> {
        Ok(())
    }
}
