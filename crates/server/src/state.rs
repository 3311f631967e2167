use std::sync::Arc;
use tubefetch_core::{Config, MediaService, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    service: Arc<MediaService>,
}

impl AppState {
    pub fn new(config: Config, service: Arc<MediaService>) -> Self {
        Self { config, service }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn service(&self) -> &MediaService {
        self.service.as_ref()
    }
}
