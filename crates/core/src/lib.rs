pub mod config;
pub mod download;
pub mod engine;
pub mod error;
pub mod formats;
pub mod metrics;
pub mod reaper;
pub mod service;
pub mod session;
pub mod testing;
pub mod url;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use download::{DownloadOrchestrator, DownloadedFile};
pub use engine::{EngineConfig, EngineError, ExtractionEngine, StreamDescriptor, YtDlpEngine};
pub use error::{ErrorKind, ServiceError};
pub use formats::{resolve_formats, RetrievalDirective, ResolvedFormats};
pub use reaper::{ReapReport, ReaperConfig, SessionReaper};
pub use service::{CleanupOutcome, DiscoveryOutcome, MediaService, SessionSummary};
pub use session::{InMemorySessionStore, Session, SessionError, SessionStore};
