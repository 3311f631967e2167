use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tubefetch_core::{
    load_config, validate_config, ExtractionEngine, InMemorySessionStore, MediaService,
    SessionStore, YtDlpEngine,
};
use tubefetch_server::{api::create_router, state::AppState};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("TUBEFETCH_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Download directory: {:?}", config.storage.download_dir);
    info!(
        "Session TTL: {}s, reaper interval: {}s",
        config.storage.ttl_secs, config.storage.reap_interval_secs
    );

    let download_dir = config.storage.download_dir.clone();
    tokio::fs::create_dir_all(&download_dir)
        .await
        .with_context(|| format!("Failed to create download dir {:?}", download_dir))?;

    // Create extraction engine
    let engine: Arc<dyn ExtractionEngine> = Arc::new(YtDlpEngine::new(config.engine.clone()));
    match engine.validate().await {
        Ok(()) => info!("Using extraction engine: {}", engine.name()),
        // Keep serving; requests will fail with engine errors until it is installed
        Err(e) => warn!("Extraction engine {} unavailable: {}", engine.name(), e),
    }

    // Create session store and service
    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let service = Arc::new(MediaService::new(
        engine,
        store,
        download_dir,
        config.storage.reaper(),
    ));

    // Start reaper
    let reaper = service.reaper();
    reaper.start().await;

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), Arc::clone(&service)));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error");

    info!("Server shutting down...");
    reaper.stop().await;

    served
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
