//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Discovery (sessions created, failures)
//! - Downloads (results, durations, directive kinds)
//! - Lifecycle (explicit cleanups, reaper evictions, reclaimed files)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Discovery Metrics
// =============================================================================

/// Discovery requests by result.
pub static DISCOVERY_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "tubefetch_discovery_requests_total",
            "Total format discovery requests",
        ),
        &["result"], // "success", "no_formats", "engine_error"
    )
    .unwrap()
});

/// Sessions created.
pub static SESSIONS_CREATED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("tubefetch_sessions_created_total", "Total sessions created").unwrap()
});

// =============================================================================
// Download Metrics
// =============================================================================

/// Downloads by result.
pub static DOWNLOADS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("tubefetch_downloads_total", "Total download requests"),
        &["result"], // "success", "reused", "failed"
    )
    .unwrap()
});

/// Download duration in seconds.
pub static DOWNLOAD_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "tubefetch_download_duration_seconds",
            "Duration of engine downloads",
        )
        .buckets(vec![1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0]),
        &["result"],
    )
    .unwrap()
});

/// Directives issued by kind.
pub static DIRECTIVES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "tubefetch_directives_total",
            "Retrieval directives issued to the engine",
        ),
        // kind: "combined", "paired", "bounded_fallback"; match: "exact", "nearest"
        &["kind", "match"],
    )
    .unwrap()
});

// =============================================================================
// Lifecycle Metrics
// =============================================================================

/// Sessions removed, by reason.
pub static SESSIONS_REMOVED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("tubefetch_sessions_removed_total", "Total sessions removed"),
        &["reason"], // "cleanup", "expired"
    )
    .unwrap()
});

/// Artifact reclamation outcomes.
pub static ARTIFACTS_RECLAIMED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "tubefetch_artifacts_reclaimed_total",
            "Backing file deletions by outcome",
        ),
        &["outcome"], // "removed", "missing", "failed"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(DISCOVERY_REQUESTS.clone()),
        Box::new(SESSIONS_CREATED.clone()),
        Box::new(DOWNLOADS.clone()),
        Box::new(DOWNLOAD_DURATION.clone()),
        Box::new(DIRECTIVES.clone()),
        Box::new(SESSIONS_REMOVED.clone()),
        Box::new(ARTIFACTS_RECLAIMED.clone()),
    ]
}
