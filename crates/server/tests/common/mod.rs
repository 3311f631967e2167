//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with a mock extraction engine injected, enabling E2E testing without
//! yt-dlp or network access.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use tubefetch_core::{
    config::StorageConfig, testing::MockExtractionEngine, Config, ExtractionEngine,
    InMemorySessionStore, MediaService, SessionStore,
};

/// Re-export fixtures for test convenience
pub use tubefetch_core::testing::fixtures;

/// Test fixture for E2E testing with mock dependencies.
///
/// Provides an in-process server with a fully controllable engine
/// (MockExtractionEngine) and a temporary download directory.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_discovery() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.post("/api/v1/formats", json!({
///         "url": "https://youtu.be/abc"
///     })).await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock engine - configure catalogues and failures
    pub engine: Arc<MockExtractionEngine>,
    /// Session store shared with the service
    pub store: Arc<InMemorySessionStore>,
    /// Service behind the router
    pub service: Arc<MediaService>,
    /// Temporary download directory
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
    pub bytes: Bytes,
}

impl TestFixture {
    /// Create a new test fixture with the typical catalogue loaded.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let engine = Arc::new(MockExtractionEngine::new());
        engine.set_catalogue(fixtures::typical_catalogue()).await;
        let store = Arc::new(InMemorySessionStore::new());

        let config = Config {
            storage: StorageConfig {
                download_dir: temp_dir.path().to_path_buf(),
                ..Default::default()
            },
            ..Default::default()
        };

        let service = Arc::new(MediaService::new(
            Arc::clone(&engine) as Arc<dyn ExtractionEngine>,
            Arc::clone(&store) as Arc<dyn SessionStore>,
            temp_dir.path(),
            config.storage.reaper(),
        ));

        let state = Arc::new(tubefetch_server::state::AppState::new(
            config,
            Arc::clone(&service),
        ));

        // Create router
        let router = tubefetch_server::api::create_router(state);

        Self {
            router,
            engine,
            store,
            service,
            temp_dir,
        }
    }

    /// Number of files in the download directory.
    pub fn files_on_disk(&self) -> usize {
        std::fs::read_dir(self.temp_dir.path())
            .expect("Failed to read download dir")
            .count()
    }

    /// Discover formats for `url` and return the session id.
    pub async fn discover(&self, url: &str) -> String {
        let response = self
            .post("/api/v1/formats", serde_json::json!({ "url": url }))
            .await;
        assert_eq!(response.status, StatusCode::OK, "discovery failed: {:?}", response.body);
        response.body["sessionId"]
            .as_str()
            .expect("sessionId missing")
            .to_string()
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        self.send(request).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
            bytes,
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}

/// Helper to assert a JSON path equals expected value.
#[macro_export]
macro_rules! assert_json_path {
    ($json:expr, $path:expr, $expected:expr) => {
        let actual = &$json[$path];
        assert_eq!(
            actual, &$expected,
            "Path '{}' expected {:?}, got {:?}",
            $path, $expected, actual
        );
    };
}
