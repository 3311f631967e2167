//! Request metrics middleware.

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{header, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::debug;

use crate::metrics::{
    normalize_path, HTTP_REQUESTS_IN_FLIGHT, HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION,
    HTTP_RESPONSE_BYTES,
};

/// Holds one slot of the in-flight gauge until dropped.
///
/// Downloads can be long; a client that hangs up cancels the handler
/// future, and the slot must still be released.
struct InFlight;

impl InFlight {
    fn enter() -> Self {
        HTTP_REQUESTS_IN_FLIGHT.inc();
        Self
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        HTTP_REQUESTS_IN_FLIGHT.dec();
    }
}

/// Route label for a request: the matched route template when routing
/// succeeded, else the raw path with id segments collapsed.
fn route_label(request: &Request<Body>) -> String {
    match request.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_string(),
        None => normalize_path(request.uri().path()),
    }
}

/// Records latency, status counts, in-flight requests and declared
/// response sizes per route.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = route_label(&request);

    let response = {
        let _in_flight = InFlight::enter();
        next.run(request).await
    };

    let elapsed = start.elapsed();
    let status = response.status().as_u16().to_string();
    let labels = [method.as_str(), route.as_str(), status.as_str()];

    HTTP_REQUEST_DURATION
        .with_label_values(&labels)
        .observe(elapsed.as_secs_f64());
    HTTP_REQUESTS_TOTAL.with_label_values(&labels).inc();

    // Streamed attachments declare their size up front
    if let Some(length) = response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
    {
        HTTP_RESPONSE_BYTES
            .with_label_values(&[route.as_str()])
            .observe(length as f64);
    }

    debug!(
        method = %method,
        route = %route,
        status = %status,
        elapsed_ms = elapsed.as_millis() as u64,
        "Request handled"
    );

    response
}
