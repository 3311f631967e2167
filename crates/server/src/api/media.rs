//! Media API handlers: discovery, download, cleanup and session lookup.

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tracing::warn;
use tubefetch_core::ServiceError;

use super::error::ApiError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for format discovery
#[derive(Debug, Deserialize)]
pub struct FormatsBody {
    pub url: Option<String>,
}

/// Response for format discovery
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatsResponse {
    pub session_id: String,
    pub available_formats: Vec<String>,
}

/// Request body for downloading one quality
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadBody {
    pub session_id: Option<String>,
    /// Quality label; older clients send it as `formatId`
    #[serde(alias = "formatId")]
    pub quality: Option<String>,
}

/// Request body for cleanup
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupBody {
    pub session_id: Option<String>,
}

/// Response for cleanup
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub status: String,
    pub session_id: String,
}

/// Response for session lookup
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: String,
    pub source_url: String,
    pub available_formats: Vec<String>,
    pub ready: bool,
    pub created_at: String,
    pub expires_at: String,
}

/// Set on downloads: `true` when the session's earlier file was served
/// instead of one for the requested quality.
pub const REUSED_HEADER: HeaderName = HeaderName::from_static("x-tubefetch-reused");

// ============================================================================
// Handlers
// ============================================================================

/// Discover the qualities available for a URL and open a session
pub async fn discover_formats(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FormatsBody>, JsonRejection>,
) -> Result<Json<FormatsResponse>, ApiError> {
    let Json(body) = payload?;
    let url = body.url.unwrap_or_default();

    let outcome = state.service().discover(&url).await?;

    Ok(Json(FormatsResponse {
        session_id: outcome.session_id.to_string(),
        available_formats: outcome.labels,
    }))
}

/// Download a quality for a session, streamed back as an attachment
pub async fn download(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DownloadBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = payload?;
    let session_id = body.session_id.unwrap_or_default();
    let quality = body.quality.unwrap_or_default();
    if session_id.trim().is_empty() || quality.trim().is_empty() {
        return Err(ApiError::invalid_input("sessionId and quality are required"));
    }

    let file = state.service().download(&session_id, &quality).await?;

    let unreadable = |e: std::io::Error| {
        warn!(path = %file.path.display(), error = %e, "Downloaded file is unreadable");
        ApiError::from(ServiceError::download_failed(
            format!("cannot read {}", file.filename),
            None,
        ))
    };
    let handle = tokio::fs::File::open(&file.path).await.map_err(unreadable)?;
    let length = handle.metadata().await.map_err(unreadable)?.len();

    let stream = ReaderStream::new(handle);
    let body = Body::from_stream(stream);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.filename),
            ),
            (header::CONTENT_LENGTH, length.to_string()),
            (REUSED_HEADER, file.reused.to_string()),
        ],
        body,
    )
        .into_response())
}

/// Delete a session and its file
pub async fn cleanup(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CleanupBody>, JsonRejection>,
) -> Result<Json<CleanupResponse>, ApiError> {
    let Json(body) = payload?;
    let session_id = body.session_id.unwrap_or_default();

    let outcome = state.service().cleanup(&session_id).await?;

    Ok(Json(CleanupResponse {
        status: "deleted".to_string(),
        session_id: outcome.session_id.to_string(),
    }))
}

/// Get a session by ID
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let summary = state.service().session(&id)?;

    Ok(Json(SessionResponse {
        session_id: summary.session_id.to_string(),
        source_url: summary.source_url,
        available_formats: summary.labels,
        ready: summary.ready,
        created_at: summary.created_at.to_rfc3339(),
        expires_at: summary.expires_at.to_rfc3339(),
    }))
}
