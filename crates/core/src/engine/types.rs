//! Types exchanged with the extraction engine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Metadata about one retrievable stream, without its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    /// Opaque engine identifier for this stream (e.g. "137").
    pub stream_id: String,
    /// Stream carries a video track.
    pub has_video: bool,
    /// Stream carries an audio track.
    pub has_audio: bool,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Primary (total) bitrate in kbps.
    pub bitrate: Option<f64>,
    /// Secondary, track specific bitrate in kbps.
    pub fallback_bitrate: Option<f64>,
    pub frame_rate: Option<f64>,
}

impl StreamDescriptor {
    /// Primary bitrate, else the fallback one, else zero.
    pub fn effective_bitrate(&self) -> f64 {
        self.bitrate.or(self.fallback_bitrate).unwrap_or(0.0)
    }

    pub fn is_audio_only(&self) -> bool {
        self.has_audio && !self.has_video
    }

    pub fn is_muxed(&self) -> bool {
        self.has_audio && self.has_video
    }
}

/// A request to fetch one output file.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterializeRequest {
    /// Source media URL.
    pub url: String,
    /// Opaque retrieval directive understood by the engine.
    pub directive: String,
    /// Output name template; the engine substitutes the extension.
    pub output_template: PathBuf,
}

/// What the engine reports after a successful fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterializedOutput {
    /// Final path as reported by the engine, when it reports one.
    pub reported_path: Option<PathBuf>,
}
