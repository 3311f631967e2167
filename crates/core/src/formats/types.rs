//! Resolved format types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How to obtain one quality label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatEntry {
    /// A stream that carries both audio and video.
    pub combined_stream_id: Option<String>,
    /// Best video-only stream for this label.
    pub video_stream_id: Option<String>,
    /// Bitrate of `video_stream_id` (0 when unset).
    pub video_bitrate: f64,
    /// Display height of this label.
    pub height: u32,
}

impl FormatEntry {
    pub fn new(height: u32) -> Self {
        Self {
            combined_stream_id: None,
            video_stream_id: None,
            video_bitrate: 0.0,
            height,
        }
    }
}

/// Output of the format resolver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedFormats {
    /// Labels sorted ascending by height. Exactly the keys of `format_map`.
    pub labels: Vec<String>,
    pub format_map: HashMap<String, FormatEntry>,
    /// Highest bitrate audio-only stream, if any.
    pub best_audio_stream_id: Option<String>,
}

impl ResolvedFormats {
    /// No usable video formats were found.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
