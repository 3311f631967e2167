//! Configuration for the yt-dlp engine binding.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for [`super::YtDlpEngine`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Path to the yt-dlp binary.
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: PathBuf,

    /// Container used when separate video and audio streams are merged.
    #[serde(default = "default_merge_output_format")]
    pub merge_output_format: String,

    /// Timeout for listing streams, in seconds.
    #[serde(default = "default_catalogue_timeout")]
    pub catalogue_timeout_secs: u64,

    /// Timeout for a single download, in seconds.
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,

    /// Additional arguments passed to every yt-dlp invocation.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_ytdlp_path() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_merge_output_format() -> String {
    "mp4".to_string()
}

fn default_catalogue_timeout() -> u64 {
    120
}

fn default_download_timeout() -> u64 {
    3600 // 1 hour
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: default_ytdlp_path(),
            merge_output_format: default_merge_output_format(),
            catalogue_timeout_secs: default_catalogue_timeout(),
            download_timeout_secs: default_download_timeout(),
            extra_args: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Creates a config pointing at a specific yt-dlp binary.
    pub fn with_path(ytdlp_path: PathBuf) -> Self {
        Self {
            ytdlp_path,
            ..Default::default()
        }
    }

    /// Sets the merge container.
    pub fn with_merge_output_format(mut self, format: impl Into<String>) -> Self {
        self.merge_output_format = format.into();
        self
    }

    /// Sets the download timeout in seconds.
    pub fn with_download_timeout(mut self, timeout_secs: u64) -> Self {
        self.download_timeout_secs = timeout_secs;
        self
    }
}
