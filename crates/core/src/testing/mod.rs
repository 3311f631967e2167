//! Testing utilities and mock implementations for E2E tests.
//!
//! This module provides a mock extraction engine, allowing discovery and
//! download flows to be tested without `yt-dlp` or network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use tubefetch_core::testing::{fixtures, MockExtractionEngine};
//!
//! let engine = MockExtractionEngine::new();
//! engine.set_catalogue(fixtures::typical_catalogue()).await;
//! engine.set_output_extension("webm").await;
//!
//! // Use in MediaService...
//! ```

mod mock_engine;

pub use mock_engine::MockExtractionEngine;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::engine::StreamDescriptor;

    /// A video-only stream at 30 fps.
    pub fn video_stream(id: &str, width: u32, height: u32, bitrate: f64) -> StreamDescriptor {
        StreamDescriptor {
            stream_id: id.to_string(),
            has_video: true,
            has_audio: false,
            width: Some(width),
            height: Some(height),
            bitrate: Some(bitrate),
            fallback_bitrate: None,
            frame_rate: Some(30.0),
        }
    }

    /// A muxed audio+video stream.
    pub fn muxed_stream(id: &str, width: u32, height: u32, bitrate: f64) -> StreamDescriptor {
        StreamDescriptor {
            has_audio: true,
            ..video_stream(id, width, height, bitrate)
        }
    }

    /// An audio-only stream.
    pub fn audio_stream(id: &str, bitrate: f64) -> StreamDescriptor {
        StreamDescriptor {
            stream_id: id.to_string(),
            has_video: false,
            has_audio: true,
            width: None,
            height: None,
            bitrate: Some(bitrate),
            fallback_bitrate: None,
            frame_rate: None,
        }
    }

    /// A catalogue shaped like a typical YouTube video.
    ///
    /// Resolves to `360p`, `480p`, `720p`, `1080p` and `1080p60`, with
    /// `251` as best audio and a combined stream only at 360p.
    pub fn typical_catalogue() -> Vec<StreamDescriptor> {
        let mut hfr = video_stream("299", 1920, 1080, 6000.0);
        hfr.frame_rate = Some(60.0);

        vec![
            audio_stream("139", 48.0),
            audio_stream("140", 129.5),
            audio_stream("251", 135.0),
            muxed_stream("18", 640, 360, 500.0),
            video_stream("134", 640, 360, 300.0),
            video_stream("135", 854, 480, 800.0),
            video_stream("136", 1280, 720, 1500.0),
            video_stream("137", 1920, 1080, 4000.0),
            hfr,
            video_stream("313", 3840, 2160, 18000.0),
        ]
    }

    /// A catalogue with no usable video streams.
    pub fn audio_only_catalogue() -> Vec<StreamDescriptor> {
        vec![audio_stream("140", 129.5), audio_stream("251", 135.0)]
    }
}
