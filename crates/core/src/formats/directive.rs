//! Typed retrieval directives.

use std::fmt;

use super::types::FormatEntry;

/// What to ask the extraction engine for.
///
/// Rendered to the engine's selector syntax only at the boundary, via
/// [`RetrievalDirective::selector`] or `Display`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalDirective {
    /// A single stream carrying audio and video.
    Combined(String),
    /// A video-only stream merged with an audio-only stream.
    Paired { video: String, audio: String },
    /// Best video no taller than `max_height` plus best audio.
    BoundedFallback { max_height: u32 },
}

impl RetrievalDirective {
    /// Builds the directive for an entry.
    ///
    /// Priority is combined stream, then video + best audio, then a
    /// height-bounded selector. Returns `None` when the entry has neither a
    /// combined nor a video stream.
    pub fn for_entry(entry: &FormatEntry, best_audio: Option<&str>) -> Option<Self> {
        if let Some(id) = &entry.combined_stream_id {
            return Some(Self::Combined(id.clone()));
        }

        match (&entry.video_stream_id, best_audio) {
            (Some(video), Some(audio)) => Some(Self::Paired {
                video: video.clone(),
                audio: audio.to_string(),
            }),
            (Some(_), None) => Some(Self::BoundedFallback {
                max_height: entry.height,
            }),
            (None, _) => None,
        }
    }

    /// Engine selector string for this directive.
    pub fn selector(&self) -> String {
        match self {
            Self::Combined(id) => id.clone(),
            Self::Paired { video, audio } => format!("{}+{}", video, audio),
            Self::BoundedFallback { max_height } => format!(
                "bestvideo[height<={h}]+bestaudio/best[height<={h}]",
                h = max_height
            ),
        }
    }

    /// Short name for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Combined(_) => "combined",
            Self::Paired { .. } => "paired",
            Self::BoundedFallback { .. } => "bounded_fallback",
        }
    }
}

impl fmt::Display for RetrievalDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.selector())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(combined: Option<&str>, video: Option<&str>, height: u32) -> FormatEntry {
        FormatEntry {
            combined_stream_id: combined.map(str::to_string),
            video_stream_id: video.map(str::to_string),
            video_bitrate: 0.0,
            height,
        }
    }

    #[test]
    fn test_combined_only() {
        let directive = RetrievalDirective::for_entry(&entry(Some("137"), None, 1080), None);
        assert_eq!(directive, Some(RetrievalDirective::Combined("137".to_string())));
        assert_eq!(directive.unwrap().selector(), "137");
    }

    #[test]
    fn test_combined_preferred_over_pair() {
        let directive =
            RetrievalDirective::for_entry(&entry(Some("22"), Some("136"), 720), Some("140"))
                .unwrap();
        assert_eq!(directive.selector(), "22");
        assert_eq!(directive.kind(), "combined");
    }

    #[test]
    fn test_video_with_best_audio() {
        let directive =
            RetrievalDirective::for_entry(&entry(None, Some("248"), 1080), Some("251")).unwrap();
        assert_eq!(directive.selector(), "248+251");
        assert_eq!(directive.to_string(), "248+251");
    }

    #[test]
    fn test_video_without_audio_falls_back_to_bounded_selector() {
        let directive =
            RetrievalDirective::for_entry(&entry(None, Some("248"), 720), None).unwrap();
        assert_eq!(
            directive,
            RetrievalDirective::BoundedFallback { max_height: 720 }
        );
        let selector = directive.selector();
        assert!(selector.contains("height<=720"));
        assert!(selector.contains("bestaudio"));
    }

    #[test]
    fn test_no_usable_stream() {
        assert_eq!(
            RetrievalDirective::for_entry(&entry(None, None, 720), Some("251")),
            None
        );
    }
}
