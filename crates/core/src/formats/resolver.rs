//! Deduplication of raw stream descriptors into quality labels.

use std::collections::HashMap;

use crate::engine::StreamDescriptor;

use super::label::{label_height, quality_label, MAX_DISPLAY_HEIGHT};
use super::types::{FormatEntry, ResolvedFormats};

/// Resolve a raw stream catalogue into labels and per-label entries.
///
/// - The best audio-only stream is the one with the highest effective
///   bitrate; on ties the first one wins.
/// - Video streams without usable dimensions, or taller than
///   [`MAX_DISPLAY_HEIGHT`], are skipped. Display height is the smaller of
///   width and height so rotated streams label correctly.
/// - Per label, the first muxed stream is kept as the combined stream, and
///   the video-only stream with the highest bitrate is kept (later streams
///   win ties).
///
/// Labels come back sorted ascending by height, then by label text.
pub fn resolve_formats(streams: &[StreamDescriptor]) -> ResolvedFormats {
    let mut best_audio: Option<(&str, f64)> = None;
    for stream in streams.iter().filter(|s| s.is_audio_only()) {
        let bitrate = stream.effective_bitrate();
        match best_audio {
            Some((_, best)) if bitrate <= best => {}
            _ => best_audio = Some((stream.stream_id.as_str(), bitrate)),
        }
    }

    let mut format_map: HashMap<String, FormatEntry> = HashMap::new();

    for stream in streams.iter().filter(|s| s.has_video) {
        let (width, height) = match (stream.width, stream.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
            _ => continue,
        };

        let display_height = width.min(height);
        if display_height > MAX_DISPLAY_HEIGHT {
            continue;
        }

        let label = quality_label(display_height, stream.frame_rate);
        let entry = format_map
            .entry(label)
            .or_insert_with(|| FormatEntry::new(display_height));

        if stream.has_audio {
            if entry.combined_stream_id.is_none() {
                entry.combined_stream_id = Some(stream.stream_id.clone());
            }
        } else {
            let bitrate = stream.effective_bitrate();
            if bitrate >= entry.video_bitrate {
                entry.video_stream_id = Some(stream.stream_id.clone());
                entry.video_bitrate = bitrate;
            }
        }
    }

    let mut labels: Vec<String> = format_map.keys().cloned().collect();
    labels.sort_by(|a, b| {
        label_height(a)
            .cmp(&label_height(b))
            .then_with(|| a.cmp(b))
    });

    ResolvedFormats {
        labels,
        format_map,
        best_audio_stream_id: best_audio.map(|(id, _)| id.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(id: &str, width: u32, height: u32, bitrate: Option<f64>) -> StreamDescriptor {
        StreamDescriptor {
            stream_id: id.to_string(),
            has_video: true,
            has_audio: false,
            width: Some(width),
            height: Some(height),
            bitrate,
            fallback_bitrate: None,
            frame_rate: Some(30.0),
        }
    }

    fn muxed(id: &str, width: u32, height: u32) -> StreamDescriptor {
        StreamDescriptor {
            has_audio: true,
            ..video(id, width, height, Some(500.0))
        }
    }

    fn audio(id: &str, bitrate: Option<f64>, fallback: Option<f64>) -> StreamDescriptor {
        StreamDescriptor {
            stream_id: id.to_string(),
            has_video: false,
            has_audio: true,
            width: None,
            height: None,
            bitrate,
            fallback_bitrate: fallback,
            frame_rate: None,
        }
    }

    #[test]
    fn test_best_audio_highest_bitrate() {
        let streams = vec![
            audio("139", Some(48.0), None),
            audio("251", None, Some(160.0)),
            audio("140", Some(128.0), None),
        ];
        let resolved = resolve_formats(&streams);
        assert_eq!(resolved.best_audio_stream_id.as_deref(), Some("251"));
    }

    #[test]
    fn test_best_audio_tie_first_wins() {
        let streams = vec![audio("140", Some(128.0), None), audio("251", Some(128.0), None)];
        let resolved = resolve_formats(&streams);
        assert_eq!(resolved.best_audio_stream_id.as_deref(), Some("140"));
    }

    #[test]
    fn test_best_audio_without_bitrates() {
        let streams = vec![audio("a", None, None), audio("b", None, None)];
        let resolved = resolve_formats(&streams);
        assert_eq!(resolved.best_audio_stream_id.as_deref(), Some("a"));
    }

    #[test]
    fn test_no_audio_streams() {
        let resolved = resolve_formats(&[video("136", 1280, 720, Some(1000.0))]);
        assert!(resolved.best_audio_stream_id.is_none());
    }

    #[test]
    fn test_skips_streams_without_usable_dimensions() {
        let mut no_height = video("1", 1280, 720, None);
        no_height.height = None;
        let zero_width = video("2", 0, 720, None);
        let streams = vec![no_height, zero_width, audio("251", Some(160.0), None)];

        let resolved = resolve_formats(&streams);
        assert!(resolved.is_empty());
        assert!(resolved.format_map.is_empty());
    }

    #[test]
    fn test_excludes_above_1080() {
        let streams = vec![
            video("137", 1920, 1080, Some(4000.0)),
            video("271", 2560, 1440, Some(9000.0)),
            video("313", 3840, 2160, Some(18000.0)),
        ];
        let resolved = resolve_formats(&streams);
        assert_eq!(resolved.labels, vec!["1080p".to_string()]);
        for entry in resolved.format_map.values() {
            assert!(entry.height <= MAX_DISPLAY_HEIGHT);
        }
    }

    #[test]
    fn test_display_height_uses_smaller_dimension() {
        // Portrait 1080x1920 is a 1080p stream, not 1920p
        let resolved = resolve_formats(&[video("vertical", 1080, 1920, Some(3000.0))]);
        assert_eq!(resolved.labels, vec!["1080p".to_string()]);
        assert_eq!(resolved.format_map["1080p"].height, 1080);
    }

    #[test]
    fn test_frame_rate_suffix_splits_labels() {
        let mut hfr = video("298", 1280, 720, Some(3000.0));
        hfr.frame_rate = Some(60.0);
        let streams = vec![video("136", 1280, 720, Some(1500.0)), hfr];

        let resolved = resolve_formats(&streams);
        assert_eq!(resolved.labels, vec!["720p".to_string(), "720p60".to_string()]);
        assert_eq!(
            resolved.format_map["720p60"].video_stream_id.as_deref(),
            Some("298")
        );
    }

    #[test]
    fn test_same_bucket_yields_single_label() {
        let mut a = video("a", 1280, 720, Some(1000.0));
        a.frame_rate = Some(59.94);
        let mut b = video("b", 1280, 720, Some(900.0));
        b.frame_rate = Some(60.0);

        let resolved = resolve_formats(&[a, b]);
        assert_eq!(resolved.labels, vec!["720p60".to_string()]);
    }

    #[test]
    fn test_first_combined_stream_wins() {
        let streams = vec![muxed("22", 1280, 720), muxed("95", 1280, 720)];
        let resolved = resolve_formats(&streams);
        assert_eq!(
            resolved.format_map["720p"].combined_stream_id.as_deref(),
            Some("22")
        );
    }

    #[test]
    fn test_video_only_highest_bitrate_later_wins_ties() {
        let streams = vec![
            video("136", 1280, 720, Some(1200.0)),
            video("247", 1280, 720, Some(1500.0)),
            video("398", 1280, 720, Some(1500.0)),
            video("302", 1280, 720, Some(900.0)),
        ];
        let resolved = resolve_formats(&streams);
        let entry = &resolved.format_map["720p"];
        assert_eq!(entry.video_stream_id.as_deref(), Some("398"));
        assert_eq!(entry.video_bitrate, 1500.0);
    }

    #[test]
    fn test_video_only_without_bitrate_still_recorded() {
        let resolved = resolve_formats(&[video("160", 256, 144, None)]);
        let entry = &resolved.format_map["144p"];
        assert_eq!(entry.video_stream_id.as_deref(), Some("160"));
        assert_eq!(entry.video_bitrate, 0.0);
    }

    #[test]
    fn test_combined_and_video_share_entry() {
        let streams = vec![muxed("18", 640, 360), video("134", 640, 360, Some(600.0))];
        let resolved = resolve_formats(&streams);
        let entry = &resolved.format_map["360p"];
        assert_eq!(entry.combined_stream_id.as_deref(), Some("18"));
        assert_eq!(entry.video_stream_id.as_deref(), Some("134"));
    }

    #[test]
    fn test_labels_sorted_by_height_and_match_keys() {
        let streams = vec![
            video("137", 1920, 1080, Some(4000.0)),
            video("160", 256, 144, Some(100.0)),
            video("136", 1280, 720, Some(1500.0)),
            video("135", 854, 480, Some(800.0)),
        ];
        let resolved = resolve_formats(&streams);
        assert_eq!(resolved.labels, vec!["144p", "480p", "720p", "1080p"]);

        let mut keys: Vec<&String> = resolved.format_map.keys().collect();
        keys.sort();
        let mut labels: Vec<&String> = resolved.labels.iter().collect();
        labels.sort();
        assert_eq!(keys, labels);
    }

    #[test]
    fn test_empty_catalogue() {
        let resolved = resolve_formats(&[]);
        assert!(resolved.is_empty());
        assert!(resolved.best_audio_stream_id.is_none());
    }
}
