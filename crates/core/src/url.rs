//! Source URL normalization.

use once_cell::sync::Lazy;
use regex_lite::Regex;

static SHORT_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\.)?youtu\.be/([A-Za-z0-9_-]+)").unwrap()
});

static PATH_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\.|m\.)?youtube\.com/(?:shorts|embed|live)/([A-Za-z0-9_-]+)")
        .unwrap()
});

static WATCH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\.|m\.)?youtube\.com/watch\?(?:.*&)?v=([A-Za-z0-9_-]+)")
        .unwrap()
});

/// Rewrite known short and alternate link forms to the canonical watch URL.
///
/// Anything not recognised, including malformed input, is returned trimmed
/// but otherwise unchanged.
pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();

    for pattern in [&*SHORT_LINK, &*PATH_ID, &*WATCH] {
        if let Some(id) = pattern.captures(trimmed).and_then(|c| c.get(1)) {
            return canonical_watch_url(id.as_str());
        }
    }

    trimmed.to_string()
}

fn canonical_watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}
