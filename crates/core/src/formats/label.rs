//! Quality label construction and parsing.

/// Labels above this display height are not offered.
pub const MAX_DISPLAY_HEIGHT: u32 = 1080;

/// Frame rates at or above this get a suffix in the label.
pub const HIGH_FRAME_RATE: f64 = 50.0;

/// Builds a label such as `"720p"` or `"1080p60"`.
pub fn quality_label(height: u32, frame_rate: Option<f64>) -> String {
    match frame_rate {
        Some(fps) if fps >= HIGH_FRAME_RATE => format!("{}p{}", height, fps.round() as u32),
        _ => format!("{}p", height),
    }
}

/// Numeric height embedded in a label.
///
/// Takes the leading run of digits after any leading non-digits, so
/// `"1080p60"` is 1080 and `"hd720"` is 720. A label without digits is 0;
/// a digit run too large for `u32` saturates.
pub fn label_height(label: &str) -> u32 {
    let digits: String = label
        .trim()
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u32::MAX)
}

/// Picks the label whose height is closest to the requested one.
///
/// Candidates are scanned in order and the first minimal distance wins, so
/// callers control tie-breaking through the order of `labels`.
pub fn nearest_label<'a>(labels: &'a [String], requested: &str) -> Option<&'a str> {
    let target = i64::from(label_height(requested));
    let mut best: Option<(&'a str, i64)> = None;

    for label in labels {
        let distance = (i64::from(label_height(label)) - target).abs();
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((label.as_str(), distance)),
        }
    }

    best.map(|(label, _)| label)
}
