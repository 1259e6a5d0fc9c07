//! Clock-string helpers for the transport display

/// Format seconds as `m:ss`, or `h:mm:ss` past the hour
///
/// Negative and non-finite inputs render as `0:00`.
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };

    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

/// Parse `m:ss` / `h:mm:ss` (or bare seconds) into seconds
pub fn parse_clock(label: &str) -> Option<f64> {
    let parts: Vec<&str> = label.trim().split(':').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }

    let mut total = 0.0;
    for (i, part) in parts.iter().enumerate() {
        let value: f64 = part.parse().ok()?;
        if value < 0.0 || !value.is_finite() {
            return None;
        }
        // Only the leading field may exceed 59
        if i > 0 && value >= 60.0 {
            return None;
        }
        total = total * 60.0 + value;
    }

    Some(total)
}
