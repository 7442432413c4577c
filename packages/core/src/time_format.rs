//! Human readable time labels for the timeline
//!
//! Used for the shuttle labels (`00:01:05.250`) and the zoom dropdown
//! placeholder (`≈ 2 m`).

/// Format milliseconds as `HH:MM:SS.mmm`, or `HH:MM:SS` when
/// `show_milliseconds` is false.
///
/// Fractional milliseconds are truncated. Negative and non-finite values
/// produce an empty string.
pub fn format_milliseconds(ms: f64, show_milliseconds: bool) -> String {
    if !ms.is_finite() || ms < 0.0 {
        return String::new();
    }

    let total = ms as u64;
    let millis = total % 1000;
    let secs = (total / 1000) % 60;
    let mins = (total / 60_000) % 60;
    // Hours wrap at a day, the same way a UTC clock reading would
    let hours = (total / 3_600_000) % 24;

    if show_milliseconds {
        format!("{:02}:{:02}:{:02}.{:03}", hours, mins, secs, millis)
    } else {
        format!("{:02}:{:02}:{:02}", hours, mins, secs)
    }
}

/// Approximate label for a visible window length, e.g. `≈ 2 h`, `≈ 5 m`, `≈ 30 s`.
///
/// Minutes and hours round up when the next smaller unit is at least half full.
pub fn display_zoom_level(ms: f64) -> String {
    let total = if ms.is_finite() && ms > 0.0 {
        ms.round() as u64
    } else {
        0
    };
    let secs = (total / 1000) % 60;
    let mins = (total / 60_000) % 60;
    let hours = (total / 3_600_000) % 24;

    if hours > 0 {
        format!("\u{2248} {} h", hours + u64::from(mins >= 30))
    } else if mins > 0 {
        format!("\u{2248} {} m", mins + u64::from(secs >= 30))
    } else {
        format!("\u{2248} {} s", secs)
    }
}
