//! Zoom window math
//!
//! The track shows the sub-range `[from, to]` of the video. These helpers
//! convert between video time, percent offsets on the track and pixel
//! offsets, and map the 0-100 zoom slider onto a visible window length.

use serde::{Deserialize, Serialize};

use crate::config::ZoomPreset;

/// Zoom slider bounds
pub const MIN_ZOOM_LEVEL: f64 = 0.0;
pub const MAX_ZOOM_LEVEL: f64 = 100.0;

/// Visible sub-range of the timeline, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomWindow {
    pub from: f64,
    pub to: f64,
    /// Visible length. Equal to `to - from` except while the window is
    /// truncated by the end of the video.
    pub zoom_value: f64,
}

impl ZoomWindow {
    /// Window showing the whole video
    pub fn full(duration: u64) -> Self {
        let duration = duration as f64;
        Self {
            from: 0.0,
            to: duration,
            zoom_value: duration,
        }
    }

    pub fn contains(&self, time_ms: f64) -> bool {
        time_ms >= self.from && time_ms <= self.to
    }

    /// Time under a pixel offset from the left edge of the track.
    ///
    /// A track without width maps everything to `from`.
    pub fn pixel_to_time(&self, pixel_x: f64, track_width_px: f64, duration: u64) -> f64 {
        if !(track_width_px > 0.0) || !pixel_x.is_finite() {
            return self.from;
        }
        let time = self.from + pixel_x * self.zoom_value / track_width_px;
        time.clamp(0.0, duration as f64)
    }

    /// Horizontal offset of a time on the track, in percent.
    ///
    /// One pixel is kept free on both sides so the play head handle never
    /// sits flush against the track edge. An unknown width (0) disables the inset.
    pub fn time_to_percent(&self, time_ms: f64, track_width_px: f64) -> f64 {
        let one_px_percent = if track_width_px > 0.0 {
            100.0 / track_width_px
        } else {
            0.0
        };
        one_px_percent + (time_ms - self.from) / self.zoom_value * (100.0 - 2.0 * one_px_percent)
    }

    /// `time_to_percent` formatted for a CSS-like `left` value
    pub fn percent_style(&self, time_ms: f64, track_width_px: f64) -> String {
        format!("{}%", self.time_to_percent(time_ms, track_width_px))
    }
}

/// Videos this short show everything at every zoom level
pub fn too_short_to_zoom(duration: u64, min_window_ms: u64) -> bool {
    duration <= min_window_ms
}

/// Visible length for a slider position.
///
/// Linear between the whole video at level 0 and `min_window_ms` at level 100.
pub fn zoom_value_for_level(duration: u64, level: f64, min_window_ms: u64) -> f64 {
    let full = duration as f64;
    if too_short_to_zoom(duration, min_window_ms) {
        return full;
    }

    let level = level.clamp(MIN_ZOOM_LEVEL, MAX_ZOOM_LEVEL);
    let min = min_window_ms as f64;
    ((min - full) / 100.0 * level + full).clamp(min, full)
}

/// Slider position that shows `zoom_value` milliseconds
pub fn zoom_level_for_value(duration: u64, zoom_value: f64, min_window_ms: u64) -> f64 {
    if too_short_to_zoom(duration, min_window_ms) {
        return MIN_ZOOM_LEVEL;
    }

    let full = duration as f64;
    let min = min_window_ms as f64;
    ((zoom_value - full) * 100.0 / (min - full)).clamp(MIN_ZOOM_LEVEL, MAX_ZOOM_LEVEL)
}

/// Presets that make sense for a video; windows within a second of the
/// full length are dropped.
pub fn available_presets(duration: u64, presets: &[ZoomPreset]) -> Vec<ZoomPreset> {
    presets
        .iter()
        .filter(|p| p.time_ms <= duration.saturating_sub(1000) || p.is_full_view())
        .cloned()
        .collect()
}

/// Position and width of a box, both in percent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStyle {
    pub left_percent: f64,
    pub width_percent: f64,
}

/// The field of vision box in the overview bar
pub fn zoom_field_style(window: &ZoomWindow, duration: u64) -> BoxStyle {
    let full = duration as f64;
    if full <= window.zoom_value {
        return BoxStyle {
            left_percent: 0.0,
            width_percent: 100.0,
        };
    }

    BoxStyle {
        left_percent: window.from * 100.0 / full,
        width_percent: window.zoom_value * 100.0 / full,
    }
}

/// The zoomed segment track, shifted so that `from` sits at the left edge
pub fn track_style(window: &ZoomWindow, duration: u64) -> BoxStyle {
    let full = duration as f64;
    let width_percent = if full <= window.zoom_value {
        100.0
    } else {
        full * 100.0 / window.zoom_value
    };

    BoxStyle {
        left_percent: window.from / window.zoom_value * -100.0,
        width_percent,
    }
}
