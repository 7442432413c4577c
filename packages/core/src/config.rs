//! Editor configuration
//!
//! Tuning constants for the timeline editor. Stored as JSON next to the other
//! per-user application data; every field falls back to its default when it
//! is missing from the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::{TimelineError, TimelineResult};

/// Organisation property that overrides the default preview mode
pub const PREVIEW_MODE_PROPERTY: &str = "admin.editor.previewmode.default";

/// A named entry of the zoom dropdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoomPreset {
    pub name: String,
    /// Visible window length in milliseconds, 0 means the whole video
    pub time_ms: u64,
}

impl ZoomPreset {
    pub fn new(name: impl Into<String>, time_ms: u64) -> Self {
        Self {
            name: name.into(),
            time_ms,
        }
    }

    /// The "All" preset showing the complete video
    pub fn is_full_view(&self) -> bool {
        self.time_ms == 0
    }
}

fn default_zoom_presets() -> Vec<ZoomPreset> {
    vec![
        ZoomPreset::new("All", 0),
        ZoomPreset::new("10 m", 600_000),
        ZoomPreset::new("5 m", 300_000),
        ZoomPreset::new("1 m", 60_000),
        ZoomPreset::new("30 s", 30_000),
    ]
}

/// Configuration for the timeline editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Visible window at zoom level 100
    pub min_zoom_window_ms: u64,
    /// Segments this short or shorter are merged away after a boundary drag
    pub auto_merge_threshold_ms: u64,
    /// Redraw tick driven by the host
    pub tick_interval_ms: u64,
    /// Auto-scroll tick while the play head is dragged past the track edge
    pub drag_scroll_interval_ms: u64,
    /// Skip deleted segments during playback
    pub preview_mode: bool,
    pub zoom_presets: Vec<ZoomPreset>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_zoom_window_ms: 10_000,
            auto_merge_threshold_ms: 100,
            tick_interval_ms: 40,
            drag_scroll_interval_ms: 50,
            preview_mode: true,
            zoom_presets: default_zoom_presets(),
        }
    }
}

impl EditorConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn drag_scroll_interval(&self) -> Duration {
        Duration::from_millis(self.drag_scroll_interval_ms)
    }

    /// Apply the organisation's preview mode property.
    ///
    /// Any value other than `false` (case-insensitive) enables preview mode.
    pub fn apply_preview_mode_property(&mut self, value: Option<&str>) {
        if let Some(value) = value {
            self.preview_mode = !value.trim().eq_ignore_ascii_case("false");
        }
    }

    /// Reject values the editor cannot work with
    pub fn validate(&self) -> TimelineResult<()> {
        if self.min_zoom_window_ms == 0 {
            return Err(TimelineError::config("min_zoom_window_ms must be positive"));
        }
        if self.tick_interval_ms == 0 || self.drag_scroll_interval_ms == 0 {
            return Err(TimelineError::config("timer intervals must be positive"));
        }
        if !self.zoom_presets.iter().any(ZoomPreset::is_full_view) {
            return Err(TimelineError::config(
                "zoom presets must contain a full view entry (time_ms = 0)",
            ));
        }
        Ok(())
    }

    pub fn default_path() -> PathBuf {
        let config_dir = directories::ProjectDirs::from("dev", "cutline", "Cutline")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| std::env::temp_dir().join("cutline"));

        config_dir.join("editor.json")
    }

    pub fn load_from_file(path: &Path) -> TimelineResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: EditorConfig = serde_json::from_str(&json)?;
        config.validate()?;
        info!("Loaded editor config from {:?}", path);
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> TimelineResult<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!("Saved editor config to {:?}", path);
        Ok(())
    }

    /// Load from the default location, falling back to defaults when the
    /// file is absent or unreadable.
    pub fn load_or_default() -> Self {
        let path = Self::default_path();
        if !path.exists() {
            return Self::default();
        }

        match Self::load_from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring editor config {:?}: {}", path, e);
                Self::default()
            }
        }
    }
}
