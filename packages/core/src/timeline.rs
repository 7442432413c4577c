//! Timeline editor state
//!
//! Owns the segment list, the zoom window and the last observed play head
//! position of one loaded video. The host feeds it pointer offsets and the
//! player position; it answers with the new window, segment list and the
//! player commands to issue. Nothing here blocks or performs I/O.

use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::config::{EditorConfig, ZoomPreset};
use crate::scroll_timer::DragScrollTimer;
use crate::segment::{Segment, SegmentId, SegmentList};
use crate::time_format::{display_zoom_level, format_milliseconds};
use crate::zoom::{
    self, available_presets, zoom_level_for_value, zoom_value_for_level, BoxStyle, ZoomWindow,
};
use crate::TimelineResult;

/// Tolerance for a play head that is left of `from` only by rounding noise
const LEFT_OVERFLOW_TOLERANCE_MS: f64 = 0.5;

/// Player state as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Playing,
    Paused,
}

/// Instructions for the host player
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerCommand {
    /// Seek to a time in milliseconds
    Seek(f64),
    Pause,
}

/// What one redraw tick changed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    /// New zoom window, if it moved
    pub window: Option<ZoomWindow>,
    /// Segment now under the play head
    pub selected: Option<SegmentId>,
    /// Commands to apply in order
    pub commands: Vec<PlayerCommand>,
}

/// Result of moving the pointer while dragging the play head
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayheadDrag {
    /// Play head moved to this time
    Moved(f64),
    /// Pointer left the track; auto-scroll is armed until it re-enters
    OutsideTrack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragKind {
    Playhead,
    Shuttle,
}

/// Editing state of the timeline widget for one video
#[derive(Debug)]
pub struct TimelineEditor {
    config: EditorConfig,
    duration: u64,
    segments: SegmentList,
    window: ZoomWindow,
    zoom_level: f64,
    zoom_presets: Vec<ZoomPreset>,
    position: f64,
    /// Last position seen by `tick`, unchanged positions are skipped
    last_tick_position: Option<f64>,
    /// Last position seen by `follow_playback`
    last_followed_position: Option<f64>,
    last_status: Option<PlaybackStatus>,
    /// The play head was inside the window since playback started or the
    /// field of vision was last moved by hand. Playback only pages the
    /// window while this holds.
    cursor_touched_window: bool,
    preview_mode: bool,
    replay_segment: Option<SegmentId>,
    drag: Option<DragKind>,
    auto_scroll: bool,
    scroll_timer: DragScrollTimer,
    wrapper_class: String,
}

impl TimelineEditor {
    /// Editor for a freshly loaded video: one segment, fully zoomed out
    pub fn new(duration: u64, config: EditorConfig) -> TimelineResult<Self> {
        let segments = SegmentList::new(duration)?;
        Self::with_segments(segments, config)
    }

    /// Editor over an existing cut
    pub fn with_segments(segments: SegmentList, config: EditorConfig) -> TimelineResult<Self> {
        config.validate()?;
        segments.check_invariants()?;

        let duration = segments.duration();
        let segments = segments.with_auto_merge_threshold(config.auto_merge_threshold_ms);
        let zoom_presets = available_presets(duration, &config.zoom_presets);

        let mut editor = Self {
            preview_mode: config.preview_mode,
            config,
            duration,
            segments,
            window: ZoomWindow::full(duration),
            zoom_level: zoom::MIN_ZOOM_LEVEL,
            zoom_presets,
            position: 0.0,
            last_tick_position: None,
            last_followed_position: None,
            last_status: None,
            // The play head starts at 0, inside the full window
            cursor_touched_window: true,
            replay_segment: None,
            drag: None,
            auto_scroll: false,
            scroll_timer: DragScrollTimer::new(),
            wrapper_class: String::new(),
        };
        editor.update_wrapper_class();

        debug!(
            "Timeline editor ready: {} ms, {} segments",
            duration,
            editor.segments.len()
        );
        Ok(editor)
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn duration(&self) -> u64 {
        self.duration
    }

    pub fn segments(&self) -> &SegmentList {
        &self.segments
    }

    /// Final cut for the host to serialize
    pub fn into_segments(self) -> SegmentList {
        self.segments
    }

    pub fn window(&self) -> ZoomWindow {
        self.window
    }

    pub fn zoom_level(&self) -> f64 {
        self.zoom_level
    }

    pub fn zoom_presets(&self) -> &[ZoomPreset] {
        &self.zoom_presets
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn preview_mode(&self) -> bool {
        self.preview_mode
    }

    pub fn toggle_preview_mode(&mut self) {
        self.preview_mode = !self.preview_mode;
        debug!("Preview mode = {}", self.preview_mode);
    }

    pub fn too_short_to_zoom(&self) -> bool {
        zoom::too_short_to_zoom(self.duration, self.config.min_zoom_window_ms)
    }

    // Coordinates

    pub fn pixel_to_time(&self, pixel_x: f64, track_width_px: f64) -> f64 {
        self.window
            .pixel_to_time(pixel_x, track_width_px, self.duration)
    }

    pub fn time_to_percent(&self, time_ms: f64, track_width_px: f64) -> f64 {
        self.window.time_to_percent(time_ms, track_width_px)
    }

    /// `left` offset of the play head on the zoomed track
    pub fn play_head_style(&self, track_width_px: f64) -> String {
        self.window.percent_style(self.position, track_width_px)
    }

    /// Play head offset on the overview bar, which always shows the whole video
    pub fn overview_cursor_percent(&self) -> f64 {
        self.position / self.duration as f64 * 100.0
    }

    /// The play head is hidden outside the window unless a drag is scrolling it
    pub fn play_head_visible(&self) -> bool {
        self.window.contains(self.position) || self.auto_scroll
    }

    pub fn zoom_field_style(&self) -> BoxStyle {
        zoom::zoom_field_style(&self.window, self.duration)
    }

    pub fn track_style(&self) -> BoxStyle {
        zoom::track_style(&self.window, self.duration)
    }

    /// `from` and `to` labels of the field of vision
    pub fn shuttle_labels(&self) -> (String, String) {
        (
            format_milliseconds(self.window.from, true),
            format_milliseconds(self.window.to, true),
        )
    }

    pub fn zoom_label(&self) -> String {
        display_zoom_level(self.window.zoom_value)
    }

    /// Border classes of the segment wrapper, e.g. `left-selected right-deleted`
    pub fn wrapper_class(&self) -> &str {
        &self.wrapper_class
    }

    // Zoom

    /// Move the zoom slider.
    ///
    /// The new window is centred on the play head; a window pinned to the
    /// start or end of the video stays pinned. Whatever would overflow the
    /// video on one side is added to the other side.
    pub fn set_zoom_level(&mut self, level: f64) -> ZoomWindow {
        let level = if level.is_finite() { level } else { zoom::MIN_ZOOM_LEVEL };
        self.zoom_level = level.clamp(zoom::MIN_ZOOM_LEVEL, zoom::MAX_ZOOM_LEVEL);
        self.apply_zoom();
        self.window
    }

    /// Pick an entry of the zoom dropdown
    pub fn select_zoom_preset(&mut self, preset: &ZoomPreset) -> ZoomWindow {
        self.zoom_level = if preset.is_full_view() {
            zoom::MIN_ZOOM_LEVEL
        } else {
            zoom_level_for_value(
                self.duration,
                preset.time_ms as f64,
                self.config.min_zoom_window_ms,
            )
        };
        self.apply_zoom();
        self.window
    }

    fn apply_zoom(&mut self) {
        let full = self.duration as f64;
        let zoom_value =
            zoom_value_for_level(self.duration, self.zoom_level, self.config.min_zoom_window_ms);
        let half = zoom_value / 2.0;

        let anchor = if self.window.from == 0.0 {
            0.0
        } else if self.window.to == full {
            full
        } else {
            self.position.clamp(0.0, full)
        };

        let overhead_right = anchor + half - full;
        let overhead_left = half - anchor;

        let (from, to) = if overhead_right > 0.0 {
            ((anchor - half - overhead_right).max(0.0), full)
        } else if overhead_left > 0.0 {
            (0.0, (anchor + half + overhead_left).min(full))
        } else {
            (anchor - half, anchor + half)
        };

        self.window = ZoomWindow {
            from,
            to,
            zoom_value,
        };
        self.update_wrapper_class();
        debug!(
            "Zoom level {:.1}: window [{:.0}, {:.0}]",
            self.zoom_level, from, to
        );
    }

    /// Keep the play head visible during playback and after seeks.
    ///
    /// While playing, a play head past `to` pages the window forward, unless
    /// the field of vision was moved away from the play head. While paused,
    /// only a jump from inside the window pages it, forward or back. Each
    /// page is one window length, the last one snaps to the end. A play head
    /// at the very end of the video never pages. Returns the new window if
    /// it moved.
    pub fn follow_playback(&mut self, position_ms: f64, is_playing: bool) -> Option<ZoomWindow> {
        let full = self.duration as f64;
        let position = if position_ms.is_finite() {
            position_ms.clamp(0.0, full)
        } else {
            0.0
        };
        let previous = self.last_followed_position.replace(position);
        let before = self.window;
        let overflows_right = position > self.window.to && position < full;

        if is_playing {
            if self.window.contains(position) {
                self.cursor_touched_window = true;
            }
            if self.cursor_touched_window && overflows_right {
                self.page_forward_to(position);
            }
        } else if previous.is_some_and(|p| before.contains(p)) {
            if overflows_right {
                self.page_forward_to(position);
            } else if position - self.window.from < -LEFT_OVERFLOW_TOLERANCE_MS {
                self.page_back_to(position);
            }
        }

        if self.window == before {
            return None;
        }

        trace!(
            "Window follows play head to [{:.0}, {:.0}]",
            self.window.from,
            self.window.to
        );
        Some(self.window)
    }

    fn page_forward_to(&mut self, position: f64) {
        let full = self.duration as f64;
        let zoom_value = self.window.zoom_value;

        while position > self.window.to && self.window.to < full {
            let from = if full - self.window.to < zoom_value {
                full - zoom_value
            } else {
                self.window.to
            };
            self.window.from = from;
            self.window.to = from + zoom_value;
        }
    }

    fn page_back_to(&mut self, position: f64) {
        let zoom_value = self.window.zoom_value;

        while position - self.window.from < -LEFT_OVERFLOW_TOLERANCE_MS && self.window.from > 0.0
        {
            self.window.from = (self.window.from - zoom_value).max(0.0);
            self.window.to = self.window.from + zoom_value;
        }
    }

    // Playback

    /// Apply one redraw tick.
    ///
    /// Order is fixed: clamp to the video, follow with the window, select
    /// the segment under the play head, recompute wrapper classes, then
    /// handle replay segments and preview-mode skipping.
    pub fn tick(&mut self, position_ms: f64, status: PlaybackStatus) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        let full = self.duration as f64;
        let mut position = if position_ms.is_finite() {
            position_ms.max(0.0)
        } else {
            0.0
        };

        if position > full {
            position = full;
            outcome.commands.push(PlayerCommand::Seek(full));
            outcome.commands.push(PlayerCommand::Pause);
        }

        let playing = status == PlaybackStatus::Playing;
        if self.last_status.replace(status) != Some(status) {
            self.playback_status_changed(playing);
        }

        if self.last_tick_position.replace(position) == Some(position) {
            return outcome;
        }

        self.position = position;
        outcome.window = self.follow_playback(position, playing);

        let Some(current) = self.segments.current_segment(position).cloned() else {
            return outcome;
        };
        self.segments.select(current.id);
        outcome.selected = Some(current.id);
        self.update_wrapper_class();

        let next_replays = self
            .segments
            .next_active_segment(position)
            .is_some_and(|s| s.replay);
        if let Some(replay) = self.replay_segment_still_marked() {
            if !next_replays {
                outcome.commands.push(PlayerCommand::Pause);
                outcome
                    .commands
                    .push(PlayerCommand::Seek(replay.start as f64));
                self.replay_segment = None;
                debug!("Replay of [{}, {}] finished", replay.start, replay.end);
                return outcome;
            }
        }
        if current.replay {
            self.replay_segment = Some(current.id);
        }

        if self.preview_mode && current.deleted && playing {
            outcome.commands.push(PlayerCommand::Seek(current.end as f64));
            trace!("Skipping deleted segment [{}, {}]", current.start, current.end);
        }

        outcome
    }

    /// Playback starting from outside the window leaves the window alone
    /// until the play head enters it; pausing always clears the flag.
    fn playback_status_changed(&mut self, playing: bool) {
        self.cursor_touched_window = playing && self.window.contains(self.position);
        trace!(
            "Playback {}, following window = {}",
            if playing { "started" } else { "paused" },
            self.cursor_touched_window
        );
    }

    fn replay_segment_still_marked(&self) -> Option<Segment> {
        self.replay_segment
            .and_then(|id| self.segments.get(id))
            .filter(|s| s.replay)
            .cloned()
    }

    /// Click on the play track
    pub fn seek(&mut self, position_ms: f64) -> PlayerCommand {
        let position = if position_ms.is_finite() {
            position_ms.clamp(0.0, self.duration as f64)
        } else {
            0.0
        };
        self.position = position;
        if let Some(id) = self.segments.current_segment(position).map(|s| s.id) {
            self.segments.select(id);
        }
        self.update_wrapper_class();
        PlayerCommand::Seek(position)
    }

    /// Jump to the start of a segment unless it is already selected
    pub fn skip_to_segment(&mut self, id: SegmentId) -> Option<PlayerCommand> {
        let segment = self.segments.get(id)?;
        if segment.selected {
            return None;
        }

        self.position = segment.start as f64;
        self.segments.select(id);
        self.update_wrapper_class();
        Some(PlayerCommand::Seek(self.position))
    }

    // Pointer drags

    /// Move the dragged play head to a pointer offset from the track's left edge.
    ///
    /// Leaving the track arms the auto-scroll, re-entering disarms it and
    /// stops the scroll timer.
    pub fn drag_playhead(&mut self, pointer_x_px: f64, track_width_px: f64) -> PlayheadDrag {
        self.drag = Some(DragKind::Playhead);

        if pointer_x_px < 0.0 || pointer_x_px > track_width_px {
            if !self.auto_scroll {
                debug!("Play head dragged outside the track, auto-scroll armed");
            }
            self.auto_scroll = true;
            return PlayheadDrag::OutsideTrack;
        }

        self.stop_auto_scroll();
        self.position = self.pixel_to_time(pointer_x_px, track_width_px);
        self.update_wrapper_class();
        PlayheadDrag::Moved(self.position)
    }

    pub fn auto_scroll_active(&self) -> bool {
        self.auto_scroll
    }

    /// Start the scroll timer for an armed auto-scroll.
    ///
    /// Every tick on the returned channel should be answered with
    /// [`auto_scroll_step`](Self::auto_scroll_step). The timer is owned by
    /// the editor and stops when the pointer re-enters the track, on
    /// release and when the editor is dropped. Returns `None` when
    /// auto-scroll is not armed or the timer already runs. Must be called
    /// from within a tokio runtime.
    pub fn start_auto_scroll(&mut self) -> Option<mpsc::UnboundedReceiver<()>> {
        if !self.auto_scroll {
            return None;
        }
        self.scroll_timer.start(self.config.drag_scroll_interval())
    }

    pub fn auto_scroll_timer_running(&self) -> bool {
        self.scroll_timer.is_running()
    }

    fn stop_auto_scroll(&mut self) {
        self.auto_scroll = false;
        self.scroll_timer.cancel();
    }

    /// One auto-scroll tick while the pointer is `overshoot_px` beyond the
    /// track edge (negative on the left).
    ///
    /// Scrolls faster the further out the pointer is and drags the play head
    /// along with the window edge. Returns the seek to issue, or `None` when
    /// auto-scroll is not armed.
    pub fn auto_scroll_step(&mut self, overshoot_px: f64) -> Option<PlayerCommand> {
        if !self.auto_scroll || overshoot_px == 0.0 || !overshoot_px.is_finite() {
            return None;
        }

        let full = self.duration as f64;
        let zoom_value = self.window.zoom_value;
        let speed = 0.001 + (overshoot_px.abs() / 10.0).clamp(0.0, 1.0) * 0.01;
        let increment = overshoot_px.signum() * zoom_value * speed;

        if self.window.from + increment < 0.0 {
            self.window.from = 0.0;
            self.window.to = zoom_value;
            self.position = 0.0;
        } else if self.window.to + increment > full {
            self.window.from = full - zoom_value;
            self.window.to = full;
            self.position = full;
        } else {
            self.window.from += increment;
            self.window.to += increment;
            self.position = if overshoot_px < 0.0 {
                self.window.from
            } else {
                self.window.to
            };
        }

        self.update_wrapper_class();
        trace!(
            "Auto-scroll to [{:.0}, {:.0}]",
            self.window.from,
            self.window.to
        );
        Some(PlayerCommand::Seek(self.position))
    }

    /// Drag the field of vision in the overview bar
    pub fn drag_shuttle(
        &mut self,
        offset_px: f64,
        field_width_px: f64,
        shuttle_width_px: f64,
    ) -> ZoomWindow {
        self.drag = Some(DragKind::Shuttle);
        if !(field_width_px > 0.0) || !offset_px.is_finite() {
            return self.window;
        }

        let max_offset = (field_width_px - shuttle_width_px).max(0.0);
        let offset = offset_px.clamp(0.0, max_offset);

        self.window.from = self.duration as f64 * offset / field_width_px;
        self.window.to = self.window.from + self.window.zoom_value;
        // Playback follows again once the play head shows up in the new window
        self.cursor_touched_window = self.window.contains(self.position);
        self.update_wrapper_class();
        self.window
    }

    /// Pointer released: stop auto-scroll and commit a dragged position
    pub fn release_pointer(&mut self) -> Option<PlayerCommand> {
        self.stop_auto_scroll();
        self.drag
            .take()
            .map(|_| PlayerCommand::Seek(self.position))
    }

    // Segment edits

    /// Cut at the play head
    pub fn split_at_play_head(&mut self) -> Option<SegmentId> {
        self.split_at(self.position)
    }

    pub fn split_at(&mut self, position_ms: f64) -> Option<SegmentId> {
        let id = self.segments.split_at(position_ms);
        self.update_wrapper_class();
        id
    }

    pub fn merge_segment(&mut self, id: SegmentId) -> bool {
        let merged = self.segments.merge(id);
        self.update_wrapper_class();
        merged
    }

    pub fn toggle_deleted(&mut self, id: SegmentId) -> bool {
        let toggled = self.segments.toggle_deleted(id);
        self.update_wrapper_class();
        toggled
    }

    pub fn toggle_replay(&mut self, id: SegmentId) -> bool {
        let replay = match self.segments.get(id) {
            Some(segment) => !segment.replay,
            None => return false,
        };
        self.segments.set_replay(id, replay)
    }

    pub fn move_segment_start(&mut self, id: SegmentId, new_start_ms: f64) -> bool {
        let moved = self.segments.move_start(id, new_start_ms);
        self.update_wrapper_class();
        moved
    }

    /// Drop a segment's start handle at a pointer offset on the zoomed track
    pub fn drop_segment_start(
        &mut self,
        id: SegmentId,
        pointer_x_px: f64,
        track_width_px: f64,
    ) -> bool {
        let time = self.pixel_to_time(pointer_x_px, track_width_px);
        self.move_segment_start(id, time)
    }

    pub fn is_removal_allowed(&self, id: SegmentId) -> bool {
        self.segments.is_removal_allowed(id)
    }

    fn update_wrapper_class(&mut self) {
        let mut left = None;
        let mut right = None;

        for segment in self.segments.iter() {
            let start = segment.start as f64;
            let end = segment.end as f64;
            if start <= self.window.from && end >= self.window.from {
                left = Some(border_state(segment));
            }
            if start <= self.window.to && end >= self.window.to {
                right = Some(border_state(segment));
            }
        }

        let classes: Vec<String> = [
            left.map(|s| format!("left-{}", s)),
            right.map(|s| format!("right-{}", s)),
        ]
        .into_iter()
        .flatten()
        .collect();
        self.wrapper_class = classes.join(" ");
    }
}

fn border_state(segment: &Segment) -> &'static str {
    match (segment.deleted, segment.selected) {
        (true, true) => "deleted-selected",
        (true, false) => "deleted",
        (false, true) => "selected",
        (false, false) => "normal",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor(duration: u64) -> TimelineEditor {
        TimelineEditor::new(duration, EditorConfig::default()).unwrap()
    }

    fn bounds(editor: &TimelineEditor) -> Vec<(u64, u64)> {
        editor.segments().iter().map(|s| (s.start, s.end)).collect()
    }

    #[test]
    fn test_initial_state() {
        let editor = editor(100_000);
        assert_eq!(editor.window(), ZoomWindow::full(100_000));
        assert_eq!(editor.zoom_level(), 0.0);
        assert_eq!(bounds(&editor), vec![(0, 100_000)]);
        assert!(editor.preview_mode());
        assert_eq!(editor.wrapper_class(), "left-normal right-normal");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EditorConfig {
            min_zoom_window_ms: 0,
            ..EditorConfig::default()
        };
        assert!(TimelineEditor::new(100_000, config).is_err());
    }

    #[test]
    fn test_zoom_levels() {
        let mut editor = editor(100_000);

        let window = editor.set_zoom_level(100.0);
        assert_eq!(window.zoom_value, 10_000.0);
        assert_eq!((window.from, window.to), (0.0, 10_000.0));

        let window = editor.set_zoom_level(0.0);
        assert_eq!(window.zoom_value, 100_000.0);
        assert_eq!((window.from, window.to), (0.0, 100_000.0));
    }

    #[test]
    fn test_zoom_centres_on_play_head() {
        let mut editor = editor(100_000);
        editor.set_zoom_level(100.0);
        editor.drag_shuttle(300.0, 1000.0, 100.0);
        assert_eq!(editor.window().from, 30_000.0);
        editor.seek(35_000.0);

        let window = editor.set_zoom_level(50.0);
        assert_eq!(window.zoom_value, 55_000.0);
        assert_eq!((window.from, window.to), (7_500.0, 62_500.0));
    }

    #[test]
    fn test_zoom_overflow_moves_to_other_side() {
        let mut editor = editor(100_000);
        editor.set_zoom_level(100.0);
        editor.drag_shuttle(500.0, 1000.0, 100.0);
        editor.seek(54_000.0);

        // Centred on 54 s a 95.5 s window overflows on both sides, right first
        let window = editor.set_zoom_level(5.0);
        assert_eq!(window.zoom_value, 95_500.0);
        assert_eq!((window.from, window.to), (4_500.0, 100_000.0));
    }

    #[test]
    fn test_zoom_keeps_right_pin() {
        let mut editor = editor(100_000);
        editor.set_zoom_level(100.0);
        editor.drag_shuttle(900.0, 1000.0, 100.0);
        assert_eq!(editor.window().to, 100_000.0);

        let window = editor.set_zoom_level(80.0);
        assert_eq!(window.to, 100_000.0);
        assert_eq!(window.from, 100_000.0 - window.zoom_value);
    }

    #[test]
    fn test_zoom_preset() {
        let mut editor = editor(52_125);
        assert_eq!(editor.zoom_presets().len(), 2);

        let preset = editor.zoom_presets()[1].clone();
        let window = editor.select_zoom_preset(&preset);
        assert!((window.zoom_value - 30_000.0).abs() < 1e-6);
        assert_eq!(editor.zoom_label(), "\u{2248} 30 s");

        let all = editor.zoom_presets()[0].clone();
        let window = editor.select_zoom_preset(&all);
        assert_eq!(window.zoom_value, 52_125.0);
    }

    #[test]
    fn test_follow_playback_pages_to_end() {
        let mut editor = editor(100_000);
        editor.set_zoom_level(100.0);

        let window = editor.follow_playback(99_999.0, true).unwrap();
        assert_eq!((window.from, window.to), (90_000.0, 100_000.0));
    }

    #[test]
    fn test_follow_playback_inside_window_unchanged() {
        let mut editor = editor(100_000);
        editor.set_zoom_level(100.0);
        assert!(editor.follow_playback(5_000.0, true).is_none());
        assert!(editor.follow_playback(10_000.0, false).is_none());
    }

    #[test]
    fn test_follow_playback_single_page() {
        let mut editor = editor(100_000);
        editor.set_zoom_level(100.0);

        let window = editor.follow_playback(12_000.0, true).unwrap();
        assert_eq!((window.from, window.to), (10_000.0, 20_000.0));
    }

    #[test]
    fn test_follow_seek_requires_previous_inside() {
        let mut editor = editor(100_000);
        editor.set_zoom_level(100.0);

        // No previous position: a paused jump does not move the window
        assert!(editor.follow_playback(50_000.0, false).is_none());

        editor.drag_shuttle(0.0, 1000.0, 100.0);
        editor.follow_playback(9_000.0, false);
        let window = editor.follow_playback(15_000.0, false).unwrap();
        assert_eq!((window.from, window.to), (10_000.0, 20_000.0));

        let window = editor.follow_playback(4_000.0, false).unwrap();
        assert_eq!((window.from, window.to), (0.0, 10_000.0));
    }

    #[test]
    fn test_tick_selects_current_segment() {
        let mut editor = editor(100_000);
        let right = editor.split_at(40_000.0).unwrap();

        let outcome = editor.tick(45_000.0, PlaybackStatus::Paused);
        assert_eq!(outcome.selected, Some(right));
        assert!(outcome.commands.is_empty());
        assert!(editor.segments().get(right).unwrap().selected);
        assert_eq!(editor.wrapper_class(), "left-normal right-selected");

        // Same position again is ignored
        let outcome = editor.tick(45_000.0, PlaybackStatus::Paused);
        assert_eq!(outcome, TickOutcome::default());
    }

    #[test]
    fn test_tick_clamps_past_end() {
        let mut editor = editor(100_000);
        let outcome = editor.tick(100_500.0, PlaybackStatus::Playing);
        assert_eq!(
            outcome.commands,
            vec![PlayerCommand::Seek(100_000.0), PlayerCommand::Pause]
        );
        assert_eq!(editor.position(), 100_000.0);
    }

    #[test]
    fn test_preview_mode_skips_deleted() {
        let mut editor = editor(100_000);
        let right = editor.split_at(40_000.0).unwrap();
        editor.toggle_deleted(right);

        let outcome = editor.tick(41_000.0, PlaybackStatus::Playing);
        assert_eq!(outcome.commands, vec![PlayerCommand::Seek(100_000.0)]);

        // Paused playback is never skipped
        let outcome = editor.tick(42_000.0, PlaybackStatus::Paused);
        assert!(outcome.commands.is_empty());

        editor.toggle_preview_mode();
        let outcome = editor.tick(43_000.0, PlaybackStatus::Playing);
        assert!(outcome.commands.is_empty());
    }

    #[test]
    fn test_replay_segment_loops_back() {
        let mut editor = editor(100_000);
        editor.split_at(40_000.0).unwrap();
        let left = editor.segments().segments()[0].id;
        assert!(editor.toggle_replay(left));

        let outcome = editor.tick(10_000.0, PlaybackStatus::Playing);
        assert!(outcome.commands.is_empty());

        let outcome = editor.tick(39_000.0, PlaybackStatus::Playing);
        assert!(outcome.commands.is_empty());

        let outcome = editor.tick(40_040.0, PlaybackStatus::Playing);
        assert_eq!(
            outcome.commands,
            vec![PlayerCommand::Pause, PlayerCommand::Seek(0.0)]
        );
    }

    #[test]
    fn test_skip_to_segment() {
        let mut editor = editor(100_000);
        let right = editor.split_at(40_000.0).unwrap();

        assert_eq!(
            editor.skip_to_segment(right),
            Some(PlayerCommand::Seek(40_000.0))
        );
        assert!(editor.segments().get(right).unwrap().selected);
        assert_eq!(editor.skip_to_segment(right), None);
    }

    #[test]
    fn test_playhead_drag_and_auto_scroll() {
        let mut editor = editor(100_000);
        editor.set_zoom_level(100.0);
        editor.drag_shuttle(500.0, 1000.0, 100.0);
        assert_eq!(editor.window().from, 50_000.0);

        assert_eq!(
            editor.drag_playhead(250.0, 1000.0),
            PlayheadDrag::Moved(52_500.0)
        );
        assert_eq!(editor.drag_playhead(1_020.0, 1000.0), PlayheadDrag::OutsideTrack);
        assert!(editor.auto_scroll_active());
        assert!(editor.play_head_visible());

        // 20 px out: 1.1 % of the window per tick
        let command = editor.auto_scroll_step(20.0).unwrap();
        assert!((editor.window().from - 50_110.0).abs() < 1e-6);
        assert_eq!(command, PlayerCommand::Seek(editor.window().to));

        // Re-entering the track disarms it
        editor.drag_playhead(500.0, 1000.0);
        assert!(!editor.auto_scroll_active());
        assert!(editor.auto_scroll_step(20.0).is_none());

        assert!(editor.release_pointer().is_some());
        assert!(editor.release_pointer().is_none());
    }

    #[test]
    fn test_auto_scroll_snaps_to_start() {
        let mut editor = editor(100_000);
        editor.set_zoom_level(100.0);
        editor.drag_playhead(-10.0, 1000.0);

        assert_eq!(editor.auto_scroll_step(-10.0), Some(PlayerCommand::Seek(0.0)));
        assert_eq!(editor.window().from, 0.0);
        assert_eq!(editor.window().to, 10_000.0);

        assert_eq!(editor.release_pointer(), Some(PlayerCommand::Seek(0.0)));
        assert!(!editor.auto_scroll_active());
    }

    #[test]
    fn test_drop_segment_start() {
        let mut editor = editor(100_000);
        let right = editor.split_at(40_000.0).unwrap();

        assert!(editor.drop_segment_start(right, 350.0, 1000.0));
        assert_eq!(bounds(&editor), vec![(0, 35_000), (35_000, 100_000)]);
    }

    #[test]
    fn test_shuttle_labels() {
        let mut editor = editor(100_000);
        editor.set_zoom_level(100.0);
        let (from, to) = editor.shuttle_labels();
        assert_eq!(from, "00:00:00.000");
        assert_eq!(to, "00:00:10.000");
    }

    #[test]
    fn test_follow_stops_after_shuttle_moved_away() {
        let mut editor = editor(100_000);
        editor.set_zoom_level(100.0);
        editor.tick(5_000.0, PlaybackStatus::Playing);
        let outcome = editor.tick(50_000.0, PlaybackStatus::Playing);
        assert_eq!(outcome.window.map(|w| w.from), Some(40_000.0));

        // Looking back at the start while the video keeps playing
        editor.drag_shuttle(0.0, 1000.0, 100.0);
        let outcome = editor.tick(50_040.0, PlaybackStatus::Playing);
        assert!(outcome.window.is_none());
        assert_eq!((editor.window().from, editor.window().to), (0.0, 10_000.0));

        // Bringing the play head back into view resumes following
        editor.drag_shuttle(500.0, 1000.0, 100.0);
        let outcome = editor.tick(61_000.0, PlaybackStatus::Playing);
        let window = outcome.window.unwrap();
        assert_eq!((window.from, window.to), (60_000.0, 70_000.0));
    }

    #[test]
    fn test_playback_started_outside_window_is_not_followed() {
        let mut editor = editor(100_000);
        editor.set_zoom_level(100.0);
        editor.seek(50_000.0);

        let outcome = editor.tick(50_040.0, PlaybackStatus::Playing);
        assert!(outcome.window.is_none());
        assert_eq!(editor.window().from, 0.0);

        let outcome = editor.tick(50_080.0, PlaybackStatus::Paused);
        assert!(outcome.window.is_none());
    }

    #[test]
    fn test_follow_ignores_end_of_video() {
        let mut editor = editor(100_000);
        editor.set_zoom_level(100.0);
        assert!(editor.follow_playback(100_000.0, true).is_none());
        assert!(editor.follow_playback(100_000.0, false).is_none());
    }

    #[test]
    fn test_follow_playback_does_not_swallow_tick() {
        let mut editor = editor(100_000);
        let right = editor.split_at(40_000.0).unwrap();

        editor.follow_playback(45_000.0, false);
        let outcome = editor.tick(45_000.0, PlaybackStatus::Paused);
        assert_eq!(outcome.selected, Some(right));
    }

    #[test]
    fn test_start_auto_scroll_requires_armed_drag() {
        let mut editor = editor(100_000);
        assert!(editor.start_auto_scroll().is_none());
        assert!(!editor.auto_scroll_timer_running());
    }

    #[tokio::test]
    async fn test_auto_scroll_timer_stops_on_reentry() {
        let mut editor = editor(100_000);
        editor.set_zoom_level(100.0);
        editor.drag_playhead(1_030.0, 1000.0);

        let mut ticks = editor.start_auto_scroll().unwrap();
        assert!(editor.auto_scroll_timer_running());
        assert!(editor.start_auto_scroll().is_none());

        let tick = tokio::time::timeout(std::time::Duration::from_secs(1), ticks.recv())
            .await
            .unwrap();
        assert_eq!(tick, Some(()));

        editor.drag_playhead(500.0, 1000.0);
        assert!(!editor.auto_scroll_timer_running());

        let closed = tokio::time::timeout(std::time::Duration::from_secs(1), async {
            while ticks.recv().await.is_some() {}
        })
        .await;
        assert!(closed.is_ok());
    }

    #[tokio::test]
    async fn test_release_stops_auto_scroll_timer() {
        let mut editor = editor(100_000);
        editor.set_zoom_level(100.0);
        editor.drag_playhead(-20.0, 1000.0);
        let _ticks = editor.start_auto_scroll().unwrap();

        assert!(editor.release_pointer().is_some());
        assert!(!editor.auto_scroll_active());
        assert!(!editor.auto_scroll_timer_running());
    }
}
