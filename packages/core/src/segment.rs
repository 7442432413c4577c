//! Segment list of a video being cut
//!
//! The list always covers the complete video without gaps or overlaps and
//! always keeps at least one playable (not deleted) segment. Every edit
//! below moves from one such list to another; invalid edits are ignored.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::{TimelineError, TimelineResult};

/// Stable handle for a segment across edits
pub type SegmentId = Uuid;

/// Default length at or below which a dragged segment is merged away
pub const DEFAULT_AUTO_MERGE_THRESHOLD_MS: u64 = 100;

/// One contiguous interval of the video timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(default = "Uuid::new_v4")]
    pub id: SegmentId,
    /// Start in milliseconds (inclusive)
    pub start: u64,
    /// End in milliseconds (exclusive)
    pub end: u64,
    /// Excluded from the cut; skipped during preview playback
    #[serde(default)]
    pub deleted: bool,
    /// Contains the play head
    #[serde(default)]
    pub selected: bool,
    /// Playback returns to the start of this segment when leaving it
    #[serde(default)]
    pub replay: bool,
}

impl Segment {
    pub fn new(start: u64, end: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            start,
            end,
            deleted: false,
            selected: false,
            replay: false,
        }
    }

    pub fn duration(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn contains(&self, position: u64) -> bool {
        self.start <= position && position < self.end
    }
}

/// Ordered, gap-free list of segments spanning `[0, duration]`
///
/// Deserialized lists go through [`SegmentList::from_segments`], so a saved
/// cut that breaks the invariants fails to load instead of producing a list
/// the edit operations cannot work on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSegmentList")]
pub struct SegmentList {
    duration: u64,
    segments: Vec<Segment>,
    auto_merge_threshold_ms: u64,
}

/// Unchecked wire form of [`SegmentList`]
#[derive(Deserialize)]
struct RawSegmentList {
    duration: u64,
    segments: Vec<Segment>,
    #[serde(default = "default_auto_merge_threshold")]
    auto_merge_threshold_ms: u64,
}

impl TryFrom<RawSegmentList> for SegmentList {
    type Error = TimelineError;

    fn try_from(raw: RawSegmentList) -> TimelineResult<Self> {
        Ok(SegmentList::from_segments(raw.duration, raw.segments)?
            .with_auto_merge_threshold(raw.auto_merge_threshold_ms))
    }
}

fn default_auto_merge_threshold() -> u64 {
    DEFAULT_AUTO_MERGE_THRESHOLD_MS
}

/// Floor a pointer-derived time to whole milliseconds within `[0, max]`
fn clamp_position(position_ms: f64, max: u64) -> Option<u64> {
    if position_ms.is_nan() {
        return None;
    }
    Some((position_ms.floor().max(0.0) as u64).min(max))
}

impl SegmentList {
    /// One playable segment spanning the whole video
    pub fn new(duration: u64) -> TimelineResult<Self> {
        if duration == 0 {
            return Err(TimelineError::InvalidDuration(duration));
        }

        Ok(Self {
            duration,
            segments: vec![Segment::new(0, duration)],
            auto_merge_threshold_ms: DEFAULT_AUTO_MERGE_THRESHOLD_MS,
        })
    }

    /// Adopt a list loaded from elsewhere, e.g. a previously saved cut
    pub fn from_segments(duration: u64, mut segments: Vec<Segment>) -> TimelineResult<Self> {
        if duration == 0 {
            return Err(TimelineError::InvalidDuration(duration));
        }

        segments.sort_by_key(|s| s.start);
        let list = Self {
            duration,
            segments,
            auto_merge_threshold_ms: DEFAULT_AUTO_MERGE_THRESHOLD_MS,
        };
        list.check_invariants()?;
        Ok(list)
    }

    pub fn with_auto_merge_threshold(mut self, threshold_ms: u64) -> Self {
        self.auto_merge_threshold_ms = threshold_ms;
        self
    }

    pub fn duration(&self) -> u64 {
        self.duration
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false for a list built through the constructors
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id == id)
    }

    pub fn index_of(&self, id: SegmentId) -> Option<usize> {
        self.segments.iter().position(|s| s.id == id)
    }

    /// Total length of the segments that survive the cut
    pub fn playable_duration(&self) -> u64 {
        self.segments
            .iter()
            .filter(|s| !s.deleted)
            .map(Segment::duration)
            .sum()
    }

    /// Verify ordering, full coverage, unique ids and that something is left to play
    pub fn check_invariants(&self) -> TimelineResult<()> {
        let (first, last) = match (self.segments.first(), self.segments.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(TimelineError::segments("list is empty")),
        };

        if first.start != 0 {
            return Err(TimelineError::segments(format!(
                "first segment starts at {} instead of 0",
                first.start
            )));
        }
        if last.end != self.duration {
            return Err(TimelineError::segments(format!(
                "last segment ends at {} instead of {}",
                last.end, self.duration
            )));
        }

        for segment in &self.segments {
            if segment.start >= segment.end {
                return Err(TimelineError::segments(format!(
                    "segment [{}, {}] is empty",
                    segment.start, segment.end
                )));
            }
        }

        for pair in self.segments.windows(2) {
            if pair[0].end != pair[1].start {
                return Err(TimelineError::segments(format!(
                    "gap or overlap between {} and {}",
                    pair[0].end, pair[1].start
                )));
            }
        }

        let mut ids = HashSet::with_capacity(self.segments.len());
        if let Some(duplicate) = self.segments.iter().find(|s| !ids.insert(s.id)) {
            return Err(TimelineError::segments(format!(
                "segment id {} appears more than once",
                duplicate.id
            )));
        }

        if self.segments.iter().all(|s| s.deleted) {
            return Err(TimelineError::segments("every segment is deleted"));
        }

        Ok(())
    }

    /// Whether `id` may be deleted or merged away without leaving nothing to play
    pub fn is_removal_allowed(&self, id: SegmentId) -> bool {
        match self.get(id) {
            Some(segment) => {
                segment.deleted || self.segments.iter().any(|s| s.id != id && !s.deleted)
            }
            None => false,
        }
    }

    /// Segment under the play head. The end of the video belongs to the last segment.
    pub fn current_index(&self, position_ms: f64) -> Option<usize> {
        let position = clamp_position(position_ms, self.duration)?;
        self.segments
            .iter()
            .position(|s| s.contains(position))
            .or_else(|| {
                if position >= self.duration {
                    self.segments.len().checked_sub(1)
                } else {
                    None
                }
            })
    }

    pub fn current_segment(&self, position_ms: f64) -> Option<&Segment> {
        self.current_index(position_ms).map(|i| &self.segments[i])
    }

    /// First playable segment at or after the play head
    pub fn next_active_segment(&self, position_ms: f64) -> Option<&Segment> {
        let index = self.current_index(position_ms)?;
        self.segments[index..].iter().find(|s| !s.deleted)
    }

    /// Mark exactly one segment as selected
    pub fn select(&mut self, id: SegmentId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        for segment in &mut self.segments {
            segment.selected = segment.id == id;
        }
        true
    }

    pub fn selected(&self) -> Option<&Segment> {
        self.segments.iter().find(|s| s.selected)
    }

    /// Width of a segment relative to the whole video, in percent
    pub fn width_percent(&self, id: SegmentId) -> f64 {
        self.get(id)
            .map(|s| s.duration() as f64 / self.duration as f64 * 100.0)
            .unwrap_or(0.0)
    }

    pub fn set_replay(&mut self, id: SegmentId, replay: bool) -> bool {
        match self.segments.iter_mut().find(|s| s.id == id) {
            Some(segment) => {
                segment.replay = replay;
                true
            }
            None => false,
        }
    }

    /// Split the segment under `position_ms` in two.
    ///
    /// The right half is a copy of the original starting at the split point
    /// and keeps its selection; the left half is deselected. Returns the id
    /// of the new right half, or `None` when the position is not strictly
    /// inside a segment.
    pub fn split_at(&mut self, position_ms: f64) -> Option<SegmentId> {
        let position = clamp_position(position_ms, self.duration)?;
        let index = self
            .segments
            .iter()
            .position(|s| s.start < position && position < s.end)?;

        let mut right = self.segments[index].clone();
        right.id = Uuid::new_v4();
        right.start = position;

        let left = &mut self.segments[index];
        left.end = position;
        left.selected = false;

        let new_id = right.id;
        self.segments.insert(index + 1, right);
        self.sort();

        debug!("Split segment at {} ms", position);
        Some(new_id)
    }

    /// Remove a segment, handing its interval to the next segment or,
    /// for the last one, to the previous segment.
    pub fn merge(&mut self, id: SegmentId) -> bool {
        if !self.is_removal_allowed(id) {
            debug!("Refused to merge segment {}: it is the last playable one", id);
            return false;
        }
        let Some(index) = self.index_of(id) else {
            return false;
        };

        let removed = &self.segments[index];
        let (start, end) = (removed.start, removed.end);

        if index + 1 < self.segments.len() {
            self.segments[index + 1].start = start;
        } else if index > 0 {
            self.segments[index - 1].end = end;
        } else {
            return false;
        }

        self.segments.remove(index);
        self.sort();

        debug!("Merged segment [{}, {}]", start, end);
        true
    }

    /// Flip the deleted flag. Boundaries never change.
    pub fn toggle_deleted(&mut self, id: SegmentId) -> bool {
        if !self.is_removal_allowed(id) {
            debug!("Refused to delete segment {}: it is the last playable one", id);
            return false;
        }

        match self.segments.iter_mut().find(|s| s.id == id) {
            Some(segment) => {
                segment.deleted = !segment.deleted;
                debug!(
                    "Segment [{}, {}] deleted = {}",
                    segment.start, segment.end, segment.deleted
                );
                true
            }
            None => false,
        }
    }

    /// Drag the start boundary of a segment to `new_start_ms`.
    ///
    /// Dragging past the segment's own end flips it so that it spans from
    /// its old end to the drop point. Neighbours follow the moved boundary;
    /// a neighbour squeezed to nothing is absorbed, or kept as a 1 ms sliver
    /// when it is the last playable segment. A segment left at or below the
    /// auto-merge threshold is merged away.
    pub fn move_start(&mut self, id: SegmentId, new_start_ms: f64) -> bool {
        let Some(mut index) = self.index_of(id) else {
            return false;
        };
        // The first segment always starts at 0
        if index == 0 {
            return false;
        }
        let Some(position) = clamp_position(new_start_ms, self.duration) else {
            return false;
        };

        let segment = &self.segments[index];
        if position == segment.start {
            return false;
        }
        // Collapsing onto its own end is a removal
        if position == segment.end && !self.is_removal_allowed(id) {
            debug!("Refused to collapse segment {}: it is the last playable one", id);
            return false;
        }

        let segment = &mut self.segments[index];
        if position >= segment.end {
            segment.start = segment.end;
            segment.end = position;
        } else {
            segment.start = position;
        }

        self.adjust_previous(index);

        self.sort();
        let Some(current) = self.index_of(id) else {
            return true;
        };
        index = current;

        if index + 1 < self.segments.len() {
            self.adjust_next(index);
        }

        let segment = &self.segments[index];
        let (start, end) = (segment.start, segment.end);
        debug!("Moved segment start to {} ms, now [{}, {}]", position, start, end);

        if end - start <= self.auto_merge_threshold_ms {
            self.merge(id);
        }

        self.sort();
        debug_assert!(self.check_invariants().is_ok());
        true
    }

    /// Make the segment before `index` end where the segment at `index` starts
    fn adjust_previous(&mut self, index: usize) {
        let segment_start = self.segments[index].start;
        let before_id = self.segments[index - 1].id;
        let before = &mut self.segments[index - 1];
        before.end = segment_start;

        if before.end > before.start {
            return;
        }

        if self.is_removal_allowed(before_id) {
            let before_start = self.segments[index - 1].start;
            self.segments[index].start = before_start;
            self.segments.remove(index - 1);
        } else {
            let sliver_end = self.segments[index - 1].start + 1;
            self.segments[index - 1].end = sliver_end;
            self.segments[index].start = sliver_end;
        }
    }

    /// Make the segment after `index` start where the segment at `index` ends
    fn adjust_next(&mut self, index: usize) {
        let segment_end = self.segments[index].end;
        let after_id = self.segments[index + 1].id;
        let after = &mut self.segments[index + 1];
        after.start = segment_end;

        if after.end > after.start {
            return;
        }

        if self.is_removal_allowed(after_id) {
            let after_end = self.segments[index + 1].end;
            self.segments[index].end = after_end;
            self.segments.remove(index + 1);
        } else {
            let sliver_start = self.segments[index + 1].end - 1;
            self.segments[index + 1].start = sliver_start;
            self.segments[index].end = sliver_start;
        }
    }

    fn sort(&mut self) {
        self.segments.sort_by_key(|s| s.start);
    }
}
