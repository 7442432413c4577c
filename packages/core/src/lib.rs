pub mod config;
pub mod error;
pub mod scroll_timer;
pub mod segment;
pub mod time_format;
pub mod timeline;
pub mod zoom;

pub use config::{EditorConfig, ZoomPreset, PREVIEW_MODE_PROPERTY};
pub use error::{TimelineError, TimelineResult};
pub use scroll_timer::DragScrollTimer;
pub use segment::{Segment, SegmentId, SegmentList};
pub use time_format::{display_zoom_level, format_milliseconds};
pub use timeline::{PlaybackStatus, PlayerCommand, PlayheadDrag, TickOutcome, TimelineEditor};
pub use zoom::{BoxStyle, ZoomWindow};
