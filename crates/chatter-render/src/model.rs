use chatter_core::{ConversationEvent, EventKind, Sender};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLayout {
    pub width: f64,
    pub height: f64,
    pub line_count: usize,
    pub wrapped_lines: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartBody {
    Bar,
    Donut,
    /// Laid out as padding plus title only; the emitter skips it.
    Unsupported,
}

/// One bar row: label line on top, bar beneath.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRowLayout {
    /// Top of the row, relative to the bubble.
    pub y: f64,
    pub height: f64,
    /// Gap below this row (zero for the last row).
    pub spacing: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonutLayout {
    pub center_x: f64,
    pub center_y: f64,
    pub diameter: f64,
    /// Top of the first legend row, relative to the bubble.
    pub legend_top: f64,
    pub legend_row_height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub row_count: usize,
    pub body: ChartBody,
    pub title_lines: Vec<String>,
    pub title_block_height: f64,
    /// Top of the row stack (or donut), relative to the bubble.
    pub content_top: f64,
    pub rows: Vec<ChartRowLayout>,
    pub donut: Option<DonutLayout>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LayoutResult {
    Text(TextLayout),
    Chart(ChartLayout),
}

impl LayoutResult {
    pub fn width(&self) -> f64 {
        match self {
            LayoutResult::Text(t) => t.width,
            LayoutResult::Chart(c) => c.width,
        }
    }

    pub fn height(&self) -> f64 {
        match self {
            LayoutResult::Text(t) => t.height,
            LayoutResult::Chart(c) => c.height,
        }
    }
}

/// One scheduled conversation event. All times are milliseconds from timeline zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimedEvent {
    pub index: usize,
    /// The event with placeholders already resolved.
    pub event: ConversationEvent,
    pub layout: LayoutResult,
    pub y: f64,
    pub rendered_height: f64,
    pub typing_start_ms: u64,
    pub typing_duration_ms: u64,
    pub reveal_start_ms: u64,
    pub reading_time_ms: u64,
    pub sender_delay_ms: u64,
    pub reaction: Option<String>,
}

impl TimedEvent {
    pub fn sender(&self) -> Sender {
        self.event.sender
    }

    pub fn kind(&self) -> EventKind {
        self.event.kind()
    }

    pub fn typing_end_ms(&self) -> u64 {
        self.typing_start_ms + self.typing_duration_ms
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub timed_events: Vec<TimedEvent>,
    pub total_content_height: f64,
    pub total_typing_time_ms: u64,
    pub viewport_height: f64,
    /// Last reveal plus its reading time plus the configured end buffer.
    pub total_duration_ms: u64,
}

/// Flattened view of a timeline: every message is preceded by its typing phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimelineItem<'a> {
    Typing(&'a TimedEvent),
    Message(&'a TimedEvent),
}

impl TimelineItem<'_> {
    pub fn start_ms(&self) -> u64 {
        match self {
            TimelineItem::Typing(e) => e.typing_start_ms,
            TimelineItem::Message(e) => e.reveal_start_ms,
        }
    }

    pub fn sender(&self) -> Sender {
        match self {
            TimelineItem::Typing(e) | TimelineItem::Message(e) => e.sender(),
        }
    }

    pub fn is_typing(&self) -> bool {
        matches!(self, TimelineItem::Typing(_))
    }
}

impl Timeline {
    pub fn items(&self) -> Vec<TimelineItem<'_>> {
        self.timed_events
            .iter()
            .flat_map(|e| [TimelineItem::Typing(e), TimelineItem::Message(e)])
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.timed_events.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollKeyframe {
    pub percent: f64,
    /// Upward scroll in px (positive); emitted as a negative translation.
    pub offset: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollPlan {
    pub scroll_distance: f64,
    pub scroll_delay_sec: f64,
    pub scroll_duration_sec: f64,
    pub pixels_per_sec: f64,
    pub final_offset: f64,
    pub keyframes: Vec<ScrollKeyframe>,
}

impl ScrollPlan {
    pub fn idle() -> Self {
        Self {
            scroll_distance: 0.0,
            scroll_delay_sec: 0.0,
            scroll_duration_sec: 0.0,
            pixels_per_sec: 0.0,
            final_offset: 0.0,
            keyframes: Vec::new(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.scroll_distance <= 0.0 || self.keyframes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineResult {
    pub timeline: Timeline,
    pub scroll: ScrollPlan,
}

impl TimelineResult {
    pub fn items(&self) -> Vec<TimelineItem<'_>> {
        self.timeline.items()
    }

    pub fn timed_events(&self) -> &[TimedEvent] {
        &self.timeline.timed_events
    }
}
