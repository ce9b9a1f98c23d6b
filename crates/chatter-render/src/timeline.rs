//! Single forward pass turning events into an absolute timeline.
//!
//! `typing_start(0) = sender_delay(0)`, and for later events
//! `typing_start(i) = reveal(i - 1) + reading(i - 1) + sender_delay(i)`.
//! The only randomness is the bounded reading-time jitter, drawn from the caller's RNG.

use crate::layout::LayoutEngine;
use crate::model::{LayoutResult, TimedEvent, Timeline};
use crate::text::{DeterministicTextMeasurer, TextMeasurer};
use chatter_core::{
    ChartData, ChatConfig, ConversationEvent, EventContent, Sender, Substitutions, TimingConfig,
};
use rand::Rng;

pub struct TimelineScheduler<'a> {
    config: &'a ChatConfig,
    layout: LayoutEngine<'a>,
}

impl<'a> TimelineScheduler<'a> {
    pub fn new(config: &'a ChatConfig, measurer: &'a dyn TextMeasurer) -> Self {
        Self {
            config,
            layout: LayoutEngine::new(config, measurer),
        }
    }

    pub fn schedule<R: Rng + ?Sized>(
        &self,
        events: &[ConversationEvent],
        vars: &Substitutions,
        rng: &mut R,
    ) -> Timeline {
        let cfg = self.config;
        let available_width = cfg.available_bubble_width();

        let mut timed_events: Vec<TimedEvent> = Vec::with_capacity(events.len());
        let mut y = cfg.layout.top_margin;
        let mut total_typing_time_ms = 0u64;
        let mut previous: Option<(Sender, u64)> = None;

        for (index, raw) in events.iter().enumerate() {
            let event = vars.resolve_event(raw);
            let layout = self.layout.measure(&event, available_width);

            let typing_duration_ms = typing_duration_ms(&event, &cfg.timing);
            let sender_delay_ms = sender_delay_ms(
                event.sender,
                previous.map(|(sender, _)| sender),
                &cfg.timing,
            );
            let typing_start_ms = match previous {
                Some((_, ready_ms)) => ready_ms + sender_delay_ms,
                None => sender_delay_ms,
            };
            let reveal_start_ms = typing_start_ms + typing_duration_ms;
            let reading_time_ms = reading_time_ms(&event, &layout, &cfg.timing, rng);

            let rendered_height = match layout {
                LayoutResult::Text(_) => layout.height(),
                LayoutResult::Chart(_) => layout.height() + cfg.layout.chart_outer_padding,
            };

            total_typing_time_ms += typing_duration_ms;
            previous = Some((event.sender, reveal_start_ms + reading_time_ms));

            let reaction = event.reaction().map(str::to_string);
            timed_events.push(TimedEvent {
                index,
                event,
                layout,
                y,
                rendered_height,
                typing_start_ms,
                typing_duration_ms,
                reveal_start_ms,
                reading_time_ms,
                sender_delay_ms,
                reaction,
            });

            y += rendered_height + cfg.layout.vertical_spacing;
        }

        let total_duration_ms = previous
            .map(|(_, ready_ms)| ready_ms)
            .unwrap_or(0)
            + cfg.timing.end_buffer_ms;

        let timeline = Timeline {
            timed_events,
            total_content_height: y + cfg.layout.bottom_margin,
            total_typing_time_ms,
            viewport_height: cfg.layout.chat_height,
            total_duration_ms,
        };
        tracing::debug!(
            events = timeline.timed_events.len(),
            total_content_height = timeline.total_content_height,
            total_typing_time_ms = timeline.total_typing_time_ms,
            total_duration_ms = timeline.total_duration_ms,
            "scheduled conversation timeline"
        );
        timeline
    }
}

/// Character count standing in for text length when estimating how long a chart takes to "type".
fn chart_length_proxy(chart: &ChartData, timing: &TimingConfig) -> u64 {
    let title = chart.title().map(|t| t.chars().count()).unwrap_or(0) as u64;
    chart.items.len() as u64 * timing.chart_item_chars + title
}

pub fn typing_duration_ms(event: &ConversationEvent, timing: &TimingConfig) -> u64 {
    let len = match &event.content {
        EventContent::Text(text) => text.chars().count() as u64,
        EventContent::Chart(chart) => chart_length_proxy(chart, timing),
    };
    // Inverted bounds: the floor wins.
    len.saturating_mul(timing.typing_char_ms)
        .min(timing.typing_max_ms)
        .max(timing.typing_min_ms)
}

pub fn sender_delay_ms(current: Sender, previous: Option<Sender>, timing: &TimingConfig) -> u64 {
    match previous {
        Some(prev) if prev == current => timing.same_sender_delay_ms,
        _ => timing.sender_change_delay_ms,
    }
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Visual complexity of a chart bubble, in `[1, max_chart_complexity]`.
pub fn chart_complexity(height: f64, timing: &TimingConfig) -> f64 {
    (height / timing.chart_complexity_height).clamp(1.0, timing.max_chart_complexity.max(1.0))
}

/// Reading time without jitter.
pub fn base_reading_time_ms(
    event: &ConversationEvent,
    layout: &LayoutResult,
    timing: &TimingConfig,
) -> u64 {
    let (words, multiplier, complexity) = match &event.content {
        EventContent::Text(text) => (word_count(text), timing.text_reading_multiplier, 1.0),
        EventContent::Chart(chart) => {
            let words = chart.title().map(word_count).unwrap_or(0)
                + chart
                    .items
                    .iter()
                    .map(|item| word_count(&item.label) + 1)
                    .sum::<usize>();
            (
                words,
                timing.chart_reading_multiplier,
                chart_complexity(layout.height(), timing),
            )
        }
    };
    let modeled = words as f64 * timing.ms_per_word as f64 * multiplier * complexity;
    (timing.min_reading_ms as f64).max(modeled).round() as u64
}

pub fn reading_time_ms<R: Rng + ?Sized>(
    event: &ConversationEvent,
    layout: &LayoutResult,
    timing: &TimingConfig,
    rng: &mut R,
) -> u64 {
    let jitter = if timing.reading_jitter_ms > 0 {
        rng.gen_range(0..timing.reading_jitter_ms)
    } else {
        0
    };
    base_reading_time_ms(event, layout, timing) + jitter
}

/// Schedules `events` with the deterministic measurer and a thread-local RNG for jitter.
pub fn schedule(events: &[ConversationEvent], config: &ChatConfig, vars: &Substitutions) -> Timeline {
    schedule_with_rng(events, config, vars, &mut rand::thread_rng())
}

pub fn schedule_with_rng<R: Rng + ?Sized>(
    events: &[ConversationEvent],
    config: &ChatConfig,
    vars: &Substitutions,
    rng: &mut R,
) -> Timeline {
    let measurer = DeterministicTextMeasurer::new(config.layout.char_width_factor);
    TimelineScheduler::new(config, &measurer).schedule(events, vars, rng)
}
