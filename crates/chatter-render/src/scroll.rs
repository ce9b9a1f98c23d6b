//! Scroll distance, adaptive speed and eased keyframes for the scrolling track.

use crate::model::{ScrollKeyframe, ScrollPlan, Timeline};
use crate::timeline::chart_complexity;
use chatter_core::{ChatConfig, EventKind, ScrollConfig};

/// Speed multiplier for chart-heavy conversations, in `[1, max_chart_speedup]`.
pub fn chart_speed_factor(timeline: &Timeline, config: &ChatConfig) -> f64 {
    let complexities = timeline
        .timed_events
        .iter()
        .filter(|e| e.kind() == EventKind::Chart)
        .map(|e| chart_complexity(e.layout.height(), &config.timing))
        .collect::<Vec<_>>();
    if complexities.is_empty() {
        return 1.0;
    }

    let s = &config.scroll;
    let count = complexities.len() as f64;
    let avg = complexities.iter().sum::<f64>() / count;
    let boost = (s.chart_count_weight * count + s.chart_complexity_weight * (avg - 1.0)).min(1.0);
    (1.0 + boost).min(s.max_chart_speedup).max(1.0)
}

pub fn synthesize(timeline: &Timeline, viewport_height: f64, config: &ChatConfig) -> ScrollPlan {
    let scroll_distance = (timeline.total_content_height - viewport_height).max(0.0);
    if scroll_distance <= 0.0 {
        return ScrollPlan::idle();
    }

    let s = &config.scroll;
    let scroll_delay_sec = timeline.total_typing_time_ms as f64 / 1000.0 + s.delay_buffer_sec;
    let pixels_per_sec = s.pixels_per_sec * chart_speed_factor(timeline, config);
    let scroll_duration_sec = s.min_duration_sec.max(scroll_distance / pixels_per_sec);
    let final_offset =
        (timeline.total_content_height - s.last_message_margin).clamp(0.0, scroll_distance);

    let window_ms = scroll_duration_sec * 1000.0;
    let targets = timeline
        .timed_events
        .iter()
        .map(|e| ScrollKeyframe {
            percent: (e.reveal_start_ms as f64 / window_ms * 100.0).clamp(0.0, 100.0),
            offset: e.y.max(0.0),
        })
        .collect::<Vec<_>>();
    let keyframes = ease_keyframes(&targets, final_offset, s);

    let plan = ScrollPlan {
        scroll_distance,
        scroll_delay_sec,
        scroll_duration_sec,
        pixels_per_sec,
        final_offset,
        keyframes,
    };
    tracing::debug!(
        distance = plan.scroll_distance,
        delay_sec = plan.scroll_delay_sec,
        duration_sec = plan.scroll_duration_sec,
        keyframes = plan.keyframes.len(),
        "synthesized scroll plan"
    );
    plan
}

/// Builds the keyframe list from per-event targets.
///
/// Starts at `0% / 0`, inserts two eased in-betweens across wide gaps, clamps every offset to
/// `final_offset`, and ends with `100% / final_offset`. Percentages are non-decreasing and no
/// two keyframes share one.
fn ease_keyframes(
    targets: &[ScrollKeyframe],
    final_offset: f64,
    s: &ScrollConfig,
) -> Vec<ScrollKeyframe> {
    let mut raw = vec![ScrollKeyframe {
        percent: 0.0,
        offset: 0.0,
    }];
    for (i, cur) in targets.iter().enumerate() {
        raw.push(*cur);
        let Some(next) = targets.get(i + 1) else {
            continue;
        };
        let gap = next.percent - cur.percent;
        if gap > s.min_keyframe_gap_percent && next.offset != cur.offset {
            let delta = next.offset - cur.offset;
            raw.push(ScrollKeyframe {
                percent: cur.percent + gap / 3.0,
                offset: cur.offset + delta * s.ease_weights[0],
            });
            raw.push(ScrollKeyframe {
                percent: cur.percent + gap * 2.0 / 3.0,
                offset: cur.offset + delta * s.ease_weights[1],
            });
        }
    }

    let mut out: Vec<ScrollKeyframe> = Vec::with_capacity(raw.len() + 1);
    for kf in raw {
        let kf = ScrollKeyframe {
            percent: kf.percent,
            offset: kf.offset.min(final_offset),
        };
        match out.last_mut() {
            // A later declaration at the same percentage wins in CSS; keep only that one.
            Some(last) if (last.percent - kf.percent).abs() < 1e-9 => *last = kf,
            _ => out.push(kf),
        }
    }

    match out.last_mut() {
        Some(last) if (last.percent - 100.0).abs() < 1e-9 => last.offset = final_offset,
        _ => out.push(ScrollKeyframe {
            percent: 100.0,
            offset: final_offset,
        }),
    }
    out
}
