//! Per-event footprint: wrapped text bubbles and chart blocks.
//!
//! Layout is a pure function of (event, config, available width). Nothing random happens here,
//! so measuring the same event twice yields identical results.

use crate::model::{
    ChartBody, ChartLayout, ChartRowLayout, DonutLayout, LayoutResult, TextLayout,
};
use crate::text::{DeterministicTextMeasurer, TextMeasurer, TextStyle, wrap_text_lines};
use chatter_core::{ChartData, ChartType, ChatConfig, ConversationEvent, EventContent};

pub struct LayoutEngine<'a> {
    config: &'a ChatConfig,
    measurer: &'a dyn TextMeasurer,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(config: &'a ChatConfig, measurer: &'a dyn TextMeasurer) -> Self {
        Self { config, measurer }
    }

    pub fn measure(&self, event: &ConversationEvent, available_width: f64) -> LayoutResult {
        match &event.content {
            EventContent::Text(text) => LayoutResult::Text(self.measure_text(text, available_width)),
            EventContent::Chart(chart) => {
                LayoutResult::Chart(self.measure_chart(chart, available_width))
            }
        }
    }

    pub fn measure_text(&self, text: &str, available_width: f64) -> TextLayout {
        let l = &self.config.layout;
        let style = TextStyle {
            font_family: Some(self.config.theme.font_family.clone()),
            font_size: l.font_size,
            font_weight: None,
        };

        let max_width = l.max_bubble_width.min(available_width).max(l.min_bubble_width);
        let max_text_width = max_width - 2.0 * l.bubble_pad_x;
        let lines = wrap_text_lines(text, &style, max_text_width, self.measurer);

        let longest = lines
            .iter()
            .map(|line| self.measurer.line_width(line, &style))
            .fold(0.0_f64, f64::max);
        let width = (longest + 2.0 * l.bubble_pad_x)
            .max(l.min_bubble_width)
            .min(max_width);

        let one_line = l.line_height + 2.0 * l.bubble_pad_y;
        let height = (lines.len() as f64 * l.line_height + 2.0 * l.bubble_pad_y).max(one_line);

        TextLayout {
            width,
            height,
            line_count: lines.len(),
            wrapped_lines: lines,
        }
    }

    pub fn measure_chart(&self, chart: &ChartData, available_width: f64) -> ChartLayout {
        let cs = &self.config.theme.chart;
        let width = available_width.max(self.config.layout.min_bubble_width);
        let inner_width = (width - 2.0 * cs.padding_x).max(1.0);

        let (title_lines, title_block_height) = match chart.title() {
            Some(title) => {
                let style = TextStyle {
                    font_family: Some(cs.title_font_family.clone()),
                    font_size: cs.title_font_size,
                    font_weight: Some("bold".to_string()),
                };
                let lines = wrap_text_lines(title, &style, inner_width, self.measurer);
                let h = lines.len() as f64 * cs.title_line_height() + cs.title_bottom_margin;
                (lines, h)
            }
            None => (Vec::new(), 0.0),
        };

        let content_top = cs.padding_y + title_block_height;
        let n = chart.items.len();
        let (body, rows, donut, content_height) = match &chart.chart_type {
            ChartType::Bar => {
                let mut rows = Vec::with_capacity(n);
                let mut y = content_top;
                for i in 0..n {
                    let height = cs.label_font_size + cs.bar_height;
                    let spacing = if i + 1 < n { cs.bar_spacing } else { 0.0 };
                    rows.push(ChartRowLayout { y, height, spacing });
                    y += height + spacing;
                }
                (ChartBody::Bar, rows, None, y - content_top)
            }
            ChartType::Donut => {
                let diameter = inner_width.min(cs.donut_max_diameter);
                let legend_row_height = cs.donut_legend_font_size + cs.donut_legend_item_spacing;
                let legend_height = if n > 0 {
                    cs.donut_legend_gap + n as f64 * legend_row_height
                } else {
                    0.0
                };
                let donut = DonutLayout {
                    center_x: width / 2.0,
                    center_y: content_top + diameter / 2.0,
                    diameter,
                    legend_top: content_top + diameter + cs.donut_legend_gap,
                    legend_row_height,
                };
                (
                    ChartBody::Donut,
                    Vec::new(),
                    Some(donut),
                    diameter + legend_height,
                )
            }
            ChartType::Unsupported(_) => (ChartBody::Unsupported, Vec::new(), None, 0.0),
        };

        let row_count = match body {
            ChartBody::Unsupported => 0,
            _ => n,
        };

        ChartLayout {
            width,
            height: content_top + content_height + cs.padding_y,
            row_count,
            body,
            title_lines,
            title_block_height,
            content_top,
            rows,
            donut,
        }
    }
}

/// Measures `event` with the deterministic measurer configured in `config.layout`.
pub fn measure(event: &ConversationEvent, config: &ChatConfig, available_width: f64) -> LayoutResult {
    let measurer = DeterministicTextMeasurer::new(config.layout.char_width_factor);
    LayoutEngine::new(config, &measurer).measure(event, available_width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatter_core::{ChartItem, Sender};

    fn chart(chart_type: ChartType, title: Option<&str>, n: usize) -> ChartData {
        ChartData {
            chart_type,
            title: title.map(str::to_string),
            items: (0..n)
                .map(|i| ChartItem::new(format!("item {i}"), (i + 1) as f64))
                .collect(),
            ..ChartData::default()
        }
    }

    #[test]
    fn short_text_hugs_its_content() {
        let cfg = ChatConfig::default();
        let LayoutResult::Text(t) = measure(&ConversationEvent::text(Sender::Me, "Hi"), &cfg, 260.0)
        else {
            panic!("expected text layout");
        };
        // "Hi" = 2 columns * 14px * 0.6 = 16.8px, plus 24px padding.
        assert!((t.width - 40.8).abs() < 1e-9, "{}", t.width);
        assert_eq!(t.height, 36.0);
        assert_eq!(t.wrapped_lines, vec!["Hi"]);
    }

    #[test]
    fn tiny_text_is_clamped_to_the_minimum_width() {
        let cfg = ChatConfig::default();
        let LayoutResult::Text(t) = measure(&ConversationEvent::text(Sender::Me, ""), &cfg, 260.0)
        else {
            panic!("expected text layout");
        };
        assert_eq!(t.width, 40.0);
        assert_eq!(t.height, 36.0);
        assert_eq!(t.line_count, 1);
    }

    #[test]
    fn long_text_wraps_within_the_maximum_width() {
        let cfg = ChatConfig::default();
        let text = "This is a fairly long message that will certainly need to wrap onto several lines";
        let LayoutResult::Text(t) = measure(&ConversationEvent::text(Sender::Visitor, text), &cfg, 260.0)
        else {
            panic!("expected text layout");
        };
        assert!(t.line_count > 1);
        assert!(t.width <= 260.0);
        assert_eq!(t.height, t.line_count as f64 * 20.0 + 16.0);
    }

    #[test]
    fn narrow_available_width_wins_over_max_bubble_width() {
        let cfg = ChatConfig::default();
        let text = "words words words words words words words words words words";
        let LayoutResult::Text(t) = measure(&ConversationEvent::text(Sender::Me, text), &cfg, 120.0)
        else {
            panic!("expected text layout");
        };
        assert!(t.width <= 120.0);
    }

    #[test]
    fn bar_chart_height_matches_the_row_formula() {
        let cfg = ChatConfig::default();
        let cs = &cfg.theme.chart;
        let engine_measurer = DeterministicTextMeasurer::default();
        let engine = LayoutEngine::new(&cfg, &engine_measurer);
        let c = engine.measure_chart(&chart(ChartType::Bar, None, 3), 260.0);
        let rows = 3.0 * (cs.label_font_size + cs.bar_height) + 2.0 * cs.bar_spacing;
        assert_eq!(c.height, cs.padding_y + rows + cs.padding_y);
        assert_eq!(c.row_count, 3);
        assert_eq!(c.rows[2].spacing, 0.0);
        assert_eq!(c.width, 260.0);
    }

    #[test]
    fn donut_height_includes_the_legend() {
        let cfg = ChatConfig::default();
        let cs = &cfg.theme.chart;
        let c = match measure(
            &ConversationEvent::chart(Sender::Me, chart(ChartType::Donut, None, 4)),
            &cfg,
            260.0,
        ) {
            LayoutResult::Chart(c) => c,
            other => panic!("expected chart layout, got {other:?}"),
        };
        let diameter = (260.0 - 2.0 * cs.padding_x).min(cs.donut_max_diameter);
        let legend = cs.donut_legend_gap
            + 4.0 * (cs.donut_legend_font_size + cs.donut_legend_item_spacing);
        assert_eq!(c.height, cs.padding_y + diameter + legend + cs.padding_y);
        let donut = c.donut.expect("donut geometry");
        assert_eq!(donut.center_x, 130.0);
    }

    #[test]
    fn unsupported_chart_keeps_padding_and_title_only() {
        let cfg = ChatConfig::default();
        let cs = &cfg.theme.chart;
        let LayoutResult::Chart(c) = measure(
            &ConversationEvent::chart(
                Sender::Me,
                chart(ChartType::Unsupported("radar".into()), Some("T"), 3),
            ),
            &cfg,
            260.0,
        ) else {
            panic!("expected chart layout");
        };
        assert_eq!(c.body, ChartBody::Unsupported);
        assert_eq!(c.row_count, 0);
        assert_eq!(
            c.height,
            2.0 * cs.padding_y + cs.title_line_height() + cs.title_bottom_margin
        );
    }

    #[test]
    fn missing_values_do_not_abort_layout() {
        let cfg = ChatConfig::default();
        let mut data = chart(ChartType::Bar, Some("Oops"), 2);
        data.items[0].value = None;
        data.items[1].value = Some(f64::NAN);
        let a = measure(&ConversationEvent::chart(Sender::Visitor, data.clone()), &cfg, 260.0);
        let b = measure(&ConversationEvent::chart(Sender::Visitor, data), &cfg, 260.0);
        assert_eq!(a, b);
    }
}
