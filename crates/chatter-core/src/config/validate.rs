use super::ChatConfig;
use crate::error::{ConfigError, ConfigIssue};
use crate::theme::{ChartPalette, Theme};
use regex::Regex;
use std::sync::OnceLock;

fn hex_color_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^#(?:[0-9A-Fa-f]{3}|[0-9A-Fa-f]{4}|[0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$")
            .expect("valid regex")
    })
}

#[derive(Default)]
struct Checker {
    issues: Vec<ConfigIssue>,
}

impl Checker {
    fn color(&mut self, path: &str, value: &str) {
        if !hex_color_regex().is_match(value.trim()) {
            self.issues.push(ConfigIssue::new(
                path,
                format!("`{value}` is not a hex color (#RGB, #RGBA, #RRGGBB or #RRGGBBAA)"),
            ));
        }
    }

    fn positive(&mut self, path: &str, value: f64) {
        if !(value.is_finite() && value > 0.0) {
            self.issues
                .push(ConfigIssue::new(path, format!("expected a positive number, got {value}")));
        }
    }

    fn non_negative(&mut self, path: &str, value: f64) {
        if !(value.is_finite() && value >= 0.0) {
            self.issues.push(ConfigIssue::new(
                path,
                format!("expected a non-negative number, got {value}"),
            ));
        }
    }

    fn finite(&mut self, path: &str, value: f64) {
        if !value.is_finite() {
            self.issues
                .push(ConfigIssue::new(path, format!("expected a finite number, got {value}")));
        }
    }

    fn unit(&mut self, path: &str, value: f64) {
        if !(0.0..=1.0).contains(&value) {
            self.issues
                .push(ConfigIssue::new(path, format!("expected a value in [0, 1], got {value}")));
        }
    }

    fn non_empty(&mut self, path: &str, value: &str) {
        if value.trim().is_empty() {
            self.issues.push(ConfigIssue::new(path, "must not be empty"));
        }
    }

    fn ensure(&mut self, ok: bool, path: &str, message: &str) {
        if !ok {
            self.issues.push(ConfigIssue::new(path, message));
        }
    }

    fn palette(&mut self, prefix: &str, p: &ChartPalette) {
        self.color(&format!("{prefix}.titleColor"), &p.title_color);
        self.color(&format!("{prefix}.labelColor"), &p.label_color);
        self.color(&format!("{prefix}.valueTextColor"), &p.value_text_color);
        self.color(
            &format!("{prefix}.donutCenterTextColor"),
            &p.donut_center_text_color,
        );
        self.color(
            &format!("{prefix}.donutLegendTextColor"),
            &p.donut_legend_text_color,
        );
    }

    fn theme(&mut self, t: &Theme) {
        self.color("theme.meBubbleColor", &t.me_bubble_color);
        self.color("theme.visitorBubbleColor", &t.visitor_bubble_color);
        self.color("theme.meTextColor", &t.me_text_color);
        self.color("theme.visitorTextColor", &t.visitor_text_color);
        self.color("theme.backgroundLight", &t.background_light);
        self.color("theme.backgroundDark", &t.background_dark);
        self.non_negative("theme.bubbleRadius", t.bubble_radius);
        self.non_empty("theme.fontFamily", &t.font_family);

        let r = &t.reaction;
        self.positive("theme.reaction.fontSize", r.font_size);
        self.color("theme.reaction.bgColor", &r.bg_color);
        self.unit("theme.reaction.bgOpacity", r.bg_opacity);
        self.color("theme.reaction.textColor", &r.text_color);
        self.non_negative("theme.reaction.paddingX", r.padding_x);
        self.non_negative("theme.reaction.paddingY", r.padding_y);
        self.non_negative("theme.reaction.borderRadius", r.border_radius);
        self.finite("theme.reaction.offsetX", r.offset_x);
        self.finite("theme.reaction.offsetY", r.offset_y);
        self.positive(
            "theme.reaction.animationDurationSec",
            r.animation_duration_sec,
        );
        self.non_negative("theme.reaction.animationDelaySec", r.animation_delay_sec);

        let c = &t.chart;
        self.color("theme.chart.barDefaultColor", &c.bar_default_color);
        self.color("theme.chart.barTrackColor", &c.bar_track_color);
        self.non_negative("theme.chart.barCornerRadius", c.bar_corner_radius);
        self.positive("theme.chart.barHeight", c.bar_height);
        self.non_negative("theme.chart.barSpacing", c.bar_spacing);
        self.non_empty("theme.chart.labelFontFamily", &c.label_font_family);
        self.positive("theme.chart.labelFontSize", c.label_font_size);
        self.non_empty("theme.chart.valueFontFamily", &c.value_font_family);
        self.positive("theme.chart.valueFontSize", c.value_font_size);
        self.non_empty("theme.chart.titleFontFamily", &c.title_font_family);
        self.positive("theme.chart.titleFontSize", c.title_font_size);
        self.positive(
            "theme.chart.titleLineHeightMultiplier",
            c.title_line_height_multiplier,
        );
        self.non_negative("theme.chart.titleBottomMargin", c.title_bottom_margin);
        self.non_negative("theme.chart.paddingX", c.padding_x);
        self.non_negative("theme.chart.paddingY", c.padding_y);
        self.positive("theme.chart.donutStrokeWidth", c.donut_stroke_width);
        self.positive("theme.chart.donutMaxDiameter", c.donut_max_diameter);
        self.non_negative("theme.chart.donutLegendGap", c.donut_legend_gap);
        self.non_empty(
            "theme.chart.donutCenterFontFamily",
            &c.donut_center_font_family,
        );
        self.positive("theme.chart.donutCenterFontSize", c.donut_center_font_size);
        self.positive("theme.chart.donutLegendFontSize", c.donut_legend_font_size);
        self.non_negative(
            "theme.chart.donutLegendItemSpacing",
            c.donut_legend_item_spacing,
        );
        self.positive(
            "theme.chart.donutLegendMarkerSize",
            c.donut_legend_marker_size,
        );
        self.positive(
            "theme.chart.donutAnimationDurationSec",
            c.donut_animation_duration_sec,
        );
        self.non_negative("theme.chart.donutSegmentDelaySec", c.donut_segment_delay_sec);
        self.positive(
            "theme.chart.barAnimationDurationSec",
            c.bar_animation_duration_sec,
        );
        self.non_negative("theme.chart.barStaggerSec", c.bar_stagger_sec);
        self.non_negative(
            "theme.chart.chartAnimationDelaySec",
            c.chart_animation_delay_sec,
        );
        self.palette("theme.chart.me", &c.me);
        self.palette("theme.chart.visitor", &c.visitor);
    }
}

impl ChatConfig {
    /// Checks every field and reports all problems found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut c = Checker::default();

        let l = &self.layout;
        c.positive("layout.chatWidth", l.chat_width);
        c.positive("layout.chatHeight", l.chat_height);
        c.positive("layout.fontSize", l.font_size);
        c.positive("layout.lineHeight", l.line_height);
        c.positive("layout.charWidthFactor", l.char_width_factor);
        c.non_negative("layout.bubblePadX", l.bubble_pad_x);
        c.non_negative("layout.bubblePadY", l.bubble_pad_y);
        c.positive("layout.minBubbleWidth", l.min_bubble_width);
        c.positive("layout.maxBubbleWidth", l.max_bubble_width);
        c.ensure(
            l.min_bubble_width <= l.max_bubble_width,
            "layout.minBubbleWidth",
            "must not exceed layout.maxBubbleWidth",
        );
        c.non_negative("layout.tailAllowance", l.tail_allowance);
        c.non_negative("layout.topMargin", l.top_margin);
        c.positive("layout.verticalSpacing", l.vertical_spacing);
        c.non_negative("layout.bottomMargin", l.bottom_margin);
        c.non_negative("layout.chartOuterPadding", l.chart_outer_padding);
        c.positive("layout.typingBubbleWidth", l.typing_bubble_width);
        c.positive("layout.typingBubbleHeight", l.typing_bubble_height);
        c.positive("layout.typingDotRadius", l.typing_dot_radius);

        let t = &self.timing;
        c.positive("timing.typingCharMs", t.typing_char_ms as f64);
        c.positive("timing.typingMinMs", t.typing_min_ms as f64);
        c.ensure(
            t.typing_min_ms <= t.typing_max_ms,
            "timing.typingMinMs",
            "must not exceed timing.typingMaxMs",
        );
        c.positive("timing.chartItemChars", t.chart_item_chars as f64);
        c.positive("timing.minReadingMs", t.min_reading_ms as f64);
        c.positive("timing.msPerWord", t.ms_per_word as f64);
        c.positive("timing.textReadingMultiplier", t.text_reading_multiplier);
        c.positive("timing.chartReadingMultiplier", t.chart_reading_multiplier);
        c.positive("timing.chartComplexityHeight", t.chart_complexity_height);
        c.ensure(
            t.max_chart_complexity.is_finite() && t.max_chart_complexity >= 1.0,
            "timing.maxChartComplexity",
            "must be at least 1",
        );
        c.positive("timing.sameSenderDelayMs", t.same_sender_delay_ms as f64);
        c.positive("timing.senderChangeDelayMs", t.sender_change_delay_ms as f64);

        let a = &self.animation;
        c.positive("animation.bubbleDurationSec", a.bubble_duration_sec);
        c.positive("animation.bubbleStartScale", a.bubble_start_scale);
        c.positive("animation.bubbleOvershootScale", a.bubble_overshoot_scale);
        c.positive("animation.avatarDurationSec", a.avatar_duration_sec);
        c.ensure(
            a.typing_fade_fraction > 0.0 && a.typing_fade_fraction < 0.5,
            "animation.typingFadeFraction",
            "expected a value in (0, 0.5)",
        );
        c.positive("animation.dotDurationSec", a.dot_duration_sec);
        for (i, d) in a.dot_delays_sec.iter().enumerate() {
            c.non_negative(&format!("animation.dotDelaysSec[{i}]"), *d);
        }
        c.unit("animation.dotMinOpacity", a.dot_min_opacity);
        c.positive("animation.dotMinScale", a.dot_min_scale);
        c.non_negative("animation.shadowBlur", a.shadow_blur);
        c.finite("animation.shadowOffsetX", a.shadow_offset_x);
        c.finite("animation.shadowOffsetY", a.shadow_offset_y);
        c.unit("animation.shadowOpacity", a.shadow_opacity);

        let s = &self.scroll;
        c.non_negative("scroll.delayBufferSec", s.delay_buffer_sec);
        c.positive("scroll.minDurationSec", s.min_duration_sec);
        c.positive("scroll.pixelsPerSec", s.pixels_per_sec);
        c.ensure(
            (1.0..=2.0).contains(&s.max_chart_speedup),
            "scroll.maxChartSpeedup",
            "expected a value in [1, 2]",
        );
        c.non_negative("scroll.chartCountWeight", s.chart_count_weight);
        c.non_negative("scroll.chartComplexityWeight", s.chart_complexity_weight);
        c.non_negative("scroll.minKeyframeGapPercent", s.min_keyframe_gap_percent);
        for (i, w) in s.ease_weights.iter().enumerate() {
            c.unit(&format!("scroll.easeWeights[{i}]"), *w);
        }
        c.ensure(
            s.ease_weights[0] <= s.ease_weights[1],
            "scroll.easeWeights",
            "weights must be non-decreasing",
        );
        c.non_negative("scroll.lastMessageMargin", s.last_message_margin);

        let st = &self.status;
        c.positive("status.fontSize", st.font_size);
        c.color("status.color", &st.color);
        c.finite("status.offsetY", st.offset_y);
        c.non_negative("status.delaySec", st.delay_sec);
        c.positive("status.deliveredDurationSec", st.delivered_duration_sec);
        c.positive("status.fadeSec", st.fade_sec);

        let av = &self.avatars;
        c.positive("avatars.size", av.size);
        c.non_negative("avatars.xOffset", av.x_offset);
        c.finite("avatars.yOffset", av.y_offset);
        c.ensure(
            !av.enabled || av.gutter() < l.chat_width,
            "avatars.size",
            "avatar column leaves no room for bubbles",
        );

        c.theme(&self.theme);

        if c.issues.is_empty() {
            Ok(())
        } else {
            Err(ConfigError { issues: c.issues })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ThemeName;

    #[test]
    fn built_in_configs_are_valid() {
        for name in ThemeName::ALL {
            ChatConfig::default().with_theme(name).validate().unwrap();
        }
    }

    #[test]
    fn all_issues_are_reported_together() {
        let mut cfg = ChatConfig::default();
        cfg.layout.font_size = 0.0;
        cfg.theme.me_bubble_color = "blue".to_string();
        cfg.timing.typing_min_ms = 5000;
        let err = cfg.validate().unwrap_err();
        let paths = err.issues.iter().map(|i| i.path.as_str()).collect::<Vec<_>>();
        assert_eq!(
            paths,
            vec!["layout.fontSize", "timing.typingMinMs", "theme.meBubbleColor"]
        );
    }

    #[test]
    fn short_and_alpha_hex_colors_are_accepted() {
        for ok in ["#fff", "#FFFA", "#0b93f6", "#FFFFFFB3"] {
            assert!(hex_color_regex().is_match(ok), "{ok}");
        }
        for bad in ["fff", "#ggg", "#12345", "rgb(0,0,0)"] {
            assert!(!hex_color_regex().is_match(bad), "{bad}");
        }
    }
}
