//! Built-in chat themes.
//!
//! A theme is a closed set of required style constants. Themes loaded from configuration files
//! must spell out every field; nothing is defaulted deep inside rendering.

use crate::conversation::Sender;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Ios,
    Android,
}

impl ThemeName {
    pub const ALL: [ThemeName; 2] = [ThemeName::Ios, ThemeName::Android];

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeName::Ios => "ios",
            ThemeName::Android => "android",
        }
    }

    pub fn theme(self) -> Theme {
        match self {
            ThemeName::Ios => Theme::ios(),
            ThemeName::Android => Theme::android(),
        }
    }
}

impl FromStr for ThemeName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ios" => Ok(Self::Ios),
            "android" => Ok(Self::Android),
            other => Err(format!("unknown theme `{other}` (expected `ios` or `android`)")),
        }
    }
}

impl std::fmt::Display for ThemeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Theme {
    pub me_bubble_color: String,
    pub visitor_bubble_color: String,
    pub me_text_color: String,
    pub visitor_text_color: String,
    pub background_light: String,
    pub background_dark: String,
    pub bubble_radius: f64,
    pub font_family: String,
    pub reaction: ReactionStyle,
    pub chart: ChartStyles,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReactionStyle {
    pub font_size: f64,
    pub bg_color: String,
    pub bg_opacity: f64,
    pub text_color: String,
    pub padding_x: f64,
    pub padding_y: f64,
    pub border_radius: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub animation_duration_sec: f64,
    pub animation_delay_sec: f64,
}

/// Sender-specific text colors used inside chart bubbles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChartPalette {
    pub title_color: String,
    pub label_color: String,
    pub value_text_color: String,
    pub donut_center_text_color: String,
    pub donut_legend_text_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChartStyles {
    pub bar_default_color: String,
    pub bar_track_color: String,
    pub bar_corner_radius: f64,
    pub bar_height: f64,
    pub bar_spacing: f64,
    pub label_font_family: String,
    pub label_font_size: f64,
    pub value_font_family: String,
    pub value_font_size: f64,
    pub title_font_family: String,
    pub title_font_size: f64,
    pub title_line_height_multiplier: f64,
    pub title_bottom_margin: f64,
    pub padding_x: f64,
    pub padding_y: f64,
    pub donut_stroke_width: f64,
    pub donut_max_diameter: f64,
    pub donut_legend_gap: f64,
    pub donut_center_font_family: String,
    pub donut_center_font_size: f64,
    pub donut_legend_font_size: f64,
    pub donut_legend_item_spacing: f64,
    pub donut_legend_marker_size: f64,
    pub donut_animation_duration_sec: f64,
    pub donut_segment_delay_sec: f64,
    pub bar_animation_duration_sec: f64,
    pub bar_stagger_sec: f64,
    pub chart_animation_delay_sec: f64,
    pub me: ChartPalette,
    pub visitor: ChartPalette,
}

impl ChartStyles {
    pub fn palette(&self, sender: Sender) -> &ChartPalette {
        match sender {
            Sender::Me => &self.me,
            Sender::Visitor => &self.visitor,
        }
    }

    pub fn title_line_height(&self) -> f64 {
        self.title_font_size * self.title_line_height_multiplier
    }
}

const IOS_FONT: &str = "'SF Pro', -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Helvetica, Arial, sans-serif";
const IOS_TITLE_FONT: &str = "'SF Pro Display', -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Helvetica, Arial, sans-serif";
const ANDROID_FONT: &str = "'Roboto', sans-serif";

impl Theme {
    pub fn ios() -> Self {
        Self {
            me_bubble_color: "#0B93F6".to_string(),
            visitor_bubble_color: "#E5E5EA".to_string(),
            me_text_color: "#FFFFFF".to_string(),
            visitor_text_color: "#000000".to_string(),
            background_light: "#FFFFFF".to_string(),
            background_dark: "#000000".to_string(),
            bubble_radius: 18.0,
            font_family: IOS_FONT.to_string(),
            reaction: ReactionStyle {
                font_size: 20.0,
                bg_color: "#F1F1F1".to_string(),
                bg_opacity: 0.9,
                text_color: "#000000".to_string(),
                padding_x: 8.0,
                padding_y: 4.0,
                border_radius: 14.0,
                offset_x: 0.0,
                offset_y: -12.0,
                animation_duration_sec: 0.3,
                animation_delay_sec: 0.2,
            },
            chart: ChartStyles {
                bar_default_color: "#007AFF".to_string(),
                bar_track_color: "#D3D3D8".to_string(),
                bar_corner_radius: 8.0,
                bar_height: 18.0,
                bar_spacing: 10.0,
                label_font_family: IOS_FONT.to_string(),
                label_font_size: 13.0,
                value_font_family: IOS_FONT.to_string(),
                value_font_size: 12.0,
                title_font_family: IOS_TITLE_FONT.to_string(),
                title_font_size: 15.0,
                title_line_height_multiplier: 1.3,
                title_bottom_margin: 10.0,
                padding_x: 16.0,
                padding_y: 14.0,
                donut_stroke_width: 30.0,
                donut_max_diameter: 200.0,
                donut_legend_gap: 12.0,
                donut_center_font_family: IOS_FONT.to_string(),
                donut_center_font_size: 16.0,
                donut_legend_font_size: 12.0,
                donut_legend_item_spacing: 8.0,
                donut_legend_marker_size: 10.0,
                donut_animation_duration_sec: 1.0,
                donut_segment_delay_sec: 0.1,
                bar_animation_duration_sec: 0.8,
                bar_stagger_sec: 0.1,
                chart_animation_delay_sec: 0.3,
                me: ChartPalette {
                    title_color: "#FFFFFF".to_string(),
                    label_color: "#E2F0FF".to_string(),
                    value_text_color: "#FFFFFF".to_string(),
                    donut_center_text_color: "#FFFFFF".to_string(),
                    donut_legend_text_color: "#FFFFFF".to_string(),
                },
                visitor: ChartPalette {
                    title_color: "#000000".to_string(),
                    label_color: "#444444".to_string(),
                    value_text_color: "#000000".to_string(),
                    donut_center_text_color: "#000000".to_string(),
                    donut_legend_text_color: "#000000".to_string(),
                },
            },
        }
    }

    pub fn android() -> Self {
        Self {
            me_bubble_color: "#D1E6FF".to_string(),
            visitor_bubble_color: "#F0F0F0".to_string(),
            me_text_color: "#0D47A1".to_string(),
            visitor_text_color: "#212121".to_string(),
            background_light: "#FFFFFF".to_string(),
            background_dark: "#121212".to_string(),
            bubble_radius: 8.0,
            font_family: ANDROID_FONT.to_string(),
            reaction: ReactionStyle {
                font_size: 14.0,
                bg_color: "#E8E8E8".to_string(),
                bg_opacity: 1.0,
                text_color: "#000000".to_string(),
                padding_x: 6.0,
                padding_y: 3.0,
                border_radius: 12.0,
                offset_x: 0.0,
                offset_y: -10.0,
                animation_duration_sec: 0.3,
                animation_delay_sec: 0.2,
            },
            chart: ChartStyles {
                bar_default_color: "#4285F4".to_string(),
                bar_track_color: "#CCCCCC".to_string(),
                bar_corner_radius: 7.0,
                bar_height: 16.0,
                bar_spacing: 9.0,
                label_font_family: ANDROID_FONT.to_string(),
                label_font_size: 13.0,
                value_font_family: ANDROID_FONT.to_string(),
                value_font_size: 12.0,
                title_font_family: "'Roboto Medium', 'Roboto', sans-serif".to_string(),
                title_font_size: 15.0,
                title_line_height_multiplier: 1.3,
                title_bottom_margin: 10.0,
                padding_x: 16.0,
                padding_y: 14.0,
                donut_stroke_width: 28.0,
                donut_max_diameter: 200.0,
                donut_legend_gap: 12.0,
                donut_center_font_family: ANDROID_FONT.to_string(),
                donut_center_font_size: 16.0,
                donut_legend_font_size: 12.0,
                donut_legend_item_spacing: 8.0,
                donut_legend_marker_size: 10.0,
                donut_animation_duration_sec: 1.0,
                donut_segment_delay_sec: 0.1,
                bar_animation_duration_sec: 0.8,
                bar_stagger_sec: 0.1,
                chart_animation_delay_sec: 0.3,
                me: ChartPalette {
                    title_color: "#0D47A1".to_string(),
                    label_color: "#1976D2".to_string(),
                    value_text_color: "#0D47A1".to_string(),
                    donut_center_text_color: "#0D47A1".to_string(),
                    donut_legend_text_color: "#0D47A1".to_string(),
                },
                visitor: ChartPalette {
                    title_color: "#212121".to_string(),
                    label_color: "#616161".to_string(),
                    value_text_color: "#212121".to_string(),
                    donut_center_text_color: "#212121".to_string(),
                    donut_legend_text_color: "#212121".to_string(),
                },
            },
        }
    }

    pub fn bubble_color(&self, sender: Sender) -> &str {
        match sender {
            Sender::Me => &self.me_bubble_color,
            Sender::Visitor => &self.visitor_bubble_color,
        }
    }

    pub fn text_color(&self, sender: Sender) -> &str {
        match sender {
            Sender::Me => &self.me_text_color,
            Sender::Visitor => &self.visitor_text_color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_names_parse_case_insensitively() {
        assert_eq!("iOS".parse::<ThemeName>(), Ok(ThemeName::Ios));
        assert_eq!(" android ".parse::<ThemeName>(), Ok(ThemeName::Android));
        assert!("windows-phone".parse::<ThemeName>().is_err());
    }

    #[test]
    fn a_partial_theme_is_rejected() {
        let mut v = serde_json::to_value(Theme::ios()).unwrap();
        v.as_object_mut().unwrap().remove("bubbleRadius");
        let err = serde_json::from_value::<Theme>(v).unwrap_err();
        assert!(err.to_string().contains("bubbleRadius"), "{err}");
    }

    #[test]
    fn unknown_theme_fields_are_rejected() {
        let mut v = serde_json::to_value(Theme::android()).unwrap();
        v.as_object_mut()
            .unwrap()
            .insert("bubbleRadiusPx".to_string(), serde_json::json!(3));
        assert!(serde_json::from_value::<Theme>(v).is_err());
    }

    #[test]
    fn palettes_follow_the_sender() {
        let theme = Theme::ios();
        assert_eq!(theme.bubble_color(Sender::Me), "#0B93F6");
        assert_eq!(theme.text_color(Sender::Visitor), "#000000");
        assert_eq!(theme.chart.palette(Sender::Visitor).label_color, "#444444");
    }
}
