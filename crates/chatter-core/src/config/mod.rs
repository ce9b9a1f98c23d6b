//! Generation configuration.
//!
//! [`ChatConfig`] is an immutable value threaded through the whole pipeline by reference.
//! Per-call tweaks (another theme, different avatars, theme overrides) build a new value.

mod validate;

use crate::error::{ConfigError, Error, Result};
use crate::theme::{Theme, ThemeName};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub chat_width: f64,
    pub chat_height: f64,
    pub font_size: f64,
    pub line_height: f64,
    /// Average glyph advance as a fraction of the font size.
    pub char_width_factor: f64,
    pub bubble_pad_x: f64,
    pub bubble_pad_y: f64,
    pub min_bubble_width: f64,
    pub max_bubble_width: f64,
    /// Horizontal room kept free for the bubble tail.
    pub tail_allowance: f64,
    pub top_margin: f64,
    pub vertical_spacing: f64,
    pub bottom_margin: f64,
    /// Extra vertical room around chart bubbles that is not part of the chart layout height.
    pub chart_outer_padding: f64,
    pub typing_bubble_width: f64,
    pub typing_bubble_height: f64,
    pub typing_dot_radius: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            chat_width: 320.0,
            chat_height: 450.0,
            font_size: 14.0,
            line_height: 20.0,
            char_width_factor: 0.6,
            bubble_pad_x: 12.0,
            bubble_pad_y: 8.0,
            min_bubble_width: 40.0,
            max_bubble_width: 260.0,
            tail_allowance: 8.0,
            top_margin: 20.0,
            vertical_spacing: 22.0,
            bottom_margin: 40.0,
            chart_outer_padding: 0.0,
            typing_bubble_width: 70.0,
            typing_bubble_height: 36.0,
            typing_dot_radius: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct TimingConfig {
    pub typing_char_ms: u64,
    pub typing_min_ms: u64,
    pub typing_max_ms: u64,
    /// Characters a single chart row counts as when estimating chart typing time.
    pub chart_item_chars: u64,
    pub min_reading_ms: u64,
    pub ms_per_word: u64,
    pub text_reading_multiplier: f64,
    pub chart_reading_multiplier: f64,
    /// Chart height (px) that counts as complexity 1.0.
    pub chart_complexity_height: f64,
    pub max_chart_complexity: f64,
    /// Upper bound (exclusive) of the random reading-time offset. `0` disables jitter.
    pub reading_jitter_ms: u64,
    pub same_sender_delay_ms: u64,
    pub sender_change_delay_ms: u64,
    pub end_buffer_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            typing_char_ms: 40,
            typing_min_ms: 1600,
            typing_max_ms: 3000,
            chart_item_chars: 10,
            min_reading_ms: 1000,
            ms_per_word: 250,
            text_reading_multiplier: 1.0,
            chart_reading_multiplier: 1.5,
            chart_complexity_height: 160.0,
            max_chart_complexity: 2.0,
            reading_jitter_ms: 1000,
            same_sender_delay_ms: 600,
            sender_change_delay_ms: 1800,
            end_buffer_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct AnimationConfig {
    pub bubble_duration_sec: f64,
    pub bubble_start_scale: f64,
    pub bubble_overshoot_scale: f64,
    pub avatar_duration_sec: f64,
    /// Fraction of the typing window spent fading the indicator in (and again out).
    pub typing_fade_fraction: f64,
    pub dot_duration_sec: f64,
    pub dot_delays_sec: [f64; 3],
    pub dot_min_opacity: f64,
    pub dot_min_scale: f64,
    pub shadow_blur: f64,
    pub shadow_offset_x: f64,
    pub shadow_offset_y: f64,
    pub shadow_opacity: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            bubble_duration_sec: 0.36,
            bubble_start_scale: 0.8,
            bubble_overshoot_scale: 1.04,
            avatar_duration_sec: 0.3,
            typing_fade_fraction: 0.1,
            dot_duration_sec: 1.4,
            dot_delays_sec: [0.0, 0.2, 0.4],
            dot_min_opacity: 0.4,
            dot_min_scale: 0.8,
            shadow_blur: 1.0,
            shadow_offset_x: 0.0,
            shadow_offset_y: 1.0,
            shadow_opacity: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ScrollConfig {
    pub delay_buffer_sec: f64,
    pub min_duration_sec: f64,
    pub pixels_per_sec: f64,
    pub max_chart_speedup: f64,
    pub chart_count_weight: f64,
    pub chart_complexity_weight: f64,
    /// Keyframe gap (in percent) above which two eased intermediate keyframes are inserted.
    pub min_keyframe_gap_percent: f64,
    pub ease_weights: [f64; 2],
    /// Space kept below the final resting position so the last message stays readable.
    pub last_message_margin: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            delay_buffer_sec: 3.5,
            min_duration_sec: 1.2,
            pixels_per_sec: 30.0,
            max_chart_speedup: 2.0,
            chart_count_weight: 0.15,
            chart_complexity_weight: 0.25,
            min_keyframe_gap_percent: 3.0,
            ease_weights: [0.4, 0.7],
            last_message_margin: 300.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct StatusConfig {
    pub enabled: bool,
    pub delivered_text: String,
    pub read_text: String,
    pub font_size: f64,
    pub color: String,
    pub offset_y: f64,
    pub delay_sec: f64,
    /// How long "Delivered" stays up before it is replaced by "Read".
    pub delivered_duration_sec: f64,
    pub fade_sec: f64,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delivered_text: "Delivered".to_string(),
            read_text: "Read".to_string(),
            font_size: 10.0,
            color: "#8E8E93".to_string(),
            offset_y: 12.0,
            delay_sec: 0.2,
            delivered_duration_sec: 1.2,
            fade_sec: 0.3,
        }
    }
}

impl StatusConfig {
    /// Seconds from the start of the status chain until "Read" is fully visible.
    pub fn chain_duration_sec(&self) -> f64 {
        self.delivered_duration_sec + self.fade_sec
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarShape {
    #[default]
    Circle,
    Square,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct AvatarIdentity {
    pub image_url: Option<String>,
    pub fallback_text: String,
}

impl Default for AvatarIdentity {
    fn default() -> Self {
        Self {
            image_url: None,
            fallback_text: "?".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct AvatarConfig {
    pub enabled: bool,
    pub size: f64,
    pub shape: AvatarShape,
    pub x_offset: f64,
    pub y_offset: f64,
    pub me: AvatarIdentity,
    pub visitor: AvatarIdentity,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            size: 32.0,
            shape: AvatarShape::Circle,
            x_offset: 4.0,
            y_offset: 0.0,
            me: AvatarIdentity {
                image_url: None,
                fallback_text: "ME".to_string(),
            },
            visitor: AvatarIdentity::default(),
        }
    }
}

impl AvatarConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Horizontal room an avatar column takes away from bubbles (zero when disabled).
    pub fn gutter(&self) -> f64 {
        if self.enabled {
            self.size + self.x_offset * 2.0
        } else {
            0.0
        }
    }

    pub fn identity(&self, sender: crate::Sender) -> &AvatarIdentity {
        match sender {
            crate::Sender::Me => &self.me,
            crate::Sender::Visitor => &self.visitor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatConfig {
    pub layout: LayoutConfig,
    pub timing: TimingConfig,
    pub animation: AnimationConfig,
    pub scroll: ScrollConfig,
    pub status: StatusConfig,
    pub avatars: AvatarConfig,
    #[serde(rename = "activeTheme")]
    pub theme_name: ThemeName,
    pub theme: Theme,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            timing: TimingConfig::default(),
            animation: AnimationConfig::default(),
            scroll: ScrollConfig::default(),
            status: StatusConfig::default(),
            avatars: AvatarConfig::default(),
            theme_name: ThemeName::default(),
            theme: ThemeName::default().theme(),
        }
    }
}

/// On-disk configuration formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON or JSON5 (comments and trailing commas allowed).
    Json5,
    Yaml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml" | "yml") => Self::Yaml,
            _ => Self::Json5,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Json5 => "JSON5",
            Self::Yaml => "YAML",
        }
    }
}

impl ChatConfig {
    /// Returns a copy using the built-in theme `name`.
    pub fn with_theme(&self, name: ThemeName) -> Self {
        Self {
            theme_name: name,
            theme: name.theme(),
            ..self.clone()
        }
    }

    pub fn with_avatars(&self, avatars: AvatarConfig) -> Self {
        Self {
            avatars,
            ..self.clone()
        }
    }

    /// Returns a copy whose theme has `overrides` deep-merged into it.
    ///
    /// The merged theme must still deserialize (unknown keys are rejected) and validate.
    pub fn with_theme_overrides(&self, overrides: &Value) -> Result<Self> {
        let mut theme = serde_json::to_value(&self.theme)?;
        deep_merge_value(&mut theme, overrides);
        let theme: Theme = serde_json::from_value(theme)
            .map_err(|e| ConfigError::single("themeOverrides", e.to_string()))?;
        let next = Self {
            theme,
            ..self.clone()
        };
        next.validate()?;
        Ok(next)
    }

    /// Builds a validated configuration from a JSON-shaped document.
    ///
    /// Top-level sections may be omitted or partial. A full `theme` object replaces the
    /// built-in theme and must carry every field; `themeOverrides` patches the selected theme.
    pub fn from_value(value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(ConfigError::single("", "expected an object at the top level").into());
        };

        let theme_name = match map.get("activeTheme") {
            None | Some(Value::Null) => ThemeName::default(),
            Some(Value::String(s)) => s
                .parse::<ThemeName>()
                .map_err(|msg| ConfigError::single("activeTheme", msg))?,
            Some(_) => return Err(ConfigError::single("activeTheme", "expected a string").into()),
        };

        let mut incoming: Map<String, Value> = map.clone();
        incoming.remove("activeTheme");
        let overrides = incoming.remove("themeOverrides");
        if let Some(theme) = incoming.get("theme") {
            // Check completeness before merging fills the gaps from the built-in theme.
            serde_json::from_value::<Theme>(theme.clone())
                .map_err(|e| ConfigError::single("theme", e.to_string()))?;
        }

        let base = Self::default().with_theme(theme_name);
        let mut merged = serde_json::to_value(&base)?;
        deep_merge_value(&mut merged, &Value::Object(incoming));
        let mut config: Self = serde_json::from_value(merged)
            .map_err(|e| ConfigError::single("", e.to_string()))?;
        config.theme_name = theme_name;

        if let Some(overrides) = overrides {
            config = config.with_theme_overrides(&overrides)?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_str_with_format(text: &str, format: ConfigFormat) -> Result<Self> {
        let value: Value = match format {
            ConfigFormat::Json5 => json5::from_str(text).map_err(|e| Error::ConfigParse {
                format: format.name(),
                message: e.to_string(),
            })?,
            ConfigFormat::Yaml => serde_yaml::from_str(text).map_err(|e| Error::ConfigParse {
                format: format.name(),
                message: e.to_string(),
            })?,
        };
        Self::from_value(&value)
    }

    /// Viewport width left for bubbles once the avatar gutter and tail room are reserved.
    pub fn available_bubble_width(&self) -> f64 {
        let free = self.layout.chat_width - self.avatars.gutter() - self.layout.tail_allowance;
        self.layout.max_bubble_width.min(free).max(0.0)
    }
}

pub(crate) fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deep_merge_keeps_untouched_siblings() {
        let mut base = json!({"a": {"b": 1, "c": 2}, "d": 3});
        deep_merge_value(&mut base, &json!({"a": {"c": 5}, "e": 6}));
        assert_eq!(base, json!({"a": {"b": 1, "c": 5}, "d": 3, "e": 6}));
    }

    #[test]
    fn with_theme_does_not_touch_the_original() {
        let base = ChatConfig::default();
        let android = base.with_theme(ThemeName::Android);
        assert_eq!(base.theme_name, ThemeName::Ios);
        assert_eq!(base.theme, Theme::ios());
        assert_eq!(android.theme, Theme::android());
        assert_eq!(android.layout, base.layout);
    }

    #[test]
    fn theme_overrides_build_a_new_value() {
        let base = ChatConfig::default();
        let patched = base
            .with_theme_overrides(&json!({"meBubbleColor": "#FF0000", "chart": {"barHeight": 20}}))
            .unwrap();
        assert_eq!(patched.theme.me_bubble_color, "#FF0000");
        assert_eq!(patched.theme.chart.bar_height, 20.0);
        assert_eq!(base.theme.me_bubble_color, "#0B93F6");
    }

    #[test]
    fn theme_overrides_reject_unknown_keys() {
        let err = ChatConfig::default()
            .with_theme_overrides(&json!({"ME_BUBBLE_COLOR": "#FF0000"}))
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn available_width_accounts_for_avatars() {
        let cfg = ChatConfig::default();
        assert_eq!(cfg.available_bubble_width(), 260.0);

        let mut narrow = cfg.clone();
        narrow.layout.chat_width = 200.0;
        assert_eq!(narrow.available_bubble_width(), 200.0 - 40.0 - 8.0);
        let narrow = narrow.with_avatars(AvatarConfig::disabled());
        assert_eq!(narrow.available_bubble_width(), 192.0);
    }

    #[test]
    fn format_is_picked_from_the_extension() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("a/b.YML")),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("chat.json")),
            ConfigFormat::Json5
        );
    }
}
