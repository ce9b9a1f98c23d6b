mod wrap;

pub use wrap::wrap_text_lines;

use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: Option<String>,
    pub font_size: f64,
    pub font_weight: Option<String>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: None,
            font_size: 14.0,
            font_weight: None,
        }
    }
}

impl TextStyle {
    pub fn sized(font_size: f64) -> Self {
        Self {
            font_size,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub line_count: usize,
}

pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics;

    /// Width of a single line (no line breaks).
    fn line_width(&self, line: &str, style: &TextStyle) -> f64 {
        self.measure(line, style).width
    }
}

/// Font-free measurer: every display column is `font_size * char_width_factor` wide.
///
/// Wide glyphs (CJK, most emoji) count as two columns.
#[derive(Debug, Clone, Default)]
pub struct DeterministicTextMeasurer {
    pub char_width_factor: f64,
    pub line_height_factor: f64,
}

impl DeterministicTextMeasurer {
    pub fn new(char_width_factor: f64) -> Self {
        Self {
            char_width_factor,
            line_height_factor: 0.0,
        }
    }

    pub fn normalized_text_lines(text: &str) -> Vec<String> {
        let t = text.replace("\r\n", "\n").replace('\r', "\n");
        let out = t.split('\n').map(|s| s.to_string()).collect::<Vec<_>>();
        if out.is_empty() {
            return vec!["".to_string()];
        }
        out
    }

    fn char_width_factor(&self) -> f64 {
        if self.char_width_factor == 0.0 {
            0.6
        } else {
            self.char_width_factor
        }
    }
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let line_height_factor = if self.line_height_factor == 0.0 {
            1.2
        } else {
            self.line_height_factor
        };

        let lines = Self::normalized_text_lines(text);
        let font_size = style.font_size.max(1.0);
        let mut max_cols = 0usize;
        for line in &lines {
            max_cols = max_cols.max(UnicodeWidthStr::width(line.as_str()));
        }

        let width = max_cols as f64 * font_size * self.char_width_factor();
        let height = lines.len() as f64 * font_size * line_height_factor;
        TextMetrics {
            width,
            height,
            line_count: lines.len(),
        }
    }

    fn line_width(&self, line: &str, style: &TextStyle) -> f64 {
        UnicodeWidthStr::width(line) as f64 * style.font_size.max(1.0) * self.char_width_factor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_measurer_uses_display_columns() {
        let m = DeterministicTextMeasurer::default();
        let style = TextStyle::sized(10.0);
        assert_eq!(m.line_width("abcd", &style), 24.0);
        // Two wide glyphs take four columns.
        assert_eq!(m.line_width("漢字", &style), 24.0);
    }

    #[test]
    fn measure_counts_explicit_breaks() {
        let m = DeterministicTextMeasurer::new(0.5);
        let metrics = m.measure("ab\r\nabcd\n", &TextStyle::sized(10.0));
        assert_eq!(metrics.line_count, 3);
        assert_eq!(metrics.width, 20.0);
        assert_eq!(metrics.height, 36.0);
    }
}
