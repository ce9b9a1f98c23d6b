//! Greedy word wrapping against a pixel budget.

use super::{DeterministicTextMeasurer, TextMeasurer, TextStyle};
use std::collections::VecDeque;

fn split_token_to_width(
    tok: &str,
    max_width: f64,
    style: &TextStyle,
    measurer: &dyn TextMeasurer,
) -> (String, String) {
    let chars = tok.chars().collect::<Vec<_>>();
    let mut split_at = 0usize;
    for idx in 1..=chars.len() {
        let head = chars[..idx].iter().collect::<String>();
        if measurer.line_width(&head, style) > max_width {
            break;
        }
        split_at = idx;
    }
    // Always make progress, even when a single glyph is wider than the budget.
    if split_at == 0 {
        split_at = 1.min(chars.len());
    }
    let head = chars.iter().take(split_at).collect::<String>();
    let tail = chars.iter().skip(split_at).collect::<String>();
    (head, tail)
}

fn wrap_line_to_width(
    line: &str,
    max_width: f64,
    style: &TextStyle,
    measurer: &dyn TextMeasurer,
) -> Vec<String> {
    let mut tokens = line
        .split_whitespace()
        .map(|s| s.to_string())
        .collect::<VecDeque<_>>();
    let mut out: Vec<String> = Vec::new();
    let mut cur = String::new();

    while let Some(tok) = tokens.pop_front() {
        let candidate = if cur.is_empty() {
            tok.clone()
        } else {
            format!("{cur} {tok}")
        };
        if measurer.line_width(&candidate, style) <= max_width {
            cur = candidate;
            continue;
        }

        if !cur.is_empty() {
            out.push(std::mem::take(&mut cur));
            tokens.push_front(tok);
            continue;
        }

        let (head, tail) = split_token_to_width(&tok, max_width, style, measurer);
        out.push(head);
        if !tail.is_empty() {
            tokens.push_front(tail);
        }
    }

    if !cur.is_empty() {
        out.push(cur);
    }

    if out.is_empty() {
        vec!["".to_string()]
    } else {
        out
    }
}

/// Splits on explicit line breaks, then packs words greedily so no line exceeds `max_width`.
///
/// Words wider than the budget are broken across lines. Runs of whitespace collapse to a single
/// space. The result always holds at least one (possibly empty) line.
pub fn wrap_text_lines(
    text: &str,
    style: &TextStyle,
    max_width: f64,
    measurer: &dyn TextMeasurer,
) -> Vec<String> {
    let max_width = if max_width.is_finite() && max_width > 0.0 {
        max_width
    } else {
        1.0
    };

    let mut lines: Vec<String> = Vec::new();
    for line in DeterministicTextMeasurer::normalized_text_lines(text) {
        lines.extend(wrap_line_to_width(&line, max_width, style, measurer));
    }

    if lines.is_empty() {
        vec!["".to_string()]
    } else {
        lines
    }
}
