//! Number formatting and XML escaping shared by the SVG emitters.

use std::fmt::Write as _;

fn trim_trailing_zeros_and_dot(out: &mut String, start: usize) {
    while out.len() > start && out.as_bytes()[out.len() - 1] == b'0' {
        out.pop();
    }
    if out.len() > start && out.as_bytes()[out.len() - 1] == b'.' {
        out.pop();
    }
}

/// Fixed 3dp, trailing zeros trimmed, never `-0`.
pub(super) fn fmt_into(out: &mut String, v: f64) {
    if !v.is_finite() || v.abs() < 0.0005 {
        out.push('0');
        return;
    }

    let scaled = (v * 1000.0).round() as i64;
    if scaled == 0 {
        out.push('0');
        return;
    }
    if scaled < 0 {
        out.push('-');
    }
    let abs = scaled.unsigned_abs();
    let start = out.len();
    let _ = write!(out, "{}.{:03}", abs / 1000, abs % 1000);
    trim_trailing_zeros_and_dot(out, start);
}

pub(super) fn fmt(v: f64) -> String {
    let mut out = String::new();
    fmt_into(&mut out, v);
    out
}

/// Seconds for SMIL `begin`/`dur` values, e.g. `4.36s`.
pub(super) fn fmt_sec(v: f64) -> String {
    let mut out = fmt(v.max(0.0));
    out.push('s');
    out
}

pub(super) fn ms_to_sec(ms: u64) -> f64 {
    ms as f64 / 1000.0
}

pub(super) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_xml_into(&mut out, text);
    out
}

pub(super) fn escape_xml_into(out: &mut String, text: &str) {
    let bytes = text.as_bytes();
    let mut start = 0usize;
    for (i, &b) in bytes.iter().enumerate() {
        let esc = match b {
            b'&' => Some("&amp;"),
            b'<' => Some("&lt;"),
            b'>' => Some("&gt;"),
            b'"' => Some("&quot;"),
            b'\'' => Some("&#39;"),
            _ => None,
        };
        let Some(esc) = esc else {
            continue;
        };
        if start < i {
            out.push_str(&text[start..i]);
        }
        out.push_str(esc);
        start = i + 1;
    }
    if start < text.len() {
        out.push_str(&text[start..]);
    }
}

pub(super) fn escape_attr(text: &str) -> String {
    escape_xml(text)
}

/// Keeps ids usable as XML names and CSS identifiers.
pub(super) fn sanitize_id(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return "chat".to_string();
    }
    let mut out = String::with_capacity(raw.len() + 2);
    if !raw.starts_with(|c: char| c.is_ascii_alphabetic()) {
        out.push_str("c-");
    }
    for ch in raw.chars() {
        let ok = ch.is_ascii_alphanumeric() || ch == '-' || ch == '_';
        out.push(if ok { ch } else { '-' });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fmt_trims_and_rounds() {
        assert_eq!(fmt(0.0), "0");
        assert_eq!(fmt(-0.0001), "0");
        assert_eq!(fmt(12.0), "12");
        assert_eq!(fmt(40.8), "40.8");
        assert_eq!(fmt(1.0 / 3.0), "0.333");
        assert_eq!(fmt(-2.5), "-2.5");
        assert_eq!(fmt(f64::NAN), "0");
    }

    #[test]
    fn fmt_sec_never_goes_negative() {
        assert_eq!(fmt_sec(4.36), "4.36s");
        assert_eq!(fmt_sec(-1.0), "0s");
        assert_eq!(ms_to_sec(1850), 1.85);
    }

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(
            escape_xml(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_attr("plain"), "plain");
    }

    #[test]
    fn ids_are_sanitized() {
        assert_eq!(sanitize_id("my chat!"), "my-chat-");
        assert_eq!(sanitize_id("1st"), "c-1st");
        assert_eq!(sanitize_id("  "), "chat");
    }
}
