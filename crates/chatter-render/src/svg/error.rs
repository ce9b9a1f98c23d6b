use super::util::escape_xml_into;
use std::fmt::Write as _;

/// Fixed 320x100 graphic shown in place of a conversation when configuration is invalid.
///
/// `detail` is rendered as a small second line; pass an empty string to omit it.
pub fn render_error_svg(detail: &str) -> String {
    error_graphic("Configuration Error!", detail)
}

/// Same graphic for a conversation (or substitution map) that could not be read at all.
pub fn render_input_error_svg(detail: &str) -> String {
    error_graphic("Conversation Error!", detail)
}

fn error_graphic(heading: &str, detail: &str) -> String {
    let mut out = String::new();
    let _ = write!(
        &mut out,
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="320" height="100" viewBox="0 0 320 100" role="img" aria-label="{heading}"><rect width="320" height="100" rx="8" ry="8" fill="#FDECEA" stroke="#D93025"/><text x="160" y="45" text-anchor="middle" font-family="sans-serif" font-size="16" font-weight="bold" fill="#D93025">{heading}</text>"##,
    );
    let detail = detail.trim();
    if !detail.is_empty() {
        let clipped = if detail.chars().count() > 48 {
            let mut s = detail.chars().take(47).collect::<String>();
            s.push('…');
            s
        } else {
            detail.to_string()
        };
        out.push_str(
            r##"<text x="160" y="70" text-anchor="middle" font-family="sans-serif" font-size="11" fill="#5F6368">"##,
        );
        escape_xml_into(&mut out, &clipped);
        out.push_str("</text>");
    }
    out.push_str("</svg>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_graphic_is_small_and_escaped() {
        let svg = render_error_svg("theme.meBubbleColor: expected <hex>");
        assert!(svg.contains(r#"width="320" height="100""#));
        assert!(svg.contains("Configuration Error!"));
        assert!(svg.contains("expected &lt;hex&gt;"));
    }

    #[test]
    fn unreadable_input_gets_its_own_heading() {
        let svg = render_input_error_svg("expected an array of events");
        assert!(svg.contains(r#"aria-label="Conversation Error!""#));
        assert!(!svg.contains("Configuration Error!"));
    }

    #[test]
    fn long_details_are_clipped() {
        let svg = render_error_svg(&"x".repeat(200));
        assert!(svg.contains('…'));
        assert!(!svg.contains(&"x".repeat(48)));
    }
}
