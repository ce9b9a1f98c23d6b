use super::RenderCtx;
use super::util::{escape_attr, escape_xml_into, fmt, fmt_sec, ms_to_sec};
use crate::model::{TextLayout, TimedEvent};
use chatter_core::Sender;
use std::fmt::Write as _;

/// Baseline of a text line as a fraction of the line height.
const BASELINE_RATIO: f64 = 0.7;

/// Opens the reveal wrappers (fade plus scale pop around the bubble center) and draws the bubble
/// shell. Callers emit the content and then [`close_reveal`].
pub(super) fn open_reveal(out: &mut String, te: &TimedEvent, ctx: &RenderCtx<'_>) {
    let a = &ctx.config.animation;
    let w = te.layout.width();
    let h = te.layout.height();
    let begin = fmt_sec(ms_to_sec(te.reveal_start_ms));
    let dur = fmt_sec(a.bubble_duration_sec);

    let _ = write!(
        out,
        r#"<g opacity="0"><animate attributeName="opacity" from="0" to="1" begin="{begin}" dur="{dur}" fill="freeze"/>"#,
    );
    let _ = write!(
        out,
        r#"<g transform="translate({cx},{cy})"><g><animateTransform attributeName="transform" type="scale" values="{s0};{s1};1" keyTimes="0;0.6;1" begin="{begin}" dur="{dur}" fill="freeze"/><g transform="translate({ncx},{ncy})">"#,
        cx = fmt(w / 2.0),
        cy = fmt(h / 2.0),
        ncx = fmt(-w / 2.0),
        ncy = fmt(-h / 2.0),
        s0 = fmt(a.bubble_start_scale),
        s1 = fmt(a.bubble_overshoot_scale),
    );
    render_shell(out, te.sender(), w, h, ctx);
}

pub(super) fn close_reveal(out: &mut String) {
    out.push_str("</g></g></g></g>");
}

/// Rounded rectangle plus tail, under the drop shadow.
fn render_shell(out: &mut String, sender: Sender, w: f64, h: f64, ctx: &RenderCtx<'_>) {
    let theme = &ctx.config.theme;
    let fill = escape_attr(theme.bubble_color(sender));
    let r = theme.bubble_radius.min(h / 2.0).max(0.0);
    let _ = write!(
        out,
        r#"<g filter="url(#{shadow})"><rect class="bubble" width="{w}" height="{h}" rx="{r}" ry="{r}" fill="{fill}"/>"#,
        shadow = ctx.ids.shadow,
        w = fmt(w),
        h = fmt(h),
        r = fmt(r),
    );
    let d = tail_path(sender, w, h, ctx.config.layout.tail_allowance / 2.0);
    let _ = write!(out, r#"<path class="tail" d="{d}" fill="{fill}"/></g>"#);
}

/// Tail at the bottom corner on the sender's side, reaching `reach` px past the bubble edge.
fn tail_path(sender: Sender, w: f64, h: f64, reach: f64) -> String {
    let rise = 12.0_f64.min(h / 2.0);
    match sender {
        Sender::Me => format!(
            "M{} {}L{} {}C{} {} {} {} {} {}Z",
            fmt(w - 10.0),
            fmt(h),
            fmt(w + reach),
            fmt(h),
            fmt(w - 2.0),
            fmt(h - 2.0),
            fmt(w - 4.0),
            fmt(h - rise / 2.0),
            fmt(w - 4.0),
            fmt(h - rise),
        ),
        Sender::Visitor => format!(
            "M10 {}L{} {}C2 {} 4 {} 4 {}Z",
            fmt(h),
            fmt(-reach),
            fmt(h),
            fmt(h - 2.0),
            fmt(h - rise / 2.0),
            fmt(h - rise),
        ),
    }
}

pub(super) fn render_text_lines(
    out: &mut String,
    sender: Sender,
    layout: &TextLayout,
    ctx: &RenderCtx<'_>,
) {
    let l = &ctx.config.layout;
    let fill = escape_attr(ctx.config.theme.text_color(sender));
    let _ = write!(
        out,
        r#"<text class="msg-text" fill="{fill}" font-size="{fs}">"#,
        fs = fmt(l.font_size),
    );
    for (i, line) in layout.wrapped_lines.iter().enumerate() {
        let y = l.bubble_pad_y + i as f64 * l.line_height + l.line_height * BASELINE_RATIO;
        let _ = write!(
            out,
            r#"<tspan x="{x}" y="{y}">"#,
            x = fmt(l.bubble_pad_x),
            y = fmt(y),
        );
        escape_xml_into(out, line);
        out.push_str("</tspan>");
    }
    out.push_str("</text>");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tails_point_outwards_on_the_sender_side() {
        let me = tail_path(Sender::Me, 100.0, 36.0, 4.0);
        assert!(me.starts_with("M90 36L104 36"), "{me}");
        let visitor = tail_path(Sender::Visitor, 100.0, 36.0, 4.0);
        assert!(visitor.starts_with("M10 36L-4 36"), "{visitor}");
    }
}
