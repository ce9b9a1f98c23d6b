//! Everything drawn around a bubble: avatar, typing indicator, delivery status and reaction pill.

use super::RenderCtx;
use super::util::{escape_attr, escape_xml_into, fmt, fmt_sec, ms_to_sec};
use crate::model::TimedEvent;
use chatter_core::{AvatarShape, Sender};
use std::fmt::Write as _;

/// Avatar next to the bubble, bottom-aligned with it, fading in with the reveal.
pub(super) fn render_avatar(out: &mut String, te: &TimedEvent, ctx: &RenderCtx<'_>) {
    let av = &ctx.config.avatars;
    let sender = te.sender();
    let size = av.size;
    let x = match sender {
        Sender::Me => ctx.config.layout.chat_width - av.x_offset - size,
        Sender::Visitor => av.x_offset,
    };
    let y = te.y + (te.layout.height() - size).max(0.0) + av.y_offset;

    let _ = write!(
        out,
        r#"<g class="avatar {s}" transform="translate({x},{y})" opacity="0"><animate attributeName="opacity" from="0" to="1" begin="{b}" dur="{d}" fill="freeze"/>"#,
        s = sender.as_str(),
        x = fmt(x),
        y = fmt(y),
        b = fmt_sec(ms_to_sec(te.reveal_start_ms)),
        d = fmt_sec(ctx.config.animation.avatar_duration_sec),
    );

    let identity = av.identity(sender);
    match identity.image_url.as_deref().filter(|u| !u.trim().is_empty()) {
        Some(url) => {
            let _ = write!(
                out,
                r#"<image href="{url}" xlink:href="{url}" width="{s}" height="{s}" preserveAspectRatio="xMidYMid slice" clip-path="url(#{clip})"/>"#,
                url = escape_attr(url),
                s = fmt(size),
                clip = ctx.ids.avatar_clip,
            );
        }
        None => {
            let theme = &ctx.config.theme;
            let fill = escape_attr(theme.bubble_color(sender));
            let _ = match av.shape {
                AvatarShape::Circle => write!(
                    out,
                    r#"<circle cx="{c}" cy="{c}" r="{c}" fill="{fill}"/>"#,
                    c = fmt(size / 2.0),
                ),
                AvatarShape::Square => write!(
                    out,
                    r#"<rect width="{s}" height="{s}" rx="4" ry="4" fill="{fill}"/>"#,
                    s = fmt(size),
                ),
            };
            let _ = write!(
                out,
                r#"<text x="{c}" y="{c}" text-anchor="middle" dominant-baseline="central" font-size="{fs}" font-weight="600" fill="{tf}">"#,
                c = fmt(size / 2.0),
                fs = fmt(size * 0.4),
                tf = escape_attr(theme.text_color(sender)),
            );
            escape_xml_into(out, &identity.fallback_text);
            out.push_str("</text>");
        }
    }
    out.push_str("</g>");
}

/// Typing bubble with three pulsing dots, visible for exactly the typing window.
pub(super) fn render_typing_indicator(out: &mut String, te: &TimedEvent, ctx: &RenderCtx<'_>) {
    if te.typing_duration_ms == 0 {
        return;
    }
    let l = &ctx.config.layout;
    let theme = &ctx.config.theme;
    let sender = te.sender();
    let w = l.typing_bubble_width;
    let h = l.typing_bubble_height;
    let x = ctx.bubble_x(sender, w);
    let f = ctx.config.animation.typing_fade_fraction.clamp(0.0, 0.5);

    let _ = write!(
        out,
        r#"<g class="typing {s}" transform="translate({x},{y})" opacity="0"><animate attributeName="opacity" values="0;1;1;0" keyTimes="0;{f};{g};1" begin="{b}" dur="{d}" fill="freeze"/>"#,
        s = sender.as_str(),
        x = fmt(x),
        y = fmt(te.y),
        f = fmt(f),
        g = fmt(1.0 - f),
        b = fmt_sec(ms_to_sec(te.typing_start_ms)),
        d = fmt_sec(ms_to_sec(te.typing_duration_ms)),
    );
    let _ = write!(
        out,
        r#"<g filter="url(#{shadow})"><rect width="{w}" height="{h}" rx="{r}" ry="{r}" fill="{fill}"/></g>"#,
        shadow = ctx.ids.shadow,
        w = fmt(w),
        h = fmt(h),
        r = fmt(theme.bubble_radius.min(h / 2.0).max(0.0)),
        fill = escape_attr(theme.bubble_color(sender)),
    );
    let dot_fill = escape_attr(theme.text_color(sender));
    for (i, dx) in [-w / 4.0, 0.0, w / 4.0].into_iter().enumerate() {
        let _ = write!(
            out,
            r#"<circle class="typing-dot typing-dot-{n}" cx="{cx}" cy="{cy}" r="{r}" fill="{dot_fill}"/>"#,
            n = i + 1,
            cx = fmt(w / 2.0 + dx),
            cy = fmt(h / 2.0),
            r = fmt(l.typing_dot_radius),
        );
    }
    out.push_str("</g>");
}

/// "Delivered" then "Read" under an outgoing bubble. Returns the second the chain settles, or
/// `None` when no status is drawn.
pub(super) fn render_status(out: &mut String, te: &TimedEvent, ctx: &RenderCtx<'_>) -> Option<f64> {
    let st = &ctx.config.status;
    if !st.enabled || te.sender() != Sender::Me {
        return None;
    }
    let base = ms_to_sec(te.reveal_start_ms) + ctx.config.animation.bubble_duration_sec + st.delay_sec;
    let x = fmt(te.layout.width());
    let y = fmt(te.layout.height() + st.offset_y);
    let fs = fmt(st.font_size);
    let fill = escape_attr(&st.color);

    let _ = write!(
        out,
        r#"<text class="status delivered" x="{x}" y="{y}" text-anchor="end" font-size="{fs}" fill="{fill}" opacity="0"><animate attributeName="opacity" values="0;1;1;0" keyTimes="0;0.15;0.85;1" begin="{b}" dur="{d}" fill="freeze"/>"#,
        b = fmt_sec(base),
        d = fmt_sec(st.delivered_duration_sec),
    );
    escape_xml_into(out, &st.delivered_text);
    out.push_str("</text>");

    let _ = write!(
        out,
        r#"<text class="status read" x="{x}" y="{y}" text-anchor="end" font-size="{fs}" fill="{fill}" opacity="0"><animate attributeName="opacity" from="0" to="1" begin="{b}" dur="{d}" fill="freeze"/>"#,
        b = fmt_sec(base + st.delivered_duration_sec),
        d = fmt_sec(st.fade_sec),
    );
    escape_xml_into(out, &st.read_text);
    out.push_str("</text>");

    Some(base + st.chain_duration_sec())
}

/// Second at which the reaction pill starts to appear.
pub(super) fn reaction_begin_sec(te: &TimedEvent, status_end: Option<f64>, ctx: &RenderCtx<'_>) -> f64 {
    let r = &ctx.config.theme.reaction;
    let settled = ms_to_sec(te.reveal_start_ms) + ctx.config.animation.bubble_duration_sec;
    match (te.sender(), status_end) {
        (Sender::Me, Some(end)) => end + r.animation_delay_sec,
        _ => settled + r.animation_delay_sec,
    }
}

/// Emoji pill pinned to the bubble's top corner on the far side from the tail.
pub(super) fn render_reaction(
    out: &mut String,
    te: &TimedEvent,
    reaction: &str,
    status_end: Option<f64>,
    ctx: &RenderCtx<'_>,
) {
    let r = &ctx.config.theme.reaction;
    let pill_w = r.font_size + 2.0 * r.padding_x;
    let pill_h = r.font_size + 2.0 * r.padding_y;
    let x = match te.sender() {
        Sender::Me => -pill_w / 2.0 + r.offset_x,
        Sender::Visitor => te.layout.width() - pill_w / 2.0 - r.offset_x,
    };

    let _ = write!(
        out,
        r#"<g class="reaction" transform="translate({x},{y})" opacity="0"><animate attributeName="opacity" from="0" to="1" begin="{b}" dur="{d}" fill="freeze"/><rect width="{w}" height="{h}" rx="{rx}" ry="{rx}" fill="{bg}" fill-opacity="{op}"/><text x="{tx}" y="{ty}" text-anchor="middle" dominant-baseline="central" font-size="{fs}" fill="{tf}">"#,
        x = fmt(x),
        y = fmt(r.offset_y),
        b = fmt_sec(reaction_begin_sec(te, status_end, ctx)),
        d = fmt_sec(r.animation_duration_sec),
        w = fmt(pill_w),
        h = fmt(pill_h),
        rx = fmt(r.border_radius.min(pill_h / 2.0).max(0.0)),
        bg = escape_attr(&r.bg_color),
        op = fmt(r.bg_opacity),
        tx = fmt(pill_w / 2.0),
        ty = fmt(pill_h / 2.0),
        fs = fmt(r.font_size),
        tf = escape_attr(&r.text_color),
    );
    escape_xml_into(out, reaction);
    out.push_str("</text></g>");
}
