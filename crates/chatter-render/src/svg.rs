//! Animated SVG emission.
//!
//! Every per-element animation is a SMIL directive with an absolute `begin` measured from
//! document load, so the document is scheduled once and never recomputed. The scroll track is
//! driven by CSS keyframes in the style block.

mod bubble;
mod chart;
mod css;
mod decorations;
mod error;
mod util;

pub use error::{render_error_svg, render_input_error_svg};

use crate::model::{LayoutResult, TimedEvent, TimelineResult};
use chatter_core::{AvatarShape, ChatConfig, EventContent, Sender};
use std::fmt::Write as _;
use util::{escape_attr, fmt, sanitize_id};

/// A font embedded into the document as base64 data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedFont {
    pub family: String,
    /// CSS `format(...)` hint, e.g. `woff2`.
    pub format: String,
    pub data_base64: String,
}

impl EmbeddedFont {
    pub fn woff2(family: impl Into<String>, data_base64: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            format: "woff2".to_string(),
            data_base64: data_base64.into(),
        }
    }

    fn mime(&self) -> &'static str {
        match self.format.as_str() {
            "woff" => "font/woff",
            "truetype" => "font/ttf",
            "opentype" => "font/otf",
            _ => "font/woff2",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Root element id; also prefixes internal ids so several documents can be inlined together.
    pub document_id: Option<String>,
    /// When absent the theme's font stack is used as-is.
    pub font: Option<EmbeddedFont>,
}

/// Internal ids for one document.
pub(crate) struct Ids {
    pub root: String,
    pub shadow: String,
    pub avatar_clip: String,
    pub scroll: String,
    pub dot: String,
}

impl Ids {
    fn new(raw: &str) -> Self {
        let root = sanitize_id(raw);
        Self {
            shadow: format!("{root}-shadow"),
            avatar_clip: format!("{root}-avatar-clip"),
            scroll: format!("{root}-scroll"),
            dot: format!("{root}-dot"),
            root,
        }
    }
}

pub(crate) struct RenderCtx<'a> {
    pub config: &'a ChatConfig,
    pub ids: Ids,
}

impl RenderCtx<'_> {
    /// Left edge of a bubble of `width` for `sender`, leaving room for avatar and tail.
    pub fn bubble_x(&self, sender: Sender, width: f64) -> f64 {
        let margin = self.config.avatars.gutter() + self.config.layout.tail_allowance / 2.0;
        match sender {
            Sender::Me => self.config.layout.chat_width - width - margin,
            Sender::Visitor => margin,
        }
    }
}

pub fn render_svg(result: &TimelineResult, config: &ChatConfig, options: &RenderOptions) -> String {
    let ctx = RenderCtx {
        config,
        ids: Ids::new(options.document_id.as_deref().unwrap_or("chat")),
    };
    let l = &config.layout;
    let a = &config.animation;

    let font_family = match &options.font {
        Some(font) => format!("'{}', {}", font.family, config.theme.font_family),
        None => config.theme.font_family.clone(),
    };

    let mut out = String::new();
    let _ = write!(
        &mut out,
        r#"<svg id="{id}" xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="{font}" font-size="{fs}" shape-rendering="geometricPrecision" role="img" aria-label="Chat conversation">"#,
        id = ctx.ids.root,
        w = fmt(l.chat_width),
        h = fmt(l.chat_height),
        font = escape_attr(&font_family),
        fs = fmt(l.font_size),
    );

    out.push_str("<defs>");
    let _ = write!(
        &mut out,
        r#"<filter id="{id}" x="-20%" y="-20%" width="140%" height="140%"><feGaussianBlur in="SourceAlpha" stdDeviation="{blur}"/><feOffset dx="{dx}" dy="{dy}" result="offsetblur"/><feComponentTransfer><feFuncA type="linear" slope="{op}"/></feComponentTransfer><feMerge><feMergeNode/><feMergeNode in="SourceGraphic"/></feMerge></filter>"#,
        id = ctx.ids.shadow,
        blur = fmt(a.shadow_blur),
        dx = fmt(a.shadow_offset_x),
        dy = fmt(a.shadow_offset_y),
        op = fmt(a.shadow_opacity),
    );
    if config.avatars.enabled {
        let s = config.avatars.size;
        let _ = match config.avatars.shape {
            AvatarShape::Circle => write!(
                &mut out,
                r#"<clipPath id="{id}"><circle cx="{c}" cy="{c}" r="{c}"/></clipPath>"#,
                id = ctx.ids.avatar_clip,
                c = fmt(s / 2.0),
            ),
            AvatarShape::Square => write!(
                &mut out,
                r#"<clipPath id="{id}"><rect width="{s}" height="{s}" rx="4" ry="4"/></clipPath>"#,
                id = ctx.ids.avatar_clip,
                s = fmt(s),
            ),
        };
    }
    out.push_str("</defs>");

    let _ = write!(
        &mut out,
        "<style>{}</style>",
        css::document_css(&ctx, &result.scroll, options.font.as_ref())
    );
    let _ = write!(
        &mut out,
        r#"<rect class="chat-bg" width="{w}" height="{h}" fill="{bg}"/>"#,
        w = fmt(l.chat_width),
        h = fmt(l.chat_height),
        bg = escape_attr(&config.theme.background_light),
    );

    out.push_str(r#"<g class="track">"#);
    for te in result.timed_events() {
        if let EventContent::Chart(chart) = &te.event.content {
            if let chatter_core::ChartType::Unsupported(kind) = &chart.chart_type {
                tracing::warn!(
                    index = te.index,
                    chart_type = kind.as_str(),
                    "unsupported chart type; skipping event"
                );
                continue;
            }
        }
        render_event(&mut out, te, &ctx);
    }
    out.push_str("</g></svg>\n");
    out
}

fn render_event(out: &mut String, te: &TimedEvent, ctx: &RenderCtx<'_>) {
    let width = te.layout.width();
    let x = ctx.bubble_x(te.sender(), width);

    if ctx.config.avatars.enabled {
        decorations::render_avatar(out, te, ctx);
    }
    decorations::render_typing_indicator(out, te, ctx);

    let _ = write!(
        out,
        r#"<g class="msg {sender}" transform="translate({x},{y})">"#,
        sender = te.sender().as_str(),
        x = fmt(x),
        y = fmt(te.y),
    );
    bubble::open_reveal(out, te, ctx);
    match (&te.event.content, &te.layout) {
        (EventContent::Text(_), LayoutResult::Text(layout)) => {
            bubble::render_text_lines(out, te.sender(), layout, ctx)
        }
        (EventContent::Chart(data), LayoutResult::Chart(layout)) => {
            chart::render_chart(out, te, data, layout, ctx)
        }
        _ => {}
    }
    bubble::close_reveal(out);

    let status_end = decorations::render_status(out, te, ctx);
    if let Some(reaction) = te.reaction.as_deref() {
        decorations::render_reaction(out, te, reaction, status_end, ctx);
    }
    out.push_str("</g>");
}
