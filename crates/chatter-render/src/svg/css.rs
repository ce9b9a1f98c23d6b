//! Document-level CSS: embedded font, color-scheme background, typing dots, and the scroll track.
//!
//! Nothing user-supplied is interpolated here except the font family, which is quoted.

use super::util::{escape_xml, fmt};
use super::{EmbeddedFont, RenderCtx};
use crate::model::ScrollPlan;
use std::fmt::Write as _;

pub(super) fn document_css(
    ctx: &RenderCtx<'_>,
    scroll: &ScrollPlan,
    font: Option<&EmbeddedFont>,
) -> String {
    let theme = &ctx.config.theme;
    let a = &ctx.config.animation;
    let id = &ctx.ids.root;
    let mut css = String::new();

    if let Some(font) = font {
        let family = font.family.replace(['\'', '\\', '<', '>', '&'], "");
        let _ = write!(
            &mut css,
            "@font-face{{font-family:'{family}';font-style:normal;font-weight:100 900;font-display:swap;src:url(data:{mime};base64,{data}) format('{format}');}}",
            mime = font.mime(),
            data = font.data_base64.trim(),
            format = escape_xml(&font.format),
        );
    }

    let _ = write!(
        &mut css,
        "#{id} .chat-bg{{fill:{light};}}@media (prefers-color-scheme: dark){{#{id} .chat-bg{{fill:{dark};}}}}",
        light = escape_xml(&theme.background_light),
        dark = escape_xml(&theme.background_dark),
    );

    let _ = write!(
        &mut css,
        "@keyframes {dot}{{0%,60%,100%{{opacity:{min_op};transform:scale({min_scale});}}30%{{opacity:1;transform:scale(1);}}}}",
        dot = ctx.ids.dot,
        min_op = fmt(a.dot_min_opacity),
        min_scale = fmt(a.dot_min_scale),
    );
    let _ = write!(
        &mut css,
        "#{id} .typing-dot{{animation:{dot} {dur}s ease-in-out infinite;transform-box:fill-box;transform-origin:center;}}",
        dot = ctx.ids.dot,
        dur = fmt(a.dot_duration_sec),
    );
    for (i, delay) in a.dot_delays_sec.iter().enumerate() {
        let _ = write!(
            &mut css,
            "#{id} .typing-dot-{n}{{animation-delay:{d}s;}}",
            n = i + 1,
            d = fmt(*delay),
        );
    }

    if !scroll.is_noop() {
        let _ = write!(&mut css, "@keyframes {}{{", ctx.ids.scroll);
        for kf in &scroll.keyframes {
            let _ = write!(
                &mut css,
                "{p}%{{transform:translateY({o}px);}}",
                p = fmt(kf.percent),
                o = fmt(-kf.offset),
            );
        }
        css.push('}');
        let _ = write!(
            &mut css,
            "#{id} .track{{animation:{name} {dur}s linear {delay}s forwards;}}",
            name = ctx.ids.scroll,
            dur = fmt(scroll.scroll_duration_sec),
            delay = fmt(scroll.scroll_delay_sec),
        );
    }

    css
}

#[cfg(test)]
mod tests {
    use super::super::Ids;
    use super::*;
    use crate::model::ScrollKeyframe;
    use chatter_core::ChatConfig;

    fn ctx(config: &ChatConfig) -> RenderCtx<'_> {
        RenderCtx {
            config,
            ids: Ids::new("demo"),
        }
    }

    #[test]
    fn idle_scroll_emits_no_track_animation() {
        let cfg = ChatConfig::default();
        let css = document_css(&ctx(&cfg), &ScrollPlan::idle(), None);
        assert!(!css.contains("@keyframes demo-scroll"));
        assert!(!css.contains(".track"));
        assert!(css.contains("@keyframes demo-dot"));
        assert!(css.contains("prefers-color-scheme: dark"));
    }

    #[test]
    fn scroll_keyframes_translate_upwards() {
        let cfg = ChatConfig::default();
        let plan = ScrollPlan {
            scroll_distance: 120.0,
            scroll_delay_sec: 9.5,
            scroll_duration_sec: 4.0,
            pixels_per_sec: 30.0,
            final_offset: 120.0,
            keyframes: vec![
                ScrollKeyframe {
                    percent: 0.0,
                    offset: 0.0,
                },
                ScrollKeyframe {
                    percent: 100.0,
                    offset: 120.0,
                },
            ],
        };
        let css = document_css(&ctx(&cfg), &plan, None);
        assert!(css.contains(
            "@keyframes demo-scroll{0%{transform:translateY(0px);}100%{transform:translateY(-120px);}}"
        ));
        assert!(css.contains("animation:demo-scroll 4s linear 9.5s forwards"));
    }

    #[test]
    fn font_face_embeds_base64_data() {
        let cfg = ChatConfig::default();
        let font = EmbeddedFont::woff2("Inter", "AAEC");
        let css = document_css(&ctx(&cfg), &ScrollPlan::idle(), Some(&font));
        assert!(css.contains("font-family:'Inter'"));
        assert!(css.contains("url(data:font/woff2;base64,AAEC) format('woff2')"));
    }
}
