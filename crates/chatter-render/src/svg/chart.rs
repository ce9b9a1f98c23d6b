//! Bar and donut bodies drawn inside a chart bubble.
//!
//! Each chart animation begins at `reveal + chartAnimationDelaySec`, so nothing in a chart moves
//! before its bubble has started to appear.

use super::RenderCtx;
use super::util::{escape_attr, escape_xml_into, fmt, fmt_sec, ms_to_sec};
use crate::model::{ChartBody, ChartLayout, DonutLayout, TimedEvent};
use chatter_core::{ChartData, ChartItem, ChartPalette, ChartStyles};
use std::f64::consts::PI;
use std::fmt::Write as _;

/// Smallest share a non-positive donut segment is drawn with, so every legend entry has a wedge.
const DONUT_SLIVER_SHARE: f64 = 0.005;

pub(super) fn render_chart(
    out: &mut String,
    te: &TimedEvent,
    data: &ChartData,
    layout: &ChartLayout,
    ctx: &RenderCtx<'_>,
) {
    let cs = &ctx.config.theme.chart;
    let palette = cs.palette(te.sender());
    let begin = ms_to_sec(te.reveal_start_ms) + cs.chart_animation_delay_sec;

    render_title(out, layout, cs, palette);
    match (layout.body, layout.donut) {
        (ChartBody::Bar, _) => render_bars(out, data, layout, cs, palette, begin),
        (ChartBody::Donut, Some(donut)) => {
            render_donut(out, data, &donut, cs, palette, begin, ctx.config.layout.bubble_pad_x)
        }
        _ => {}
    }
}

fn render_title(out: &mut String, layout: &ChartLayout, cs: &ChartStyles, palette: &ChartPalette) {
    if layout.title_lines.is_empty() {
        return;
    }
    let _ = write!(
        out,
        r#"<text class="chart-title" font-family="{ff}" font-size="{fs}" font-weight="bold" fill="{fill}">"#,
        ff = escape_attr(&cs.title_font_family),
        fs = fmt(cs.title_font_size),
        fill = escape_attr(&palette.title_color),
    );
    for (i, line) in layout.title_lines.iter().enumerate() {
        let y = cs.padding_y + cs.title_font_size + i as f64 * cs.title_line_height();
        let _ = write!(
            out,
            r#"<tspan x="{x}" y="{y}">"#,
            x = fmt(cs.padding_x),
            y = fmt(y),
        );
        escape_xml_into(out, line);
        out.push_str("</tspan>");
    }
    out.push_str("</text>");
}

fn value_suffix(data: &ChartData) -> &str {
    match data.value_suffix.as_deref() {
        Some(suffix) => suffix,
        None if data.max_value == Some(100.0) => "%",
        None => "",
    }
}

fn item_color<'a>(item: &'a ChartItem, fallback: &'a str) -> &'a str {
    item.color
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or(fallback)
}

fn render_bars(
    out: &mut String,
    data: &ChartData,
    layout: &ChartLayout,
    cs: &ChartStyles,
    palette: &ChartPalette,
    begin: f64,
) {
    let inner_width = (layout.width - 2.0 * cs.padding_x).max(0.0);
    let scale_max = data.scale_max();
    let radius = cs.bar_corner_radius.min(cs.bar_height / 2.0).max(0.0);
    let suffix = value_suffix(data);
    let dur = fmt_sec(cs.bar_animation_duration_sec);

    for (i, (item, row)) in data.items.iter().zip(&layout.rows).enumerate() {
        let row_begin = fmt_sec(begin + i as f64 * cs.bar_stagger_sec);
        let label_y = row.y + cs.label_font_size * 0.8;
        let bar_y = row.y + cs.label_font_size;
        let fraction = (item.value_or_zero() / scale_max).clamp(0.0, 1.0);
        let bar_width = inner_width * fraction;

        let _ = write!(
            out,
            r#"<g class="bar-row"><text class="bar-label" x="{x}" y="{y}" font-family="{ff}" font-size="{fs}" fill="{fill}">"#,
            x = fmt(cs.padding_x),
            y = fmt(label_y),
            ff = escape_attr(&cs.label_font_family),
            fs = fmt(cs.label_font_size),
            fill = escape_attr(&palette.label_color),
        );
        escape_xml_into(out, &item.label);
        out.push_str("</text>");

        let _ = write!(
            out,
            r#"<text class="bar-value" x="{x}" y="{y}" text-anchor="end" font-family="{ff}" font-size="{fs}" fill="{fill}" opacity="0"><animate attributeName="opacity" from="0" to="1" begin="{row_begin}" dur="{dur}" fill="freeze"/>"#,
            x = fmt(cs.padding_x + inner_width),
            y = fmt(label_y),
            ff = escape_attr(&cs.value_font_family),
            fs = fmt(cs.value_font_size),
            fill = escape_attr(&palette.value_text_color),
        );
        let mut value = match item.value.filter(|v| v.is_finite()) {
            Some(v) => fmt(v),
            None => "0".to_string(),
        };
        value.push_str(suffix);
        escape_xml_into(out, &value);
        out.push_str("</text>");

        let _ = write!(
            out,
            r#"<rect class="bar-track" x="{x}" y="{y}" width="{w}" height="{h}" rx="{r}" ry="{r}" fill="{fill}"/>"#,
            x = fmt(cs.padding_x),
            y = fmt(bar_y),
            w = fmt(inner_width),
            h = fmt(cs.bar_height),
            r = fmt(radius),
            fill = escape_attr(&cs.bar_track_color),
        );
        let _ = write!(
            out,
            r#"<rect class="bar" x="{x}" y="{y}" width="0" height="{h}" rx="{r}" ry="{r}" fill="{fill}"><animate attributeName="width" from="0" to="{w}" begin="{row_begin}" dur="{dur}" calcMode="spline" keyTimes="0;1" keySplines="0.25 0.1 0.25 1" fill="freeze"/></rect></g>"#,
            x = fmt(cs.padding_x),
            y = fmt(bar_y),
            w = fmt(bar_width),
            h = fmt(cs.bar_height),
            r = fmt(radius),
            fill = escape_attr(item_color(item, &cs.bar_default_color)),
        );
    }
}

/// Share of the ring per item, and the percentage shown in the legend.
///
/// Non-positive values still get a thin sliver; the legend reports their true share.
fn donut_shares(items: &[ChartItem]) -> Vec<(f64, f64)> {
    let values = items
        .iter()
        .map(|item| item.value_or_zero().max(0.0))
        .collect::<Vec<_>>();
    let total = values.iter().sum::<f64>();
    let floor = if total > 0.0 { total * DONUT_SLIVER_SHARE } else { 1.0 };
    let drawn = values.iter().map(|v| v.max(floor)).collect::<Vec<_>>();
    let drawn_total = drawn.iter().sum::<f64>();

    values
        .iter()
        .zip(&drawn)
        .map(|(v, d)| {
            let share = if drawn_total > 0.0 { d / drawn_total } else { 0.0 };
            let pct = if total > 0.0 { v / total * 100.0 } else { 0.0 };
            (share, pct)
        })
        .collect()
}

fn polar(r: f64, angle: f64) -> (f64, f64) {
    (r * angle.cos(), r * angle.sin())
}

/// Annular wedge centered on the origin; angles in radians, 0 at 12 o'clock, clockwise.
fn wedge_path(outer: f64, inner: f64, start: f64, end: f64) -> String {
    let sweep = end - start;
    if sweep >= 2.0 * PI - 1e-6 {
        let mid = start + PI;
        return format!(
            "{}{}",
            wedge_path(outer, inner, start, mid),
            wedge_path(outer, inner, mid, end)
        );
    }
    let a0 = start - PI / 2.0;
    let a1 = end - PI / 2.0;
    let large = if sweep > PI { 1 } else { 0 };
    let (ox0, oy0) = polar(outer, a0);
    let (ox1, oy1) = polar(outer, a1);
    let mut d = format!(
        "M{} {}A{} {} 0 {large} 1 {} {}",
        fmt(ox0),
        fmt(oy0),
        fmt(outer),
        fmt(outer),
        fmt(ox1),
        fmt(oy1),
    );
    if inner > 0.0 {
        let (ix1, iy1) = polar(inner, a1);
        let (ix0, iy0) = polar(inner, a0);
        let _ = write!(
            &mut d,
            "L{} {}A{} {} 0 {large} 0 {} {}Z",
            fmt(ix1),
            fmt(iy1),
            fmt(inner),
            fmt(inner),
            fmt(ix0),
            fmt(iy0),
        );
    } else {
        d.push_str("L0 0Z");
    }
    d
}

fn render_donut(
    out: &mut String,
    data: &ChartData,
    donut: &DonutLayout,
    cs: &ChartStyles,
    palette: &ChartPalette,
    begin: f64,
    legend_x: f64,
) {
    let outer = (donut.diameter / 2.0).max(0.0);
    let inner = (outer - cs.donut_stroke_width).max(0.0);
    let dur = fmt_sec(cs.donut_animation_duration_sec);
    let shares = donut_shares(&data.items);

    let _ = write!(
        out,
        r#"<g class="donut" transform="translate({cx},{cy})"><circle r="{r}" fill="none" stroke="{track}" stroke-width="{sw}"/>"#,
        cx = fmt(donut.center_x),
        cy = fmt(donut.center_y),
        r = fmt((outer + inner) / 2.0),
        track = escape_attr(&cs.bar_track_color),
        sw = fmt(outer - inner),
    );
    let mut angle = 0.0_f64;
    for (i, (item, (share, _))) in data.items.iter().zip(&shares).enumerate() {
        let end = angle + share * 2.0 * PI;
        let seg_begin = fmt_sec(begin + i as f64 * cs.donut_segment_delay_sec);
        let _ = write!(
            out,
            r#"<path class="donut-segment" d="{d}" fill="{fill}" opacity="0"><animate attributeName="opacity" from="0" to="1" begin="{seg_begin}" dur="{dur}" fill="freeze"/><animateTransform attributeName="transform" type="scale" from="0.6" to="1" begin="{seg_begin}" dur="{dur}" fill="freeze"/></path>"#,
            d = wedge_path(outer, inner, angle, end),
            fill = escape_attr(item_color(item, &cs.bar_default_color)),
        );
        angle = end;
    }
    if let Some(center) = data.center_text.as_deref().filter(|t| !t.trim().is_empty()) {
        let _ = write!(
            out,
            r#"<text class="donut-center" text-anchor="middle" dominant-baseline="central" font-family="{ff}" font-size="{fs}" font-weight="bold" fill="{fill}" opacity="0"><animate attributeName="opacity" from="0" to="1" begin="{b}" dur="{dur}" fill="freeze"/>"#,
            ff = escape_attr(&cs.donut_center_font_family),
            fs = fmt(cs.donut_center_font_size),
            fill = escape_attr(&palette.donut_center_text_color),
            b = fmt_sec(begin),
        );
        escape_xml_into(out, center);
        out.push_str("</text>");
    }
    out.push_str("</g>");

    let marker = cs.donut_legend_marker_size;
    for (i, (item, (_, pct))) in data.items.iter().zip(&shares).enumerate() {
        let top = donut.legend_top + i as f64 * donut.legend_row_height;
        let row_begin = fmt_sec(begin + i as f64 * cs.donut_segment_delay_sec);
        let _ = write!(
            out,
            r#"<g class="legend-row" opacity="0"><animate attributeName="opacity" from="0" to="1" begin="{row_begin}" dur="{dur}" fill="freeze"/><rect x="{mx}" y="{my}" width="{m}" height="{m}" rx="2" ry="2" fill="{fill}"/><text x="{tx}" y="{ty}" font-size="{fs}" fill="{tfill}">"#,
            mx = fmt(legend_x),
            my = fmt(top + (cs.donut_legend_font_size - marker) / 2.0),
            m = fmt(marker),
            fill = escape_attr(item_color(item, &cs.bar_default_color)),
            tx = fmt(legend_x + marker + 6.0),
            ty = fmt(top + cs.donut_legend_font_size * 0.8),
            fs = fmt(cs.donut_legend_font_size),
            tfill = escape_attr(&palette.donut_legend_text_color),
        );
        escape_xml_into(out, &item.label);
        let _ = write!(out, " ({}%)</text></g>", fmt((pct * 10.0).round() / 10.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shares_sum_to_one_and_slivers_stay_visible() {
        let items = vec![
            ChartItem::new("a", 3.0),
            ChartItem::new("b", 1.0),
            ChartItem::new("c", 0.0),
        ];
        let shares = donut_shares(&items);
        let total: f64 = shares.iter().map(|(s, _)| s).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(shares[2].0 > 0.0);
        assert_eq!(shares[0].1, 75.0);
        assert_eq!(shares[2].1, 0.0);
    }

    #[test]
    fn all_zero_values_split_evenly() {
        let items = vec![ChartItem::new("a", 0.0), ChartItem::new("b", -5.0)];
        let shares = donut_shares(&items);
        assert_eq!(shares, vec![(0.5, 0.0), (0.5, 0.0)]);
    }

    #[test]
    fn full_ring_is_drawn_as_two_halves() {
        let d = wedge_path(50.0, 30.0, 0.0, 2.0 * PI);
        assert_eq!(d.matches('M').count(), 2);
        assert!(d.starts_with("M0 -50A50 50 0 0 1 0 50"), "{d}");
    }

    #[test]
    fn percent_suffix_applies_to_hundred_point_scales() {
        let data = ChartData {
            max_value: Some(100.0),
            ..ChartData::default()
        };
        assert_eq!(value_suffix(&data), "%");
        let data = ChartData {
            value_suffix: Some("h".into()),
            max_value: Some(100.0),
            ..ChartData::default()
        };
        assert_eq!(value_suffix(&data), "h");
        assert_eq!(value_suffix(&ChartData::default()), "");
    }
}
