use chatter_core::{
    ChartData, ChartItem, ChartType, ChatConfig, ConversationEvent, Sender, Substitutions,
};
use chatter_render::model::{LayoutResult, TimelineItem, TimelineResult};
use chatter_render::{LayoutOptions, build_timeline_with_rng, layout};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn run(events: &[ConversationEvent], config: &ChatConfig, seed: u64) -> TimelineResult {
    build_timeline_with_rng(
        events,
        config,
        &Substitutions::new(),
        &LayoutOptions::for_config(config),
        &mut StdRng::seed_from_u64(seed),
    )
    .expect("valid config")
}

fn bar_chart(title: Option<&str>, rows: usize) -> ChartData {
    ChartData {
        chart_type: ChartType::Bar,
        title: title.map(str::to_string),
        items: (0..rows)
            .map(|i| ChartItem::new(format!("Row {i}"), (i * 10) as f64))
            .collect(),
        ..ChartData::default()
    }
}

fn long_conversation() -> Vec<ConversationEvent> {
    let mut events = Vec::new();
    for i in 0..12 {
        let sender = if i % 3 == 0 { Sender::Visitor } else { Sender::Me };
        events.push(ConversationEvent::text(
            sender,
            format!("Message number {i} with a handful of words to wrap around"),
        ));
    }
    events.push(ConversationEvent::chart(
        Sender::Visitor,
        bar_chart(Some("Languages this week"), 4),
    ));
    events.push(ConversationEvent::text(Sender::Me, "").with_reaction("👍"));
    events
}

#[test]
fn two_short_turns_produce_typing_then_message_per_event() {
    let cfg = ChatConfig::default();
    let events = vec![
        ConversationEvent::text(Sender::Me, "Hi"),
        ConversationEvent::text(Sender::Visitor, "Hello there, how are you today?"),
    ];
    let out = run(&events, &cfg, 1);

    let items = out.items();
    assert_eq!(items.len(), 4);
    assert!(matches!(items[0], TimelineItem::Typing(e) if e.sender() == Sender::Me));
    assert!(matches!(items[1], TimelineItem::Message(e) if e.sender() == Sender::Me));
    assert!(matches!(items[2], TimelineItem::Typing(e) if e.sender() == Sender::Visitor));
    assert!(matches!(items[3], TimelineItem::Message(e) if e.sender() == Sender::Visitor));

    let a = &out.timed_events()[0];
    let b = &out.timed_events()[1];
    assert!(b.reveal_start_ms > a.reveal_start_ms + a.typing_duration_ms);
    assert!(b.y > a.y);
}

#[test]
fn chart_height_matches_the_documented_formula() {
    let cfg = ChatConfig::default();
    let cs = &cfg.theme.chart;
    let event = ConversationEvent::chart(Sender::Me, bar_chart(Some("Weekly focus"), 5));
    let LayoutResult::Chart(c) = layout::measure(&event, &cfg, cfg.available_bubble_width()) else {
        panic!("expected chart layout");
    };

    let title_block = c.title_lines.len() as f64 * cs.title_line_height() + cs.title_bottom_margin;
    let rows: f64 = c.rows.iter().map(|r| r.height + r.spacing).sum();
    assert_eq!(c.title_lines.len(), 1);
    assert_eq!(c.row_count, 5);
    assert_eq!(c.height, cs.padding_y + title_block + rows + cs.padding_y);
    assert_eq!(
        rows,
        5.0 * (cs.label_font_size + cs.bar_height) + 4.0 * cs.bar_spacing
    );
}

#[test]
fn content_that_fits_never_scrolls() {
    let cfg = ChatConfig::default();
    let out = run(&[ConversationEvent::text(Sender::Me, "Hi")], &cfg, 3);
    assert!(out.timeline.total_content_height < cfg.layout.chat_height);
    assert_eq!(out.scroll.scroll_distance, 0.0);
    assert!(out.scroll.is_noop());
    assert!(out.scroll.keyframes.is_empty());
}

#[test]
fn unknown_placeholders_pass_through_literally() {
    let cfg = ChatConfig::default();
    let vars = Substitutions::new().with("name", "Ada");
    let events = vec![
        ConversationEvent::text(Sender::Me, "Hello {unknownKey}"),
        ConversationEvent::text(Sender::Visitor, "Hi {name}"),
    ];
    let out = build_timeline_with_rng(
        &events,
        &cfg,
        &vars,
        &LayoutOptions::for_config(&cfg),
        &mut StdRng::seed_from_u64(4),
    )
    .expect("valid config");
    let lines = |i: usize| match &out.timed_events()[i].layout {
        LayoutResult::Text(t) => t.wrapped_lines.clone(),
        other => panic!("expected text layout, got {other:?}"),
    };
    assert_eq!(lines(0), vec!["Hello {unknownKey}"]);
    assert_eq!(lines(1), vec!["Hi Ada"]);
}

#[test]
fn typing_time_and_stacking_invariants_hold() {
    let cfg = ChatConfig::default();
    let events = long_conversation();
    for seed in 0..8 {
        let out = run(&events, &cfg, seed);
        let te = out.timed_events();
        assert_eq!(te.len(), events.len());

        let sum: u64 = te.iter().map(|e| e.typing_duration_ms).sum();
        assert_eq!(sum, out.timeline.total_typing_time_ms);

        for e in te {
            assert!((cfg.timing.typing_min_ms..=cfg.timing.typing_max_ms)
                .contains(&e.typing_duration_ms));
            assert!(e.reveal_start_ms >= e.typing_start_ms + e.typing_duration_ms);
        }
        assert_eq!(te[0].typing_start_ms, te[0].sender_delay_ms);
        for w in te.windows(2) {
            assert!(w[1].y - w[0].y >= w[0].rendered_height + cfg.layout.vertical_spacing);
            assert_eq!(
                w[1].typing_start_ms,
                w[0].reveal_start_ms + w[0].reading_time_ms + w[1].sender_delay_ms
            );
        }
    }
}

#[test]
fn scroll_distance_and_keyframes_stay_in_bounds() {
    let cfg = ChatConfig::default();
    let out = run(&long_conversation(), &cfg, 11);
    let plan = &out.scroll;

    let expected = (out.timeline.total_content_height - out.timeline.viewport_height).max(0.0);
    assert_eq!(plan.scroll_distance, expected);
    assert!(plan.scroll_distance > 0.0);
    assert!(plan.scroll_duration_sec >= cfg.scroll.min_duration_sec);
    assert_eq!(
        plan.scroll_delay_sec,
        out.timeline.total_typing_time_ms as f64 / 1000.0 + cfg.scroll.delay_buffer_sec
    );

    assert_eq!(plan.keyframes.first().map(|k| k.percent), Some(0.0));
    assert_eq!(plan.keyframes.last().map(|k| k.percent), Some(100.0));
    for k in &plan.keyframes {
        assert!(k.offset >= 0.0);
        assert!(k.offset <= plan.final_offset, "{k:?} overshoots {}", plan.final_offset);
    }
    for w in plan.keyframes.windows(2) {
        assert!(w[0].percent < w[1].percent);
    }
}

#[test]
fn layout_is_idempotent_across_runs() {
    let cfg = ChatConfig::default();
    let a = run(&long_conversation(), &cfg, 1);
    let b = run(&long_conversation(), &cfg, 2);
    for (x, y) in a.timed_events().iter().zip(b.timed_events()) {
        assert_eq!(x.layout, y.layout);
        assert_eq!(x.y, y.y);
    }
}

#[test]
fn same_seed_reproduces_the_whole_timeline() {
    let cfg = ChatConfig::default();
    assert_eq!(run(&long_conversation(), &cfg, 9), run(&long_conversation(), &cfg, 9));
}

#[test]
fn chart_heavy_conversations_scroll_faster() {
    let cfg = ChatConfig::default();
    let mut events = Vec::new();
    for i in 0..6 {
        events.push(ConversationEvent::chart(
            Sender::Visitor,
            bar_chart(Some(&format!("Chart {i}")), 6),
        ));
    }
    let out = run(&events, &cfg, 5);
    assert!(out.scroll.pixels_per_sec > cfg.scroll.pixels_per_sec);
    assert!(out.scroll.pixels_per_sec <= cfg.scroll.pixels_per_sec * cfg.scroll.max_chart_speedup);
}

#[test]
fn inverted_typing_bounds_are_rejected_before_scheduling() {
    let mut cfg = ChatConfig::default();
    cfg.timing.typing_min_ms = 3000;
    cfg.timing.typing_max_ms = 1000;
    let events = vec![ConversationEvent::text(Sender::Me, "Hello")];
    let err = build_timeline_with_rng(
        &events,
        &cfg,
        &Substitutions::new(),
        &LayoutOptions::for_config(&cfg),
        &mut StdRng::seed_from_u64(1),
    )
    .expect_err("invalid config");
    assert!(err.to_string().contains("timing.typingMinMs"), "{err}");
}

#[test]
fn a_speedup_cap_below_one_does_not_slow_the_scroll() {
    let mut cfg = ChatConfig::default();
    cfg.scroll.max_chart_speedup = 0.5;
    let events = (0..6)
        .map(|i| ConversationEvent::chart(Sender::Visitor, bar_chart(Some(&format!("C{i}")), 6)))
        .collect::<Vec<_>>();
    let timeline = chatter_render::timeline::schedule(&events, &cfg, &Substitutions::new());
    assert_eq!(chatter_render::scroll::chart_speed_factor(&timeline, &cfg), 1.0);
}
