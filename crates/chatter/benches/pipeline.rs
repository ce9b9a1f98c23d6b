use chatter::render::{LayoutOptions, RenderOptions, build_timeline_with_rng, render_svg};
use chatter::{ChartData, ChartItem, ChartType, ChatConfig, ConversationEvent, Sender, Substitutions};
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn fixtures() -> Vec<(&'static str, Vec<ConversationEvent>)> {
    let short = vec![
        ConversationEvent::text(Sender::Visitor, "Hi!"),
        ConversationEvent::text(Sender::Me, "Hello there, how are you today?"),
    ];

    let long = (0..60)
        .map(|i| {
            let sender = if i % 2 == 0 { Sender::Me } else { Sender::Visitor };
            ConversationEvent::text(
                sender,
                format!("Line {i}: a message long enough to wrap over a couple of lines"),
            )
        })
        .collect::<Vec<_>>();

    let charts = (0..10)
        .map(|i| {
            ConversationEvent::chart(
                Sender::Visitor,
                ChartData {
                    chart_type: if i % 2 == 0 {
                        ChartType::Bar
                    } else {
                        ChartType::Donut
                    },
                    title: Some(format!("Chart {i}")),
                    items: (0..6)
                        .map(|j| ChartItem::new(format!("Item {j}"), (j * 7 + 3) as f64))
                        .collect(),
                    ..ChartData::default()
                },
            )
        })
        .collect::<Vec<_>>();

    vec![("short", short), ("long_text", long), ("charts", charts)]
}

fn bench_timeline(c: &mut Criterion) {
    let config = ChatConfig::default();
    let layout = LayoutOptions::for_config(&config);
    let vars = Substitutions::new();

    let mut group = c.benchmark_group("build_timeline");
    for (name, events) in fixtures() {
        group.bench_function(name, |b| {
            b.iter_batched(
                || StdRng::seed_from_u64(0),
                |mut rng| {
                    build_timeline_with_rng(&events, &config, &vars, &layout, &mut rng)
                        .expect("valid config")
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_render_svg(c: &mut Criterion) {
    let config = ChatConfig::default();
    let layout = LayoutOptions::for_config(&config);
    let vars = Substitutions::new();
    let options = RenderOptions::default();

    let mut group = c.benchmark_group("render_svg");
    for (name, events) in fixtures() {
        let result =
            build_timeline_with_rng(&events, &config, &vars, &layout, &mut StdRng::seed_from_u64(0))
                .expect("valid config");
        group.bench_function(name, |b| {
            b.iter(|| render_svg(&result, &config, &options));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_timeline, bench_render_svg);
criterion_main!(benches);
