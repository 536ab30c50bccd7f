use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use orgchart_rs::config::Config;
use orgchart_rs::document::build_presentation;
use orgchart_rs::forest::build_forest;
use orgchart_rs::ir::Relation;
use orgchart_rs::layout::compute_layout;
use orgchart_rs::parser::{format_relations, parse_relations};
use orgchart_rs::render::render_svg;
use std::hint::black_box;

/// Every node owns `fanout` children until `count` nodes exist.
fn wide_relations(count: usize, fanout: usize) -> Vec<Relation> {
    let mut out = Vec::with_capacity(count);
    for i in 1..count {
        let parent = (i - 1) / fanout;
        out.push(
            Relation::new(&format!("Company {parent}"), &format!("Company {i}"), 50.0)
                .expect("valid relation"),
        );
    }
    out
}

fn deep_relations(depth: usize) -> Vec<Relation> {
    (1..depth)
        .map(|i| {
            Relation::new(&format!("Level {}", i - 1), &format!("Level {i}"), 100.0)
                .expect("valid relation")
        })
        .collect()
}

/// Several independent groups with cross-holdings between neighbours.
fn tangled_relations(groups: usize, per_group: usize) -> Vec<Relation> {
    let mut out = Vec::new();
    for g in 0..groups {
        for i in 0..per_group {
            out.push(
                Relation::new(&format!("Group {g}"), &format!("G{g} Sub {i}"), 75.0)
                    .expect("valid relation"),
            );
        }
        if g > 0 {
            out.push(
                Relation::new(&format!("G{} Sub 0", g - 1), &format!("G{g} Sub 1"), 10.0)
                    .expect("valid relation"),
            );
        }
    }
    out
}

fn cases() -> Vec<(String, Vec<Relation>)> {
    vec![
        ("wide_40_f4".to_string(), wide_relations(40, 4)),
        ("wide_200_f6".to_string(), wide_relations(200, 6)),
        ("deep_60".to_string(), deep_relations(60)),
        ("tangled_8x6".to_string(), tangled_relations(8, 6)),
    ]
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for (name, relations) in cases() {
        let input = format_relations(&relations);
        group.bench_with_input(BenchmarkId::from_parameter(name), &input, |b, data| {
            b.iter(|| {
                let store = parse_relations(black_box(data)).expect("parse failed");
                black_box(store.len());
            });
        });
    }
    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let config = Config::default();
    for (name, relations) in cases() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &relations, |b, rels| {
            b.iter(|| {
                let forest = build_forest(black_box(rels));
                let layout = compute_layout(&forest, rels, &config.theme, &config.layout);
                black_box(layout.nodes.len());
            });
        });
    }
    group.finish();
}

fn bench_emit(c: &mut Criterion) {
    let mut group = c.benchmark_group("emit");
    let config = Config::default();
    for (name, relations) in cases() {
        let forest = build_forest(&relations);
        let layout = compute_layout(&forest, &relations, &config.theme, &config.layout);
        group.bench_with_input(BenchmarkId::new("pptx", &name), &layout, |b, layout| {
            b.iter(|| {
                let pres =
                    build_presentation(black_box(layout), &relations, &config.theme, &config.render);
                let bytes = pres.to_bytes().expect("package failed");
                black_box(bytes.len());
            });
        });
        group.bench_with_input(BenchmarkId::new("svg", &name), &layout, |b, layout| {
            let pres = build_presentation(layout, &relations, &config.theme, &config.render);
            b.iter(|| {
                let svg = render_svg(&pres, black_box(layout), &config.theme).expect("render failed");
                black_box(svg.len());
            });
        });
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("end_to_end");
    let config = Config::default();
    for (name, relations) in cases() {
        let input = format_relations(&relations);
        group.bench_with_input(BenchmarkId::from_parameter(name), &input, |b, data| {
            b.iter(|| {
                let store = parse_relations(black_box(data)).expect("parse failed");
                let bytes =
                    orgchart_rs::render_pptx(&store.snapshot(), &config).expect("render failed");
                black_box(bytes.len());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_layout, bench_emit, bench_end_to_end);
criterion_main!(benches);
