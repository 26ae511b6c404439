//! Benchmarks for walking and describing figure object graphs
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;

use figure_forge::binding::describe;
use figure_forge::drawable::DrawableRef;
use figure_forge::explorer::ExplorerTree;
use figure_forge::figure::{demo_figure, Artist, ArtistKind};
use figure_forge::resolver::{resolve_get, AttributePath};
use figure_forge::schema::Schema;
use figure_forge::types::ValueIndex;

fn wide_figure(axes: usize, lines: usize) -> Arc<Artist> {
    let fig = Artist::figure();
    for a in 0..axes {
        let Ok(ax) = fig.add_axes(&format!("ax{}", a)) else {
            continue;
        };
        for l in 0..lines {
            let xs: Vec<f64> = (0..64).map(|i| i as f64).collect();
            let ys: Vec<f64> = xs.iter().map(|x| (x * 0.1 + l as f64).sin()).collect();
            let _ = ax.plot(&xs, &ys);
        }
    }
    fig
}

fn bench_tree_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_build");

    for lines in [1, 10, 50].iter() {
        let root: DrawableRef = wide_figure(4, *lines);
        let nodes = ExplorerTree::build(&root).map(|t| t.len()).unwrap_or(0);
        group.throughput(Throughput::Elements(nodes as u64));

        group.bench_with_input(BenchmarkId::new("lines_per_axes", lines), &root, |b, root| {
            b.iter(|| black_box(ExplorerTree::build(root).map(|t| t.len())));
        });
    }

    group.finish();
}

fn bench_describe(c: &mut Criterion) {
    let mut group = c.benchmark_group("describe");
    let schema = Schema::builtin().expect("builtin schema");
    let root: DrawableRef = demo_figure().expect("demo figure");
    let tree = ExplorerTree::build(&root).expect("tree");
    let objects: Vec<DrawableRef> = tree.iter().filter_map(|n| n.object()).collect();

    group.throughput(Throughput::Elements(objects.len() as u64));
    group.bench_function("demo_figure_all_nodes", |b| {
        b.iter(|| {
            for obj in &objects {
                black_box(describe(&schema, obj));
            }
        });
    });

    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    let fig = demo_figure().expect("demo figure");
    let axes: DrawableRef = fig
        .children_of_kind(ArtistKind::Axes)
        .into_iter()
        .next()
        .expect("demo axes");
    let flat = AttributePath::parse("get_xlim").expect("path");
    let nested = AttributePath::parse("xaxis.label.get_text").expect("path");
    let first = ValueIndex::Position(0);

    group.bench_function("indexed", |b| {
        b.iter(|| black_box(resolve_get(&axes, &flat, Some(&first))));
    });
    group.bench_function("nested", |b| {
        b.iter(|| black_box(resolve_get(&axes, &nested, None)));
    });

    group.finish();
}

criterion_group!(benches, bench_tree_build, bench_describe, bench_resolve);
criterion_main!(benches);
