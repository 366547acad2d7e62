//! Mark-and-compact after detaching subtrees, and handle repair.
#![allow(clippy::expect_used)]

use std::hint::black_box;

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use datamap_bench::{SizeTier, generate_schema};
use datamap_core::{SchemaGraph, VertexKind};

/// Removes the first edge of the root so a whole subtree becomes garbage.
fn detached(tier: SizeTier) -> SchemaGraph {
    let mut graph = generate_schema(&tier.config(42)).expect("generates");
    let first = graph
        .edges()
        .next()
        .map(|(edge_ref, _)| edge_ref)
        .expect("root has edges");
    graph.remove_edge(first).expect("exists");
    graph
}

fn bench_reduce(c: &mut Criterion) {
    let mut group = c.benchmark_group("reduce");

    for (name, tier) in [
        ("S", SizeTier::Small),
        ("M", SizeTier::Medium),
        ("L", SizeTier::Large),
        ("XL", SizeTier::XLarge),
    ] {
        let graph = detached(tier);

        group.bench_function(BenchmarkId::new("from_root", name), |b| {
            b.iter_batched(
                || graph.clone(),
                |mut g| {
                    let root = g.root();
                    black_box(g.reduce(&[root]).expect("root retained"))
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");

    for (name, tier) in [("S", SizeTier::Small), ("M", SizeTier::Medium), ("L", SizeTier::Large)]
    {
        let mut graph = generate_schema(&tier.config(42)).expect("generates");
        let identifiers: Vec<_> = graph
            .vertices()
            .filter(|v| v.is_identifier())
            .map(|v| v.id())
            .collect();
        for &id in identifiers.iter().step_by(2) {
            graph
                .replace_vertex(id, VertexKind::Identifier)
                .expect("identifier slot");
        }

        group.bench_function(BenchmarkId::new("half_replaced", name), |b| {
            b.iter_batched(
                || graph.clone(),
                |mut g| black_box(g.resolve()),
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_reduce, bench_resolve);
criterion_main!(benches);
