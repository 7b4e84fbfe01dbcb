//! Benchmarks for lockfile parsing and ordering.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use freeze2nix_lockfile::{DependencyGraph, parse_lockfile};

/// Generate a lockfile with N packages, each depended on by up to three earlier ones.
fn generate_lockfile(count: usize) -> String {
    let mut text = String::from("#\n# This file is autogenerated by pip-compile\n#\n");
    for i in 0..count {
        text.push_str(&format!("package-{i:05}==1.{}.0\n", i % 10));
        let dependents: Vec<usize> = (1..=3).filter_map(|d| i.checked_sub(d * 7)).collect();
        if dependents.is_empty() {
            text.push_str("    # via -r requirements.in\n");
        } else {
            text.push_str("    # via\n");
            for d in dependents {
                text.push_str(&format!("    #   package-{d:05}\n"));
            }
        }
    }
    text
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for count in [50, 500, 5000] {
        let text = generate_lockfile(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &text, |b, text| {
            b.iter(|| parse_lockfile(black_box(text)).unwrap())
        });
    }
    group.finish();
}

fn bench_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("emission_order");
    for count in [50, 500, 5000] {
        let graph = DependencyGraph::build(parse_lockfile(&generate_lockfile(count)).unwrap())
            .unwrap();
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &graph, |b, graph| {
            b.iter(|| black_box(graph.emission_order().unwrap().len()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_order);
criterion_main!(benches);
