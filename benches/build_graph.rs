use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use restep::prelude::*;

fn build_graph(c: &mut Criterion) {
    let thresholds = DeriveThresholds::default();
    let single = PadModel::derive(&layouts::DANCE_SINGLE, 0.5, &thresholds).expect("derives");
    let pump = PadModel::derive(&layouts::PUMP_SINGLE, 0.5, &thresholds).expect("derives");

    c.bench_function("derive dance-single", |b| {
        b.iter(|| PadModel::derive(black_box(&layouts::DANCE_SINGLE), 0.5, &thresholds))
    });
    c.bench_function("build dance-single graph", |b| {
        b.iter(|| StepGraph::build(black_box(&single)))
    });
    c.bench_function("build pump-single graph", |b| {
        b.iter(|| StepGraph::build(black_box(&pump)))
    });
}

criterion_group!(benches, build_graph);
criterion_main!(benches);
