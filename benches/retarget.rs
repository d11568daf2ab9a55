use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use restep::prelude::*;

fn stream(length: u32) -> Vec<ChartEvent> {
    // An alternating run over all four panels.
    let lanes: [Lane; 4] = [0, 1, 3, 2];
    (0..length)
        .map(|index| {
            ChartEvent::new(
                EventKind::Tap,
                Position::new(index / 4, index % 4, 4),
                lanes[(index % 4) as usize],
            )
        })
        .collect()
}

fn retarget_stream(c: &mut Criterion) {
    let thresholds = DeriveThresholds::default();
    let single = PadModel::derive(&layouts::DANCE_SINGLE, 0.5, &thresholds).expect("derives");
    let pump = PadModel::derive(&layouts::PUMP_SINGLE, 0.5, &thresholds).expect("derives");
    let single_graph = StepGraph::build(&single);
    let pump_graph = StepGraph::build(&pump);
    let fallbacks = StepTypeFallbacks::default_table();
    let events = stream(256);

    c.bench_function("express 256 taps", |b| {
        b.iter(|| {
            express(
                &single,
                &single_graph,
                black_box(&events),
                &ExpressOptions::default(),
            )
        })
    });
    c.bench_function("retarget 256 taps to pump", |b| {
        b.iter(|| {
            retarget(
                &single,
                &single_graph,
                &pump,
                &pump_graph,
                &fallbacks,
                black_box(&events),
                &ExpressOptions::default(),
                &PerformOptions::default(),
                &mut RngMock([3, 1, 4, 1, 5, 9, 2, 6]),
            )
        })
    });
}

criterion_group!(benches, retarget_stream);
criterion_main!(benches);
