//! Express-then-perform on the same pad reproduces the source chart for
//! sequences whose cheapest realization is unique.

use std::sync::OnceLock;

use pretty_assertions::assert_eq;
use restep::prelude::*;

fn dance_single() -> &'static (PadModel, StepGraph) {
    static CACHE: OnceLock<(PadModel, StepGraph)> = OnceLock::new();
    CACHE.get_or_init(|| {
        let pad = PadModel::derive(&layouts::DANCE_SINGLE, 0.5, &DeriveThresholds::default())
            .expect("dance single derives");
        let graph = StepGraph::build(&pad);
        (pad, graph)
    })
}

fn round_trip(events: Vec<ChartEvent>) -> Vec<ChartEvent> {
    let (pad, graph) = dance_single();
    let output = retarget(
        pad,
        graph,
        pad,
        graph,
        &StepTypeFallbacks::default_table(),
        &events,
        &ExpressOptions::default(),
        &PerformOptions::default(),
        &mut RngMock([11, 4, 8, 2]),
    )
    .expect("retargets");
    output.events
}

fn tap(measure: u32, lane: Lane) -> ChartEvent {
    ChartEvent::new(EventKind::Tap, Position::at_measure(measure), lane)
}

#[test]
fn single_tap_round_trips() {
    let events = vec![tap(0, 0)];
    assert_eq!(round_trip(events.clone()), events);
}

#[test]
fn jacks_round_trip() {
    let events = vec![tap(0, 0), tap(1, 0), tap(2, 0)];
    assert_eq!(round_trip(events.clone()), events);
}

#[test]
fn the_canonical_jump_round_trips() {
    let events = vec![tap(0, 0), tap(0, 3)];
    assert_eq!(round_trip(events.clone()), events);
}

#[test]
fn holds_round_trip_with_their_releases() {
    let events = vec![
        ChartEvent::new(EventKind::HoldStart, Position::at_measure(0), 0),
        ChartEvent::new(EventKind::HoldEnd, Position::at_measure(1), 0),
    ];
    assert_eq!(round_trip(events.clone()), events);
}

#[test]
fn rolls_survive_distinct_from_holds() {
    let events = vec![
        ChartEvent::new(EventKind::RollStart, Position::at_measure(0), 0),
        ChartEvent::new(EventKind::HoldEnd, Position::at_measure(1), 0),
    ];
    assert_eq!(round_trip(events.clone()), events);
}

#[test]
fn a_mine_after_a_release_lands_back_on_its_lane() {
    let events = vec![
        ChartEvent::new(EventKind::HoldStart, Position::at_measure(0), 0),
        ChartEvent::new(EventKind::HoldEnd, Position::at_measure(2), 0),
        ChartEvent::new(EventKind::Mine, Position::at_measure(3), 0),
    ];
    assert_eq!(round_trip(events.clone()), events);
}
