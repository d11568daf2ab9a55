//! End-to-end scenarios over the bundled 4-panel layout.

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

fn tap(measure: u32, lane: Lane) -> ChartEvent {
    ChartEvent::new(EventKind::Tap, Position::at_measure(measure), lane)
}

fn express_steps(events: &[ChartEvent]) -> ExpressOutput {
    let (pad, graph) = dance_single();
    express(pad, graph, events, &ExpressOptions::default()).expect("chart expresses")
}

#[test]
fn single_tap_expresses_as_a_left_new_arrow() {
    let output = express_steps(&[tap(0, 0)]);
    assert_eq!(output.chart.steps.len(), 1);
    assert_eq!(
        output.chart.steps[0].label,
        MoveLabel::single(Foot::Left, StepType::NewArrow, FootAction::Tap)
    );
    assert!(output.chart.mines.is_empty());
}

#[test]
fn a_jack_does_not_alternate_feet() {
    let output = express_steps(&[tap(0, 0), tap(1, 0), tap(2, 0)]);
    let labels: Vec<MoveLabel> = output.chart.steps.iter().map(|step| step.label).collect();
    assert_eq!(
        labels,
        vec![
            MoveLabel::single(Foot::Left, StepType::NewArrow, FootAction::Tap),
            MoveLabel::single(Foot::Left, StepType::SameArrow, FootAction::Tap),
            MoveLabel::single(Foot::Left, StepType::SameArrow, FootAction::Tap),
        ]
    );
}

#[test]
fn jump_then_step_picks_the_left_foot_for_down() {
    let output = express_steps(&[tap(0, 0), tap(0, 3), tap(1, 1)]);
    assert_eq!(output.chart.steps.len(), 2);
    let jump = MoveLabel::merged(
        MoveLabel::single(Foot::Left, StepType::NewArrow, FootAction::Tap),
        MoveLabel::single(Foot::Right, StepType::NewArrow, FootAction::Tap),
    );
    assert_eq!(output.chart.steps[0].label, jump);
    assert_eq!(
        output.chart.steps[1].label,
        MoveLabel::single(Foot::Left, StepType::NewArrow, FootAction::Tap)
    );
}

#[test]
fn hold_mine_release_combines_into_one_event() {
    let events = vec![
        ChartEvent::new(EventKind::HoldStart, Position::at_measure(0), 0),
        ChartEvent::new(EventKind::Mine, Position::at_measure(2), 3),
        ChartEvent::new(EventKind::HoldEnd, Position::at_measure(4), 0),
        tap(4, 3),
    ];
    let output = express_steps(&events);

    assert_eq!(output.chart.steps.len(), 2);
    assert_eq!(
        output.chart.steps[0].label,
        MoveLabel::single(Foot::Left, StepType::NewArrow, FootAction::Hold)
    );
    // The release on L and the tap on R at measure 4 are one event with
    // both feet committed.
    let combined = MoveLabel::merged(
        MoveLabel::single(Foot::Left, StepType::SameArrow, FootAction::Release),
        MoveLabel::single(Foot::Right, StepType::NewArrow, FootAction::Tap),
    );
    assert_eq!(output.chart.steps[1].label, combined);

    // No release ever happens on the mine's lane; the nearest event there
    // is the tap at measure 4, zero positions ahead, by the right foot.
    assert_eq!(
        output.chart.mines,
        vec![MineEvent {
            position: Position::at_measure(2),
            mine: ExpressedMine::BeforeArrow {
                nth_closest: 0,
                foot: Foot::Right,
            },
        }]
    );
}

#[test]
fn mine_after_a_release_expresses_as_after_arrow() {
    let events = vec![
        ChartEvent::new(EventKind::HoldStart, Position::at_measure(0), 0),
        ChartEvent::new(EventKind::HoldEnd, Position::at_measure(2), 0),
        ChartEvent::new(EventKind::Mine, Position::at_measure(3), 0),
        tap(4, 3),
    ];
    let output = express_steps(&events);
    assert_eq!(
        output.chart.mines,
        vec![MineEvent {
            position: Position::at_measure(3),
            mine: ExpressedMine::AfterArrow {
                nth_closest: 0,
                foot: Foot::Left,
            },
        }]
    );
}

#[test]
fn smaller_pad_performs_the_tap_on_its_starting_arrow() {
    // A 3-lane pad: U, D, R of the dance layout, no L.
    let (source, source_graph) = dance_single();
    let target = PadModel::derive(&[(1, 0), (1, 2), (2, 1)], 0.5, &DeriveThresholds::default())
        .expect("3-lane pad derives");
    assert_eq!(target.canonical_start(), (0, 1));
    let target_graph = StepGraph::build(&target);

    let expressed = express(source, source_graph, &[tap(0, 0)], &ExpressOptions::default())
        .expect("expresses");
    let performed = perform(
        &target,
        &target_graph,
        &StepTypeFallbacks::default_table(),
        &expressed.chart,
        &PerformOptions::default(),
        &mut RngMock([7, 3, 1]),
    )
    .expect("performs");

    // The tier-0 stance is (left on U, right on D); the cheapest landing
    // for the left foot's tap is its own starting arrow.
    assert_eq!(
        performed.chart.to_events(),
        vec![ChartEvent::new(EventKind::Tap, Position::at_measure(0), 0)]
    );
    assert!(performed.warnings.is_empty());
}

#[test]
fn unplaceable_mine_is_dropped_with_a_warning() {
    // Two lanes side by side; both get stepped, so a NoArrow mine has no
    // untouched lane left to sit on.
    let pad = PadModel::derive(&[(0, 1), (1, 1)], 0.5, &DeriveThresholds::default())
        .expect("2-lane pad derives");
    let graph = StepGraph::build(&pad);
    let expressed = ExpressedChart {
        steps: vec![
            StepEvent {
                position: Position::at_measure(0),
                label: MoveLabel::single(Foot::Left, StepType::NewArrow, FootAction::Tap),
            },
            StepEvent {
                position: Position::at_measure(1),
                label: MoveLabel::single(Foot::Right, StepType::NewArrow, FootAction::Tap),
            },
        ],
        mines: vec![MineEvent {
            position: Position::at_measure(2),
            mine: ExpressedMine::NoArrow,
        }],
    };
    let performed = perform(
        &pad,
        &graph,
        &StepTypeFallbacks::default_table(),
        &expressed,
        &PerformOptions::default(),
        &mut RngMock([1, 2]),
    )
    .expect("performs");
    assert!(performed.chart.mines.is_empty());
    assert_eq!(
        performed.warnings,
        vec![PerformWarning::MineDropped { measure: 2 }]
    );
}

#[test]
fn retarget_runs_end_to_end_across_layouts() {
    let (source, source_graph) = dance_single();
    let target = PadModel::derive(&layouts::PUMP_SINGLE, 0.5, &DeriveThresholds::default())
        .expect("pump derives");
    let target_graph = StepGraph::build(&target);

    let events = vec![tap(0, 0), tap(1, 2), tap(2, 3), tap(3, 1)];
    let output = retarget(
        source,
        source_graph,
        &target,
        &target_graph,
        &StepTypeFallbacks::default_table(),
        &events,
        &ExpressOptions::default(),
        &PerformOptions::default(),
        &mut RngMock([5, 9, 2, 6]),
    )
    .expect("retargets");

    assert_eq!(output.events.len(), 4);
    assert!(output.events.iter().all(|event| event.kind == EventKind::Tap));
    assert!(
        output
            .events
            .iter()
            .all(|event| usize::from(event.lane) < target.num_arrows())
    );
    // Positions carry over untouched.
    let positions: Vec<Position> = output.events.iter().map(|event| event.position).collect();
    assert_eq!(
        positions,
        (0..4).map(Position::at_measure).collect::<Vec<_>>()
    );
}

#[test]
fn out_of_range_lanes_are_rejected() {
    let (pad, graph) = dance_single();
    let err = express(pad, graph, &[tap(0, 9)], &ExpressOptions::default()).unwrap_err();
    assert_eq!(
        err,
        ExpressError::LaneOutOfRange {
            lane: 9,
            num_arrows: 4
        }
    );
}

#[test]
fn triples_parse_as_bracket_jumps() {
    let output = express_steps(&[tap(0, 0), tap(0, 1), tap(0, 3)]);
    assert_eq!(output.chart.steps.len(), 1);
    let label = output.chart.steps[0].label;
    assert_eq!(label.total_arrows(), 3);
    assert!(
        label
            .entries()
            .any(|(_, _, entry)| entry.step.is_bracket()),
        "a triple needs one foot on two arrows: {label:?}"
    );
}

#[test]
fn three_simultaneous_holds_force_aggressive_parsing() {
    let start = Position::at_measure(0);
    let end = Position::at_measure(1);
    let mut events = Vec::new();
    for lane in [0, 1, 3] {
        events.push(ChartEvent::new(EventKind::HoldStart, start, lane));
    }
    for lane in [0, 1, 3] {
        events.push(ChartEvent::new(EventKind::HoldEnd, end, lane));
    }
    let output = express_steps(&events);
    assert_eq!(output.mode, ParseMode::Aggressive);
    assert_eq!(output.chart.steps.len(), 2);
    assert!(output.chart.steps[1].label.is_release_only());
}
