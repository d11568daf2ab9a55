//! The performance search: bounded depth-first backtracking with fallbacks.
//!
//! Candidate labels are assembled per expressed step as the cross product of
//! each acting foot's fallback list, in fallback order. Destination links
//! are shuffled with the injected generator so the bounded search samples
//! consistent paths instead of deterministically drowning in one corner of
//! the graph; the cheapest completed path wins. Starting tiers are tried
//! canonical-first, then in random order.

use crate::chart::Lane;
use crate::express::StepEvent;
use crate::fallback::StepTypeFallbacks;
use crate::graph::moves::{FootAction, FootStep, MoveLabel, StepType};
use crate::graph::state::{BodyState, Foot, PORTIONS_PER_FOOT};
use crate::graph::{ActedLanes, NodeId, StepGraph};
use crate::pad::{PadModel, PadPosition};
use crate::perform::{PerformError, PerformOptions, PerformedStep};
use crate::rng::{Rng, shuffle};

const FALLBACK_WEIGHT: f64 = 10.0;
const LATERAL_WEIGHT: f64 = 0.25;
const CANCEL_CHECK_INTERVAL: usize = 1024;

/// Per-foot anchor points used to price the first steps out of the
/// uncommitted root: the starting-tier pair currently being attempted.
#[derive(Debug, Clone, Copy)]
struct Anchor {
    feet: [(f64, f64); 2],
}

impl Anchor {
    fn new(pad: &PadModel, left: Lane, right: Lane) -> Self {
        Self {
            feet: [as_point(pad.position(left)), as_point(pad.position(right))],
        }
    }
}

fn as_point(position: PadPosition) -> (f64, f64) {
    (f64::from(position.x), f64::from(position.y))
}

#[derive(Debug, Clone)]
struct Candidate {
    label: MoveLabel,
    lanes: ActedLanes,
    dest: NodeId,
    cost: f64,
}

#[derive(Debug)]
struct Frame {
    acc: f64,
    candidates: Vec<Candidate>,
    next: usize,
}

pub(crate) fn run(
    pad: &PadModel,
    graph: &StepGraph,
    fallbacks: &StepTypeFallbacks,
    steps: &[StepEvent],
    options: &PerformOptions,
    rng: &mut dyn Rng,
) -> Result<Vec<PerformedStep>, PerformError> {
    if steps.is_empty() {
        return Ok(Vec::new());
    }

    let tiers = pad.starting_positions();
    let mut tier_order: Vec<usize> = (1..tiers.len()).collect();
    shuffle(rng, &mut tier_order);
    tier_order.insert(0, 0);

    let mut iterations = 0usize;
    for tier in tier_order {
        let mut pairs = tiers[tier].clone();
        shuffle(rng, &mut pairs);
        for (left, right) in pairs {
            let anchor = Anchor::new(pad, left, right);
            if let Some(path) =
                depth_first(pad, graph, fallbacks, steps, anchor, options, rng, &mut iterations)?
            {
                return Ok(path);
            }
            if iterations >= options.iteration_budget {
                return Err(PerformError::Unreachable);
            }
        }
    }
    Err(PerformError::Unreachable)
}

#[allow(clippy::too_many_arguments)]
fn depth_first(
    pad: &PadModel,
    graph: &StepGraph,
    fallbacks: &StepTypeFallbacks,
    steps: &[StepEvent],
    anchor: Anchor,
    options: &PerformOptions,
    rng: &mut dyn Rng,
    iterations: &mut usize,
) -> Result<Option<Vec<PerformedStep>>, PerformError> {
    let root = graph.root();
    let mut stack = vec![Frame {
        acc: 0.0,
        candidates: candidates(pad, graph, fallbacks, &steps[0], root, anchor, rng),
        next: 0,
    }];
    let mut path: Vec<Candidate> = Vec::new();
    let mut best: Option<(f64, Vec<Candidate>)> = None;

    while let Some(frame) = stack.last_mut() {
        if *iterations >= options.iteration_budget {
            break;
        }
        if *iterations % CANCEL_CHECK_INTERVAL == 0
            && options
                .cancel
                .as_ref()
                .is_some_and(crate::cancel::CancelToken::is_cancelled)
        {
            return Err(PerformError::Cancelled);
        }
        if frame.next >= frame.candidates.len() {
            stack.pop();
            if stack.is_empty() {
                break;
            }
            path.pop();
            continue;
        }
        let candidate = frame.candidates[frame.next].clone();
        frame.next += 1;
        *iterations += 1;

        let total = frame.acc + candidate.cost;
        if best.as_ref().is_some_and(|(cost, _)| total >= *cost) {
            continue;
        }
        let depth = stack.len() - 1;
        if depth + 1 == steps.len() {
            let mut full = path.clone();
            full.push(candidate);
            best = Some((total, full));
            continue;
        }
        let next_frame = Frame {
            acc: total,
            candidates: candidates(
                pad,
                graph,
                fallbacks,
                &steps[depth + 1],
                candidate.dest,
                anchor,
                rng,
            ),
            next: 0,
        };
        path.push(candidate);
        stack.push(next_frame);
    }

    Ok(best.map(|(_, chain)| {
        chain
            .into_iter()
            .zip(steps)
            .map(|(candidate, step)| PerformedStep {
                position: step.position,
                state: *graph.state(candidate.dest),
                label: candidate.label,
                lanes: candidate.lanes,
            })
            .collect()
    }))
}

/// One acting foot's entry variants, in fallback order.
fn foot_variants(
    fallbacks: &StepTypeFallbacks,
    label: &MoveLabel,
    foot: Foot,
) -> Vec<(Option<[Option<FootStep>; PORTIONS_PER_FOOT]>, f64)> {
    let entries = label.foot_entries(foot);
    let Some(first) = entries[0] else {
        return vec![(None, 0.0)];
    };
    let original = first.step;
    let actions: Vec<FootAction> = entries.iter().flatten().map(|entry| entry.action).collect();
    fallbacks
        .fallbacks_for(original)
        .iter()
        .map(|&candidate| {
            let cost = fallbacks
                .transition_cost(original, candidate)
                .expect("candidate comes from the fallback list");
            (Some(adapt_entries(candidate, &actions)), cost)
        })
        .collect()
}

/// Re-shapes the original actions onto a fallback step type, merging or
/// duplicating when the arrow count changes.
fn adapt_entries(candidate: StepType, actions: &[FootAction]) -> [Option<FootStep>; PORTIONS_PER_FOOT] {
    let merged = if actions.iter().all(|action| action.is_release()) {
        FootAction::Release
    } else if actions.contains(&FootAction::Hold) {
        FootAction::Hold
    } else if actions.contains(&FootAction::Roll) {
        FootAction::Roll
    } else {
        FootAction::Tap
    };
    match (candidate.arrow_count(), actions.len()) {
        (2, 2) => [
            Some(FootStep::new(candidate, actions[0])),
            Some(FootStep::new(candidate, actions[1])),
        ],
        (2, _) => [
            Some(FootStep::new(candidate, merged)),
            Some(FootStep::new(candidate, merged)),
        ],
        _ => [Some(FootStep::new(candidate, merged)), None],
    }
}

fn candidates(
    pad: &PadModel,
    graph: &StepGraph,
    fallbacks: &StepTypeFallbacks,
    step: &StepEvent,
    node: NodeId,
    anchor: Anchor,
    rng: &mut dyn Rng,
) -> Vec<Candidate> {
    let src = *graph.state(node);
    let mut out = Vec::new();
    for (left, left_cost) in foot_variants(fallbacks, &step.label, Foot::Left) {
        for (right, right_cost) in foot_variants(fallbacks, &step.label, Foot::Right) {
            let label = match (left, right) {
                (Some(entries), None) => MoveLabel::from_foot(Foot::Left, entries),
                (None, Some(entries)) => MoveLabel::from_foot(Foot::Right, entries),
                (Some(left_entries), Some(right_entries)) => MoveLabel::merged(
                    MoveLabel::from_foot(Foot::Left, left_entries),
                    MoveLabel::from_foot(Foot::Right, right_entries),
                ),
                (None, None) => continue,
            };
            let mut links = graph.links(node, &label).to_vec();
            shuffle(rng, &mut links);
            for link in links {
                let movement = movement_cost(pad, &src, &label, &link.lanes, anchor);
                out.push(Candidate {
                    label,
                    lanes: link.lanes,
                    dest: link.dest,
                    cost: FALLBACK_WEIGHT * (left_cost + right_cost) + movement,
                });
            }
        }
    }
    out
}

/// Tightening plus lateral-motion cost of one move.
fn movement_cost(
    pad: &PadModel,
    src: &BodyState,
    label: &MoveLabel,
    lanes: &ActedLanes,
    anchor: Anchor,
) -> f64 {
    let mut tighten = 0.0;
    let mut body_before = 0.0;
    let mut body_after = 0.0;
    for foot in Foot::ALL {
        let from = foot_point(pad, src, foot, anchor);
        let to = if label.foot_entries(foot)[0].is_some() {
            let mut x = 0.0;
            let mut y = 0.0;
            let mut count = 0usize;
            for lane in lanes[foot.index()].iter().flatten() {
                let point = as_point(pad.position(*lane));
                x += point.0;
                y += point.1;
                count += 1;
            }
            if count == 0 {
                from
            } else {
                (x / count as f64, y / count as f64)
            }
        } else {
            from
        };
        tighten += travel(pad, from, to);
        body_before += from.0;
        body_after += to.0;
    }
    tighten + LATERAL_WEIGHT * (body_after - body_before).abs() / 2.0
}

fn foot_point(pad: &PadModel, state: &BodyState, foot: Foot, anchor: Anchor) -> (f64, f64) {
    let mut x = 0.0;
    let mut y = 0.0;
    let mut count = 0usize;
    for (lane, _) in state.arrows(foot) {
        let point = as_point(pad.position(lane));
        x += point.0;
        y += point.1;
        count += 1;
    }
    if count == 0 {
        anchor.feet[foot.index()]
    } else {
        (x / count as f64, y / count as f64)
    }
}

/// Travel distance with the pad's Y compensation applied.
fn travel(pad: &PadModel, from: (f64, f64), to: (f64, f64)) -> f64 {
    let dx = to.0 - from.0;
    let dy = (to.1 - from.1) * (1.0 - pad.y_travel_compensation());
    (dx * dx + dy * dy).sqrt()
}
