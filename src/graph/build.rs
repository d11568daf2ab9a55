//! Breadth-first enumeration of the step graph.
//!
//! Expansion starts from the uncommitted root and, for every frontier state,
//! runs each step type's fill rule over every (foot, arrow, action)
//! combination. Fill rules return the empty set when any precondition fails;
//! they never error. Jumps are the cartesian product of the single-foot jump
//! parts, applied left foot first, with the right foot's rule run against
//! every intermediate state the left rule produced.
//!
//! All enumeration orders are fixed (feet left-first, lanes ascending,
//! actions taps-first), so the same pad always builds the same graph.

use std::collections::VecDeque;

use itertools::iproduct;

use crate::chart::Lane;
use crate::graph::moves::{FootAction, FootStep, MoveLabel, StepType};
use crate::graph::state::{AttachState, BodyState, Foot, FootAttachment, FootPortion, PORTIONS_PER_FOOT};
use crate::graph::{ActedLanes, Link, StepGraph};
use crate::pad::PadModel;

pub(super) fn build(pad: &PadModel) -> StepGraph {
    let mut graph = StepGraph::with_capacity(pad.num_arrows() as u8);
    let (root, _) = graph.intern(BodyState::UNCOMMITTED);
    let mut queue = VecDeque::from([root]);
    while let Some(id) = queue.pop_front() {
        let state = *graph.state(id);
        for (label, lanes, dest) in enumerate_moves(pad, &state) {
            let (dest_id, fresh) = graph.intern(dest);
            if fresh {
                queue.push_back(dest_id);
            }
            graph.add_link(
                id,
                label,
                Link {
                    lanes,
                    dest: dest_id,
                },
            );
        }
    }
    graph
}

/// The result of one single-foot fill: the acting foot's label entries, the
/// lanes they act on (slot-aligned), and the destination state.
#[derive(Debug, Clone, Copy)]
struct FillResult {
    entries: [Option<FootStep>; PORTIONS_PER_FOOT],
    lanes: [Option<Lane>; PORTIONS_PER_FOOT],
    state: BodyState,
}

fn enumerate_moves(pad: &PadModel, state: &BodyState) -> Vec<(MoveLabel, ActedLanes, BodyState)> {
    let mut out = Vec::new();

    for foot in Foot::ALL {
        for step in StepType::ALL {
            for fill in fills_for(pad, state, foot, step) {
                let mut lanes: ActedLanes = [[None; PORTIONS_PER_FOOT]; 2];
                lanes[foot.index()] = fill.lanes;
                out.push((MoveLabel::from_foot(foot, fill.entries), lanes, fill.state));
            }
        }
    }

    for left_step in StepType::JUMP_PARTS {
        for left in fills_for(pad, state, Foot::Left, left_step) {
            for right_step in StepType::JUMP_PARTS {
                for right in fills_for(pad, &left.state, Foot::Right, right_step) {
                    let label = MoveLabel::merged(
                        MoveLabel::from_foot(Foot::Left, left.entries),
                        MoveLabel::from_foot(Foot::Right, right.entries),
                    );
                    out.push((label, [left.lanes, right.lanes], right.state));
                }
            }
        }
    }

    out
}

fn fills_for(pad: &PadModel, state: &BodyState, foot: Foot, step: StepType) -> Vec<FillResult> {
    match step {
        StepType::SameArrow => fill_same_arrow(pad, state, foot),
        StepType::NewArrow => fill_new_arrow(pad, state, foot, false),
        StepType::NewArrowStretch => fill_new_arrow(pad, state, foot, true),
        StepType::CrossoverFront => fill_crossover(pad, state, foot, step, true, false),
        StepType::CrossoverFrontStretch => fill_crossover(pad, state, foot, step, true, true),
        StepType::CrossoverBehind => fill_crossover(pad, state, foot, step, false, false),
        StepType::CrossoverBehindStretch => fill_crossover(pad, state, foot, step, false, true),
        StepType::InvertFront | StepType::InvertBehind => fill_invert(pad, state, foot, step, false),
        StepType::InvertFrontStretch | StepType::InvertBehindStretch => {
            fill_invert(pad, state, foot, step, true)
        }
        StepType::FootSwap
        | StepType::FootSwapCrossoverFront
        | StepType::FootSwapCrossoverBehind
        | StepType::FootSwapInvertFront
        | StepType::FootSwapInvertBehind => fill_foot_swap(pad, state, foot, step),
        StepType::BracketOneArrowHeelSame
        | StepType::BracketOneArrowHeelNew
        | StepType::BracketOneArrowHeelSwap
        | StepType::BracketOneArrowToeSame
        | StepType::BracketOneArrowToeNew
        | StepType::BracketOneArrowToeSwap => fill_one_arrow_bracket(pad, state, foot, step),
        _ => fill_bracket(pad, state, foot, step),
    }
}

/// State validity: distinct, bracketable arrows per foot; a lane shared
/// across feet only in a (partially) lifted stance; never crossed and
/// inverted against the same other-foot arrow.
fn is_valid_state(pad: &PadModel, state: &BodyState) -> bool {
    for foot in Foot::ALL {
        let arrows: Vec<(Lane, AttachState)> = state.arrows(foot).collect();
        if arrows.len() == PORTIONS_PER_FOOT {
            if arrows[0].0 == arrows[1].0 {
                return false;
            }
            if !pad.bracketable_pair(foot, arrows[0].0, arrows[1].0) {
                return false;
            }
        }
    }
    for (a, sa) in state.arrows(Foot::Left) {
        for (b, sb) in state.arrows(Foot::Right) {
            if a == b {
                if sa.is_held() && sb.is_held() {
                    return false;
                }
                continue;
            }
            if pad.any_crossover(Foot::Left, a, b) && pad.any_inverted(Foot::Left, a, b) {
                return false;
            }
        }
    }
    true
}

fn push_fill(
    out: &mut Vec<FillResult>,
    pad: &PadModel,
    dest: BodyState,
    entries: [Option<FootStep>; PORTIONS_PER_FOOT],
    lanes: [Option<Lane>; PORTIONS_PER_FOOT],
) {
    if is_valid_state(pad, &dest) {
        out.push(FillResult {
            entries,
            lanes,
            state: dest,
        });
    }
}

fn fill_same_arrow(pad: &PadModel, state: &BodyState, foot: Foot) -> Vec<FillResult> {
    let mut out = Vec::new();
    let slots = state.foot_slots(foot);
    let arrows: Vec<(Lane, AttachState)> = state.arrows(foot).collect();
    for (lane, attach) in arrows {
        for action in FootAction::ALL {
            let new_slots = if action.is_release() {
                if !attach.is_held() {
                    continue;
                }
                // Lift the hold; the foot stays on the arrow.
                slots.map(|slot| {
                    if slot.arrow == Some(lane) {
                        FootAttachment::on(lane, AttachState::Resting)
                    } else {
                        slot
                    }
                })
            } else {
                if attach != AttachState::Resting {
                    continue;
                }
                // A re-step keeps a held partner and lifts a resting one.
                let partner = slots
                    .iter()
                    .filter_map(|slot| slot.committed())
                    .find(|&(other, _)| other != lane);
                match partner {
                    Some((other, other_state)) if other_state.is_held() => [
                        FootAttachment::on(lane, action.resulting_state()),
                        FootAttachment::on(other, other_state),
                    ],
                    _ => [
                        FootAttachment::on(lane, action.resulting_state()),
                        FootAttachment::FREE,
                    ],
                }
            };
            push_fill(
                &mut out,
                pad,
                state.with_foot(foot, new_slots),
                [Some(FootStep::new(StepType::SameArrow, action)), None],
                [Some(lane), None],
            );
        }
    }
    out
}

fn fill_new_arrow(pad: &PadModel, state: &BodyState, foot: Foot, stretch: bool) -> Vec<FillResult> {
    let step = if stretch {
        StepType::NewArrowStretch
    } else {
        StepType::NewArrow
    };
    let holds: Vec<(Lane, AttachState)> = state.holds(foot).collect();
    if holds.len() >= PORTIONS_PER_FOOT {
        return Vec::new();
    }
    let others: Vec<Lane> = state.lanes(foot.other()).collect();
    let mut out = Vec::new();
    for new in pad.lanes() {
        if state.lane_committed(new) {
            continue;
        }
        if let Some(&(held, _)) = holds.first()
            && !pad.bracketable_pair(foot, held, new)
        {
            continue;
        }
        if others.iter().any(|&b| pad.any_crossover(foot, new, b)) {
            continue;
        }
        let paired = others.iter().any(|&b| {
            if stretch {
                pad.natural_stretch(foot, new, b)
            } else {
                pad.natural(foot, new, b)
            }
        });
        if !others.is_empty() && !paired {
            continue;
        }
        for action in FootAction::STEPS {
            let new_slots = match holds.first() {
                Some(&(held, held_state)) => [
                    FootAttachment::on(held, held_state),
                    FootAttachment::on(new, action.resulting_state()),
                ],
                None => [
                    FootAttachment::on(new, action.resulting_state()),
                    FootAttachment::FREE,
                ],
            };
            push_fill(
                &mut out,
                pad,
                state.with_foot(foot, new_slots),
                [Some(FootStep::new(step, action)), None],
                [Some(new), None],
            );
        }
    }
    out
}

fn fill_crossover(
    pad: &PadModel,
    state: &BodyState,
    foot: Foot,
    step: StepType,
    front: bool,
    stretch: bool,
) -> Vec<FillResult> {
    if state.has_holds(foot) {
        return Vec::new();
    }
    let others: Vec<Lane> = state.lanes(foot.other()).collect();
    if others.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::new();
    for new in pad.lanes() {
        if state.lane_committed(new) {
            continue;
        }
        let crossed = others.iter().any(|&b| match (front, stretch) {
            (true, false) => pad.crossover_front(foot, new, b),
            (true, true) => pad.crossover_front_stretch(foot, new, b),
            (false, false) => pad.crossover_behind(foot, new, b),
            (false, true) => pad.crossover_behind_stretch(foot, new, b),
        });
        if !crossed {
            continue;
        }
        for action in FootAction::STEPS {
            push_fill(
                &mut out,
                pad,
                state.with_foot(
                    foot,
                    [
                        FootAttachment::on(new, action.resulting_state()),
                        FootAttachment::FREE,
                    ],
                ),
                [Some(FootStep::new(step, action)), None],
                [Some(new), None],
            );
        }
    }
    out
}

fn fill_invert(
    pad: &PadModel,
    state: &BodyState,
    foot: Foot,
    step: StepType,
    stretch: bool,
) -> Vec<FillResult> {
    if state.has_holds(foot) {
        return Vec::new();
    }
    let others: Vec<Lane> = state.lanes(foot.other()).collect();
    if others.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::new();
    for new in pad.lanes() {
        if state.lane_committed(new) {
            continue;
        }
        let inverted = others.iter().any(|&b| {
            if stretch {
                pad.inverted_stretch(foot, new, b)
            } else {
                pad.inverted(foot, new, b)
            }
        });
        if !inverted {
            continue;
        }
        for action in FootAction::STEPS {
            push_fill(
                &mut out,
                pad,
                state.with_foot(
                    foot,
                    [
                        FootAttachment::on(new, action.resulting_state()),
                        FootAttachment::FREE,
                    ],
                ),
                [Some(FootStep::new(step, action)), None],
                [Some(new), None],
            );
        }
    }
    out
}

fn fill_foot_swap(pad: &PadModel, state: &BodyState, foot: Foot, step: StepType) -> Vec<FillResult> {
    if state.has_holds(Foot::Left) || state.has_holds(Foot::Right) {
        return Vec::new();
    }
    let current: Vec<Lane> = state.lanes(foot).collect();
    let mut out = Vec::new();
    for (target, target_state) in state.arrows(foot.other()) {
        if target_state != AttachState::Resting {
            continue;
        }
        // Classify the swap by the stance it starts from: this foot's
        // current arrow against the arrow being swapped onto.
        let front = current.iter().any(|&c| {
            pad.crossover_front(foot, c, target) || pad.crossover_front_stretch(foot, c, target)
        });
        let behind = current.iter().any(|&c| {
            pad.crossover_behind(foot, c, target) || pad.crossover_behind_stretch(foot, c, target)
        });
        let inverted = current.iter().any(|&c| pad.any_inverted(foot, c, target));
        let matches = match step {
            StepType::FootSwap => !front && !behind && !inverted,
            StepType::FootSwapCrossoverFront => front,
            StepType::FootSwapCrossoverBehind => behind,
            StepType::FootSwapInvertFront | StepType::FootSwapInvertBehind => inverted,
            _ => false,
        };
        if !matches {
            continue;
        }
        for action in FootAction::STEPS {
            // The other foot keeps the arrow, slightly lifted; everything
            // else on both feet lifts off.
            let dest = state
                .with_foot(
                    foot.other(),
                    [
                        FootAttachment::on(target, AttachState::Resting),
                        FootAttachment::FREE,
                    ],
                )
                .with_foot(
                    foot,
                    [
                        FootAttachment::on(target, action.resulting_state()),
                        FootAttachment::FREE,
                    ],
                );
            push_fill(
                &mut out,
                pad,
                dest,
                [Some(FootStep::new(step, action)), None],
                [Some(target), None],
            );
        }
    }
    out
}

/// How one portion of a bracket acquires its arrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PortionKind {
    New,
    Same,
    Swap,
}

fn bracket_parts(step: StepType) -> Option<(PortionKind, PortionKind, bool)> {
    use PortionKind::*;
    Some(match step {
        StepType::BracketHeelNewToeNew => (New, New, false),
        StepType::BracketHeelNewToeSame => (New, Same, false),
        StepType::BracketHeelSameToeNew => (Same, New, false),
        StepType::BracketHeelSameToeSame => (Same, Same, false),
        StepType::BracketHeelSameToeSwap => (Same, Swap, false),
        StepType::BracketHeelNewToeSwap => (New, Swap, false),
        StepType::BracketHeelSwapToeSame => (Swap, Same, false),
        StepType::BracketHeelSwapToeNew => (Swap, New, false),
        StepType::BracketHeelSwapToeSwap => (Swap, Swap, false),
        StepType::BracketStretchHeelNewToeNew => (New, New, true),
        StepType::BracketStretchHeelNewToeSame => (New, Same, true),
        StepType::BracketStretchHeelSameToeNew => (Same, New, true),
        StepType::BracketStretchHeelSameToeSame => (Same, Same, true),
        _ => return None,
    })
}

fn portion_ok(pad: &PadModel, state: &BodyState, foot: Foot, lane: Lane, kind: PortionKind) -> bool {
    let _ = pad;
    match kind {
        PortionKind::New => !state.lane_committed(lane),
        PortionKind::Same => state.attachment_on(foot, lane) == Some(AttachState::Resting),
        PortionKind::Swap => {
            state.attachment_on(foot.other(), lane) == Some(AttachState::Resting)
                && !state.has_holds(foot.other())
                && state.attachment_on(foot, lane).is_none()
        }
    }
}

fn fill_bracket(pad: &PadModel, state: &BodyState, foot: Foot, step: StepType) -> Vec<FillResult> {
    let Some((heel_kind, toe_kind, stretch)) = bracket_parts(step) else {
        return Vec::new();
    };
    let others: Vec<Lane> = state.lanes(foot.other()).collect();
    let mut out = Vec::new();

    // A held bracket releases whole through its Same/Same shape; partial
    // releases are separate single-arrow events.
    if heel_kind == PortionKind::Same && toe_kind == PortionKind::Same {
        let held: Vec<(Lane, AttachState)> = state.holds(foot).collect();
        if held.len() == PORTIONS_PER_FOOT {
            for (heel, toe) in [(held[0].0, held[1].0), (held[1].0, held[0].0)] {
                if pad.bracket_assignment_ok(foot, heel, toe) {
                    let dest = state.with_foot(
                        foot,
                        [
                            FootAttachment::on(heel, AttachState::Resting),
                            FootAttachment::on(toe, AttachState::Resting),
                        ],
                    );
                    push_fill(
                        &mut out,
                        pad,
                        dest,
                        [
                            Some(FootStep::new(step, FootAction::Release)),
                            Some(FootStep::new(step, FootAction::Release)),
                        ],
                        [Some(heel), Some(toe)],
                    );
                }
            }
        }
    }

    if state.has_holds(foot) {
        return out;
    }

    for (heel, toe) in iproduct!(pad.lanes(), pad.lanes()) {
        if heel == toe || !pad.bracket_assignment_ok(foot, heel, toe) {
            continue;
        }
        if !portion_ok(pad, state, foot, heel, heel_kind)
            || !portion_ok(pad, state, foot, toe, toe_kind)
        {
            continue;
        }
        // Both halves must pair with at least one common other-foot
        // arrow.
        let pair_ok = |lane: Lane, b: Lane| {
            if stretch {
                pad.natural_stretch(foot, lane, b)
            } else {
                pad.natural(foot, lane, b)
            }
        };
        if !others.is_empty() && !others.iter().any(|&b| pair_ok(heel, b) && pair_ok(toe, b)) {
            continue;
        }
        let crosses =
            |lane: Lane| others.iter().any(|&b| pad.any_crossover(foot, lane, b));
        if heel_kind == PortionKind::New && crosses(heel) {
            continue;
        }
        if toe_kind == PortionKind::New && crosses(toe) {
            continue;
        }

        let mut swapped = Vec::new();
        if heel_kind == PortionKind::Swap {
            swapped.push(heel);
        }
        if toe_kind == PortionKind::Swap {
            swapped.push(toe);
        }

        for heel_action in FootAction::STEPS {
            for toe_action in FootAction::STEPS {
                let mut dest = *state;
                match swapped[..] {
                    [] => {}
                    [one] => {
                        dest = dest.with_foot(
                            foot.other(),
                            [
                                FootAttachment::on(one, AttachState::Resting),
                                FootAttachment::FREE,
                            ],
                        );
                    }
                    _ => {
                        dest = dest.with_foot(
                            foot.other(),
                            [
                                FootAttachment::on(swapped[0], AttachState::Resting),
                                FootAttachment::on(swapped[1], AttachState::Resting),
                            ],
                        );
                    }
                }
                dest = dest.with_foot(
                    foot,
                    [
                        FootAttachment::on(heel, heel_action.resulting_state()),
                        FootAttachment::on(toe, toe_action.resulting_state()),
                    ],
                );
                push_fill(
                    &mut out,
                    pad,
                    dest,
                    [
                        Some(FootStep::new(step, heel_action)),
                        Some(FootStep::new(step, toe_action)),
                    ],
                    [Some(heel), Some(toe)],
                );
            }
        }
    }
    out
}

fn one_arrow_parts(step: StepType) -> Option<(FootPortion, PortionKind)> {
    Some(match step {
        StepType::BracketOneArrowHeelSame => (FootPortion::Heel, PortionKind::Same),
        StepType::BracketOneArrowHeelNew => (FootPortion::Heel, PortionKind::New),
        StepType::BracketOneArrowHeelSwap => (FootPortion::Heel, PortionKind::Swap),
        StepType::BracketOneArrowToeSame => (FootPortion::Toe, PortionKind::Same),
        StepType::BracketOneArrowToeNew => (FootPortion::Toe, PortionKind::New),
        StepType::BracketOneArrowToeSwap => (FootPortion::Toe, PortionKind::Swap),
        _ => return None,
    })
}

fn fill_one_arrow_bracket(
    pad: &PadModel,
    state: &BodyState,
    foot: Foot,
    step: StepType,
) -> Vec<FillResult> {
    let Some((moving, kind)) = one_arrow_parts(step) else {
        return Vec::new();
    };
    let held: Vec<(Lane, AttachState)> = state.holds(foot).collect();
    let [(anchor, anchor_state)] = held[..] else {
        return Vec::new();
    };
    let others: Vec<Lane> = state.lanes(foot.other()).collect();
    let mut out = Vec::new();
    for lane in pad.lanes() {
        if lane == anchor || !portion_ok(pad, state, foot, lane, kind) {
            continue;
        }
        let assignment_ok = match moving {
            FootPortion::Heel => pad.bracket_assignment_ok(foot, lane, anchor),
            FootPortion::Toe => pad.bracket_assignment_ok(foot, anchor, lane),
        };
        if !assignment_ok {
            continue;
        }
        if kind == PortionKind::New && others.iter().any(|&b| pad.any_crossover(foot, lane, b)) {
            continue;
        }
        if !others.is_empty() && !others.iter().any(|&b| pad.natural(foot, lane, b)) {
            continue;
        }
        for action in FootAction::STEPS {
            let mut dest = *state;
            if kind == PortionKind::Swap {
                dest = dest.with_foot(
                    foot.other(),
                    [
                        FootAttachment::on(lane, AttachState::Resting),
                        FootAttachment::FREE,
                    ],
                );
            }
            dest = dest.with_foot(
                foot,
                [
                    FootAttachment::on(anchor, anchor_state),
                    FootAttachment::on(lane, action.resulting_state()),
                ],
            );
            push_fill(
                &mut out,
                pad,
                dest,
                [Some(FootStep::new(step, action)), None],
                [Some(lane), None],
            );
        }
    }
    out
}
