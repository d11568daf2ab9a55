//! The expression cost model.
//!
//! Costs are integers; lower is better. The magnitudes are inherited from
//! the tuning of the original generator and the relative orderings between
//! rows are load-bearing: retune magnitudes only while preserving them.
//! Quads and triples stay at 0 until a tuned cost exists.

use crate::chart::{Lane, Position};
use crate::express::ParseMode;
use crate::graph::moves::{FootStep, MoveLabel, StepType};
use crate::graph::state::{AttachState, BodyState, Foot};
use crate::graph::ActedLanes;
use crate::pad::PadModel;

const COST_DOUBLE_STEP_HINTED: u64 = 50;
const COST_DOUBLE_STEP: u64 = 100;
const COST_BRACKET_INTO_HOLD: u64 = 7;
const COST_CROSSOVER_OTHER_HOLDING: u64 = 5;
const COST_CROSSOVER: u64 = 25;
const COST_CROSSOVER_DOUBLE_HINTED: u64 = 100;
const COST_CROSSOVER_DOUBLE: u64 = 200;
const COST_INVERT_EXTRA: u64 = 10;
const COST_SWAP_HINTED: u64 = 15;
const COST_SWAP_REPEAT: u64 = 20;
const COST_SWAP: u64 = 30;
const COST_SWAP_DOUBLE: u64 = 100;
const COST_JUMP_SHOULD_BRACKET: u64 = 10;
const COST_BRACKET_SHOULD_JUMP: u64 = 10;
const COST_BRACKET_SHOULD_JUMP_DOUBLE: u64 = 100;
const COST_NO_BRACKETS: u64 = 10_000;

/// Alternation state threaded through the search.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct StepContext {
    pub last_foot: Option<Foot>,
    pub last_was_swap: bool,
    pub last_was_jump: bool,
}

impl StepContext {
    /// The context after taking `label`. Releases leave it untouched.
    pub(crate) fn after(self, label: &MoveLabel) -> Self {
        let mut stepping = label
            .feet()
            .filter(|&foot| has_step_entry(label, foot));
        let Some(first) = stepping.next() else {
            return self;
        };
        if stepping.next().is_some() {
            return Self {
                last_foot: None,
                last_was_swap: false,
                last_was_jump: true,
            };
        }
        let swap = label
            .foot_entries(first)
            .iter()
            .flatten()
            .any(|entry| entry.step.is_foot_swap());
        Self {
            last_foot: Some(first),
            last_was_swap: swap,
            last_was_jump: false,
        }
    }
}

/// Mine-hint lookups: the last mine on a lane, later than the lane's last
/// release, biases which foot should have performed an ambiguous step.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MineHints<'a> {
    pub last_mine: &'a [Option<Position>],
    pub last_release: &'a [Option<Position>],
}

impl MineHints<'_> {
    fn hinted(&self, lane: Lane) -> bool {
        match (
            self.last_mine[usize::from(lane)],
            self.last_release[usize::from(lane)],
        ) {
            (Some(mine), Some(release)) => mine >= release,
            (Some(_), None) => true,
            _ => false,
        }
    }
}

fn has_step_entry(label: &MoveLabel, foot: Foot) -> bool {
    label
        .foot_entries(foot)
        .iter()
        .flatten()
        .any(|entry| !entry.action.is_release())
}

fn first_step_entry(label: &MoveLabel, foot: Foot) -> Option<FootStep> {
    label
        .foot_entries(foot)
        .into_iter()
        .flatten()
        .find(|entry| !entry.action.is_release())
}

/// The cost of taking `label` out of `src`, given the alternation context
/// and the current mine hints.
pub(crate) fn step_cost(
    pad: &PadModel,
    mode: ParseMode,
    src: &BodyState,
    label: &MoveLabel,
    lanes: &ActedLanes,
    ctx: &StepContext,
    hints: &MineHints<'_>,
) -> u64 {
    if label.is_release_only() {
        return 0;
    }
    let stepping: Vec<Foot> = Foot::ALL
        .into_iter()
        .filter(|&foot| has_step_entry(label, foot))
        .collect();
    match stepping[..] {
        [foot] => single_foot_cost(pad, mode, src, label, lanes, ctx, hints, foot),
        _ => jump_cost(pad, mode, src, label, lanes),
    }
}

fn single_foot_cost(
    pad: &PadModel,
    mode: ParseMode,
    src: &BodyState,
    label: &MoveLabel,
    lanes: &ActedLanes,
    ctx: &StepContext,
    hints: &MineHints<'_>,
    foot: Foot,
) -> u64 {
    let entry = first_step_entry(label, foot).expect("stepping foot has a step entry");
    let step = entry.step;
    let other = foot.other();
    let other_arrows: Vec<(Lane, AttachState)> = src.arrows(other).collect();
    let other_any_holding = other_arrows.iter().any(|&(_, state)| state.is_held());
    let other_all_holding =
        !other_arrows.is_empty() && other_arrows.iter().all(|&(_, state)| state.is_held());
    let double_step = ctx.last_foot == Some(foot) && !ctx.last_was_jump;
    let hinted = other_arrows.iter().any(|&(lane, _)| hints.hinted(lane));

    if step == StepType::SameArrow {
        return 0;
    }
    if step.is_bracket() {
        return single_bracket_cost(pad, mode, src, lanes, foot, double_step);
    }
    if step.is_one_arrow_bracket() {
        return COST_BRACKET_INTO_HOLD;
    }
    if step.is_crossover() || step.is_invert() {
        let extra = if step.is_invert() { COST_INVERT_EXTRA } else { 0 };
        if other_any_holding {
            return COST_CROSSOVER_OTHER_HOLDING + extra;
        }
        if double_step {
            return if hinted {
                COST_CROSSOVER_DOUBLE_HINTED
            } else {
                COST_CROSSOVER_DOUBLE
            } + extra;
        }
        return COST_CROSSOVER + extra;
    }
    if step.is_foot_swap() {
        let target = lanes[foot.index()][0];
        let swap_hinted = target.is_some_and(|lane| hints.hinted(lane));
        if double_step && !swap_hinted {
            return COST_SWAP_DOUBLE;
        }
        if swap_hinted {
            return COST_SWAP_HINTED;
        }
        if ctx.last_was_swap {
            return COST_SWAP_REPEAT;
        }
        return COST_SWAP;
    }
    // NewArrow and its stretch variant.
    if other_all_holding {
        return 0;
    }
    if src.has_holds(foot) {
        // Second half of a bracket-into-hold.
        return COST_BRACKET_INTO_HOLD;
    }
    if !double_step {
        return 0;
    }
    if hinted {
        COST_DOUBLE_STEP_HINTED
    } else {
        COST_DOUBLE_STEP
    }
}

fn single_bracket_cost(
    pad: &PadModel,
    mode: ParseMode,
    src: &BodyState,
    lanes: &ActedLanes,
    foot: Foot,
    double_step: bool,
) -> u64 {
    if mode == ParseMode::NoBrackets {
        return COST_NO_BRACKETS;
    }
    if mode == ParseMode::Aggressive {
        return 0;
    }
    let [Some(heel), Some(toe)] = lanes[foot.index()] else {
        return 0;
    };
    let bracket_move = foot_travel(pad, src, foot, midpoint(pad, heel, toe));
    let jump_move = best_split_travel(pad, src, foot, heel, toe);
    if jump_move <= bracket_move {
        if double_step {
            COST_BRACKET_SHOULD_JUMP_DOUBLE
        } else {
            COST_BRACKET_SHOULD_JUMP
        }
    } else {
        0
    }
}

fn jump_cost(
    pad: &PadModel,
    mode: ParseMode,
    src: &BodyState,
    label: &MoveLabel,
    lanes: &ActedLanes,
) -> u64 {
    let mut stepped: Vec<(Foot, Lane)> = Vec::new();
    for (foot, slot, entry) in label.entries() {
        if !entry.action.is_release()
            && let Some(lane) = lanes[foot.index()][slot]
        {
            stepped.push((foot, lane));
        }
    }
    // Triples and quads carry no meaningful choice.
    if stepped.len() != 2 || mode == ParseMode::NoBrackets {
        return 0;
    }
    let [(foot_a, lane_a), (_, lane_b)] = stepped[..] else {
        return 0;
    };
    let jump_move = foot_travel(pad, src, foot_a, position_of(pad, lane_a))
        + foot_travel(pad, src, foot_a.other(), position_of(pad, lane_b));
    let bracket_move = Foot::ALL
        .into_iter()
        .filter(|&foot| pad.bracketable_pair(foot, lane_a, lane_b))
        .map(|foot| foot_travel(pad, src, foot, midpoint(pad, lane_a, lane_b)))
        .fold(f64::INFINITY, f64::min);
    let should_bracket = if mode == ParseMode::Aggressive {
        bracket_move <= jump_move
    } else {
        bracket_move < jump_move
    };
    if should_bracket {
        COST_JUMP_SHOULD_BRACKET
    } else {
        0
    }
}

fn position_of(pad: &PadModel, lane: Lane) -> (f64, f64) {
    let position = pad.position(lane);
    (f64::from(position.x), f64::from(position.y))
}

fn midpoint(pad: &PadModel, a: Lane, b: Lane) -> (f64, f64) {
    let (ax, ay) = position_of(pad, a);
    let (bx, by) = position_of(pad, b);
    ((ax + bx) / 2.0, (ay + by) / 2.0)
}

/// Manhattan travel from a foot's current placement to a target point.
/// Uncommitted feet travel for free.
fn foot_travel(pad: &PadModel, src: &BodyState, foot: Foot, target: (f64, f64)) -> f64 {
    let mut count = 0usize;
    let (mut x, mut y) = (0.0, 0.0);
    for (lane, _) in src.arrows(foot) {
        let (lx, ly) = position_of(pad, lane);
        x += lx;
        y += ly;
        count += 1;
    }
    if count == 0 {
        return 0.0;
    }
    let x = x / count as f64;
    let y = y / count as f64;
    (target.0 - x).abs() + (target.1 - y).abs()
}
