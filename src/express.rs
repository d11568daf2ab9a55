//! Expression: from source-pad lane events to a pad-agnostic chart.
//!
//! The builder runs a cost-directed frontier search through the source pad's
//! step graph. Events are consumed position by position; within one
//! position, releases are processed before mines, and mines before steps.
//! After the cheapest step chain is extracted, each source mine is
//! re-expressed relative to its neighboring releases and steps (see
//! [`crate::mine`]), leaving nothing in the output that references a source
//! lane.
//!
//! # Bracket parsing policy
//!
//! Three parse modes differ only in their bracket-versus-jump biases:
//! [`ParseMode::Aggressive`], [`ParseMode::Balanced`] and
//! [`ParseMode::NoBrackets`]. The automatic selector forces `NoBrackets`
//! below a difficulty floor, forces `Aggressive` when simultaneous holds
//! exceed what two feet can cover without brackets, and otherwise parses
//! once with `Balanced`, measures brackets per minute, and re-parses when
//! the rate falls outside the configured band.

mod cost;
mod search;

use std::collections::HashSet;

use thiserror::Error;

use crate::cancel::CancelToken;
use crate::chart::{ChartEvent, EventKind, Lane, Position};
use crate::graph::StepGraph;
use crate::graph::moves::{FootAction, MoveLabel};
use crate::graph::state::Foot;
use crate::mine::{self, ScanDirection};
use crate::pad::PadModel;

/// One expressed step: a position and the pad-agnostic move that happens
/// there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepEvent {
    /// Where the move happens.
    pub position: Position,
    /// What the body does.
    pub label: MoveLabel,
}

/// How an expressed mine is anchored to the surrounding steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressedMine {
    /// The mine sits on the lane whose release is the `nth_closest`-most
    /// recent before it.
    AfterArrow {
        /// Distinct release positions stepped over before the match.
        nth_closest: usize,
        /// The foot that performed the matching release.
        foot: Foot,
    },
    /// The mine sits on the lane whose step is the `nth_closest`-nearest
    /// after it.
    BeforeArrow {
        /// Distinct step positions stepped over before the match.
        nth_closest: usize,
        /// The foot that performs the matching step.
        foot: Foot,
    },
    /// No step ever touches the mine's lane.
    NoArrow,
}

/// One expressed mine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MineEvent {
    /// Where the mine sits.
    pub position: Position,
    /// How it is anchored.
    pub mine: ExpressedMine,
}

/// The pad-agnostic intermediate representation of a chart.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExpressedChart {
    /// Step events, position-sorted. The first step is the one that moves
    /// the body out of the starting stance.
    pub steps: Vec<StepEvent>,
    /// Mine events, position-sorted.
    pub mines: Vec<MineEvent>,
}

/// Bracket parsing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Prefer brackets wherever movement favors them.
    Aggressive,
    /// The default bias table.
    Balanced,
    /// Never parse a bracket.
    NoBrackets,
}

/// Configuration of the automatic parse-mode selector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoPolicy {
    /// The chart's difficulty rating, when the driver knows it.
    pub difficulty: Option<u32>,
    /// Below this difficulty, brackets are never parsed.
    pub min_difficulty_for_brackets: u32,
    /// Force aggressive parsing when simultaneous holds cannot be covered
    /// without brackets.
    pub force_aggressive_when_unbracketable: bool,
    /// Below this bracket rate, re-parse with [`ParseMode::NoBrackets`].
    pub low_brackets_per_minute: f64,
    /// Above this bracket rate, re-parse with [`ParseMode::Aggressive`].
    pub high_brackets_per_minute: f64,
    /// Tempo assumed when converting positions to minutes; the boundary
    /// event contract carries no tempo of its own.
    pub assumed_bpm: f64,
}

impl Default for AutoPolicy {
    fn default() -> Self {
        Self {
            difficulty: None,
            min_difficulty_for_brackets: 7,
            force_aggressive_when_unbracketable: true,
            low_brackets_per_minute: 10.0,
            high_brackets_per_minute: 45.0,
            assumed_bpm: 120.0,
        }
    }
}

/// How the parse mode is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PolicySelection {
    /// Always use the given mode.
    Fixed(ParseMode),
    /// Choose per chart (see [`AutoPolicy`]).
    Automatic(AutoPolicy),
}

/// Options for [`express`].
#[derive(Debug, Clone, Default)]
pub struct ExpressOptions {
    /// Parse-mode selection. Defaults to the automatic selector.
    pub policy: PolicySelection,
    /// Cooperative cancellation, consulted between positions.
    pub cancel: Option<CancelToken>,
}

impl Default for PolicySelection {
    fn default() -> Self {
        PolicySelection::Automatic(AutoPolicy::default())
    }
}

/// Why a chart could not be expressed. All variants except `Cancelled` mean
/// the source events are internally inconsistent or unwalkable; the driver
/// skips the chart and continues.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExpressError {
    /// The input events are not position-sorted.
    #[error("chart events are not position-sorted near measure {measure}")]
    Unsorted {
        /// Measure of the offending event.
        measure: u32,
    },
    /// A hold ended on a lane that was not holding.
    #[error("hold end without a matching hold on lane {lane}")]
    MismatchedHoldEnd {
        /// The offending lane.
        lane: Lane,
    },
    /// A step occurred on a lane that is still mid-hold.
    #[error("step on lane {lane} while it is still held")]
    OverlappingStep {
        /// The offending lane.
        lane: Lane,
    },
    /// A hold never ended.
    #[error("hold on lane {lane} never ends")]
    UnterminatedHold {
        /// The offending lane.
        lane: Lane,
    },
    /// An event references a lane the pad does not have.
    #[error("event on lane {lane} of a {num_arrows}-arrow pad")]
    LaneOutOfRange {
        /// The offending lane.
        lane: Lane,
        /// Number of arrows on the source pad.
        num_arrows: usize,
    },
    /// No graph neighbor matches the required state.
    #[error("no pathway through the step graph at measure {measure}")]
    NoPathway {
        /// Measure where the search died out.
        measure: u32,
    },
    /// Cooperative cancellation; not a failure.
    #[error("expression was cancelled")]
    Cancelled,
}

/// The result of expressing a chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressOutput {
    /// The expressed chart.
    pub chart: ExpressedChart,
    /// The parse mode that produced it.
    pub mode: ParseMode,
}

/// Events of one position, split into the processing phases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Batch {
    pub position: Position,
    pub releases: Vec<Lane>,
    pub mines: Vec<Lane>,
    pub steps: Vec<(Lane, FootAction)>,
}

fn batch_events(events: &[ChartEvent]) -> Result<Vec<Batch>, ExpressError> {
    let mut batches: Vec<Batch> = Vec::new();
    let mut holding: HashSet<Lane> = HashSet::new();
    for pair in events.windows(2) {
        if pair[1].position < pair[0].position {
            return Err(ExpressError::Unsorted {
                measure: pair[1].position.measure(),
            });
        }
    }
    for event in events {
        if batches.last().map(|batch| batch.position) != Some(event.position) {
            batches.push(Batch {
                position: event.position,
                releases: Vec::new(),
                mines: Vec::new(),
                steps: Vec::new(),
            });
        }
        let batch = batches.last_mut().expect("just pushed");
        match event.kind {
            EventKind::HoldEnd => {
                if !holding.remove(&event.lane) {
                    return Err(ExpressError::MismatchedHoldEnd { lane: event.lane });
                }
                batch.releases.push(event.lane);
            }
            EventKind::Mine => batch.mines.push(event.lane),
            EventKind::Tap | EventKind::HoldStart | EventKind::RollStart => {
                if holding.contains(&event.lane) {
                    return Err(ExpressError::OverlappingStep { lane: event.lane });
                }
                let action = match event.kind {
                    EventKind::HoldStart => FootAction::Hold,
                    EventKind::RollStart => FootAction::Roll,
                    _ => FootAction::Tap,
                };
                if action != FootAction::Tap {
                    holding.insert(event.lane);
                }
                batch.steps.push((event.lane, action));
            }
        }
    }
    if let Some(&lane) = holding.iter().min() {
        return Err(ExpressError::UnterminatedHold { lane });
    }
    Ok(batches)
}

/// Expresses a source chart into its pad-agnostic form.
///
/// # Errors
///
/// Returns an [`ExpressError`] when the events are inconsistent, the graph
/// has no matching pathway, or the search is cancelled.
pub fn express(
    pad: &PadModel,
    graph: &StepGraph,
    events: &[ChartEvent],
    options: &ExpressOptions,
) -> Result<ExpressOutput, ExpressError> {
    if let Some(event) = events
        .iter()
        .find(|event| usize::from(event.lane) >= pad.num_arrows())
    {
        return Err(ExpressError::LaneOutOfRange {
            lane: event.lane,
            num_arrows: pad.num_arrows(),
        });
    }
    let batches = batch_events(events)?;
    let cancel = options.cancel.as_ref();

    let (path, mode) = match options.policy {
        PolicySelection::Fixed(mode) => (search::run(pad, graph, &batches, mode, cancel)?, mode),
        PolicySelection::Automatic(auto) => {
            if auto
                .difficulty
                .is_some_and(|difficulty| difficulty < auto.min_difficulty_for_brackets)
            {
                let mode = ParseMode::NoBrackets;
                (search::run(pad, graph, &batches, mode, cancel)?, mode)
            } else if auto.force_aggressive_when_unbracketable
                && max_concurrent_holds(&batches) > 2
            {
                let mode = ParseMode::Aggressive;
                (search::run(pad, graph, &batches, mode, cancel)?, mode)
            } else {
                let balanced = search::run(pad, graph, &batches, ParseMode::Balanced, cancel)?;
                match reparse_mode(&auto, &batches, &balanced) {
                    Some(mode) => (search::run(pad, graph, &batches, mode, cancel)?, mode),
                    None => (balanced, ParseMode::Balanced),
                }
            }
        }
    };

    let chain = path
        .iter()
        .map(|step| (step.position, &step.label, &step.lanes));
    let (releases, steps) = mine::releases_and_steps(chain);

    let mut mines = Vec::new();
    for batch in &batches {
        for &lane in &batch.mines {
            let mine = if let Some((nth_closest, foot)) =
                mine::nth_most_recent(ScanDirection::Backward, batch.position, lane, &releases)
            {
                ExpressedMine::AfterArrow { nth_closest, foot }
            } else if let Some((nth_closest, foot)) =
                mine::nth_most_recent(ScanDirection::Forward, batch.position, lane, &steps)
            {
                ExpressedMine::BeforeArrow { nth_closest, foot }
            } else {
                ExpressedMine::NoArrow
            };
            mines.push(MineEvent {
                position: batch.position,
                mine,
            });
        }
    }

    Ok(ExpressOutput {
        chart: ExpressedChart {
            steps: path
                .into_iter()
                .map(|step| StepEvent {
                    position: step.position,
                    label: step.label,
                })
                .collect(),
            mines,
        },
        mode,
    })
}

fn max_concurrent_holds(batches: &[Batch]) -> usize {
    let mut active: HashSet<Lane> = HashSet::new();
    let mut max = 0;
    for batch in batches {
        for lane in &batch.releases {
            active.remove(lane);
        }
        for &(lane, action) in &batch.steps {
            if matches!(action, FootAction::Hold | FootAction::Roll) {
                active.insert(lane);
            }
        }
        max = max.max(active.len());
    }
    max
}

fn reparse_mode(
    auto: &AutoPolicy,
    batches: &[Batch],
    path: &[search::PathStep],
) -> Option<ParseMode> {
    let last = batches.last()?;
    let minutes = last.position.as_beats() / auto.assumed_bpm;
    if minutes <= 0.0 {
        return None;
    }
    let brackets = path
        .iter()
        .filter(|step| {
            step.label
                .entries()
                .any(|(_, _, entry)| entry.step.is_bracket())
        })
        .count();
    let rate = brackets as f64 / minutes;
    if rate < auto.low_brackets_per_minute {
        Some(ParseMode::NoBrackets)
    } else if rate > auto.high_brackets_per_minute {
        Some(ParseMode::Aggressive)
    } else {
        None
    }
}
