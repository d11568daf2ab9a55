//! Performance: realizing an expressed chart on a target pad.
//!
//! The generator searches the target pad's step graph depth-first, driven by
//! the expressed step sequence. At each step it assembles candidate move
//! labels from the fallback table (cross product over each acting foot's
//! fallback list, tried in fallback order), enumerates the matching graph
//! links in an injected-RNG order, and keeps the cheapest completed path
//! found within the iteration budget. Failure to find any path is the
//! "unperformable" outcome; the caller treats it as a skip.

mod search;

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::cancel::CancelToken;
use crate::chart::{ChartEvent, EventKind, Lane, Position};
use crate::express::{ExpressedChart, ExpressedMine};
use crate::fallback::StepTypeFallbacks;
use crate::graph::moves::{FootAction, MoveLabel};
use crate::graph::state::BodyState;
use crate::graph::{ActedLanes, StepGraph};
use crate::mine::{self, ScanDirection};
use crate::pad::PadModel;
use crate::rng::Rng;

/// One performed step: where the body ended up and the move that got it
/// there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerformedStep {
    /// Where the move happens.
    pub position: Position,
    /// The body state after the move.
    pub state: BodyState,
    /// The move taken.
    pub label: MoveLabel,
    /// The target-pad lanes it acts on.
    pub lanes: ActedLanes,
}

/// One performed mine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerformedMine {
    /// Where the mine sits.
    pub position: Position,
    /// The target-pad lane it was materialized on.
    pub lane: Lane,
}

/// A chart realized on a concrete target pad.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PerformedChart {
    /// The performed steps, position-sorted.
    pub steps: Vec<PerformedStep>,
    /// The performed mines, position-sorted.
    pub mines: Vec<PerformedMine>,
}

impl PerformedChart {
    /// Flattens the chart back into boundary events, sorted by position
    /// with releases first within each position.
    #[must_use]
    pub fn to_events(&self) -> Vec<ChartEvent> {
        let mut events = Vec::new();
        for step in &self.steps {
            for (foot, slot, entry) in step.label.entries() {
                let Some(lane) = step.lanes[foot.index()][slot] else {
                    continue;
                };
                let kind = match entry.action {
                    FootAction::Tap => EventKind::Tap,
                    FootAction::Hold => EventKind::HoldStart,
                    FootAction::Roll => EventKind::RollStart,
                    FootAction::Release => EventKind::HoldEnd,
                };
                events.push(ChartEvent::new(kind, step.position, lane));
            }
        }
        for mine in &self.mines {
            events.push(ChartEvent::new(EventKind::Mine, mine.position, mine.lane));
        }
        events.sort();
        events
    }
}

/// Options for [`perform`].
#[derive(Debug, Clone)]
pub struct PerformOptions {
    /// Candidate-expansion budget across all starting tiers.
    pub iteration_budget: usize,
    /// Cooperative cancellation, consulted periodically inside the search.
    pub cancel: Option<CancelToken>,
}

impl Default for PerformOptions {
    fn default() -> Self {
        Self {
            iteration_budget: 100_000,
            cancel: None,
        }
    }
}

/// Why a chart could not be performed.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PerformError {
    /// No valid target path exists within the iteration budget after
    /// exhausting every starting tier. The caller skips the chart.
    #[error("no performable path on the target pad within the iteration budget")]
    Unreachable,
    /// Cooperative cancellation; not a failure.
    #[error("performance was cancelled")]
    Cancelled,
}

/// A non-fatal defect in the performed chart.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PerformWarning {
    /// A mine could not be materialized on any free lane and was dropped.
    #[error("mine at measure {measure} could not be placed and was dropped")]
    MineDropped {
        /// Measure of the dropped mine.
        measure: u32,
    },
}

/// The result of performing a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformOutput {
    /// The performed chart.
    pub chart: PerformedChart,
    /// Non-fatal defects encountered while materializing it.
    pub warnings: Vec<PerformWarning>,
}

/// Performs an expressed chart on a target pad.
///
/// # Errors
///
/// Returns [`PerformError::Unreachable`] when no starting tier yields a
/// path within budget, or [`PerformError::Cancelled`] on cancellation.
pub fn perform(
    pad: &PadModel,
    graph: &StepGraph,
    fallbacks: &StepTypeFallbacks,
    expressed: &ExpressedChart,
    options: &PerformOptions,
    rng: &mut dyn Rng,
) -> Result<PerformOutput, PerformError> {
    let steps = search::run(pad, graph, fallbacks, &expressed.steps, options, rng)?;

    let chain = steps
        .iter()
        .map(|step| (step.position, &step.label, &step.lanes));
    let (releases, step_marks) = mine::releases_and_steps(chain);

    let mut occupied: HashMap<Position, HashSet<Lane>> = HashMap::new();
    for mark in releases.iter().chain(&step_marks) {
        occupied.entry(mark.position).or_default().insert(mark.lane);
    }
    let ever_stepped: HashSet<Lane> = step_marks
        .iter()
        .chain(&releases)
        .map(|mark| mark.lane)
        .collect();

    let mut mines = Vec::new();
    let mut warnings = Vec::new();
    for mine_event in &expressed.mines {
        let position = mine_event.position;
        let free = |lane: Lane| {
            !occupied
                .get(&position)
                .is_some_and(|lanes| lanes.contains(&lane))
        };
        let placed = match mine_event.mine {
            ExpressedMine::AfterArrow { nth_closest, foot } => mine::find_best_nth(
                ScanDirection::Backward,
                position,
                nth_closest,
                foot,
                &releases,
                free,
            ),
            ExpressedMine::BeforeArrow { nth_closest, foot } => mine::find_best_nth(
                ScanDirection::Forward,
                position,
                nth_closest,
                foot,
                &step_marks,
                free,
            ),
            ExpressedMine::NoArrow => pad
                .lanes()
                .find(|lane| !ever_stepped.contains(lane) && free(*lane)),
        };
        match placed {
            Some(lane) => {
                occupied.entry(position).or_default().insert(lane);
                mines.push(PerformedMine { position, lane });
            }
            None => warnings.push(PerformWarning::MineDropped {
                measure: position.measure(),
            }),
        }
    }

    Ok(PerformOutput {
        chart: PerformedChart { steps, mines },
        warnings,
    })
}
