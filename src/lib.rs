//! Dance-pad chart retargeting.
//!
//! This crate converts a rhythm-game chart authored for one pad layout into
//! an equivalent chart for a different layout while preserving musical
//! intent and ergonomic plausibility. The conversion goes through a
//! pad-independent intermediate representation:
//!
//! 1. A [`pad::PadModel`] describes one layout: arrow coordinates, which
//!    arrows one foot can bracket heel/toe, which two-foot pairings are
//!    natural, crossovers, inverts or stretches, and the preferred starting
//!    positions. Models are loaded from JSON ([`config`]) or derived from
//!    coordinates alone ([`pad::derive`]).
//! 2. A [`graph::StepGraph`] enumerates every reachable body state of a pad
//!    and every labeled move between them ([`graph::moves::MoveLabel`]).
//!    Graphs can be cached on disk in the `.fsg` format ([`graph::persist`]).
//! 3. [`express::express`] searches the source pad's graph for the cheapest
//!    explanation of the source chart's lane events and emits an
//!    [`express::ExpressedChart`]: pad-agnostic move labels plus mines
//!    anchored to their neighboring steps.
//! 4. [`perform::perform`] searches the target pad's graph for lanes
//!    realizing each expressed move, honoring a
//!    [`fallback::StepTypeFallbacks`] table for moves the target pad cannot
//!    express literally, and materializes the mines.
//!
//! # Usage
//!
//! ```
//! use restep::prelude::*;
//!
//! // Derive a 4-panel and a 5-panel pump layout from coordinates alone.
//! let thresholds = DeriveThresholds::default();
//! let single = PadModel::derive(&layouts::DANCE_SINGLE, 0.5, &thresholds).unwrap();
//! let pump = PadModel::derive(&layouts::PUMP_SINGLE, 0.5, &thresholds).unwrap();
//! let single_graph = StepGraph::build(&single);
//! let pump_graph = StepGraph::build(&pump);
//!
//! // A one-tap chart on the left arrow of the 4-panel pad.
//! let events = vec![ChartEvent::new(EventKind::Tap, Position::at_measure(0), 0)];
//!
//! let output = retarget(
//!     &single,
//!     &single_graph,
//!     &pump,
//!     &pump_graph,
//!     &StepTypeFallbacks::default_table(),
//!     &events,
//!     &ExpressOptions::default(),
//!     &PerformOptions::default(),
//!     &mut RngMock([1]),
//! )
//! .unwrap();
//! assert_eq!(output.events.len(), 1);
//! assert_eq!(output.events[0].kind, EventKind::Tap);
//! ```
//!
//! # Concurrency
//!
//! Everything built here is immutable after construction: pads, graphs and
//! fallback tables are shared by reference across threads, and independent
//! charts can be expressed and performed in parallel. Each search owns its
//! private arena and its injected [`rng::Rng`]; nothing in the crate touches
//! a process-global generator or logger. Engines report per-chart problems
//! as values ([`express::ExpressError`], [`perform::PerformError`],
//! [`perform::PerformWarning`]) and never abort the process.

#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod cancel;
pub mod chart;
pub mod config;
pub mod cursor;
pub mod diagnostics;
pub mod express;
pub mod fallback;
pub mod graph;
pub mod mine;
pub mod pad;
pub mod perform;
pub mod rng;

use thiserror::Error;

use crate::chart::ChartEvent;
use crate::express::{ExpressError, ExpressOptions, ParseMode, express};
use crate::fallback::StepTypeFallbacks;
use crate::graph::StepGraph;
use crate::pad::PadModel;
use crate::perform::{PerformError, PerformOptions, PerformWarning, perform};
use crate::rng::Rng;

/// Common re-exports.
pub mod prelude {
    pub use crate::cancel::CancelToken;
    pub use crate::chart::{ChartEvent, EventKind, Lane, Position};
    pub use crate::config::{ConfigError, parse_fallbacks, parse_pad_model};
    pub use crate::express::{
        ExpressError, ExpressOptions, ExpressOutput, ExpressedChart, ExpressedMine, MineEvent,
        ParseMode, PolicySelection, StepEvent, express,
    };
    pub use crate::fallback::StepTypeFallbacks;
    pub use crate::graph::moves::{FootAction, FootStep, MoveLabel, StepType};
    pub use crate::graph::state::{AttachState, BodyState, Foot, FootPortion};
    pub use crate::graph::{NodeId, StepGraph};
    pub use crate::pad::derive::{DeriveThresholds, layouts};
    pub use crate::pad::{PadModel, PadPosition};
    pub use crate::perform::{
        PerformError, PerformOptions, PerformOutput, PerformWarning, PerformedChart, perform,
    };
    pub use crate::rng::{Rng, RngMock};
    pub use crate::{RetargetError, RetargetOutput, retarget};
}

/// Why a retarget run failed.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RetargetError {
    /// The source chart could not be expressed.
    #[error(transparent)]
    Express(#[from] ExpressError),
    /// The expressed chart could not be performed on the target pad.
    #[error(transparent)]
    Perform(#[from] PerformError),
}

/// The result of a one-step retarget.
#[derive(Debug, Clone, PartialEq)]
pub struct RetargetOutput {
    /// The transformed chart's boundary events, position-sorted.
    pub events: Vec<ChartEvent>,
    /// The parse mode expression settled on.
    pub mode: ParseMode,
    /// Non-fatal defects from performance (e.g. dropped mines).
    pub warnings: Vec<PerformWarning>,
}

/// Expresses `events` against the source pad and performs them on the
/// target pad in one step.
///
/// # Errors
///
/// Returns a [`RetargetError`] when expression or performance fails;
/// cancellation surfaces as the respective engine's `Cancelled` variant.
#[allow(clippy::too_many_arguments)]
pub fn retarget(
    source_pad: &PadModel,
    source_graph: &StepGraph,
    target_pad: &PadModel,
    target_graph: &StepGraph,
    fallbacks: &StepTypeFallbacks,
    events: &[ChartEvent],
    express_options: &ExpressOptions,
    perform_options: &PerformOptions,
    rng: &mut dyn Rng,
) -> Result<RetargetOutput, RetargetError> {
    let expressed = express(source_pad, source_graph, events, express_options)?;
    let performed = perform(
        target_pad,
        target_graph,
        fallbacks,
        &expressed.chart,
        perform_options,
        rng,
    )?;
    Ok(RetargetOutput {
        events: performed.chart.to_events(),
        mode: expressed.mode,
        warnings: performed.warnings,
    })
}

