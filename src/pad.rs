//! Static per-pad geometry and pairing tables.
//!
//! A [`PadModel`] describes one pad layout: arrow coordinates, which arrows a
//! single foot can bracket heel/toe, which arrow pairs across the two feet
//! are natural, crossovers, inverts or stretches, and the preferred starting
//! positions. Models are built once — loaded from JSON (see
//! [`crate::config`]) or derived from coordinates (see [`derive`]) — and are
//! read-only afterwards; the step graph and both search engines only ever
//! query them.
//!
//! Table symmetry across feet is not required: lopsided pads are legal. What
//! is required, and validated at construction, is the crossover mirror
//! contract: whenever the left foot on `a` crosses in front of a right-foot
//! arrow `b`, the right foot on `b` crosses behind the left-foot arrow `a`.
//! Consumers rely on this mirror without re-checking it.

pub mod derive;
pub mod schema;

use thiserror::Error;

use crate::chart::Lane;
use crate::graph::state::Foot;

/// An arrow's coordinates on the pad. X grows left-to-right, Y front-to-back
/// (the screen-side panels have the smallest Y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PadPosition {
    /// Left-to-right coordinate.
    pub x: i32,
    /// Front-to-back coordinate.
    pub y: i32,
}

impl PadPosition {
    /// Creates a position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// One boolean row per foot: `rows[0]` answers for the left foot, `rows[1]`
/// for the right. Each row has one entry per arrow on the pad.
pub type FootRows = [Vec<bool>; 2];

/// Per-arrow pairing tables.
///
/// Each table lists, for the owning arrow and a foot, the set of arrows
/// that, when the *other* foot (or the other portion of the same foot, for
/// the bracketable tables) is on that entry, produce the named relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrowData {
    /// The arrow's coordinates.
    pub position: PadPosition,
    /// Arrows this foot's heel can occupy while its toe is on this arrow.
    pub bracketable_other_heel: FootRows,
    /// Arrows this foot's toe can occupy while its heel is on this arrow.
    pub bracketable_other_toe: FootRows,
    /// Other-foot arrows forming a natural pairing.
    pub other_foot_pairings: FootRows,
    /// Other-foot arrows forming a stretch pairing.
    pub other_foot_pairings_stretch: FootRows,
    /// Other-foot arrows this foot crosses in front of.
    pub other_foot_pairings_crossover_front: FootRows,
    /// Stretch variant of the front crossover table.
    pub other_foot_pairings_crossover_front_stretch: FootRows,
    /// Other-foot arrows this foot crosses behind.
    pub other_foot_pairings_crossover_behind: FootRows,
    /// Stretch variant of the behind crossover table.
    pub other_foot_pairings_crossover_behind_stretch: FootRows,
    /// Other-foot arrows forming an inverted pairing.
    pub other_foot_pairings_inverted: FootRows,
    /// Stretch variant of the inverted table.
    pub other_foot_pairings_inverted_stretch: FootRows,
}

impl ArrowData {
    /// An arrow with all-false tables of `num_arrows` entries.
    #[must_use]
    pub fn empty(position: PadPosition, num_arrows: usize) -> Self {
        let rows = || [vec![false; num_arrows], vec![false; num_arrows]];
        Self {
            position,
            bracketable_other_heel: rows(),
            bracketable_other_toe: rows(),
            other_foot_pairings: rows(),
            other_foot_pairings_stretch: rows(),
            other_foot_pairings_crossover_front: rows(),
            other_foot_pairings_crossover_front_stretch: rows(),
            other_foot_pairings_crossover_behind: rows(),
            other_foot_pairings_crossover_behind_stretch: rows(),
            other_foot_pairings_inverted: rows(),
            other_foot_pairings_inverted_stretch: rows(),
        }
    }

    fn tables(&self) -> [&FootRows; 10] {
        [
            &self.bracketable_other_heel,
            &self.bracketable_other_toe,
            &self.other_foot_pairings,
            &self.other_foot_pairings_stretch,
            &self.other_foot_pairings_crossover_front,
            &self.other_foot_pairings_crossover_front_stretch,
            &self.other_foot_pairings_crossover_behind,
            &self.other_foot_pairings_crossover_behind_stretch,
            &self.other_foot_pairings_inverted,
            &self.other_foot_pairings_inverted_stretch,
        ]
    }
}

/// A construction-time defect in a pad model.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PadModelError {
    /// The pad has no arrows.
    #[error("pad has no arrows")]
    Empty,
    /// A pairing table row has the wrong number of entries.
    #[error("arrow {arrow}: pairing table rows must have {expected} entries, found {found}")]
    TableSize {
        /// The arrow owning the malformed table.
        arrow: usize,
        /// Number of arrows on the pad.
        expected: usize,
        /// Entries actually present.
        found: usize,
    },
    /// The crossover tables are missing a mirrored entry.
    #[error(
        "crossover tables are not mirrored: {foot:?} foot on arrow {arrow} crosses \
         {direction} of arrow {other}, but the opposing entry is missing"
    )]
    CrossoverMirror {
        /// The foot of the unmirrored entry.
        foot: Foot,
        /// The arrow the foot stands on.
        arrow: usize,
        /// The other-foot arrow.
        other: usize,
        /// `"front"` or `"behind"`.
        direction: &'static str,
    },
    /// `y_travel_compensation` is outside `[0, 1]`.
    #[error("y travel compensation {0} is outside [0, 1]")]
    Compensation(f64),
    /// No starting-position tiers were given.
    #[error("starting positions are empty")]
    NoStartingPositions,
    /// Tier 0 must contain exactly one pair.
    #[error("starting-position tier 0 must contain exactly one pair, found {0}")]
    TierZero(usize),
    /// A starting-position lane is out of range.
    #[error("starting position references lane {lane} on a {num_arrows}-arrow pad")]
    StartOutOfRange {
        /// The offending lane.
        lane: Lane,
        /// Number of arrows on the pad.
        num_arrows: usize,
    },
}

/// A complete, validated pad layout.
#[derive(Debug, Clone, PartialEq)]
pub struct PadModel {
    arrows: Vec<ArrowData>,
    y_travel_compensation: f64,
    starting_positions: Vec<Vec<(Lane, Lane)>>,
}

impl PadModel {
    /// Builds and validates a model from its parts.
    ///
    /// # Errors
    ///
    /// Returns a [`PadModelError`] when a table row has the wrong size, the
    /// crossover mirror contract is broken, the compensation is out of
    /// range, or the starting positions are malformed.
    pub fn from_parts(
        arrows: Vec<ArrowData>,
        y_travel_compensation: f64,
        starting_positions: Vec<Vec<(Lane, Lane)>>,
    ) -> Result<Self, PadModelError> {
        if arrows.is_empty() {
            return Err(PadModelError::Empty);
        }
        let num_arrows = arrows.len();
        for (index, arrow) in arrows.iter().enumerate() {
            for table in arrow.tables() {
                for row in table {
                    if row.len() != num_arrows {
                        return Err(PadModelError::TableSize {
                            arrow: index,
                            expected: num_arrows,
                            found: row.len(),
                        });
                    }
                }
            }
        }
        if !(0.0..=1.0).contains(&y_travel_compensation) {
            return Err(PadModelError::Compensation(y_travel_compensation));
        }
        if starting_positions.is_empty() {
            return Err(PadModelError::NoStartingPositions);
        }
        if starting_positions[0].len() != 1 {
            return Err(PadModelError::TierZero(starting_positions[0].len()));
        }
        for tier in &starting_positions {
            for &(left, right) in tier {
                for lane in [left, right] {
                    if usize::from(lane) >= num_arrows {
                        return Err(PadModelError::StartOutOfRange { lane, num_arrows });
                    }
                }
            }
        }
        let model = Self {
            arrows,
            y_travel_compensation,
            starting_positions,
        };
        model.check_crossover_mirror()?;
        Ok(model)
    }

    fn check_crossover_mirror(&self) -> Result<(), PadModelError> {
        for foot in Foot::ALL {
            for arrow in 0..self.num_arrows() {
                for other in 0..self.num_arrows() {
                    let a = arrow as Lane;
                    let b = other as Lane;
                    let front = self.crossover_front(foot, a, b) || self.crossover_front_stretch(foot, a, b);
                    let behind_mirror = self.crossover_behind(foot.other(), b, a)
                        || self.crossover_behind_stretch(foot.other(), b, a);
                    if front && !behind_mirror {
                        return Err(PadModelError::CrossoverMirror {
                            foot,
                            arrow,
                            other,
                            direction: "front",
                        });
                    }
                    let behind =
                        self.crossover_behind(foot, a, b) || self.crossover_behind_stretch(foot, a, b);
                    let front_mirror = self.crossover_front(foot.other(), b, a)
                        || self.crossover_front_stretch(foot.other(), b, a);
                    if behind && !front_mirror {
                        return Err(PadModelError::CrossoverMirror {
                            foot,
                            arrow,
                            other,
                            direction: "behind",
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Number of arrows (lanes) on this pad.
    #[must_use]
    pub fn num_arrows(&self) -> usize {
        self.arrows.len()
    }

    /// All lanes of this pad, ascending.
    pub fn lanes(&self) -> impl Iterator<Item = Lane> + Clone + '_ {
        (0..self.num_arrows()).map(|lane| lane as Lane)
    }

    /// The per-arrow data, indexed by lane.
    #[must_use]
    pub fn arrows(&self) -> &[ArrowData] {
        &self.arrows
    }

    /// The coordinates of `lane`.
    #[must_use]
    pub fn position(&self, lane: Lane) -> PadPosition {
        self.arrows[usize::from(lane)].position
    }

    /// The Y-distance scale factor used by the tightening cost, in `[0, 1]`.
    #[must_use]
    pub fn y_travel_compensation(&self) -> f64 {
        self.y_travel_compensation
    }

    /// The starting-position tiers. Tier 0 holds the canonical pair.
    #[must_use]
    pub fn starting_positions(&self) -> &[Vec<(Lane, Lane)>] {
        &self.starting_positions
    }

    /// The canonical starting pair (left lane, right lane).
    #[must_use]
    pub fn canonical_start(&self) -> (Lane, Lane) {
        self.starting_positions[0][0]
    }

    fn row(&self, table: impl Fn(&ArrowData) -> &FootRows, foot: Foot, lane: Lane, other: Lane) -> bool {
        table(&self.arrows[usize::from(lane)])[foot.index()][usize::from(other)]
    }

    /// Whether `foot` on `lane` pairs naturally with the other foot on
    /// `other`.
    #[must_use]
    pub fn natural(&self, foot: Foot, lane: Lane, other: Lane) -> bool {
        self.row(|a| &a.other_foot_pairings, foot, lane, other)
    }

    /// Whether `foot` on `lane` stretch-pairs with the other foot on
    /// `other`.
    #[must_use]
    pub fn natural_stretch(&self, foot: Foot, lane: Lane, other: Lane) -> bool {
        self.row(|a| &a.other_foot_pairings_stretch, foot, lane, other)
    }

    /// Whether `foot` on `lane` crosses in front of the other foot on
    /// `other`.
    #[must_use]
    pub fn crossover_front(&self, foot: Foot, lane: Lane, other: Lane) -> bool {
        self.row(|a| &a.other_foot_pairings_crossover_front, foot, lane, other)
    }

    /// Stretch variant of [`PadModel::crossover_front`].
    #[must_use]
    pub fn crossover_front_stretch(&self, foot: Foot, lane: Lane, other: Lane) -> bool {
        self.row(
            |a| &a.other_foot_pairings_crossover_front_stretch,
            foot,
            lane,
            other,
        )
    }

    /// Whether `foot` on `lane` crosses behind the other foot on `other`.
    #[must_use]
    pub fn crossover_behind(&self, foot: Foot, lane: Lane, other: Lane) -> bool {
        self.row(|a| &a.other_foot_pairings_crossover_behind, foot, lane, other)
    }

    /// Stretch variant of [`PadModel::crossover_behind`].
    #[must_use]
    pub fn crossover_behind_stretch(&self, foot: Foot, lane: Lane, other: Lane) -> bool {
        self.row(
            |a| &a.other_foot_pairings_crossover_behind_stretch,
            foot,
            lane,
            other,
        )
    }

    /// Whether `foot` on `lane` is inverted against the other foot on
    /// `other`.
    #[must_use]
    pub fn inverted(&self, foot: Foot, lane: Lane, other: Lane) -> bool {
        self.row(|a| &a.other_foot_pairings_inverted, foot, lane, other)
    }

    /// Stretch variant of [`PadModel::inverted`].
    #[must_use]
    pub fn inverted_stretch(&self, foot: Foot, lane: Lane, other: Lane) -> bool {
        self.row(|a| &a.other_foot_pairings_inverted_stretch, foot, lane, other)
    }

    /// Whether `foot` on `lane` crosses the other foot on `other` in any
    /// direction, stretch included.
    #[must_use]
    pub fn any_crossover(&self, foot: Foot, lane: Lane, other: Lane) -> bool {
        self.crossover_front(foot, lane, other)
            || self.crossover_front_stretch(foot, lane, other)
            || self.crossover_behind(foot, lane, other)
            || self.crossover_behind_stretch(foot, lane, other)
    }

    /// Whether `foot` on `lane` is inverted against `other`, stretch
    /// included.
    #[must_use]
    pub fn any_inverted(&self, foot: Foot, lane: Lane, other: Lane) -> bool {
        self.inverted(foot, lane, other) || self.inverted_stretch(foot, lane, other)
    }

    /// Whether `foot`'s heel may occupy `heel` while its toe is on `toe`.
    #[must_use]
    pub fn bracketable_heel(&self, foot: Foot, toe: Lane, heel: Lane) -> bool {
        self.row(|a| &a.bracketable_other_heel, foot, toe, heel)
    }

    /// Whether `foot`'s toe may occupy `toe` while its heel is on `heel`.
    #[must_use]
    pub fn bracketable_toe(&self, foot: Foot, heel: Lane, toe: Lane) -> bool {
        self.row(|a| &a.bracketable_other_toe, foot, heel, toe)
    }

    /// Whether the oriented assignment heel-on-`heel` / toe-on-`toe` is a
    /// legal bracket for `foot`.
    #[must_use]
    pub fn bracket_assignment_ok(&self, foot: Foot, heel: Lane, toe: Lane) -> bool {
        self.bracketable_toe(foot, heel, toe) && self.bracketable_heel(foot, toe, heel)
    }

    /// Whether `a` and `b` form a bracketable pair for `foot` in either
    /// orientation.
    #[must_use]
    pub fn bracketable_pair(&self, foot: Foot, a: Lane, b: Lane) -> bool {
        self.bracket_assignment_ok(foot, a, b) || self.bracket_assignment_ok(foot, b, a)
    }

}
