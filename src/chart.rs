//! Chart-boundary definitions shared with the chart-format collaborator.
//!
//! The core consumes and produces a flat, position-sorted sequence of
//! [`ChartEvent`]s. Anything below this boundary (simfile syntax, encodings,
//! on-disk layout) belongs to the format collaborator, not to this crate.
//!
//! A [`Position`] is a rational musical position: a measure index plus a
//! fraction of that measure. It is carried opaquely through expression and
//! performance; the engines only ever compare positions.

use num::integer::gcd;

/// A lane (arrow/panel) index within one pad layout.
///
/// The index is the position of the arrow in the pad's `ArrowData` array and
/// is shared with the external chart format.
pub type Lane = u8;

/// A rational musical position: measure plus an in-measure fraction.
///
/// The fraction is kept normalized (reduced, `numerator < denominator`) so
/// that equality is structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    measure: u32,
    numerator: u32,
    denominator: u32,
}

impl Position {
    /// Creates a new position. A `numerator` of at least `denominator` is
    /// carried over into the measure.
    ///
    /// # Panics
    ///
    /// Panics if `denominator` is 0.
    #[must_use]
    pub fn new(measure: u32, numerator: u32, denominator: u32) -> Self {
        assert!(0 < denominator);
        let measure = measure + numerator / denominator;
        let numerator = numerator % denominator;
        let common = gcd(numerator, denominator).max(1);
        Self {
            measure,
            numerator: numerator / common,
            denominator: denominator / common,
        }
    }

    /// The position at the start of `measure`.
    #[must_use]
    pub const fn at_measure(measure: u32) -> Self {
        Self {
            measure,
            numerator: 0,
            denominator: 1,
        }
    }

    /// The measure this position lies in.
    #[must_use]
    pub const fn measure(self) -> u32 {
        self.measure
    }

    /// The in-measure offset numerator.
    #[must_use]
    pub const fn numerator(self) -> u32 {
        self.numerator
    }

    /// The in-measure offset denominator.
    #[must_use]
    pub const fn denominator(self) -> u32 {
        self.denominator
    }

    /// This position in beats, assuming four beats per measure.
    ///
    /// Only the automatic bracket-policy selector uses this; the search
    /// engines never convert positions to a scalar.
    #[must_use]
    pub fn as_beats(self) -> f64 {
        f64::from(self.measure) * 4.0 + f64::from(self.numerator) / f64::from(self.denominator) * 4.0
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        let self_in_measure = u64::from(self.numerator) * u64::from(other.denominator);
        let other_in_measure = u64::from(other.numerator) * u64::from(self.denominator);
        self.measure
            .cmp(&other.measure)
            .then(self_in_measure.cmp(&other_in_measure))
    }
}

/// What happens on a lane at one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    /// The end of a previously started hold or roll. Sorted first within a
    /// position: a release clears the foot before anything else happens
    /// there.
    HoldEnd,
    /// A hazard; the player must not be touching the lane.
    Mine,
    /// A plain step.
    Tap,
    /// The start of a hold.
    HoldStart,
    /// The start of a roll.
    RollStart,
}

/// One chart event at the system boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChartEvent {
    /// What kind of event this is.
    pub kind: EventKind,
    /// Where in the chart it happens.
    pub position: Position,
    /// Which lane it happens on.
    pub lane: Lane,
}

impl ChartEvent {
    /// Creates an event.
    #[must_use]
    pub const fn new(kind: EventKind, position: Position, lane: Lane) -> Self {
        Self {
            kind,
            position,
            lane,
        }
    }
}

impl PartialOrd for ChartEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ChartEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.position
            .cmp(&other.position)
            .then(self.kind.cmp(&other.kind))
            .then(self.lane.cmp(&other.lane))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_normalizes() {
        assert_eq!(Position::new(1, 2, 4), Position::new(1, 1, 2));
        assert_eq!(Position::new(0, 4, 4), Position::at_measure(1));
        assert_eq!(Position::new(0, 6, 4), Position::new(1, 1, 2));
    }

    #[test]
    fn position_orders_across_denominators() {
        assert!(Position::new(0, 1, 3) < Position::new(0, 1, 2));
        assert!(Position::new(0, 2, 3) > Position::new(0, 1, 2));
        assert!(Position::at_measure(2) > Position::new(1, 7, 8));
    }

    #[test]
    fn releases_sort_before_mines_before_steps() {
        let at = Position::at_measure(0);
        let mut events = vec![
            ChartEvent::new(EventKind::Tap, at, 0),
            ChartEvent::new(EventKind::Mine, at, 1),
            ChartEvent::new(EventKind::HoldEnd, at, 2),
        ];
        events.sort();
        assert_eq!(
            events.iter().map(|e| e.kind).collect::<Vec<_>>(),
            vec![EventKind::HoldEnd, EventKind::Mine, EventKind::Tap]
        );
    }
}
