//! Mine association, shared by expression and performance.
//!
//! A mine is expressed relative to its neighboring arrows: the lane's most
//! recent release before the mine (`AfterArrow`), or its next step after the
//! mine (`BeforeArrow`), counted in distinct positions. Performance runs the
//! same walk in reverse to materialize the mine on a concrete lane of the
//! target pad.
//!
//! Both scans include the mine's own position: releases at a shared position
//! are processed before the mine, steps after it.

use crate::chart::{Lane, Position};
use crate::cursor::SliceCursor;
use crate::graph::ActedLanes;
use crate::graph::moves::MoveLabel;
use crate::graph::state::Foot;

/// One release or step performed by a foot on a lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FootedMark {
    /// Where it happened.
    pub position: Position,
    /// The foot that performed it.
    pub foot: Foot,
    /// The lane it happened on.
    pub lane: Lane,
}

/// Which way a mine-association walk moves through the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDirection {
    /// Toward earlier positions (release association).
    Backward,
    /// Toward later positions (step association).
    Forward,
}

/// Splits a chain of performed moves into position-ordered release and step
/// marks. The chain excludes the root node; each element carries the move
/// that reached it and the lanes it acted on.
pub fn releases_and_steps<'a>(
    chain: impl Iterator<Item = (Position, &'a MoveLabel, &'a ActedLanes)>,
) -> (Vec<FootedMark>, Vec<FootedMark>) {
    let mut releases = Vec::new();
    let mut steps = Vec::new();
    for (position, label, lanes) in chain {
        for (foot, slot, entry) in label.entries() {
            let Some(lane) = lanes[foot.index()][slot] else {
                continue;
            };
            let mark = FootedMark {
                position,
                foot,
                lane,
            };
            if entry.action.is_release() {
                releases.push(mark);
            } else {
                steps.push(mark);
            }
        }
    }
    (releases, steps)
}

fn start_cursor<'a>(
    direction: ScanDirection,
    from: Position,
    marks: &'a [FootedMark],
) -> SliceCursor<'a, FootedMark> {
    match direction {
        ScanDirection::Backward => {
            let end = marks.partition_point(|mark| mark.position <= from);
            match end.checked_sub(1) {
                Some(index) => SliceCursor::at(marks, index),
                None => {
                    let mut cursor = SliceCursor::at(marks, 0);
                    cursor.invalidate();
                    cursor
                }
            }
        }
        ScanDirection::Forward => {
            let start = marks.partition_point(|mark| mark.position < from);
            SliceCursor::at(marks, start)
        }
    }
}

/// Walks `marks` from `from` in `direction`, counting distinct positions,
/// until a mark on `lane` is found. Returns how many positions were stepped
/// over (0 for the nearest) and the foot that performed the found mark.
#[must_use]
pub fn nth_most_recent(
    direction: ScanDirection,
    from: Position,
    lane: Lane,
    marks: &[FootedMark],
) -> Option<(usize, Foot)> {
    let mut cursor = start_cursor(direction, from, marks);
    let mut group = cursor.peek()?.position;
    let mut n = 0;
    while let Some(mark) = cursor.peek() {
        if mark.position != group {
            n += 1;
            group = mark.position;
        }
        if mark.lane == lane {
            return Some((n, mark.foot));
        }
        match direction {
            ScanDirection::Backward => cursor.retreat(),
            ScanDirection::Forward => cursor.advance(),
        };
    }
    None
}

/// Finds a lane whose mark sits `desired_n` distinct positions away from
/// `from` in `direction`, preferring marks by `preferred_foot`, skipping
/// lanes `lane_ok` rejects, and falling back to incrementally larger
/// distances. Returns `None` when every group is exhausted.
#[must_use]
pub fn find_best_nth(
    direction: ScanDirection,
    from: Position,
    desired_n: usize,
    preferred_foot: Foot,
    marks: &[FootedMark],
    mut lane_ok: impl FnMut(Lane) -> bool,
) -> Option<Lane> {
    let mut groups: Vec<Vec<FootedMark>> = Vec::new();
    let mut cursor = start_cursor(direction, from, marks);
    let mut group_position = cursor.peek()?.position;
    let mut group = Vec::new();
    while let Some(&mark) = cursor.peek() {
        if mark.position != group_position {
            groups.push(std::mem::take(&mut group));
            group_position = mark.position;
        }
        group.push(mark);
        match direction {
            ScanDirection::Backward => cursor.retreat(),
            ScanDirection::Forward => cursor.advance(),
        };
    }
    groups.push(group);

    for group in groups.iter().skip(desired_n) {
        if let Some(mark) = group
            .iter()
            .find(|mark| mark.foot == preferred_foot && lane_ok(mark.lane))
        {
            return Some(mark.lane);
        }
        if let Some(mark) = group.iter().find(|mark| lane_ok(mark.lane)) {
            return Some(mark.lane);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mark(measure: u32, foot: Foot, lane: Lane) -> FootedMark {
        FootedMark {
            position: Position::at_measure(measure),
            foot,
            lane,
        }
    }

    #[test]
    fn backward_scan_counts_distinct_positions() {
        let marks = vec![
            mark(0, Foot::Left, 0),
            mark(1, Foot::Right, 3),
            mark(1, Foot::Left, 1),
            mark(2, Foot::Right, 2),
        ];
        // From measure 3 looking back for lane 0: groups are {2}, {1}, {0}.
        assert_eq!(
            nth_most_recent(ScanDirection::Backward, Position::at_measure(3), 0, &marks),
            Some((2, Foot::Left))
        );
        // Lane 3 shares measure 1 with lane 1: same group, N = 1.
        assert_eq!(
            nth_most_recent(ScanDirection::Backward, Position::at_measure(3), 3, &marks),
            Some((1, Foot::Right))
        );
        assert_eq!(
            nth_most_recent(ScanDirection::Backward, Position::at_measure(3), 7, &marks),
            None
        );
    }

    #[test]
    fn scans_include_the_starting_position() {
        let marks = vec![mark(2, Foot::Right, 1)];
        assert_eq!(
            nth_most_recent(ScanDirection::Backward, Position::at_measure(2), 1, &marks),
            Some((0, Foot::Right))
        );
        assert_eq!(
            nth_most_recent(ScanDirection::Forward, Position::at_measure(2), 1, &marks),
            Some((0, Foot::Right))
        );
    }

    #[test]
    fn best_nth_prefers_the_requested_foot_then_falls_back() {
        let marks = vec![
            mark(1, Foot::Left, 0),
            mark(1, Foot::Right, 3),
            mark(2, Foot::Left, 1),
        ];
        // Nearest group to measure 3 going backward is {lane 1}; N=1 is the
        // measure-1 group with both feet.
        assert_eq!(
            find_best_nth(
                ScanDirection::Backward,
                Position::at_measure(3),
                1,
                Foot::Right,
                &marks,
                |_| true,
            ),
            Some(3)
        );
        // With lane 3 occupied, the same walk falls back to the left mark.
        assert_eq!(
            find_best_nth(
                ScanDirection::Backward,
                Position::at_measure(3),
                1,
                Foot::Right,
                &marks,
                |lane| lane != 3,
            ),
            Some(0)
        );
        // A too-large N finds nothing.
        assert_eq!(
            find_best_nth(
                ScanDirection::Backward,
                Position::at_measure(3),
                5,
                Foot::Right,
                &marks,
                |_| true,
            ),
            None
        );
    }
}
