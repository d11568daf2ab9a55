//! Body states: which arrows each foot occupies and how.
//!
//! A [`BodyState`] is the full per-foot, per-portion attachment snapshot. It
//! is canonicalized on construction (within one foot, committed arrows are
//! sorted ascending, free slots last) so that equality and hashing are
//! structural.

use crate::chart::Lane;

/// Number of feet.
pub const NUM_FEET: usize = 2;
/// Slots per foot (a foot occupies at most two arrows, heel and toe).
pub const PORTIONS_PER_FOOT: usize = 2;

/// One of the player's feet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Foot {
    /// The left foot.
    Left,
    /// The right foot.
    Right,
}

impl Foot {
    /// Both feet, left first. Enumeration order is load-bearing for
    /// deterministic tie-breaking in the searches.
    pub const ALL: [Foot; NUM_FEET] = [Foot::Left, Foot::Right];

    /// The other foot. `other` is an involution.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Foot::Left => Foot::Right,
            Foot::Right => Foot::Left,
        }
    }

    /// Index into per-foot tables (left is 0, right is 1).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Foot::Left => 0,
            Foot::Right => 1,
        }
    }
}

/// A portion of a foot in a heel/toe bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FootPortion {
    /// The heel, on the deeper (larger Y) arrow of a bracket.
    Heel,
    /// The toe, on the nearer (smaller Y) arrow of a bracket.
    Toe,
}

/// How a foot is attached to an arrow it occupies.
///
/// `Held` and `Rolling` both mean "still committed"; the distinction only
/// survives so that charts round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttachState {
    /// Resting on the arrow after a tap, release or swap.
    Resting,
    /// Pressing a hold.
    Held,
    /// Pressing a roll.
    Rolling,
}

impl AttachState {
    /// Whether the foot is mid-hold (or mid-roll) on the arrow.
    #[must_use]
    pub const fn is_held(self) -> bool {
        matches!(self, AttachState::Held | AttachState::Rolling)
    }
}

/// One slot of a foot: an arrow (or none) and its attachment state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FootAttachment {
    /// The occupied arrow, or `None` for a free slot.
    pub arrow: Option<Lane>,
    /// The attachment state. Meaningless (normalized to `Resting`) when
    /// `arrow` is `None`.
    pub state: AttachState,
}

impl FootAttachment {
    /// A free slot.
    pub const FREE: FootAttachment = FootAttachment {
        arrow: None,
        state: AttachState::Resting,
    };

    /// An occupied slot.
    #[must_use]
    pub const fn on(arrow: Lane, state: AttachState) -> Self {
        Self {
            arrow: Some(arrow),
            state,
        }
    }

    /// The occupied arrow and state, if any.
    #[must_use]
    pub const fn committed(self) -> Option<(Lane, AttachState)> {
        match self.arrow {
            Some(arrow) => Some((arrow, self.state)),
            None => None,
        }
    }
}

/// The full per-foot, per-portion attachment snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyState {
    slots: [[FootAttachment; PORTIONS_PER_FOOT]; NUM_FEET],
}

impl BodyState {
    /// The state with no foot on any arrow: the graph root.
    pub const UNCOMMITTED: BodyState = BodyState {
        slots: [[FootAttachment::FREE; PORTIONS_PER_FOOT]; NUM_FEET],
    };

    /// Builds a canonicalized state from raw slots.
    #[must_use]
    pub fn new(slots: [[FootAttachment; PORTIONS_PER_FOOT]; NUM_FEET]) -> Self {
        let mut state = Self { slots };
        state.canonicalize();
        state
    }

    /// Both feet resting on single arrows.
    #[must_use]
    pub fn resting_on(left: Lane, right: Lane) -> Self {
        Self::new([
            [
                FootAttachment::on(left, AttachState::Resting),
                FootAttachment::FREE,
            ],
            [
                FootAttachment::on(right, AttachState::Resting),
                FootAttachment::FREE,
            ],
        ])
    }

    fn canonicalize(&mut self) {
        for foot in &mut self.slots {
            for slot in foot.iter_mut() {
                if slot.arrow.is_none() {
                    *slot = FootAttachment::FREE;
                }
            }
            // Committed slots first, then ascending by arrow.
            foot.sort_by_key(|slot| match slot.arrow {
                Some(arrow) => (0u8, arrow),
                None => (1, 0),
            });
        }
    }

    /// The two slots of `foot`.
    #[must_use]
    pub const fn foot_slots(&self, foot: Foot) -> [FootAttachment; PORTIONS_PER_FOOT] {
        self.slots[foot.index()]
    }

    /// Replaces `foot`'s slots, re-canonicalizing.
    #[must_use]
    pub fn with_foot(mut self, foot: Foot, slots: [FootAttachment; PORTIONS_PER_FOOT]) -> Self {
        self.slots[foot.index()] = slots;
        self.canonicalize();
        self
    }

    /// The committed arrows of `foot` with their attachment states.
    pub fn arrows(&self, foot: Foot) -> impl Iterator<Item = (Lane, AttachState)> + '_ {
        self.slots[foot.index()]
            .iter()
            .filter_map(|slot| slot.committed())
    }

    /// The committed arrows of `foot` (lanes only).
    pub fn lanes(&self, foot: Foot) -> impl Iterator<Item = Lane> + '_ {
        self.arrows(foot).map(|(lane, _)| lane)
    }

    /// How many arrows `foot` occupies.
    #[must_use]
    pub fn arrow_count(&self, foot: Foot) -> usize {
        self.arrows(foot).count()
    }

    /// The attachment state of `foot` on `lane`, if committed there.
    #[must_use]
    pub fn attachment_on(&self, foot: Foot, lane: Lane) -> Option<AttachState> {
        self.arrows(foot)
            .find(|&(arrow, _)| arrow == lane)
            .map(|(_, state)| state)
    }

    /// Whether either foot occupies `lane`.
    #[must_use]
    pub fn lane_committed(&self, lane: Lane) -> bool {
        Foot::ALL
            .iter()
            .any(|&foot| self.attachment_on(foot, lane).is_some())
    }

    /// The arrows `foot` is mid-hold on.
    pub fn holds(&self, foot: Foot) -> impl Iterator<Item = (Lane, AttachState)> + '_ {
        self.arrows(foot).filter(|&(_, state)| state.is_held())
    }

    /// Whether `foot` is mid-hold on any arrow.
    #[must_use]
    pub fn has_holds(&self, foot: Foot) -> bool {
        self.holds(foot).next().is_some()
    }

    /// All lanes either foot is mid-hold on, with the hold kind.
    pub fn held_lanes(&self) -> impl Iterator<Item = (Lane, AttachState)> + '_ {
        Foot::ALL.into_iter().flat_map(|foot| self.holds(foot))
    }

    /// Whether no foot occupies any arrow.
    #[must_use]
    pub fn is_uncommitted(&self) -> bool {
        *self == Self::UNCOMMITTED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_slot_order() {
        let a = BodyState::new([
            [
                FootAttachment::FREE,
                FootAttachment::on(2, AttachState::Held),
            ],
            [
                FootAttachment::on(3, AttachState::Resting),
                FootAttachment::on(1, AttachState::Resting),
            ],
        ]);
        let b = BodyState::new([
            [
                FootAttachment::on(2, AttachState::Held),
                FootAttachment::FREE,
            ],
            [
                FootAttachment::on(1, AttachState::Resting),
                FootAttachment::on(3, AttachState::Resting),
            ],
        ]);
        assert_eq!(a, b);
        assert_eq!(a.foot_slots(Foot::Right)[0].arrow, Some(1));
    }

    #[test]
    fn attachment_queries() {
        let state = BodyState::resting_on(0, 3);
        assert_eq!(state.attachment_on(Foot::Left, 0), Some(AttachState::Resting));
        assert_eq!(state.attachment_on(Foot::Left, 3), None);
        assert!(state.lane_committed(3));
        assert!(!state.lane_committed(1));
        assert!(!state.has_holds(Foot::Left));
        assert_eq!(state.arrow_count(Foot::Right), 1);
    }

    #[test]
    fn other_foot_is_an_involution() {
        for foot in Foot::ALL {
            assert_eq!(foot.other().other(), foot);
        }
    }
}
