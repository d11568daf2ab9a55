//! The move taxonomy: step types, foot actions and move labels.
//!
//! A [`MoveLabel`] is the pad-agnostic description of one transition in the
//! step graph: per foot, up to two `(StepType, FootAction)` entries. A label
//! with entries on both feet is a jump; a label whose foot carries two
//! entries is a heel/toe bracket on that foot.

use crate::graph::state::{AttachState, Foot, NUM_FEET, PORTIONS_PER_FOOT};

/// The kind of movement a foot performs for one step.
///
/// Bracket types (`BracketHeel*Toe*`, including the stretch variants) act on
/// two arrows; every other type, including the `BracketOneArrow*` family,
/// acts on one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum StepType {
    SameArrow,
    NewArrow,
    CrossoverFront,
    CrossoverBehind,
    InvertFront,
    InvertBehind,
    FootSwap,
    NewArrowStretch,
    CrossoverFrontStretch,
    CrossoverBehindStretch,
    InvertFrontStretch,
    InvertBehindStretch,
    FootSwapCrossoverFront,
    FootSwapCrossoverBehind,
    FootSwapInvertFront,
    FootSwapInvertBehind,
    BracketHeelNewToeNew,
    BracketHeelNewToeSame,
    BracketHeelSameToeNew,
    BracketHeelSameToeSame,
    BracketHeelSameToeSwap,
    BracketHeelNewToeSwap,
    BracketHeelSwapToeSame,
    BracketHeelSwapToeNew,
    BracketHeelSwapToeSwap,
    BracketStretchHeelNewToeNew,
    BracketStretchHeelNewToeSame,
    BracketStretchHeelSameToeNew,
    BracketStretchHeelSameToeSame,
    BracketOneArrowHeelSame,
    BracketOneArrowHeelNew,
    BracketOneArrowHeelSwap,
    BracketOneArrowToeSame,
    BracketOneArrowToeNew,
    BracketOneArrowToeSwap,
}

impl StepType {
    /// Number of step types.
    pub const COUNT: usize = 35;

    /// Every step type, in declaration order.
    pub const ALL: [StepType; StepType::COUNT] = [
        StepType::SameArrow,
        StepType::NewArrow,
        StepType::CrossoverFront,
        StepType::CrossoverBehind,
        StepType::InvertFront,
        StepType::InvertBehind,
        StepType::FootSwap,
        StepType::NewArrowStretch,
        StepType::CrossoverFrontStretch,
        StepType::CrossoverBehindStretch,
        StepType::InvertFrontStretch,
        StepType::InvertBehindStretch,
        StepType::FootSwapCrossoverFront,
        StepType::FootSwapCrossoverBehind,
        StepType::FootSwapInvertFront,
        StepType::FootSwapInvertBehind,
        StepType::BracketHeelNewToeNew,
        StepType::BracketHeelNewToeSame,
        StepType::BracketHeelSameToeNew,
        StepType::BracketHeelSameToeSame,
        StepType::BracketHeelSameToeSwap,
        StepType::BracketHeelNewToeSwap,
        StepType::BracketHeelSwapToeSame,
        StepType::BracketHeelSwapToeNew,
        StepType::BracketHeelSwapToeSwap,
        StepType::BracketStretchHeelNewToeNew,
        StepType::BracketStretchHeelNewToeSame,
        StepType::BracketStretchHeelSameToeNew,
        StepType::BracketStretchHeelSameToeSame,
        StepType::BracketOneArrowHeelSame,
        StepType::BracketOneArrowHeelNew,
        StepType::BracketOneArrowHeelSwap,
        StepType::BracketOneArrowToeSame,
        StepType::BracketOneArrowToeNew,
        StepType::BracketOneArrowToeSwap,
    ];

    /// The single-foot step types that may form half of a jump.
    pub const JUMP_PARTS: [StepType; 6] = [
        StepType::SameArrow,
        StepType::NewArrow,
        StepType::BracketHeelNewToeNew,
        StepType::BracketHeelNewToeSame,
        StepType::BracketHeelSameToeNew,
        StepType::BracketHeelSameToeSame,
    ];

    /// How many arrows this step type acts on (1 or 2).
    #[must_use]
    pub const fn arrow_count(self) -> u8 {
        if self.is_bracket() { 2 } else { 1 }
    }

    /// Whether this is a two-arrow heel/toe bracket.
    #[must_use]
    pub const fn is_bracket(self) -> bool {
        matches!(
            self,
            StepType::BracketHeelNewToeNew
                | StepType::BracketHeelNewToeSame
                | StepType::BracketHeelSameToeNew
                | StepType::BracketHeelSameToeSame
                | StepType::BracketHeelSameToeSwap
                | StepType::BracketHeelNewToeSwap
                | StepType::BracketHeelSwapToeSame
                | StepType::BracketHeelSwapToeNew
                | StepType::BracketHeelSwapToeSwap
                | StepType::BracketStretchHeelNewToeNew
                | StepType::BracketStretchHeelNewToeSame
                | StepType::BracketStretchHeelSameToeNew
                | StepType::BracketStretchHeelSameToeSame
        )
    }

    /// Whether this is a one-arrow step completing a bracket over a held
    /// arrow.
    #[must_use]
    pub const fn is_one_arrow_bracket(self) -> bool {
        matches!(
            self,
            StepType::BracketOneArrowHeelSame
                | StepType::BracketOneArrowHeelNew
                | StepType::BracketOneArrowHeelSwap
                | StepType::BracketOneArrowToeSame
                | StepType::BracketOneArrowToeNew
                | StepType::BracketOneArrowToeSwap
        )
    }

    /// Whether this is a crossover (front or behind, stretch included).
    #[must_use]
    pub const fn is_crossover(self) -> bool {
        matches!(
            self,
            StepType::CrossoverFront
                | StepType::CrossoverBehind
                | StepType::CrossoverFrontStretch
                | StepType::CrossoverBehindStretch
        )
    }

    /// Whether this is an invert (stretch included).
    #[must_use]
    pub const fn is_invert(self) -> bool {
        matches!(
            self,
            StepType::InvertFront
                | StepType::InvertBehind
                | StepType::InvertFrontStretch
                | StepType::InvertBehindStretch
        )
    }

    /// Whether this is a foot swap (crossed and inverted swaps included).
    #[must_use]
    pub const fn is_foot_swap(self) -> bool {
        matches!(
            self,
            StepType::FootSwap
                | StepType::FootSwapCrossoverFront
                | StepType::FootSwapCrossoverBehind
                | StepType::FootSwapInvertFront
                | StepType::FootSwapInvertBehind
        )
    }

    /// The configuration/serialization name of this step type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            StepType::SameArrow => "SameArrow",
            StepType::NewArrow => "NewArrow",
            StepType::CrossoverFront => "CrossoverFront",
            StepType::CrossoverBehind => "CrossoverBehind",
            StepType::InvertFront => "InvertFront",
            StepType::InvertBehind => "InvertBehind",
            StepType::FootSwap => "FootSwap",
            StepType::NewArrowStretch => "NewArrowStretch",
            StepType::CrossoverFrontStretch => "CrossoverFrontStretch",
            StepType::CrossoverBehindStretch => "CrossoverBehindStretch",
            StepType::InvertFrontStretch => "InvertFrontStretch",
            StepType::InvertBehindStretch => "InvertBehindStretch",
            StepType::FootSwapCrossoverFront => "FootSwapCrossoverFront",
            StepType::FootSwapCrossoverBehind => "FootSwapCrossoverBehind",
            StepType::FootSwapInvertFront => "FootSwapInvertFront",
            StepType::FootSwapInvertBehind => "FootSwapInvertBehind",
            StepType::BracketHeelNewToeNew => "BracketHeelNewToeNew",
            StepType::BracketHeelNewToeSame => "BracketHeelNewToeSame",
            StepType::BracketHeelSameToeNew => "BracketHeelSameToeNew",
            StepType::BracketHeelSameToeSame => "BracketHeelSameToeSame",
            StepType::BracketHeelSameToeSwap => "BracketHeelSameToeSwap",
            StepType::BracketHeelNewToeSwap => "BracketHeelNewToeSwap",
            StepType::BracketHeelSwapToeSame => "BracketHeelSwapToeSame",
            StepType::BracketHeelSwapToeNew => "BracketHeelSwapToeNew",
            StepType::BracketHeelSwapToeSwap => "BracketHeelSwapToeSwap",
            StepType::BracketStretchHeelNewToeNew => "BracketStretchHeelNewToeNew",
            StepType::BracketStretchHeelNewToeSame => "BracketStretchHeelNewToeSame",
            StepType::BracketStretchHeelSameToeNew => "BracketStretchHeelSameToeNew",
            StepType::BracketStretchHeelSameToeSame => "BracketStretchHeelSameToeSame",
            StepType::BracketOneArrowHeelSame => "BracketOneArrowHeelSame",
            StepType::BracketOneArrowHeelNew => "BracketOneArrowHeelNew",
            StepType::BracketOneArrowHeelSwap => "BracketOneArrowHeelSwap",
            StepType::BracketOneArrowToeSame => "BracketOneArrowToeSame",
            StepType::BracketOneArrowToeNew => "BracketOneArrowToeNew",
            StepType::BracketOneArrowToeSwap => "BracketOneArrowToeSwap",
        }
    }

    /// Looks a step type up by its configuration name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<StepType> {
        StepType::ALL.into_iter().find(|step| step.name() == name)
    }

    /// A stable small integer for this step type.
    #[must_use]
    pub fn discriminant(self) -> u8 {
        StepType::ALL
            .iter()
            .position(|&step| step == self)
            .unwrap_or(0) as u8
    }

    /// The inverse of [`StepType::discriminant`].
    #[must_use]
    pub fn from_discriminant(value: u8) -> Option<StepType> {
        StepType::ALL.get(usize::from(value)).copied()
    }
}

/// What a foot does to an arrow it steps on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FootAction {
    /// Press and release immediately.
    Tap,
    /// Start a hold.
    Hold,
    /// Start a roll.
    Roll,
    /// End a previously started hold or roll.
    Release,
}

impl FootAction {
    /// Every action, taps first.
    pub const ALL: [FootAction; 4] = [
        FootAction::Tap,
        FootAction::Hold,
        FootAction::Roll,
        FootAction::Release,
    ];

    /// The non-release actions.
    pub const STEPS: [FootAction; 3] = [FootAction::Tap, FootAction::Hold, FootAction::Roll];

    /// Whether this action terminates a hold.
    #[must_use]
    pub const fn is_release(self) -> bool {
        matches!(self, FootAction::Release)
    }

    /// The attachment state the acted arrow is left in.
    #[must_use]
    pub const fn resulting_state(self) -> AttachState {
        match self {
            FootAction::Tap | FootAction::Release => AttachState::Resting,
            FootAction::Hold => AttachState::Held,
            FootAction::Roll => AttachState::Rolling,
        }
    }

    /// A stable small integer for this action.
    #[must_use]
    pub const fn discriminant(self) -> u8 {
        match self {
            FootAction::Tap => 0,
            FootAction::Hold => 1,
            FootAction::Roll => 2,
            FootAction::Release => 3,
        }
    }

    /// The inverse of [`FootAction::discriminant`].
    #[must_use]
    pub const fn from_discriminant(value: u8) -> Option<FootAction> {
        match value {
            0 => Some(FootAction::Tap),
            1 => Some(FootAction::Hold),
            2 => Some(FootAction::Roll),
            3 => Some(FootAction::Release),
            _ => None,
        }
    }
}

/// One entry of a move label: what a foot does with one of its portions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FootStep {
    /// The kind of movement.
    pub step: StepType,
    /// The action performed on the arrow.
    pub action: FootAction,
}

impl FootStep {
    /// Creates an entry.
    #[must_use]
    pub const fn new(step: StepType, action: FootAction) -> Self {
        Self { step, action }
    }
}

/// The label of one step-graph edge: per foot, up to two entries.
///
/// Entry slots align with the acted-arrow slots recorded on the edge; for a
/// bracket, slot 0 is the heel arrow and slot 1 the toe arrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MoveLabel {
    entries: [[Option<FootStep>; PORTIONS_PER_FOOT]; NUM_FEET],
}

impl MoveLabel {
    /// A label in which `foot` performs a single-arrow step.
    #[must_use]
    pub fn single(foot: Foot, step: StepType, action: FootAction) -> Self {
        Self::from_foot(foot, [Some(FootStep::new(step, action)), None])
    }

    /// A label in which `foot` performs a two-arrow bracket; slot 0 is the
    /// heel, slot 1 the toe.
    #[must_use]
    pub fn bracket(foot: Foot, step: StepType, heel: FootAction, toe: FootAction) -> Self {
        Self::from_foot(
            foot,
            [
                Some(FootStep::new(step, heel)),
                Some(FootStep::new(step, toe)),
            ],
        )
    }

    /// A label with entries only on `foot`.
    #[must_use]
    pub fn from_foot(foot: Foot, entries: [Option<FootStep>; PORTIONS_PER_FOOT]) -> Self {
        let mut label = Self {
            entries: [[None; PORTIONS_PER_FOOT]; NUM_FEET],
        };
        label.entries[foot.index()] = entries;
        label
    }

    /// Combines two single-foot labels into a jump.
    ///
    /// # Panics
    ///
    /// Panics if the labels overlap on a foot.
    #[must_use]
    pub fn merged(left: Self, right: Self) -> Self {
        let mut entries = [[None; PORTIONS_PER_FOOT]; NUM_FEET];
        for foot in 0..NUM_FEET {
            entries[foot] = match (
                left.entries[foot][0].is_some(),
                right.entries[foot][0].is_some(),
            ) {
                (false, false) => [None, None],
                (true, false) => left.entries[foot],
                (false, true) => right.entries[foot],
                (true, true) => panic!("merged move labels overlap on a foot"),
            };
        }
        Self { entries }
    }

    /// The entries of `foot`.
    #[must_use]
    pub const fn foot_entries(&self, foot: Foot) -> [Option<FootStep>; PORTIONS_PER_FOOT] {
        self.entries[foot.index()]
    }

    /// The feet with at least one entry.
    pub fn feet(&self) -> impl Iterator<Item = Foot> + '_ {
        Foot::ALL
            .into_iter()
            .filter(|foot| self.entries[foot.index()][0].is_some())
    }

    /// Every `(foot, slot, entry)` triple.
    pub fn entries(&self) -> impl Iterator<Item = (Foot, usize, FootStep)> + '_ {
        Foot::ALL.into_iter().flat_map(move |foot| {
            self.entries[foot.index()]
                .into_iter()
                .enumerate()
                .filter_map(move |(slot, entry)| entry.map(|entry| (foot, slot, entry)))
        })
    }

    /// Whether both feet act (a jump).
    #[must_use]
    pub fn is_jump(&self) -> bool {
        self.feet().count() == NUM_FEET
    }

    /// Whether every entry is a release.
    #[must_use]
    pub fn is_release_only(&self) -> bool {
        let mut any = false;
        for (_, _, entry) in self.entries() {
            if !entry.action.is_release() {
                return false;
            }
            any = true;
        }
        any
    }

    /// Total number of acted arrows.
    #[must_use]
    pub fn total_arrows(&self) -> usize {
        self.entries().count()
    }

    /// A sort key that orders labels deterministically with the left foot's
    /// entries ranked before the right foot's.
    #[must_use]
    pub(crate) fn ordering_key(&self) -> [[(u8, u8, u8); PORTIONS_PER_FOOT]; NUM_FEET] {
        let mut key = [[(1, 0, 0); PORTIONS_PER_FOOT]; NUM_FEET];
        for (foot, slot, entry) in self.entries() {
            key[foot.index()][slot] = (0, entry.step.discriminant(), entry.action.discriminant());
        }
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_type_names_round_trip() {
        for step in StepType::ALL {
            assert_eq!(StepType::from_name(step.name()), Some(step));
            assert_eq!(StepType::from_discriminant(step.discriminant()), Some(step));
        }
        assert_eq!(StepType::from_name("NotAStep"), None);
    }

    #[test]
    fn arrow_counts() {
        assert_eq!(StepType::NewArrow.arrow_count(), 1);
        assert_eq!(StepType::BracketHeelNewToeNew.arrow_count(), 2);
        assert_eq!(StepType::BracketOneArrowToeNew.arrow_count(), 1);
        let brackets = StepType::ALL.iter().filter(|s| s.is_bracket()).count();
        assert_eq!(brackets, 13);
    }

    #[test]
    fn merged_labels_form_jumps() {
        let left = MoveLabel::single(Foot::Left, StepType::NewArrow, FootAction::Tap);
        let right = MoveLabel::single(Foot::Right, StepType::SameArrow, FootAction::Release);
        let jump = MoveLabel::merged(left, right);
        assert!(jump.is_jump());
        assert!(!jump.is_release_only());
        assert_eq!(jump.total_arrows(), 2);
    }

    #[test]
    fn left_foot_orders_before_right() {
        let left = MoveLabel::single(Foot::Left, StepType::NewArrow, FootAction::Tap);
        let right = MoveLabel::single(Foot::Right, StepType::NewArrow, FootAction::Tap);
        assert!(left.ordering_key() < right.ordering_key());
    }
}
