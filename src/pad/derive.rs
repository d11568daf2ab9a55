//! Derivation of pad pairing tables from arrow coordinates.
//!
//! Given only the arrow positions and a handful of distance thresholds, this
//! module derives every pairing table of a [`PadModel`] plus its
//! starting-position tiers. The bundled layouts are reproduced exactly by
//! this derivation; hand-authored JSON models only need to exist for pads
//! whose ergonomics deviate from the distance rules.

use crate::chart::Lane;
use crate::graph::state::Foot;
use crate::pad::{ArrowData, PadModel, PadModelError, PadPosition};

/// Distance thresholds used by the derivation. All distances are absolute
/// integer coordinate differences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeriveThresholds {
    /// Widest X span of a natural pairing before it becomes a stretch.
    pub max_x_before_stretch: i32,
    /// Deepest Y span of a natural pairing before it becomes a stretch.
    pub max_y_before_stretch: i32,
    /// Widest X span of a crossover before it becomes a stretch crossover.
    pub max_x_crossover_before_stretch: i32,
    /// Deepest Y span of a crossover before it becomes a stretch crossover.
    pub max_y_crossover_before_stretch: i32,
    /// Widest X span of an invert before it becomes a stretch invert.
    pub max_x_invert_before_stretch: i32,
    /// Widest X span a single foot can bracket.
    pub max_x_bracket: i32,
    /// Deepest Y span a single foot can bracket.
    pub max_y_bracket: i32,
}

impl Default for DeriveThresholds {
    fn default() -> Self {
        Self {
            max_x_before_stretch: 2,
            max_y_before_stretch: 2,
            max_x_crossover_before_stretch: 2,
            max_y_crossover_before_stretch: 2,
            max_x_invert_before_stretch: 2,
            max_x_bracket: 1,
            max_y_bracket: 1,
        }
    }
}

/// Arrow coordinate sets for common layouts, in canonical lane order.
pub mod layouts {
    /// 4-panel single: left, down, up, right.
    pub const DANCE_SINGLE: [(i32, i32); 4] = [(0, 1), (1, 2), (1, 0), (2, 1)];

    /// 8-panel double: two singles side by side.
    pub const DANCE_DOUBLE: [(i32, i32); 8] = [
        (0, 1),
        (1, 2),
        (1, 0),
        (2, 1),
        (3, 1),
        (4, 2),
        (4, 0),
        (5, 1),
    ];

    /// 5-panel pump single: down-left, up-left, center, up-right,
    /// down-right.
    pub const PUMP_SINGLE: [(i32, i32); 5] = [(0, 2), (0, 0), (1, 1), (2, 0), (2, 2)];
}

// Starting-position penalty weights. The tier key groups pairs into
// preference tiers; the overall key breaks ties inside a tier.
const TIER_WEIGHT_CENTER: f64 = 8.0;
const TIER_WEIGHT_OFF_X: f64 = 1.0;
const TIER_WEIGHT_STAGGER: f64 = 0.5;
const TIER_WEIGHT_INWARD: f64 = 0.5;
const OVERALL_WEIGHT_CENTER: f64 = 4.0;
const OVERALL_WEIGHT_OFF_X: f64 = 3.0;
const OVERALL_WEIGHT_STAGGER: f64 = 2.0;
const OVERALL_WEIGHT_INWARD: f64 = 1.0;

impl PadModel {
    /// Derives a full pad model from arrow coordinates.
    ///
    /// # Errors
    ///
    /// Returns a [`PadModelError`] when the coordinates admit no natural
    /// two-foot pairing (no starting position exists) or
    /// `y_travel_compensation` is out of range.
    pub fn derive(
        positions: &[(i32, i32)],
        y_travel_compensation: f64,
        thresholds: &DeriveThresholds,
    ) -> Result<PadModel, PadModelError> {
        let n = positions.len();
        let coords: Vec<PadPosition> = positions
            .iter()
            .map(|&(x, y)| PadPosition::new(x, y))
            .collect();
        let mut arrows: Vec<ArrowData> = coords
            .iter()
            .map(|&position| ArrowData::empty(position, n))
            .collect();

        for a in 0..n {
            for b in 0..n {
                let pa = coords[a];
                let pb = coords[b];
                let dx = (pb.x - pa.x).abs();
                let dy = (pb.y - pa.y).abs();

                for foot in Foot::ALL {
                    let f = foot.index();
                    // Crossed X from this foot's perspective: the other
                    // foot's arrow ends up on this foot's own side.
                    let crossed = match foot {
                        Foot::Left => pb.x < pa.x,
                        Foot::Right => pb.x > pa.x,
                    };
                    let ordered = !crossed || pa.x == pb.x;

                    if ordered {
                        let natural = dx <= thresholds.max_x_before_stretch
                            && dy <= thresholds.max_y_before_stretch;
                        arrows[a].other_foot_pairings[f][b] = natural;
                        arrows[a].other_foot_pairings_stretch[f][b] = !natural;
                    }
                    if crossed && pb.y < pa.y {
                        let near = dx <= thresholds.max_x_crossover_before_stretch
                            && dy <= thresholds.max_y_crossover_before_stretch;
                        arrows[a].other_foot_pairings_crossover_front[f][b] = near;
                        arrows[a].other_foot_pairings_crossover_front_stretch[f][b] = !near;
                    }
                    if crossed && pb.y > pa.y {
                        let near = dx <= thresholds.max_x_crossover_before_stretch
                            && dy <= thresholds.max_y_crossover_before_stretch;
                        arrows[a].other_foot_pairings_crossover_behind[f][b] = near;
                        arrows[a].other_foot_pairings_crossover_behind_stretch[f][b] = !near;
                    }
                    if crossed && pb.y == pa.y {
                        let near = dx <= thresholds.max_x_invert_before_stretch;
                        arrows[a].other_foot_pairings_inverted[f][b] = near;
                        arrows[a].other_foot_pairings_inverted_stretch[f][b] = !near;
                    }

                    if a != b && dx <= thresholds.max_x_bracket && dy <= thresholds.max_y_bracket {
                        // Heel on the deeper arrow, toe on the nearer one;
                        // equal-Y pairs admit both orientations.
                        arrows[a].bracketable_other_heel[f][b] = pb.y >= pa.y;
                        arrows[a].bracketable_other_toe[f][b] = pb.y <= pa.y;
                    }
                }
            }
        }

        let starting_positions = derive_starting_positions(&coords, &arrows);
        PadModel::from_parts(arrows, y_travel_compensation, starting_positions)
    }
}

/// Rates every natural pair and groups them into preference tiers.
fn derive_starting_positions(
    coords: &[PadPosition],
    arrows: &[ArrowData],
) -> Vec<Vec<(Lane, Lane)>> {
    let n = coords.len();
    let center_x = coords.iter().map(|p| f64::from(p.x)).sum::<f64>() / n as f64;
    let center_y = coords.iter().map(|p| f64::from(p.y)).sum::<f64>() / n as f64;

    let mut rated: Vec<(i64, i64, Lane, Lane)> = Vec::new();
    for left in 0..n {
        for right in 0..n {
            if left == right || !arrows[left].other_foot_pairings[Foot::Left.index()][right] {
                continue;
            }
            let pl = coords[left];
            let pr = coords[right];
            let mid_x = f64::from(pl.x + pr.x) / 2.0;
            let mid_y = f64::from(pl.y + pr.y) / 2.0;
            let center_dist = ((mid_x - center_x).powi(2) + (mid_y - center_y).powi(2)).sqrt();
            let off_x = (mid_x - center_x).abs();
            let stagger = f64::from((pl.y - pr.y).abs());
            // A staggered pair faces the side of its front foot; penalize
            // facing toward the pad center while standing off-center.
            let facing_inward = if pl.y == pr.y || mid_x == center_x {
                false
            } else if pl.y < pr.y {
                mid_x > center_x
            } else {
                mid_x < center_x
            };
            let inward = if facing_inward { 1.0 } else { 0.0 };

            let tier = TIER_WEIGHT_CENTER * center_dist
                + TIER_WEIGHT_OFF_X * off_x
                + TIER_WEIGHT_STAGGER * stagger
                + TIER_WEIGHT_INWARD * inward;
            let overall = OVERALL_WEIGHT_CENTER * center_dist
                + OVERALL_WEIGHT_OFF_X * off_x
                + OVERALL_WEIGHT_STAGGER * stagger
                + OVERALL_WEIGHT_INWARD * inward;
            rated.push((
                (tier * 100.0).round() as i64,
                (overall * 1000.0).round() as i64,
                left as Lane,
                right as Lane,
            ));
        }
    }
    rated.sort();

    let mut tiers: Vec<Vec<(Lane, Lane)>> = Vec::new();
    let mut last_key = None;
    for (tier_key, _, left, right) in rated {
        if last_key != Some(tier_key) {
            tiers.push(Vec::new());
            last_key = Some(tier_key);
        }
        if let Some(tier) = tiers.last_mut() {
            tier.push((left, right));
        }
    }
    // Tier 0 always holds exactly the canonical pair; the rest of its
    // equivalence class becomes the next tier.
    if let Some(first) = tiers.first_mut()
        && first.len() > 1
    {
        let rest = first.split_off(1);
        tiers.insert(1, rest);
    }
    tiers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dance_single() -> PadModel {
        PadModel::derive(&layouts::DANCE_SINGLE, 0.5, &DeriveThresholds::default())
            .expect("dance single derives")
    }

    #[test]
    fn canonical_start_is_left_right() {
        let pad = dance_single();
        assert_eq!(pad.canonical_start(), (0, 3));
        assert_eq!(pad.starting_positions()[0].len(), 1);
    }

    #[test]
    fn dance_single_tiers() {
        let pad = dance_single();
        let tiers = pad.starting_positions();
        assert_eq!(tiers[1], vec![(1, 2), (2, 1)]);
        assert_eq!(tiers[2], vec![(0, 1), (1, 3)]);
        assert_eq!(tiers[3], vec![(0, 2), (2, 3)]);
    }

    #[test]
    fn natural_diagonal_and_ordering() {
        let pad = dance_single();
        // Left foot on L pairs with everything to its right.
        for lane in pad.lanes() {
            assert!(pad.natural(Foot::Left, 0, lane));
        }
        // Right foot on R pairs with everything to its left.
        for lane in pad.lanes() {
            assert!(pad.natural(Foot::Right, 3, lane));
        }
        // Left foot on R only pairs with R itself.
        assert!(pad.natural(Foot::Left, 3, 3));
        assert!(!pad.natural(Foot::Left, 3, 0));
    }

    #[test]
    fn crossovers_and_inverts() {
        let pad = dance_single();
        // Left foot on D, right foot on L: crossed in front.
        assert!(pad.crossover_front(Foot::Left, 1, 0));
        // Left foot on U, right foot on L: crossed behind.
        assert!(pad.crossover_behind(Foot::Left, 2, 0));
        // Full invert: left on R, right on L.
        assert!(pad.inverted(Foot::Left, 3, 0));
        assert!(pad.inverted(Foot::Right, 0, 3));
        assert!(!pad.any_crossover(Foot::Left, 1, 3));
    }

    #[test]
    fn bracket_orientations() {
        let pad = dance_single();
        // Heel on D, toe on L or R; heel on L or R, toe on U.
        assert!(pad.bracket_assignment_ok(Foot::Left, 1, 0));
        assert!(pad.bracket_assignment_ok(Foot::Left, 1, 3));
        assert!(pad.bracket_assignment_ok(Foot::Left, 0, 2));
        assert!(pad.bracket_assignment_ok(Foot::Right, 3, 2));
        // Never toe on the deeper arrow of an unequal pair.
        assert!(!pad.bracket_assignment_ok(Foot::Left, 0, 1));
        // U and D are too far apart to bracket.
        assert!(!pad.bracketable_pair(Foot::Left, 1, 2));
        // L and R as well.
        assert!(!pad.bracketable_pair(Foot::Left, 0, 3));
    }

    #[test]
    fn double_pad_brackets_across_halves() {
        let pad = PadModel::derive(&layouts::DANCE_DOUBLE, 0.5, &DeriveThresholds::default())
            .expect("dance double derives");
        // R of player 1 and L of player 2 sit side by side at equal Y:
        // bracketable in both orientations.
        assert!(pad.bracket_assignment_ok(Foot::Left, 3, 4));
        assert!(pad.bracket_assignment_ok(Foot::Left, 4, 3));
    }

    #[test]
    fn pump_center_brackets() {
        let pad = PadModel::derive(&layouts::PUMP_SINGLE, 0.5, &DeriveThresholds::default())
            .expect("pump single derives");
        // Center with an up panel: heel on center, toe up.
        assert!(pad.bracket_assignment_ok(Foot::Left, 2, 1));
        assert!(pad.bracket_assignment_ok(Foot::Right, 2, 3));
        // Center with a down panel: heel down, toe on center.
        assert!(pad.bracket_assignment_ok(Foot::Left, 0, 2));
        // The two down corners are too far apart.
        assert!(!pad.bracketable_pair(Foot::Left, 0, 4));
    }
}
