//! Serde schema mirroring the on-disk PadModel JSON.
//!
//! The field names and nesting follow the external format exactly; the inner
//! `[left_foot_row, right_foot_row]` ordering of every table is load-bearing.
//! Schema values convert losslessly to and from [`PadModel`].

use serde::{Deserialize, Serialize};

use crate::chart::Lane;
use crate::pad::{ArrowData, FootRows, PadModel, PadModelError, PadPosition};

/// Top-level object of a PadModel JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PadModelSchema {
    /// Starting-position tiers; each tier is a list of `[left, right]` lane
    /// pairs. Tier 0 must hold exactly one pair.
    pub starting_positions: Vec<Vec<[Lane; 2]>>,
    /// Per-arrow coordinates and pairing tables, in lane order.
    pub arrow_data: Vec<ArrowDataSchema>,
    /// Scale factor applied to Y travel distances, in `[0, 1]`.
    #[serde(rename = "YTravelDistanceCompensation")]
    pub y_travel_distance_compensation: f64,
}

/// One arrow of a PadModel JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ArrowDataSchema {
    /// Left-to-right coordinate.
    pub x: i32,
    /// Front-to-back coordinate.
    pub y: i32,
    /// Same-foot heel pairings, `[left_row, right_row]`.
    pub bracketable_pairings_other_heel: [Vec<bool>; 2],
    /// Same-foot toe pairings.
    pub bracketable_pairings_other_toe: [Vec<bool>; 2],
    /// Natural other-foot pairings.
    pub other_foot_pairings: [Vec<bool>; 2],
    /// Stretch other-foot pairings.
    pub other_foot_pairings_stretch: [Vec<bool>; 2],
    /// Front crossovers.
    pub other_foot_pairings_crossover_front: [Vec<bool>; 2],
    /// Stretch front crossovers.
    pub other_foot_pairings_crossover_front_stretch: [Vec<bool>; 2],
    /// Behind crossovers.
    pub other_foot_pairings_crossover_behind: [Vec<bool>; 2],
    /// Stretch behind crossovers.
    pub other_foot_pairings_crossover_behind_stretch: [Vec<bool>; 2],
    /// Inverted pairings.
    pub other_foot_pairings_inverted: [Vec<bool>; 2],
    /// Stretch inverted pairings.
    pub other_foot_pairings_inverted_stretch: [Vec<bool>; 2],
}

impl PadModelSchema {
    /// Converts the schema into a validated [`PadModel`].
    ///
    /// # Errors
    ///
    /// Returns the [`PadModelError`] from [`PadModel::from_parts`].
    pub fn into_model(self) -> Result<PadModel, PadModelError> {
        let arrows = self
            .arrow_data
            .into_iter()
            .map(|arrow| ArrowData {
                position: PadPosition::new(arrow.x, arrow.y),
                bracketable_other_heel: arrow.bracketable_pairings_other_heel,
                bracketable_other_toe: arrow.bracketable_pairings_other_toe,
                other_foot_pairings: arrow.other_foot_pairings,
                other_foot_pairings_stretch: arrow.other_foot_pairings_stretch,
                other_foot_pairings_crossover_front: arrow.other_foot_pairings_crossover_front,
                other_foot_pairings_crossover_front_stretch: arrow
                    .other_foot_pairings_crossover_front_stretch,
                other_foot_pairings_crossover_behind: arrow.other_foot_pairings_crossover_behind,
                other_foot_pairings_crossover_behind_stretch: arrow
                    .other_foot_pairings_crossover_behind_stretch,
                other_foot_pairings_inverted: arrow.other_foot_pairings_inverted,
                other_foot_pairings_inverted_stretch: arrow.other_foot_pairings_inverted_stretch,
            })
            .collect();
        let starting_positions = self
            .starting_positions
            .into_iter()
            .map(|tier| tier.into_iter().map(|[l, r]| (l, r)).collect())
            .collect();
        PadModel::from_parts(arrows, self.y_travel_distance_compensation, starting_positions)
    }

    /// Builds the schema for a model, e.g. to write a derived pad to disk.
    #[must_use]
    pub fn from_model(model: &PadModel) -> Self {
        let clone_rows = |rows: &FootRows| [rows[0].clone(), rows[1].clone()];
        Self {
            starting_positions: model
                .starting_positions()
                .iter()
                .map(|tier| tier.iter().map(|&(l, r)| [l, r]).collect())
                .collect(),
            arrow_data: model
                .arrows()
                .iter()
                .map(|arrow| ArrowDataSchema {
                    x: arrow.position.x,
                    y: arrow.position.y,
                    bracketable_pairings_other_heel: clone_rows(&arrow.bracketable_other_heel),
                    bracketable_pairings_other_toe: clone_rows(&arrow.bracketable_other_toe),
                    other_foot_pairings: clone_rows(&arrow.other_foot_pairings),
                    other_foot_pairings_stretch: clone_rows(&arrow.other_foot_pairings_stretch),
                    other_foot_pairings_crossover_front: clone_rows(
                        &arrow.other_foot_pairings_crossover_front,
                    ),
                    other_foot_pairings_crossover_front_stretch: clone_rows(
                        &arrow.other_foot_pairings_crossover_front_stretch,
                    ),
                    other_foot_pairings_crossover_behind: clone_rows(
                        &arrow.other_foot_pairings_crossover_behind,
                    ),
                    other_foot_pairings_crossover_behind_stretch: clone_rows(
                        &arrow.other_foot_pairings_crossover_behind_stretch,
                    ),
                    other_foot_pairings_inverted: clone_rows(&arrow.other_foot_pairings_inverted),
                    other_foot_pairings_inverted_stretch: clone_rows(
                        &arrow.other_foot_pairings_inverted_stretch,
                    ),
                })
                .collect(),
            y_travel_distance_compensation: model.y_travel_compensation(),
        }
    }

    /// Serializes the schema to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error; the schema shape itself is
    /// always serializable.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pad::derive::{DeriveThresholds, layouts};

    #[test]
    fn schema_round_trips_through_model() {
        let pad = PadModel::derive(&layouts::DANCE_SINGLE, 0.5, &DeriveThresholds::default())
            .expect("derives");
        let schema = PadModelSchema::from_model(&pad);
        let back = schema.clone().into_model().expect("valid schema");
        assert_eq!(back, pad);
    }

    #[test]
    fn schema_round_trips_through_json() {
        let pad = PadModel::derive(&layouts::PUMP_SINGLE, 0.25, &DeriveThresholds::default())
            .expect("derives");
        let schema = PadModelSchema::from_model(&pad);
        let json = schema.to_json_string().expect("serializes");
        let parsed: PadModelSchema = serde_json::from_str(&json).expect("parses");
        assert_eq!(parsed, schema);
    }
}
