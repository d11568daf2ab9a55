//! Ordered step-type replacement lists used during performance.
//!
//! When a target pad cannot literally realize an expressed step type, the
//! performed-chart search substitutes the first acceptable replacement from
//! that step type's fallback list. Lists are authored in JSON (see
//! [`crate::config`]); an entry `*Name` splices in `Name`'s own list, and
//! splice cycles are rejected at load time.

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

use crate::graph::moves::StepType;

/// Flat penalty per arrow lost by a fallback (e.g. a bracket replaced by a
/// single step).
pub const DROPPED_ARROW_COST: f64 = 100.0;

/// Schema of the fallbacks JSON document.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FallbacksSchema {
    /// Step type name to fallback entries; `*Name` splices `Name`'s list.
    #[serde(rename = "StepTypeFallbacks")]
    pub step_type_fallbacks: HashMap<String, Vec<String>>,
}

/// A structural defect in a fallback table.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FallbackError {
    /// A key is not a step type name.
    #[error("unknown step type {key:?} in fallback table")]
    UnknownStepType {
        /// The offending key.
        key: String,
    },
    /// A list entry is not a step type name.
    #[error("unknown fallback entry {entry:?} under {key:?}")]
    UnknownEntry {
        /// The key owning the list.
        key: String,
        /// The offending entry.
        entry: String,
    },
    /// Splice references form a cycle.
    #[error("fallback splice cycle through {key:?}")]
    Cycle {
        /// A step type on the cycle.
        key: &'static str,
    },
    /// A step type has no entry at all.
    #[error("step type {step_type:?} has no fallback list")]
    Missing {
        /// The uncovered step type.
        step_type: &'static str,
    },
    /// A step type's expanded list is empty.
    #[error("fallback list for {key:?} is empty")]
    Empty {
        /// The key owning the empty list.
        key: String,
    },
}

/// Expanded, validated fallback lists for every step type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepTypeFallbacks {
    lists: Vec<Vec<StepType>>,
}

impl StepTypeFallbacks {
    /// Builds the table from raw name lists, expanding `*Name` splices
    /// depth-first with a cycle check and de-duplicating each expansion
    /// (first occurrence wins).
    ///
    /// # Errors
    ///
    /// Returns a [`FallbackError`] for unknown names, splice cycles, missing
    /// step types or empty lists.
    pub fn from_entries(entries: &HashMap<String, Vec<String>>) -> Result<Self, FallbackError> {
        for key in entries.keys() {
            if StepType::from_name(key).is_none() {
                return Err(FallbackError::UnknownStepType { key: key.clone() });
            }
        }
        for step in StepType::ALL {
            if !entries.contains_key(step.name()) {
                return Err(FallbackError::Missing {
                    step_type: step.name(),
                });
            }
        }

        let mut memo: Vec<Option<Vec<StepType>>> = vec![None; StepType::COUNT];
        let mut visiting = Vec::new();
        for step in StepType::ALL {
            expand(step, entries, &mut memo, &mut visiting)?;
        }
        let lists: Vec<Vec<StepType>> = memo.into_iter().map(Option::unwrap_or_default).collect();
        for step in StepType::ALL {
            if lists[usize::from(step.discriminant())].is_empty() {
                return Err(FallbackError::Empty {
                    key: step.name().to_owned(),
                });
            }
        }
        Ok(Self { lists })
    }

    /// The bundled default table.
    #[must_use]
    pub fn default_table() -> Self {
        crate::config::parse_fallbacks(include_str!("../data/default_fallbacks.json"))
            .expect("bundled fallback table must be valid")
    }

    /// The ordered replacement list for `step`. The first entry is `step`
    /// itself whenever the table permits the literal move.
    #[must_use]
    pub fn fallbacks_for(&self, step: StepType) -> &[StepType] {
        &self.lists[usize::from(step.discriminant())]
    }

    /// The rank of `candidate` in `step`'s list, or `None` when the table
    /// does not permit the substitution.
    #[must_use]
    pub fn fallback_index(&self, step: StepType, candidate: StepType) -> Option<usize> {
        self.fallbacks_for(step)
            .iter()
            .position(|&entry| entry == candidate)
    }

    /// The cost of substituting `candidate` for `step`: the rank normalized
    /// to `[0, 1]`, plus [`DROPPED_ARROW_COST`] per arrow the substitution
    /// loses.
    #[must_use]
    pub fn transition_cost(&self, step: StepType, candidate: StepType) -> Option<f64> {
        let index = self.fallback_index(step, candidate)?;
        let len = self.fallbacks_for(step).len();
        let normalized = index as f64 / (len - 1).max(1) as f64;
        let dropped = step.arrow_count().saturating_sub(candidate.arrow_count());
        Some(normalized + DROPPED_ARROW_COST * f64::from(dropped))
    }
}

fn expand(
    step: StepType,
    entries: &HashMap<String, Vec<String>>,
    memo: &mut Vec<Option<Vec<StepType>>>,
    visiting: &mut Vec<StepType>,
) -> Result<Vec<StepType>, FallbackError> {
    let slot = usize::from(step.discriminant());
    if let Some(done) = &memo[slot] {
        return Ok(done.clone());
    }
    if visiting.contains(&step) {
        return Err(FallbackError::Cycle { key: step.name() });
    }
    visiting.push(step);

    let mut expanded = Vec::new();
    let mut push_unique = |entry: StepType, expanded: &mut Vec<StepType>| {
        if !expanded.contains(&entry) {
            expanded.push(entry);
        }
    };
    for raw in &entries[step.name()] {
        if let Some(name) = raw.strip_prefix('*') {
            let target = StepType::from_name(name).ok_or_else(|| FallbackError::UnknownEntry {
                key: step.name().to_owned(),
                entry: raw.clone(),
            })?;
            for spliced in expand(target, entries, memo, visiting)? {
                push_unique(spliced, &mut expanded);
            }
        } else {
            let entry = StepType::from_name(raw).ok_or_else(|| FallbackError::UnknownEntry {
                key: step.name().to_owned(),
                entry: raw.clone(),
            })?;
            push_unique(entry, &mut expanded);
        }
    }

    visiting.pop();
    memo[slot] = Some(expanded.clone());
    Ok(expanded)
}
