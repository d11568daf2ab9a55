//! Configuration loading: pad models and fallback tables from JSON.
//!
//! Both formats are parsed with the lenient dialect of [`parser`] (strict
//! JSON plus `//` comments and trailing commas) and decoded through
//! [`json_de`] into the serde schema structs. A [`ConfigError`] is fatal for
//! the input that produced it and carries the offending key, path or span.

pub mod json_de;
pub mod parser;

use thiserror::Error;

use crate::fallback::{FallbackError, FallbacksSchema, StepTypeFallbacks};
use crate::pad::{PadModel, PadModelError, schema::PadModelSchema};

/// One spanned syntax error from the lenient JSON parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedMessage {
    /// Human-readable description.
    pub message: String,
    /// Byte offset where the error starts.
    pub start: usize,
    /// Byte offset where the error ends.
    pub end: usize,
}

impl std::fmt::Display for SpannedMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}..{}", self.message, self.start, self.end)
    }
}

/// A fatal configuration defect.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The document is not syntactically valid (even for the lenient
    /// dialect).
    #[error("configuration syntax error: {}", first_message(.0))]
    Syntax(Vec<SpannedMessage>),
    /// The document parsed but does not match the expected schema.
    #[error("configuration schema error: {0}")]
    Decode(String),
    /// The pad model is structurally invalid.
    #[error(transparent)]
    Pad(#[from] PadModelError),
    /// The fallback table is structurally invalid.
    #[error(transparent)]
    Fallback(#[from] FallbackError),
}

fn first_message(errors: &[SpannedMessage]) -> String {
    errors
        .first()
        .map_or_else(|| "empty document".to_owned(), ToString::to_string)
}

fn parse_value(source: &str) -> Result<parser::Json, ConfigError> {
    let (value, errors) = parser::parse_json(source);
    if !errors.is_empty() {
        return Err(ConfigError::Syntax(
            errors
                .iter()
                .map(|error| SpannedMessage {
                    message: error.to_string(),
                    start: error.span().start,
                    end: error.span().end,
                })
                .collect(),
        ));
    }
    value.ok_or_else(|| ConfigError::Syntax(Vec::new()))
}

/// Parses a PadModel JSON document into a validated [`PadModel`].
///
/// # Errors
///
/// Returns a [`ConfigError`] on syntax errors, schema mismatches, or an
/// invalid model (bad table sizes, broken crossover mirror, malformed
/// starting positions).
pub fn parse_pad_model(source: &str) -> Result<PadModel, ConfigError> {
    let value = parse_value(source)?;
    let schema: PadModelSchema =
        json_de::from_json(&value).map_err(|error| ConfigError::Decode(error.to_string()))?;
    Ok(schema.into_model()?)
}

/// Parses a fallbacks JSON document into an expanded [`StepTypeFallbacks`]
/// table.
///
/// # Errors
///
/// Returns a [`ConfigError`] on syntax errors, schema mismatches, unknown
/// step types, splice cycles, or missing/empty lists.
pub fn parse_fallbacks(source: &str) -> Result<StepTypeFallbacks, ConfigError> {
    let value = parse_value(source)?;
    let schema: FallbacksSchema =
        json_de::from_json(&value).map_err(|error| ConfigError::Decode(error.to_string()))?;
    Ok(StepTypeFallbacks::from_entries(&schema.step_type_fallbacks)?)
}

/// The bundled dance-single pad model JSON.
pub const DANCE_SINGLE_PAD_JSON: &str = include_str!("../data/dance_single.json");

/// The bundled default fallback table JSON.
pub const DEFAULT_FALLBACKS_JSON: &str = include_str!("../data/default_fallbacks.json");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_pad_parses() {
        let pad = parse_pad_model(DANCE_SINGLE_PAD_JSON).expect("bundled pad is valid");
        assert_eq!(pad.num_arrows(), 4);
        assert_eq!(pad.canonical_start(), (0, 3));
    }

    #[test]
    fn bundled_fallbacks_parse() {
        parse_fallbacks(DEFAULT_FALLBACKS_JSON).expect("bundled fallbacks are valid");
    }

    #[test]
    fn syntax_errors_carry_spans() {
        let err = parse_pad_model("{\"ArrowData\": [,}").unwrap_err();
        match err {
            ConfigError::Syntax(messages) => assert!(!messages.is_empty()),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn schema_errors_name_the_field() {
        let err = parse_pad_model("{\"StartingPositions\": 3}").unwrap_err();
        assert!(matches!(err, ConfigError::Decode(_)));
    }
}
