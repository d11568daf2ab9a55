//! Configuration loading: the lenient dialect, the bundled files, and the
//! derivation reproducing the bundled pad.

use pretty_assertions::assert_eq;
use restep::config::{
    ConfigError, DANCE_SINGLE_PAD_JSON, DEFAULT_FALLBACKS_JSON, parse_fallbacks, parse_pad_model,
};
use restep::prelude::*;

#[test]
fn bundled_pad_matches_its_own_derivation() {
    let bundled = parse_pad_model(DANCE_SINGLE_PAD_JSON).expect("bundled pad parses");
    let derived = PadModel::derive(&layouts::DANCE_SINGLE, 0.5, &DeriveThresholds::default())
        .expect("derives");
    assert_eq!(bundled, derived);
}

#[test]
fn comments_and_trailing_commas_parse() {
    let source = r#"
// a fallback table fragment is enough to exercise the dialect
{
  "StepTypeFallbacks": {
    // every key present, most pointing at themselves
    "SameArrow": ["SameArrow",],
  },
}
"#;
    // The fragment is syntactically fine but semantically incomplete.
    let err = parse_fallbacks(source).unwrap_err();
    assert!(matches!(err, ConfigError::Fallback(_)), "{err:?}");
}

#[test]
fn bundled_fallbacks_cover_every_step_type() {
    let table = parse_fallbacks(DEFAULT_FALLBACKS_JSON).expect("bundled table parses");
    for step in StepType::ALL {
        assert!(!table.fallbacks_for(step).is_empty());
    }
    assert_eq!(
        table.fallbacks_for(StepType::NewArrow),
        &[StepType::NewArrow, StepType::SameArrow]
    );
}

#[test]
fn splice_cycles_are_config_errors() {
    let mut entries = String::new();
    for step in StepType::ALL {
        let name = step.name();
        let value = match name {
            "SameArrow" => "[\"*NewArrow\"]".to_owned(),
            "NewArrow" => "[\"*SameArrow\"]".to_owned(),
            _ => format!("[\"{name}\"]"),
        };
        entries.push_str(&format!("    \"{name}\": {value},\n"));
    }
    let source = format!("{{\n  \"StepTypeFallbacks\": {{\n{entries}  }}\n}}");
    let err = parse_fallbacks(&source).unwrap_err();
    assert!(matches!(err, ConfigError::Fallback(_)), "{err:?}");
}

#[test]
fn unknown_step_types_are_config_errors() {
    let source = r#"{"StepTypeFallbacks": {"Moonwalk": ["SameArrow"]}}"#;
    let err = parse_fallbacks(source).unwrap_err();
    assert!(matches!(err, ConfigError::Fallback(_)), "{err:?}");
}

#[test]
fn syntax_errors_are_spanned() {
    let err = parse_pad_model("{\"ArrowData\": [{]}").unwrap_err();
    let ConfigError::Syntax(messages) = err else {
        panic!("expected a syntax error, got {err:?}");
    };
    assert!(!messages.is_empty());
    assert!(messages[0].end >= messages[0].start);
}

#[test]
fn pad_schema_mismatch_is_a_decode_error() {
    let err = parse_pad_model("{\"StartingPositions\": \"nope\"}").unwrap_err();
    assert!(matches!(err, ConfigError::Decode(_)), "{err:?}");
}

#[test]
fn broken_crossover_mirror_is_rejected() {
    // Start from the real schema and knock out one mirrored entry.
    let bundled = parse_pad_model(DANCE_SINGLE_PAD_JSON).expect("parses");
    let mut schema = restep::pad::schema::PadModelSchema::from_model(&bundled);
    // Left foot on D crosses in front of L; erase the opposing entry
    // (right foot on L crossing behind D).
    schema.arrow_data[0].other_foot_pairings_crossover_behind[1][1] = false;
    let err = schema.into_model().unwrap_err();
    assert!(
        matches!(err, restep::pad::PadModelError::CrossoverMirror { .. }),
        "{err:?}"
    );
}

#[test]
fn written_pad_json_reparses_identically() {
    let bundled = parse_pad_model(DANCE_SINGLE_PAD_JSON).expect("parses");
    let schema = restep::pad::schema::PadModelSchema::from_model(&bundled);
    let json = schema.to_json_string().expect("serializes");
    let reparsed = parse_pad_model(&json).expect("reparses");
    assert_eq!(reparsed, bundled);
}
