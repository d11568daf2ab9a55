//! `.fsg` persistence round-trips and its failure modes.

use std::fs;
use std::sync::OnceLock;

use restep::graph::persist::{GraphPersistError, MAGIC, VERSION};
use restep::prelude::*;

fn dance_single() -> &'static (PadModel, StepGraph) {
    static CACHE: OnceLock<(PadModel, StepGraph)> = OnceLock::new();
    CACHE.get_or_init(|| {
        let pad = PadModel::derive(&layouts::DANCE_SINGLE, 0.5, &DeriveThresholds::default())
            .expect("dance single derives");
        let graph = StepGraph::build(&pad);
        (pad, graph)
    })
}

#[test]
fn written_graph_loads_structurally_equal() {
    let (pad, graph) = dance_single();
    let mut bytes = Vec::new();
    graph.write_to(&mut bytes).expect("writes");
    let loaded = StepGraph::read_from(&mut bytes.as_slice(), pad).expect("loads");
    assert!(loaded == *graph, "loaded graph differs from the built one");
    assert_eq!(loaded.root(), graph.root());
}

#[test]
fn writing_is_deterministic() {
    let (_, graph) = dance_single();
    let mut first = Vec::new();
    let mut second = Vec::new();
    graph.write_to(&mut first).expect("writes");
    graph.write_to(&mut second).expect("writes");
    assert_eq!(first, second);
}

#[test]
fn round_trips_through_a_file() {
    let (pad, graph) = dance_single();
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("dance_single.fsg");
    let mut file = fs::File::create(&path).expect("creates");
    graph.write_to(&mut file).expect("writes");
    drop(file);
    let mut file = fs::File::open(&path).expect("opens");
    let loaded = StepGraph::read_from(&mut file, pad).expect("loads");
    assert!(loaded == *graph);
}

#[test]
fn foreign_files_are_rejected() {
    let (pad, _) = dance_single();
    let mut bytes = b"not a step graph at all".as_slice();
    let err = StepGraph::read_from(&mut bytes, pad).unwrap_err();
    assert!(matches!(err, GraphPersistError::BadMagic));
}

#[test]
fn version_mismatches_are_rejected() {
    let (pad, graph) = dance_single();
    let mut bytes = Vec::new();
    graph.write_to(&mut bytes).expect("writes");
    bytes[MAGIC.len()..MAGIC.len() + 4].copy_from_slice(&(VERSION + 1).to_le_bytes());
    let err = StepGraph::read_from(&mut bytes.as_slice(), pad).unwrap_err();
    assert!(matches!(
        err,
        GraphPersistError::UnsupportedVersion { found } if found == VERSION + 1
    ));
}

#[test]
fn arrow_count_mismatches_are_rejected() {
    let (_, graph) = dance_single();
    let pump = PadModel::derive(&layouts::PUMP_SINGLE, 0.5, &DeriveThresholds::default())
        .expect("pump derives");
    let mut bytes = Vec::new();
    graph.write_to(&mut bytes).expect("writes");
    let err = StepGraph::read_from(&mut bytes.as_slice(), &pump).unwrap_err();
    assert!(matches!(
        err,
        GraphPersistError::ArrowCountMismatch {
            expected: 5,
            found: 4
        }
    ));
}

#[test]
fn truncated_files_are_io_errors() {
    let (pad, graph) = dance_single();
    let mut bytes = Vec::new();
    graph.write_to(&mut bytes).expect("writes");
    bytes.truncate(bytes.len() / 2);
    let err = StepGraph::read_from(&mut bytes.as_slice(), pad).unwrap_err();
    assert!(matches!(
        err,
        GraphPersistError::Io(_) | GraphPersistError::Corrupt(_)
    ));
}
