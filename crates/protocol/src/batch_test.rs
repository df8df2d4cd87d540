//! Tests for BatchAssembler

use serde_json::{Value, json};

use crate::DecodeWarning;
use crate::batch::{
    AssembleOptions, BatchAssembler, DEFAULT_INDENT, assemble, pretty_or_compact,
};

fn documents() -> Vec<Value> {
    vec![
        json!({ "name": "a", "ext": {}, "data": { "n": 1 } }),
        json!({ "name": "b", "ext": { "os": { "ver": "10" } } }),
    ]
}

// =============================================================================
// Per-record output
// =============================================================================

#[test]
fn test_records_are_compact() {
    let batch = assemble(&documents(), false);

    assert_eq!(
        batch.records,
        [
            r#"{"name":"a","ext":{},"data":{"n":1}}"#,
            r#"{"name":"b","ext":{"os":{"ver":"10"}}}"#,
        ]
    );
}

#[test]
fn test_records_keep_key_order() {
    let batch = assemble(&[json!({ "z": 1, "a": 2 })], true);
    assert_eq!(batch.records[0], r#"{"z":1,"a":2}"#);
}

// =============================================================================
// Combined output
// =============================================================================

#[test]
fn test_compact_combined() {
    let batch = assemble(&documents(), true);

    assert_eq!(
        batch.combined,
        "[{\"name\":\"a\",\"ext\":{},\"data\":{\"n\":1}},{\"name\":\"b\",\"ext\":{\"os\":{\"ver\":\"10\"}}}]\n"
    );
    assert!(batch.warnings.is_empty());
}

#[test]
fn test_pretty_combined_matches_compact() {
    let pretty = assemble(&documents(), false);
    let compact = assemble(&documents(), true);

    assert!(pretty.combined.ends_with('\n'));
    assert!(pretty.combined.contains("\n  {\n    \"name\": \"a\""));

    let a: Value = serde_json::from_str(&pretty.combined).unwrap();
    let b: Value = serde_json::from_str(&compact.combined).unwrap();
    assert_eq!(a, b);
    assert_eq!(pretty.records, compact.records);
}

#[test]
fn test_custom_indent() {
    let assembler = BatchAssembler::new(AssembleOptions {
        compact: false,
        indent: 4,
    });
    let batch = assembler.assemble(&[json!({ "k": 1 })]);

    assert_eq!(batch.combined, "[\n    {\n        \"k\": 1\n    }\n]\n");
}

#[test]
fn test_empty_batch() {
    assert_eq!(assemble(&[], true).combined, "[]\n");
    assert_eq!(assemble(&[], false).combined, "[]\n");
    assert!(assemble(&[], false).records.is_empty());
}

#[test]
fn test_default_options() {
    let options = AssembleOptions::default();
    assert!(!options.compact);
    assert_eq!(options.indent, DEFAULT_INDENT);
    assert!(AssembleOptions::compact().compact);
    assert_eq!(BatchAssembler::default().options(), options);
}

// =============================================================================
// Pretty-print fallback
// =============================================================================

#[test]
fn test_pretty_failure_keeps_compact_text() {
    let mut warnings = Vec::new();
    let out = pretty_or_compact("[{\"a\":1}".to_string(), 2, &mut warnings);

    assert_eq!(out, "[{\"a\":1}");
    assert_eq!(warnings.len(), 1);
    assert!(matches!(
        &warnings[0],
        DecodeWarning::PrettyPrintFailure(message) if message.contains("EOF")
    ));
}

#[test]
fn test_pretty_success_adds_no_warning() {
    let mut warnings = Vec::new();
    let out = pretty_or_compact("[{\"a\":1}]".to_string(), 2, &mut warnings);

    assert_eq!(out, "[\n  {\n    \"a\": 1\n  }\n]");
    assert!(warnings.is_empty());
}
