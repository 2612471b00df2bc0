//! Integration tests for redacted feeds: masking, block storage and correlation
//!
//! The redacted fixture is the fixture feed masked with the default patient
//! fields, so both files hold the same records in the same order.

use hl7_inspector::correlate::{pair_by_control_id, pair_by_ordinal};
use hl7_inspector::masking::PatientMasker;
use hl7_inspector::{Hl7Error, ParseSession, RedactedBlocks, load_redacted, parser};
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Mask the fixture feed and compare against the stored redacted fixture
///
/// Purpose: Validate that masking keeps every line and replaces values in place
/// Benefit: Ensures produced counterparts stay in ordinal correspondence
#[test]
fn test_masking_reproduces_redacted_fixture() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("masked.hl7");

    let outcome = PatientMasker::default()
        .mask_file(&fixture("adt_feed.hl7"), &output)
        .unwrap();

    let expected = std::fs::read_to_string(fixture("adt_feed_redacted.hl7")).unwrap();
    let written = std::fs::read_to_string(&output).unwrap();

    assert_eq!(written, expected);
    assert_eq!(outcome.messages, 5);
    assert_eq!(outcome.lines_masked, 5);
    assert_eq!(outcome.fields_masked, 22);
    assert!(!written.contains("Smith"));
    assert!(!written.contains("123-45-6789"));
}

#[test]
fn test_redacted_blocks_by_ordinal() {
    let blocks = load_redacted(&fixture("adt_feed_redacted.hl7")).unwrap();

    assert_eq!(blocks.len(), 5);
    assert_eq!(blocks.lines_discarded(), 2);
    assert_eq!(blocks.ordinals().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
    assert!(blocks.get(3).unwrap().contains("OBX|3|NM|HGB||14.1|g/dL\n"));
    assert!(blocks.get(4).unwrap().ends_with("PID|1||**********||*****\n"));
    assert_eq!(blocks.get(6), None);
}

#[test]
fn test_missing_redacted_feed_is_empty() {
    let blocks = load_redacted(&fixture("does_not_exist.hl7")).unwrap();

    assert!(blocks.is_empty());
    assert_eq!(blocks.get(1), None);
}

#[test]
fn test_ordinal_pairing_matches_headers() {
    let messages = parser::parse_file(&fixture("adt_feed.hl7")).unwrap();
    let blocks = load_redacted(&fixture("adt_feed_redacted.hl7")).unwrap();
    let pairs = pair_by_ordinal(&messages, &blocks).unwrap();

    assert_eq!(pairs.len(), 5);
    for pair in &pairs {
        assert_eq!(pair.ordinal as u64, pair.message.id);
        assert_eq!(
            pair.message.raw.lines().next(),
            pair.redacted.lines().next()
        );
        assert_eq!(pair.message.raw.lines().count(), pair.redacted.lines().count());
    }
}

#[test]
fn test_ordinal_pairing_rejects_truncated_counterpart() {
    let messages = parser::parse_file(&fixture("adt_feed.hl7")).unwrap();
    let redacted = std::fs::read_to_string(fixture("adt_feed_redacted.hl7")).unwrap();
    let truncated: Vec<&str> = redacted.lines().take(10).collect();
    let blocks = RedactedBlocks::from_lines(truncated);

    match pair_by_ordinal(&messages, &blocks) {
        Err(Hl7Error::OrdinalMismatch { primary, redacted }) => {
            assert_eq!(primary, 5);
            assert_eq!(redacted, 3);
        }
        other => panic!("expected ordinal mismatch, got {:?}", other.map(|p| p.len())),
    }
}

#[test]
fn test_control_id_pairing() {
    let primary = parser::parse_file(&fixture("adt_feed.hl7")).unwrap();
    let redacted = ParseSession::starting_at(1000)
        .parse_file(&fixture("adt_feed_redacted.hl7"))
        .unwrap()
        .messages;

    let join = pair_by_control_id(&primary, &redacted).unwrap();

    assert!(join.is_complete());
    assert_eq!(join.pairs.len(), 5);
    for (left, right) in &join.pairs {
        assert_eq!(left.control_id, right.control_id);
        assert_eq!(right.id, left.id + 999);
        assert!(right.patient_id().chars().all(|c| c == '*'));
    }
}
