//! Tests for the main parse session functionality

use super::*;
use crate::models::CanonicalTimestamp;
use crate::parser::{ParseSession, ParserOptions};
use chrono::NaiveDate;

fn fixed_clock() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2030, 6, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

#[test]
fn test_message_count_matches_sentinels() {
    let feed = create_test_feed();
    let outcome = ParseSession::new().parse_text(&feed);

    assert_eq!(outcome.messages.len(), count_sentinels(&feed));
    assert_eq!(outcome.stats.messages, 3);
    assert_eq!(outcome.stats.segments, 10);
    assert_eq!(outcome.stats.lines_read, 10);
    assert_eq!(outcome.stats.lines_discarded, 0);
}

#[test]
fn test_identifiers_follow_parse_order() {
    let outcome = ParseSession::new().parse_text(&create_test_feed());

    let ids: Vec<u64> = outcome.messages.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(outcome.next_id, 4);

    let controls: Vec<&str> = outcome
        .messages
        .iter()
        .map(|m| m.control_id.as_str())
        .collect();
    assert_eq!(controls, vec!["MSG00001", "MSG00002", "MSG00003"]);
}

#[test]
fn test_session_continues_numbering() {
    let mut session = ParseSession::starting_at(100);
    let first = session.parse_text(&create_test_feed());
    let second = session.parse_text(&create_test_feed());

    assert_eq!(first.messages[0].id, 100);
    assert_eq!(first.next_id, 103);
    assert_eq!(second.messages[0].id, 103);
    assert_eq!(second.next_id, 106);
    assert_eq!(session.next_id(), 106);
}

#[test]
fn test_reparse_is_deterministic() {
    let feed = create_test_feed();
    let first = ParseSession::starting_at(1).parse_text(&feed);
    let second = ParseSession::starting_at(1).parse_text(&feed);

    assert_eq!(first.messages, second.messages);
}

#[test]
fn test_segment_and_field_numbering() {
    let outcome = ParseSession::new().parse_text(&create_test_feed());

    for message in &outcome.messages {
        assert_eq!(message.segments[0].kind, "MSH");
        for (i, segment) in message.segments.iter().enumerate() {
            assert_eq!(segment.sequence, i);
            assert_eq!(segment.message_id, message.id);
            for (j, field) in segment.fields.iter().enumerate() {
                assert_eq!(field.position, j + 1);
                assert_eq!(field.label, format!("{}-{}", segment.kind, j + 1));
                assert_eq!(field.segment_sequence, i);
            }
        }
    }
}

#[test]
fn test_raw_text_round_trip() {
    let feed = create_test_feed();
    let outcome = ParseSession::new().parse_text(&feed);

    for message in &outcome.messages {
        assert_eq!(message.reconstruct(), message.raw);
        assert!(message.raw.ends_with('\n'));
    }

    let joined: String = outcome.messages.iter().map(|m| m.raw.as_str()).collect();
    assert_eq!(joined, feed);
}

#[test]
fn test_header_summary_extraction() {
    let outcome = ParseSession::new().parse_text(&create_test_feed());
    let first = &outcome.messages[0];

    assert_eq!(first.facility, "GOOD HEALTH HOSPITAL");
    assert_eq!(first.raw_timestamp, "20240115103000");
    assert_eq!(first.message_type, "ADT^A01");
    assert_eq!(first.control_id, "MSG00001");
    assert_eq!(
        first.timestamp,
        CanonicalTimestamp::Parsed(
            NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap()
        )
    );

    let third = &outcome.messages[2];
    assert_eq!(third.facility, "MERCY CLINIC");
    assert_eq!(
        third.timestamp.value(),
        NaiveDate::from_ymd_opt(2024, 1, 17)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    );
}

#[test]
fn test_patient_summary_extraction() {
    let outcome = ParseSession::new().parse_text(&create_test_feed());

    let first = &outcome.messages[0];
    let patient = first.patient.as_ref().unwrap();
    assert_eq!(patient.patient_id, "H000004935");
    assert_eq!(patient.last_name, "Smith");
    assert_eq!(patient.first_name.as_deref(), Some("John"));
    assert_eq!(patient.account_number, "ACC1001");
    assert!(first.diagnostics.is_clean());

    let third = &outcome.messages[2];
    assert_eq!(third.last_name(), "Brown");
    assert_eq!(third.first_name(), "");
    assert_eq!(third.patient.as_ref().unwrap().first_name, None);
    assert!(third.diagnostics.short_patient_segment);
}

#[test]
fn test_field_lookup_by_label() {
    let outcome = ParseSession::new().parse_text(&create_test_feed());
    let first = &outcome.messages[0];

    assert_eq!(
        first.field_by_label("PID-5").map(|f| f.value.as_str()),
        Some("Smith^John")
    );
    assert_eq!(
        first.field_by_label("PV1-2").map(|f| f.value.as_str()),
        Some("I")
    );
    assert!(first.field_by_label("ZZZ-1").is_none());
    assert!(first.field_by_label("nolabel").is_none());
}

#[test]
fn test_field_lookup_outlives_label() {
    let outcome = ParseSession::new().parse_text(&create_test_feed());
    let first = &outcome.messages[0];

    // The returned field borrows the message, not the label
    let field = {
        let label = format!("PID-{}", 3);
        first.field_by_label(&label)
    };
    assert_eq!(field.map(|f| f.position), Some(3));
}

#[test]
fn test_defaulted_timestamp_uses_session_clock() {
    let feed = "MSH|^~\\&|APP|FAC|||not-a-date||ADT^A01|C1\n";
    let outcome = ParseSession::new().with_clock(fixed_clock).parse_text(feed);
    let message = &outcome.messages[0];

    assert_eq!(
        message.timestamp,
        CanonicalTimestamp::Defaulted {
            raw: "not-a-date".to_string(),
            at: fixed_clock(),
        }
    );
    assert!(message.diagnostics.timestamp_defaulted);
    assert_eq!(outcome.stats.timestamps_defaulted, 1);
    assert_eq!(outcome.stats.degraded_messages, 1);
}

#[test]
fn test_custom_segment_codes() {
    let feed = "FHS|x\nHDR|a|b|FAC|d|e|20240101\nPAT|1||P77||Doe^Jane\nHDR|z\n";
    let options = ParserOptions {
        sentinel: "HDR".to_string(),
        patient_segment: "PAT".to_string(),
    };
    let outcome = ParseSession::new().with_options(options).parse_text(feed);

    assert_eq!(outcome.messages.len(), 2);
    assert_eq!(outcome.stats.lines_discarded, 1);
    assert_eq!(outcome.messages[0].facility, "FAC");
    assert_eq!(outcome.messages[0].patient_id(), "P77");
    assert_eq!(outcome.messages[0].first_name(), "Jane");
}

#[test]
fn test_parse_file() {
    let temp_file = create_temp_file(&create_test_feed());
    let outcome = ParseSession::new().parse_file(temp_file.path()).unwrap();

    assert_eq!(outcome.messages.len(), 3);
    assert_eq!(outcome.messages[1].patient_id(), "H000004936");
}

#[test]
fn test_parse_missing_file_is_empty() {
    let mut session = ParseSession::starting_at(42);
    let outcome = session
        .parse_file(std::path::Path::new("/nonexistent/feed.hl7"))
        .unwrap();

    assert!(outcome.messages.is_empty());
    assert_eq!(outcome.next_id, 42);
    assert_eq!(outcome.stats, crate::parser::ParseStats::default());
}

#[test]
fn test_outcome_message_lookup() {
    let outcome = ParseSession::starting_at(10).parse_text(&create_test_feed());

    assert_eq!(outcome.message(11).map(|m| m.control_id.as_str()), Some("MSG00002"));
    assert!(outcome.message(1).is_none());
}
