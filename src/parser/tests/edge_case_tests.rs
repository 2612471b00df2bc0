//! Tests for malformed and unusual input

use super::*;
use crate::parser::{ParseSession, parse_text};

#[test]
fn test_content_before_first_header_is_discarded() {
    let feed = "FHS|batch header\nBHS|x\nMSH|^~\\&|A|FAC|||20240101||ADT^A01|C1\nPID|1||P1\n";
    let outcome = ParseSession::new().parse_text(feed);

    assert_eq!(outcome.messages.len(), 1);
    assert_eq!(outcome.stats.lines_discarded, 2);
    assert!(outcome.messages[0].raw.starts_with("MSH|"));
    assert_eq!(outcome.messages[0].segments.len(), 2);
}

#[test]
fn test_input_without_header_yields_nothing() {
    let outcome = ParseSession::new().parse_text("PID|1||P1\nPV1|1|I\n");

    assert!(outcome.messages.is_empty());
    assert_eq!(outcome.stats.lines_discarded, 2);
    assert_eq!(outcome.next_id, 1);
}

#[test]
fn test_empty_input() {
    assert!(parse_text("").is_empty());
}

#[test]
fn test_consecutive_delimiters_keep_empty_fields() {
    let messages = parse_text("MSH|^~\\&||||||||\nNTE||||\n");
    let note = &messages[0].segments[1];

    assert_eq!(note.kind, "NTE");
    assert_eq!(note.fields.len(), 4);
    assert!(note.fields.iter().all(|f| f.value.is_empty()));
}

#[test]
fn test_blank_line_inside_message_is_a_segment() {
    let messages = parse_text("MSH|^~\\&|A|F\n\nPID|1||P1\n");
    let message = &messages[0];

    assert_eq!(message.segments.len(), 3);
    assert_eq!(message.segments[1].kind, "");
    assert!(message.segments[1].fields.is_empty());
    assert_eq!(message.segments[2].sequence, 2);
    assert_eq!(message.raw, "MSH|^~\\&|A|F\n\nPID|1||P1\n");
}

#[test]
fn test_short_header_degrades_to_empty_values() {
    let messages = parse_text("MSH|^~\\&|A\n");
    let message = &messages[0];

    assert_eq!(message.facility, "");
    assert_eq!(message.raw_timestamp, "");
    assert_eq!(message.message_type, "");
    assert_eq!(message.control_id, "");
    assert!(message.diagnostics.short_header);
    assert!(message.diagnostics.timestamp_defaulted);
    assert!(message.patient.is_none());
}

#[test]
fn test_last_patient_segment_wins() {
    let feed = "MSH|^~\\&|A|F|||20240101||ADT^A01|C1\nPID|1||FIRST||Early^Bird\nPID|1||SECOND||Late^Comer\n";
    let messages = parse_text(feed);
    let patient = messages[0].patient.as_ref().unwrap();

    assert_eq!(patient.patient_id, "SECOND");
    assert_eq!(patient.last_name, "Late");
    assert_eq!(patient.first_name.as_deref(), Some("Comer"));
}

#[test]
fn test_patient_identifier_kept_verbatim() {
    let feed = "MSH|^~\\&|A|F|||20240101||ADT^A01|C1\nPID|1||12345^^^HOSP^MR~678^^^HOSP^AN\n";
    let messages = parse_text(feed);

    assert_eq!(messages[0].patient_id(), "12345^^^HOSP^MR~678^^^HOSP^AN");
}

#[test]
fn test_segment_type_prefix_is_not_a_header() {
    let feed = "MSH|^~\\&|A|F\nMSHX|not a header\nMSH|^~\\&|B|G\n";
    let messages = parse_text(feed);

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].segments[1].kind, "MSHX");
}

#[test]
fn test_crlf_line_endings() {
    let feed = "MSH|^~\\&|A|FAC|||20240101||ADT^A01|C1\r\nPID|1||P1\r\n";
    let messages = parse_text(feed);

    assert_eq!(messages[0].control_id, "C1");
    assert_eq!(messages[0].patient_id(), "P1");
    assert_eq!(messages[0].raw, "MSH|^~\\&|A|FAC|||20240101||ADT^A01|C1\nPID|1||P1\n");
}

#[test]
fn test_header_only_messages() {
    let feed = "MSH|a\nMSH|b\nMSH|c\n";
    let messages = parse_text(feed);

    assert_eq!(messages.len(), count_sentinels(feed));
    assert!(messages.iter().all(|m| m.segments.len() == 1));
}

#[test]
fn test_lines_from_iterator_of_strings() {
    let lines: Vec<String> = create_test_feed().lines().map(String::from).collect();
    let outcome = ParseSession::new().parse_lines(lines);

    assert_eq!(outcome.messages.len(), 3);
}
