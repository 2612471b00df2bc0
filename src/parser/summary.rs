//! Summary field extraction from header and patient segments
//!
//! Lines are passed as their pipe-split tokens, segment type included at
//! index 0. Absent fields become empty strings and set the `short` flag.

use crate::constants::{COMPONENT_DELIMITER, header_fields, patient_fields};
use crate::models::PatientSummary;

/// Summary values taken from the header line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSummary {
    pub facility: String,
    pub raw_timestamp: String,
    pub message_type: String,
    pub control_id: String,

    /// Line ended before the last summary field
    pub short: bool,
}

/// Header field MSH-n lives at token index n-1: the field separator is
/// MSH-1 and is consumed by the split.
fn header_token<'a>(tokens: &[&'a str], field: usize) -> Option<&'a str> {
    tokens.get(field - 1).copied()
}

/// Every other segment numbers fields from the first token after its type.
fn segment_token<'a>(tokens: &[&'a str], field: usize) -> Option<&'a str> {
    tokens.get(field).copied()
}

/// Extract facility, timestamp, message type and control id from a header
pub fn extract_header(tokens: &[&str]) -> HeaderSummary {
    let get = |field| header_token(tokens, field).unwrap_or("").to_string();

    HeaderSummary {
        facility: get(header_fields::FACILITY),
        raw_timestamp: get(header_fields::TIMESTAMP),
        message_type: get(header_fields::MESSAGE_TYPE),
        control_id: get(header_fields::CONTROL_ID),
        short: header_token(tokens, header_fields::CONTROL_ID).is_none(),
    }
}

/// Extract patient id, name and account number from a patient segment.
///
/// Returns the summary and whether the segment was too short to hold
/// every field.
pub fn extract_patient(tokens: &[&str]) -> (PatientSummary, bool) {
    let get = |field| segment_token(tokens, field).unwrap_or("");
    let (last_name, first_name) = split_name(get(patient_fields::NAME));

    let summary = PatientSummary {
        patient_id: get(patient_fields::PATIENT_ID).to_string(),
        last_name,
        first_name,
        account_number: get(patient_fields::ACCOUNT_NUMBER).to_string(),
    };
    let short = segment_token(tokens, patient_fields::ACCOUNT_NUMBER).is_none();

    (summary, short)
}

/// Split a composite name once on the component delimiter
pub fn split_name(value: &str) -> (String, Option<String>) {
    match value.split_once(COMPONENT_DELIMITER) {
        Some((last, first)) => (last.to_string(), Some(first.to_string())),
        None => (value.to_string(), None),
    }
}
