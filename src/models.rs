//! Core data structures for parsed message feeds.
//!
//! A parse produces an ordered list of [`Message`]s. Each message owns its
//! [`Segment`]s, each segment owns its [`Field`]s. Parent links are plain
//! owning indices (`message_id`, `segment_sequence`), never live references.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Canonical point in time derived from a header timestamp field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CanonicalTimestamp {
    /// The raw text was interpreted as a calendar-valid date/time
    Parsed(NaiveDateTime),

    /// The raw text could not be interpreted; `at` is the wall-clock time
    /// when normalization ran
    Defaulted { raw: String, at: NaiveDateTime },
}

impl CanonicalTimestamp {
    /// The point in time, whether parsed or defaulted
    pub fn value(&self) -> NaiveDateTime {
        match self {
            CanonicalTimestamp::Parsed(dt) => *dt,
            CanonicalTimestamp::Defaulted { at, .. } => *at,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, CanonicalTimestamp::Defaulted { .. })
    }
}

/// One pipe-delimited token within a segment
///
/// Positions count the tokens after the segment type. In the header segment
/// the field separator is itself field 1 in wire-format terms, so `MSH-3`
/// here holds what the wire format calls MSH-4 (sending facility) and
/// `MSH-9` holds MSH-10 (control id). Other segments line up directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// 1-based position among the tokens after the segment type
    pub position: usize,

    /// `{segment kind}-{position}`, e.g. `PID-5`
    pub label: String,

    /// Raw text, possibly empty
    pub value: String,

    /// Sequence number of the owning segment
    pub segment_sequence: usize,
}

/// One source line within a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Segment type code (first token of the line)
    pub kind: String,

    /// 0-based position within the owning message
    pub sequence: usize,

    /// Identifier of the owning message
    pub message_id: u64,

    pub fields: Vec<Field>,
}

impl Segment {
    /// Look up a field by its 1-based position
    pub fn field(&self, position: usize) -> Option<&Field> {
        position
            .checked_sub(1)
            .and_then(|index| self.fields.get(index))
    }

    /// Raw value of a field, or `None` when the segment is too short
    pub fn value(&self, position: usize) -> Option<&str> {
        self.field(position).map(|f| f.value.as_str())
    }

    /// Rebuild the source line this segment was parsed from
    pub fn to_line(&self) -> String {
        let mut line = self.kind.clone();
        for field in &self.fields {
            line.push(crate::constants::FIELD_DELIMITER);
            line.push_str(&field.value);
        }
        line
    }
}

/// Patient fields recovered from the patient identification segment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub patient_id: String,
    pub last_name: String,
    pub first_name: Option<String>,
    pub account_number: String,
}

/// Flags recording where parsing degraded to default values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDiagnostics {
    /// Header timestamp could not be interpreted and was defaulted to now
    pub timestamp_defaulted: bool,

    /// Header line was too short to hold every summary field
    pub short_header: bool,

    /// A patient segment was too short to hold every summary field
    pub short_patient_segment: bool,
}

impl MessageDiagnostics {
    pub fn is_clean(&self) -> bool {
        !(self.timestamp_defaulted || self.short_header || self.short_patient_segment)
    }
}

/// One parsed message record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Identifier assigned in parse order
    pub id: u64,

    /// Source lines of the record, each followed by a newline
    pub raw: String,

    pub timestamp: CanonicalTimestamp,
    pub raw_timestamp: String,
    pub facility: String,
    pub message_type: String,
    pub control_id: String,
    pub patient: Option<PatientSummary>,
    pub segments: Vec<Segment>,
    pub diagnostics: MessageDiagnostics,
}

impl Message {
    /// Header segment (always the first segment)
    pub fn header(&self) -> Option<&Segment> {
        self.segments.first()
    }

    /// All segments of the given type, in source order
    pub fn segments_of<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Segment> + 'a {
        self.segments.iter().filter(move |s| s.kind == kind)
    }

    /// Find a field by its label in the first segment of that type
    pub fn field_by_label(&self, label: &str) -> Option<&Field> {
        let (kind, _) = label.split_once('-')?;
        self.segments
            .iter()
            .find(|segment| segment.kind == kind)
            .and_then(|segment| segment.fields.iter().find(|f| f.label == label))
    }

    pub fn patient_id(&self) -> &str {
        self.patient
            .as_ref()
            .map(|p| p.patient_id.as_str())
            .unwrap_or("")
    }

    pub fn last_name(&self) -> &str {
        self.patient
            .as_ref()
            .map(|p| p.last_name.as_str())
            .unwrap_or("")
    }

    pub fn first_name(&self) -> &str {
        self.patient
            .as_ref()
            .and_then(|p| p.first_name.as_deref())
            .unwrap_or("")
    }

    /// Rebuild the raw text from the segments
    pub fn reconstruct(&self) -> String {
        let mut text = String::with_capacity(self.raw.len());
        for segment in &self.segments {
            text.push_str(&segment.to_line());
            text.push('\n');
        }
        text
    }
}
