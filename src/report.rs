//! Field presence reporting
//!
//! Counts, for a list of field labels, how many messages carry a non-empty
//! value in that field. The first segment of a kind uses plain labels
//! (`PID-3`); later repeats are numbered (`OBX#2-1`, `OBX#3-1`).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use crate::models::Message;

/// Values made only of whitespace and component separators carry no data
static RE_BLANK_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\s^]*$").unwrap());

/// Whether a field value counts as empty
pub fn is_blank_value(value: &str) -> bool {
    RE_BLANK_VALUE.is_match(value)
}

/// Label to value map for one message, numbering repeated segments
pub fn labelled_values(message: &Message) -> HashMap<String, &str> {
    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    let mut values = HashMap::new();

    for segment in &message.segments {
        let count = occurrences.entry(segment.kind.as_str()).or_insert(0);
        *count += 1;

        for field in &segment.fields {
            let label = if *count == 1 {
                field.label.clone()
            } else {
                format!("{}#{}-{}", segment.kind, count, field.position)
            };
            values.insert(label, field.value.as_str());
        }
    }

    values
}

/// Presence counts for a set of field labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldPresenceReport {
    /// `(label, messages with a non-empty value)` in request order
    pub counts: Vec<(String, usize)>,

    /// Ids of messages with at least one requested field present
    pub matching_ids: Vec<u64>,

    pub total_messages: usize,
}

impl FieldPresenceReport {
    /// Build the report over `messages` for the requested `labels`
    pub fn build<S: AsRef<str>>(messages: &[Message], labels: &[S]) -> Self {
        let mut counts: Vec<(String, usize)> = labels
            .iter()
            .map(|label| (label.as_ref().to_string(), 0))
            .collect();
        let mut matching_ids = Vec::new();

        for message in messages {
            let values = labelled_values(message);
            let mut any = false;

            for (label, count) in counts.iter_mut() {
                let present = values
                    .get(label.as_str())
                    .is_some_and(|value| !is_blank_value(value));
                if present {
                    *count += 1;
                    any = true;
                }
            }

            if any {
                matching_ids.push(message.id);
            }
        }

        debug!(
            "Presence report: {} of {} messages carry requested fields",
            matching_ids.len(),
            messages.len()
        );

        Self {
            counts,
            matching_ids,
            total_messages: messages.len(),
        }
    }

    /// Number of messages with at least one requested field present
    pub fn messages_with_any(&self) -> usize {
        self.matching_ids.len()
    }

    /// Count for a single label, if it was requested
    pub fn count(&self, label: &str) -> Option<usize> {
        self.counts
            .iter()
            .find(|(requested, _)| requested == label)
            .map(|(_, count)| *count)
    }
}
