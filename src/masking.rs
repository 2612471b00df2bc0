//! Patient field masking for redacted counterpart feeds
//!
//! Rewrites a feed line by line, replacing selected patient segment fields
//! with mask characters of the same length. Every line is kept, so the
//! output partitions into the same records as the input and stays in ordinal
//! correspondence with it.

use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

use crate::config::InspectorConfig;
use crate::constants::{
    DEFAULT_MASKED_PATIENT_FIELDS, FIELD_DELIMITER, HEADER_SEGMENT, MASK_CHAR, PATIENT_SEGMENT,
};
use crate::error::{Hl7Error, Result};
use crate::parser::boundary::{BoundaryTracker, LineClass};

/// Masks configured fields of patient segments
#[derive(Debug, Clone)]
pub struct PatientMasker {
    sentinel: String,
    patient_segment: String,
    fields: BTreeSet<usize>,
}

/// Result of masking a feed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MaskOutcome {
    /// Masked feed, one `\n`-terminated line per input line
    #[serde(skip)]
    pub text: String,

    /// Records found in the input
    pub messages: usize,

    /// Patient segment lines that had at least one field masked
    pub lines_masked: usize,

    /// Individual field values replaced
    pub fields_masked: usize,
}

impl Default for PatientMasker {
    fn default() -> Self {
        Self::new(DEFAULT_MASKED_PATIENT_FIELDS.iter().copied())
    }
}

impl PatientMasker {
    /// Mask the given PID field numbers using the default segment codes
    pub fn new(fields: impl IntoIterator<Item = usize>) -> Self {
        Self {
            sentinel: HEADER_SEGMENT.to_string(),
            patient_segment: PATIENT_SEGMENT.to_string(),
            fields: fields.into_iter().collect(),
        }
    }

    pub fn from_config(config: &InspectorConfig) -> Self {
        Self {
            sentinel: config.sentinel.clone(),
            patient_segment: config.patient_segment.clone(),
            fields: config.masked_patient_fields.iter().copied().collect(),
        }
    }

    /// Field numbers this masker replaces
    pub fn fields(&self) -> impl Iterator<Item = usize> + '_ {
        self.fields.iter().copied()
    }

    /// Mask one line, returning the line and the number of fields replaced.
    ///
    /// Lines of any other segment type come back unchanged.
    pub fn mask_line(&self, line: &str) -> (String, usize) {
        let mut tokens: Vec<String> = line.split(FIELD_DELIMITER).map(str::to_string).collect();
        if tokens.first().map(String::as_str) != Some(self.patient_segment.as_str()) {
            return (line.to_string(), 0);
        }

        let mut masked = 0;
        for &field in &self.fields {
            if let Some(value) = tokens.get_mut(field).filter(|v| !v.is_empty()) {
                *value = mask(value);
                masked += 1;
            }
        }

        let separator = FIELD_DELIMITER.to_string();
        (tokens.join(separator.as_str()), masked)
    }

    /// Mask a complete feed
    pub fn mask_text(&self, text: &str) -> MaskOutcome {
        let mut outcome = MaskOutcome::default();
        let mut tracker = BoundaryTracker::new(&self.sentinel);

        for line in text.lines() {
            let output = match tracker.classify(line) {
                LineClass::Preamble => line.to_string(),
                LineClass::Opens { .. } | LineClass::Continues => {
                    let (masked_line, masked) = self.mask_line(line);
                    if masked > 0 {
                        outcome.lines_masked += 1;
                        outcome.fields_masked += masked;
                    }
                    masked_line
                }
            };
            outcome.text.push_str(&output);
            outcome.text.push('\n');
        }

        outcome.messages = tracker.records_opened();
        debug!(
            "Masked {} fields on {} lines across {} messages",
            outcome.fields_masked, outcome.lines_masked, outcome.messages
        );
        outcome
    }

    /// Mask `input` and write the result to `output`
    pub fn mask_file(&self, input: &Path, output: &Path) -> Result<MaskOutcome> {
        info!("Masking {} -> {}", input.display(), output.display());

        let content = read_feed(input)?;
        let outcome = self.mask_text(&content);
        write_feed(output, &outcome.text)?;

        info!(
            "Wrote {} messages with {} masked fields",
            outcome.messages, outcome.fields_masked
        );
        Ok(outcome)
    }
}

/// Read a feed that must exist
pub(crate) fn read_feed(input: &Path) -> Result<String> {
    std::fs::read_to_string(input).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Hl7Error::SourceNotFound {
                path: input.to_path_buf(),
            }
        } else {
            Hl7Error::io(format!("Failed to read {}", input.display()), e)
        }
    })
}

/// Write a rewritten feed, creating the parent directory if needed
pub(crate) fn write_feed(output: &Path, text: &str) -> Result<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            Hl7Error::io(format!("Failed to create directory {}", parent.display()), e)
        })?;
    }
    std::fs::write(output, text)
        .map_err(|e| Hl7Error::io(format!("Failed to write {}", output.display()), e))
}

fn mask(value: &str) -> String {
    std::iter::repeat_n(MASK_CHAR, value.chars().count()).collect()
}
