//! Core message parser implementation
//!
//! A [`ParseSession`] owns the identifier counter for the messages it
//! produces. Numbering is a pure function of the input and the session's
//! starting identifier; continuing a session across several inputs keeps
//! numbering contiguous.

use chrono::NaiveDateTime;
use std::path::Path;
use tracing::{debug, info, warn};

use super::boundary::{BoundaryTracker, LineClass};
use super::stats::{ParseOutcome, ParseStats};
use super::summary::{extract_header, extract_patient};
use super::timestamp::{local_now, normalize_with_clock};
use crate::config::InspectorConfig;
use crate::constants::{
    DEFAULT_FIRST_MESSAGE_ID, FIELD_DELIMITER, HEADER_SEGMENT, PATIENT_SEGMENT,
};
use crate::error::{Hl7Error, Result};
use crate::models::{Field, Message, MessageDiagnostics, Segment};

/// Segment codes that drive record splitting and summary extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    /// Segment type that opens a message
    pub sentinel: String,

    /// Segment type carrying patient identification
    pub patient_segment: String,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            sentinel: HEADER_SEGMENT.to_string(),
            patient_segment: PATIENT_SEGMENT.to_string(),
        }
    }
}

impl From<&InspectorConfig> for ParserOptions {
    fn from(config: &InspectorConfig) -> Self {
        Self {
            sentinel: config.sentinel.clone(),
            patient_segment: config.patient_segment.clone(),
        }
    }
}

/// Parser state carried between parse calls
#[derive(Debug, Clone)]
pub struct ParseSession {
    options: ParserOptions,
    next_id: u64,
    clock: fn() -> NaiveDateTime,
}

impl Default for ParseSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ParseSession {
    /// Create a session whose first message gets the default identifier
    pub fn new() -> Self {
        Self::starting_at(DEFAULT_FIRST_MESSAGE_ID)
    }

    /// Create a session whose first message gets `first_id`
    pub fn starting_at(first_id: u64) -> Self {
        Self {
            options: ParserOptions::default(),
            next_id: first_id,
            clock: local_now,
        }
    }

    /// Create a session from loaded configuration
    pub fn from_config(config: &InspectorConfig) -> Self {
        Self::starting_at(config.first_message_id).with_options(ParserOptions::from(config))
    }

    /// Configure segment codes
    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the clock used for timestamp fallbacks
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    /// Identifier the next parsed message will receive
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Parse a complete block of text
    pub fn parse_text(&mut self, text: &str) -> ParseOutcome {
        self.parse_lines(text.lines())
    }

    /// Parse a file, returning an empty outcome when it does not exist
    pub fn parse_file(&mut self, path: &Path) -> Result<ParseOutcome> {
        info!("Parsing message file: {}", path.display());

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Message file not found: {}", path.display());
                return Ok(ParseOutcome::empty(self.next_id));
            }
            Err(e) => {
                return Err(Hl7Error::io(
                    format!("Failed to read file {}", path.display()),
                    e,
                ));
            }
        };

        let outcome = self.parse_text(&content);
        info!(
            "Parsed {} messages ({} segments) from {} lines",
            outcome.stats.messages, outcome.stats.segments, outcome.stats.lines_read
        );
        Ok(outcome)
    }

    /// Parse an ordered sequence of lines
    pub fn parse_lines<I, S>(&mut self, lines: I) -> ParseOutcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut stats = ParseStats::new();
        let mut messages = Vec::new();
        let mut tracker = BoundaryTracker::new(&self.options.sentinel);
        let mut current: Option<MessageBuilder> = None;

        for line in lines {
            let line = line.as_ref();
            stats.lines_read += 1;

            match tracker.classify(line) {
                LineClass::Preamble => {
                    stats.lines_discarded += 1;
                    continue;
                }
                LineClass::Opens { ordinal } => {
                    if let Some(builder) = current.take() {
                        messages.push(builder.finish(&mut stats));
                    }
                    let id = self.next_id;
                    self.next_id += 1;
                    debug!("Opening message {} (record {})", id, ordinal);
                    current = Some(MessageBuilder::open(id, line, &self.options, self.clock));
                }
                LineClass::Continues => {
                    if let Some(builder) = current.as_mut() {
                        builder.push_line(line, &self.options);
                    }
                }
            }
        }

        if let Some(builder) = current.take() {
            messages.push(builder.finish(&mut stats));
        }

        if stats.lines_discarded > 0 {
            debug!(
                "Discarded {} lines before the first '{}' segment",
                stats.lines_discarded, self.options.sentinel
            );
        }
        if stats.timestamps_defaulted > 0 {
            warn!(
                "{} of {} messages had unparseable timestamps and were defaulted to now",
                stats.timestamps_defaulted, stats.messages
            );
        }

        ParseOutcome {
            messages,
            next_id: self.next_id,
            stats,
        }
    }
}

/// Accumulates the lines of one open message
struct MessageBuilder {
    message: Message,
}

impl MessageBuilder {
    /// Start a message from its header line
    fn open(
        id: u64,
        header_line: &str,
        options: &ParserOptions,
        clock: fn() -> NaiveDateTime,
    ) -> Self {
        let tokens: Vec<&str> = header_line.split(FIELD_DELIMITER).collect();
        let header = extract_header(&tokens);
        let timestamp = normalize_with_clock(&header.raw_timestamp, clock);
        let diagnostics = MessageDiagnostics {
            timestamp_defaulted: timestamp.is_defaulted(),
            short_header: header.short,
            short_patient_segment: false,
        };

        let mut builder = Self {
            message: Message {
                id,
                raw: String::new(),
                timestamp,
                raw_timestamp: header.raw_timestamp,
                facility: header.facility,
                message_type: header.message_type,
                control_id: header.control_id,
                patient: None,
                segments: Vec::new(),
                diagnostics,
            },
        };
        builder.push_line(header_line, options);
        builder
    }

    /// Append a line to the message as its next segment
    fn push_line(&mut self, line: &str, options: &ParserOptions) {
        let tokens: Vec<&str> = line.split(FIELD_DELIMITER).collect();
        let Some((kind, values)) = tokens.split_first() else {
            return;
        };

        let message = &mut self.message;
        message.raw.push_str(line);
        message.raw.push('\n');

        let sequence = message.segments.len();
        if sequence > 0 && *kind == options.patient_segment {
            // Later patient segments overwrite earlier ones
            let (patient, short) = extract_patient(&tokens);
            message.patient = Some(patient);
            message.diagnostics.short_patient_segment = short;
        }

        let fields = values
            .iter()
            .enumerate()
            .map(|(index, value)| Field {
                position: index + 1,
                label: format!("{}-{}", kind, index + 1),
                value: value.to_string(),
                segment_sequence: sequence,
            })
            .collect();

        message.segments.push(Segment {
            kind: kind.to_string(),
            sequence,
            message_id: message.id,
            fields,
        });
    }

    fn finish(self, stats: &mut ParseStats) -> Message {
        let message = self.message;
        let diagnostics = message.diagnostics;

        stats.messages += 1;
        stats.segments += message.segments.len();
        if diagnostics.timestamp_defaulted {
            stats.timestamps_defaulted += 1;
        }
        if diagnostics.short_header || diagnostics.short_patient_segment {
            stats.short_records += 1;
        }
        if !diagnostics.is_clean() {
            stats.degraded_messages += 1;
        }

        message
    }
}
