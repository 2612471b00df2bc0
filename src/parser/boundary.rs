//! Message boundary detection
//!
//! A record starts at every line whose first pipe-delimited token equals the
//! sentinel segment code and runs until the next sentinel line or the end of
//! input. Both the message parser and the redacted block store drive their
//! accumulation from the same [`BoundaryTracker`].

use crate::constants::FIELD_DELIMITER;

/// How a line relates to the record structure of its input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    /// Line precedes the first sentinel line and belongs to no record
    Preamble,

    /// Sentinel line: closes the open record (if any) and opens record
    /// number `ordinal` (1-based)
    Opens { ordinal: usize },

    /// Line continues the currently open record
    Continues,
}

/// Check whether a line's leading token equals the sentinel
pub fn is_sentinel_line(line: &str, sentinel: &str) -> bool {
    line.split(FIELD_DELIMITER).next() == Some(sentinel)
}

/// Stateful classifier for a single pass over an input
#[derive(Debug, Clone)]
pub struct BoundaryTracker<'s> {
    sentinel: &'s str,
    records_opened: usize,
}

impl<'s> BoundaryTracker<'s> {
    pub fn new(sentinel: &'s str) -> Self {
        Self {
            sentinel,
            records_opened: 0,
        }
    }

    /// Classify the next line of input
    pub fn classify(&mut self, line: &str) -> LineClass {
        if is_sentinel_line(line, self.sentinel) {
            self.records_opened += 1;
            LineClass::Opens {
                ordinal: self.records_opened,
            }
        } else if self.records_opened == 0 {
            LineClass::Preamble
        } else {
            LineClass::Continues
        }
    }

    /// Whether a record is currently open
    pub fn is_open(&self) -> bool {
        self.records_opened > 0
    }

    /// Number of sentinel lines seen so far
    pub fn records_opened(&self) -> usize {
        self.records_opened
    }
}
