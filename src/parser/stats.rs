//! Parsing statistics and result structures
//!
//! Counters describing a single parse pass and the outcome type returned to
//! callers.

use crate::models::Message;
use serde::{Deserialize, Serialize};

/// Messages produced by a parse pass together with its statistics
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    /// Parsed messages in discovery order
    pub messages: Vec<Message>,

    /// Identifier the next message would receive
    pub next_id: u64,

    pub stats: ParseStats,
}

impl ParseOutcome {
    /// Outcome for an input with no content
    pub fn empty(next_id: u64) -> Self {
        Self {
            messages: Vec::new(),
            next_id,
            stats: ParseStats::new(),
        }
    }

    /// Find a message by identifier
    pub fn message(&self, id: u64) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }
}

/// Simple parsing statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    /// Total number of lines read
    pub lines_read: usize,

    /// Lines before the first header that belong to no message
    pub lines_discarded: usize,

    /// Number of messages produced
    pub messages: usize,

    /// Number of segments across all messages
    pub segments: usize,

    /// Messages whose timestamp fell back to the current time
    pub timestamps_defaulted: usize,

    /// Messages with a header or patient segment too short for extraction
    pub short_records: usize,

    /// Messages with any diagnostic flag set
    pub degraded_messages: usize,
}

impl ParseStats {
    /// Create new empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Share of messages parsed without any degradation, as a percentage
    pub fn clean_rate(&self) -> f64 {
        if self.messages == 0 {
            return 100.0;
        }
        let clean = self.messages.saturating_sub(self.degraded_messages);
        (clean as f64 / self.messages as f64) * 100.0
    }
}
