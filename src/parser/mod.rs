//! Message parser for pipe-delimited clinical message feeds
//!
//! Turns a flat text feed into an ordered list of [`Message`]s, each owning
//! its segments and fields, with key header and patient values extracted
//! into a flat summary.
//!
//! ## Architecture
//!
//! - [`boundary`] - Sentinel-driven record boundary detection (shared with
//!   the redacted block store)
//! - [`session`] - Parse orchestration and identifier assignment
//! - [`summary`] - Header and patient field extraction
//! - [`timestamp`] - Header timestamp normalization
//! - [`stats`] - Parsing statistics and result structures
//!
//! ## Usage
//!
//! ```rust
//! use hl7_inspector::parser::ParseSession;
//!
//! let feed = "MSH|^~\\&|ADT1|FAC1|LAB|FAC2|20240115103000||ADT^A01|MSG1|P|2.5\n\
//!             PID|1||H0001||Smith^John\n";
//! let mut session = ParseSession::new();
//! let outcome = session.parse_text(feed);
//!
//! assert_eq!(outcome.messages.len(), 1);
//! assert_eq!(outcome.messages[0].last_name(), "Smith");
//! assert_eq!(outcome.next_id, 2);
//! ```

pub mod boundary;
pub mod session;
pub mod stats;
pub mod summary;
pub mod timestamp;

#[cfg(test)]
mod tests;

use std::path::Path;

use crate::error::Result;
use crate::models::Message;

pub use boundary::{BoundaryTracker, LineClass, is_sentinel_line};
pub use session::{ParseSession, ParserOptions};
pub use stats::{ParseOutcome, ParseStats};
pub use timestamp::{normalize, normalize_with_clock};

/// Parse a block of text with a fresh session
pub fn parse_text(text: &str) -> Vec<Message> {
    ParseSession::new().parse_text(text).messages
}

/// Parse a file with a fresh session; a missing file yields no messages
pub fn parse_file(path: &Path) -> Result<Vec<Message>> {
    Ok(ParseSession::new().parse_file(path)?.messages)
}
