//! HL7 Inspector Library
//!
//! A Rust library for parsing pipe-delimited clinical message feeds (HL7 v2
//! style) into an in-memory graph of messages, segments and fields, and for
//! relating those messages to a redacted counterpart feed.
//!
//! This library provides tools for:
//! - Splitting a feed into message records at each header segment
//! - Extracting header and patient summary values with graceful degradation
//! - Normalizing message timestamps with an explicit fallback marker
//! - Keying redacted records by ordinal and pairing them with parsed messages
//! - Masking patient fields, querying summaries and reporting field presence
//! - Keyed de-identification that gives each patient a stable pseudonym
//!
//! ```
//! use hl7_inspector::{ParseSession, RedactedBlocks, correlate};
//!
//! let feed = "MSH|^~\\&|APP|FAC|||20240115103000||ADT^A01|C1\nPID|1||P1||Smith^John\n";
//! let redacted = "MSH|^~\\&|APP|FAC|||20240115103000||ADT^A01|C1\nPID|1||**||**********\n";
//!
//! let outcome = ParseSession::new().parse_text(feed);
//! let blocks = RedactedBlocks::from_text(redacted);
//! let pairs = correlate::pair_by_ordinal(&outcome.messages, &blocks).unwrap();
//!
//! assert_eq!(pairs[0].message.last_name(), "Smith");
//! assert!(pairs[0].redacted.contains("**********"));
//! ```

pub mod config;
pub mod constants;
pub mod correlate;
pub mod deidentify;
pub mod error;
pub mod masking;
pub mod models;
pub mod parser;
pub mod query;
pub mod redacted;
pub mod report;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use config::InspectorConfig;
pub use deidentify::{Deidentifier, PseudonymKey};
pub use error::{Hl7Error, Result};
pub use models::{CanonicalTimestamp, Field, Message, PatientSummary, Segment};
pub use parser::{ParseOutcome, ParseSession, ParseStats};
pub use redacted::{RedactedBlocks, load_redacted};
