//! Error handling for message parsing and correlation.
//!
//! Malformed message content never produces an error; these variants cover
//! I/O failures, configuration problems, and correlation preconditions.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Hl7Error {
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Source not found at path: {path}")]
    SourceNotFound { path: PathBuf },

    #[error(
        "Ordinal correlation failed: {primary} parsed messages but {redacted} redacted blocks"
    )]
    OrdinalMismatch { primary: usize, redacted: usize },

    #[error("Duplicate control id '{control_id}' in {stream} stream")]
    DuplicateControlId { control_id: String, stream: String },

    #[error("Message not found: id = {id}")]
    MessageNotFound { id: u64 },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl Hl7Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a duplicate control id error
    pub fn duplicate_control_id(control_id: impl Into<String>, stream: impl Into<String>) -> Self {
        Self::DuplicateControlId {
            control_id: control_id.into(),
            stream: stream.into(),
        }
    }
}

impl From<std::io::Error> for Hl7Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

pub type Result<T> = std::result::Result<T, Hl7Error>;
