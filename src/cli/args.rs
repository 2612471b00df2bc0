//! Command-line argument definitions for the HL7 inspector
//!
//! This module defines the CLI interface using the clap derive API. Global
//! options (configuration file and verbosity) apply to every subcommand.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::query::{SortKey, SortOrder};

/// CLI arguments for the HL7 inspector
///
/// Parses pipe-delimited clinical message feeds into messages, segments and
/// fields, and correlates them with redacted counterpart feeds.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "hl7-inspector",
    version,
    about = "Inspect pipe-delimited clinical message feeds and their redacted counterparts",
    long_about = "Parses HL7 v2 style feeds into a queryable structure of messages, segments \
                  and fields. Lists and filters message summaries, shows individual messages \
                  field by field, produces masked counterpart files, reports field presence, \
                  and pairs records between a feed and its redacted copy."
)]
pub struct Args {
    /// Path to configuration file
    ///
    /// TOML configuration file. If not specified, the HL7_INSPECTOR_CONFIG
    /// environment variable is used, then the user config directory.
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        global = true,
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress log output except errors
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        conflicts_with = "verbose",
        help = "Suppress log output except errors"
    )]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// List message summaries, sorted and paginated
    Summary(SummaryArgs),
    /// Show one message with its segments and field labels
    Show(ShowArgs),
    /// List messages for one patient at one facility
    Patient(PatientArgs),
    /// Write a copy of a feed with patient fields masked
    Redact(RedactArgs),
    /// Write a copy of a feed with patients replaced by stable pseudonyms
    Deidentify(DeidentifyArgs),
    /// Count messages carrying selected fields
    Presence(PresenceArgs),
    /// Pair messages of a feed with records of its redacted counterpart
    Correlate(CorrelateArgs),
}

/// Arguments for the summary command
#[derive(Debug, Clone, Parser)]
pub struct SummaryArgs {
    /// Message feed to parse
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Column to sort by
    #[arg(
        short = 's',
        long = "sort",
        value_name = "KEY",
        default_value = "id",
        help = "Sort by id, timestamp, patient_id, last_name, first_name, facility or message_type"
    )]
    pub sort: SortKey,

    /// Sort in descending order
    #[arg(long = "desc")]
    pub descending: bool,

    /// Page to display (1-based)
    #[arg(short = 'p', long = "page", value_name = "N", default_value_t = 1)]
    pub page: usize,

    /// Rows per page (defaults to the configured page size)
    #[arg(long = "per-page", value_name = "N")]
    pub per_page: Option<usize>,

    #[arg(long = "format", value_enum, default_value = "human")]
    pub output_format: OutputFormat,
}

impl SummaryArgs {
    pub fn sort_order(&self) -> SortOrder {
        if self.descending {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        }
    }
}

/// Arguments for the show command
#[derive(Debug, Clone, Parser)]
pub struct ShowArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Message id as assigned by the parser
    #[arg(long = "id", value_name = "N")]
    pub id: u64,

    #[arg(long = "format", value_enum, default_value = "human")]
    pub output_format: OutputFormat,
}

/// Arguments for the patient command
#[derive(Debug, Clone, Parser)]
pub struct PatientArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Patient identifier (PID-3), matched exactly
    #[arg(long = "patient-id", value_name = "ID")]
    pub patient_id: String,

    /// Sending facility (MSH-4), matched exactly
    #[arg(long = "facility", value_name = "FACILITY")]
    pub facility: String,

    #[arg(long = "format", value_enum, default_value = "human")]
    pub output_format: OutputFormat,
}

/// Arguments for the redact command
#[derive(Debug, Clone, Parser)]
pub struct RedactArgs {
    /// Feed to mask
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Destination for the masked feed
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: PathBuf,

    /// Patient fields to mask (overrides configuration)
    #[arg(long = "field", value_name = "N", value_delimiter = ',')]
    pub fields: Vec<usize>,
}

/// Arguments for the deidentify command
#[derive(Debug, Clone, Parser)]
pub struct DeidentifyArgs {
    /// Feed to de-identify
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Destination for the de-identified feed
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: PathBuf,

    /// Secret for keyed pseudonyms
    ///
    /// Falls back to the HL7_INSPECTOR_SECRET environment variable. Without
    /// a secret, pseudonyms are plain SHA-256 derivations and can be
    /// recomputed by anyone holding the original identifiers.
    #[arg(long = "secret", value_name = "KEY")]
    pub secret: Option<String>,

    #[arg(long = "format", value_enum, default_value = "human")]
    pub output_format: OutputFormat,
}

/// Arguments for the presence command
#[derive(Debug, Clone, Parser)]
pub struct PresenceArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Field labels to check, e.g. PID-3 or OBX#2-5 (defaults to configuration).
    /// Labels count tokens after the segment type, so header labels are one
    /// below wire-format numbering (MSH-3 is the sending facility)
    #[arg(short = 'f', long = "field", value_name = "LABEL")]
    pub fields: Vec<String>,

    /// Also print the ids of matching messages
    #[arg(long = "list")]
    pub list_matches: bool,

    #[arg(long = "format", value_enum, default_value = "human")]
    pub output_format: OutputFormat,
}

/// Arguments for the correlate command
#[derive(Debug, Clone, Parser)]
pub struct CorrelateArgs {
    /// Original feed
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Redacted counterpart feed
    #[arg(value_name = "REDACTED")]
    pub redacted: PathBuf,

    /// Pairing strategy
    #[arg(long = "by", value_enum, default_value = "ordinal")]
    pub strategy: CorrelateBy,

    #[arg(long = "format", value_enum, default_value = "human")]
    pub output_format: OutputFormat,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
}

/// Record pairing strategies for the correlate command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CorrelateBy {
    /// Pair by record position; both feeds must hold the same number of records
    Ordinal,
    /// Pair by message control id (MSH-10)
    ControlId,
}

impl Args {
    /// Get log level based on verbosity settings
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_summary_defaults() {
        let args = parse(&["hl7-inspector", "summary", "feed.hl7"]);

        match args.command {
            Commands::Summary(summary) => {
                assert_eq!(summary.file, PathBuf::from("feed.hl7"));
                assert_eq!(summary.sort, SortKey::Id);
                assert_eq!(summary.sort_order(), SortOrder::Ascending);
                assert_eq!(summary.page, 1);
                assert_eq!(summary.per_page, None);
                assert_eq!(summary.output_format, OutputFormat::Human);
            }
            other => panic!("expected summary, got {:?}", other),
        }
    }

    #[test]
    fn test_summary_sorting_options() {
        let args = parse(&[
            "hl7-inspector",
            "summary",
            "feed.hl7",
            "--sort",
            "last-name",
            "--desc",
            "--page",
            "3",
            "--per-page",
            "10",
            "--format",
            "json",
        ]);

        match args.command {
            Commands::Summary(summary) => {
                assert_eq!(summary.sort, SortKey::LastName);
                assert_eq!(summary.sort_order(), SortOrder::Descending);
                assert_eq!(summary.page, 3);
                assert_eq!(summary.per_page, Some(10));
                assert_eq!(summary.output_format, OutputFormat::Json);
            }
            other => panic!("expected summary, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_sort_key_is_rejected() {
        let result = Args::try_parse_from(["hl7-inspector", "summary", "f", "--sort", "dob"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let args = parse(&["hl7-inspector", "show", "feed.hl7", "--id", "7", "-vv"]);

        assert_eq!(args.verbose, 2);
        assert_eq!(args.get_log_level(), "debug");
        assert!(matches!(args.command, Commands::Show(ShowArgs { id: 7, .. })));
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(parse(&["x", "show", "f", "--id", "1"]).get_log_level(), "warn");
        assert_eq!(parse(&["x", "-q", "show", "f", "--id", "1"]).get_log_level(), "error");
        assert_eq!(parse(&["x", "-v", "show", "f", "--id", "1"]).get_log_level(), "info");
        assert_eq!(parse(&["x", "-vvv", "show", "f", "--id", "1"]).get_log_level(), "trace");
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Args::try_parse_from(["x", "-q", "-v", "show", "f", "--id", "1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_correlate_and_redact_args() {
        let args = parse(&["x", "correlate", "a.hl7", "b.hl7", "--by", "control-id"]);
        match args.command {
            Commands::Correlate(correlate) => {
                assert_eq!(correlate.strategy, CorrelateBy::ControlId);
                assert_eq!(correlate.redacted, PathBuf::from("b.hl7"));
            }
            other => panic!("expected correlate, got {:?}", other),
        }

        let args = parse(&["x", "redact", "a.hl7", "-o", "out.hl7", "--field", "3,5"]);
        match args.command {
            Commands::Redact(redact) => {
                assert_eq!(redact.output, PathBuf::from("out.hl7"));
                assert_eq!(redact.fields, vec![3, 5]);
            }
            other => panic!("expected redact, got {:?}", other),
        }
    }

    #[test]
    fn test_deidentify_args() {
        let args = parse(&["x", "deidentify", "a.hl7", "-o", "out.hl7", "--secret", "k"]);
        match args.command {
            Commands::Deidentify(deid) => {
                assert_eq!(deid.input, PathBuf::from("a.hl7"));
                assert_eq!(deid.output, PathBuf::from("out.hl7"));
                assert_eq!(deid.secret.as_deref(), Some("k"));
                assert_eq!(deid.output_format, OutputFormat::Human);
            }
            other => panic!("expected deidentify, got {:?}", other),
        }

        assert!(Args::try_parse_from(["x", "deidentify", "a.hl7"]).is_err());
    }

    #[test]
    fn test_presence_repeated_fields() {
        let args = parse(&["x", "presence", "a.hl7", "-f", "PID-3", "-f", "OBX#2-5"]);
        match args.command {
            Commands::Presence(presence) => {
                assert_eq!(presence.fields, vec!["PID-3", "OBX#2-5"]);
                assert!(!presence.list_matches);
            }
            other => panic!("expected presence, got {:?}", other),
        }
    }
}
