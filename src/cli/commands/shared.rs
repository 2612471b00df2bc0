//! Shared utilities for command implementations
//!
//! Logging setup, configuration loading, feed parsing and output helpers
//! used by every subcommand.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::cli::args::Args;
use crate::config::InspectorConfig;
use crate::models::{CanonicalTimestamp, Message};
use crate::parser::{ParseOutcome, ParseSession};

const TIMESTAMP_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Set up structured logging on stderr
pub fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    // Create filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hl7_inspector={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
            .context("Failed to initialise logging")?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .context("Failed to initialise logging")?;
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Resolve configuration from the command line, environment and user config
pub fn load_configuration(args: &Args) -> Result<InspectorConfig> {
    let config = InspectorConfig::resolve(args.config_file.as_deref())
        .context("Failed to load configuration")?;
    debug!("Loaded configuration: {:?}", config);
    Ok(config)
}

/// Parse a feed with a fresh session built from `config`
pub fn parse_feed(path: &Path, config: &InspectorConfig) -> Result<ParseOutcome> {
    let outcome = ParseSession::from_config(config)
        .parse_file(path)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    if outcome.messages.is_empty() {
        warn!("No messages found in {}", path.display());
    } else if outcome.stats.degraded_messages > 0 {
        info!(
            "{} of {} messages parsed with degraded header or patient data ({:.1}% clean)",
            outcome.stats.degraded_messages,
            outcome.stats.messages,
            outcome.stats.clean_rate()
        );
    }
    Ok(outcome)
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

/// Display form of a canonical timestamp; defaulted values are marked
pub fn format_timestamp(timestamp: &CanonicalTimestamp) -> String {
    match timestamp {
        CanonicalTimestamp::Parsed(value) => format_datetime(value),
        CanonicalTimestamp::Defaulted { at, .. } => format!("{}*", format_datetime(at)),
    }
}

pub fn format_datetime(value: &NaiveDateTime) -> String {
    value.format(TIMESTAMP_DISPLAY_FORMAT).to_string()
}

/// Shorten `value` to at most `width` characters, marking the cut
pub fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let kept: String = value.chars().take(width.saturating_sub(1)).collect();
    format!("{}~", kept)
}

/// Flat summary of a message for tables and JSON listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow<'a> {
    pub id: u64,
    pub timestamp: String,
    pub timestamp_defaulted: bool,
    pub patient_id: &'a str,
    pub last_name: &'a str,
    pub first_name: &'a str,
    pub facility: &'a str,
    pub message_type: &'a str,
    pub control_id: &'a str,
}

impl<'a> From<&'a Message> for SummaryRow<'a> {
    fn from(message: &'a Message) -> Self {
        Self {
            id: message.id,
            timestamp: format_datetime(&message.timestamp.value()),
            timestamp_defaulted: message.timestamp.is_defaulted(),
            patient_id: message.patient_id(),
            last_name: message.last_name(),
            first_name: message.first_name(),
            facility: &message.facility,
            message_type: &message.message_type,
            control_id: &message.control_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_text;
    use chrono::NaiveDate;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly", 7), "exactly");
        assert_eq!(truncate("GOOD HEALTH HOSPITAL", 10), "GOOD HEAL~");
        assert_eq!(truncate("Muñoz", 3), "Mu~");
    }

    #[test]
    fn test_format_timestamp_marks_defaulted() {
        let at = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();

        assert_eq!(
            format_timestamp(&CanonicalTimestamp::Parsed(at)),
            "2024-01-15 10:30:00"
        );
        assert_eq!(
            format_timestamp(&CanonicalTimestamp::Defaulted {
                raw: "garbage".to_string(),
                at
            }),
            "2024-01-15 10:30:00*"
        );
    }

    #[test]
    fn test_summary_row_from_message() {
        let messages =
            parse_text("MSH|^~\\&|A|FAC|||20240115103000||ADT^A01|C1\nPID|1||P1||Smith^John\n");
        let row = SummaryRow::from(&messages[0]);

        assert_eq!(row.id, 1);
        assert_eq!(row.timestamp, "2024-01-15 10:30:00");
        assert!(!row.timestamp_defaulted);
        assert_eq!(row.patient_id, "P1");
        assert_eq!(row.last_name, "Smith");
        assert_eq!(row.first_name, "John");
        assert_eq!(row.facility, "FAC");
        assert_eq!(row.message_type, "ADT^A01");
        assert_eq!(row.control_id, "C1");
    }

    #[test]
    fn test_parse_feed_missing_file_is_empty() {
        let outcome = parse_feed(
            Path::new("/nonexistent/feed.hl7"),
            &InspectorConfig::default(),
        )
        .unwrap();

        assert!(outcome.messages.is_empty());
    }
}
