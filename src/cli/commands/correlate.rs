//! Correlate command implementation
//!
//! Pairs messages of a feed with records of its redacted counterpart, by
//! record position or by control id, and reports pairs whose header lines
//! disagree along with records left unmatched.

use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use std::fmt::Write as _;
use tracing::{info, warn};

use super::shared::{parse_feed, print_json};
use crate::cli::args::{CorrelateArgs, CorrelateBy, OutputFormat};
use crate::config::InspectorConfig;
use crate::correlate::{ControlIdJoin, OrdinalPair, pair_by_control_id, pair_by_ordinal};
use crate::models::Message;
use crate::redacted::RedactedBlocks;

/// One paired record in the correlation listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorrelationRow<'a> {
    /// 1-based record position in the redacted feed
    pub ordinal: Option<usize>,
    pub message_id: u64,
    pub control_id: &'a str,
    pub redacted_control_id: &'a str,

    /// Whether the header lines of both records are identical
    pub header_matches: bool,
}

/// Full correlation result for JSON output
#[derive(Debug, Clone, Default, Serialize)]
pub struct CorrelationReport<'a> {
    pub rows: Vec<CorrelationRow<'a>>,
    pub unmatched_primary: Vec<u64>,
    pub unmatched_redacted: Vec<u64>,
}

impl CorrelationReport<'_> {
    pub fn header_mismatches(&self) -> usize {
        self.rows.iter().filter(|row| !row.header_matches).count()
    }
}

/// Correlate command runner
pub fn run_correlate(args: CorrelateArgs, config: &InspectorConfig) -> Result<()> {
    let primary = parse_feed(&args.file, config)?;

    match args.strategy {
        CorrelateBy::Ordinal => {
            let blocks = RedactedBlocks::load_file_with_sentinel(&args.redacted, &config.sentinel)
                .with_context(|| format!("Failed to load {}", args.redacted.display()))?;
            let pairs = pair_by_ordinal(&primary.messages, &blocks)
                .context("Feeds cannot be paired by record position")?;
            print_report(ordinal_report(&pairs), args.output_format)
        }
        CorrelateBy::ControlId => {
            let redacted = parse_feed(&args.redacted, config)?;
            let join = pair_by_control_id(&primary.messages, &redacted.messages)
                .context("Feeds cannot be paired by control id")?;
            print_report(control_id_report(&join), args.output_format)
        }
    }
}

fn print_report(report: CorrelationReport<'_>, format: OutputFormat) -> Result<()> {
    let mismatches = report.header_mismatches();
    info!(
        "Correlated {} records ({} header mismatches, {} unmatched primary, {} unmatched redacted)",
        report.rows.len(),
        mismatches,
        report.unmatched_primary.len(),
        report.unmatched_redacted.len()
    );
    if mismatches > 0 {
        warn!("{} paired records have differing header lines", mismatches);
    }

    match format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Human => {
            print!("{}", render_report(&report));
            Ok(())
        }
    }
}

fn header_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

fn redacted_control_id(block: &str) -> &str {
    use crate::constants::{FIELD_DELIMITER, header_fields};

    header_line(block)
        .split(FIELD_DELIMITER)
        .nth(header_fields::CONTROL_ID - 1)
        .unwrap_or("")
}

/// Rows for an ordinal pairing; headers are compared line for line
pub fn ordinal_report<'a>(pairs: &[OrdinalPair<'a>]) -> CorrelationReport<'a> {
    let rows = pairs
        .iter()
        .map(|pair| CorrelationRow {
            ordinal: Some(pair.ordinal),
            message_id: pair.message.id,
            control_id: &pair.message.control_id,
            redacted_control_id: redacted_control_id(pair.redacted),
            header_matches: header_line(&pair.message.raw) == header_line(pair.redacted),
        })
        .collect();

    CorrelationReport {
        rows,
        ..Default::default()
    }
}

/// Rows for a control id join, plus ids of unmatched messages on each side
pub fn control_id_report<'a>(join: &ControlIdJoin<'a>) -> CorrelationReport<'a> {
    let ids = |messages: &[&Message]| messages.iter().map(|m| m.id).collect::<Vec<_>>();

    let rows = join
        .pairs
        .iter()
        .map(|(primary, redacted)| CorrelationRow {
            ordinal: None,
            message_id: primary.id,
            control_id: &primary.control_id,
            redacted_control_id: &redacted.control_id,
            header_matches: header_line(&primary.raw) == header_line(&redacted.raw),
        })
        .collect();

    CorrelationReport {
        rows,
        unmatched_primary: ids(&join.unmatched_primary),
        unmatched_redacted: ids(&join.unmatched_redacted),
    }
}

pub fn render_report(report: &CorrelationReport<'_>) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{}",
        format!(
            "{:>7}  {:>6}  {:<20}  {:<20}  {}",
            "RECORD", "ID", "CONTROL ID", "REDACTED CONTROL ID", "HEADER"
        )
        .bright_white()
        .bold()
    );

    for row in &report.rows {
        let record = row
            .ordinal
            .map(|ordinal| ordinal.to_string())
            .unwrap_or_else(|| "-".to_string());
        let status = if row.header_matches {
            "match".green()
        } else {
            "DIFFERS".red().bold()
        };
        let _ = writeln!(
            out,
            "{:>7}  {:>6}  {:<20}  {:<20}  {}",
            record, row.message_id, row.control_id, row.redacted_control_id, status
        );
    }

    let _ = writeln!(
        out,
        "{} {} pairs, {} header mismatches",
        "Paired:".bright_green().bold(),
        report.rows.len(),
        report.header_mismatches()
    );

    if !report.unmatched_primary.is_empty() {
        let _ = writeln!(
            out,
            "{} {:?}",
            "Unmatched primary messages:".yellow(),
            report.unmatched_primary
        );
    }
    if !report.unmatched_redacted.is_empty() {
        let _ = writeln!(
            out,
            "{} {:?}",
            "Unmatched redacted messages:".yellow(),
            report.unmatched_redacted
        );
    }

    out
}
