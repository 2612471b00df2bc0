//! Presence command implementation
//!
//! Reports how many messages carry non-empty values in selected fields.

use anyhow::Result;
use colored::*;
use std::fmt::Write as _;
use tracing::info;

use super::shared::{parse_feed, print_json};
use crate::cli::args::{OutputFormat, PresenceArgs};
use crate::config::InspectorConfig;
use crate::report::FieldPresenceReport;

/// Presence command runner
pub fn run_presence(args: PresenceArgs, config: &InspectorConfig) -> Result<()> {
    let labels: &[String] = if args.fields.is_empty() {
        &config.presence_fields
    } else {
        &args.fields
    };

    let outcome = parse_feed(&args.file, config)?;
    let report = FieldPresenceReport::build(&outcome.messages, labels);

    info!(
        "{} of {} messages carry at least one of {} fields",
        report.messages_with_any(),
        report.total_messages,
        labels.len()
    );

    match args.output_format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Human => {
            print!("{}", render_report(&report, args.list_matches));
            Ok(())
        }
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

/// Table of per-field counts, a totals line, and optionally matching ids
pub fn render_report(report: &FieldPresenceReport, list_matches: bool) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{}",
        format!("{:<12}  {:>8}  {:>7}", "FIELD", "MESSAGES", "PERCENT")
            .bright_white()
            .bold()
    );
    for (label, count) in &report.counts {
        let _ = writeln!(
            out,
            "{:<12}  {:>8}  {:>6.1}%",
            label,
            count,
            percentage(*count, report.total_messages)
        );
    }

    let _ = writeln!(
        out,
        "{} {} of {} messages carry at least one requested field",
        "Total:".bright_green().bold(),
        report.messages_with_any(),
        report.total_messages
    );

    if list_matches && !report.matching_ids.is_empty() {
        let ids: Vec<String> = report.matching_ids.iter().map(u64::to_string).collect();
        let _ = writeln!(out, "{} {}", "Matching ids:".bright_green(), ids.join(", "));
    }

    out
}
