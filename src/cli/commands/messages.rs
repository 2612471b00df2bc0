//! Message listing commands: summary, show and patient
//!
//! Renders parsed messages as colored tables and per-segment field listings,
//! or as JSON for scripting.

use anyhow::Result;
use colored::*;
use serde::Serialize;
use std::fmt::Write as _;
use tracing::{debug, info};

use super::shared::{SummaryRow, format_timestamp, parse_feed, print_json, truncate};
use crate::cli::args::{OutputFormat, PatientArgs, ShowArgs, SummaryArgs};
use crate::config::InspectorConfig;
use crate::error::Hl7Error;
use crate::models::Message;
use crate::query::{self, Page};

/// JSON envelope for a page of summaries
#[derive(Debug, Serialize)]
struct SummaryPage<'a> {
    page: usize,
    per_page: usize,
    total_items: usize,
    total_pages: usize,
    messages: Vec<SummaryRow<'a>>,
}

/// Summary command runner
pub fn run_summary(args: SummaryArgs, config: &InspectorConfig) -> Result<()> {
    let outcome = parse_feed(&args.file, config)?;
    let ordered = query::sorted(&outcome.messages, args.sort, args.sort_order());
    let per_page = args.per_page.unwrap_or(config.page_size);
    let page = query::paginate(&ordered, args.page, per_page);

    info!(
        "Showing page {} of {} ({} messages, sorted by {})",
        page.page, page.total_pages, page.total_items, args.sort
    );

    match args.output_format {
        OutputFormat::Json => print_json(&SummaryPage {
            page: page.page,
            per_page: page.per_page,
            total_items: page.total_items,
            total_pages: page.total_pages,
            messages: page.items.iter().map(|m| SummaryRow::from(*m)).collect(),
        }),
        OutputFormat::Human => {
            print!("{}", render_summary_table(page.items));
            println!("{}", render_page_footer(&page));
            Ok(())
        }
    }
}

/// Show command runner
pub fn run_show(args: ShowArgs, config: &InspectorConfig) -> Result<()> {
    let outcome = parse_feed(&args.file, config)?;
    let message = outcome
        .message(args.id)
        .ok_or(Hl7Error::MessageNotFound { id: args.id })?;

    debug!(
        "Showing message {} with {} segments",
        message.id,
        message.segments.len()
    );

    match args.output_format {
        OutputFormat::Json => print_json(message),
        OutputFormat::Human => {
            print!("{}", render_message_detail(message));
            Ok(())
        }
    }
}

/// Patient command runner
pub fn run_patient(args: PatientArgs, config: &InspectorConfig) -> Result<()> {
    let outcome = parse_feed(&args.file, config)?;
    let matches = query::filter_for_patient(&outcome.messages, &args.patient_id, &args.facility);

    info!(
        "Found {} messages for patient {} at {}",
        matches.len(),
        args.patient_id,
        args.facility
    );

    match args.output_format {
        OutputFormat::Json => {
            let rows: Vec<SummaryRow> = matches.iter().map(|m| SummaryRow::from(*m)).collect();
            print_json(&rows)
        }
        OutputFormat::Human => {
            if matches.is_empty() {
                println!(
                    "{}",
                    format!(
                        "No messages for patient '{}' at '{}'",
                        args.patient_id, args.facility
                    )
                    .yellow()
                );
            } else {
                println!(
                    "{} {} {} {}",
                    "Patient".bright_green().bold(),
                    args.patient_id.bright_cyan(),
                    "at".bright_green().bold(),
                    args.facility.bright_cyan()
                );
                print!("{}", render_summary_table(&matches));
            }
            Ok(())
        }
    }
}

/// Tabulate message summaries, one row per message
pub fn render_summary_table(messages: &[&Message]) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{}",
        format!(
            "{:>6}  {:<20}  {:<14}  {:<14}  {:<12}  {:<20}  {:<10}",
            "ID", "TIMESTAMP", "PATIENT ID", "LAST NAME", "FIRST NAME", "FACILITY", "TYPE"
        )
        .bright_white()
        .bold()
    );

    for message in messages {
        let timestamp = format!("{:<20}", format_timestamp(&message.timestamp));
        let timestamp = if message.timestamp.is_defaulted() {
            timestamp.yellow()
        } else {
            timestamp.normal()
        };

        let _ = writeln!(
            out,
            "{}  {}  {:<14}  {:<14}  {:<12}  {:<20}  {:<10}",
            format!("{:>6}", message.id).bright_yellow(),
            timestamp,
            truncate(message.patient_id(), 14),
            truncate(message.last_name(), 14),
            truncate(message.first_name(), 12),
            truncate(&message.facility, 20),
            truncate(&message.message_type, 10),
        );
    }

    out
}

/// "Page X of Y" line with navigation hints
pub fn render_page_footer<T>(page: &Page<'_, T>) -> String {
    let mut footer = format!(
        "Page {} of {} ({} messages)",
        page.page, page.total_pages, page.total_items
    );
    if page.has_previous() {
        let _ = write!(footer, ", previous: --page {}", page.page - 1);
    }
    if page.has_next() {
        let _ = write!(footer, ", next: --page {}", page.page + 1);
    }
    footer.bright_black().to_string()
}

/// Header summary followed by every segment with its labelled fields
pub fn render_message_detail(message: &Message) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} {}",
        "Message".bright_green().bold(),
        message.id.to_string().bright_yellow().bold()
    );
    let _ = writeln!(out, "  Control ID:   {}", message.control_id);
    let _ = writeln!(out, "  Type:         {}", message.message_type);
    let _ = writeln!(out, "  Facility:     {}", message.facility);
    let _ = writeln!(
        out,
        "  Timestamp:    {} (raw '{}')",
        format_timestamp(&message.timestamp),
        message.raw_timestamp
    );

    match &message.patient {
        Some(patient) => {
            let _ = writeln!(
                out,
                "  Patient:      {} {} ({})",
                patient.last_name,
                patient.first_name.as_deref().unwrap_or(""),
                patient.patient_id
            );
            let _ = writeln!(out, "  Account:      {}", patient.account_number);
        }
        None => {
            let _ = writeln!(out, "  Patient:      {}", "none".bright_black());
        }
    }

    let diagnostics = message.diagnostics;
    if !diagnostics.is_clean() {
        let mut notes = Vec::new();
        if diagnostics.timestamp_defaulted {
            notes.push("timestamp defaulted");
        }
        if diagnostics.short_header {
            notes.push("short header");
        }
        if diagnostics.short_patient_segment {
            notes.push("short patient segment");
        }
        let _ = writeln!(out, "  Warnings:     {}", notes.join(", ").yellow());
    }

    for segment in &message.segments {
        let _ = writeln!(
            out,
            "\n{} {}",
            format!("[{}]", segment.sequence).bright_black(),
            segment.kind.bright_cyan().bold()
        );
        for field in segment.fields.iter().filter(|f| !f.value.is_empty()) {
            if segment.sequence == 0 {
                let _ = writeln!(
                    out,
                    "  {:<10} {} {}",
                    field.label,
                    field.value,
                    format!("({})", header_wire_label(&segment.kind, field.position)).bright_black()
                );
            } else {
                let _ = writeln!(out, "  {:<10} {}", field.label, field.value);
            }
        }
    }

    out
}

/// Wire-format name of a header field.
///
/// The field separator is field 1 of the header segment, so the token at
/// position `n` is header field `n + 1` (`MSH-3` in the graph is `MSH-4`,
/// the sending facility).
pub fn header_wire_label(kind: &str, position: usize) -> String {
    format!("{} field {}", kind, position + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_text;

    const FEED: &str = "MSH|^~\\&|ADT1|GOOD HEALTH HOSPITAL|||20240115103000||ADT^A01|MSG1\n\
PID|1||P100||Smith^John|||||||||||||ACC9\n\
MSH|^~\\&|ADT1|MERCY|||not-a-date||ADT^A04|MSG2\n";

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_summary_table_rows() {
        plain();
        let messages = parse_text(FEED);
        let view: Vec<&Message> = messages.iter().collect();
        let table = render_summary_table(&view);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("PATIENT ID"));
        assert!(lines[1].contains("2024-01-15 10:30:00"));
        assert!(lines[1].contains("Smith"));
        assert!(lines[1].contains("GOOD HEALTH HOSPITAL"));
        assert!(lines[2].contains("MERCY"));
        assert!(lines[2].contains('*'));
    }

    #[test]
    fn test_page_footer() {
        plain();
        let items: Vec<u32> = (1..=30).collect();

        let first = query::paginate(&items, 1, 10);
        assert_eq!(
            render_page_footer(&first),
            "Page 1 of 3 (30 messages), next: --page 2"
        );

        let middle = query::paginate(&items, 2, 10);
        assert_eq!(
            render_page_footer(&middle),
            "Page 2 of 3 (30 messages), previous: --page 1, next: --page 3"
        );
    }

    #[test]
    fn test_message_detail() {
        plain();
        let messages = parse_text(FEED);
        let detail = render_message_detail(&messages[0]);

        assert!(detail.starts_with("Message 1\n"));
        assert!(detail.contains("  Control ID:   MSG1\n"));
        assert!(detail.contains("  Patient:      Smith John (P100)\n"));
        assert!(detail.contains("  Account:      ACC9\n"));
        assert!(detail.contains("[1] PID\n"));
        assert!(detail.contains("  PID-3      P100\n"));
        assert!(!detail.contains("Warnings"));
    }

    #[test]
    fn test_message_detail_names_header_fields() {
        plain();
        let messages = parse_text(FEED);
        let detail = render_message_detail(&messages[0]);

        assert!(detail.contains("  MSH-3      GOOD HEALTH HOSPITAL (MSH field 4)\n"));
        assert!(detail.contains("  MSH-9      MSG1 (MSH field 10)\n"));
        assert_eq!(header_wire_label("MSH", 6), "MSH field 7");
    }

    #[test]
    fn test_message_detail_lists_warnings() {
        plain();
        let messages = parse_text(FEED);
        let detail = render_message_detail(&messages[1]);

        assert!(detail.contains("Warnings:     timestamp defaulted"));
        assert!(detail.contains("  Patient:      none\n"));
    }
}
