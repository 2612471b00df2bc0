//! Deidentify command implementation
//!
//! Writes a copy of a feed with patient and physician values replaced by
//! pseudonyms that stay stable for the same patient across messages.

use anyhow::{Context, Result};
use colored::*;
use tracing::{info, warn};

use super::shared::print_json;
use crate::cli::args::{DeidentifyArgs, OutputFormat};
use crate::config::InspectorConfig;
use crate::constants::ENV_PSEUDONYM_SECRET;
use crate::deidentify::{DeidOutcome, Deidentifier, PseudonymKey};

/// Deidentify command runner
pub fn run_deidentify(args: DeidentifyArgs, config: &InspectorConfig) -> Result<()> {
    let secret = args
        .secret
        .clone()
        .or_else(|| std::env::var(ENV_PSEUDONYM_SECRET).ok());
    let key = PseudonymKey::from_secret(secret.as_deref())?;
    if !key.is_keyed() {
        warn!(
            "No pseudonym secret given (--secret or {}); pseudonyms use unkeyed SHA-256",
            ENV_PSEUDONYM_SECRET
        );
    }

    let deidentifier = Deidentifier::from_config(config, key);
    info!("De-identifying {}", args.input.display());

    let outcome = deidentifier
        .deidentify_file(&args.input, &args.output)
        .with_context(|| format!("Failed to de-identify {}", args.input.display()))?;

    match args.output_format {
        OutputFormat::Json => print_json(&outcome)?,
        OutputFormat::Human => println!("{}", render_outcome(&outcome, &args)),
    }
    Ok(())
}

fn render_outcome(outcome: &DeidOutcome, args: &DeidentifyArgs) -> String {
    let mode = if outcome.keyed { "keyed" } else { "unkeyed" };
    format!(
        "{} {} fields across {} messages ({})\n  patients:     {}\n  accounts:     {}\n  mother links: {}\n  physicians:   {}\n{} {}",
        "Replaced".bright_green().bold(),
        outcome.fields_replaced,
        outcome.messages,
        mode,
        outcome.patients,
        outcome.accounts,
        outcome.mother_links,
        outcome.physicians,
        "Wrote".bright_green().bold(),
        args.output.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn deid_args(input: PathBuf, output: PathBuf) -> DeidentifyArgs {
        DeidentifyArgs {
            input,
            output,
            secret: Some("test-secret".to_string()),
            output_format: OutputFormat::Human,
        }
    }

    #[test]
    fn test_run_deidentify_writes_output() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("feed.hl7");
        let output = dir.path().join("out").join("feed_deid.hl7");
        std::fs::write(
            &input,
            "MSH|^~\\&|A|F|||20240101||ADT^A01|C1\nPID|1||P100||Smith^John||19800101|M\n",
        )
        .unwrap();

        run_deidentify(deid_args(input, output.clone()), &InspectorConfig::default()).unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(written.lines().count(), 2);
        assert!(written.starts_with("MSH|^~\\&|A|F|||20240101||ADT^A01|C1\n"));
        assert!(!written.contains("Smith"));
        assert!(!written.contains("P100"));
    }

    #[test]
    fn test_run_deidentify_missing_input_fails() {
        let dir = TempDir::new().unwrap();
        let args = deid_args(dir.path().join("absent.hl7"), dir.path().join("out.hl7"));

        let err = run_deidentify(args, &InspectorConfig::default()).unwrap_err();
        assert!(format!("{:#}", err).contains("Source not found"));
    }

    #[test]
    fn test_render_outcome() {
        colored::control::set_override(false);
        let outcome = DeidOutcome {
            text: String::new(),
            messages: 3,
            patients: 2,
            accounts: 2,
            mother_links: 1,
            physicians: 1,
            fields_replaced: 17,
            keyed: true,
        };
        let rendered = render_outcome(&outcome, &deid_args("in".into(), "out.hl7".into()));

        assert!(rendered.starts_with("Replaced 17 fields across 3 messages (keyed)\n"));
        assert!(rendered.contains("  mother links: 1\n"));
        assert!(rendered.ends_with("Wrote out.hl7"));
    }
}
