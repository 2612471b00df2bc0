//! Redact command implementation
//!
//! Writes a masked counterpart of a feed and reports what was replaced.

use anyhow::{Context, Result};
use colored::*;
use tracing::info;

use crate::cli::args::RedactArgs;
use crate::config::InspectorConfig;
use crate::masking::{MaskOutcome, PatientMasker};

/// Redact command runner
pub fn run_redact(args: RedactArgs, config: &InspectorConfig) -> Result<()> {
    let masker = build_masker(&args, config);
    info!(
        "Masking {} fields: {:?}",
        config.patient_segment,
        masker.fields().collect::<Vec<_>>()
    );

    let outcome = masker
        .mask_file(&args.input, &args.output)
        .with_context(|| format!("Failed to redact {}", args.input.display()))?;

    println!("{}", render_outcome(&outcome, &args));
    Ok(())
}

/// Masker from configuration, with `--field` values taking precedence
fn build_masker(args: &RedactArgs, config: &InspectorConfig) -> PatientMasker {
    if args.fields.is_empty() {
        PatientMasker::from_config(config)
    } else {
        let config = config
            .clone()
            .with_masked_patient_fields(args.fields.clone());
        PatientMasker::from_config(&config)
    }
}

fn render_outcome(outcome: &MaskOutcome, args: &RedactArgs) -> String {
    format!(
        "{} {} fields on {} lines across {} messages\n{} {}",
        "Masked".bright_green().bold(),
        outcome.fields_masked,
        outcome.lines_masked,
        outcome.messages,
        "Wrote".bright_green().bold(),
        args.output.display()
    )
}
