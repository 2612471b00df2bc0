//! Command implementations for the HL7 inspector CLI
//!
//! Each command is implemented in its own module; this module sets up
//! logging and configuration and dispatches to the selected command.

pub mod correlate;
pub mod deidentify;
pub mod messages;
pub mod presence;
pub mod redact;
pub mod shared;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::args::{Args, Commands};
use crate::config::InspectorConfig;

/// Main command runner for the HL7 inspector
///
/// Initialises logging, resolves configuration, then runs the subcommand:
/// - `summary`, `show`, `patient`: message listings
/// - `redact`: masked counterpart output
/// - `deidentify`: pseudonymous counterpart output
/// - `presence`: field presence report
/// - `correlate`: pairing against a redacted feed
pub fn run(args: Args) -> Result<()> {
    shared::setup_logging(&args)?;

    info!("Starting hl7-inspector");
    debug!("Command line arguments: {:?}", args);

    let config = shared::load_configuration(&args)?;
    execute(args.command, &config)
}

/// Run a subcommand against an already resolved configuration
pub fn execute(command: Commands, config: &InspectorConfig) -> Result<()> {
    match command {
        Commands::Summary(args) => messages::run_summary(args, config),
        Commands::Show(args) => messages::run_show(args, config),
        Commands::Patient(args) => messages::run_patient(args, config),
        Commands::Redact(args) => redact::run_redact(args, config),
        Commands::Deidentify(args) => deidentify::run_deidentify(args, config),
        Commands::Presence(args) => presence::run_presence(args, config),
        Commands::Correlate(args) => correlate::run_correlate(args, config),
    }
}
