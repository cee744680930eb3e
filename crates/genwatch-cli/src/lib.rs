//! # genwatch-cli
//!
//! Command-line harness for the `genwatch-alerts` engine.
//!
//! Provides commands for:
//! - Replaying recorded telemetry snapshots through the alert engine
//! - Listing the configured rule table
//!
//! Everything runs in-process against the in-memory stores; the binary
//! holds no state between invocations.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod input;
pub mod output;

use std::io::Write;

pub use cli::{Cli, Commands, EvaluateArgs, Format};
pub use config::{CliConfig, LogConfig};
pub use error::CliError;
pub use output::OutputFormat;

use commands::{EvaluateCommand, RulesCommand};

/// Runs a parsed command line against a loaded configuration.
///
/// # Errors
///
/// Returns an error if the command fails.
pub fn run<W: Write>(cli: &Cli, config: &CliConfig, writer: &mut W) -> error::Result<()> {
    let format = OutputFormat::new(cli.format);

    match &cli.command {
        Commands::Evaluate(args) => {
            EvaluateCommand::new(&config.engine).execute(writer, &format, args)
        }
        Commands::Rules => RulesCommand::new(&config.engine).execute(writer, &format),
    }
}
