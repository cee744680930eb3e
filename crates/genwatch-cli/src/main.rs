//! genwatch CLI binary entrypoint.
//!
//! This is the main entry point for the `genwatch` command-line tool.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use genwatch_cli::{Cli, CliConfig, LogConfig};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match CliConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.log);

    let mut stdout = io::stdout().lock();
    match genwatch_cli::run(&cli, &config, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Installs the global subscriber; `RUST_LOG` overrides the configured filter.
fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genwatch_cli::{Commands, Format};

    #[test]
    fn cli_parses_rules() {
        let cli = Cli::parse_from(["genwatch", "rules"]);
        assert!(matches!(cli.command, Commands::Rules));
    }

    #[test]
    fn cli_respects_format_flag() {
        let cli = Cli::parse_from(["genwatch", "--format", "json", "rules"]);
        assert_eq!(cli.format, Format::Json);
    }

    #[test]
    fn run_rules_with_defaults() {
        let cli = Cli::parse_from(["genwatch", "rules"]);
        let mut out = Vec::new();
        genwatch_cli::run(&cli, &CliConfig::default(), &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("FUEL_LOW"));
    }

    #[test]
    fn run_evaluate_missing_file_fails() {
        let cli = Cli::parse_from(["genwatch", "evaluate", "/nonexistent/readings.json"]);
        let mut out = Vec::new();
        assert!(genwatch_cli::run(&cli, &CliConfig::default(), &mut out).is_err());
    }
}
