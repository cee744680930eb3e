//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// genwatch - standby generator alert engine.
#[derive(Parser, Debug, Clone)]
#[command(name = "genwatch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "GENWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    pub format: Format,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Replay recorded snapshots through the alert engine.
    ///
    /// Each snapshot is appended to an in-memory store and followed by one
    /// evaluation cycle.
    Evaluate(EvaluateArgs),

    /// List the configured rule table.
    Rules,
}

/// Arguments for the evaluate command.
#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    /// File holding a JSON array or JSON lines of snapshots.
    pub snapshots: PathBuf,

    /// Also print every stored alert, retired ones included.
    #[arg(long)]
    pub history: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_evaluate() {
        let cli = Cli::parse_from(["genwatch", "evaluate", "readings.json"]);
        match cli.command {
            Commands::Evaluate(args) => {
                assert_eq!(args.snapshots, PathBuf::from("readings.json"));
                assert!(!args.history);
            }
            Commands::Rules => panic!("expected evaluate command"),
        }
    }

    #[test]
    fn parses_history_flag() {
        let cli = Cli::parse_from(["genwatch", "evaluate", "--history", "r.jsonl"]);
        assert!(matches!(cli.command, Commands::Evaluate(EvaluateArgs { history: true, .. })));
    }

    #[test]
    fn parses_rules() {
        let cli = Cli::parse_from(["genwatch", "rules"]);
        assert!(matches!(cli.command, Commands::Rules));
        assert_eq!(cli.format, Format::Table);
    }

    #[test]
    fn global_flags() {
        let cli = Cli::parse_from([
            "genwatch",
            "--format",
            "json",
            "--config",
            "/etc/genwatch.toml",
            "rules",
        ]);
        assert_eq!(cli.format, Format::Json);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/genwatch.toml")));
    }

    #[test]
    fn evaluate_requires_path() {
        assert!(Cli::try_parse_from(["genwatch", "evaluate"]).is_err());
    }

    #[test]
    fn command_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
