use clap::{CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::common::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about = "Brownfield preparation for myopic planning horizons", long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Prepare a horizon's network from the solved previous horizon
    Brownfield(BrownfieldArgs),
    /// Summarize a network folder
    Inspect {
        /// Network folder
        #[arg(value_hint = ValueHint::DirPath)]
        network: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Brownfield config helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
        /// Write output to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
pub struct BrownfieldArgs {
    /// Network of the current horizon
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub network: PathBuf,
    /// Solved network of the previous horizon
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub network_previous: PathBuf,
    /// Planning horizon being prepared
    #[arg(long)]
    pub year: u32,
    /// Brownfield config (YAML or JSON); defaults apply when omitted
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// Vehicle registration table (transport_type,country,rate)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub car_registration: Option<PathBuf>,
    /// Folder holding profile_{carrier}.csv files
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub profiles: Option<PathBuf>,
    /// Output network folder
    #[arg(short, long, value_hint = ValueHint::DirPath)]
    pub out: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Load a config and check its values
    Validate {
        #[arg(value_hint = ValueHint::FilePath)]
        path: PathBuf,
    },
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        build_cli_command().debug_assert();
    }

    #[test]
    fn parses_brownfield_arguments() {
        let cli = Cli::parse_from([
            "hzn-cli",
            "brownfield",
            "--network",
            "n_2040",
            "--network-previous",
            "n_2030",
            "--year",
            "2040",
            "-o",
            "out",
            "--format",
            "json",
        ]);
        match cli.command {
            Some(Commands::Brownfield(args)) => {
                assert_eq!(args.year, 2040);
                assert_eq!(args.format, OutputFormat::Json);
                assert!(args.config.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
