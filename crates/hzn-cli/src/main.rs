use clap::Parser;
use std::process::ExitCode;
use std::time::Instant;
use tracing::error;
use tracing_subscriber::FmtSubscriber;

use crate::commands::telemetry::record_run_timed;
use crate::commands::{brownfield, completions, config, inspect};
use hzn_cli::cli::{build_cli_command, Cli, Commands};
mod commands;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {err}");
    }

    let result = match &cli.command {
        Some(Commands::Brownfield(args)) => {
            let start = Instant::now();
            let result = brownfield::handle(args);
            let year = args.year.to_string();
            let network = args.network.display().to_string();
            let previous = args.network_previous.display().to_string();
            let config = args
                .config
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            let out = args.out.display().to_string();
            record_run_timed(
                &args.out,
                "brownfield",
                &[
                    ("network", network.as_str()),
                    ("network_previous", previous.as_str()),
                    ("year", year.as_str()),
                    ("config", config.as_str()),
                    ("out", out.as_str()),
                ],
                start,
                &result,
            );
            result
        }
        Some(Commands::Inspect { network, format }) => inspect::handle(network, *format),
        Some(Commands::Config { command }) => config::handle(command),
        Some(Commands::Completions { shell, out }) => completions::handle(*shell, out.as_deref()),
        None => build_cli_command().print_help().map_err(anyhow::Error::from),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
