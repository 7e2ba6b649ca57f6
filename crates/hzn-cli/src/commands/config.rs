use anyhow::{Context, Result};
use std::path::Path;

use hzn_brownfield::{load_config_from_path, validate};
use hzn_cli::cli::ConfigCommands;

pub fn handle(command: &ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Validate { path } => handle_validate(path),
    }
}

fn handle_validate(path: &Path) -> Result<()> {
    let config = load_config_from_path(path)?;
    validate(&config).with_context(|| format!("validating {}", path.display()))?;
    let transport = if config.endogenous_transport {
        "endogenous transport"
    } else {
        "exogenous transport"
    };
    let renewables = config
        .renewable
        .as_ref()
        .map(|r| r.carriers.len())
        .unwrap_or(0);
    println!(
        "{} is valid: threshold {} MW, {}, {} renewable carriers",
        path.display(),
        config.threshold_capacity,
        transport,
        renewables
    );
    Ok(())
}
