pub mod cli;
pub mod common;
pub mod manifest;

pub use cli::{build_cli_command, BrownfieldArgs, Cli, Commands, ConfigCommands};
pub use common::OutputFormat;
