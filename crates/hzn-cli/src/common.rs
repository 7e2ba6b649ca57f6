//! Output helpers shared across commands.

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, Write};
use tabwriter::TabWriter;

/// Output format for command reports.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable aligned table
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value)?;
    writeln!(handle)?;
    Ok(())
}

/// Print `(key, value)` rows as a two-column table under `title`.
pub fn print_table(title: &str, rows: &[(String, String)]) -> Result<()> {
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "{}", title)?;
    for (key, value) in rows {
        writeln!(writer, "  {}\t{}", key, value)?;
    }
    writer.flush()?;
    Ok(())
}
