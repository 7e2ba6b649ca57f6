use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDateTime;
use polars::prelude::*;
use serde::Serialize;
use std::fs::{self, File};
use std::path::Path;

use hzn_core::{
    format_timestamp, parse_timestamp, ComponentTable, Named, Network, SeriesFrame,
};

use crate::rows::{self, Columns, Row};

const SNAPSHOTS_FILE: &str = "snapshots.csv";
const SNAPSHOT_COLUMN: &str = "snapshot";
const META_FILE: &str = "meta.json";

/// Read a network from a CSV folder.
///
/// Missing component files are treated as empty tables. Every series file must
/// have one row per snapshot, with the same timestamps as `snapshots.csv`.
pub fn load_network(dir: &Path) -> Result<Network> {
    if !dir.is_dir() {
        bail!("network directory {} does not exist", dir.display());
    }
    let snapshots = read_snapshots(dir)?;
    let mut network = Network::with_snapshots(snapshots);
    network.name = dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    read_table(dir, &mut network.buses, rows::bus)?;
    read_table(dir, &mut network.generators, rows::generator)?;
    read_table(dir, &mut network.links, rows::link)?;
    read_table(dir, &mut network.stores, rows::store)?;
    read_table(dir, &mut network.lines, rows::line)?;
    read_table(dir, &mut network.loads, rows::load)?;
    read_table(dir, &mut network.global_constraints, rows::global_constraint)?;

    let snapshots = network.snapshots.clone();
    read_series(dir, &snapshots, &mut network.generators)?;
    read_series(dir, &snapshots, &mut network.links)?;
    read_series(dir, &snapshots, &mut network.stores)?;
    read_series(dir, &snapshots, &mut network.lines)?;
    read_series(dir, &snapshots, &mut network.loads)?;

    let meta_path = dir.join(META_FILE);
    if meta_path.exists() {
        let raw = fs::read_to_string(&meta_path)
            .with_context(|| format!("reading {}", meta_path.display()))?;
        network.meta = serde_json::from_str(&raw)
            .with_context(|| format!("parsing {}", meta_path.display()))?;
    }
    Ok(network)
}

/// Write a network as a CSV folder, creating `dir` if needed.
///
/// Empty tables and series without columns are not written, and files left
/// from an earlier export for them are removed.
pub fn export_network(network: &Network, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    write_snapshots(dir, &network.snapshots)?;

    write_table(dir, &network.buses)?;
    write_table(dir, &network.generators)?;
    write_table(dir, &network.links)?;
    write_table(dir, &network.stores)?;
    write_table(dir, &network.lines)?;
    write_table(dir, &network.loads)?;
    write_table(dir, &network.global_constraints)?;

    write_series(dir, &network.snapshots, &network.generators)?;
    write_series(dir, &network.snapshots, &network.links)?;
    write_series(dir, &network.snapshots, &network.stores)?;
    write_series(dir, &network.snapshots, &network.lines)?;
    write_series(dir, &network.snapshots, &network.loads)?;

    let path = dir.join(META_FILE);
    if network.meta.is_null() {
        remove_stale(&path)?;
    } else {
        let payload = serde_json::to_string_pretty(&network.meta)?;
        fs::write(&path, payload).with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}

fn remove_stale(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("removing {}", path.display()))?;
    }
    Ok(())
}

fn read_snapshots(dir: &Path) -> Result<Vec<NaiveDateTime>> {
    let path = dir.join(SNAPSHOTS_FILE);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(&path)
        .with_context(|| format!("opening {}", path.display()))?;
    let headers = reader.headers()?.clone();
    let position = headers
        .iter()
        .position(|name| name == SNAPSHOT_COLUMN)
        .unwrap_or(0);
    let mut snapshots = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("reading {}", path.display()))?;
        let raw = record
            .get(position)
            .ok_or_else(|| anyhow!("{}: row {} has no snapshot", path.display(), i + 2))?;
        let stamp = parse_timestamp(raw).with_context(|| format!("parsing {}", path.display()))?;
        if snapshots.last().is_some_and(|last| *last >= stamp) {
            bail!(
                "{}: snapshots must be strictly increasing (row {})",
                path.display(),
                i + 2
            );
        }
        snapshots.push(stamp);
    }
    Ok(snapshots)
}

fn write_snapshots(dir: &Path, snapshots: &[NaiveDateTime]) -> Result<()> {
    let path = dir.join(SNAPSHOTS_FILE);
    let mut writer =
        csv::Writer::from_path(&path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record([SNAPSHOT_COLUMN])?;
    for stamp in snapshots {
        writer.write_record([format_timestamp(stamp)])?;
    }
    writer.flush()?;
    Ok(())
}

fn read_table<T: Named>(
    dir: &Path,
    table: &mut ComponentTable<T>,
    parse: fn(&Row) -> Result<T>,
) -> Result<()> {
    let path = dir.join(format!("{}.csv", table.kind().list_name()));
    if !path.exists() {
        return Ok(());
    }
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(&path)
        .with_context(|| format!("opening {}", path.display()))?;
    let headers = reader.headers()?.clone();
    let columns = Columns::new(&headers);
    for (i, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("reading {}", path.display()))?;
        let item = parse(&columns.row(&record, i + 2))
            .with_context(|| format!("parsing {}", path.display()))?;
        table
            .add(item)
            .with_context(|| format!("loading {}", path.display()))?;
    }
    Ok(())
}

fn write_table<T: Named + Serialize>(dir: &Path, table: &ComponentTable<T>) -> Result<()> {
    let path = dir.join(format!("{}.csv", table.kind().list_name()));
    if table.is_empty() {
        return remove_stale(&path);
    }
    let mut writer =
        csv::Writer::from_path(&path).with_context(|| format!("creating {}", path.display()))?;
    for item in table.iter() {
        writer
            .serialize(item)
            .with_context(|| format!("writing {} to {}", item.name(), path.display()))?;
    }
    writer.flush()?;
    Ok(())
}

fn read_series<T: Named>(
    dir: &Path,
    snapshots: &[NaiveDateTime],
    table: &mut ComponentTable<T>,
) -> Result<()> {
    let kind = table.kind();
    for attr in kind.input_series() {
        let path = dir.join(format!("{}-{}.csv", kind.list_name(), attr));
        if !path.exists() {
            continue;
        }
        let frame = read_series_frame(&path, snapshots)?;
        table
            .import_series(attr, &frame)
            .with_context(|| format!("importing {}", path.display()))?;
    }
    Ok(())
}

fn read_series_frame(path: &Path, snapshots: &[NaiveDateTime]) -> Result<SeriesFrame> {
    let mut file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let df = CsvReader::new(&mut file)
        .has_header(true)
        .finish()
        .with_context(|| format!("reading {}", path.display()))?;

    let names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    let (index, columns) = names
        .split_first()
        .ok_or_else(|| anyhow!("{} has no columns", path.display()))?;
    if index != SNAPSHOT_COLUMN {
        bail!(
            "{}: first column must be '{}', found '{}'",
            path.display(),
            SNAPSHOT_COLUMN,
            index
        );
    }
    if df.height() != snapshots.len() {
        bail!(
            "{} has {} rows but the network has {} snapshots",
            path.display(),
            df.height(),
            snapshots.len()
        );
    }

    let stamps = df.column(index)?.cast(&DataType::Utf8)?;
    for (row, (raw, expected)) in stamps.utf8()?.into_iter().zip(snapshots).enumerate() {
        let raw = raw.ok_or_else(|| anyhow!("{}: row {} has no snapshot", path.display(), row + 2))?;
        let stamp = parse_timestamp(raw).with_context(|| format!("parsing {}", path.display()))?;
        if stamp != *expected {
            bail!(
                "{}: snapshot '{}' does not match network snapshot '{}'",
                path.display(),
                raw,
                format_timestamp(expected)
            );
        }
    }

    let mut frame = SeriesFrame::new(df.height());
    for name in columns {
        let series = df
            .column(name)?
            .cast(&DataType::Float64)
            .with_context(|| format!("{}: column '{}' is not numeric", path.display(), name))?;
        let values = series
            .f64()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                value.ok_or_else(|| {
                    anyhow!("{}: column '{}' row {} is empty", path.display(), name, row + 2)
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        frame.set_column(name.clone(), values)?;
    }
    Ok(frame)
}

fn write_series<T: Named>(
    dir: &Path,
    snapshots: &[NaiveDateTime],
    table: &ComponentTable<T>,
) -> Result<()> {
    let kind = table.kind();
    for attr in kind.input_series() {
        let path = dir.join(format!("{}-{}.csv", kind.list_name(), attr));
        let frame = match table.series(attr) {
            Some(frame) if !frame.is_empty() => frame,
            _ => {
                remove_stale(&path)?;
                continue;
            }
        };
        let mut columns = Vec::with_capacity(frame.num_columns() + 1);
        let stamps: Vec<String> = snapshots.iter().map(format_timestamp).collect();
        columns.push(Series::new(SNAPSHOT_COLUMN, stamps));
        for (name, values) in frame.iter() {
            columns.push(Series::new(name, values));
        }
        let mut df = DataFrame::new(columns)
            .with_context(|| format!("assembling {}", path.display()))?;
        let mut file =
            File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        CsvWriter::new(&mut file)
            .finish(&mut df)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}
