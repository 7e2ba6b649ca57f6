//! Renewable capacity-factor profiles by weather year.
//!
//! One file per carrier, `profile_{carrier}.csv`, in long-by-year layout:
//!
//! ```text
//! year,time,DE0 0,DE0 1
//! 2013,2013-01-01 00:00:00,0.0,0.1
//! 2013,2013-01-01 01:00:00,0.2,0.1
//! 2019,2013-01-01 00:00:00,0.1,0.0
//! ```
//!
//! Every year carries its own hourly time axis.

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::path::Path;

use hzn_core::{parse_timestamp, SeriesFrame};

use crate::rows::Columns;

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileYear {
    pub times: Vec<NaiveDateTime>,
    /// One column per bus
    pub values: SeriesFrame,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileTable {
    pub carrier: String,
    pub buses: Vec<String>,
    pub years: BTreeMap<u32, ProfileYear>,
}

impl ProfileTable {
    /// A table with no buses or no years carries nothing to apply.
    pub fn is_usable(&self) -> bool {
        !self.buses.is_empty() && !self.years.is_empty()
    }

    /// Latest weather year not after `year`, else the earliest one.
    pub fn closest_year(&self, year: u32) -> Option<u32> {
        self.years
            .range(..=year)
            .next_back()
            .or_else(|| self.years.iter().next())
            .map(|(y, _)| *y)
    }

    pub fn year(&self, year: u32) -> Option<&ProfileYear> {
        self.years.get(&year)
    }
}

/// Load `profile_{carrier}.csv` from `dir` for every carrier given.
pub fn load_profiles(dir: &Path, carriers: &[String]) -> Result<BTreeMap<String, ProfileTable>> {
    let mut tables = BTreeMap::new();
    for carrier in carriers {
        let path = dir.join(format!("profile_{}.csv", carrier));
        let table = load_profile(&path, carrier)?;
        tables.insert(carrier.clone(), table);
    }
    Ok(tables)
}

pub fn load_profile(path: &Path, carrier: &str) -> Result<ProfileTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("opening profile {}", path.display()))?;
    let headers = reader.headers()?.clone();
    if headers.get(0) != Some("year") || headers.get(1) != Some("time") {
        bail!("{}: expected leading columns 'year,time'", path.display());
    }
    let buses: Vec<String> = headers.iter().skip(2).map(str::to_string).collect();
    let columns = Columns::new(&headers);

    let mut times: BTreeMap<u32, Vec<NaiveDateTime>> = BTreeMap::new();
    let mut values: BTreeMap<u32, Vec<Vec<f64>>> = BTreeMap::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("reading {}", path.display()))?;
        let row = columns.row(&record, i + 2);
        let year = row
            .year("year")
            .with_context(|| format!("parsing {}", path.display()))?;
        let raw_time = row
            .at(1)
            .ok_or_else(|| anyhow!("{}: row {} has no time", path.display(), i + 2))?;
        let time = parse_timestamp(raw_time).with_context(|| format!("parsing {}", path.display()))?;
        times.entry(year).or_default().push(time);

        let per_bus = values
            .entry(year)
            .or_insert_with(|| vec![Vec::new(); buses.len()]);
        for (position, column) in per_bus.iter_mut().enumerate() {
            let raw = row.at(position + 2).ok_or_else(|| {
                anyhow!(
                    "{}: row {} has no value for '{}'",
                    path.display(),
                    i + 2,
                    buses[position]
                )
            })?;
            let value = raw
                .parse::<f64>()
                .with_context(|| format!("{}: row {} value '{}'", path.display(), i + 2, raw))?;
            column.push(value);
        }
    }

    let mut years = BTreeMap::new();
    for (year, year_times) in times {
        let mut frame = SeriesFrame::new(year_times.len());
        let year_values = values.remove(&year).unwrap_or_default();
        for (bus, column) in buses.iter().zip(year_values) {
            frame.set_column(bus.clone(), column)?;
        }
        years.insert(
            year,
            ProfileYear {
                times: year_times,
                values: frame,
            },
        );
    }
    Ok(ProfileTable {
        carrier: carrier.to_string(),
        buses,
        years,
    })
}
