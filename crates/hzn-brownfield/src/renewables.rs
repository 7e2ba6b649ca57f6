//! Refresh renewable availability from weather-year profiles.
//!
//! Profiles are hourly; the network may run at a coarser resolution. Each
//! hour is assigned to the latest network snapshot at or before it and
//! averaged per snapshot.

use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, Duration, NaiveDateTime};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{info, warn};

use hzn_core::{parse_timestamp, Network};
use hzn_io::ProfileTable;

use crate::config::{Inclusive, RenewableConfig};

/// Carriers whose profiles are not refreshed.
pub const FIXED_PROFILE_CARRIERS: [&str; 1] = ["hydro"];

#[derive(Debug, Clone, Serialize)]
pub struct RenewableUpdate {
    pub carrier: String,
    pub weather_year: Option<u32>,
    pub generators_updated: usize,
}

/// Carriers of `config` whose profiles are applied.
pub fn profile_carriers(config: &RenewableConfig) -> Vec<String> {
    config
        .carriers
        .iter()
        .filter(|c| !FIXED_PROFILE_CARRIERS.contains(&c.as_str()))
        .cloned()
        .collect()
}

/// Hourly time axis of the profiles.
pub fn full_resolution_hours(config: &RenewableConfig) -> Result<Vec<NaiveDateTime>> {
    let start = parse_timestamp(&config.snapshots.start).context("parsing snapshot start")?;
    let end = parse_timestamp(&config.snapshots.end).context("parsing snapshot end")?;
    let inclusive = config.snapshots.inclusive;
    let mut hours = Vec::new();
    let mut hour = start;
    while hour <= end {
        let keep = match inclusive {
            Inclusive::Both => true,
            Inclusive::Left => hour != end,
            Inclusive::Right => hour != start,
            Inclusive::Neither => hour != start && hour != end,
        };
        let leap_day = hour.month() == 2 && hour.day() == 29;
        if keep && !(config.drop_leap_day && leap_day) {
            hours.push(hour);
        }
        hour += Duration::hours(1);
    }
    Ok(hours)
}

/// Map each hour to the index of the snapshot it is averaged into.
///
/// Hours that are snapshots map to themselves; other hours follow the last
/// hour that was. Hours before the first such hour have no snapshot.
pub fn snapshot_map(hours: &[NaiveDateTime], snapshots: &[NaiveDateTime]) -> HashMap<NaiveDateTime, usize> {
    let positions: HashMap<NaiveDateTime, usize> =
        snapshots.iter().enumerate().map(|(i, s)| (*s, i)).collect();
    let mut map = HashMap::with_capacity(hours.len());
    let mut current = None;
    for hour in hours {
        if let Some(&position) = positions.get(hour) {
            current = Some(position);
        }
        if let Some(position) = current {
            map.insert(*hour, position);
        }
    }
    map
}

/// Replace `p_max_pu` of existing renewable generators with the closest weather year.
pub fn adjust_renewable_profiles(
    n: &mut Network,
    profiles: &BTreeMap<String, ProfileTable>,
    config: &RenewableConfig,
    year: u32,
) -> Result<Vec<RenewableUpdate>> {
    let hours = full_resolution_hours(config)?;
    let map = snapshot_map(&hours, &n.snapshots);
    let rows = n.num_snapshots();
    let mut updates = Vec::new();

    for carrier in profile_carriers(config) {
        let table = profiles
            .get(&carrier)
            .ok_or_else(|| anyhow!("no profile loaded for carrier '{}'", carrier))?;
        let mut update = RenewableUpdate {
            carrier: carrier.clone(),
            weather_year: None,
            generators_updated: 0,
        };
        if !table.is_usable() {
            info!("profile for '{}' has no buses or years, skipping", carrier);
            updates.push(update);
            continue;
        }
        let Some(weather_year) = table.closest_year(year) else {
            updates.push(update);
            continue;
        };
        let Some(profile) = table.year(weather_year) else {
            updates.push(update);
            continue;
        };
        update.weather_year = Some(weather_year);

        let mut counts = vec![0usize; rows];
        let mut row_targets = Vec::with_capacity(profile.times.len());
        for time in &profile.times {
            let target = map.get(time).copied();
            if let Some(position) = target {
                counts[position] += 1;
            }
            row_targets.push(target);
        }

        let generators: HashSet<String> = n.generators.names().map(str::to_string).collect();
        let mut columns = Vec::new();
        for (bus, values) in profile.values.iter() {
            let name = format!("{} {}", bus, carrier);
            if !generators.contains(&name) {
                continue;
            }
            let mut sums = vec![0.0; rows];
            for (value, target) in values.iter().zip(&row_targets) {
                if let Some(position) = target {
                    sums[*position] += value;
                }
            }
            columns.push((name, sums));
        }

        for (name, sums) in columns {
            let fallback = n
                .generators
                .get(&name)
                .map(|g| g.p_max_pu)
                .unwrap_or(1.0);
            let frame = n.generators.series_entry("p_max_pu", rows)?;
            let mut values = frame
                .column(&name)
                .map(<[f64]>::to_vec)
                .unwrap_or_else(|| vec![fallback; rows]);
            for (position, value) in values.iter_mut().enumerate() {
                if counts[position] > 0 {
                    *value = sums[position] / counts[position] as f64;
                }
            }
            frame.set_column(name, values)?;
            update.generators_updated += 1;
        }

        if update.generators_updated == 0 {
            warn!("profile for '{}' matched no generators", carrier);
        } else {
            info!(
                "{}: applied weather year {} to {} generators",
                carrier, weather_year, update.generators_updated
            );
        }
        updates.push(update);
    }
    Ok(updates)
}
