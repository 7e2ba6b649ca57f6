use anyhow::{bail, Result};
use serde::Serialize;
use tracing::{info, warn};

use hzn_core::Network;

#[derive(Debug, Clone, Default, Serialize)]
pub struct HeatPumpUpdate {
    pub updated: usize,
    /// Previous heat pumps without a current-horizon efficiency series
    pub skipped: Vec<String>,
}

/// Current-horizon name of a heat pump built in an earlier horizon.
///
/// The trailing four-digit build year is replaced by `year`.
pub fn current_heat_pump_name(previous: &str, year: u32) -> Option<String> {
    let cut = previous.char_indices().rev().nth(3)?.0;
    Some(format!("{}{}", &previous[..cut], year))
}

/// Give heat pumps of the previous horizon this horizon's efficiency (COP) series.
pub fn update_heat_pump_efficiency(n: &Network, n_p: &mut Network, year: u32) -> Result<HeatPumpUpdate> {
    let mut update = HeatPumpUpdate::default();
    let heat_pumps: Vec<String> = n_p
        .links
        .names()
        .filter(|name| name.contains("heat pump"))
        .map(str::to_string)
        .collect();
    if heat_pumps.is_empty() {
        return Ok(update);
    }
    if n.num_snapshots() != n_p.num_snapshots() {
        bail!(
            "cannot copy heat pump efficiencies: {} snapshots in the current network, {} in the previous",
            n.num_snapshots(),
            n_p.num_snapshots()
        );
    }

    let current = n.links.series("efficiency");
    let rows = n_p.num_snapshots();
    let target = n_p.links.series_entry("efficiency", rows)?;
    for name in heat_pumps {
        let values = current_heat_pump_name(&name, year)
            .and_then(|counterpart| current.and_then(|frame| frame.column(&counterpart)));
        match values {
            Some(values) => {
                target.set_column(name, values.to_vec())?;
                update.updated += 1;
            }
            None => {
                warn!("no efficiency series for the {} counterpart of '{}'", year, name);
                update.skipped.push(name);
            }
        }
    }
    info!(
        "updated efficiency of {} heat pumps ({} skipped)",
        update.updated,
        update.skipped.len()
    );
    Ok(update)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hzn_core::{parse_timestamp, Link};

    fn network(names: &[&str]) -> Network {
        let mut n = Network::with_snapshots(vec![
            parse_timestamp("2013-01-01 00:00:00").unwrap(),
            parse_timestamp("2013-01-01 12:00:00").unwrap(),
        ]);
        for name in names {
            n.links
                .add(Link {
                    name: name.to_string(),
                    ..Link::default()
                })
                .unwrap();
        }
        n
    }

    #[test]
    fn counterpart_name_swaps_year() {
        assert_eq!(
            current_heat_pump_name("DE0 0 urban central air heat pump-2030", 2040).as_deref(),
            Some("DE0 0 urban central air heat pump-2040")
        );
        assert_eq!(current_heat_pump_name("abc", 2040), None);
    }

    #[test]
    fn copies_current_cop_into_previous_heat_pumps() {
        let mut n = network(&["DE0 0 rural ground heat pump-2040"]);
        let mut cop = n.new_series();
        cop.set_column("DE0 0 rural ground heat pump-2040", vec![3.1, 3.4])
            .unwrap();
        n.links.import_series("efficiency", &cop).unwrap();

        let mut n_p = network(&[
            "DE0 0 rural ground heat pump-2030",
            "DE0 0 rural ground heat pump-2020",
            "FR0 0 rural ground heat pump-2030",
            "DE0 0 gas boiler-2030",
        ]);
        let update = update_heat_pump_efficiency(&n, &mut n_p, 2040).unwrap();
        assert_eq!(update.updated, 2);
        assert_eq!(update.skipped, vec!["FR0 0 rural ground heat pump-2030"]);

        let series = n_p.links.series("efficiency").unwrap();
        assert_eq!(series.column("DE0 0 rural ground heat pump-2020").unwrap(), &[3.1, 3.4]);
        assert!(!series.contains("DE0 0 gas boiler-2030"));
    }

    #[test]
    fn snapshot_mismatch_is_an_error() {
        let n = Network::new();
        let mut n_p = network(&["DE0 0 rural ground heat pump-2030"]);
        assert!(update_heat_pump_efficiency(&n, &mut n_p, 2040).is_err());
    }
}
