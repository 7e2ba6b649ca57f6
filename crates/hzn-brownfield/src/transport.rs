//! Land transport adjustments for a constant vehicle fleet.
//!
//! When the number of vehicles stays fixed but demand changes, each vehicle
//! drives more or less, so link and battery capacities scale with demand.
//! Existing combustion fleets shrink at the yearly registration rate.

use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

use hzn_core::Network;
use hzn_io::RegistrationTable;

use crate::config::YearlyValue;

pub const TRANSPORT_TYPES: [&str; 2] = ["light", "heavy"];

/// Link carriers of land transport, all drive trains and vehicle classes.
pub const LAND_TRANSPORT_CARRIERS: [&str; 6] = [
    "land transport EV heavy",
    "land transport fuel cell heavy",
    "land transport oil heavy",
    "land transport EV light",
    "land transport fuel cell light",
    "land transport oil light",
];

#[derive(Debug, Clone, Serialize)]
pub struct TransportScaling {
    pub transport_type: String,
    pub carrier: String,
    /// Ratio of current to previous demand; `None` when undefined
    pub factor: Option<f64>,
    pub links_scaled: usize,
    pub stores_scaled: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TransportAdjustment {
    pub previous_year: u32,
    /// Remaining share of the existing oil fleet, by link name
    pub unchanged_fleet: IndexMap<String, f64>,
    pub links_without_registration: Vec<String>,
    pub removed: Vec<String>,
}

/// Total demand per load carrier, summed over snapshots of the `p_set` series.
pub fn load_by_carrier(n: &Network) -> IndexMap<String, f64> {
    let mut totals = IndexMap::new();
    let Some(p_set) = n.loads.series("p_set") else {
        return totals;
    };
    for (name, total) in p_set.column_sums() {
        if let Some(load) = n.loads.get(&name) {
            *totals.entry(load.carrier.clone()).or_insert(0.0) += total;
        }
    }
    totals
}

fn demand_factor(current: &IndexMap<String, f64>, previous: &IndexMap<String, f64>, carrier: &str) -> Option<f64> {
    let now = current.get(carrier)?;
    let before = previous.get(carrier)?;
    let factor = now / before;
    (factor.is_finite() && *before != 0.0).then_some(factor)
}

/// Scale fixed transport capacities by the change in land transport demand.
pub fn scale_transport_capacities(n: &mut Network, n_p: &Network) -> Vec<TransportScaling> {
    info!("scaling transport capacities for a constant number of vehicles");
    let current = load_by_carrier(n);
    let previous = load_by_carrier(n_p);
    let mut scalings = Vec::with_capacity(TRANSPORT_TYPES.len());

    for transport_type in TRANSPORT_TYPES {
        let carrier = format!("land transport demand {}", transport_type);
        let mut scaling = TransportScaling {
            transport_type: transport_type.to_string(),
            carrier: carrier.clone(),
            factor: demand_factor(&current, &previous, &carrier),
            links_scaled: 0,
            stores_scaled: 0,
        };
        let Some(factor) = scaling.factor else {
            warn!("no demand ratio for '{}', transport capacities left unchanged", carrier);
            scalings.push(scaling);
            continue;
        };

        let charger = format!("BEV charger {}", transport_type);
        let ev_battery = format!("EV battery {}", transport_type);
        let targets = n.links.select(|link| {
            !link.p_nom_extendable
                && (n.bus_carrier(&link.bus1) == Some(carrier.as_str())
                    || link.carrier == charger
                    || link.bus0.contains(&ev_battery))
        });
        for name in &targets {
            if let Some(link) = n.links.get_mut(name) {
                link.p_nom *= factor;
                link.p_nom_opt *= factor;
                link.capital_cost /= factor;
            }
        }
        scaling.links_scaled = targets.len();

        let battery = format!("battery storage {}", transport_type);
        for store in n
            .stores
            .iter_mut()
            .filter(|s| !s.e_nom_extendable && s.name.contains(&battery))
        {
            store.e_nom *= factor;
            store.e_nom_opt *= factor;
            scaling.stores_scaled += 1;
        }
        info!(
            "{}: factor {:.4}, {} links, {} stores",
            transport_type, factor, scaling.links_scaled, scaling.stores_scaled
        );
        scalings.push(scaling);
    }
    scalings
}

/// Shrink existing oil vehicle fleets by new registrations since `previous_year`
/// and drop land transport links left below `min_capacity`.
pub fn adjust_transport(
    n: &mut Network,
    previous_year: u32,
    year: u32,
    registrations: &RegistrationTable,
    factors: &BTreeMap<String, YearlyValue>,
    min_capacity: f64,
) -> Result<TransportAdjustment> {
    let mut adjustment = TransportAdjustment {
        previous_year,
        ..TransportAdjustment::default()
    };
    let elapsed = f64::from(year) - f64::from(previous_year);

    for transport_type in TRANSPORT_TYPES {
        let factor = factors
            .get(transport_type)
            .ok_or_else(|| anyhow!("car_reg_factor has no entry for '{}'", transport_type))?
            .get(year)
            .with_context(|| format!("car_reg_factor.{}", transport_type))?;

        let unchanged: IndexMap<String, f64> = registrations
            .rates(transport_type)
            .into_iter()
            .map(|(country, rate)| {
                let share = (1.0 - rate * factor * elapsed).max(0.0);
                (
                    format!("{} land transport oil {}-existing", country, transport_type),
                    share,
                )
            })
            .collect();

        let carrier = format!("land transport oil {}", transport_type);
        for link in n.links.iter_mut().filter(|l| {
            !l.p_nom_extendable && l.lifetime.is_infinite() && l.carrier == carrier
        }) {
            match unchanged.get(&link.name) {
                Some(share) => {
                    link.p_nom *= share;
                    adjustment.unchanged_fleet.insert(link.name.clone(), *share);
                }
                None => {
                    link.p_nom = 0.0;
                    adjustment.links_without_registration.push(link.name.clone());
                }
            }
        }
    }

    info!("removing small land transport capacities");
    let small = n.links.select(|l| {
        LAND_TRANSPORT_CARRIERS.contains(&l.carrier.as_str())
            && !l.p_nom_extendable
            && l.p_nom < min_capacity
    });
    n.links.remove(&small);
    adjustment.removed = small;
    Ok(adjustment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hzn_core::{parse_timestamp, Bus, Link, Load, Store};
    use hzn_io::Registration;

    fn network(light_demand: f64) -> Network {
        let mut n = Network::with_snapshots(vec![
            parse_timestamp("2013-01-01 00:00:00").unwrap(),
            parse_timestamp("2013-01-01 12:00:00").unwrap(),
        ]);
        n.buses
            .add(Bus {
                name: "DE0 0 land transport".into(),
                carrier: "land transport demand light".into(),
            })
            .unwrap();
        n.loads
            .add(Load {
                name: "DE0 0 land transport".into(),
                bus: "DE0 0 land transport".into(),
                carrier: "land transport demand light".into(),
                ..Load::default()
            })
            .unwrap();
        let mut p_set = n.new_series();
        p_set
            .set_column("DE0 0 land transport", vec![light_demand / 2.0; 2])
            .unwrap();
        n.loads.import_series("p_set", &p_set).unwrap();
        n
    }

    fn link(name: &str, carrier: &str, bus0: &str, bus1: &str, p_nom: f64) -> Link {
        Link {
            name: name.into(),
            carrier: carrier.into(),
            bus0: bus0.into(),
            bus1: bus1.into(),
            p_nom,
            p_nom_opt: p_nom,
            capital_cost: 100.0,
            ..Link::default()
        }
    }

    #[test]
    fn scales_links_and_stores_by_demand_ratio() {
        let n_p = network(100.0);
        let mut n = network(150.0);
        n.links
            .add(link("DE0 0 land transport EV light", "land transport EV light", "DE0 0 EV battery light", "DE0 0 land transport", 40.0))
            .unwrap();
        n.links
            .add(link("DE0 0 BEV charger light", "BEV charger light", "DE0 0", "DE0 0 EV battery light", 20.0))
            .unwrap();
        n.links
            .add(link("DE0 0 OCGT", "OCGT", "DE0 0 gas", "DE0 0", 20.0))
            .unwrap();
        n.stores
            .add(Store {
                name: "DE0 0 battery storage light".into(),
                e_nom: 10.0,
                e_nom_opt: 10.0,
                ..Store::default()
            })
            .unwrap();

        let scalings = scale_transport_capacities(&mut n, &n_p);
        let light = &scalings[0];
        assert_eq!(light.factor, Some(1.5));
        assert_eq!(light.links_scaled, 2);
        assert_eq!(light.stores_scaled, 1);
        assert_eq!(scalings[1].factor, None);

        let ev = n.links.get("DE0 0 land transport EV light").unwrap();
        assert_eq!(ev.p_nom, 60.0);
        assert_eq!(ev.p_nom_opt, 60.0);
        assert!((ev.capital_cost - 100.0 / 1.5).abs() < 1e-12);
        assert_eq!(n.links.get("DE0 0 OCGT").unwrap().p_nom, 20.0);
        assert_eq!(n.stores.get("DE0 0 battery storage light").unwrap().e_nom, 15.0);
    }

    #[test]
    fn zero_previous_demand_leaves_capacities() {
        let n_p = network(0.0);
        let mut n = network(10.0);
        n.links
            .add(link("DE0 0 BEV charger light", "BEV charger light", "DE0 0", "DE0 0 EV battery light", 20.0))
            .unwrap();
        let scalings = scale_transport_capacities(&mut n, &n_p);
        assert_eq!(scalings[0].factor, None);
        assert_eq!(n.links.get("DE0 0 BEV charger light").unwrap().p_nom, 20.0);
    }

    fn oil(name: &str, carrier: &str, p_nom: f64) -> Link {
        Link {
            name: name.into(),
            carrier: carrier.into(),
            p_nom,
            ..Link::default()
        }
    }

    #[test]
    fn shrinks_existing_oil_fleet() {
        let mut n = Network::new();
        for l in [
            oil("DE0 0 land transport oil light-existing", "land transport oil light", 100.0),
            oil("FR0 0 land transport oil light-existing", "land transport oil light", 50.0),
            oil("DE0 0 land transport oil heavy-existing", "land transport oil heavy", 10.0),
            oil("DE0 0 land transport EV light-existing", "land transport EV light", 0.5),
        ] {
            n.links.add(l).unwrap();
        }
        let registrations = RegistrationTable::from_rows(vec![
            Registration {
                transport_type: "light".into(),
                country: "DE0 0".into(),
                rate: 0.05,
            },
            Registration {
                transport_type: "heavy".into(),
                country: "DE0 0".into(),
                rate: 0.2,
            },
        ]);
        let mut factors = BTreeMap::new();
        factors.insert("light".to_string(), YearlyValue::Scalar(1.0));
        factors.insert("heavy".to_string(), YearlyValue::Scalar(1.0));

        let adjustment =
            adjust_transport(&mut n, 2030, 2040, &registrations, &factors, 1.0).unwrap();

        // 1 - 0.05 * 10 = 0.5
        let light = n.links.get("DE0 0 land transport oil light-existing").unwrap();
        assert!((light.p_nom - 50.0).abs() < 1e-9);
        // heavy: 1 - 0.2 * 10 < 0, clipped, then removed as too small
        assert!(!n.links.contains("DE0 0 land transport oil heavy-existing"));
        assert!(!n.links.contains("FR0 0 land transport oil light-existing"));
        assert!(!n.links.contains("DE0 0 land transport EV light-existing"));
        assert_eq!(
            adjustment.links_without_registration,
            vec!["FR0 0 land transport oil light-existing"]
        );
        assert_eq!(adjustment.removed.len(), 3);
    }

    #[test]
    fn missing_factor_year_is_an_error() {
        let mut n = Network::new();
        let mut factors = BTreeMap::new();
        factors.insert("light".to_string(), YearlyValue::ByYear(BTreeMap::from([(2030, 1.0)])));
        factors.insert("heavy".to_string(), YearlyValue::Scalar(1.0));
        let err = adjust_transport(&mut n, 2030, 2040, &RegistrationTable::default(), &factors, 1.0)
            .unwrap_err();
        assert!(format!("{:#}", err).contains("2040"));
    }
}
