//! Carry optimized capacities of the previous horizon into the current network.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info, warn};

use hzn_core::{Asset, ComponentKind, Generator, Link, Network, Store};

use crate::config::BrownfieldConfig;

pub const H2_RETROFIT_CARRIER: &str = "H2 pipeline retrofitted";
pub const GAS_PIPELINE_CARRIER: &str = "gas pipeline";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrownfieldOptions {
    pub threshold_capacity: f64,
    pub h2_retrofit: bool,
    pub h2_retrofit_capacity_per_ch4: f64,
}

impl From<&BrownfieldConfig> for BrownfieldOptions {
    fn from(config: &BrownfieldConfig) -> Self {
        Self {
            threshold_capacity: config.threshold_capacity,
            h2_retrofit: config.h2_retrofit,
            h2_retrofit_capacity_per_ch4: config.h2_retrofit_capacity_per_ch4,
        }
    }
}

/// What happened to one component table of the previous network.
#[derive(Debug, Clone, Serialize)]
pub struct CarryOver {
    pub component: ComponentKind,
    pub trackers_dropped: usize,
    pub retired: usize,
    pub chp_heat_below_threshold: usize,
    pub below_threshold: usize,
    pub added: usize,
    /// Capacity (MW or MWh) fixed into the current network
    pub capacity_added: f64,
}

impl CarryOver {
    fn new(component: ComponentKind) -> Self {
        Self {
            component,
            trackers_dropped: 0,
            retired: 0,
            chp_heat_below_threshold: 0,
            below_threshold: 0,
            added: 0,
            capacity_added: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RetrofitSummary {
    pub fixed_retrofits: usize,
    pub current_retrofits: usize,
    pub gas_pipelines: usize,
    /// Retrofitted H2 capacity already built, by current-horizon pipeline name
    pub already_retrofitted: IndexMap<String, f64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BrownfieldReport {
    pub year: u32,
    pub lines_floored: usize,
    pub dc_links_floored: usize,
    pub components: Vec<CarryOver>,
    pub retrofit: Option<RetrofitSummary>,
    /// Latest build year among links carried over, if any
    pub latest_link_build_year: Option<u32>,
}

/// Fix last horizon's surviving assets into `n` and floor its transmission at the built grid.
pub fn add_brownfield(
    n: &mut Network,
    n_p: &Network,
    year: u32,
    options: &BrownfieldOptions,
) -> Result<BrownfieldReport> {
    info!("preparing brownfield for the year {}", year);
    let mut report = BrownfieldReport {
        year,
        ..BrownfieldReport::default()
    };

    for line in n.lines.iter_mut() {
        if let Some(prior) = n_p.lines.get(&line.name) {
            line.s_nom_min = prior.s_nom_opt;
            report.lines_floored += 1;
        }
    }
    for link in n.links.iter_mut().filter(|l| l.carrier == "DC") {
        if let Some(prior) = n_p.links.get(&link.name) {
            link.p_nom_min = prior.p_nom_opt;
            report.dc_links_floored += 1;
        }
    }

    let links = carry_over::<Link>(n, n_p, year, options.threshold_capacity)?;
    report.latest_link_build_year = links
        .kept
        .iter()
        .filter_map(|name| n.links.get(name))
        .map(|link| link.build_year)
        .max();
    report.components.push(links.counts);
    report
        .components
        .push(carry_over::<Generator>(n, n_p, year, options.threshold_capacity)?.counts);
    report
        .components
        .push(carry_over::<Store>(n, n_p, year, options.threshold_capacity)?.counts);

    if options.h2_retrofit {
        report.retrofit = Some(apply_h2_retrofit(
            n,
            year,
            options.h2_retrofit_capacity_per_ch4,
        ));
    }
    Ok(report)
}

struct Carried {
    counts: CarryOver,
    kept: Vec<String>,
}

/// Names of the previous-network assets that survive filtering, in table order.
pub fn surviving_assets<T: Asset>(n_p: &Network, year: u32, threshold: f64) -> Vec<String> {
    classify::<T>(n_p, year, threshold).1
}

fn classify<T: Asset>(n_p: &Network, year: u32, threshold: f64) -> (CarryOver, Vec<String>) {
    let table = T::table(n_p);
    let mut counts = CarryOver::new(T::KIND);
    let mut kept = Vec::new();
    for asset in table.iter() {
        let name = asset.name();
        if asset.lifetime().is_infinite() && !name.contains("existing") {
            counts.trackers_dropped += 1;
            continue;
        }
        if asset.retired_by(year) {
            debug!("{} '{}' retired by {}", T::KIND, name, year);
            counts.retired += 1;
            continue;
        }
        if asset.extendable() {
            if is_chp_heat(name) {
                let limit = chp_heat_threshold(n_p, asset, threshold);
                if asset.nom_opt() < limit {
                    debug!("{} '{}' below CHP heat threshold {}", T::KIND, name, limit);
                    counts.chp_heat_below_threshold += 1;
                    continue;
                }
            } else if asset.nom_opt() < threshold {
                debug!("{} '{}' below threshold", T::KIND, name);
                counts.below_threshold += 1;
                continue;
            }
        }
        kept.push(name.to_string());
    }
    (counts, kept)
}

fn carry_over<T: Asset>(
    n: &mut Network,
    n_p: &Network,
    year: u32,
    threshold: f64,
) -> Result<Carried> {
    let (mut counts, kept) = classify::<T>(n_p, year, threshold);
    let prior = T::table(n_p);
    let rows = n.num_snapshots();
    let target = T::table_mut(n);

    for name in &kept {
        let Some(asset) = prior.get(name) else {
            continue;
        };
        let mut asset = asset.clone();
        asset.fix_capacity();
        counts.capacity_added += asset.nom();
        target
            .add(asset)
            .with_context(|| format!("carrying over {} '{}'", T::KIND, name))?;
        counts.added += 1;
    }

    for (attr, frame) in prior.series_iter() {
        let selected = frame.select(kept.iter().map(String::as_str));
        if selected.is_empty() {
            continue;
        }
        if selected.rows() != rows {
            anyhow::bail!(
                "{} series '{}' has {} snapshots, the current network has {}",
                T::KIND,
                attr,
                selected.rows(),
                rows
            );
        }
        target
            .import_series(attr, &selected)
            .with_context(|| format!("copying {} series '{}'", T::KIND, attr))?;
    }

    info!(
        "{}: carried {} ({} trackers, {} retired, {} below threshold)",
        T::KIND.list_name(),
        counts.added,
        counts.trackers_dropped,
        counts.retired,
        counts.below_threshold + counts.chp_heat_below_threshold
    );
    Ok(Carried { counts, kept })
}

fn is_chp_heat(name: &str) -> bool {
    name.contains("urban central") && name.contains("CHP") && name.contains("heat")
}

/// CHP heat output is tied to its electric twin, so its threshold scales with the twin.
fn chp_heat_threshold<T: Asset>(n_p: &Network, heat: &T, threshold: f64) -> f64 {
    let twin_name = heat.name().replace("heat", "electric");
    match T::table(n_p).get(&twin_name) {
        Some(electric) => threshold * electric.efficiency() * electric.nom_ratio() / heat.efficiency(),
        None => {
            warn!(
                "no electric twin '{}' for CHP heat '{}', using plain threshold",
                twin_name,
                heat.name()
            );
            threshold
        }
    }
}

/// Key used to match a retrofitted pipeline to its counterpart of `year`.
fn retrofit_key(name: &str, year: u32) -> String {
    let stem = name.split("-2").next().unwrap_or(name);
    format!("{}-{}", stem, year)
}

fn apply_h2_retrofit(n: &mut Network, year: u32, h2_per_ch4: f64) -> RetrofitSummary {
    let mut summary = RetrofitSummary::default();
    for link in n.links.iter() {
        if link.carrier == H2_RETROFIT_CARRIER && link.build_year != year {
            *summary
                .already_retrofitted
                .entry(retrofit_key(&link.name, year))
                .or_insert(0.0) += link.p_nom;
            summary.fixed_retrofits += 1;
        }
    }

    for link in n.links.iter_mut() {
        if link.carrier == H2_RETROFIT_CARRIER && link.build_year == year {
            let already = summary
                .already_retrofitted
                .get(&link.name)
                .copied()
                .unwrap_or(0.0);
            link.p_nom_max -= already;
            summary.current_retrofits += 1;
        }
    }

    let ch4_per_h2 = 1.0 / h2_per_ch4;
    let by_gas_pipe: IndexMap<String, f64> = summary
        .already_retrofitted
        .iter()
        .map(|(name, value)| (name.replace(H2_RETROFIT_CARRIER, GAS_PIPELINE_CARRIER), *value))
        .collect();
    for link in n.links.iter_mut() {
        if link.carrier == GAS_PIPELINE_CARRIER {
            let already = by_gas_pipe.get(&link.name).copied().unwrap_or(0.0);
            let remaining = link.p_nom - ch4_per_h2 * already;
            link.p_nom = remaining;
            link.p_nom_max = remaining;
            summary.gas_pipelines += 1;
        }
    }
    info!(
        "H2 retrofit: {} fixed, {} current, {} gas pipelines reduced",
        summary.fixed_retrofits, summary.current_retrofits, summary.gas_pipelines
    );
    summary
}
