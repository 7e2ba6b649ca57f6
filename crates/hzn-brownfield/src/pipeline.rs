use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

use hzn_core::Network;
use hzn_io::{ProfileTable, RegistrationTable};

use crate::add_brownfield::{add_brownfield, BrownfieldOptions, BrownfieldReport};
use crate::build_year::add_build_year_to_new_assets;
use crate::config::BrownfieldConfig;
use crate::grid::disable_grid_expansion_if_limit_hit;
use crate::heat_pumps::{update_heat_pump_efficiency, HeatPumpUpdate};
use crate::renewables::{adjust_renewable_profiles, RenewableUpdate};
use crate::transport::{
    adjust_transport, scale_transport_capacities, TransportAdjustment, TransportScaling,
};

/// Auxiliary tables some steps need.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrownfieldInputs<'a> {
    pub registrations: Option<&'a RegistrationTable>,
    pub profiles: Option<&'a BTreeMap<String, ProfileTable>>,
}

/// Outcome of every pipeline step, for logging and run manifests.
#[derive(Debug, Clone, Serialize)]
pub struct BrownfieldSummary {
    pub year: u32,
    pub renewables: Vec<RenewableUpdate>,
    pub assets_tagged: usize,
    pub heat_pumps: HeatPumpUpdate,
    pub brownfield: BrownfieldReport,
    pub constraints_removed: Vec<String>,
    pub transport_scaling: Vec<TransportScaling>,
    pub transport: Option<TransportAdjustment>,
}

/// Prepare `n` for `year` from the solved previous horizon `n_p`.
///
/// `n_p` is modified: its heat pumps receive this horizon's efficiencies
/// before being carried over.
pub fn prepare_brownfield(
    n: &mut Network,
    n_p: &mut Network,
    inputs: BrownfieldInputs<'_>,
    config: &BrownfieldConfig,
    year: u32,
) -> Result<BrownfieldSummary> {
    let renewables = match (&config.renewable, inputs.profiles) {
        (Some(renewable), Some(profiles)) => {
            adjust_renewable_profiles(n, profiles, renewable, year)
                .context("adjusting renewable profiles")?
        }
        _ => Vec::new(),
    };

    let assets_tagged = add_build_year_to_new_assets(n, year)?;
    let heat_pumps = update_heat_pump_efficiency(n, n_p, year)?;
    let brownfield = add_brownfield(n, n_p, year, &BrownfieldOptions::from(config))?;
    let constraints_removed = disable_grid_expansion_if_limit_hit(n);

    let mut transport_scaling = Vec::new();
    let mut transport = None;
    if config.endogenous_transport {
        let registrations = inputs
            .registrations
            .ok_or_else(|| anyhow!("endogenous transport needs a car registration table"))?;
        transport_scaling = scale_transport_capacities(n, n_p);
        let previous_year = brownfield
            .latest_link_build_year
            .or_else(|| n_p.links.iter().map(|l| l.build_year).max())
            .ok_or_else(|| anyhow!("previous network has no links to date the existing fleet"))?;
        transport = Some(adjust_transport(
            n,
            previous_year,
            year,
            registrations,
            &config.car_reg_factor,
            config.transport_min_capacity,
        )?);
    }

    n.meta = horizon_meta(config, year)?;
    info!("brownfield for {} prepared", year);
    Ok(BrownfieldSummary {
        year,
        renewables,
        assets_tagged,
        heat_pumps,
        brownfield,
        constraints_removed,
        transport_scaling,
        transport,
    })
}

/// Config fields plus the planning horizon wildcard.
fn horizon_meta(config: &BrownfieldConfig, year: u32) -> Result<serde_json::Value> {
    let mut meta = serde_json::to_value(config)?;
    if let Some(fields) = meta.as_object_mut() {
        fields.insert(
            "wildcards".to_string(),
            serde_json::json!({ "planning_horizons": year }),
        );
    }
    Ok(meta)
}
