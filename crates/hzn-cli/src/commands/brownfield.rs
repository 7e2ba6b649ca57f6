use anyhow::{Context, Result};
use tracing::{info, warn};

use hzn_brownfield::{
    load_config_from_path, prepare_brownfield, profile_carriers, validate, BrownfieldConfig,
    BrownfieldInputs, BrownfieldSummary,
};
use hzn_cli::cli::BrownfieldArgs;
use hzn_cli::common::{print_json, print_table, OutputFormat};
use hzn_io::{export_network, load_network, load_profiles, load_registrations};

pub fn handle(args: &BrownfieldArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => load_config_from_path(path)?,
        None => BrownfieldConfig::default(),
    };
    validate(&config).context("invalid brownfield config")?;

    info!("loading network {}", args.network.display());
    let mut n = load_network(&args.network)
        .with_context(|| format!("loading network {}", args.network.display()))?;
    info!("loading previous network {}", args.network_previous.display());
    let mut n_p = load_network(&args.network_previous)
        .with_context(|| format!("loading network {}", args.network_previous.display()))?;

    let registrations = args
        .car_registration
        .as_deref()
        .map(load_registrations)
        .transpose()?;
    let profiles = match (&config.renewable, &args.profiles) {
        (Some(renewable), Some(dir)) => Some(load_profiles(dir, &profile_carriers(renewable))?),
        (Some(_), None) => {
            warn!("renewable profiles configured but --profiles not given, keeping p_max_pu");
            None
        }
        _ => None,
    };
    let inputs = BrownfieldInputs {
        registrations: registrations.as_ref(),
        profiles: profiles.as_ref(),
    };

    let summary = prepare_brownfield(&mut n, &mut n_p, inputs, &config, args.year)?;
    export_network(&n, &args.out)
        .with_context(|| format!("writing network {}", args.out.display()))?;
    info!("wrote {}", args.out.display());

    match args.format {
        OutputFormat::Json => print_json(&summary),
        OutputFormat::Table => print_summary(&summary),
    }
}

fn print_summary(summary: &BrownfieldSummary) -> Result<()> {
    let report = &summary.brownfield;
    let mut rows = vec![
        ("assets tagged".to_string(), summary.assets_tagged.to_string()),
        (
            "heat pumps updated".to_string(),
            summary.heat_pumps.updated.to_string(),
        ),
        ("lines floored".to_string(), report.lines_floored.to_string()),
        ("DC links floored".to_string(), report.dc_links_floored.to_string()),
    ];
    for carried in &report.components {
        rows.push((
            format!("{} carried", carried.component.list_name()),
            format!(
                "{} ({:.1} fixed; dropped {} trackers, {} retired, {} small)",
                carried.added,
                carried.capacity_added,
                carried.trackers_dropped,
                carried.retired,
                carried.below_threshold + carried.chp_heat_below_threshold
            ),
        ));
    }
    if let Some(retrofit) = &report.retrofit {
        rows.push((
            "gas pipelines reduced".to_string(),
            retrofit.gas_pipelines.to_string(),
        ));
    }
    for update in &summary.renewables {
        let year = update
            .weather_year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "-".to_string());
        rows.push((
            format!("profile {}", update.carrier),
            format!("{} generators, weather year {}", update.generators_updated, year),
        ));
    }
    rows.push((
        "constraints removed".to_string(),
        if summary.constraints_removed.is_empty() {
            "none".to_string()
        } else {
            summary.constraints_removed.join(", ")
        },
    ));
    for scaling in &summary.transport_scaling {
        let factor = scaling
            .factor
            .map(|f| format!("{:.4}", f))
            .unwrap_or_else(|| "undefined".to_string());
        rows.push((
            format!("transport {}", scaling.transport_type),
            format!(
                "factor {}, {} links, {} stores",
                factor, scaling.links_scaled, scaling.stores_scaled
            ),
        ));
    }
    if let Some(transport) = &summary.transport {
        rows.push((
            "small transport links removed".to_string(),
            transport.removed.len().to_string(),
        ));
    }
    print_table(&format!("Brownfield {}", summary.year), &rows)
}
