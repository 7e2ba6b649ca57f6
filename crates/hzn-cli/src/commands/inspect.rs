//! Network summary: component counts, installed capacity, islands and
//! validation issues.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use hzn_cli::common::{print_json, print_table, OutputFormat};
use hzn_core::{topology_stats, Diagnostics, NetworkStats, TopologyStats};
use hzn_io::load_network;

#[derive(Serialize)]
struct InspectReport {
    name: String,
    stats: NetworkStats,
    topology: TopologyStats,
    diagnostics: Diagnostics,
}

pub fn handle(network: &Path, format: OutputFormat) -> Result<()> {
    let n = load_network(network)?;
    let report = InspectReport {
        name: n.name.clone(),
        stats: n.stats(),
        topology: topology_stats(&n),
        diagnostics: n.validate(),
    };
    match format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Table => print_report(&report),
    }
}

fn print_report(report: &InspectReport) -> Result<()> {
    let s = &report.stats;
    let counts = vec![
        ("snapshots".to_string(), s.num_snapshots.to_string()),
        ("buses".to_string(), s.num_buses.to_string()),
        ("generators".to_string(), s.num_generators.to_string()),
        ("links".to_string(), s.num_links.to_string()),
        ("stores".to_string(), s.num_stores.to_string()),
        ("lines".to_string(), s.num_lines.to_string()),
        ("loads".to_string(), s.num_loads.to_string()),
        (
            "global constraints".to_string(),
            s.num_global_constraints.to_string(),
        ),
        ("extendable".to_string(), s.num_extendable.to_string()),
    ];
    print_table(&format!("Network {}", report.name), &counts)?;

    let capacity = vec![
        ("generators p_nom (MW)".to_string(), format!("{:.1}", s.generator_p_nom_mw)),
        ("links p_nom (MW)".to_string(), format!("{:.1}", s.link_p_nom_mw)),
        ("stores e_nom (MWh)".to_string(), format!("{:.1}", s.store_e_nom_mwh)),
        ("lines s_nom (MVA)".to_string(), format!("{:.1}", s.line_s_nom_mva)),
    ];
    print_table("Installed capacity", &capacity)?;

    let t = &report.topology;
    let mut topology = vec![
        ("edges".to_string(), t.edge_count.to_string()),
        ("max degree".to_string(), t.max_degree.to_string()),
        ("islands".to_string(), t.islands.len().to_string()),
    ];
    for island in &t.islands {
        topology.push((
            format!("island {}", island.island_id),
            format!("{} buses (e.g. {})", island.bus_count, island.representative),
        ));
    }
    print_table("Topology", &topology)?;

    let d = &report.diagnostics;
    let issues: Vec<(String, String)> = d
        .iter()
        .map(|issue| (format!("{:?}", issue.severity), issue.to_string()))
        .collect();
    print_table(
        &format!(
            "Diagnostics: {} errors, {} warnings",
            d.error_count(),
            d.warning_count()
        ),
        &issues,
    )
}
