use tracing::info;

use hzn_core::{Line, Link, Network};

/// Relative gap below which a transmission limit counts as already reached.
pub const LIMIT_TOLERANCE: f64 = 1e-6;

/// Global constraint types on transmission expansion and the attribute each weighs by.
const LIMIT_TYPES: [(&str, LimitWeight); 2] = [
    ("transmission_expansion_cost_limit", LimitWeight::CapitalCost),
    ("transmission_volume_expansion_limit", LimitWeight::Length),
];

#[derive(Debug, Clone, Copy)]
enum LimitWeight {
    CapitalCost,
    Length,
}

impl LimitWeight {
    fn line(self, line: &Line) -> f64 {
        match self {
            LimitWeight::CapitalCost => line.capital_cost,
            LimitWeight::Length => line.length,
        }
    }

    fn link(self, link: &Link) -> f64 {
        match self {
            LimitWeight::CapitalCost => link.capital_cost,
            LimitWeight::Length => link.length,
        }
    }
}

fn is_extendable_dc(link: &Link) -> bool {
    link.carrier == "DC" && link.p_nom_extendable
}

fn committed_expansion(n: &Network, weight: LimitWeight) -> f64 {
    let lines: f64 = n
        .lines
        .iter()
        .filter(|l| l.s_nom_extendable)
        .map(|l| l.s_nom_min * weight.line(l))
        .sum();
    let links: f64 = n
        .links
        .iter()
        .filter(|l| is_extendable_dc(l))
        .map(|l| l.p_nom_min * weight.link(l))
        .sum();
    lines + links
}

fn limit_reached(constant: f64, total: f64) -> bool {
    if constant == 0.0 || !constant.is_finite() {
        return false;
    }
    (constant - total).abs() / constant < LIMIT_TOLERANCE
}

/// Freeze the grid when the minimum capacities already exhaust a transmission limit.
///
/// Extendable lines and DC links are fixed at their minimum and the limit
/// constraint is removed. Returns the names of the removed constraints.
pub fn disable_grid_expansion_if_limit_hit(n: &mut Network) -> Vec<String> {
    let mut removed = Vec::new();
    for (limit_type, weight) in LIMIT_TYPES {
        let constraints: Vec<(String, f64)> = n
            .global_constraints
            .iter()
            .filter(|c| c.kind == limit_type)
            .map(|c| (c.name.clone(), c.constant))
            .collect();
        for (name, constant) in constraints {
            let total = committed_expansion(n, weight);
            if !limit_reached(constant, total) {
                continue;
            }
            info!(
                "{} '{}' already reached ({} of {}), disabling grid expansion",
                limit_type, name, total, constant
            );
            for line in n.lines.iter_mut().filter(|l| l.s_nom_extendable) {
                line.s_nom = line.s_nom_min;
                line.s_nom_extendable = false;
            }
            for link in n.links.iter_mut().filter(|l| is_extendable_dc(l)) {
                link.p_nom = link.p_nom_min;
                link.p_nom_extendable = false;
            }
            n.global_constraints.remove([name.as_str()]);
            removed.push(name);
        }
    }
    removed
}
