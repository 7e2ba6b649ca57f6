use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashSet;

use crate::components::{
    Bus, ComponentKind, GlobalConstraint, Generator, Line, Link, Load, Named, Store,
};
use crate::diagnostics::Diagnostics;
use crate::series::SeriesFrame;
use crate::table::ComponentTable;

/// A network model for one planning horizon.
#[derive(Debug, Clone)]
pub struct Network {
    pub name: String,
    pub snapshots: Vec<NaiveDateTime>,
    pub buses: ComponentTable<Bus>,
    pub generators: ComponentTable<Generator>,
    pub links: ComponentTable<Link>,
    pub stores: ComponentTable<Store>,
    pub lines: ComponentTable<Line>,
    pub loads: ComponentTable<Load>,
    pub global_constraints: ComponentTable<GlobalConstraint>,
    /// Free-form metadata written alongside the network (run config, wildcards)
    pub meta: serde_json::Value,
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts and capacity totals reported by `inspect`.
#[derive(Debug, Default, Clone, Serialize)]
pub struct NetworkStats {
    pub num_snapshots: usize,
    pub num_buses: usize,
    pub num_generators: usize,
    pub num_links: usize,
    pub num_stores: usize,
    pub num_lines: usize,
    pub num_loads: usize,
    pub num_global_constraints: usize,
    pub generator_p_nom_mw: f64,
    pub link_p_nom_mw: f64,
    pub store_e_nom_mwh: f64,
    pub line_s_nom_mva: f64,
    pub num_extendable: usize,
}

impl Network {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            snapshots: Vec::new(),
            buses: ComponentTable::new(ComponentKind::Bus),
            generators: ComponentTable::new(ComponentKind::Generator),
            links: ComponentTable::new(ComponentKind::Link),
            stores: ComponentTable::new(ComponentKind::Store),
            lines: ComponentTable::new(ComponentKind::Line),
            loads: ComponentTable::new(ComponentKind::Load),
            global_constraints: ComponentTable::new(ComponentKind::GlobalConstraint),
            meta: serde_json::Value::Null,
        }
    }

    pub fn with_snapshots(snapshots: Vec<NaiveDateTime>) -> Self {
        Self {
            snapshots,
            ..Self::new()
        }
    }

    pub fn num_snapshots(&self) -> usize {
        self.snapshots.len()
    }

    /// Empty series frame sized to this network's snapshots.
    pub fn new_series(&self) -> SeriesFrame {
        SeriesFrame::new(self.snapshots.len())
    }

    pub fn bus_carrier(&self, bus: &str) -> Option<&str> {
        self.buses.get(bus).map(|b| b.carrier.as_str())
    }


    pub fn stats(&self) -> NetworkStats {
        NetworkStats {
            num_snapshots: self.snapshots.len(),
            num_buses: self.buses.len(),
            num_generators: self.generators.len(),
            num_links: self.links.len(),
            num_stores: self.stores.len(),
            num_lines: self.lines.len(),
            num_loads: self.loads.len(),
            num_global_constraints: self.global_constraints.len(),
            generator_p_nom_mw: self.generators.iter().map(|g| g.p_nom).sum(),
            link_p_nom_mw: self.links.iter().map(|l| l.p_nom).sum(),
            store_e_nom_mwh: self.stores.iter().map(|s| s.e_nom).sum(),
            line_s_nom_mva: self.lines.iter().map(|l| l.s_nom).sum(),
            num_extendable: self.generators.iter().filter(|g| g.p_nom_extendable).count()
                + self.links.iter().filter(|l| l.p_nom_extendable).count()
                + self.stores.iter().filter(|s| s.e_nom_extendable).count()
                + self.lines.iter().filter(|l| l.s_nom_extendable).count(),
        }
    }

    /// Check bus references, series shapes and capacity bounds.
    pub fn validate_into(&self, diag: &mut Diagnostics) {
        let buses: HashSet<&str> = self.buses.names().collect();
        let mut check_bus = |kind: ComponentKind, name: &str, bus: &str| {
            if !buses.contains(bus) {
                diag.add_error_with_entity(
                    "reference",
                    &format!("unknown bus '{}'", bus),
                    &format!("{} {}", kind, name),
                );
            }
        };
        for g in self.generators.iter() {
            check_bus(ComponentKind::Generator, &g.name, &g.bus);
        }
        for s in self.stores.iter() {
            check_bus(ComponentKind::Store, &s.name, &s.bus);
        }
        for l in self.loads.iter() {
            check_bus(ComponentKind::Load, &l.name, &l.bus);
        }
        for l in self.links.iter() {
            check_bus(ComponentKind::Link, &l.name, &l.bus0);
            check_bus(ComponentKind::Link, &l.name, &l.bus1);
        }
        for l in self.lines.iter() {
            check_bus(ComponentKind::Line, &l.name, &l.bus0);
            check_bus(ComponentKind::Line, &l.name, &l.bus1);
        }

        self.validate_series(&self.generators, diag);
        self.validate_series(&self.links, diag);
        self.validate_series(&self.stores, diag);
        self.validate_series(&self.lines, diag);
        self.validate_series(&self.loads, diag);

        for l in self.lines.iter() {
            if l.s_nom_min > l.s_nom_max {
                diag.add_warning_with_entity(
                    "capacity",
                    &format!("s_nom_min {} exceeds s_nom_max {}", l.s_nom_min, l.s_nom_max),
                    &format!("Line {}", l.name),
                );
            }
        }
        for l in self.links.iter() {
            if l.p_nom_min > l.p_nom_max {
                diag.add_warning_with_entity(
                    "capacity",
                    &format!("p_nom_min {} exceeds p_nom_max {}", l.p_nom_min, l.p_nom_max),
                    &format!("Link {}", l.name),
                );
            }
        }
    }

    pub fn validate(&self) -> Diagnostics {
        let mut diag = Diagnostics::new();
        self.validate_into(&mut diag);
        diag
    }

    fn validate_series<T: Named>(&self, table: &ComponentTable<T>, diag: &mut Diagnostics) {
        for (attr, frame) in table.series_iter() {
            let label = format!("{}-{}", table.kind().list_name(), attr);
            if frame.rows() != self.snapshots.len() {
                diag.add_error(
                    "series",
                    &format!(
                        "{} has {} rows, expected {}",
                        label,
                        frame.rows(),
                        self.snapshots.len()
                    ),
                );
            }
            for column in frame.column_names() {
                if !table.contains(column) {
                    diag.add_warning_with_entity("series", &format!("orphan column in {}", label), column);
                }
            }
        }
    }
}
