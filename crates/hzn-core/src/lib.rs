//! # hzn-core: network model for myopic planning horizons
//!
//! Provides the in-memory network model that the brownfield rules operate on:
//! component tables keyed by name, time-varying input series, global
//! constraints and a few topology helpers.
//!
//! ## Design
//!
//! A [`Network`] holds one [`ComponentTable`] per component kind. Each table
//! keeps the static attributes of its components in insertion order and a
//! map from attribute name to [`SeriesFrame`] for inputs that vary over
//! snapshots (e.g. heat pump `efficiency`, renewable `p_max_pu`).
//!
//! Generators, links and stores implement the [`Asset`] trait, which exposes
//! the `*_nom` / `*_nom_opt` / `*_nom_extendable` triple generically so
//! carry-over logic is written once for all three tables.
//!
//! ## Quick Start
//!
//! ```rust
//! use hzn_core::*;
//!
//! let mut network = Network::new();
//! network.buses.add(Bus { name: "DE0 0".into(), ..Bus::default() }).unwrap();
//! network
//!     .generators
//!     .add(Generator {
//!         name: "DE0 0 onwind-2030".into(),
//!         bus: "DE0 0".into(),
//!         carrier: "onwind".into(),
//!         p_nom_opt: 120.0,
//!         p_nom_extendable: true,
//!         build_year: 2030,
//!         lifetime: 30.0,
//!         ..Generator::default()
//!     })
//!     .unwrap();
//!
//! let gen = network.generators.get("DE0 0 onwind-2030").unwrap();
//! assert!(!gen.retired_by(2050));
//! assert!(gen.retired_by(2060));
//! ```
//!
//! ## Modules
//!
//! - [`components`] - component records and the [`Asset`] trait
//! - [`table`] - name-keyed component tables with series
//! - [`series`] - snapshot-indexed series frames
//! - [`diagnostics`] - validation issue collection
//! - [`graph_utils`] - bus graph, islands

pub mod components;
pub mod diagnostics;
pub mod error;
pub mod graph_utils;
pub mod network;
pub mod series;
pub mod table;

pub use components::{
    Asset, Bus, ComponentKind, GlobalConstraint, Generator, Line, Link, Load, Named, Store,
};
pub use diagnostics::{DiagnosticIssue, Diagnostics, Severity};
pub use error::{HznError, HznResult};
pub use graph_utils::{find_islands, topology_stats, IslandSummary, TopologyStats};
pub use network::{Network, NetworkStats};
pub use series::{format_timestamp, parse_timestamp, SeriesFrame};
pub use table::ComponentTable;
