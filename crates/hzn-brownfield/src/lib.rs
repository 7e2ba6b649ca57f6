//! Brownfield rules applied between sequential planning horizons.
//!
//! Run [`prepare_brownfield`] to execute every step in order, or call the
//! individual rules:
//!
//! - [`adjust_renewable_profiles`] refreshes `p_max_pu` from weather years
//! - [`add_build_year_to_new_assets`] tags this horizon's investments
//! - [`update_heat_pump_efficiency`] gives old heat pumps the new COPs
//! - [`add_brownfield`] carries surviving capacities over, fixed
//! - [`disable_grid_expansion_if_limit_hit`] drops exhausted grid limits
//! - [`scale_transport_capacities`] and [`adjust_transport`] follow the vehicle fleet

pub mod add_brownfield;
pub mod build_year;
pub mod config;
pub mod grid;
pub mod heat_pumps;
pub mod pipeline;
pub mod renewables;
pub mod transport;

pub use add_brownfield::{add_brownfield, BrownfieldOptions, BrownfieldReport, CarryOver};
pub use build_year::add_build_year_to_new_assets;
pub use config::{load_config_from_path, validate, BrownfieldConfig, RenewableConfig, YearlyValue};
pub use grid::disable_grid_expansion_if_limit_hit;
pub use heat_pumps::update_heat_pump_efficiency;
pub use pipeline::{prepare_brownfield, BrownfieldInputs, BrownfieldSummary};
pub use renewables::{adjust_renewable_profiles, profile_carriers};
pub use transport::{adjust_transport, scale_transport_capacities};
