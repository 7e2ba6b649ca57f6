//! File formats for horizon networks and their auxiliary inputs.
//!
//! A network lives in a directory of CSV files: one static table per
//! component type, one file per time-varying attribute and a `meta.json`.
//!
//! ```text
//! network/
//!   snapshots.csv            snapshot
//!   buses.csv                name,carrier
//!   generators.csv           name,bus,carrier,p_nom,...
//!   generators-p_max_pu.csv  snapshot,<generator>...
//!   links-efficiency.csv     snapshot,<link>...
//!   meta.json
//! ```
//!
//! Static tables go through the `csv` crate; series tables through polars.

pub mod csv_folder;
pub mod profiles;
pub mod registrations;
mod rows;

pub use csv_folder::{export_network, load_network};
pub use profiles::{load_profiles, ProfileTable, ProfileYear};
pub use registrations::{load_registrations, Registration, RegistrationTable};
