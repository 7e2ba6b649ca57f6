pub mod brownfield;
pub mod completions;
pub mod config;
pub mod inspect;
pub mod telemetry;
