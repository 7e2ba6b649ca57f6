use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use hzn_core::parse_timestamp;

use crate::transport::TRANSPORT_TYPES;

/// Settings for preparing one planning horizon from the previous one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrownfieldConfig {
    /// Extendable assets optimized below this capacity (MW or MWh) are not carried over
    #[serde(default = "default_threshold")]
    pub threshold_capacity: f64,
    #[serde(default)]
    pub h2_retrofit: bool,
    /// H2 capacity obtained per unit of retrofitted CH4 pipeline capacity
    #[serde(default = "default_retrofit_ratio")]
    pub h2_retrofit_capacity_per_ch4: f64,
    #[serde(default)]
    pub endogenous_transport: bool,
    #[serde(default = "default_transport_min")]
    pub transport_min_capacity: f64,
    /// Registration-rate multiplier per transport type (`light`, `heavy`)
    #[serde(default)]
    pub car_reg_factor: BTreeMap<String, YearlyValue>,
    #[serde(default)]
    pub renewable: Option<RenewableConfig>,
}

fn default_threshold() -> f64 {
    10.0
}

fn default_retrofit_ratio() -> f64 {
    0.6
}

fn default_transport_min() -> f64 {
    1.0
}

impl Default for BrownfieldConfig {
    fn default() -> Self {
        Self {
            threshold_capacity: default_threshold(),
            h2_retrofit: false,
            h2_retrofit_capacity_per_ch4: default_retrofit_ratio(),
            endogenous_transport: false,
            transport_min_capacity: default_transport_min(),
            car_reg_factor: BTreeMap::new(),
            renewable: None,
        }
    }
}

/// A value that is either constant or given per planning horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged, from = "YearlyRepr")]
pub enum YearlyValue {
    Scalar(f64),
    ByYear(BTreeMap<u32, f64>),
}

// Year keys arrive as integers from YAML and as strings from JSON.
#[derive(Deserialize)]
#[serde(untagged)]
enum YearlyRepr {
    Scalar(f64),
    ByYear(BTreeMap<YearKey, f64>),
}

#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct YearKey(u32);

impl<'de> Deserialize<'de> for YearKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct YearVisitor;

        impl serde::de::Visitor<'_> for YearVisitor {
            type Value = YearKey;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a year")
            }

            fn visit_u64<E: serde::de::Error>(self, value: u64) -> Result<YearKey, E> {
                u32::try_from(value)
                    .map(YearKey)
                    .map_err(|_| E::custom(format!("year {} out of range", value)))
            }

            fn visit_i64<E: serde::de::Error>(self, value: i64) -> Result<YearKey, E> {
                u32::try_from(value)
                    .map(YearKey)
                    .map_err(|_| E::custom(format!("year {} out of range", value)))
            }

            fn visit_str<E: serde::de::Error>(self, value: &str) -> Result<YearKey, E> {
                value
                    .trim()
                    .parse()
                    .map(YearKey)
                    .map_err(|_| E::custom(format!("'{}' is not a year", value)))
            }
        }

        deserializer.deserialize_any(YearVisitor)
    }
}

impl From<YearlyRepr> for YearlyValue {
    fn from(repr: YearlyRepr) -> Self {
        match repr {
            YearlyRepr::Scalar(value) => YearlyValue::Scalar(value),
            YearlyRepr::ByYear(values) => {
                YearlyValue::ByYear(values.into_iter().map(|(k, v)| (k.0, v)).collect())
            }
        }
    }
}

impl YearlyValue {
    pub fn get(&self, year: u32) -> Result<f64> {
        match self {
            YearlyValue::Scalar(value) => Ok(*value),
            YearlyValue::ByYear(values) => values
                .get(&year)
                .copied()
                .ok_or_else(|| anyhow!("no value given for year {}", year)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenewableConfig {
    pub carriers: Vec<String>,
    pub snapshots: SnapshotRange,
    #[serde(default)]
    pub drop_leap_day: bool,
}

/// Full-resolution time axis the renewable profiles are defined on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRange {
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub inclusive: Inclusive,
}

/// Which ends of a [`SnapshotRange`] belong to it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Inclusive {
    #[default]
    Left,
    Right,
    Both,
    Neither,
}

pub fn load_config_from_path(path: &Path) -> Result<BrownfieldConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading brownfield config '{}'", path.display()))?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            serde_yaml::from_str(&data).context("parsing brownfield config yaml")
        }
        Some(ext) if ext.eq_ignore_ascii_case("json") => {
            serde_json::from_str(&data).context("parsing brownfield config json")
        }
        _ => serde_yaml::from_str(&data)
            .or_else(|_| serde_json::from_str(&data))
            .context("parsing brownfield config"),
    }
}

pub fn validate(config: &BrownfieldConfig) -> Result<()> {
    if !(config.threshold_capacity >= 0.0) {
        bail!(
            "threshold_capacity must be non-negative, got {}",
            config.threshold_capacity
        );
    }
    if !(config.h2_retrofit_capacity_per_ch4 > 0.0) {
        bail!(
            "h2_retrofit_capacity_per_ch4 must be positive, got {}",
            config.h2_retrofit_capacity_per_ch4
        );
    }
    if !(config.transport_min_capacity >= 0.0) {
        bail!(
            "transport_min_capacity must be non-negative, got {}",
            config.transport_min_capacity
        );
    }
    if config.endogenous_transport {
        for transport_type in TRANSPORT_TYPES {
            if !config.car_reg_factor.contains_key(transport_type) {
                bail!(
                    "endogenous_transport requires car_reg_factor.{}",
                    transport_type
                );
            }
        }
    }
    if let Some(renewable) = &config.renewable {
        let start = parse_timestamp(&renewable.snapshots.start)
            .context("parsing renewable.snapshots.start")?;
        let end =
            parse_timestamp(&renewable.snapshots.end).context("parsing renewable.snapshots.end")?;
        if end < start {
            bail!(
                "renewable.snapshots.end {} precedes start {}",
                renewable.snapshots.end,
                renewable.snapshots.start
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const YAML: &str = r#"
threshold_capacity: 10.0
h2_retrofit: true
h2_retrofit_capacity_per_ch4: 0.6
endogenous_transport: true
car_reg_factor:
  light: {2030: 1.0, 2040: 1.1}
  heavy: 0.9
renewable:
  carriers: [solar, onwind, hydro]
  snapshots: {start: "2013-01-01", end: "2014-01-01", inclusive: left}
  drop_leap_day: true
"#;

    fn write_temp(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_yaml_with_yearly_factors() {
        let file = write_temp(".yaml", YAML);
        let config = load_config_from_path(file.path()).unwrap();
        validate(&config).unwrap();
        assert!(config.h2_retrofit);
        assert_eq!(config.transport_min_capacity, 1.0);
        assert_eq!(config.car_reg_factor["light"].get(2040).unwrap(), 1.1);
        assert_eq!(config.car_reg_factor["heavy"].get(2050).unwrap(), 0.9);
        assert!(config.car_reg_factor["light"].get(2050).is_err());
        let renewable = config.renewable.unwrap();
        assert_eq!(renewable.snapshots.inclusive, Inclusive::Left);
        assert!(renewable.drop_leap_day);
    }

    #[test]
    fn loads_json_and_applies_defaults() {
        let file = write_temp(".json", r#"{"car_reg_factor": {"light": {"2030": 1.2}}}"#);
        let config = load_config_from_path(file.path()).unwrap();
        assert_eq!(config.threshold_capacity, 10.0);
        assert!(!config.endogenous_transport);
        assert_eq!(config.car_reg_factor["light"].get(2030).unwrap(), 1.2);
    }

    #[test]
    fn sniffs_format_without_extension() {
        let file = write_temp(".cfg", "threshold_capacity: 5\n");
        let config = load_config_from_path(file.path()).unwrap();
        assert_eq!(config.threshold_capacity, 5.0);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = BrownfieldConfig {
            threshold_capacity: -1.0,
            ..BrownfieldConfig::default()
        };
        assert!(validate(&config).is_err());

        config.threshold_capacity = 10.0;
        config.h2_retrofit_capacity_per_ch4 = 0.0;
        assert!(validate(&config).is_err());

        config.h2_retrofit_capacity_per_ch4 = 0.6;
        config.transport_min_capacity = -0.5;
        assert!(validate(&config).is_err());

        config.transport_min_capacity = 1.0;
        config.endogenous_transport = true;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("car_reg_factor"));
    }
}
