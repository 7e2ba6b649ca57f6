use anyhow::{anyhow, bail, Context, Result};
use indexmap::IndexMap;
use serde::Serialize;
use std::path::Path;

/// One row of the vehicle registration table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Registration {
    pub transport_type: String,
    pub country: String,
    /// Share of the existing fleet replaced per year
    pub rate: f64,
}

/// Yearly new-registration rates per transport type and country.
#[derive(Debug, Clone, Default)]
pub struct RegistrationTable {
    rows: Vec<Registration>,
}

impl RegistrationTable {
    pub fn from_rows(rows: Vec<Registration>) -> Self {
        Self { rows }
    }

    /// Rates of one transport type (`light`, `heavy`) keyed by country.
    pub fn rates(&self, transport_type: &str) -> IndexMap<String, f64> {
        self.rows
            .iter()
            .filter(|row| row.transport_type == transport_type)
            .map(|row| (row.country.clone(), row.rate))
            .collect()
    }
}

/// Read a registration table.
///
/// The first two columns are the transport type and the country; the third
/// holds the rate whatever its header says.
pub fn load_registrations(path: &Path) -> Result<RegistrationTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("opening registration table {}", path.display()))?;
    if reader.headers()?.len() < 3 {
        bail!(
            "{}: expected columns transport_type,country,rate",
            path.display()
        );
    }
    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("reading {}", path.display()))?;
        let line = i + 2;
        let field = |position: usize, label: &str| {
            record
                .get(position)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| anyhow!("{}: row {} has no {}", path.display(), line, label))
        };
        let transport_type = field(0, "transport type")?.to_string();
        let country = field(1, "country")?.to_string();
        let raw_rate = field(2, "rate")?;
        let rate = raw_rate.parse::<f64>().with_context(|| {
            format!("{}: row {} rate '{}'", path.display(), line, raw_rate)
        })?;
        rows.push(Registration {
            transport_type,
            country,
            rate,
        });
    }
    Ok(RegistrationTable::from_rows(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn reads_rates_by_type() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("car_registration.csv");
        fs::write(
            &path,
            "transport_type,country,share\nlight,DE0 0,0.06\nlight,FR0 0,0.05\nheavy,DE0 0,0.08\n",
        )
        .unwrap();

        let table = load_registrations(&path).unwrap();
        let light = table.rates("light");
        assert_eq!(light.len(), 2);
        assert_eq!(light["FR0 0"], 0.05);
        assert_eq!(table.rates("heavy")["DE0 0"], 0.08);
        assert!(table.rates("bus").is_empty());
    }

    #[test]
    fn rejects_bad_rate() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reg.csv");
        fs::write(&path, "transport_type,country,rate\nlight,DE0 0,lots\n").unwrap();
        assert!(load_registrations(&path).is_err());

        fs::write(&path, "transport_type,country\nlight,DE0 0\n").unwrap();
        assert!(load_registrations(&path).is_err());
    }
}
