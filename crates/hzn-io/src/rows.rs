//! Lenient row access for component CSV tables.
//!
//! Component tables written by other tools omit columns that hold defaults
//! and leave cells empty for missing values, so every getter falls back to a
//! default when a column or cell is absent. Booleans accept `true/false`,
//! `True/False` and `1/0`; `inf` is a valid float.

use anyhow::{anyhow, Context, Result};
use csv::StringRecord;
use std::collections::HashMap;

use hzn_core::{Bus, GlobalConstraint, Generator, Line, Link, Load, Store};

/// Header lookup shared by all rows of one table.
pub(crate) struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    pub(crate) fn new(headers: &StringRecord) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();
        Self { index }
    }

    pub(crate) fn row<'a>(&'a self, record: &'a StringRecord, line: usize) -> Row<'a> {
        Row {
            columns: self,
            record,
            line,
        }
    }
}

pub(crate) struct Row<'a> {
    columns: &'a Columns,
    record: &'a StringRecord,
    line: usize,
}

impl Row<'_> {
    fn cell(&self, column: &str) -> Option<&str> {
        self.columns
            .index
            .get(column)
            .and_then(|&i| self.record.get(i))
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub(crate) fn name(&self) -> Result<String> {
        self.cell("name")
            .map(str::to_string)
            .ok_or_else(|| anyhow!("row {} has no name", self.line))
    }

    pub(crate) fn text(&self, column: &str, default: &str) -> String {
        self.cell(column).unwrap_or(default).to_string()
    }

    pub(crate) fn float(&self, column: &str, default: f64) -> Result<f64> {
        match self.cell(column) {
            None => Ok(default),
            Some(value) => value
                .parse::<f64>()
                .with_context(|| format!("row {}: column '{}' = '{}'", self.line, column, value)),
        }
    }

    pub(crate) fn flag(&self, column: &str, default: bool) -> Result<bool> {
        match self.cell(column) {
            None => Ok(default),
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "true" | "1" | "1.0" => Ok(true),
                "false" | "0" | "0.0" => Ok(false),
                other => Err(anyhow!(
                    "row {}: column '{}' = '{}' is not a boolean",
                    self.line,
                    column,
                    other
                )),
            },
        }
    }

    /// Build years are sometimes written as floats (`2030.0`).
    pub(crate) fn year(&self, column: &str) -> Result<u32> {
        let value = self.float(column, 0.0)?;
        if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
            return Err(anyhow!(
                "row {}: column '{}' = {} is not a year",
                self.line,
                column,
                value
            ));
        }
        Ok(value as u32)
    }

    /// Cell by position, used for tables whose value columns have no fixed name.
    pub(crate) fn at(&self, position: usize) -> Option<&str> {
        self.record
            .get(position)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

pub(crate) fn bus(row: &Row) -> Result<Bus> {
    let defaults = Bus::default();
    Ok(Bus {
        name: row.name()?,
        carrier: row.text("carrier", &defaults.carrier),
    })
}

pub(crate) fn generator(row: &Row) -> Result<Generator> {
    let d = Generator::default();
    Ok(Generator {
        name: row.name()?,
        bus: row.text("bus", ""),
        carrier: row.text("carrier", ""),
        p_nom: row.float("p_nom", d.p_nom)?,
        p_nom_opt: row.float("p_nom_opt", d.p_nom_opt)?,
        p_nom_min: row.float("p_nom_min", d.p_nom_min)?,
        p_nom_max: row.float("p_nom_max", d.p_nom_max)?,
        p_nom_extendable: row.flag("p_nom_extendable", d.p_nom_extendable)?,
        build_year: row.year("build_year")?,
        lifetime: row.float("lifetime", d.lifetime)?,
        efficiency: row.float("efficiency", d.efficiency)?,
        capital_cost: row.float("capital_cost", d.capital_cost)?,
        marginal_cost: row.float("marginal_cost", d.marginal_cost)?,
        p_max_pu: row.float("p_max_pu", d.p_max_pu)?,
    })
}

pub(crate) fn link(row: &Row) -> Result<Link> {
    let d = Link::default();
    Ok(Link {
        name: row.name()?,
        bus0: row.text("bus0", ""),
        bus1: row.text("bus1", ""),
        carrier: row.text("carrier", ""),
        p_nom: row.float("p_nom", d.p_nom)?,
        p_nom_opt: row.float("p_nom_opt", d.p_nom_opt)?,
        p_nom_min: row.float("p_nom_min", d.p_nom_min)?,
        p_nom_max: row.float("p_nom_max", d.p_nom_max)?,
        p_nom_extendable: row.flag("p_nom_extendable", d.p_nom_extendable)?,
        build_year: row.year("build_year")?,
        lifetime: row.float("lifetime", d.lifetime)?,
        efficiency: row.float("efficiency", d.efficiency)?,
        p_nom_ratio: row.float("p_nom_ratio", d.p_nom_ratio)?,
        length: row.float("length", d.length)?,
        capital_cost: row.float("capital_cost", d.capital_cost)?,
        marginal_cost: row.float("marginal_cost", d.marginal_cost)?,
    })
}

pub(crate) fn store(row: &Row) -> Result<Store> {
    let d = Store::default();
    Ok(Store {
        name: row.name()?,
        bus: row.text("bus", ""),
        carrier: row.text("carrier", ""),
        e_nom: row.float("e_nom", d.e_nom)?,
        e_nom_opt: row.float("e_nom_opt", d.e_nom_opt)?,
        e_nom_min: row.float("e_nom_min", d.e_nom_min)?,
        e_nom_max: row.float("e_nom_max", d.e_nom_max)?,
        e_nom_extendable: row.flag("e_nom_extendable", d.e_nom_extendable)?,
        build_year: row.year("build_year")?,
        lifetime: row.float("lifetime", d.lifetime)?,
        capital_cost: row.float("capital_cost", d.capital_cost)?,
        marginal_cost: row.float("marginal_cost", d.marginal_cost)?,
        e_cyclic: row.flag("e_cyclic", d.e_cyclic)?,
    })
}

pub(crate) fn line(row: &Row) -> Result<Line> {
    let d = Line::default();
    Ok(Line {
        name: row.name()?,
        bus0: row.text("bus0", ""),
        bus1: row.text("bus1", ""),
        carrier: row.text("carrier", &d.carrier),
        s_nom: row.float("s_nom", d.s_nom)?,
        s_nom_opt: row.float("s_nom_opt", d.s_nom_opt)?,
        s_nom_min: row.float("s_nom_min", d.s_nom_min)?,
        s_nom_max: row.float("s_nom_max", d.s_nom_max)?,
        s_nom_extendable: row.flag("s_nom_extendable", d.s_nom_extendable)?,
        length: row.float("length", d.length)?,
        capital_cost: row.float("capital_cost", d.capital_cost)?,
        build_year: row.year("build_year")?,
        lifetime: row.float("lifetime", d.lifetime)?,
    })
}

pub(crate) fn load(row: &Row) -> Result<Load> {
    Ok(Load {
        name: row.name()?,
        bus: row.text("bus", ""),
        carrier: row.text("carrier", ""),
        p_set: row.float("p_set", 0.0)?,
    })
}

pub(crate) fn global_constraint(row: &Row) -> Result<GlobalConstraint> {
    let d = GlobalConstraint::default();
    Ok(GlobalConstraint {
        name: row.name()?,
        kind: row.text("type", ""),
        carrier_attribute: row.text("carrier_attribute", ""),
        sense: row.text("sense", &d.sense),
        constant: row.float("constant", d.constant)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse<T>(header: &[&str], values: &[&str], f: fn(&Row) -> Result<T>) -> Result<T> {
        let headers = StringRecord::from(header.to_vec());
        let record = StringRecord::from(values.to_vec());
        let columns = Columns::new(&headers);
        let row = columns.row(&record, 2);
        f(&row)
    }

    #[test]
    fn missing_cells_take_defaults() {
        let gen = parse(
            &["name", "bus", "p_nom_opt", "lifetime", "p_nom_extendable"],
            &["DE0 0 solar-2030", "DE0 0", "12.5", "", "True"],
            generator,
        )
        .unwrap();
        assert_eq!(gen.p_nom_opt, 12.5);
        assert!(gen.lifetime.is_infinite());
        assert!(gen.p_nom_extendable);
        assert_eq!(gen.efficiency, 1.0);
    }

    #[test]
    fn parses_inf_and_float_years() {
        let link = parse(
            &["name", "lifetime", "build_year"],
            &["co2 vent", "inf", "2030.0"],
            link,
        )
        .unwrap();
        assert!(link.lifetime.is_infinite());
        assert_eq!(link.build_year, 2030);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(parse(&["name", "e_cyclic"], &["s", "maybe"], store).is_err());
        assert!(parse(&["name", "build_year"], &["s", "2030.5"], store).is_err());
        assert!(parse(&["bus"], &["x"], store).is_err());
    }
}
