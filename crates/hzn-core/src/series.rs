//! Snapshot-indexed tables of time-varying component attributes.
//!
//! A [`SeriesFrame`] holds one `f64` column per component for a single
//! attribute (e.g. `p_max_pu` of all generators that vary over time). The
//! snapshot index itself lives on the owning [`Network`](crate::Network);
//! frames only record their row count.

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{HznError, HznResult};

const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse a snapshot timestamp (`2013-01-01 00:00:00`, ISO `T` form, or a bare date).
pub fn parse_timestamp(value: &str) -> HznResult<NaiveDateTime> {
    let value = value.trim();
    for format in TIMESTAMP_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(parsed);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| HznError::Parse(format!("invalid timestamp '{}'", value)))
}

pub fn format_timestamp(value: &NaiveDateTime) -> String {
    value.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesFrame {
    rows: usize,
    columns: IndexMap<String, Vec<f64>>,
}

impl SeriesFrame {
    /// Empty frame with `rows` snapshots.
    pub fn new(rows: usize) -> Self {
        Self {
            rows,
            columns: IndexMap::new(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// True when the frame has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.columns
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Insert or overwrite a column. The length must equal the frame's row count.
    pub fn set_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> HznResult<()> {
        let name = name.into();
        if values.len() != self.rows {
            return Err(HznError::Validation(format!(
                "series column '{}' has {} values, expected {}",
                name,
                values.len(),
                self.rows
            )));
        }
        self.columns.insert(name, values);
        Ok(())
    }

    /// Drop the named columns; unknown names are ignored.
    pub fn remove_columns<'a, I>(&mut self, names: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut removed = 0;
        for name in names {
            if self.columns.shift_remove(name).is_some() {
                removed += 1;
            }
        }
        removed
    }

    /// Rename columns with `rename`; columns mapped to `None` keep their name.
    ///
    /// Column order is preserved. Two columns ending up with the same name is an error.
    pub fn rename_columns<F>(&mut self, mut rename: F) -> HznResult<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let targets: Vec<String> = self
            .columns
            .keys()
            .map(|name| rename(name).unwrap_or_else(|| name.clone()))
            .collect();
        let mut seen = HashSet::with_capacity(targets.len());
        for target in &targets {
            if !seen.insert(target.as_str()) {
                return Err(HznError::Network(format!(
                    "renaming produces duplicate series column '{}'",
                    target
                )));
            }
        }
        let values: Vec<Vec<f64>> = self.columns.drain(..).map(|(_, values)| values).collect();
        self.columns = targets.into_iter().zip(values).collect();
        Ok(())
    }

    /// Copy every column of `other` into `self`, overwriting columns of the same name.
    pub fn merge(&mut self, other: &SeriesFrame) -> HznResult<()> {
        if other.rows != self.rows {
            return Err(HznError::Validation(format!(
                "cannot merge series with {} snapshots into series with {} snapshots",
                other.rows, self.rows
            )));
        }
        for (name, values) in &other.columns {
            self.columns.insert(name.clone(), values.clone());
        }
        Ok(())
    }

    /// Column subset as a new frame; missing names are skipped.
    pub fn select<'a, I>(&self, names: I) -> SeriesFrame
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut out = SeriesFrame::new(self.rows);
        for name in names {
            if let Some(values) = self.columns.get(name) {
                out.columns.insert(name.to_string(), values.clone());
            }
        }
        out
    }

    /// Sum over all snapshots for each column.
    pub fn column_sums(&self) -> IndexMap<String, f64> {
        self.columns
            .iter()
            .map(|(name, values)| (name.clone(), values.iter().sum()))
            .collect()
    }
}
