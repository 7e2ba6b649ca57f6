use indexmap::IndexMap;
use std::collections::{BTreeMap, HashSet};

use crate::components::{ComponentKind, Named};
use crate::error::{HznError, HznResult};
use crate::series::SeriesFrame;

/// Components of one kind keyed by name, plus their time-varying inputs.
///
/// Static rows keep insertion order. `series` maps an attribute name
/// (`p_max_pu`, `efficiency`, ...) to a frame with one column per component
/// that varies over time; components without a column use their static value.
#[derive(Debug, Clone)]
pub struct ComponentTable<T> {
    kind: ComponentKind,
    items: IndexMap<String, T>,
    series: BTreeMap<String, SeriesFrame>,
}

impl<T: Named> ComponentTable<T> {
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            kind,
            items: IndexMap::new(),
            series: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.items.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        self.items.get_mut(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.values_mut()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    /// Names of components matching `pred`, in table order.
    pub fn select<F>(&self, mut pred: F) -> Vec<String>
    where
        F: FnMut(&T) -> bool,
    {
        self.items
            .iter()
            .filter(|(_, item)| pred(item))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Insert a component. Names are unique within a table.
    pub fn add(&mut self, item: T) -> HznResult<()> {
        let name = item.name().to_string();
        if name.is_empty() {
            return Err(HznError::Network(format!(
                "{} without a name cannot be added",
                self.kind
            )));
        }
        if self.items.contains_key(&name) {
            return Err(HznError::Network(format!(
                "{} '{}' is already defined",
                self.kind, name
            )));
        }
        self.items.insert(name, item);
        Ok(())
    }

    /// Remove components and their series columns; returns the removed rows.
    pub fn remove<I, S>(&mut self, names: I) -> Vec<T>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut removed = Vec::new();
        for name in names {
            let name = name.as_ref();
            if let Some(item) = self.items.shift_remove(name) {
                for frame in self.series.values_mut() {
                    frame.remove_columns([name]);
                }
                removed.push(item);
            }
        }
        removed
    }

    /// Rename components for which `rename` returns a new name.
    ///
    /// Static rows and series columns are renamed together; table order is kept.
    pub fn rename_with<F>(&mut self, mut rename: F) -> HznResult<usize>
    where
        F: FnMut(&T) -> Option<String>,
    {
        let targets: Vec<Option<String>> = self.items.values().map(&mut rename).collect();
        let mut seen = HashSet::with_capacity(targets.len());
        for (name, target) in self.items.keys().zip(&targets) {
            let resolved = target.as_deref().unwrap_or(name);
            if !seen.insert(resolved) {
                return Err(HznError::Network(format!(
                    "renaming produces duplicate {} '{}'",
                    self.kind, resolved
                )));
            }
        }

        let mut mapping: BTreeMap<String, String> = BTreeMap::new();
        let mut renamed = IndexMap::with_capacity(self.items.len());
        for ((name, mut item), target) in self.items.drain(..).zip(targets) {
            match target {
                Some(new_name) => {
                    item.set_name(new_name.clone());
                    mapping.insert(name, new_name.clone());
                    renamed.insert(new_name, item);
                }
                None => {
                    renamed.insert(name, item);
                }
            }
        }
        self.items = renamed;
        for frame in self.series.values_mut() {
            frame.rename_columns(|column| mapping.get(column).cloned())?;
        }
        Ok(mapping.len())
    }

    pub fn series(&self, attr: &str) -> Option<&SeriesFrame> {
        self.series.get(attr)
    }

    /// All stored series, by attribute name.
    pub fn series_iter(&self) -> impl Iterator<Item = (&str, &SeriesFrame)> {
        self.series.iter().map(|(attr, frame)| (attr.as_str(), frame))
    }

    /// Series frame for `attr`, created empty with `rows` snapshots if absent.
    pub fn series_entry(&mut self, attr: &str, rows: usize) -> HznResult<&mut SeriesFrame> {
        self.check_series_attr(attr)?;
        Ok(self
            .series
            .entry(attr.to_string())
            .or_insert_with(|| SeriesFrame::new(rows)))
    }

    /// Merge `frame` into the `attr` series, overwriting columns of the same name.
    ///
    /// Every column must belong to a component of this table.
    pub fn import_series(&mut self, attr: &str, frame: &SeriesFrame) -> HznResult<()> {
        if let Some(unknown) = frame.column_names().find(|name| !self.contains(name)) {
            return Err(HznError::Network(format!(
                "series '{}' references unknown {} '{}'",
                attr, self.kind, unknown
            )));
        }
        let rows = frame.rows();
        self.series_entry(attr, rows)?.merge(frame)
    }

    fn check_series_attr(&self, attr: &str) -> HznResult<()> {
        if self.kind.input_series().contains(&attr) {
            Ok(())
        } else {
            Err(HznError::Validation(format!(
                "'{}' is not a time-varying input of {}",
                attr, self.kind
            )))
        }
    }
}
