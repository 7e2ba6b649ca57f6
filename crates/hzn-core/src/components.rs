//! Component records of the network model.
//!
//! Names are the primary key of every component; capacities follow the
//! `*_nom` (installed), `*_nom_opt` (optimized), `*_nom_min`/`*_nom_max`
//! (bounds) and `*_nom_extendable` convention. Generators and links size
//! power (`p_`), stores size energy (`e_`), lines size apparent power (`s_`).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::network::Network;
use crate::table::ComponentTable;

/// The component types known to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    Bus,
    Generator,
    Link,
    Store,
    Line,
    Load,
    GlobalConstraint,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 7] = [
        ComponentKind::Bus,
        ComponentKind::Generator,
        ComponentKind::Link,
        ComponentKind::Store,
        ComponentKind::Line,
        ComponentKind::Load,
        ComponentKind::GlobalConstraint,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Bus => "Bus",
            ComponentKind::Generator => "Generator",
            ComponentKind::Link => "Link",
            ComponentKind::Store => "Store",
            ComponentKind::Line => "Line",
            ComponentKind::Load => "Load",
            ComponentKind::GlobalConstraint => "GlobalConstraint",
        }
    }

    /// Table name used for files and reports (`generators`, `global_constraints`, ...).
    pub fn list_name(&self) -> &'static str {
        match self {
            ComponentKind::Bus => "buses",
            ComponentKind::Generator => "generators",
            ComponentKind::Link => "links",
            ComponentKind::Store => "stores",
            ComponentKind::Line => "lines",
            ComponentKind::Load => "loads",
            ComponentKind::GlobalConstraint => "global_constraints",
        }
    }

    /// Time-varying input attributes. Only these are stored as series.
    pub fn input_series(&self) -> &'static [&'static str] {
        match self {
            ComponentKind::Generator => &[
                "p_max_pu",
                "p_min_pu",
                "p_set",
                "marginal_cost",
                "efficiency",
            ],
            ComponentKind::Link => &[
                "p_max_pu",
                "p_min_pu",
                "p_set",
                "efficiency",
                "marginal_cost",
            ],
            ComponentKind::Store => &["e_max_pu", "e_min_pu", "e_set", "marginal_cost"],
            ComponentKind::Line => &["s_max_pu"],
            ComponentKind::Load => &["p_set", "q_set"],
            ComponentKind::Bus | ComponentKind::GlobalConstraint => &[],
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything stored in a [`ComponentTable`], keyed by its name.
pub trait Named {
    fn name(&self) -> &str;
    fn set_name(&mut self, name: String);
}

macro_rules! impl_named {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Named for $ty {
                fn name(&self) -> &str {
                    &self.name
                }
                fn set_name(&mut self, name: String) {
                    self.name = name;
                }
            }
        )*
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bus {
    pub name: String,
    pub carrier: String,
}

impl Default for Bus {
    fn default() -> Self {
        Self {
            name: String::new(),
            carrier: "AC".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generator {
    pub name: String,
    pub bus: String,
    pub carrier: String,
    pub p_nom: f64,
    pub p_nom_opt: f64,
    pub p_nom_min: f64,
    pub p_nom_max: f64,
    pub p_nom_extendable: bool,
    pub build_year: u32,
    /// Years; `f64::INFINITY` for assets that never retire
    pub lifetime: f64,
    pub efficiency: f64,
    pub capital_cost: f64,
    pub marginal_cost: f64,
    pub p_max_pu: f64,
}

impl Default for Generator {
    fn default() -> Self {
        Self {
            name: String::new(),
            bus: String::new(),
            carrier: String::new(),
            p_nom: 0.0,
            p_nom_opt: 0.0,
            p_nom_min: 0.0,
            p_nom_max: f64::INFINITY,
            p_nom_extendable: false,
            build_year: 0,
            lifetime: f64::INFINITY,
            efficiency: 1.0,
            capital_cost: 0.0,
            marginal_cost: 0.0,
            p_max_pu: 1.0,
        }
    }
}

/// Directed conversion or transport component from `bus0` to `bus1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    pub bus0: String,
    pub bus1: String,
    pub carrier: String,
    pub p_nom: f64,
    pub p_nom_opt: f64,
    pub p_nom_min: f64,
    pub p_nom_max: f64,
    pub p_nom_extendable: bool,
    pub build_year: u32,
    pub lifetime: f64,
    pub efficiency: f64,
    /// Capacity ratio coupling a CHP electric link to its heat twin
    pub p_nom_ratio: f64,
    pub length: f64,
    pub capital_cost: f64,
    pub marginal_cost: f64,
}

impl Default for Link {
    fn default() -> Self {
        Self {
            name: String::new(),
            bus0: String::new(),
            bus1: String::new(),
            carrier: String::new(),
            p_nom: 0.0,
            p_nom_opt: 0.0,
            p_nom_min: 0.0,
            p_nom_max: f64::INFINITY,
            p_nom_extendable: false,
            build_year: 0,
            lifetime: f64::INFINITY,
            efficiency: 1.0,
            p_nom_ratio: 1.0,
            length: 0.0,
            capital_cost: 0.0,
            marginal_cost: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub name: String,
    pub bus: String,
    pub carrier: String,
    pub e_nom: f64,
    pub e_nom_opt: f64,
    pub e_nom_min: f64,
    pub e_nom_max: f64,
    pub e_nom_extendable: bool,
    pub build_year: u32,
    pub lifetime: f64,
    pub capital_cost: f64,
    pub marginal_cost: f64,
    pub e_cyclic: bool,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            name: String::new(),
            bus: String::new(),
            carrier: String::new(),
            e_nom: 0.0,
            e_nom_opt: 0.0,
            e_nom_min: 0.0,
            e_nom_max: f64::INFINITY,
            e_nom_extendable: false,
            build_year: 0,
            lifetime: f64::INFINITY,
            capital_cost: 0.0,
            marginal_cost: 0.0,
            e_cyclic: false,
        }
    }
}

/// AC transmission line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub name: String,
    pub bus0: String,
    pub bus1: String,
    pub carrier: String,
    pub s_nom: f64,
    pub s_nom_opt: f64,
    pub s_nom_min: f64,
    pub s_nom_max: f64,
    pub s_nom_extendable: bool,
    /// km
    pub length: f64,
    pub capital_cost: f64,
    pub build_year: u32,
    pub lifetime: f64,
}

impl Default for Line {
    fn default() -> Self {
        Self {
            name: String::new(),
            bus0: String::new(),
            bus1: String::new(),
            carrier: "AC".to_string(),
            s_nom: 0.0,
            s_nom_opt: 0.0,
            s_nom_min: 0.0,
            s_nom_max: f64::INFINITY,
            s_nom_extendable: false,
            length: 0.0,
            capital_cost: 0.0,
            build_year: 0,
            lifetime: f64::INFINITY,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Load {
    pub name: String,
    pub bus: String,
    pub carrier: String,
    /// Static demand; time-varying demand lives in the `p_set` series
    pub p_set: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConstraint {
    pub name: String,
    /// e.g. `transmission_volume_expansion_limit`
    #[serde(rename = "type")]
    pub kind: String,
    pub carrier_attribute: String,
    pub sense: String,
    pub constant: f64,
}

impl Default for GlobalConstraint {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: String::new(),
            carrier_attribute: String::new(),
            sense: "<=".to_string(),
            constant: 0.0,
        }
    }
}

impl_named!(Bus, Generator, Link, Store, Line, Load, GlobalConstraint);

/// Investable assets carried over between planning horizons.
///
/// Implemented by [`Generator`], [`Link`] and [`Store`] so the brownfield
/// rules can treat the three tables uniformly.
pub trait Asset: Named + Clone {
    const KIND: ComponentKind;

    fn nom(&self) -> f64;
    fn set_nom(&mut self, value: f64);
    fn nom_opt(&self) -> f64;
    fn extendable(&self) -> bool;
    fn set_extendable(&mut self, extendable: bool);
    fn build_year(&self) -> u32;
    fn set_build_year(&mut self, year: u32);
    fn lifetime(&self) -> f64;

    fn efficiency(&self) -> f64 {
        1.0
    }

    fn nom_ratio(&self) -> f64 {
        1.0
    }

    /// The asset's table in a network.
    fn table(network: &Network) -> &ComponentTable<Self>;
    fn table_mut(network: &mut Network) -> &mut ComponentTable<Self>;

    /// Retired once `build_year + lifetime <= year`.
    fn retired_by(&self, year: u32) -> bool {
        f64::from(self.build_year()) + self.lifetime() <= f64::from(year)
    }

    /// Freeze installed capacity at the optimized value.
    fn fix_capacity(&mut self) {
        let opt = self.nom_opt();
        self.set_nom(opt);
        self.set_extendable(false);
    }
}

macro_rules! impl_asset {
    (
        $ty:ty, $kind:expr, $table:ident,
        $nom:ident, $opt:ident, $ext:ident { $($extra:tt)* }
    ) => {
        impl Asset for $ty {
            const KIND: ComponentKind = $kind;

            fn nom(&self) -> f64 {
                self.$nom
            }
            fn set_nom(&mut self, value: f64) {
                self.$nom = value;
            }
            fn nom_opt(&self) -> f64 {
                self.$opt
            }
            fn extendable(&self) -> bool {
                self.$ext
            }
            fn set_extendable(&mut self, extendable: bool) {
                self.$ext = extendable;
            }
            fn build_year(&self) -> u32 {
                self.build_year
            }
            fn set_build_year(&mut self, year: u32) {
                self.build_year = year;
            }
            fn lifetime(&self) -> f64 {
                self.lifetime
            }
            fn table(network: &Network) -> &ComponentTable<Self> {
                &network.$table
            }
            fn table_mut(network: &mut Network) -> &mut ComponentTable<Self> {
                &mut network.$table
            }
            $($extra)*
        }
    };
}

impl_asset!(
    Generator, ComponentKind::Generator, generators,
    p_nom, p_nom_opt, p_nom_extendable {
        fn efficiency(&self) -> f64 {
            self.efficiency
        }
    }
);

impl_asset!(
    Link, ComponentKind::Link, links,
    p_nom, p_nom_opt, p_nom_extendable {
        fn efficiency(&self) -> f64 {
            self.efficiency
        }
        fn nom_ratio(&self) -> f64 {
            self.p_nom_ratio
        }
    }
);

impl_asset!(
    Store, ComponentKind::Store, stores,
    e_nom, e_nom_opt, e_nom_extendable {}
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retirement_uses_build_year_plus_lifetime() {
        let gen = Generator {
            name: "g".into(),
            build_year: 2020,
            lifetime: 20.0,
            ..Generator::default()
        };
        assert!(!gen.retired_by(2039));
        assert!(gen.retired_by(2040));
    }

    #[test]
    fn infinite_lifetime_never_retires() {
        let store = Store {
            name: "co2 atmosphere".into(),
            ..Store::default()
        };
        assert!(!store.retired_by(2100));
    }

    #[test]
    fn fix_capacity_freezes_optimum() {
        let mut link = Link {
            name: "l".into(),
            p_nom: 1.0,
            p_nom_opt: 42.0,
            p_nom_extendable: true,
            ..Link::default()
        };
        link.fix_capacity();
        assert_eq!(link.p_nom, 42.0);
        assert!(!link.p_nom_extendable);
    }

    #[test]
    fn input_series_per_kind() {
        assert!(ComponentKind::Link.input_series().contains(&"efficiency"));
        assert!(ComponentKind::Store.input_series().contains(&"e_min_pu"));
        assert!(ComponentKind::Bus.input_series().is_empty());
        assert_eq!(ComponentKind::GlobalConstraint.list_name(), "global_constraints");
    }
}
