use hzn_brownfield::add_brownfield::surviving_assets;
use hzn_brownfield::{
    add_brownfield, disable_grid_expansion_if_limit_hit, prepare_brownfield, BrownfieldConfig,
    BrownfieldInputs, BrownfieldOptions, YearlyValue,
};
use hzn_core::{
    parse_timestamp, Bus, GlobalConstraint, Generator, Line, Link, Load, Network,
};
use hzn_io::{export_network, load_network, Registration, RegistrationTable};
use proptest::prelude::*;

fn options(h2_retrofit: bool) -> BrownfieldOptions {
    BrownfieldOptions {
        threshold_capacity: 10.0,
        h2_retrofit,
        h2_retrofit_capacity_per_ch4: 0.6,
    }
}

fn snapshots() -> Vec<chrono::NaiveDateTime> {
    ["2013-01-01 00:00:00", "2013-01-01 12:00:00"]
        .iter()
        .map(|s| parse_timestamp(s).unwrap())
        .collect()
}

fn bus(name: &str, carrier: &str) -> Bus {
    Bus {
        name: name.into(),
        carrier: carrier.into(),
    }
}

fn generator(name: &str, p_nom_opt: f64) -> Generator {
    Generator {
        name: name.into(),
        bus: "A".into(),
        carrier: "solar".into(),
        p_nom_opt,
        p_nom_extendable: true,
        build_year: 2030,
        lifetime: 25.0,
        ..Generator::default()
    }
}

fn toy_line(s_nom_min: f64, s_nom_opt: f64) -> Line {
    Line {
        name: "A-B".into(),
        bus0: "A".into(),
        bus1: "B".into(),
        s_nom_min,
        s_nom_opt,
        s_nom_extendable: true,
        length: 100.0,
        ..Line::default()
    }
}

fn two_bus_network() -> Network {
    let mut n = Network::with_snapshots(snapshots());
    n.buses.add(bus("A", "AC")).unwrap();
    n.buses.add(bus("B", "AC")).unwrap();
    n
}

#[test]
fn toy_network_is_frozen_when_volume_limit_is_met() {
    let mut n_p = two_bus_network();
    for (name, opt) in [("A solar-2030", 40.0), ("A onwind-2030", 25.5), ("A offwind-2030", 12.0)] {
        n_p.generators.add(generator(name, opt)).unwrap();
    }
    n_p.lines.add(toy_line(0.0, 1200.0)).unwrap();

    let mut n = two_bus_network();
    n.lines.add(toy_line(0.0, 0.0)).unwrap();
    n.global_constraints
        .add(GlobalConstraint {
            name: "lv_limit".into(),
            kind: "transmission_volume_expansion_limit".into(),
            constant: 1200.0 * 100.0,
            ..GlobalConstraint::default()
        })
        .unwrap();

    add_brownfield(&mut n, &n_p, 2040, &options(false)).unwrap();
    let removed = disable_grid_expansion_if_limit_hit(&mut n);

    assert_eq!(removed, vec!["lv_limit"]);
    assert!(n.global_constraints.is_empty());
    let line = n.lines.get("A-B").unwrap();
    assert!(!line.s_nom_extendable);
    assert_eq!(line.s_nom, 1200.0);
    for prior in n_p.generators.iter() {
        let carried = n.generators.get(&prior.name).unwrap();
        assert_eq!(carried.p_nom, prior.p_nom_opt);
        assert!(!carried.p_nom_extendable);
    }
}

#[test]
fn gas_and_h2_pipeline_capacity_is_conserved() {
    let year = 2040;
    let mut n_p = Network::new();
    n_p.links
        .add(Link {
            name: "H2 pipeline retrofitted DE0 0 -> FR0 0-2030".into(),
            carrier: "H2 pipeline retrofitted".into(),
            p_nom_opt: 30.0,
            p_nom_extendable: true,
            build_year: 2030,
            lifetime: 50.0,
            ..Link::default()
        })
        .unwrap();

    let mut n = Network::new();
    n.links
        .add(Link {
            name: "gas pipeline DE0 0 -> FR0 0-2040".into(),
            carrier: "gas pipeline".into(),
            p_nom: 100.0,
            p_nom_max: 100.0,
            build_year: year,
            lifetime: 50.0,
            ..Link::default()
        })
        .unwrap();
    n.links
        .add(Link {
            name: "H2 pipeline retrofitted DE0 0 -> FR0 0-2040".into(),
            carrier: "H2 pipeline retrofitted".into(),
            p_nom_max: 60.0,
            p_nom_extendable: true,
            build_year: year,
            lifetime: 50.0,
            ..Link::default()
        })
        .unwrap();

    let report = add_brownfield(&mut n, &n_p, year, &options(true)).unwrap();
    let retrofit = report.retrofit.unwrap();
    assert_eq!(retrofit.fixed_retrofits, 1);
    assert_eq!(retrofit.current_retrofits, 1);

    let gas = n.links.get("gas pipeline DE0 0 -> FR0 0-2040").unwrap();
    let fixed_h2 = n.links.get("H2 pipeline retrofitted DE0 0 -> FR0 0-2030").unwrap();
    // gas left + CH4 equivalent of the retrofitted H2 equals the original gas capacity
    assert!((gas.p_nom + fixed_h2.p_nom / 0.6 - 100.0).abs() < 1e-9);
    assert_eq!(gas.p_nom_max, gas.p_nom);

    let current = n.links.get("H2 pipeline retrofitted DE0 0 -> FR0 0-2040").unwrap();
    assert_eq!(current.p_nom_max, 30.0);
}

#[test]
fn pipeline_round_trips_through_csv_folders() {
    let dir = tempfile::tempdir().unwrap();
    let year = 2040;

    let mut n_p = two_bus_network();
    n_p.buses.add(bus("A land transport", "land transport demand light")).unwrap();
    n_p.generators.add(generator("A solar-2030", 50.0)).unwrap();
    n_p.links
        .add(Link {
            name: "A urban central air heat pump-2030".into(),
            bus0: "A".into(),
            bus1: "B".into(),
            p_nom_opt: 15.0,
            p_nom_extendable: true,
            build_year: 2030,
            lifetime: 20.0,
            ..Link::default()
        })
        .unwrap();
    n_p.loads
        .add(Load {
            name: "A land transport".into(),
            bus: "A land transport".into(),
            carrier: "land transport demand light".into(),
            ..Load::default()
        })
        .unwrap();
    let mut demand = n_p.new_series();
    demand.set_column("A land transport", vec![10.0, 10.0]).unwrap();
    n_p.loads.import_series("p_set", &demand).unwrap();

    let mut n = two_bus_network();
    n.buses.add(bus("A land transport", "land transport demand light")).unwrap();
    n.generators
        .add(Generator {
            name: "A solar".into(),
            p_nom_extendable: true,
            lifetime: 25.0,
            ..generator("A solar", 0.0)
        })
        .unwrap();
    n.links
        .add(Link {
            name: "A urban central air heat pump".into(),
            bus0: "A".into(),
            bus1: "B".into(),
            p_nom_extendable: true,
            lifetime: 20.0,
            ..Link::default()
        })
        .unwrap();
    n.links
        .add(Link {
            name: "A land transport oil light-existing".into(),
            bus0: "A".into(),
            bus1: "A land transport".into(),
            carrier: "land transport oil light".into(),
            p_nom: 80.0,
            ..Link::default()
        })
        .unwrap();
    n.loads
        .add(Load {
            name: "A land transport".into(),
            bus: "A land transport".into(),
            carrier: "land transport demand light".into(),
            ..Load::default()
        })
        .unwrap();
    let mut demand = n.new_series();
    demand.set_column("A land transport", vec![12.0, 12.0]).unwrap();
    n.loads.import_series("p_set", &demand).unwrap();
    let mut cop = n.new_series();
    cop.set_column("A urban central air heat pump", vec![2.8, 3.2]).unwrap();
    n.links.import_series("efficiency", &cop).unwrap();

    let current_dir = dir.path().join("n");
    let previous_dir = dir.path().join("n_p");
    export_network(&n, &current_dir).unwrap();
    export_network(&n_p, &previous_dir).unwrap();
    let mut n = load_network(&current_dir).unwrap();
    let mut n_p = load_network(&previous_dir).unwrap();

    let registrations = RegistrationTable::from_rows(vec![Registration {
        transport_type: "light".into(),
        country: "A".into(),
        rate: 0.05,
    }]);
    let mut config = BrownfieldConfig {
        endogenous_transport: true,
        ..BrownfieldConfig::default()
    };
    config
        .car_reg_factor
        .insert("light".into(), YearlyValue::Scalar(1.0));
    config
        .car_reg_factor
        .insert("heavy".into(), YearlyValue::Scalar(1.0));
    let inputs = BrownfieldInputs {
        registrations: Some(&registrations),
        profiles: None,
    };

    let summary = prepare_brownfield(&mut n, &mut n_p, inputs, &config, year).unwrap();

    assert_eq!(summary.assets_tagged, 2);
    assert!(n.generators.contains("A solar-2040"));
    assert!(n.generators.contains("A solar-2030"));
    assert_eq!(summary.heat_pumps.updated, 1);
    let efficiency = n.links.series("efficiency").unwrap();
    assert_eq!(
        efficiency.column("A urban central air heat pump-2030").unwrap(),
        &[2.8, 3.2]
    );

    // demand 24 / 20 scales the existing oil fleet, then 10 years at 5 % halve it
    let oil = n.links.get("A land transport oil light-existing").unwrap();
    assert!((oil.p_nom - 80.0 * 1.2 * 0.5).abs() < 1e-9);
    let transport = summary.transport.unwrap();
    assert_eq!(transport.previous_year, 2030);

    assert_eq!(n.meta["wildcards"]["planning_horizons"], 2040);
    assert_eq!(n.meta["threshold_capacity"], 10.0);

    let out = dir.path().join("out");
    export_network(&n, &out).unwrap();
    let reloaded = load_network(&out).unwrap();
    assert_eq!(reloaded.generators.len(), n.generators.len());
    assert_eq!(reloaded.meta, n.meta);
}

#[test]
fn endogenous_transport_requires_registrations() {
    let mut n = two_bus_network();
    let mut n_p = two_bus_network();
    let config = BrownfieldConfig {
        endogenous_transport: true,
        ..BrownfieldConfig::default()
    };
    let err = prepare_brownfield(&mut n, &mut n_p, BrownfieldInputs::default(), &config, 2040)
        .unwrap_err();
    assert!(err.to_string().contains("registration"));
}

fn previous_network(assets: &[(f64, bool, u32, Option<f64>)]) -> Network {
    let mut n_p = Network::new();
    for (i, (opt, extendable, build_year, lifetime)) in assets.iter().enumerate() {
        n_p.generators
            .add(Generator {
                name: format!("G{} {}", i, if i % 3 == 0 { "existing" } else { "new" }),
                p_nom_opt: *opt,
                p_nom_extendable: *extendable,
                build_year: *build_year,
                lifetime: lifetime.unwrap_or(f64::INFINITY),
                ..Generator::default()
            })
            .unwrap();
    }
    n_p
}

fn asset_strategy() -> impl Strategy<Value = Vec<(f64, bool, u32, Option<f64>)>> {
    proptest::collection::vec(
        (
            0.0..50.0f64,
            any::<bool>(),
            2000u32..2040,
            proptest::option::of(5.0..60.0f64),
        ),
        0..25,
    )
}

proptest! {
    #[test]
    fn threshold_filter_is_idempotent(assets in asset_strategy(), threshold in 0.0..30.0f64) {
        let n_p = previous_network(&assets);
        let first = surviving_assets::<Generator>(&n_p, 2040, threshold);

        let mut filtered = Network::new();
        for name in &first {
            filtered.generators.add(n_p.generators.get(name).unwrap().clone()).unwrap();
        }
        let second = surviving_assets::<Generator>(&filtered, 2040, threshold);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn carried_capacity_equals_previous_optimum(assets in asset_strategy()) {
        let n_p = previous_network(&assets);
        let mut n = Network::new();
        add_brownfield(&mut n, &n_p, 2040, &options(false)).unwrap();
        for carried in n.generators.iter() {
            let prior = n_p.generators.get(&carried.name).unwrap();
            prop_assert_eq!(carried.p_nom, prior.p_nom_opt);
            prop_assert!(!carried.p_nom_extendable);
        }
    }
}
