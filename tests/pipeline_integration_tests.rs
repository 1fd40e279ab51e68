//! End-to-end pipeline tests over a real (temporary) result tree.
//!
//! These exercise the documented contract: rectangular table shape, missing
//! files as prunes rather than failures, default fallback in formulas, and
//! baseline normalization identity.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use stat_sweep::prelude::*;

fn write_file(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn sweep_config(root: &Path) -> SweepConfig {
    SweepConfig {
        configs: vec!["cfgA".to_string(), "cfgB".to_string()],
        apps: vec!["app1".to_string(), "app2".to_string()],
        paths: PathConfig {
            common_prefix: root.display().to_string(),
            config_path_template: "{config_dir}/{app_file}.stat".to_string(),
            app_filename_template: "{app}".to_string(),
            data_size: "512".to_string(),
            binding_rules: Vec::new(),
            path_rules: Vec::new(),
        },
        stats: vec![
            StatSpec::new("cycles", "numCycles"),
            StatSpec::new("a", "statA"),
            StatSpec::new("b", "statB"),
        ],
        formulas: vec![FormulaSpec {
            name: "total".to_string(),
            expr: "(a)+(b)".to_string(),
            inputs: vec![
                FormulaInput::new("a", "0.0"),
                FormulaInput::new("b", "0.0"),
            ],
        }],
        derived_order: Vec::new(),
        normalize: vec![NormalizeSpec::new("cycles", "norm_cycles")],
        post_formulas: vec![FormulaSpec {
            name: "norm_cycles_pct".to_string(),
            expr: "(norm_cycles)*100".to_string(),
            inputs: vec![FormulaInput::new("norm_cycles", "0.0")],
        }],
        report_order: Vec::new(),
        options: None,
        config_names: HashMap::new(),
        app_names: HashMap::new(),
        metadata: None,
    }
}

/// Lay out the fixture tree: cfgB/app2 deliberately has no result file and
/// cfgB's files never mention `numCycles`.
fn populate(root: &Path) {
    write_file(
        &root.join("cfgA/app1.stat"),
        "system.switch_cpus.numCycles    1000  # ticks\nstatA 3\n",
    );
    write_file(&root.join("cfgA/app2.stat"), "system.switch_cpus.numCycles 500\n");
    write_file(&root.join("cfgB/app1.stat"), "something.else 7\nstatA 6\n");
}

#[test]
fn test_full_pipeline_report() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());

    let pipeline = Pipeline::from_config(sweep_config(dir.path())).unwrap();
    let report = pipeline.run().unwrap();

    assert_eq!(report.missing_paths, 1); // cfgB/app2
    assert_eq!(
        report.stat_order,
        vec!["cycles", "norm_cycles", "a", "b", "total", "norm_cycles_pct"]
    );

    let t = &report.table;
    assert_eq!(t.get("cycles", "cfgA", "app1"), Some(&StatValue::Raw("1000".to_string())));
    assert_eq!(t.get("cycles", "cfgB", "app1"), Some(&StatValue::NoData));

    // formula default fallback: b is missing everywhere
    assert_eq!(t.get("total", "cfgA", "app1"), Some(&StatValue::Num(3.0)));
    assert_eq!(t.get("total", "cfgB", "app1"), Some(&StatValue::Num(6.0)));

    // normalization identity on the baseline, NoData for missing numerator
    assert_eq!(t.get("norm_cycles", "cfgA", "app1"), Some(&StatValue::Num(1.0)));
    assert_eq!(t.get("norm_cycles", "cfgB", "app1"), Some(&StatValue::NoData));

    // post-normalization composite chains on the normalized statistic
    assert_eq!(
        t.get("norm_cycles_pct", "cfgA", "app1"),
        Some(&StatValue::Num(100.0))
    );
    // norm_cycles is NoData for cfgB, so the declared default kicks in
    assert_eq!(
        t.get("norm_cycles_pct", "cfgB", "app1"),
        Some(&StatValue::Num(0.0))
    );
}

#[test]
fn test_table_shape_is_rectangular() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());

    let pipeline = Pipeline::from_config(sweep_config(dir.path())).unwrap();
    let report = pipeline.run().unwrap();

    for stat in &report.stat_order {
        for config in report.table.configs() {
            for app in report.table.apps() {
                assert!(
                    report.table.get(stat, config, app).is_some(),
                    "missing cell ({stat}, {config}, {app})"
                );
            }
        }
    }
}

#[test]
fn test_missing_file_pair_is_all_no_data() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());

    let pipeline = Pipeline::from_config(sweep_config(dir.path())).unwrap();
    let report = pipeline.run().unwrap();

    // cfgB/app2 has no file: every extracted statistic stays NoData
    for stat in ["cycles", "a", "b"] {
        assert_eq!(
            report.table.get(stat, "cfgB", "app2"),
            Some(&StatValue::NoData)
        );
    }
    // and the all-defaults formula still evaluates
    assert_eq!(
        report.table.get("total", "cfgB", "app2"),
        Some(&StatValue::Num(0.0))
    );
}

#[test]
fn test_run_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());

    let pipeline = Pipeline::from_config(sweep_config(dir.path())).unwrap();
    let first = pipeline.run().unwrap();
    let second = pipeline.run().unwrap();

    assert_eq!(first.stat_order, second.stat_order);
    for stat in &first.stat_order {
        for config in first.table.configs() {
            for app in first.table.apps() {
                assert_eq!(
                    first.table.get(stat, config, app),
                    second.table.get(stat, config, app)
                );
            }
        }
    }
}

#[test]
fn test_config_round_trip_through_toml() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());

    let config = sweep_config(dir.path());
    let config_path = dir.path().join("sweep.toml");
    config.save_toml(&config_path).unwrap();
    let loaded = SweepConfig::load_toml(&config_path).unwrap();

    let direct = Pipeline::from_config(config).unwrap().run().unwrap();
    let reloaded = Pipeline::from_config(loaded).unwrap().run().unwrap();
    assert_eq!(direct.stat_order, reloaded.stat_order);
    assert_eq!(
        direct.table.get("total", "cfgA", "app1"),
        reloaded.table.get("total", "cfgA", "app1")
    );
}
