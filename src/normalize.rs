//! Baseline normalization.
//!
//! The first config of the sweep's config list is the baseline by
//! convention. For every statistic named in the normalization map, a new
//! statistic is added whose cells are `value / baseline_value` for the same
//! app, inserted into the table right after its base statistic, which is
//! where the report renderer expects it.

use serde::{Deserialize, Serialize};

use crate::table::{StatTable, StatValue};

/// One statistic to normalize and the name of its normalized version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizeSpec {
    /// Base statistic to normalize.
    pub stat: String,
    /// Name of the added ratio-to-baseline statistic.
    pub as_name: String,
}

impl NormalizeSpec {
    pub fn new(stat: impl Into<String>, as_name: impl Into<String>) -> Self {
        Self {
            stat: stat.into(),
            as_name: as_name.into(),
        }
    }
}

/// Add ratio-to-baseline statistics.
///
/// Every statistic of `input` is copied through unchanged. A cell of a
/// normalized statistic is `NoData` when either side fails to parse, when
/// the baseline value is zero, or when the quotient is non-finite; for the
/// baseline config itself it is exactly `1.0` whenever the raw value is a
/// valid non-zero number.
pub fn normalize(input: &StatTable, specs: &[NormalizeSpec]) -> StatTable {
    let configs = input.configs().to_vec();
    let apps = input.apps().to_vec();
    let mut table = StatTable::new(&configs, &apps);

    let baseline = match configs.first() {
        Some(baseline) => baseline.clone(),
        None => return table,
    };

    for stat in input.stats() {
        table.copy_stat_from(input, stat);
        for spec in specs.iter().filter(|spec| &spec.stat == stat) {
            table.add_stat(&spec.as_name);
            for config in &configs {
                for app in &apps {
                    let ratio = match (
                        input.parse(stat, config, app),
                        input.parse(stat, &baseline, app),
                    ) {
                        (Some(value), Some(base)) if base != 0.0 => {
                            let ratio = value / base;
                            ratio.is_finite().then_some(ratio)
                        }
                        _ => None,
                    };
                    let cell = match ratio {
                        Some(ratio) => StatValue::Num(ratio),
                        None => StatValue::NoData,
                    };
                    table.set(&spec.as_name, config, app, cell);
                }
            }
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn table_with_cycles() -> StatTable {
        let configs = ids(&["cfgA", "cfgB"]);
        let apps = ids(&["app1"]);
        let mut table = StatTable::new(&configs, &apps);
        table.set("cycles", "cfgA", "app1", StatValue::Raw("1000".to_string()));
        table
    }

    #[test]
    fn test_baseline_normalizes_to_one() {
        let table = table_with_cycles();
        let out = normalize(&table, &[NormalizeSpec::new("cycles", "norm_cycles")]);
        assert_eq!(
            out.get("norm_cycles", "cfgA", "app1"),
            Some(&StatValue::Num(1.0))
        );
    }

    #[test]
    fn test_missing_numerator_is_no_data() {
        let table = table_with_cycles();
        let out = normalize(&table, &[NormalizeSpec::new("cycles", "norm_cycles")]);
        assert_eq!(
            out.get("norm_cycles", "cfgB", "app1"),
            Some(&StatValue::NoData)
        );
    }

    #[test]
    fn test_zero_baseline_is_no_data() {
        let configs = ids(&["base", "other"]);
        let apps = ids(&["x"]);
        let mut table = StatTable::new(&configs, &apps);
        table.set("misses", "base", "x", StatValue::Raw("0".to_string()));
        table.set("misses", "other", "x", StatValue::Raw("5".to_string()));

        let out = normalize(&table, &[NormalizeSpec::new("misses", "norm_misses")]);
        assert_eq!(out.get("norm_misses", "base", "x"), Some(&StatValue::NoData));
        assert_eq!(out.get("norm_misses", "other", "x"), Some(&StatValue::NoData));
    }

    #[test]
    fn test_ratio_value() {
        let configs = ids(&["base", "other"]);
        let apps = ids(&["x"]);
        let mut table = StatTable::new(&configs, &apps);
        table.set("cycles", "base", "x", StatValue::Raw("200".to_string()));
        table.set("cycles", "other", "x", StatValue::Raw("150".to_string()));

        let out = normalize(&table, &[NormalizeSpec::new("cycles", "norm")]);
        assert_eq!(out.get("norm", "other", "x"), Some(&StatValue::Num(0.75)));
    }

    #[test]
    fn test_all_stats_copied_and_ordering() {
        let configs = ids(&["A"]);
        let apps = ids(&["x"]);
        let mut table = StatTable::new(&configs, &apps);
        table.set("cycles", "A", "x", StatValue::Raw("10".to_string()));
        table.set("misses", "A", "x", StatValue::Raw("2".to_string()));

        let out = normalize(&table, &[NormalizeSpec::new("cycles", "norm_cycles")]);
        // normalized statistic sits right after its base statistic
        assert_eq!(out.stats(), &["cycles", "norm_cycles", "misses"]);
        assert_eq!(
            out.get("misses", "A", "x"),
            Some(&StatValue::Raw("2".to_string()))
        );
    }
}
