//! Core table types: statistic values, the statistic table, and the path table.
//!
//! # The `NoData` sentinel
//!
//! Sparse results are the normal case for a large sweep, so "looked for this
//! data point and it is unavailable" is a first-class value
//! ([`StatValue::NoData`]), distinct from a key simply not existing in a
//! table (which means "not yet computed"). Every downstream stage treats
//! unparseable text the same way it treats `NoData`.
//!
//! # Ordering
//!
//! Report output must be reproducible, so both tables preserve insertion
//! order: statistics in the order they were added, configs and apps in the
//! order of the caller-supplied id lists.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ============================================================================
// StatValue
// ============================================================================

/// A single statistic cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatValue {
    /// Raw text as read from a statistics file; parsed on demand.
    Raw(String),
    /// A computed numeric value (formula or normalization output).
    Num(f64),
    /// Looked for and not found, or invalid.
    NoData,
}

impl StatValue {
    /// Parse the value as a finite `f64`, if possible.
    pub fn parse(&self) -> Option<f64> {
        match self {
            StatValue::Raw(text) => text.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            StatValue::Num(v) => v.is_finite().then_some(*v),
            StatValue::NoData => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, StatValue::NoData)
    }
}

impl std::fmt::Display for StatValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatValue::Raw(text) => write!(f, "{text}"),
            StatValue::Num(v) => write!(f, "{v}"),
            StatValue::NoData => write!(f, "noData"),
        }
    }
}

// ============================================================================
// StatTable
// ============================================================================

/// Three-level statistic table: statistic → config → app → value.
///
/// The table always has rectangular shape: every statistic it carries has a
/// cell for every `(config, app)` pair of the id lists it was built with.
/// Cells start as [`StatValue::NoData`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatTable {
    configs: Vec<String>,
    apps: Vec<String>,
    stat_order: Vec<String>,
    cells: HashMap<String, HashMap<String, HashMap<String, StatValue>>>,
}

impl StatTable {
    /// Create an empty table over the given id lists.
    pub fn new(configs: &[String], apps: &[String]) -> Self {
        Self {
            configs: configs.to_vec(),
            apps: apps.to_vec(),
            stat_order: Vec::new(),
            cells: HashMap::new(),
        }
    }

    /// Config ids, in caller order. The first one is the baseline.
    pub fn configs(&self) -> &[String] {
        &self.configs
    }

    /// App ids, in caller order.
    pub fn apps(&self) -> &[String] {
        &self.apps
    }

    /// Statistic names, in insertion order.
    pub fn stats(&self) -> &[String] {
        &self.stat_order
    }

    pub fn has_stat(&self, stat: &str) -> bool {
        self.cells.contains_key(stat)
    }

    /// Add a statistic with every cell set to `NoData`. No-op if present.
    pub fn add_stat(&mut self, stat: &str) {
        if self.cells.contains_key(stat) {
            return;
        }
        let mut per_config = HashMap::new();
        for config in &self.configs {
            let mut per_app = HashMap::new();
            for app in &self.apps {
                per_app.insert(app.clone(), StatValue::NoData);
            }
            per_config.insert(config.clone(), per_app);
        }
        self.stat_order.push(stat.to_string());
        self.cells.insert(stat.to_string(), per_config);
    }

    /// Set a cell. Adds the statistic if absent; ignores ids outside the
    /// table's id lists.
    pub fn set(&mut self, stat: &str, config: &str, app: &str, value: StatValue) {
        self.add_stat(stat);
        if let Some(cell) = self
            .cells
            .get_mut(stat)
            .and_then(|per_config| per_config.get_mut(config))
            .and_then(|per_app| per_app.get_mut(app))
        {
            *cell = value;
        }
    }

    pub fn get(&self, stat: &str, config: &str, app: &str) -> Option<&StatValue> {
        self.cells
            .get(stat)?
            .get(config)?
            .get(app)
    }

    /// Parse a cell as a finite number; `None` covers absent, `NoData`, and
    /// unparseable cells alike.
    pub fn parse(&self, stat: &str, config: &str, app: &str) -> Option<f64> {
        self.get(stat, config, app).and_then(StatValue::parse)
    }

    /// Copy one statistic's cells verbatim from another table.
    ///
    /// Missing source cells become `NoData` here, preserving the shape
    /// invariant even when the source never carried the statistic.
    pub fn copy_stat_from(&mut self, source: &StatTable, stat: &str) {
        self.add_stat(stat);
        for config in self.configs.clone() {
            for app in self.apps.clone() {
                let value = source
                    .get(stat, &config, &app)
                    .cloned()
                    .unwrap_or(StatValue::NoData);
                self.set(stat, &config, &app, value);
            }
        }
    }
}

// ============================================================================
// PathTable
// ============================================================================

/// Resolved result-file locations: config → app → path, insertion ordered.
///
/// Built once per run; entries are pruned when the existence check fails and
/// a config is dropped entirely once its app map empties.
#[derive(Debug, Clone, Default)]
pub struct PathTable {
    entries: Vec<(String, Vec<(String, PathBuf)>)>,
}

impl PathTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of `(config, app)` entries.
    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, apps)| apps.len()).sum()
    }

    pub fn insert(&mut self, config: &str, app: &str, path: PathBuf) {
        let idx = match self.entries.iter().position(|(c, _)| c == config) {
            Some(idx) => idx,
            None => {
                self.entries.push((config.to_string(), Vec::new()));
                self.entries.len() - 1
            }
        };
        let per_config = &mut self.entries[idx].1;
        match per_config.iter_mut().find(|(a, _)| a == app) {
            Some((_, existing)) => *existing = path,
            None => per_config.push((app.to_string(), path)),
        }
    }

    pub fn get(&self, config: &str, app: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(c, _)| c == config)?
            .1
            .iter()
            .find(|(a, _)| a == app)
            .map(|(_, p)| p.as_path())
    }

    pub fn contains(&self, config: &str, app: &str) -> bool {
        self.get(config, app).is_some()
    }

    /// Remove one entry; drops the config when its app map empties.
    pub fn remove(&mut self, config: &str, app: &str) {
        if let Some(idx) = self.entries.iter().position(|(c, _)| c == config) {
            self.entries[idx].1.retain(|(a, _)| a != app);
            if self.entries[idx].1.is_empty() {
                self.entries.remove(idx);
            }
        }
    }

    /// Iterate `(config, app, path)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &Path)> {
        self.entries.iter().flat_map(|(config, apps)| {
            apps.iter()
                .map(move |(app, path)| (config.as_str(), app.as_str(), path.as_path()))
        })
    }

    /// Warn about table keys absent from the caller-supplied id lists.
    ///
    /// Detects stale override rules referencing retired ids. Entries are
    /// retained; this is a diagnostic, not a repair.
    pub fn check_ids(&self, configs: &[String], apps: &[String]) {
        for (config, per_config) in &self.entries {
            if !configs.iter().any(|c| c == config) {
                log::warn!("config `{config}` is not in the list of configs provided");
            }
            for (app, _) in per_config {
                if !apps.iter().any(|a| a == app) {
                    log::warn!("app `{app}` is not in the list of apps provided");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_stat_value_parse() {
        assert_eq!(StatValue::Raw("1000".into()).parse(), Some(1000.0));
        assert_eq!(StatValue::Raw("  3.5 ".into()).parse(), Some(3.5));
        assert_eq!(StatValue::Raw("0.831250".into()).parse(), Some(0.83125));
        assert_eq!(StatValue::Raw("nan".into()).parse(), None);
        assert_eq!(StatValue::Raw("noData".into()).parse(), None);
        assert_eq!(StatValue::Num(2.0).parse(), Some(2.0));
        assert_eq!(StatValue::NoData.parse(), None);
    }

    #[test]
    fn test_table_shape_and_order() {
        let configs = ids(&["Baseline", "Predict"]);
        let apps = ids(&["sgemm", "sobel"]);
        let mut table = StatTable::new(&configs, &apps);
        table.add_stat("cycles");
        table.add_stat("l2_misses");

        assert_eq!(table.stats(), &["cycles", "l2_misses"]);
        for config in table.configs() {
            for app in table.apps() {
                assert_eq!(table.get("cycles", config, app), Some(&StatValue::NoData));
            }
        }
    }

    #[test]
    fn test_set_outside_id_lists_is_ignored() {
        let mut table = StatTable::new(&ids(&["A"]), &ids(&["x"]));
        table.set("cycles", "B", "x", StatValue::Num(1.0));
        assert_eq!(table.get("cycles", "B", "x"), None);
        // shape for the declared ids is still intact
        assert_eq!(table.get("cycles", "A", "x"), Some(&StatValue::NoData));
    }

    #[test]
    fn test_copy_stat_from_missing_source() {
        let configs = ids(&["A"]);
        let apps = ids(&["x"]);
        let source = StatTable::new(&configs, &apps);
        let mut dest = StatTable::new(&configs, &apps);
        dest.copy_stat_from(&source, "ghost");
        assert_eq!(dest.get("ghost", "A", "x"), Some(&StatValue::NoData));
    }

    #[test]
    fn test_path_table_remove_drops_empty_config() {
        let mut paths = PathTable::new();
        paths.insert("A", "x", PathBuf::from("/tmp/a_x.stat"));
        paths.insert("A", "y", PathBuf::from("/tmp/a_y.stat"));
        paths.remove("A", "x");
        assert!(paths.contains("A", "y"));
        paths.remove("A", "y");
        assert!(paths.is_empty());
    }

    #[test]
    fn test_path_table_iteration_order() {
        let mut paths = PathTable::new();
        paths.insert("B", "y", PathBuf::from("b_y"));
        paths.insert("A", "x", PathBuf::from("a_x"));
        paths.insert("B", "x", PathBuf::from("b_x"));
        let order: Vec<(String, String)> = paths
            .iter()
            .map(|(c, a, _)| (c.to_string(), a.to_string()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("B".to_string(), "y".to_string()),
                ("B".to_string(), "x".to_string()),
                ("A".to_string(), "x".to_string()),
            ]
        );
    }
}
