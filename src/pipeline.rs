//! End-to-end sweep pipeline.
//!
//! Connects the stages in their fixed order:
//!
//! ```text
//! SweepConfig → PathResolver → StatExtractor → FormulaPass (derived)
//!                  → Normalizer → FormulaPass (post-normalization composites)
//!                  → SweepReport
//! ```
//!
//! Everything is a pure transformation over immutable snapshots, executed
//! sequentially; a run either completes (possibly with warnings for missing
//! files) or fails outright only on a structural configuration error caught
//! up front.
//!
//! Option composition ([`Pipeline::compose_options`]) is an independent
//! sibling feeding the job-generation consumer, and
//! [`Pipeline::run_layout`] exposes the directory list for the scaffolding
//! consumer.

use std::path::PathBuf;

use crate::config::SweepConfig;
use crate::error::{Result, SweepError};
use crate::extract::extract;
use crate::formula::FormulaPass;
use crate::layout::RunLayout;
use crate::normalize::normalize;
use crate::options::{OptionComposer, OptionTable};
use crate::resolve::PathResolver;
use crate::table::StatTable;

/// Final report structure handed to the external renderer.
#[derive(Debug, Clone)]
pub struct SweepReport {
    /// The complete statistic table (rectangular over the id lists).
    pub table: StatTable,

    /// Statistic names to render, in order.
    pub stat_order: Vec<String>,

    /// `(config, app)` pairs whose result file was missing.
    pub missing_paths: usize,

    /// Formula cells that fell back to `NoData` across both passes.
    pub formula_cell_failures: usize,

    config_names: std::collections::HashMap<String, String>,
    app_names: std::collections::HashMap<String, String>,
}

impl SweepReport {
    /// Display label for a config (remap if present, else the id).
    pub fn display_config<'a>(&'a self, config: &'a str) -> &'a str {
        self.config_names.get(config).map_or(config, String::as_str)
    }

    /// Display label for an app (remap if present, else the id).
    pub fn display_app<'a>(&'a self, app: &'a str) -> &'a str {
        self.app_names.get(app).map_or(app, String::as_str)
    }
}

/// The sweep pipeline.
pub struct Pipeline {
    config: SweepConfig,
    resolver: PathResolver,
    composer: Option<OptionComposer>,
}

impl Pipeline {
    /// Build a pipeline from a validated configuration.
    ///
    /// All structural checks happen here (fail fast): id lists, templates,
    /// rule targets, formula chaining.
    pub fn from_config(config: SweepConfig) -> Result<Self> {
        config.validate()?;
        let resolver = PathResolver::new(config.paths.clone())?;
        let composer = match &config.options {
            Some(options) => Some(OptionComposer::new(options.clone())?),
            None => None,
        };
        Ok(Self {
            config,
            resolver,
            composer,
        })
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Execute the full pipeline.
    pub fn run(&self) -> Result<SweepReport> {
        let configs = &self.config.configs;
        let apps = &self.config.apps;

        let paths = self.resolver.resolve(configs, apps)?;
        let missing_paths = configs.len() * apps.len() - paths.len();

        let raw = extract(&paths, configs, apps, &self.config.stats);

        let derived_pass = FormulaPass::new(self.config.formulas.clone());
        let derived = derived_pass.apply(&raw, configs, apps, &self.config.resolved_derived_order());

        let normalized = normalize(&derived.table, &self.config.normalize);

        let (table, stat_order, post_failures) = if self.config.post_formulas.is_empty()
            && self.config.report_order.is_empty()
        {
            let order = normalized.stats().to_vec();
            (normalized, order, 0)
        } else {
            let order = if self.config.report_order.is_empty() {
                let mut order = normalized.stats().to_vec();
                order.extend(self.config.post_formulas.iter().map(|f| f.name.clone()));
                order
            } else {
                self.config.report_order.clone()
            };
            let post_pass = FormulaPass::new(self.config.post_formulas.clone());
            let post = post_pass.apply(&normalized, configs, apps, &order);
            (post.table, order, post.cell_failures)
        };

        Ok(SweepReport {
            table,
            stat_order,
            missing_paths,
            formula_cell_failures: derived.cell_failures + post_failures,
            config_names: self.config.config_names.clone(),
            app_names: self.config.app_names.clone(),
        })
    }

    /// Compose simulator option strings for every `(config, app)` pair.
    pub fn compose_options(&self) -> Result<OptionTable> {
        let composer = self.composer.as_ref().ok_or_else(|| {
            SweepError::Config("no [options] section in the sweep configuration".to_string())
        })?;
        Ok(composer.compose(&self.config.configs, &self.config.apps))
    }

    /// Directory list a run rooted at `root` needs, for the scaffolding
    /// consumer.
    pub fn run_layout(&self, root: impl Into<PathBuf>) -> Vec<PathBuf> {
        RunLayout::new(root).folders(&self.config.configs, &self.config.apps)
    }
}
