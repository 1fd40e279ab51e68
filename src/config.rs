//! Sweep configuration.
//!
//! One [`SweepConfig`] describes an entire report run: the ordered id lists
//! (first config is the baseline), the path templates and their override
//! rules, the statistics to extract, the formula and normalization specs,
//! the option-composition setup, and display-name remaps for the renderer.
//!
//! Configurations serialize to TOML or JSON for experiment reproducibility,
//! and are validated before use: structural mistakes (formula chaining,
//! rules naming missing placeholders, an empty config list) fail fast
//! instead of surfacing mid-run.
//!
//! # Example
//!
//! ```ignore
//! use stat_sweep::config::SweepConfig;
//!
//! let config = SweepConfig::load_toml("sweep.toml")?;
//! let pipeline = Pipeline::from_config(config)?;
//! let report = pipeline.run()?;
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SweepError};
use crate::extract::StatSpec;
use crate::formula::{FormulaPass, FormulaSpec};
use crate::normalize::NormalizeSpec;
use crate::options::OptionsConfig;
use crate::resolve::PathConfig;

/// Sweep metadata for tracking and reproducibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepMetadata {
    /// Sweep name
    pub name: String,

    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    /// Version or git commit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Custom tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Unified sweep configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Configuration ids, in report order. The first is the baseline.
    pub configs: Vec<String>,

    /// Application ids, in report order.
    pub apps: Vec<String>,

    /// Result-file path resolution.
    pub paths: PathConfig,

    /// Statistics to extract, in report order.
    pub stats: Vec<StatSpec>,

    /// Derived statistics computed before normalization.
    #[serde(default)]
    pub formulas: Vec<FormulaSpec>,

    /// Output order of the pre-normalization pass. Empty means "extracted
    /// statistics followed by formula outputs".
    #[serde(default)]
    pub derived_order: Vec<String>,

    /// Statistics to normalize against the baseline.
    #[serde(default)]
    pub normalize: Vec<NormalizeSpec>,

    /// Composite statistics computed after normalization.
    #[serde(default)]
    pub post_formulas: Vec<FormulaSpec>,

    /// Final report order. Empty means "post-normalization table order
    /// followed by post-formula outputs".
    #[serde(default)]
    pub report_order: Vec<String>,

    /// Option composition for the job-generation consumer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<OptionsConfig>,

    /// Display names for configs whose report label differs from the id.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub config_names: HashMap<String, String>,

    /// Display names for apps whose report label differs from the id.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub app_names: HashMap<String, String>,

    /// Sweep metadata (optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SweepMetadata>,
}

impl SweepConfig {
    /// Baseline config id (first in the list).
    pub fn baseline(&self) -> Option<&str> {
        self.configs.first().map(String::as_str)
    }

    /// Set sweep metadata.
    pub fn with_metadata(mut self, metadata: SweepMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Set option composition.
    pub fn with_options(mut self, options: OptionsConfig) -> Self {
        self.options = Some(options);
        self
    }

    /// Resolved pre-normalization output order.
    pub fn resolved_derived_order(&self) -> Vec<String> {
        if !self.derived_order.is_empty() {
            return self.derived_order.clone();
        }
        let mut order: Vec<String> = self.stats.iter().map(|s| s.name.clone()).collect();
        order.extend(self.formulas.iter().map(|f| f.name.clone()));
        order
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.configs.is_empty() {
            return Err(SweepError::Config(
                "config list is empty (the first config is the baseline)".to_string(),
            ));
        }
        if self.apps.is_empty() {
            return Err(SweepError::Config("app list is empty".to_string()));
        }

        for (idx, stat) in self.stats.iter().enumerate() {
            if self.stats[..idx].iter().any(|other| other.name == stat.name) {
                return Err(SweepError::Config(format!(
                    "duplicate statistic name `{}`",
                    stat.name
                )));
            }
        }

        self.paths.validate()?;
        FormulaPass::new(self.formulas.clone()).validate()?;
        FormulaPass::new(self.post_formulas.clone()).validate()?;

        for spec in &self.normalize {
            let taken = self.stats.iter().any(|s| s.name == spec.as_name)
                || self.formulas.iter().any(|f| f.name == spec.as_name);
            if taken {
                return Err(SweepError::Config(format!(
                    "normalized statistic name `{}` collides with an existing statistic",
                    spec.as_name
                )));
            }
        }

        if let Some(options) = &self.options {
            options.validate()?;
        }

        Ok(())
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(path, toml_string)?;
        Ok(())
    }

    /// Load and validate a configuration from a TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: SweepConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json_string = serde_json::to_string_pretty(self)?;
        fs::write(path, json_string)?;
        Ok(())
    }

    /// Load and validate a configuration from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: SweepConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }
}
