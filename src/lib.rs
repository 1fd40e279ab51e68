//! Stat Sweep
//!
//! Post-processing for large simulator experiment sweeps. Each experiment is
//! a `(configuration, application)` pair whose raw output is a flat
//! key/value statistics file somewhere in a deeply nested, historically
//! inconsistent directory tree. This library deterministically locates the
//! right file for every pair, extracts named statistics, derives new
//! statistics from formulas, and normalizes against a baseline
//! configuration, producing a clean, complete table for reporting.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                          Stat Sweep                            │
//! ├────────────────────────────────────────────────────────────────┤
//! │  resolve/    - result-file path resolution (template+override) │
//! │  extract/    - statistic extraction (NoData as a value)        │
//! │  formula/    - derived metrics (sandboxed arithmetic)          │
//! │  normalize/  - ratio-to-baseline statistics                    │
//! │  options/    - simulator command-line composition              │
//! │  layout/     - run-directory list for scaffolding              │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Partial data is the normal case for a big sweep, not the exception:
//! missing files prune path-table entries with a warning, absent statistics
//! and failed formula cells become the explicit [`StatValue::NoData`]
//! sentinel, and a completed run with warnings is a valid, usable report.
//! Only structural mistakes (a rule targeting a placeholder no template
//! has, a formula referencing another formula of the same pass) abort a
//! run, and they do so before any file is touched.
//!
//! # Example
//!
//! ```ignore
//! use stat_sweep::prelude::*;
//!
//! let config = SweepConfig::load_toml("sweep.toml")?;
//! let pipeline = Pipeline::from_config(config)?;
//!
//! let report = pipeline.run()?;
//! for stat in &report.stat_order {
//!     for config in report.table.configs() {
//!         for app in report.table.apps() {
//!             let value = report.table.get(stat, config, app);
//!             // hand off to the renderer
//!         }
//!     }
//! }
//!
//! // Independent sibling: option strings for job generation
//! let options = pipeline.compose_options()?;
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod formula;
pub mod layout;
pub mod normalize;
pub mod options;
pub mod overrides;
pub mod pipeline;
pub mod prelude;
pub mod resolve;
pub mod table;
pub mod template;

// Re-exports - Errors
pub use error::{Result, SweepError};

// Re-exports - Config
pub use config::{SweepConfig, SweepMetadata};

// Re-exports - Tables
pub use table::{PathTable, StatTable, StatValue};

// Re-exports - Stages
pub use extract::{extract, StatSpec};
pub use formula::{eval_arith, FormulaInput, FormulaOutcome, FormulaPass, FormulaSpec};
pub use normalize::{normalize, NormalizeSpec};
pub use options::{OptionCategory, OptionComposer, OptionTable, OptionsConfig};
pub use resolve::{BindingRule, PathConfig, PathResolver};

// Re-exports - Rules
pub use overrides::{Action, Matcher, Rule};

// Re-exports - Pipeline
pub use layout::RunLayout;
pub use pipeline::{Pipeline, SweepReport};
