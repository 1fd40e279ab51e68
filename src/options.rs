//! Simulator command-line option composition.
//!
//! A master template carries one placeholder per option category (CPU model
//! flags, app binary and arguments, annotation file, checkpoint flags,
//! per-config feature flags). Each category resolves independently through
//! its own override cascade, then everything is substituted into the master
//! template in a fixed order.
//!
//! # Spacing convention
//!
//! Category placeholders are embedded in the master template with **no**
//! surrounding space, and every non-empty category value carries its own
//! leading space (`" --cpu-type=detailed"`). An empty category therefore
//! collapses without leaving a double space; consumers of the composed
//! string depend on this exactly.
//!
//! # Category chaining
//!
//! Categories resolve in declaration order against a context seeded with
//! `{config}`, `{app}` and `{work_dir}`; each resolved value joins the
//! context under the category's placeholder, so a later category may build
//! on an earlier one (the annotation filename is derived from the binary
//! path this way).

use serde::{Deserialize, Serialize};

use crate::error::{Result, SweepError};
use crate::overrides::{fold_rules, Rule};
use crate::template::{expand, has_placeholder, Context};

/// One option category: a placeholder slot, its default value and its
/// override cascade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionCategory {
    /// Placeholder this category fills.
    pub placeholder: String,

    /// Default value (may reference `{config}`, `{app}`, `{work_dir}` and
    /// earlier categories). Empty means the slot collapses.
    #[serde(default)]
    pub default: String,

    /// Override cascade, last-match-wins.
    #[serde(default)]
    pub rules: Vec<Rule>,
}

/// Option composition configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Master command-line template.
    pub template: String,

    /// Bound as `{work_dir}` in every category context.
    #[serde(default)]
    pub work_dir: String,

    /// Categories, resolved in declaration order.
    #[serde(default)]
    pub categories: Vec<OptionCategory>,
}

impl OptionsConfig {
    /// Fail fast when a category's placeholder is reachable from neither the
    /// master template nor any later category's text.
    pub fn validate(&self) -> Result<()> {
        for (idx, category) in self.categories.iter().enumerate() {
            if has_placeholder(&self.template, &category.placeholder) {
                continue;
            }
            let referenced_later = self.categories[idx + 1..].iter().any(|later| {
                has_placeholder(&later.default, &category.placeholder)
                    || later.rules.iter().any(|rule| {
                        let value = match &rule.action {
                            crate::overrides::Action::Set(v) => v,
                            crate::overrides::Action::Append(v) => v,
                        };
                        has_placeholder(value, &category.placeholder)
                    })
            });
            if !referenced_later {
                return Err(SweepError::MissingPlaceholder {
                    template: self.template.clone(),
                    placeholder: category.placeholder.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Composed option strings: config → app, insertion ordered.
#[derive(Debug, Clone, Default)]
pub struct OptionTable {
    entries: Vec<(String, Vec<(String, String)>)>,
}

impl OptionTable {
    pub fn get(&self, config: &str, app: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(c, _)| c == config)?
            .1
            .iter()
            .find(|(a, _)| a == app)
            .map(|(_, s)| s.as_str())
    }

    /// Iterate `(config, app, options)` in id-list order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.entries.iter().flat_map(|(config, apps)| {
            apps.iter()
                .map(move |(app, opts)| (config.as_str(), app.as_str(), opts.as_str()))
        })
    }
}

/// Composes simulator option strings for every `(config, app)` pair.
#[derive(Debug, Clone)]
pub struct OptionComposer {
    config: OptionsConfig,
}

impl OptionComposer {
    pub fn new(config: OptionsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Compose the option string for one pair.
    pub fn compose_one(&self, config: &str, app: &str) -> String {
        let mut ctx = Context::new();
        ctx.bind("config", config);
        ctx.bind("app", app);
        ctx.bind("work_dir", &self.config.work_dir);

        for category in &self.config.categories {
            let initial = expand(&category.default, &ctx);
            let value = fold_rules(&category.rules, config, app, initial, &ctx);
            ctx.bind(&category.placeholder, value);
        }

        expand(&self.config.template, &ctx)
    }

    /// Compose the full table for the given id lists.
    pub fn compose(&self, configs: &[String], apps: &[String]) -> OptionTable {
        let mut table = OptionTable::default();
        for config in configs {
            let mut per_app = Vec::new();
            for app in apps {
                per_app.push((app.clone(), self.compose_one(config, app)));
            }
            table.entries.push((config.clone(), per_app));
        }
        table
    }
}
