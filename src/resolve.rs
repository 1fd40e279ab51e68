//! Result-file path resolution.
//!
//! Every `(config, app)` experiment left its statistics file somewhere under
//! a directory tree that grew organically: configs were renamed on disk,
//! some apps never had a data-size segment in their filenames, and whole
//! result sets were moved under dated directories after reruns. Resolution
//! therefore works in layers:
//!
//! 1. **Templates**: a common prefix, a per-config subpath template and a
//!    per-app filename template, all using `{name}` placeholders.
//! 2. **Binding rules**: per-config / per-app overrides of the placeholder
//!    substitutions (historical renames).
//! 3. **Path rules**: overrides of the fully composed candidate path,
//!    either wholesale replacement or a literal appended suffix. Config-only
//!    rules fold before `(config, app)` rules; within each breadth,
//!    declaration order wins.
//! 4. **Pruning**: candidates that are not regular files are removed with a
//!    warning; missing results are expected, never fatal.
//!
//! The only fatal condition is a binding rule naming a placeholder that no
//! template contains: that is a configuration bug and surfaces before any
//! path is built.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::overrides::{fold_rules, Action, Matcher, Rule};
use crate::table::PathTable;
use crate::template::{ensure_placeholder, expand, has_placeholder, Context};

/// Placeholders with built-in default bindings, in binding order.
const DEFAULT_BINDINGS: &[&str] = &["app_dir", "config_dir", "config_suffix"];

/// A placeholder-level override rule.
///
/// Targets one placeholder of the path templates; the action value is itself
/// a template expanded against the current context, so
/// `set = "{app}"` drops the data-size segment from an app directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingRule {
    /// Placeholder this rule overrides (must exist in a path template).
    pub placeholder: String,
    #[serde(default)]
    pub matcher: Matcher,
    pub action: Action,
}

/// Path resolution configuration.
///
/// Template placeholders:
/// - `config_path_template`: `{config_dir}`, `{config_suffix}`, `{app_file}`
/// - `app_filename_template`: `{app_dir}`, `{app}`, `{size}`
///
/// Default bindings: `{config_dir}` and `{config_suffix}` are the config id,
/// `{app_dir}` is `{app}_{size}`, `{size}` is [`PathConfig::data_size`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    /// Common path prefix for all result files.
    pub common_prefix: String,

    /// Per-configuration subpath template.
    pub config_path_template: String,

    /// Per-application filename template.
    pub app_filename_template: String,

    /// Fixed data-size token substituted for `{size}`.
    pub data_size: String,

    /// Placeholder-level overrides (layer 2).
    #[serde(default)]
    pub binding_rules: Vec<BindingRule>,

    /// Full-path overrides (layer 3). `set` replaces the candidate with a
    /// new template; `append` adds a literal suffix.
    #[serde(default)]
    pub path_rules: Vec<Rule>,
}

impl PathConfig {
    /// Fail fast when a binding rule targets a placeholder that appears in
    /// neither path template.
    pub fn validate(&self) -> Result<()> {
        for rule in &self.binding_rules {
            if has_placeholder(&self.app_filename_template, &rule.placeholder) {
                continue;
            }
            ensure_placeholder(&self.config_path_template, &rule.placeholder)?;
        }
        Ok(())
    }
}

/// Resolves result-file locations for a sweep.
#[derive(Debug, Clone)]
pub struct PathResolver {
    config: PathConfig,
}

impl PathResolver {
    /// Create a resolver, validating the template/rule combination.
    pub fn new(config: PathConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Fold the binding rules targeting `placeholder` over `initial`.
    fn fold_binding(
        &self,
        placeholder: &str,
        config: &str,
        app: &str,
        initial: String,
        ctx: &Context,
    ) -> String {
        let rules: Vec<Rule> = self
            .config
            .binding_rules
            .iter()
            .filter(|r| r.placeholder == placeholder)
            .map(|r| Rule::new(r.matcher.clone(), r.action.clone()))
            .collect();
        fold_rules(&rules, config, app, initial, ctx)
    }

    /// Compose the candidate path for one `(config, app)` pair.
    ///
    /// Applies the template and override layers but performs no existence
    /// check; [`PathResolver::resolve`] is the pruning entry point.
    ///
    /// Every placeholder that `validate()` accepts a binding rule for is
    /// actually folded: the seed bindings, the derived defaults, any other
    /// template placeholder, and `{app_file}` after its template expands.
    pub fn candidate(&self, config: &str, app: &str) -> String {
        let cfg = &self.config;

        // Seed bindings, each subject to its own override rules.
        let mut ctx = Context::new();
        let seeds = [
            ("config", config.to_string()),
            ("app", app.to_string()),
            ("size", cfg.data_size.clone()),
            ("prefix", cfg.common_prefix.clone()),
        ];
        for (name, seed) in &seeds {
            let value = self.fold_binding(name, config, app, seed.clone(), &ctx);
            ctx.bind(*name, value);
        }

        // Layer 2: derived default bindings, folded through their rules.
        for placeholder in DEFAULT_BINDINGS {
            let default = match *placeholder {
                "app_dir" => expand("{app}_{size}", &ctx),
                _ => ctx.get("config").unwrap_or(config).to_string(),
            };
            let value = self.fold_binding(placeholder, config, app, default, &ctx);
            ctx.bind(*placeholder, value);
        }

        // Rules naming any other template placeholder, first-mention order.
        let mut extra: Vec<&str> = Vec::new();
        for rule in &cfg.binding_rules {
            let p = rule.placeholder.as_str();
            if p == "app_file"
                || DEFAULT_BINDINGS.contains(&p)
                || seeds.iter().any(|(name, _)| *name == p)
                || extra.iter().any(|e| *e == p)
            {
                continue;
            }
            extra.push(p);
        }
        for placeholder in extra {
            let initial = ctx.get(placeholder).unwrap_or_default().to_string();
            let value = self.fold_binding(placeholder, config, app, initial, &ctx);
            ctx.bind(placeholder, value);
        }

        let app_file = expand(&cfg.app_filename_template, &ctx);
        let app_file = self.fold_binding("app_file", config, app, app_file, &ctx);
        ctx.bind("app_file", app_file);
        let config_path = expand(&cfg.config_path_template, &ctx);
        ctx.bind("config_path", &config_path);

        let prefix = cfg.common_prefix.trim_end_matches('/');
        let composed = format!("{prefix}/{config_path}");

        // Layer 3: broad (config-only) rules first, then pair rules.
        let (broad, narrow): (Vec<Rule>, Vec<Rule>) = cfg
            .path_rules
            .iter()
            .cloned()
            .partition(|r| r.matcher.is_config_only());
        let composed = fold_rules(&broad, config, app, composed, &ctx);
        fold_rules(&narrow, config, app, composed, &ctx)
    }

    /// Resolve the full path table for the given id lists.
    ///
    /// Candidates whose path is not a regular file are pruned with a warning;
    /// a config whose app map empties is dropped. Afterwards the table keys
    /// are checked against the id lists (stale-rule detection, warning only).
    pub fn resolve(&self, configs: &[String], apps: &[String]) -> Result<PathTable> {
        let mut table = PathTable::new();
        for config in configs {
            for app in apps {
                let candidate = self.candidate(config, app);
                table.insert(config, app, candidate.into());
            }
        }

        let missing: Vec<(String, String, String)> = table
            .iter()
            .filter(|(_, _, path)| !path.is_file())
            .map(|(c, a, p)| (c.to_string(), a.to_string(), p.display().to_string()))
            .collect();
        for (config, app, path) in missing {
            log::warn!("result file `{path}` does not exist; removing ({config}, {app}) from the path table");
            table.remove(&config, &app);
        }

        table.check_ids(configs, apps);
        Ok(table)
    }
}
