//! Override rule cascades.
//!
//! The experiment tree accumulated years of renames and one-off exceptions:
//! one logical configuration living in a differently-named folder, a handful
//! of apps without a data-size segment, whole result sets moved under a dated
//! directory. Each exception is an [`Rule`]: a membership predicate over the
//! `(config, app)` pair plus an action. Rules are kept in declaration order
//! and applied by a single fold, so "later rules win" is a property of the
//! fold rather than an accident of statement ordering.

use serde::{Deserialize, Serialize};

use crate::template::{expand, Context};

/// Membership predicate over a `(config, app)` pair.
///
/// `None` matches anything on that axis. `exclude_apps` exists because the
/// historical layouts carry "every app except the training inputs" rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Matcher {
    /// Configs this rule applies to (`None` = all).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configs: Option<Vec<String>>,

    /// Apps this rule applies to (`None` = all).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apps: Option<Vec<String>>,

    /// Apps this rule explicitly does not apply to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_apps: Option<Vec<String>>,
}

impl Matcher {
    /// Match any config and any app.
    pub fn any() -> Self {
        Self::default()
    }

    /// Match a set of configs, any app.
    pub fn configs<I, S>(configs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            configs: Some(configs.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Restrict to a set of apps.
    pub fn and_apps<I, S>(mut self, apps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.apps = Some(apps.into_iter().map(Into::into).collect());
        self
    }

    /// Exclude a set of apps.
    pub fn except_apps<I, S>(mut self, apps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_apps = Some(apps.into_iter().map(Into::into).collect());
        self
    }

    /// Does this rule apply to `(config, app)`?
    pub fn matches(&self, config: &str, app: &str) -> bool {
        if let Some(configs) = &self.configs {
            if !configs.iter().any(|c| c == config) {
                return false;
            }
        }
        if let Some(apps) = &self.apps {
            if !apps.iter().any(|a| a == app) {
                return false;
            }
        }
        if let Some(excluded) = &self.exclude_apps {
            if excluded.iter().any(|a| a == app) {
                return false;
            }
        }
        true
    }

    /// True when the rule constrains configs only.
    ///
    /// Broad rules fold before narrow `(config, app)` rules during path
    /// resolution; any app-side constraint makes a rule narrow.
    pub fn is_config_only(&self) -> bool {
        self.apps.is_none() && self.exclude_apps.is_none()
    }
}

/// Transformation applied when a rule matches.
///
/// Action values are templates themselves: they are expanded against the
/// current substitution context before use, so a rule can say
/// `set = "{app}"` to drop the data-size segment from a filename.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Replace the accumulated value.
    Set(String),
    /// Append to the accumulated value.
    Append(String),
}

/// An override rule: predicate + action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub matcher: Matcher,
    pub action: Action,
}

impl Rule {
    pub fn new(matcher: Matcher, action: Action) -> Self {
        Self { matcher, action }
    }

    pub fn set(matcher: Matcher, value: impl Into<String>) -> Self {
        Self::new(matcher, Action::Set(value.into()))
    }

    pub fn append(matcher: Matcher, value: impl Into<String>) -> Self {
        Self::new(matcher, Action::Append(value.into()))
    }
}

/// Fold `rules` over `initial` for the pair `(config, app)`.
///
/// Rules apply in declaration order; `Set` replaces the accumulator, `Append`
/// extends it. A later matching `Set` therefore overrides every earlier
/// matching rule unconditionally (last-match-wins).
pub fn fold_rules(rules: &[Rule], config: &str, app: &str, initial: String, ctx: &Context) -> String {
    rules
        .iter()
        .filter(|rule| rule.matcher.matches(config, app))
        .fold(initial, |acc, rule| match &rule.action {
            Action::Set(value) => expand(value, ctx),
            Action::Append(value) => acc + &expand(value, ctx),
        })
}
