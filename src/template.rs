//! `{name}` placeholder substitution.
//!
//! Path and option templates use brace-delimited named placeholders, e.g.
//! `"{config_dir}/m5out/{app_file}_{config_suffix}.stat"`. Expansion is plain
//! textual replacement against an ordered substitution context; placeholders
//! with no binding in the context are left untouched so that multi-layer
//! expansion (config layer first, app layer later) composes naturally.
//!
//! The one fatal condition in this crate's path machinery lives here: an
//! override rule that targets a placeholder the template does not contain is
//! a configuration bug and is surfaced immediately via
//! [`SweepError::MissingPlaceholder`] instead of being silently ignored.

use crate::error::{Result, SweepError};

/// Ordered substitution context: `(placeholder name, value)` pairs.
///
/// Later entries shadow earlier ones with the same name, matching the
/// last-match-wins discipline of the override cascades that populate it.
#[derive(Debug, Clone, Default)]
pub struct Context {
    bindings: Vec<(String, String)>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `value`, shadowing any earlier binding of `name`.
    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.bindings.push((name.into(), value.into()));
    }

    /// Look up the current (latest) binding of `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.bindings
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Return the brace-delimited token for a placeholder name.
fn token(name: &str) -> String {
    format!("{{{name}}}")
}

/// Check whether `template` contains the placeholder `name`.
pub fn has_placeholder(template: &str, name: &str) -> bool {
    template.contains(&token(name))
}

/// Fail fast if `template` lacks the placeholder `name`.
pub fn ensure_placeholder(template: &str, name: &str) -> Result<()> {
    if has_placeholder(template, name) {
        Ok(())
    } else {
        Err(SweepError::MissingPlaceholder {
            template: template.to_string(),
            placeholder: name.to_string(),
        })
    }
}

/// Expand every bound placeholder in `template`.
///
/// Each binding is applied once, latest binding per name. Unbound
/// placeholders survive verbatim for a later expansion layer.
pub fn expand(template: &str, ctx: &Context) -> String {
    let mut out = template.to_string();
    let mut seen: Vec<&str> = Vec::new();
    for (name, _) in ctx.bindings.iter().rev() {
        if seen.iter().any(|s| s == name) {
            continue;
        }
        seen.push(name);
        // rev() iteration means the first occurrence seen is the latest binding
        if let Some(value) = ctx.get(name) {
            out = out.replace(&token(name), value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_basic() {
        let mut ctx = Context::new();
        ctx.bind("config_dir", "Baseline_256KBL2");
        ctx.bind("config_suffix", "Baseline_256KBL2");
        let out = expand("{config_dir}/m5out/{app_file}_{config_suffix}.stat", &ctx);
        assert_eq!(out, "Baseline_256KBL2/m5out/{app_file}_Baseline_256KBL2.stat");
    }

    #[test]
    fn test_expand_latest_binding_wins() {
        let mut ctx = Context::new();
        ctx.bind("app_dir", "sgemm_512");
        ctx.bind("app_dir", "sgemm");
        assert_eq!(expand("{app_dir}/out", &ctx), "sgemm/out");
    }

    #[test]
    fn test_unbound_placeholder_survives() {
        let ctx = Context::new();
        assert_eq!(expand("{app_file}.stat", &ctx), "{app_file}.stat");
    }

    #[test]
    fn test_ensure_placeholder() {
        assert!(ensure_placeholder("{app}/run", "app").is_ok());
        let err = ensure_placeholder("{app}/run", "size").unwrap_err();
        assert!(matches!(
            err,
            SweepError::MissingPlaceholder { .. }
        ));
    }

    #[test]
    fn test_context_get() {
        let mut ctx = Context::new();
        ctx.bind("size", "512");
        ctx.bind("size", "1024");
        assert_eq!(ctx.get("size"), Some("1024"));
        assert_eq!(ctx.get("type"), None);
    }
}
