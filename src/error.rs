//! Crate error type.
//!
//! Only structural problems are surfaced as errors: malformed templates,
//! formula chaining, unusable configuration files. Everything that can go
//! wrong per experiment cell (missing files, absent statistics, failed
//! formula evaluation) is recovered in place and never reaches this type.

use thiserror::Error;

/// Errors that abort a sweep.
#[derive(Debug, Error)]
pub enum SweepError {
    /// An override rule targets a placeholder the template does not contain.
    #[error("template `{template}` has no placeholder `{{{placeholder}}}`")]
    MissingPlaceholder {
        template: String,
        placeholder: String,
    },

    /// A formula references the output of another formula in the same pass.
    #[error("formula `{name}` references `{referenced}`, which is computed in the same pass; re-invoke the engine with the prior pass's output instead")]
    FormulaChain { name: String, referenced: String },

    /// Configuration failed validation.
    #[error("invalid sweep configuration: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("toml serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Generic(String),
}

impl SweepError {
    /// Create a generic error from any message.
    pub fn generic(msg: impl Into<String>) -> Self {
        SweepError::Generic(msg.into())
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, SweepError>;
