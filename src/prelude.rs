//! Convenience re-exports for pipeline users.

pub use crate::config::{SweepConfig, SweepMetadata};
pub use crate::error::{Result, SweepError};
pub use crate::extract::StatSpec;
pub use crate::formula::{FormulaInput, FormulaSpec};
pub use crate::normalize::NormalizeSpec;
pub use crate::options::{OptionCategory, OptionComposer, OptionTable, OptionsConfig};
pub use crate::overrides::{Action, Matcher, Rule};
pub use crate::pipeline::{Pipeline, SweepReport};
pub use crate::resolve::{BindingRule, PathConfig, PathResolver};
pub use crate::table::{PathTable, StatTable, StatValue};
