//! Derived-statistic computation.
//!
//! A formula is a string template over statistic names, e.g.
//! `"(L2 row accesses) + (L2 column accesses)"`, together with a default
//! value per referenced statistic. Per cell, each `(name)` reference is
//! replaced with the referenced cell's parsed value (or its default when
//! the cell is `NoData` or unparseable) and the resulting expression is
//! evaluated by a small arithmetic evaluator supporting only
//! `+ - * / ( )` and numeric literals. Nothing else is interpretable, so
//! user-supplied formulas cannot execute anything.
//!
//! Failures are cell-local: a bad expression, a division by zero or a
//! non-finite result turn that single cell into `NoData`, counted in
//! [`FormulaOutcome::cell_failures`] and logged at debug level (high volume
//! during exploratory analysis, so not warned about by default).
//!
//! All references resolve against the *input* table snapshot. A formula
//! therefore cannot see another formula of the same pass; chaining requires
//! a second pass over the first pass's output, and a spec that tries to
//! chain within one pass is rejected at validation time.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SweepError};
use crate::table::{StatTable, StatValue};

// ============================================================================
// Specs
// ============================================================================

/// One referenced statistic and its fallback value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormulaInput {
    /// Referenced statistic name, appearing as `(name)` in the expression.
    pub stat: String,
    /// Substituted verbatim when the referenced cell has no usable value.
    pub default: String,
}

impl FormulaInput {
    pub fn new(stat: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            stat: stat.into(),
            default: default.into(),
        }
    }
}

/// A named derived statistic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormulaSpec {
    /// Output statistic name.
    pub name: String,
    /// Arithmetic template with `(name)` references.
    pub expr: String,
    /// Referenced statistics with their defaults.
    pub inputs: Vec<FormulaInput>,
}

// ============================================================================
// Pass
// ============================================================================

/// Result of one formula pass.
#[derive(Debug, Clone)]
pub struct FormulaOutcome {
    pub table: StatTable,
    /// Cells that fell back to `NoData` because evaluation failed.
    pub cell_failures: usize,
}

/// One evaluation pass over a statistic table.
#[derive(Debug, Clone, Default)]
pub struct FormulaPass {
    specs: Vec<FormulaSpec>,
}

impl FormulaPass {
    pub fn new(specs: Vec<FormulaSpec>) -> Self {
        Self { specs }
    }

    pub fn specs(&self) -> &[FormulaSpec] {
        &self.specs
    }

    /// Reject self-references and same-pass chaining.
    pub fn validate(&self) -> Result<()> {
        for spec in &self.specs {
            for input in &spec.inputs {
                if self.specs.iter().any(|other| other.name == input.stat) {
                    return Err(SweepError::FormulaChain {
                        name: spec.name.clone(),
                        referenced: input.stat.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Compute the pass output over `output_order`.
    ///
    /// Names without a spec are copied verbatim from `input` (pass-through,
    /// `NoData` preserved); names found in neither place become a `NoData`
    /// column with a warning, keeping the output shape rectangular.
    pub fn apply(
        &self,
        input: &StatTable,
        configs: &[String],
        apps: &[String],
        output_order: &[String],
    ) -> FormulaOutcome {
        let mut table = StatTable::new(configs, apps);
        let mut cell_failures = 0usize;

        for stat in output_order {
            match self.specs.iter().find(|spec| &spec.name == stat) {
                None => {
                    if !input.has_stat(stat) {
                        log::warn!("output statistic `{stat}` has neither a formula nor input data");
                    }
                    table.copy_stat_from(input, stat);
                }
                Some(spec) => {
                    table.add_stat(stat);
                    for config in configs {
                        for app in apps {
                            let expr = substitute(spec, input, config, app);
                            match eval_arith(&expr) {
                                Some(value) => {
                                    table.set(stat, config, app, StatValue::Num(value));
                                }
                                None => {
                                    log::debug!(
                                        "formula `{}` failed for ({config}, {app}): `{expr}`",
                                        spec.name
                                    );
                                    cell_failures += 1;
                                }
                            }
                        }
                    }
                }
            }
        }

        FormulaOutcome {
            table,
            cell_failures,
        }
    }
}

/// Replace every `(name)` reference with the cell's value or its default.
fn substitute(spec: &FormulaSpec, input: &StatTable, config: &str, app: &str) -> String {
    let mut expr = spec.expr.clone();
    for reference in &spec.inputs {
        let needle = format!("({})", reference.stat);
        let replacement = match input.parse(&reference.stat, config, app) {
            Some(value) => value.to_string(),
            None => reference.default.clone(),
        };
        expr = expr.replace(&needle, &replacement);
    }
    expr
}

// ============================================================================
// Arithmetic evaluator
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

fn lex(expr: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let bytes = expr.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        match c {
            ' ' | '\t' => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < bytes.len() && matches!(bytes[i] as char, '0'..='9' | '.') {
                    i += 1;
                }
                // optional exponent: e or E, optional sign, digits
                if i < bytes.len() && matches!(bytes[i] as char, 'e' | 'E') {
                    let mut j = i + 1;
                    if j < bytes.len() && matches!(bytes[j] as char, '+' | '-') {
                        j += 1;
                    }
                    if j < bytes.len() && (bytes[j] as char).is_ascii_digit() {
                        i = j;
                        while i < bytes.len() && (bytes[i] as char).is_ascii_digit() {
                            i += 1;
                        }
                    }
                }
                let value: f64 = expr[start..i].parse().ok()?;
                tokens.push(Token::Num(value));
            }
            _ => return None,
        }
    }
    Some(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    fn expr(&mut self) -> Option<f64> {
        let mut acc = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            acc = match op {
                Token::Plus => acc + rhs,
                _ => acc - rhs,
            };
        }
        Some(acc)
    }

    fn term(&mut self) -> Option<f64> {
        let mut acc = self.factor()?;
        while let Some(op @ (Token::Star | Token::Slash)) = self.peek() {
            self.pos += 1;
            let rhs = self.factor()?;
            acc = match op {
                Token::Star => acc * rhs,
                _ => {
                    if rhs == 0.0 {
                        return None;
                    }
                    acc / rhs
                }
            };
        }
        Some(acc)
    }

    fn factor(&mut self) -> Option<f64> {
        match self.next()? {
            Token::Num(value) => Some(value),
            Token::Minus => Some(-self.factor()?),
            Token::LParen => {
                let value = self.expr()?;
                match self.next()? {
                    Token::RParen => Some(value),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

/// Evaluate a pure arithmetic expression.
///
/// Returns `None` on any lex/parse error, division by zero, trailing input,
/// or non-finite result.
pub fn eval_arith(expr: &str) -> Option<f64> {
    let tokens = lex(expr)?;
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expr()?;
    if parser.pos != parser.tokens.len() {
        return None;
    }
    value.is_finite().then_some(value)
}
