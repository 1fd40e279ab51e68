//! Statistic extraction from result files.
//!
//! Result files are gem5-style flat stat dumps: one statistic per line, key
//! token first, value second, whitespace separated. Extraction is generic
//! over that shape: a line *containing* the search token as a substring
//! yields the line's second whitespace-delimited field as the raw value.
//!
//! The output table always covers the full `stats × configs × apps` cross
//! product of the *input id lists*, not just the resolved paths, so the
//! downstream formula stage can rely on a rectangular table. Cells for
//! missing files or absent tokens stay [`StatValue::NoData`]; values are
//! recorded as raw text and parsed later.

use std::fs::File;
use std::io::{BufRead, BufReader};

use serde::{Deserialize, Serialize};

use crate::table::{PathTable, StatTable, StatValue};

/// One statistic to extract: output name plus the token to search for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatSpec {
    /// Name the statistic gets in the output table.
    pub name: String,
    /// Substring identifying the statistic's line in a result file.
    pub token: String,
}

impl StatSpec {
    pub fn new(name: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            token: token.into(),
        }
    }
}

/// Extract all statistics for the sweep.
///
/// The first line containing a token wins; later occurrences in the same
/// file are ignored. A file that cannot be opened or read leaves every one
/// of its cells `NoData`: the path table said it existed, so this is logged
/// as a warning, but it never aborts the batch.
pub fn extract(
    paths: &PathTable,
    configs: &[String],
    apps: &[String],
    stats: &[StatSpec],
) -> StatTable {
    let mut table = StatTable::new(configs, apps);
    for spec in stats {
        table.add_stat(&spec.name);
    }

    for (config, app, path) in paths.iter() {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) => {
                log::warn!(
                    "failed to open result file `{}` for ({config}, {app}): {err}",
                    path.display()
                );
                continue;
            }
        };

        // Indices of specs still unmatched for this file.
        let mut pending: Vec<usize> = (0..stats.len()).collect();
        let mut found: Vec<(usize, String)> = Vec::new();

        for line in BufReader::new(file).lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    log::warn!(
                        "read error in `{}` for ({config}, {app}): {err}",
                        path.display()
                    );
                    break;
                }
            };
            pending.retain(|&idx| {
                if !line.contains(&stats[idx].token) {
                    return true;
                }
                match line.split_whitespace().nth(1) {
                    Some(value) => {
                        found.push((idx, value.to_string()));
                        false
                    }
                    // token matched but the line carries no value field
                    None => true,
                }
            });
            if pending.is_empty() {
                break;
            }
        }

        for (idx, value) in found {
            table.set(&stats[idx].name, config, app, StatValue::Raw(value));
        }
    }

    table
}
