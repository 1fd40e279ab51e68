//! Run-directory layout.
//!
//! A sweep run expects, per configuration, an `appout/`, `m5out/` and `run/`
//! directory plus per-app subdirectories under the latter two. This module
//! only *computes* that list in a deterministic order; creating the
//! directories is the scaffolding consumer's job.

use std::path::{Path, PathBuf};

/// Per-config subdirectory names, in creation order.
const CONFIG_SUBDIRS: &[&str] = &["appout", "m5out", "run"];

/// Per-app parents under each config directory.
const APP_PARENTS: &[&str] = &["m5out", "run"];

/// Computes the directory list for a sweep rooted at `root`.
#[derive(Debug, Clone)]
pub struct RunLayout {
    root: PathBuf,
}

impl RunLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All directories the run needs, outermost first per config.
    pub fn folders(&self, configs: &[String], apps: &[String]) -> Vec<PathBuf> {
        let mut folders = Vec::new();
        for config in configs {
            let config_dir = self.root.join(config);
            folders.push(config_dir.clone());
            for subdir in CONFIG_SUBDIRS {
                folders.push(config_dir.join(subdir));
            }
            for parent in APP_PARENTS {
                for app in apps {
                    folders.push(config_dir.join(parent).join(app));
                }
            }
        }
        folders
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_list() {
        let layout = RunLayout::new("/runs");
        let configs = vec!["Predict".to_string()];
        let apps = vec!["sgemm".to_string(), "sobel".to_string()];
        let folders = layout.folders(&configs, &apps);
        let expected: Vec<PathBuf> = [
            "/runs/Predict",
            "/runs/Predict/appout",
            "/runs/Predict/m5out",
            "/runs/Predict/run",
            "/runs/Predict/m5out/sgemm",
            "/runs/Predict/m5out/sobel",
            "/runs/Predict/run/sgemm",
            "/runs/Predict/run/sobel",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();
        assert_eq!(folders, expected);
    }

    #[test]
    fn test_parent_precedes_children() {
        let layout = RunLayout::new("/r");
        let configs = vec!["A".to_string(), "B".to_string()];
        let apps = vec!["x".to_string()];
        let folders = layout.folders(&configs, &apps);
        for folder in &folders {
            if let Some(parent) = folder.parent() {
                if parent != Path::new("/r") {
                    assert!(folders.iter().position(|f| f == parent).unwrap()
                        < folders.iter().position(|f| f == folder).unwrap());
                }
            }
        }
    }
}
