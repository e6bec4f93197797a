//! On-disk layout of the data directory.
//!
//! ```text
//! <root>/polls/polls_<region>.json         raw polls (input)
//! <root>/averages/<region>_averages.json   smoothed series (output)
//! <root>/latest/<region>_latest.json       latest snapshot (output)
//! <root>/results/federal_results.json      riding results by year (input)
//! <root>/results/federal_vote.json         national shares by year (input)
//! <root>/districts/federal_districts.json  riding list (input)
//! <root>/projections/federal_projection.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn polls_dir(&self) -> PathBuf {
        self.root.join("polls")
    }

    pub fn poll_file(&self, region: &str) -> PathBuf {
        self.polls_dir().join(format!("polls_{region}.json"))
    }

    pub fn averages_file(&self, region: &str) -> PathBuf {
        self.root.join("averages").join(format!("{region}_averages.json"))
    }

    pub fn latest_file(&self, region: &str) -> PathBuf {
        self.root.join("latest").join(format!("{region}_latest.json"))
    }

    pub fn results_file(&self) -> PathBuf {
        self.root.join("results").join("federal_results.json")
    }

    pub fn national_votes_file(&self) -> PathBuf {
        self.root.join("results").join("federal_vote.json")
    }

    pub fn districts_file(&self) -> PathBuf {
        self.root.join("districts").join("federal_districts.json")
    }

    pub fn projection_file(&self) -> PathBuf {
        self.root.join("projections").join("federal_projection.json")
    }

    /// Region codes with a `polls_<code>.json` file, sorted.
    pub fn discover_regions(&self) -> Result<Vec<String>, AppError> {
        let dir = self.polls_dir();
        let entries = fs::read_dir(&dir).map_err(|e| {
            AppError::new(2, format!("Failed to read polls directory '{}': {e}", dir.display()))
        })?;

        let mut regions = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| AppError::new(2, format!("Failed to list '{}': {e}", dir.display())))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if let Some(code) = name
                .strip_prefix("polls_")
                .and_then(|rest| rest.strip_suffix(".json"))
                .filter(|code| !code.is_empty())
            {
                regions.push(code.to_string());
            }
        }
        regions.sort();
        Ok(regions)
    }
}

/// Create the parent directory of `path` if needed.
pub fn ensure_parent(path: &Path) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::new(4, format!("Failed to create directory '{}': {e}", parent.display()))
        })?;
    }
    Ok(())
}
