//! Read-only lookups over published artifacts.
//!
//! Regions are addressed by display name (`quebec`, `ontario`, ...) and ridings
//! by code. Unknown keys are `LookupError`s.

use std::collections::BTreeMap;

use crate::domain::{LatestSnapshot, RidingProjection, SmoothedPoint, region_code, region_name};
use crate::error::{AppError, LookupError};
use crate::io::{DataPaths, ProjectionFile, read_averages_json, read_latest_json, read_projection_json};

const LOG_TARGET: &str = "katelect::store";

#[derive(Debug, Clone, Default)]
pub struct ArtifactStore {
    /// Keyed by region code.
    averages: BTreeMap<String, Vec<SmoothedPoint>>,
    latest: BTreeMap<String, LatestSnapshot>,
    ridings: BTreeMap<String, RidingProjection>,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_region(&mut self, code: &str, series: Vec<SmoothedPoint>, latest: Option<LatestSnapshot>) {
        self.averages.insert(code.to_string(), series);
        if let Some(latest) = latest {
            self.latest.insert(code.to_string(), latest);
        }
    }

    pub fn insert_projections(&mut self, projections: impl IntoIterator<Item = RidingProjection>) {
        for p in projections {
            self.ridings.insert(p.code.clone(), p);
        }
    }

    /// Load whatever has been published under the data directory.
    ///
    /// Missing files are skipped; unreadable ones are errors.
    pub fn load(paths: &DataPaths) -> Result<Self, AppError> {
        let mut store = Self::new();

        for (code, _) in crate::domain::REGIONS {
            let averages = paths.averages_file(code);
            if !averages.exists() {
                continue;
            }
            let series = read_averages_json(&averages)?;
            let latest_path = paths.latest_file(code);
            let latest = if latest_path.exists() {
                Some(read_latest_json(&latest_path)?)
            } else {
                None
            };
            store.insert_region(code, series, latest);
        }

        let projection = paths.projection_file();
        if projection.exists() {
            let ProjectionFile { ridings, .. } = read_projection_json(&projection)?;
            store.insert_projections(ridings);
        }

        log::debug!(
            target: LOG_TARGET,
            "loaded {} region(s), {} riding projection(s)",
            store.averages.len(),
            store.ridings.len()
        );
        Ok(store)
    }

    /// Display names of regions with data, in code order.
    pub fn regions(&self) -> Vec<&'static str> {
        self.averages.keys().filter_map(|code| region_name(code)).collect()
    }

    pub fn averages(&self, name: &str) -> Result<&[SmoothedPoint], LookupError> {
        let code = lookup_code(name)?;
        self.averages
            .get(code)
            .map(Vec::as_slice)
            .ok_or_else(|| LookupError::NoData(name.to_string()))
    }

    pub fn latest(&self, name: &str) -> Result<&LatestSnapshot, LookupError> {
        let code = lookup_code(name)?;
        self.latest.get(code).ok_or_else(|| LookupError::NoData(name.to_string()))
    }

    pub fn riding(&self, code: &str) -> Result<&RidingProjection, LookupError> {
        self.ridings
            .get(code.trim())
            .ok_or_else(|| LookupError::UnknownRiding(code.to_string()))
    }
}

fn lookup_code(name: &str) -> Result<&'static str, LookupError> {
    region_code(&name.trim().to_ascii_lowercase()).ok_or_else(|| LookupError::UnknownRegion(name.to_string()))
}
