//! Published file schemas and their readers.
//!
//! - averages: an array of `{date, liberal, ..., other}` rows
//! - latest: `{date, latestValues, changes}` with `null` changes for a
//!   single-point series
//! - projection: per-riding projections plus the seat tally

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{
    LatestSnapshot, NationalBaselinePolicy, PartyMap, PartyShares, RidingProjection, SeatTally, ShareOutcome,
    SmoothedPoint,
};
use crate::error::AppError;
use crate::io::ingest::read_json;

/// One row of an averages file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageRow {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub shares: PartyShares,
}

impl From<&SmoothedPoint> for AverageRow {
    fn from(point: &SmoothedPoint) -> Self {
        Self {
            date: point.date,
            shares: point.shares(),
        }
    }
}

impl AverageRow {
    /// An all-zero row was written for a degenerate date.
    pub fn to_point(&self) -> SmoothedPoint {
        SmoothedPoint {
            date: self.date,
            outcome: if self.shares.total() == 0.0 {
                ShareOutcome::Degenerate
            } else {
                ShareOutcome::Normalized(self.shares)
            },
        }
    }
}

/// Contents of a latest-snapshot file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestFile {
    pub date: NaiveDate,
    pub latest_values: PartyShares,
    pub changes: PartyMap<Option<f64>>,
}

impl From<&LatestSnapshot> for LatestFile {
    fn from(snapshot: &LatestSnapshot) -> Self {
        Self {
            date: snapshot.date,
            latest_values: snapshot.latest_values,
            changes: snapshot.changes_by_party(),
        }
    }
}

impl LatestFile {
    pub fn to_snapshot(&self) -> LatestSnapshot {
        let complete = self.changes.iter().all(|(_, c)| c.is_some());
        LatestSnapshot {
            date: self.date,
            latest_values: self.latest_values,
            changes: complete.then(|| self.changes.map(|_, c| c.unwrap_or_default())),
        }
    }
}

/// Contents of a projection file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionFile {
    pub tool: String,
    pub poll_date: NaiveDate,
    pub national_polling: PartyShares,
    pub baseline_policy: NationalBaselinePolicy,
    pub ridings: Vec<RidingProjection>,
    /// Riding codes that could not be projected.
    pub excluded: Vec<String>,
    pub tally: SeatTally,
}

pub fn read_averages_json(path: &Path) -> Result<Vec<SmoothedPoint>, AppError> {
    let rows: Vec<AverageRow> = read_json(path, "averages file")?;
    Ok(rows.iter().map(AverageRow::to_point).collect())
}

pub fn read_latest_json(path: &Path) -> Result<LatestSnapshot, AppError> {
    let file: LatestFile = read_json(path, "latest file")?;
    Ok(file.to_snapshot())
}

pub fn read_projection_json(path: &Path) -> Result<ProjectionFile, AppError> {
    read_json(path, "projection file")
}
