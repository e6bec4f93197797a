//! Write published artifacts.
//!
//! JSON files mirror the layouts the read-only front end already consumes.
//! The CSV export of riding projections is meant to be easy to consume in
//! spreadsheets or downstream scripts.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::domain::{LatestSnapshot, Party, RidingProjection, SmoothedPoint};
use crate::error::AppError;
use crate::io::paths::ensure_parent;
use crate::io::series::{AverageRow, LatestFile, ProjectionFile};

pub fn write_averages_json(path: &Path, series: &[SmoothedPoint]) -> Result<(), AppError> {
    let rows: Vec<AverageRow> = series.iter().map(AverageRow::from).collect();
    write_json(path, &rows, "averages")
}

pub fn write_latest_json(path: &Path, snapshot: &LatestSnapshot) -> Result<(), AppError> {
    write_json(path, &LatestFile::from(snapshot), "latest snapshot")
}

pub fn write_projection_json(path: &Path, projection: &ProjectionFile) -> Result<(), AppError> {
    write_json(path, projection, "projection")
}

/// Write per-riding projections to a CSV file.
pub fn write_projections_csv<'a>(
    path: &Path,
    projections: impl IntoIterator<Item = &'a RidingProjection>,
) -> Result<(), AppError> {
    ensure_parent(path)?;
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);

    let party_cols: Vec<&str> = Party::ALL.iter().map(|p| p.key()).collect();
    writeln!(out, "code,name,baseline_year,status,winner,{}", party_cols.join(","))
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV header: {e}")))?;

    for p in projections {
        let shares = p.outcome.shares();
        let values: Vec<String> = shares.iter().map(|(_, v)| format!("{v:.4}")).collect();
        writeln!(
            out,
            "{},{},{},{},{},{}",
            p.code,
            csv_field(&p.name),
            p.baseline_year,
            if p.outcome.is_degenerate() { "degenerate" } else { "ok" },
            p.winner.map(|w| w.key()).unwrap_or(""),
            values.join(","),
        )
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV row: {e}")))?;
    }

    out.flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Quote a field if it contains a delimiter or quote. Riding names often carry
/// commas and em-dashes.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T, what: &str) -> Result<(), AppError> {
    ensure_parent(path)?;
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create {what} JSON '{}': {e}", path.display())))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| AppError::new(4, format!("Failed to write {what} JSON: {e}")))?;
    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush {what} JSON: {e}")))?;
    Ok(())
}
