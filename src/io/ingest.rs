//! JSON ingest and input-boundary parsing.
//!
//! This module turns the files produced by the scrapers into typed records:
//! - raw poll rows (heterogeneous field-maps) into `RawPoll`s
//! - riding results, national vote shares, and the riding list
//!
//! Design goals:
//! - **Strict schema** for the one required poll field (date)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Separation of concerns**: no averaging or projection logic here

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::domain::{District, Party, PartyMap, PartyShares, ProvinceRidings, RawPoll, RawShare, RidingRecord};
use crate::error::{AppError, RegionError};

const LOG_TARGET: &str = "katelect::ingest";

/// One raw poll row as scraped: column header -> cell.
pub type FieldMap = Map<String, Value>;

const DATE_COLUMNS: [&str; 2] = ["Date (middle)", "date"];
const POLLSTER_COLUMNS: [&str; 3] = ["Polling Firm", "Firm", "pollster"];
const SAMPLE_COLUMNS: [&str; 2] = ["Sample", "sampleSize"];

/// A row-level problem encountered while parsing polls.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    /// 0-based position in the input array.
    pub index: usize,
    pub message: String,
}

/// Parsed polls for one region plus what was skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPolls {
    pub polls: Vec<RawPoll>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Read a JSON array of poll rows.
pub fn load_poll_rows(path: &Path) -> Result<Vec<FieldMap>, AppError> {
    read_json(path, "poll file")
}

/// Parse one region's poll rows.
///
/// Fails only when no row carries a date column at all; individual rows with
/// an unusable date are skipped and reported.
pub fn parse_polls(rows: &[FieldMap]) -> Result<ParsedPolls, RegionError> {
    let has_date_column = rows
        .iter()
        .any(|row| DATE_COLUMNS.iter().any(|c| row.contains_key(*c)));
    if !rows.is_empty() && !has_date_column {
        return Err(RegionError::MissingColumn("date"));
    }

    let mut polls = Vec::with_capacity(rows.len());
    let mut row_errors = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        match parse_poll_row(row) {
            Ok(poll) => polls.push(poll),
            Err(message) => {
                log::debug!(target: LOG_TARGET, "row {index}: {message}");
                row_errors.push(RowError { index, message });
            }
        }
    }

    Ok(ParsedPolls {
        polls,
        row_errors,
        rows_read: rows.len(),
    })
}

fn parse_poll_row(row: &FieldMap) -> Result<RawPoll, String> {
    let date_text = first_cell(row, &DATE_COLUMNS).ok_or_else(|| "Missing required value: `date`".to_string())?;
    let date = parse_date(date_text.trim())?;

    let pollster = first_cell(row, &POLLSTER_COLUMNS)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    let sample_size = parse_sample_size(first_cell(row, &SAMPLE_COLUMNS).as_deref());

    let shares = PartyMap::from_fn(|party| {
        if !party.is_tracked() {
            return RawShare::Missing;
        }
        let cell = first_cell(row, &[party.acronym(), party.key()]);
        let share = RawShare::parse(cell.as_deref());
        if share == RawShare::Invalid {
            log::debug!(
                target: LOG_TARGET,
                "non-numeric {} value {:?} on {date}, counting as 0",
                party.acronym(),
                cell
            );
        }
        share
    });

    Ok(RawPoll {
        date,
        pollster,
        sample_size,
        shares,
    })
}

/// Text of the first present column among `names`. JSON `null` counts as absent.
fn first_cell(row: &FieldMap, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| match row.get(*name)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    })
}

/// Parse a sample size, stripping thousands separators. Unparseable -> 0.
pub fn parse_sample_size(cell: Option<&str>) -> u64 {
    let Some(cell) = cell else {
        return 0;
    };
    let cleaned: String = cell.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
    if let Ok(n) = cleaned.parse::<u64>() {
        return n;
    }
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v.trunc() as u64,
        _ => 0,
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // Poll tables use ISO dates; a few older exports use day-first forms.
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, YYYY/MM/DD, DD/MM/YYYY, DD-MM-YYYY."
    ))
}

/// Load riding results: province -> ridings, keeping file order.
///
/// An empty year entry (`"2021": {}`) is kept: the year counts as recorded
/// with every party at 0.
pub fn load_results(path: &Path) -> Result<Vec<ProvinceRidings>, AppError> {
    let provinces: Map<String, Value> = read_json(path, "results file")?;
    provinces
        .into_iter()
        .map(|(province, ridings)| {
            let ridings: Vec<RidingRecord> = serde_json::from_value(ridings).map_err(|e| {
                AppError::new(2, format!("Invalid ridings for province '{province}': {e}"))
            })?;
            Ok(ProvinceRidings { province, ridings })
        })
        .collect()
}

/// Load national vote shares by year, keyed by acronym in the file.
pub fn load_national_votes(path: &Path) -> Result<BTreeMap<u16, PartyShares>, AppError> {
    let raw: BTreeMap<u16, BTreeMap<String, f64>> = read_json(path, "national vote file")?;
    Ok(raw
        .into_iter()
        .map(|(year, parties)| {
            let mut shares = PartyShares::default();
            for (acronym, value) in parties {
                match Party::from_acronym(&acronym) {
                    Some(party) => *shares.get_mut(party) = value,
                    None => log::debug!(target: LOG_TARGET, "ignoring national share for `{acronym}` in {year}"),
                }
            }
            (year, shares)
        })
        .collect())
}

/// Load the riding list in file order (provinces in order, ridings in order).
pub fn load_districts(path: &Path) -> Result<Vec<District>, AppError> {
    let provinces: Map<String, Value> = read_json(path, "districts file")?;
    let mut out = Vec::new();
    for (province, districts) in provinces {
        let districts: Vec<District> = serde_json::from_value(districts).map_err(|e| {
            AppError::new(2, format!("Invalid districts for province '{province}': {e}"))
        })?;
        out.extend(districts);
    }
    Ok(out)
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open {what} '{}': {e}", path.display())))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::new(2, format!("Invalid JSON in {what} '{}': {e}", path.display())))
}
