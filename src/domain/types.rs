//! Shared domain types.
//!
//! All records here are immutable values produced by a single batch pass. They
//! are kept lightweight and serializable so they can be:
//!
//! - passed between the aggregation and projection stages in memory
//! - exported to JSON/CSV
//! - reloaded later for plotting or lookups

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::party::{Party, PartyMap, PartyShares};

/// Known polling regions as `(file code, display name)`.
///
/// Files on disk are keyed by code (`polls_qc.json`); readers look regions up by
/// display name (`quebec`).
pub const REGIONS: [(&str, &str); 7] = [
    ("federal", "federal"),
    ("ab", "alberta"),
    ("atl", "atlantic"),
    ("bc", "bc"),
    ("on", "ontario"),
    ("pr", "prairies"),
    ("qc", "quebec"),
];

pub fn region_name(code: &str) -> Option<&'static str> {
    REGIONS.iter().find(|(c, _)| *c == code).map(|(_, n)| *n)
}

pub fn region_code(name: &str) -> Option<&'static str> {
    REGIONS.iter().find(|(_, n)| *n == name).map(|(c, _)| *c)
}

/// One party field of a raw poll row, as found at the input boundary.
///
/// The distinction between `Missing` and `Blank` matters: a missing column
/// defaults to 0, a blank cell disqualifies the whole row.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RawShare {
    /// The key is absent from the row.
    #[default]
    Missing,
    /// The key is present but empty or whitespace.
    Blank,
    /// The key is present with non-numeric text.
    Invalid,
    Value(f64),
}

impl RawShare {
    /// Classify a raw cell.
    pub fn parse(cell: Option<&str>) -> Self {
        let Some(cell) = cell else {
            return RawShare::Missing;
        };
        let cell = cell.trim();
        if cell.is_empty() {
            return RawShare::Blank;
        }
        match cell.parse::<f64>() {
            Ok(v) if v.is_finite() => RawShare::Value(v),
            _ => RawShare::Invalid,
        }
    }

    pub fn is_blank(self) -> bool {
        matches!(self, RawShare::Blank)
    }

    /// Value used in averaging. Missing and non-numeric cells count as 0.
    pub fn or_zero(self) -> f64 {
        match self {
            RawShare::Value(v) => v,
            RawShare::Missing | RawShare::Blank | RawShare::Invalid => 0.0,
        }
    }
}

/// A single poll observation for one region.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPoll {
    pub date: NaiveDate,
    pub pollster: String,
    /// 0 when unknown.
    pub sample_size: u64,
    /// Raw fields for the tracked parties. `other` is ignored: it is always
    /// derived after grouping.
    pub shares: PartyMap<RawShare>,
}

/// Weighted average of all observations sharing one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    #[serde(rename = "sampleSize")]
    pub sample_size: u64,
    pub pollster: String,
    /// Six tracked parties plus `other = max(0, 100 - Σ tracked)`.
    #[serde(flatten)]
    pub shares: PartyShares,
}

impl From<&DailyAggregate> for RawPoll {
    fn from(agg: &DailyAggregate) -> Self {
        RawPoll {
            date: agg.date,
            pollster: agg.pollster.clone(),
            sample_size: agg.sample_size,
            shares: agg.shares.map(|party, v| {
                if party.is_tracked() {
                    RawShare::Value(*v)
                } else {
                    RawShare::Missing
                }
            }),
        }
    }
}

/// Result of a renormalization: either shares summing to 100 or an explicit
/// degenerate marker for an all-zero input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "shares", rename_all = "lowercase")]
pub enum ShareOutcome {
    Normalized(PartyShares),
    Degenerate,
}

impl ShareOutcome {
    /// Renormalize `raw` to sum to 100, or mark it degenerate when it sums to 0.
    pub fn renormalize(raw: &PartyShares) -> Self {
        match raw.rescaled_to_100() {
            Some(shares) => ShareOutcome::Normalized(shares),
            None => ShareOutcome::Degenerate,
        }
    }

    /// Published shares. A degenerate outcome publishes zeros.
    pub fn shares(&self) -> PartyShares {
        match self {
            ShareOutcome::Normalized(s) => *s,
            ShareOutcome::Degenerate => PartyShares::default(),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        matches!(self, ShareOutcome::Degenerate)
    }
}

/// One date of the smoothed, renormalized series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedPoint {
    pub date: NaiveDate,
    pub outcome: ShareOutcome,
}

impl SmoothedPoint {
    pub fn shares(&self) -> PartyShares {
        self.outcome.shares()
    }
}

/// The tail of a smoothed series: latest values and the change since the
/// previous point.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestSnapshot {
    pub date: NaiveDate,
    pub latest_values: PartyShares,
    /// `None` when the series has a single point.
    pub changes: Option<PartyShares>,
}

impl LatestSnapshot {
    /// Per-party changes, `None` per party when there is no previous point.
    pub fn changes_by_party(&self) -> PartyMap<Option<f64>> {
        PartyMap::from_fn(|p| self.changes.as_ref().map(|c| *c.get(p)))
    }
}

/// Results for one riding as recorded in the historical results file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RidingRecord {
    pub code: String,
    pub name: String,
    /// Election year -> lowercase acronym (`lpc`, `bq`, ...) -> share.
    #[serde(default)]
    pub results: BTreeMap<u16, BTreeMap<String, f64>>,
}

/// Ridings of one province, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvinceRidings {
    pub province: String,
    pub ridings: Vec<RidingRecord>,
}

/// A riding as listed in the districts file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct District {
    pub code: String,
    pub name: String,
}

/// The historical anchor for one riding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RidingBaseline {
    pub code: String,
    pub name: String,
    pub year: u16,
    /// Normalized shares summing to exactly 100.
    pub shares: PartyShares,
}

/// National vote shares for one election year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NationalBaseline {
    pub year: u16,
    pub shares: PartyShares,
}

/// How the "old" side of each riding's swing ratio is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum NationalBaselinePolicy {
    /// One national baseline for every riding: the year of the first riding
    /// assigned a baseline (candidate years outermost, then file order).
    #[default]
    FirstAssigned,
    /// Each riding is measured against national shares from its own baseline year.
    PerRidingYear,
}

/// Projected outcome for one riding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RidingProjection {
    pub code: String,
    pub name: String,
    pub baseline_year: u16,
    pub outcome: ShareOutcome,
    /// `None` for a degenerate projection.
    pub winner: Option<Party>,
}

/// Parliament verdict derived from a seat tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "party", rename_all = "lowercase")]
pub enum Verdict {
    Majority(Party),
    Minority,
}

/// Seat counts per party over every riding with a valid projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatTally {
    pub seats: PartyMap<u32>,
    pub total: u32,
    pub verdict: Verdict,
}

/// A run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus environment and defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub data_dir: PathBuf,
    /// Exponential smoothing constant.
    pub alpha: f64,
    /// Candidate baseline years, newest first.
    pub years: Vec<u16>,
    /// Riding-code prefix of the only province where the bloc runs candidates.
    pub bloc_prefix: String,
    /// Region code whose latest snapshot feeds the swing model.
    pub national_region: String,
    pub baseline_policy: NationalBaselinePolicy,

    pub export_csv: Option<PathBuf>,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            alpha: crate::aggregate::DEFAULT_ALPHA,
            years: vec![2021, 2019],
            bloc_prefix: "24".to_string(),
            national_region: "federal".to_string(),
            baseline_policy: NationalBaselinePolicy::FirstAssigned,
            export_csv: None,
            plot: false,
            plot_width: 100,
            plot_height: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_share_classifies_cells() {
        assert_eq!(RawShare::parse(None), RawShare::Missing);
        assert_eq!(RawShare::parse(Some("  ")), RawShare::Blank);
        assert_eq!(RawShare::parse(Some("n/a")), RawShare::Invalid);
        assert_eq!(RawShare::parse(Some(" 34.5 ")), RawShare::Value(34.5));
        assert_eq!(RawShare::Invalid.or_zero(), 0.0);
        assert!(RawShare::Blank.is_blank());
    }

    #[test]
    fn degenerate_outcome_publishes_zeros() {
        let outcome = ShareOutcome::renormalize(&PartyShares::default());
        assert!(outcome.is_degenerate());
        assert_eq!(outcome.shares(), PartyShares::default());
    }

    #[test]
    fn region_lookup_round_trips() {
        assert_eq!(region_name("qc"), Some("quebec"));
        assert_eq!(region_code("ontario"), Some("on"));
        assert_eq!(region_code("yukon"), None);
    }

    #[test]
    fn single_point_snapshot_has_null_changes() {
        let snap = LatestSnapshot {
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            latest_values: PartyShares::default(),
            changes: None,
        };
        let changes = snap.changes_by_party();
        assert!(changes.iter().all(|(_, c)| c.is_none()));
    }

    #[test]
    fn verdict_serializes_tagged() {
        let json = serde_json::to_value(Verdict::Majority(Party::Conservative)).unwrap();
        assert_eq!(json["kind"], "majority");
        assert_eq!(json["party"], "conservative");
    }
}
