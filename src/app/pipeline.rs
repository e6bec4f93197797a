//! Shared pipeline logic used by every command.
//!
//! Keeping this in one place avoids duplicating the core workflows:
//! - aggregation: poll rows -> per-date averages -> smoothed series -> snapshot
//! - projection: results + national votes -> baselines -> swing -> seat tally
//!
//! The command handlers can then focus on presentation.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rayon::prelude::*;

use crate::aggregate::{aggregate_polls, latest_snapshot, smooth_series};
use crate::domain::{LatestSnapshot, PartyShares, RunConfig, SeatTally, SmoothedPoint};
use crate::error::{AppError, RegionError};
use crate::io::{
    DataPaths, FieldMap, ProjectionFile, RowError, load_districts, load_national_votes, load_poll_rows,
    load_results, parse_polls, read_averages_json, write_averages_json, write_latest_json,
    write_projection_json,
};
use crate::projection::{BaselineOptions, Baselines, ProjectionBatch, build_baselines, project_ridings, tally_seats};
use crate::report::verdict_label;

const LOG_TARGET: &str = "katelect::pipeline";

/// What happened to one region's input rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IngestReport {
    pub rows_read: usize,
    /// Rows that contributed to a daily aggregate.
    pub rows_used: usize,
    /// Rows dropped for a blank party value.
    pub disqualified: usize,
    pub row_errors: Vec<RowError>,
}

/// All computed outputs for one region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionOutput {
    pub series: Vec<SmoothedPoint>,
    pub latest: LatestSnapshot,
    pub report: IngestReport,
}

/// Outputs of an aggregation run, keyed by region code.
#[derive(Debug, Clone, Default)]
pub struct AggregationRun {
    pub regions: BTreeMap<String, RegionOutput>,
    /// Regions that produced nothing, with the reason.
    pub skipped: BTreeMap<String, String>,
}

/// All computed outputs of a projection run.
#[derive(Debug, Clone)]
pub struct ProjectionRun {
    pub poll_date: NaiveDate,
    pub polling: PartyShares,
    pub baselines: Baselines,
    pub batch: ProjectionBatch,
    pub tally: SeatTally,
}

/// Aggregate, smooth and snapshot one region's poll rows.
pub fn aggregate_region(rows: &[FieldMap], alpha: f64) -> Result<RegionOutput, RegionError> {
    let parsed = parse_polls(rows)?;
    let aggregated = aggregate_polls(&parsed.polls);

    let series = smooth_series(&aggregated.days, alpha);
    let latest = latest_snapshot(&series).ok_or(RegionError::NoProcessableRows)?;

    let degenerate = series.iter().filter(|p| p.outcome.is_degenerate()).count();
    if degenerate > 0 {
        log::warn!(target: LOG_TARGET, "{degenerate} smoothed date(s) sum to zero");
    }

    let report = IngestReport {
        rows_read: parsed.rows_read,
        rows_used: parsed.polls.len() - aggregated.disqualified,
        disqualified: aggregated.disqualified,
        row_errors: parsed.row_errors,
    };

    Ok(RegionOutput {
        series,
        latest,
        report,
    })
}

/// Aggregate every region with a poll file and publish its outputs.
///
/// A region that cannot be aggregated or written is logged and skipped; the
/// run fails only when no region produced a series.
pub fn run_aggregation(config: &RunConfig) -> Result<AggregationRun, AppError> {
    let paths = DataPaths::new(&config.data_dir);
    let codes = paths.discover_regions()?;
    if codes.is_empty() {
        return Err(AppError::new(
            3,
            format!("No poll files found in '{}'.", paths.polls_dir().display()),
        ));
    }

    let results: Vec<(String, Result<RegionOutput, String>)> = codes
        .par_iter()
        .map(|code| {
            log::info!(target: LOG_TARGET, "aggregating {code}");
            let result = load_poll_rows(&paths.poll_file(code))
                .map_err(|e| e.to_string())
                .and_then(|rows| aggregate_region(&rows, config.alpha).map_err(|e| e.to_string()));
            (code.clone(), result)
        })
        .collect();

    let mut run = AggregationRun::default();
    for (code, result) in results {
        match result {
            Ok(output) => {
                let written = write_averages_json(&paths.averages_file(&code), &output.series)
                    .and_then(|()| write_latest_json(&paths.latest_file(&code), &output.latest));
                if let Err(err) = written {
                    log::warn!(target: LOG_TARGET, "skipping {code}: {err}");
                    run.skipped.insert(code, err.to_string());
                    continue;
                }
                log::info!(
                    target: LOG_TARGET,
                    "{code}: {} of {} row(s) used, {} date(s), latest {}",
                    output.report.rows_used,
                    output.report.rows_read,
                    output.series.len(),
                    output.latest.date
                );
                run.regions.insert(code, output);
            }
            Err(reason) => {
                log::warn!(target: LOG_TARGET, "skipping {code}: {reason}");
                run.skipped.insert(code, reason);
            }
        }
    }

    if run.regions.is_empty() {
        return Err(AppError::new(3, "No region produced a smoothed series."));
    }
    Ok(run)
}

/// Latest national values from the published averages of the national region.
pub fn published_national_polling(config: &RunConfig) -> Result<(NaiveDate, PartyShares), AppError> {
    let paths = DataPaths::new(&config.data_dir);
    let series = read_averages_json(&paths.averages_file(&config.national_region))?;
    let latest = latest_snapshot(&series).ok_or_else(|| {
        AppError::new(
            3,
            format!("No smoothed series published for region '{}'.", config.national_region),
        )
    })?;
    Ok((latest.date, latest.latest_values))
}

/// Project every riding against `polling` and publish the result.
///
/// The riding list comes from the districts file when present, otherwise
/// from the results file.
pub fn run_projection(config: &RunConfig, poll_date: NaiveDate, polling: PartyShares) -> Result<ProjectionRun, AppError> {
    let paths = DataPaths::new(&config.data_dir);
    let provinces = load_results(&paths.results_file())?;
    let national_votes = load_national_votes(&paths.national_votes_file())?;

    let opts = BaselineOptions {
        years: &config.years,
        bloc_prefix: &config.bloc_prefix,
        policy: config.baseline_policy,
    };
    let baselines = build_baselines(&provinces, &national_votes, &opts)?;

    let districts = paths.districts_file();
    let codes: Vec<String> = if districts.exists() {
        load_districts(&districts)?.into_iter().map(|d| d.code).collect()
    } else {
        baselines.names.keys().cloned().collect()
    };

    let batch = project_ridings(&codes, &baselines, &polling, &config.bloc_prefix);
    if batch.projections.is_empty() {
        return Err(AppError::new(3, "No riding could be projected."));
    }
    if batch.degenerate().count() == batch.projections.len() {
        return Err(AppError::new(
            3,
            "Every riding projection sums to zero; national polling has no support to swing.",
        ));
    }

    let tally = tally_seats(batch.projections.values());
    log::info!(
        target: LOG_TARGET,
        "{} of {} seat(s) counted: {}",
        tally.total,
        codes.len(),
        verdict_label(tally.verdict)
    );

    let file = ProjectionFile {
        tool: "katelect".to_string(),
        poll_date,
        national_polling: polling,
        baseline_policy: config.baseline_policy,
        ridings: batch.projections.values().cloned().collect(),
        excluded: batch.excluded.keys().cloned().collect(),
        tally: tally.clone(),
    };
    write_projection_json(&paths.projection_file(), &file)?;

    Ok(ProjectionRun {
        poll_date,
        polling,
        baselines,
        batch,
        tally,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NationalBaselinePolicy, Party, Verdict};
    use crate::io::read_projection_json;
    use serde_json::json;
    use std::fs;
    use std::path::Path;

    fn write(path: &Path, value: serde_json::Value) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
    }

    fn config(dir: &Path) -> RunConfig {
        RunConfig {
            data_dir: dir.to_path_buf(),
            ..RunConfig::default()
        }
    }

    fn seed_polls(paths: &DataPaths) {
        write(
            &paths.poll_file("federal"),
            json!([
                { "Date (middle)": "2025-04-01", "Polling Firm": "A", "Sample": "1000",
                  "LPC": "40", "CPC": "40", "NDP": "10", "BQ": "5", "GPC": "3", "PPC": "2" },
                { "Date (middle)": "2025-04-01", "Polling Firm": "B", "Sample": "1000",
                  "LPC": "40", "CPC": "40", "NDP": "10", "BQ": "5", "GPC": "3", "PPC": "2" },
                { "Date (middle)": "2025-04-01", "Polling Firm": "C", "Sample": "900",
                  "LPC": "", "CPC": "40", "NDP": "10", "BQ": "5", "GPC": "3", "PPC": "2" },
                { "Date (middle)": "2025-04-02", "Polling Firm": "A", "Sample": "1000",
                  "LPC": "44", "CPC": "36", "NDP": "10", "BQ": "5", "GPC": "3", "PPC": "2" }
            ]),
        );
        // No date column at all.
        write(&paths.poll_file("qc"), json!([{ "Firm": "Leger", "BQ": "35" }]));
    }

    fn seed_results(paths: &DataPaths) {
        write(
            &paths.results_file(),
            json!({
                "Ontario": [
                    { "code": "35001", "name": "Ajax", "results": { "2021": { "lpc": 50, "cpc": 30, "ndp": 15, "gpc": 5 } } },
                    { "code": "35002", "name": "Barrie", "results": { "2019": { "lpc": 30, "cpc": 50, "ndp": 20 } } }
                ],
                "Quebec": [
                    { "code": "24001", "name": "Abitibi", "results": { "2021": { "bq": 40, "lpc": 35, "cpc": 15, "ndp": 10 } } }
                ]
            }),
        );
        write(
            &paths.national_votes_file(),
            json!({
                "2021": { "LPC": 40, "CPC": 40, "NDP": 10, "BQ": 5, "GPC": 3, "PPC": 2 },
                "2019": { "LPC": 40, "CPC": 40, "NDP": 10, "BQ": 5, "GPC": 3, "PPC": 2 }
            }),
        );
        write(
            &paths.districts_file(),
            json!({
                "Ontario": [ { "code": "35001", "name": "Ajax" }, { "code": "35002", "name": "Barrie" } ],
                "Quebec": [ { "code": "24001", "name": "Abitibi" } ],
                "Yukon": [ { "code": "60001", "name": "Yukon" } ]
            }),
        );
    }

    #[test]
    fn aggregation_publishes_and_skips_bad_regions() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(dir.path());
        seed_polls(&paths);

        let run = run_aggregation(&config(dir.path())).unwrap();
        assert_eq!(run.regions.len(), 1);
        assert!(run.skipped["qc"].contains("date"));

        let federal = &run.regions["federal"];
        assert_eq!(federal.report.rows_read, 4);
        assert_eq!(federal.report.disqualified, 1);
        assert_eq!(federal.report.rows_used, 3);
        assert_eq!(federal.series.len(), 2);

        // 40 + 0.25 * (44 - 40)
        assert!((federal.latest.latest_values.liberal - 41.0).abs() < 1e-9);
        assert!((federal.latest.changes.unwrap().liberal - 1.0).abs() < 1e-9);

        assert!(paths.averages_file("federal").exists());
        assert!(paths.latest_file("federal").exists());
        assert!(!paths.averages_file("qc").exists());
    }

    #[test]
    fn write_failure_skips_only_that_region() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(dir.path());
        seed_polls(&paths);
        fs::copy(paths.poll_file("federal"), paths.poll_file("ab")).unwrap();
        // A directory where the averages file should go.
        fs::create_dir_all(paths.averages_file("ab")).unwrap();

        let run = run_aggregation(&config(dir.path())).unwrap();
        assert!(run.skipped["ab"].contains("ab_averages.json"));
        assert!(!paths.latest_file("ab").exists());
        assert!(run.regions.contains_key("federal"));
        assert!(paths.averages_file("federal").exists());
        assert!(paths.latest_file("federal").exists());
    }

    #[test]
    fn empty_polls_dir_has_nothing_to_compute() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(DataPaths::new(dir.path()).polls_dir()).unwrap();
        let err = run_aggregation(&config(dir.path())).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn projection_reads_published_national_series() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(dir.path());
        seed_polls(&paths);
        seed_results(&paths);
        let cfg = config(dir.path());

        run_aggregation(&cfg).unwrap();
        let (date, polling) = published_national_polling(&cfg).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 4, 2).unwrap());

        let run = run_projection(&cfg, date, polling).unwrap();

        // Yukon has no historical results.
        assert_eq!(run.batch.excluded.keys().collect::<Vec<_>>(), vec!["60001"]);
        assert_eq!(run.batch.projections.len(), 3);
        assert_eq!(run.batch.projections["35001"].winner, Some(Party::Liberal));
        assert_eq!(run.batch.projections["35002"].winner, Some(Party::Conservative));
        assert_eq!(run.batch.projections["24001"].winner, Some(Party::Bloc));

        assert_eq!(run.tally.total, 3);
        assert_eq!(run.tally.verdict, Verdict::Minority);

        let file = read_projection_json(&paths.projection_file()).unwrap();
        assert_eq!(file.ridings.len(), 3);
        assert_eq!(file.excluded, vec!["60001"]);
        assert_eq!(file.tally, run.tally);
    }

    #[test]
    fn all_zero_polling_has_nothing_to_compute() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(dir.path());
        seed_results(&paths);

        let date = NaiveDate::from_ymd_opt(2025, 4, 2).unwrap();
        let err = run_projection(&config(dir.path()), date, PartyShares::default()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(!paths.projection_file().exists());
    }

    #[test]
    fn per_riding_year_policy_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(dir.path());
        seed_results(&paths);
        let cfg = RunConfig {
            baseline_policy: NationalBaselinePolicy::PerRidingYear,
            ..config(dir.path())
        };
        let polling = PartyShares {
            liberal: 40.0,
            conservative: 40.0,
            ndp: 10.0,
            bloc: 5.0,
            green: 3.0,
            ppc: 2.0,
            other: 0.0,
        };

        let run = run_projection(&cfg, NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(), polling).unwrap();
        assert_eq!(run.batch.projections["35002"].baseline_year, 2019);

        let file = read_projection_json(&paths.projection_file()).unwrap();
        assert_eq!(file.baseline_policy, NationalBaselinePolicy::PerRidingYear);
    }

    #[test]
    fn missing_national_series_is_nothing_to_compute() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(dir.path());
        write(&paths.averages_file("federal"), json!([]));
        let err = published_national_polling(&config(dir.path())).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
