//! Formatted terminal output.
//!
//! Formatting lives in one place so the engines stay free of presentation and
//! output changes stay localized.

use crate::app::pipeline::{AggregationRun, ProjectionRun};
use crate::domain::{LatestSnapshot, Party, RidingProjection, SeatTally, region_name};
use crate::projection::NationalAnchor;
use crate::report::{snapshot_rows, verdict_label};

/// Per-region ingest and smoothing summary.
pub fn format_aggregation_summary(run: &AggregationRun) -> String {
    let mut out = String::new();

    out.push_str("=== katelect - Poll Aggregation ===\n");
    out.push_str(
        format!(
            "{:<10} {:>6} {:>6} {:>6} {:>6} {:>6} {:<10}\n",
            "region", "rows", "used", "dq", "errors", "days", "latest"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<10} {:-<6} {:-<6} {:-<6} {:-<6} {:-<6} {:-<10}\n", "", "", "", "", "", "", "").trim_end());
    out.push('\n');

    for (code, region) in &run.regions {
        let r = &region.report;
        out.push_str(
            format!(
                "{:<10} {:>6} {:>6} {:>6} {:>6} {:>6} {:<10}\n",
                region_name(code).unwrap_or(code.as_str()),
                r.rows_read,
                r.rows_used,
                r.disqualified,
                r.row_errors.len(),
                region.series.len(),
                region.latest.date,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    for (code, reason) in &run.skipped {
        out.push_str(&format!("  (skipped {code}) {reason}\n"));
    }

    out
}

/// Latest values and changes for one region.
pub fn format_snapshot(title: &str, snapshot: &LatestSnapshot) -> String {
    let mut out = String::new();

    out.push_str(&format!("{title} as of {}\n", snapshot.date));
    out.push_str(format!("{:<6} {:>8} {:>8}\n", "party", "share", "change").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<6} {:-<8} {:-<8}\n", "", "", "").trim_end());
    out.push('\n');

    for row in snapshot_rows(snapshot) {
        let change = row.change.map_or_else(|| "-".to_string(), |c| format!("{c:+.2}"));
        out.push_str(&format!("{:<6} {:>8.2} {:>8}\n", row.party.acronym(), row.share, change));
    }

    out
}

/// Projection header: poll date, anchors and exclusions.
pub fn format_projection_summary(run: &ProjectionRun) -> String {
    let mut out = String::new();

    out.push_str("=== katelect - Seat Projection ===\n");
    out.push_str(&format!("Polling as of: {}\n", run.poll_date));
    out.push_str(&format!("National polling: {}\n", fmt_shares(&run.polling)));
    match &run.baselines.national {
        NationalAnchor::Shared(national) => {
            out.push_str(&format!("National baseline: {}\n", national.year));
        }
        NationalAnchor::PerYear(by_year) => {
            let years: Vec<String> = by_year.keys().map(u16::to_string).collect();
            out.push_str(&format!("National baselines: per riding year ({})\n", years.join(", ")));
        }
    }
    out.push_str(&format!(
        "Ridings: projected={} | degenerate={} | excluded={}\n",
        run.batch.projections.len(),
        run.batch.degenerate().count(),
        run.batch.excluded.len(),
    ));
    for (code, reason) in &run.batch.excluded {
        out.push_str(&format!("  (excluded {code}) {reason}\n"));
    }
    out.push('\n');

    out
}

/// Seat table and verdict.
pub fn format_seat_table(tally: &SeatTally) -> String {
    let mut out = String::new();

    out.push_str(format!("{:<6} {:>6} {:>8}\n", "party", "seats", "share").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<6} {:-<6} {:-<8}\n", "", "", "").trim_end());
    out.push('\n');

    for (party, seats) in tally.ranked() {
        if seats == 0 {
            continue;
        }
        out.push_str(&format!(
            "{:<6} {:>6} {:>7.1}%\n",
            party.acronym(),
            seats,
            tally.seat_share(party)
        ));
    }
    out.push_str(&format!("{:<6} {:>6}\n", "total", tally.total));
    out.push_str(&format!("\n{}\n", verdict_label(tally.verdict)));

    out
}

/// Detail for a single riding.
pub fn format_riding(projection: &RidingProjection) -> String {
    let mut out = String::new();

    out.push_str(&format!("{} {}\n", projection.code, projection.name));
    out.push_str(&format!("Baseline year: {}\n", projection.baseline_year));
    match projection.winner {
        Some(winner) => out.push_str(&format!("Projected winner: {winner}\n")),
        None => out.push_str("Projected winner: none (projection sums to zero)\n"),
    }

    let shares = projection.outcome.shares();
    for party in Party::ALL {
        out.push_str(&format!("  {:<6} {:>6.2}\n", party.acronym(), shares.get(party)));
    }

    out
}

fn fmt_shares(shares: &crate::domain::PartyShares) -> String {
    let parts: Vec<String> = shares
        .iter()
        .map(|(party, v)| format!("{}={v:.1}", party.acronym()))
        .collect();
    parts.join(" ")
}
