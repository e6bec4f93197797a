//! Proportional-swing riding projection.
//!
//! For each party, a riding's historical share is scaled by how much that
//! party's national support has moved since the baseline election:
//!
//! ```text
//! ratio      = current_national / baseline_national
//! prediction = riding_baseline · ratio
//! ```
//!
//! Predictions are then rescaled to sum to 100 and the leading party wins.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::domain::{NationalBaseline, Party, PartyShares, RidingBaseline, RidingProjection, ShareOutcome};
use crate::error::ProjectionError;
use crate::projection::baseline::{Baselines, bloc_eligible};

const LOG_TARGET: &str = "katelect::swing";

/// Ratio of current to baseline national support.
///
/// A party with no national baseline keeps its riding share (ratio 1) if it
/// polls above zero now, and vanishes (ratio 0) otherwise.
pub fn swing_ratio(baseline: f64, current: f64) -> f64 {
    if baseline == 0.0 {
        if current > 0.0 { 1.0 } else { 0.0 }
    } else {
        current / baseline
    }
}

/// Project one riding.
pub fn predict_riding(
    baseline: &RidingBaseline,
    national: &NationalBaseline,
    polling: &PartyShares,
    bloc_prefix: &str,
) -> RidingProjection {
    let eligible = bloc_eligible(&baseline.code, bloc_prefix);

    let raw = PartyShares::from_fn(|party| {
        if party == Party::Bloc && !eligible {
            return 0.0;
        }
        let ratio = swing_ratio(*national.shares.get(party), *polling.get(party));
        baseline.shares.get(party) * ratio
    });

    let outcome = ShareOutcome::renormalize(&raw);
    let winner = match &outcome {
        ShareOutcome::Normalized(shares) => Some(shares.leader()),
        ShareOutcome::Degenerate => None,
    };

    RidingProjection {
        code: baseline.code.clone(),
        name: baseline.name.clone(),
        baseline_year: baseline.year,
        outcome,
        winner,
    }
}

/// Projections for a batch of ridings, plus the ridings that could not be projected.
#[derive(Debug, Clone, Default)]
pub struct ProjectionBatch {
    pub projections: BTreeMap<String, RidingProjection>,
    /// Ridings excluded for lack of a baseline, with the reason.
    pub excluded: BTreeMap<String, ProjectionError>,
}

impl ProjectionBatch {
    /// Ridings whose projection summed to zero.
    pub fn degenerate(&self) -> impl Iterator<Item = &RidingProjection> {
        self.projections.values().filter(|p| p.outcome.is_degenerate())
    }
}

/// Project every riding in `codes` against the current national polling.
///
/// Ridings are independent and run in parallel. Output is keyed by riding
/// code so it does not depend on completion order.
pub fn project_ridings(
    codes: &[String],
    baselines: &Baselines,
    polling: &PartyShares,
    bloc_prefix: &str,
) -> ProjectionBatch {
    let results: Vec<(String, Result<RidingProjection, ProjectionError>)> = codes
        .par_iter()
        .map(|code| {
            let result = baselines
                .ridings
                .get(code)
                .ok_or_else(|| ProjectionError::NoBaseline(code.clone()))
                .and_then(|baseline| match baselines.national_for(baseline) {
                    Some(national) => Ok(predict_riding(baseline, national, polling, bloc_prefix)),
                    None => Err(ProjectionError::MissingNationalYear(baseline.year)),
                });
            (code.clone(), result)
        })
        .collect();

    let mut batch = ProjectionBatch::default();
    for (code, result) in results {
        match result {
            Ok(projection) => {
                if projection.outcome.is_degenerate() {
                    log::warn!(target: LOG_TARGET, "projection for {code} sums to zero");
                }
                batch.projections.insert(code, projection);
            }
            Err(err) => {
                log::warn!(target: LOG_TARGET, "could not predict {code}: {err}");
                batch.excluded.insert(code, err);
            }
        }
    }
    batch
}
