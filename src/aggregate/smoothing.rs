//! Exponential smoothing and renormalization of a daily aggregate series.
//!
//! Per party, in date order:
//!
//! ```text
//! s[0] = x[0]
//! s[i] = s[i-1] + α · (x[i] - s[i-1])
//! ```
//!
//! Each smoothed row is then rescaled so the seven parties sum to 100. The
//! recurrence only needs the previous smoothed row, so `Smoother` can be fed
//! one aggregate at a time and matches a full recompute over the same history.

use crate::domain::{DailyAggregate, LatestSnapshot, PartyShares, ShareOutcome, SmoothedPoint};
use crate::error::AppError;

/// Default smoothing constant.
pub const DEFAULT_ALPHA: f64 = 0.25;

/// Reject smoothing constants outside `(0, 1]`.
pub fn validate_alpha(alpha: f64) -> Result<f64, AppError> {
    if alpha.is_finite() && alpha > 0.0 && alpha <= 1.0 {
        Ok(alpha)
    } else {
        Err(AppError::new(
            2,
            format!("Invalid smoothing constant {alpha}: expected 0 < alpha <= 1."),
        ))
    }
}

/// Running exponential smoother over a chronologically ordered series.
#[derive(Debug, Clone)]
pub struct Smoother {
    alpha: f64,
    last: Option<PartyShares>,
}

impl Smoother {
    pub fn new(alpha: f64) -> Self {
        Self { alpha, last: None }
    }

    /// Resume from a previously persisted smoothed (pre-renormalization) row.
    pub fn resume(alpha: f64, last: PartyShares) -> Self {
        Self {
            alpha,
            last: Some(last),
        }
    }

    /// Last smoothed row before renormalization.
    pub fn state(&self) -> Option<&PartyShares> {
        self.last.as_ref()
    }

    /// Fold one aggregate into the running state and return its renormalized point.
    pub fn push(&mut self, day: &DailyAggregate) -> SmoothedPoint {
        let alpha = self.alpha;
        let next = match &self.last {
            None => day.shares,
            Some(prev) => PartyShares::from_fn(|p| {
                let s = *prev.get(p);
                s + alpha * (day.shares.get(p) - s)
            }),
        };
        self.last = Some(next);

        SmoothedPoint {
            date: day.date,
            outcome: ShareOutcome::renormalize(&next),
        }
    }
}

/// Smooth and renormalize a whole series.
pub fn smooth_series(days: &[DailyAggregate], alpha: f64) -> Vec<SmoothedPoint> {
    let mut smoother = Smoother::new(alpha);
    days.iter().map(|d| smoother.push(d)).collect()
}

/// Latest values and change since the previous point.
///
/// Returns `None` for an empty series.
pub fn latest_snapshot(series: &[SmoothedPoint]) -> Option<LatestSnapshot> {
    let (last, rest) = series.split_last()?;
    let latest_values = last.shares();
    let changes = rest.last().map(|prev| {
        let prev = prev.shares();
        latest_values.map(|p, v| v - prev.get(p))
    });

    Some(LatestSnapshot {
        date: last.date,
        latest_values,
        changes,
    })
}
