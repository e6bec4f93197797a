//! Same-day poll aggregation.
//!
//! Turns one region's raw poll rows into one `DailyAggregate` per date:
//! - rows with a blank party cell are dropped entirely
//! - rows sharing a date are averaged, weighted by sample size
//! - `other` is derived from the averaged tracked parties

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{DailyAggregate, Party, PartyShares, RawPoll};

const LOG_TARGET: &str = "katelect::normalizer";

/// Output of aggregation for one region.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregated {
    /// One entry per surviving date, ascending.
    pub days: Vec<DailyAggregate>,
    /// Rows dropped because a tracked party cell was blank.
    pub disqualified: usize,
}

/// Aggregate raw polls into per-date weighted averages.
pub fn aggregate_polls(polls: &[RawPoll]) -> Aggregated {
    let mut by_date: BTreeMap<NaiveDate, Vec<&RawPoll>> = BTreeMap::new();
    let mut disqualified = 0usize;

    for poll in polls {
        if is_disqualified(poll) {
            log::debug!(
                target: LOG_TARGET,
                "dropping {} poll from {}: blank party value",
                poll.pollster,
                poll.date
            );
            disqualified += 1;
            continue;
        }
        by_date.entry(poll.date).or_default().push(poll);
    }

    let days = by_date
        .into_iter()
        .map(|(date, group)| aggregate_day(date, &group))
        .collect();

    Aggregated { days, disqualified }
}

/// A row is disqualified when any tracked party cell is present but blank.
pub fn is_disqualified(poll: &RawPoll) -> bool {
    Party::TRACKED.iter().any(|&p| poll.shares.get(p).is_blank())
}

fn aggregate_day(date: NaiveDate, group: &[&RawPoll]) -> DailyAggregate {
    let total_sample: u64 = group.iter().map(|p| p.sample_size).sum();

    // No sample sizes at all: every poll counts equally.
    let weights: Vec<f64> = if total_sample == 0 {
        vec![1.0; group.len()]
    } else {
        group.iter().map(|p| p.sample_size as f64).collect()
    };
    let weight_sum: f64 = weights.iter().sum();

    let mut shares = PartyShares::default();
    for party in Party::TRACKED {
        let weighted: f64 = group
            .iter()
            .zip(&weights)
            .map(|(poll, w)| poll.shares.get(party).or_zero() * w)
            .sum();
        *shares.get_mut(party) = weighted / weight_sum;
    }
    shares.other = (100.0 - shares.tracked_total()).max(0.0);

    DailyAggregate {
        date,
        sample_size: if total_sample == 0 { group.len() as u64 } else { total_sample },
        pollster: join_pollsters(group),
        shares,
    }
}

fn join_pollsters(group: &[&RawPoll]) -> String {
    let mut seen: Vec<&str> = Vec::new();
    for poll in group {
        if !seen.contains(&poll.pollster.as_str()) {
            seen.push(&poll.pollster);
        }
    }
    seen.join(", ")
}
