//! Reporting utilities: snapshot rows and formatted terminal output.

use crate::domain::{LatestSnapshot, Party, Verdict};

mod format;

pub use format::*;

/// One party's line in a snapshot table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapshotRow {
    pub party: Party,
    pub share: f64,
    pub change: Option<f64>,
}

/// Parties ordered by current share, largest first; ties keep taxonomy order.
pub fn snapshot_rows(snapshot: &LatestSnapshot) -> Vec<SnapshotRow> {
    let mut rows: Vec<SnapshotRow> = snapshot
        .latest_values
        .iter()
        .map(|(party, share)| SnapshotRow {
            party,
            share: *share,
            change: snapshot.changes.map(|c| *c.get(party)),
        })
        .collect();
    rows.sort_by(|a, b| b.share.partial_cmp(&a.share).unwrap_or(std::cmp::Ordering::Equal));
    rows
}

/// Human label for a parliament verdict.
pub fn verdict_label(verdict: Verdict) -> String {
    match verdict {
        Verdict::Majority(party) => format!("{} Majority Government", party.acronym()),
        Verdict::Minority => "Minority Parliament".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PartyShares;
    use chrono::NaiveDate;

    #[test]
    fn rows_sort_by_share_then_taxonomy() {
        let snapshot = LatestSnapshot {
            date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            latest_values: PartyShares {
                liberal: 30.0,
                conservative: 40.0,
                ndp: 30.0,
                ..Default::default()
            },
            changes: None,
        };
        let rows = snapshot_rows(&snapshot);
        let order: Vec<Party> = rows.iter().take(3).map(|r| r.party).collect();
        assert_eq!(order, vec![Party::Conservative, Party::Liberal, Party::Ndp]);
        assert!(rows.iter().all(|r| r.change.is_none()));
    }

    #[test]
    fn verdict_labels() {
        assert_eq!(verdict_label(Verdict::Majority(Party::Liberal)), "LPC Majority Government");
        assert_eq!(verdict_label(Verdict::Minority), "Minority Parliament");
    }
}
