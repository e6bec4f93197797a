//! Seat counts and the majority/minority verdict.

use crate::domain::{Party, PartyMap, RidingProjection, SeatTally, Verdict};

/// Count projected winners.
///
/// Only ridings with a winner count toward the total; degenerate projections
/// are left out. A party with more than half the counted seats forms a majority.
pub fn tally_seats<'a>(projections: impl IntoIterator<Item = &'a RidingProjection>) -> SeatTally {
    let mut seats: PartyMap<u32> = PartyMap::default();
    let mut total = 0u32;

    for winner in projections.into_iter().filter_map(|p| p.winner) {
        *seats.get_mut(winner) += 1;
        total += 1;
    }

    let verdict = Party::ALL
        .into_iter()
        .find(|&p| u64::from(*seats.get(p)) * 2 > u64::from(total))
        .map_or(Verdict::Minority, Verdict::Majority);

    SeatTally {
        seats,
        total,
        verdict,
    }
}

impl SeatTally {
    /// Parties ordered by seat count, most seats first; ties keep taxonomy order.
    pub fn ranked(&self) -> Vec<(Party, u32)> {
        let mut rows: Vec<(Party, u32)> = self.seats.iter().map(|(p, s)| (p, *s)).collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1));
        rows
    }

    /// Share of counted seats held by `party`, in percent.
    pub fn seat_share(&self, party: Party) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(*self.seats.get(party)) / f64::from(self.total) * 100.0
    }
}
