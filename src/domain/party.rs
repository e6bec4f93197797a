//! Party taxonomy.
//!
//! The set of tracked parties is closed: every share vector in the pipeline has
//! exactly these seven keys. `Other` is never observed directly in poll data;
//! it is derived from the six tracked parties.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A canonical party key.
///
/// Declaration order is the taxonomy order. It is used for iteration, report
/// layout, and to break ties when picking a riding winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Party {
    Liberal,
    Conservative,
    Ndp,
    Bloc,
    Green,
    Ppc,
    Other,
}

impl Party {
    pub const ALL: [Party; 7] = [
        Party::Liberal,
        Party::Conservative,
        Party::Ndp,
        Party::Bloc,
        Party::Green,
        Party::Ppc,
        Party::Other,
    ];

    /// Parties that pollsters report directly.
    pub const TRACKED: [Party; 6] = [
        Party::Liberal,
        Party::Conservative,
        Party::Ndp,
        Party::Bloc,
        Party::Green,
        Party::Ppc,
    ];

    /// Canonical lowercase key (`liberal`, `conservative`, ...).
    pub fn key(self) -> &'static str {
        match self {
            Party::Liberal => "liberal",
            Party::Conservative => "conservative",
            Party::Ndp => "ndp",
            Party::Bloc => "bloc",
            Party::Green => "green",
            Party::Ppc => "ppc",
            Party::Other => "other",
        }
    }

    /// Pollster / results acronym (`LPC`, `CPC`, ...).
    pub fn acronym(self) -> &'static str {
        match self {
            Party::Liberal => "LPC",
            Party::Conservative => "CPC",
            Party::Ndp => "NDP",
            Party::Bloc => "BQ",
            Party::Green => "GPC",
            Party::Ppc => "PPC",
            Party::Other => "Other",
        }
    }

    /// Map an external acronym to its canonical party. Case-insensitive, so the
    /// lowercase keys used in riding results (`lpc`, `bq`, ...) resolve too.
    pub fn from_acronym(acronym: &str) -> Option<Party> {
        let acronym = acronym.trim();
        Party::ALL
            .into_iter()
            .find(|p| p.acronym().eq_ignore_ascii_case(acronym))
    }

    pub fn is_tracked(self) -> bool {
        self != Party::Other
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.acronym())
    }
}

/// One value per party.
///
/// Serializes as a flat object keyed by canonical party key, which is the
/// shape the published averages and snapshot files use.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PartyMap<T> {
    pub liberal: T,
    pub conservative: T,
    pub ndp: T,
    pub bloc: T,
    pub green: T,
    pub ppc: T,
    pub other: T,
}

impl<T> PartyMap<T> {
    pub fn from_fn(mut f: impl FnMut(Party) -> T) -> Self {
        Self {
            liberal: f(Party::Liberal),
            conservative: f(Party::Conservative),
            ndp: f(Party::Ndp),
            bloc: f(Party::Bloc),
            green: f(Party::Green),
            ppc: f(Party::Ppc),
            other: f(Party::Other),
        }
    }

    pub fn get(&self, party: Party) -> &T {
        match party {
            Party::Liberal => &self.liberal,
            Party::Conservative => &self.conservative,
            Party::Ndp => &self.ndp,
            Party::Bloc => &self.bloc,
            Party::Green => &self.green,
            Party::Ppc => &self.ppc,
            Party::Other => &self.other,
        }
    }

    pub fn get_mut(&mut self, party: Party) -> &mut T {
        match party {
            Party::Liberal => &mut self.liberal,
            Party::Conservative => &mut self.conservative,
            Party::Ndp => &mut self.ndp,
            Party::Bloc => &mut self.bloc,
            Party::Green => &mut self.green,
            Party::Ppc => &mut self.ppc,
            Party::Other => &mut self.other,
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(Party, &T) -> U) -> PartyMap<U> {
        PartyMap::from_fn(|p| f(p, self.get(p)))
    }

    /// Iterate `(party, value)` in taxonomy order.
    pub fn iter(&self) -> impl Iterator<Item = (Party, &T)> + '_ {
        Party::ALL.into_iter().map(move |p| (p, self.get(p)))
    }
}

/// Percentage shares for the seven parties.
pub type PartyShares = PartyMap<f64>;

impl PartyMap<f64> {
    pub fn total(&self) -> f64 {
        self.iter().map(|(_, v)| *v).sum()
    }

    /// Sum of the six directly-reported parties.
    pub fn tracked_total(&self) -> f64 {
        Party::TRACKED.iter().map(|&p| *self.get(p)).sum()
    }

    /// Rescale so the seven shares sum to 100.
    ///
    /// Returns `None` when the sum is zero (or not finite); callers decide how
    /// to represent that degenerate case.
    pub fn rescaled_to_100(&self) -> Option<PartyShares> {
        let total = self.total();
        if total == 0.0 || !total.is_finite() {
            return None;
        }
        Some(self.map(|_, v| v / total * 100.0))
    }

    /// The party with the strictly greatest share. Ties go to the party that
    /// comes first in taxonomy order.
    pub fn leader(&self) -> Party {
        let mut best = Party::ALL[0];
        for party in Party::ALL {
            if self.get(party) > self.get(best) {
                best = party;
            }
        }
        best
    }
}
