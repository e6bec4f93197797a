//! Historical riding baselines.
//!
//! For every riding we pick the most recent candidate year with recorded
//! results and normalize those results to sum to 100. The national vote shares
//! used as the "old" side of every swing ratio are chosen once, here, before
//! any per-riding prediction runs.

use std::collections::BTreeMap;

use crate::domain::{
    NationalBaseline, NationalBaselinePolicy, Party, PartyShares, ProvinceRidings, RidingBaseline,
};
use crate::error::ProjectionError;

const LOG_TARGET: &str = "katelect::baseline";

/// Inputs that shape baseline selection.
#[derive(Debug, Clone, Copy)]
pub struct BaselineOptions<'a> {
    /// Candidate years, newest first.
    pub years: &'a [u16],
    /// Riding-code prefix of the province where the bloc runs candidates.
    pub bloc_prefix: &'a str,
    pub policy: NationalBaselinePolicy,
}

/// National anchor(s) for swing ratios.
#[derive(Debug, Clone, PartialEq)]
pub enum NationalAnchor {
    /// Every riding uses the same national baseline.
    Shared(NationalBaseline),
    /// Each riding uses the national baseline of its own year.
    PerYear(BTreeMap<u16, NationalBaseline>),
}

/// Baselines for every riding that has historical results.
#[derive(Debug, Clone, PartialEq)]
pub struct Baselines {
    pub ridings: BTreeMap<String, RidingBaseline>,
    /// Names for every riding seen, including ridings without results.
    pub names: BTreeMap<String, String>,
    pub national: NationalAnchor,
}

impl Baselines {
    /// National baseline to measure `riding` against.
    pub fn national_for(&self, riding: &RidingBaseline) -> Option<&NationalBaseline> {
        match &self.national {
            NationalAnchor::Shared(n) => Some(n),
            NationalAnchor::PerYear(by_year) => by_year.get(&riding.year),
        }
    }
}

/// Whether a riding lies in the province where the bloc runs candidates.
pub fn bloc_eligible(code: &str, bloc_prefix: &str) -> bool {
    code.starts_with(bloc_prefix)
}

/// Build riding baselines and the national anchor.
///
/// Years are scanned outermost (newest first), then provinces and ridings in
/// input order; the first year found for a riding wins. Under
/// `FirstAssigned`, the national baseline is the year of the first riding in
/// that scan.
pub fn build_baselines(
    provinces: &[ProvinceRidings],
    national_votes: &BTreeMap<u16, PartyShares>,
    opts: &BaselineOptions<'_>,
) -> Result<Baselines, ProjectionError> {
    let mut names = BTreeMap::new();
    let mut assigned: Vec<RidingBaseline> = Vec::new();
    let mut ridings: BTreeMap<String, RidingBaseline> = BTreeMap::new();

    for &year in opts.years {
        for province in provinces {
            for riding in &province.ridings {
                names
                    .entry(riding.code.clone())
                    .or_insert_with(|| riding.name.clone());

                if ridings.contains_key(&riding.code) {
                    continue;
                }
                let Some(results) = riding.results.get(&year) else {
                    continue;
                };

                let raw = raw_riding_shares(results);
                let shares = normalize_riding_shares(raw, bloc_eligible(&riding.code, opts.bloc_prefix));
                let baseline = RidingBaseline {
                    code: riding.code.clone(),
                    name: riding.name.clone(),
                    year,
                    shares,
                };
                assigned.push(baseline.clone());
                ridings.insert(riding.code.clone(), baseline);
            }
        }
    }

    let Some(first) = assigned.first() else {
        return Err(ProjectionError::NoBaselines);
    };

    let lookup = |year: u16| -> Result<NationalBaseline, ProjectionError> {
        national_votes
            .get(&year)
            .map(|shares| NationalBaseline { year, shares: *shares })
            .ok_or(ProjectionError::MissingNationalYear(year))
    };

    let national = match opts.policy {
        NationalBaselinePolicy::FirstAssigned => {
            let national = lookup(first.year)?;
            log::info!(
                target: LOG_TARGET,
                "national baseline: {} (seeded by riding {})",
                national.year,
                first.code
            );
            NationalAnchor::Shared(national)
        }
        NationalBaselinePolicy::PerRidingYear => {
            let mut by_year = BTreeMap::new();
            for baseline in &assigned {
                if !by_year.contains_key(&baseline.year) {
                    by_year.insert(baseline.year, lookup(baseline.year)?);
                }
            }
            log::info!(
                target: LOG_TARGET,
                "national baselines per riding year: {:?}",
                by_year.keys().collect::<Vec<_>>()
            );
            NationalAnchor::PerYear(by_year)
        }
    };

    let missing = names.len() - ridings.len();
    if missing > 0 {
        log::warn!(
            target: LOG_TARGET,
            "{missing} riding(s) have no results in any of {:?}",
            opts.years
        );
    }

    Ok(Baselines {
        ridings,
        names,
        national,
    })
}

/// Raw shares from one year's results. Keys are matched case-insensitively
/// against party acronyms; absent parties default to 0.
pub fn raw_riding_shares(results: &BTreeMap<String, f64>) -> PartyShares {
    let mut shares = PartyShares::default();
    for (key, value) in results {
        match Party::from_acronym(key) {
            Some(party) => *shares.get_mut(party) = *value,
            None => log::debug!(target: LOG_TARGET, "ignoring unknown party key `{key}`"),
        }
    }
    shares
}

/// Normalize a riding's historical shares to sum to exactly 100.
///
/// Outside the bloc province the bloc share is zeroed first. If the six
/// tracked parties exceed 100 they are scaled down and `other` is 0;
/// otherwise `other` takes the remainder.
pub fn normalize_riding_shares(mut shares: PartyShares, bloc_eligible: bool) -> PartyShares {
    if !bloc_eligible {
        shares.bloc = 0.0;
    }

    let tracked = shares.tracked_total();
    if tracked > 100.0 {
        let scale = 100.0 / tracked;
        for party in Party::TRACKED {
            *shares.get_mut(party) *= scale;
        }
        shares.other = 0.0;
    } else {
        shares.other = 100.0 - tracked;
    }
    shares
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RidingRecord;

    fn results(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn riding(code: &str, by_year: Vec<(u16, BTreeMap<String, f64>)>) -> RidingRecord {
        RidingRecord {
            code: code.to_string(),
            name: format!("Riding {code}"),
            results: by_year.into_iter().collect(),
        }
    }

    fn national() -> BTreeMap<u16, PartyShares> {
        let mut m = BTreeMap::new();
        m.insert(
            2021,
            PartyShares {
                liberal: 32.6,
                conservative: 33.7,
                ndp: 17.8,
                bloc: 7.6,
                green: 2.3,
                ppc: 4.9,
                other: 1.1,
            },
        );
        m.insert(
            2019,
            PartyShares {
                liberal: 33.1,
                conservative: 34.3,
                ndp: 16.0,
                bloc: 7.6,
                green: 6.5,
                ppc: 1.6,
                other: 0.9,
            },
        );
        m
    }

    fn opts(policy: NationalBaselinePolicy) -> BaselineOptions<'static> {
        BaselineOptions {
            years: &[2021, 2019],
            bloc_prefix: "24",
            policy,
        }
    }

    #[test]
    fn picks_newest_available_year() {
        let provinces = vec![ProvinceRidings {
            province: "Ontario".to_string(),
            ridings: vec![
                riding(
                    "35001",
                    vec![
                        (2019, results(&[("lpc", 50.0), ("cpc", 30.0)])),
                        (2021, results(&[("lpc", 45.0), ("cpc", 35.0)])),
                    ],
                ),
                riding("35002", vec![(2019, results(&[("lpc", 40.0), ("ndp", 40.0)]))]),
                riding("35003", vec![]),
            ],
        }];

        let b = build_baselines(&provinces, &national(), &opts(NationalBaselinePolicy::FirstAssigned)).unwrap();
        assert_eq!(b.ridings["35001"].year, 2021);
        assert!((b.ridings["35001"].shares.liberal - 45.0).abs() < 1e-12);
        assert_eq!(b.ridings["35002"].year, 2019);
        assert!(!b.ridings.contains_key("35003"));
        assert_eq!(b.names.len(), 3);
    }

    #[test]
    fn first_assigned_uses_newest_year_for_everyone() {
        // The first riding in file order only has 2019, but another riding has
        // 2021, so the year-outer scan assigns a 2021 riding first.
        let provinces = vec![ProvinceRidings {
            province: "Ontario".to_string(),
            ridings: vec![
                riding("35001", vec![(2019, results(&[("lpc", 40.0)]))]),
                riding("35002", vec![(2021, results(&[("lpc", 40.0)]))]),
            ],
        }];

        let b = build_baselines(&provinces, &national(), &opts(NationalBaselinePolicy::FirstAssigned)).unwrap();
        let old = &b.ridings["35001"];
        assert_eq!(old.year, 2019);
        assert_eq!(b.national_for(old).unwrap().year, 2021);
    }

    #[test]
    fn empty_year_entry_is_a_baseline_with_everything_other() {
        let provinces = vec![ProvinceRidings {
            province: "Ontario".to_string(),
            ridings: vec![
                riding(
                    "35001",
                    vec![(2019, results(&[("lpc", 50.0), ("cpc", 30.0)])), (2021, results(&[]))],
                ),
                riding("35002", vec![(2019, results(&[])), (2021, results(&[]))]),
            ],
        }];

        let b = build_baselines(&provinces, &national(), &opts(NationalBaselinePolicy::FirstAssigned)).unwrap();
        for code in ["35001", "35002"] {
            let baseline = &b.ridings[code];
            assert_eq!(baseline.year, 2021);
            assert_eq!(baseline.shares.liberal, 0.0);
            assert_eq!(baseline.shares.other, 100.0);
        }
        assert_eq!(b.national_for(&b.ridings["35001"]).unwrap().year, 2021);
    }

    #[test]
    fn per_riding_year_matches_riding_baseline_year() {
        let provinces = vec![ProvinceRidings {
            province: "Ontario".to_string(),
            ridings: vec![
                riding("35001", vec![(2019, results(&[("lpc", 40.0)]))]),
                riding("35002", vec![(2021, results(&[("lpc", 40.0)]))]),
            ],
        }];

        let b = build_baselines(&provinces, &national(), &opts(NationalBaselinePolicy::PerRidingYear)).unwrap();
        for baseline in b.ridings.values() {
            assert_eq!(b.national_for(baseline).unwrap().year, baseline.year);
        }
    }

    #[test]
    fn bloc_is_zeroed_outside_designated_province() {
        let raw = raw_riding_shares(&results(&[("lpc", 40.0), ("cpc", 30.0), ("bq", 12.0), ("other", 3.0)]));
        let shares = normalize_riding_shares(raw, false);
        assert_eq!(shares.bloc, 0.0);
        assert!((shares.other - 30.0).abs() < 1e-12);
        assert!((shares.total() - 100.0).abs() < 1e-12);

        let kept = normalize_riding_shares(raw, true);
        assert!((kept.bloc - 12.0).abs() < 1e-12);
        assert!((kept.other - 18.0).abs() < 1e-12);
    }

    #[test]
    fn over_100_is_scaled_and_other_zeroed() {
        let raw = raw_riding_shares(&results(&[("lpc", 60.0), ("cpc", 50.0), ("other", 5.0)]));
        let shares = normalize_riding_shares(raw, false);
        assert_eq!(shares.other, 0.0);
        assert!((shares.total() - 100.0).abs() < 1e-9);
        assert!((shares.liberal / shares.conservative - 1.2).abs() < 1e-9);
    }

    #[test]
    fn missing_national_year_is_reported() {
        let provinces = vec![ProvinceRidings {
            province: "Quebec".to_string(),
            ridings: vec![riding("24001", vec![(2015, results(&[("bq", 40.0)]))])],
        }];
        let options = BaselineOptions {
            years: &[2015],
            bloc_prefix: "24",
            policy: NationalBaselinePolicy::FirstAssigned,
        };
        let err = build_baselines(&provinces, &national(), &options).unwrap_err();
        assert_eq!(err, ProjectionError::MissingNationalYear(2015));
    }

    #[test]
    fn no_results_at_all_is_an_error() {
        let provinces = vec![ProvinceRidings {
            province: "Ontario".to_string(),
            ridings: vec![riding("35001", vec![])],
        }];
        let err = build_baselines(&provinces, &national(), &opts(NationalBaselinePolicy::FirstAssigned)).unwrap_err();
        assert_eq!(err, ProjectionError::NoBaselines);
    }
}
