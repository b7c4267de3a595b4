//! Weighted-median aggregation
//!
//! Turns the revealed allocations of one cellar into a single tick-range set.
//! Everything here is a pure function of the commits, the voting power table
//! and the parameters: no store access, no clocks, no map iteration order.
//!
//! Tick ranges are matched by position. Index `i` survives when validators
//! holding at least `presence_threshold` of the committed power submitted an
//! entry at `i`; each surviving field is the power-weighted median of the
//! submitted values.

use cellar_core::{Cellar, Commit, OracleError, OracleParams, Result, TickRange, VotingPowerTable};
use tracing::debug;

/// Lower weighted median of `(value, weight)` pairs.
///
/// Sorts by value, then returns the smallest value whose cumulative weight
/// `c` satisfies `2c >= total`. Zero-weight entries never decide the result.
/// Returns `None` when the total weight is zero.
pub fn weighted_median(entries: &mut [(u64, u64)]) -> Option<u64> {
    let total: u128 = entries.iter().map(|&(_, w)| u128::from(w)).sum();
    if total == 0 {
        return None;
    }
    entries.sort_unstable();

    let mut cumulative: u128 = 0;
    for &(value, weight) in entries.iter() {
        if weight == 0 {
            continue;
        }
        cumulative += u128::from(weight);
        if 2 * cumulative >= total {
            return Some(value);
        }
    }
    None
}

/// Voting power behind `commits`, saturating.
pub fn committed_power(commits: &[Commit], powers: &dyn VotingPowerTable) -> u64 {
    commits
        .iter()
        .fold(0u64, |acc, c| acc.saturating_add(powers.weight(&c.validator)))
}

/// Aggregate the commits of one cellar.
///
/// Fails with [`OracleError::QuorumNotReached`] when the committed power is
/// zero or below `vote_threshold` of the total power.
pub fn aggregate(
    cellar_id: &str,
    commits: &[Commit],
    powers: &dyn VotingPowerTable,
    params: &OracleParams,
) -> Result<Cellar> {
    let total = powers.total();
    let committed = committed_power(commits, powers);
    if committed == 0 || !params.vote_threshold.reached(committed, total) {
        return Err(OracleError::QuorumNotReached {
            cellar_id: cellar_id.to_string(),
            committed,
            total,
        });
    }

    let width = commits
        .iter()
        .map(|c| c.allocation.cellar.tick_ranges.len())
        .max()
        .unwrap_or(0);

    let mut tick_ranges = Vec::with_capacity(width);
    for index in 0..width {
        let mut uppers = Vec::new();
        let mut lowers = Vec::new();
        let mut weights = Vec::new();
        let mut present: u64 = 0;

        for commit in commits {
            let Some(range) = commit.allocation.cellar.tick_ranges.get(index) else {
                continue;
            };
            let power = powers.weight(&commit.validator);
            present = present.saturating_add(power);
            uppers.push((range.upper, power));
            lowers.push((range.lower, power));
            weights.push((range.weight, power));
        }

        if present == 0 || !params.presence_threshold.reached(present, committed) {
            debug!(cellar_id, index, present, committed, "dropping tick range below presence threshold");
            continue;
        }

        // `present > 0`, so every field has positive total weight.
        let (Some(upper), Some(lower), Some(weight)) = (
            weighted_median(&mut uppers),
            weighted_median(&mut lowers),
            weighted_median(&mut weights),
        ) else {
            return Err(OracleError::invalid_message(format!(
                "cellar {cellar_id}: no weighted median at tick range {index}"
            )));
        };
        tick_ranges.push(TickRange::new(upper, lower, weight));
    }

    debug!(
        cellar_id,
        committers = commits.len(),
        committed,
        total,
        tick_ranges = tick_ranges.len(),
        "aggregated cellar"
    );
    Ok(Cellar::new(cellar_id, tick_ranges))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellar_core::{Allocation, ValidatorAddress};
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn validator(seed: u8) -> ValidatorAddress {
        ValidatorAddress::new([seed; 20])
    }

    fn commit(seed: u8, ranges: &[(u64, u64, u64)]) -> Commit {
        let ranges = ranges
            .iter()
            .map(|&(u, l, w)| TickRange::new(u, l, w))
            .collect();
        Commit {
            validator: validator(seed),
            cellar_id: "c".to_string(),
            allocation: Allocation::new(Cellar::new("c", ranges), "salt"),
            height: 6,
        }
    }

    fn equal_powers(n: u8) -> BTreeMap<ValidatorAddress, u64> {
        (1..=n).map(|seed| (validator(seed), 1)).collect()
    }

    #[test]
    fn test_median_of_three_equal_weights() {
        assert_eq!(weighted_median(&mut [(30, 1), (10, 1), (20, 1)]), Some(20));
    }

    #[test]
    fn test_median_takes_lower_middle_on_exact_half() {
        assert_eq!(weighted_median(&mut [(10, 1), (20, 1)]), Some(10));
        assert_eq!(weighted_median(&mut [(10, 1), (20, 1), (30, 1), (40, 1)]), Some(20));
    }

    #[test]
    fn test_median_follows_weight() {
        assert_eq!(weighted_median(&mut [(10, 1), (20, 5), (30, 1)]), Some(20));
        assert_eq!(weighted_median(&mut [(10, 1), (20, 1), (30, 5)]), Some(30));
        assert_eq!(weighted_median(&mut [(10, 0), (20, 0)]), None);
        assert_eq!(weighted_median(&mut [(1, 0), (20, 3)]), Some(20));
    }

    #[test]
    fn test_identical_commits_aggregate_unchanged() {
        let ranges = [(200, 100, 10), (300, 200, 20), (400, 300, 30), (500, 400, 40)];
        let commits: Vec<_> = (1..=4).map(|s| commit(s, &ranges)).collect();

        let cellar = aggregate("c", &commits, &equal_powers(4), &OracleParams::default()).unwrap();
        let expected: Vec<_> = ranges.iter().map(|&(u, l, w)| TickRange::new(u, l, w)).collect();
        assert_eq!(cellar.tick_ranges, expected);
    }

    #[test]
    fn test_quorum_gate() {
        let powers = equal_powers(4);
        let params = OracleParams::default();

        // 2 of 4 is below 2/3.
        let commits = vec![commit(1, &[(2, 1, 1)]), commit(2, &[(2, 1, 1)])];
        let err = aggregate("c", &commits, &powers, &params).unwrap_err();
        assert!(matches!(
            err,
            OracleError::QuorumNotReached { committed: 2, total: 4, .. }
        ));

        // 3 of 4 meets it.
        let commits: Vec<_> = (1..=3).map(|s| commit(s, &[(2, 1, 1)])).collect();
        assert!(aggregate("c", &commits, &powers, &params).is_ok());
    }

    #[test]
    fn test_zero_total_power_never_reaches_quorum() {
        let powers: BTreeMap<ValidatorAddress, u64> = BTreeMap::new();
        let err = aggregate("c", &[commit(1, &[(2, 1, 1)])], &powers, &OracleParams::default())
            .unwrap_err();
        assert!(matches!(err, OracleError::QuorumNotReached { .. }));
    }

    #[test]
    fn test_sparse_index_is_dropped() {
        let powers = equal_powers(3);
        let commits = vec![
            commit(1, &[(200, 100, 1), (400, 300, 1)]),
            commit(2, &[(210, 110, 1)]),
            commit(3, &[(220, 120, 1)]),
        ];
        let cellar = aggregate("c", &commits, &powers, &OracleParams::default()).unwrap();
        assert_eq!(cellar.tick_ranges, vec![TickRange::new(210, 110, 1)]);
    }

    #[test]
    fn test_presence_boundary_under_unequal_power() {
        let powers: BTreeMap<_, _> = [(validator(1), 3), (validator(2), 2), (validator(3), 1)]
            .into_iter()
            .collect();
        let params = OracleParams::default();

        // Index 1 carried by 3 + 1 = 4 of 6, exactly 2/3: kept.
        let commits = vec![
            commit(1, &[(200, 100, 1), (400, 300, 7)]),
            commit(2, &[(210, 110, 2)]),
            commit(3, &[(220, 120, 3), (450, 350, 9)]),
        ];
        let cellar = aggregate("c", &commits, &powers, &params).unwrap();
        assert_eq!(
            cellar.tick_ranges,
            vec![TickRange::new(200, 100, 1), TickRange::new(400, 300, 7)]
        );

        // Index 1 carried by 2 + 1 = 3 of 6: dropped.
        let commits = vec![
            commit(1, &[(200, 100, 1)]),
            commit(2, &[(210, 110, 2), (400, 300, 7)]),
            commit(3, &[(220, 120, 3), (450, 350, 9)]),
        ];
        let cellar = aggregate("c", &commits, &powers, &params).unwrap();
        assert_eq!(cellar.tick_ranges, vec![TickRange::new(200, 100, 1)]);
    }

    #[test]
    fn test_zero_power_submitters_never_carry_an_index() {
        let powers: BTreeMap<_, _> = [(validator(1), 1), (validator(2), 0)].into_iter().collect();
        let params = OracleParams {
            presence_threshold: cellar_core::Ratio::new(0, 1),
            ..OracleParams::default()
        };
        let commits = vec![commit(1, &[(200, 100, 1)]), commit(2, &[(200, 100, 1), (400, 300, 1)])];
        let cellar = aggregate("c", &commits, &powers, &params).unwrap();
        assert_eq!(cellar.tick_ranges, vec![TickRange::new(200, 100, 1)]);
    }

    #[test]
    fn test_fields_take_independent_medians() {
        let powers = equal_powers(3);
        let commits = vec![
            commit(1, &[(300, 100, 5)]),
            commit(2, &[(200, 150, 1)]),
            commit(3, &[(250, 50, 9)]),
        ];
        let cellar = aggregate("c", &commits, &powers, &OracleParams::default()).unwrap();
        assert_eq!(cellar.tick_ranges, vec![TickRange::new(250, 100, 5)]);
    }

    proptest! {
        #[test]
        fn median_is_a_submitted_value(entries in prop::collection::vec((0u64..1_000, 1u64..100), 1..20)) {
            let mut work = entries.clone();
            let median = weighted_median(&mut work).unwrap();
            prop_assert!(entries.iter().any(|&(v, _)| v == median));
        }

        #[test]
        fn median_ignores_input_order(entries in prop::collection::vec((0u64..1_000, 0u64..100), 1..20)) {
            let mut forward = entries.clone();
            let mut reversed: Vec<_> = entries.into_iter().rev().collect();
            prop_assert_eq!(weighted_median(&mut forward), weighted_median(&mut reversed));
        }

        #[test]
        fn aggregated_ranges_stay_well_formed(
            ranges in prop::collection::vec((0u64..1_000, 1u64..1_000, 0u64..100), 3..=3)
        ) {
            let commits: Vec<_> = ranges
                .iter()
                .enumerate()
                .map(|(i, &(lower, span, weight))| commit(i as u8 + 1, &[(lower + span, lower, weight)]))
                .collect();
            let cellar = aggregate("c", &commits, &equal_powers(3), &OracleParams::default()).unwrap();
            for range in &cellar.tick_ranges {
                prop_assert!(range.upper > range.lower);
            }
        }
    }
}
