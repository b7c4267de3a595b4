//! Deterministic fixtures

use std::collections::{BTreeMap, BTreeSet};

use cellar_core::{Allocation, Cellar, TickRange, ValidatorAddress};

/// Cellar id used by the canonical scenario.
pub const TEST_CELLAR_ID: &str = "cellar-0x6ea5992aB4A78D5720bD12A089D13c073d04B55d";

/// Salt used by the canonical scenario.
pub const TEST_SALT: &str = "testsalt";

/// Validator whose address bytes are all `seed`.
pub fn validator(seed: u8) -> ValidatorAddress {
    ValidatorAddress::new([seed; 20])
}

/// Four distinct validators, seeds 1 through 4.
pub fn four_validators() -> Vec<ValidatorAddress> {
    (1..=4).map(validator).collect()
}

/// Power table giving every validator weight 1.
pub fn equal_powers(validators: &[ValidatorAddress]) -> BTreeMap<ValidatorAddress, u64> {
    validators.iter().map(|v| (*v, 1)).collect()
}

/// Registry containing `ids`.
pub fn registry(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

/// The four ranges of the canonical scenario.
pub fn test_tick_ranges() -> Vec<TickRange> {
    vec![
        TickRange::new(200, 100, 10),
        TickRange::new(300, 200, 20),
        TickRange::new(400, 300, 30),
        TickRange::new(500, 400, 40),
    ]
}

/// Canonical scenario cellar.
pub fn test_cellar() -> Cellar {
    Cellar::new(TEST_CELLAR_ID, test_tick_ranges())
}

/// Canonical scenario allocation.
pub fn test_allocation() -> Allocation {
    Allocation::new(test_cellar(), TEST_SALT)
}

/// Allocation for `cellar_id` with one range per `(upper, lower, weight)`.
pub fn allocation_with(cellar_id: &str, ranges: &[(u64, u64, u64)], salt: &str) -> Allocation {
    let ranges = ranges
        .iter()
        .map(|&(upper, lower, weight)| TickRange::new(upper, lower, weight))
        .collect();
    Allocation::new(Cellar::new(cellar_id, ranges), salt)
}
