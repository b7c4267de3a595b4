//! Seeded random submissions
//!
//! Large reproducible samples for statistical properties such as commitment
//! hiding, where a proptest shrink is less useful than sheer volume.

use rand::distributions::Alphanumeric;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use cellar_core::{Allocation, Cellar, TickRange, ValidatorAddress};

/// `count` random `(allocation, validator)` pairs generated from `seed`.
pub fn random_submissions(seed: u64, count: usize) -> Vec<(Allocation, ValidatorAddress)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let validator = ValidatorAddress::new(rng.gen());
            let ranges = (0..rng.gen_range(1..=4))
                .map(|_| {
                    let lower = rng.gen_range(0..1_000_000u64);
                    let span = rng.gen_range(1..10_000u64);
                    TickRange::new(lower + span, lower, rng.gen_range(0..100))
                })
                .collect();
            let cellar_id = format!("cellar-{}", rng.gen_range(0..8u8));
            let salt: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(16)
                .map(char::from)
                .collect();
            (Allocation::new(Cellar::new(cellar_id, ranges), salt), validator)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sample() {
        assert_eq!(random_submissions(7, 20), random_submissions(7, 20));
        assert_ne!(random_submissions(7, 20), random_submissions(8, 20));
    }

    #[test]
    fn test_sample_is_well_formed() {
        for (allocation, _) in random_submissions(1, 100) {
            assert!(allocation.validate().is_ok());
        }
    }
}
