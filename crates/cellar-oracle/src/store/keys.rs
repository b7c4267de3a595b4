//! Store key layout
//!
//! ```text
//! params                                        -> OracleParams
//! period                                        -> VotePeriod
//! cellar/{cellar_id}                            -> Cellar (canonical)
//! precommit/{period_start:020}/{validator}/{id} -> Precommit
//! commit/{period_start:020}/{validator}/{id}    -> Commit
//! ```
//!
//! Period starts are zero-padded so lexicographic key order equals numeric
//! order, and validator addresses are fixed-width hex so the cellar id is
//! always the unambiguous key suffix.

use cellar_core::{Height, ValidatorAddress};

/// Key of the stored parameters.
pub const PARAMS_KEY: &[u8] = b"params";

/// Key of the current vote period.
pub const PERIOD_KEY: &[u8] = b"period";

const CELLAR_PREFIX: &str = "cellar/";
const PRECOMMIT_PREFIX: &str = "precommit/";
const COMMIT_PREFIX: &str = "commit/";

/// Prefix of all canonical cellar entries.
pub fn cellar_prefix() -> Vec<u8> {
    CELLAR_PREFIX.as_bytes().to_vec()
}

/// Key of the canonical state of `cellar_id`.
pub fn cellar_key(cellar_id: &str) -> Vec<u8> {
    format!("{CELLAR_PREFIX}{cellar_id}").into_bytes()
}

/// Prefix of every precommit in the period starting at `period_start`.
pub fn precommit_period_prefix(period_start: Height) -> Vec<u8> {
    format!("{PRECOMMIT_PREFIX}{period_start:020}/").into_bytes()
}

/// Key of one precommit.
pub fn precommit_key(period_start: Height, validator: &ValidatorAddress, cellar_id: &str) -> Vec<u8> {
    format!("{PRECOMMIT_PREFIX}{period_start:020}/{validator}/{cellar_id}").into_bytes()
}

/// Prefix of every commit in the period starting at `period_start`.
pub fn commit_period_prefix(period_start: Height) -> Vec<u8> {
    format!("{COMMIT_PREFIX}{period_start:020}/").into_bytes()
}

/// Key of one commit.
pub fn commit_key(period_start: Height, validator: &ValidatorAddress, cellar_id: &str) -> Vec<u8> {
    format!("{COMMIT_PREFIX}{period_start:020}/{validator}/{cellar_id}").into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_prefix_orders_numerically() {
        assert!(precommit_period_prefix(9) < precommit_period_prefix(10));
        assert!(commit_period_prefix(99) < commit_period_prefix(100));
    }

    #[test]
    fn test_keys_nest_under_period_prefix() {
        let v = ValidatorAddress::new([0x0a; 20]);
        let key = precommit_key(42, &v, "cellar/with/slashes");
        assert!(key.starts_with(&precommit_period_prefix(42)));
        assert!(!key.starts_with(&precommit_period_prefix(4)));
        assert!(commit_key(42, &v, "c").starts_with(&commit_period_prefix(42)));
    }
}
