//! Read-only collaborator interfaces
//!
//! The oracle consumes voting power and cellar registration from other
//! subsystems. Both are queried synchronously inside the state-transition
//! function and must be stable for the duration of a vote period.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::ValidatorAddress;

/// Voting power of the validator set.
pub trait VotingPowerTable {
    /// Voting power of `validator`; zero when it is not in the set.
    fn weight(&self, validator: &ValidatorAddress) -> u64;

    /// Sum of all validators' voting power.
    fn total(&self) -> u64;
}

/// Registry of cellars managed by the oracle.
pub trait CellarRegistry {
    /// Whether `cellar_id` is registered.
    fn exists(&self, cellar_id: &str) -> bool;

    /// All registered ids in ascending order.
    fn cellar_ids(&self) -> Vec<String>;
}

impl VotingPowerTable for BTreeMap<ValidatorAddress, u64> {
    fn weight(&self, validator: &ValidatorAddress) -> u64 {
        self.get(validator).copied().unwrap_or(0)
    }

    fn total(&self) -> u64 {
        self.values().fold(0u64, |acc, w| acc.saturating_add(*w))
    }
}

impl CellarRegistry for BTreeSet<String> {
    fn exists(&self, cellar_id: &str) -> bool {
        self.contains(cellar_id)
    }

    fn cellar_ids(&self) -> Vec<String> {
        self.iter().cloned().collect()
    }
}
