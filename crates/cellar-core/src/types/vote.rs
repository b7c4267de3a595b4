//! Ledger records: precommits and commits

use serde::{Deserialize, Serialize};

use super::address::ValidatorAddress;
use super::cellar::Allocation;
use super::period::Height;
use crate::hash::Hash32;

/// A hash-only commitment to an allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Precommit {
    /// Committing validator
    pub validator: ValidatorAddress,
    /// Target cellar
    pub cellar_id: String,
    /// Commitment digest
    pub hash: Hash32,
    /// Height at which the precommit was accepted
    pub height: Height,
}

/// A revealed allocation bound to an earlier precommit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Revealing validator
    pub validator: ValidatorAddress,
    /// Target cellar
    pub cellar_id: String,
    /// Revealed allocation
    pub allocation: Allocation,
    /// Height at which the commit was accepted
    pub height: Height,
}
