//! Transaction messages
//!
//! A validator submits its precommits and its reveals as batches, one
//! message per phase. `validate_basic` performs the stateless checks a host
//! chain runs before a message reaches the state-transition function.

use cellar_core::{Allocation, Cellar, Hash32, OracleError, Result, ValidatorAddress};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Longest accepted cellar id.
pub const MAX_CELLAR_ID_LEN: usize = 128;

/// Longest accepted salt.
pub const MAX_SALT_LEN: usize = 256;

/// Most tick ranges a single allocation may carry.
pub const MAX_TICK_RANGES: usize = 64;

/// One hash commitment inside a precommit message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecommitEntry {
    /// Target cellar
    pub cellar_id: String,
    /// `commitment_hash(cellar, salt, signer)`
    pub hash: Hash32,
}

/// Batch of precommits from one validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgAllocationPrecommit {
    /// Submitting validator
    pub signer: ValidatorAddress,
    /// Commitments, one per cellar
    pub precommits: Vec<PrecommitEntry>,
}

impl MsgAllocationPrecommit {
    /// Precommit a single allocation, computing its hash for `signer`.
    pub fn from_allocation(cellar: &Cellar, salt: &str, signer: ValidatorAddress) -> Self {
        Self {
            signer,
            precommits: vec![PrecommitEntry {
                cellar_id: cellar.id.clone(),
                hash: cellar_core::commitment_hash(cellar, salt, &signer),
            }],
        }
    }

    /// Precommit every allocation in `allocations`.
    pub fn from_allocations(allocations: &[Allocation], signer: ValidatorAddress) -> Self {
        Self {
            signer,
            precommits: allocations
                .iter()
                .map(|a| PrecommitEntry {
                    cellar_id: a.cellar.id.clone(),
                    hash: a.commitment_hash(&signer),
                })
                .collect(),
        }
    }

    /// Stateless checks.
    pub fn validate_basic(&self) -> Result<()> {
        if self.precommits.is_empty() {
            return Err(OracleError::invalid_message("precommit message is empty"));
        }
        let mut seen = BTreeSet::new();
        for entry in &self.precommits {
            check_cellar_id(&entry.cellar_id)?;
            if !seen.insert(entry.cellar_id.as_str()) {
                return Err(duplicate(&entry.cellar_id));
            }
        }
        Ok(())
    }
}

/// Batch of reveals from one validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgAllocationCommit {
    /// Submitting validator
    pub signer: ValidatorAddress,
    /// Revealed allocations, one per cellar
    pub commits: Vec<Allocation>,
}

impl MsgAllocationCommit {
    /// Reveal the given allocations.
    pub fn new(signer: ValidatorAddress, commits: Vec<Allocation>) -> Self {
        Self { signer, commits }
    }

    /// Stateless checks.
    pub fn validate_basic(&self) -> Result<()> {
        if self.commits.is_empty() {
            return Err(OracleError::invalid_message("commit message is empty"));
        }
        let mut seen = BTreeSet::new();
        for allocation in &self.commits {
            check_cellar_id(allocation.cellar_id())?;
            if !seen.insert(allocation.cellar_id()) {
                return Err(duplicate(allocation.cellar_id()));
            }
            if allocation.salt.len() > MAX_SALT_LEN {
                return Err(OracleError::invalid_message(format!(
                    "salt for cellar {} exceeds {MAX_SALT_LEN} bytes",
                    allocation.cellar_id()
                )));
            }
            if allocation.cellar.tick_ranges.len() > MAX_TICK_RANGES {
                return Err(OracleError::invalid_message(format!(
                    "cellar {} carries more than {MAX_TICK_RANGES} tick ranges",
                    allocation.cellar_id()
                )));
            }
            allocation.validate()?;
        }
        Ok(())
    }
}

fn check_cellar_id(cellar_id: &str) -> Result<()> {
    if cellar_id.trim().is_empty() {
        return Err(OracleError::invalid_message("cellar id cannot be empty"));
    }
    if cellar_id.len() > MAX_CELLAR_ID_LEN {
        return Err(OracleError::invalid_message(format!(
            "cellar id exceeds {MAX_CELLAR_ID_LEN} bytes"
        )));
    }
    Ok(())
}

fn duplicate(cellar_id: &str) -> OracleError {
    OracleError::invalid_message(format!("cellar {cellar_id} appears more than once"))
}
