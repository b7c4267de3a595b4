//! Commit ledger
//!
//! Stores one revealed allocation per (validator, cellar) per vote period.
//! A reveal is accepted only when it hashes to the validator's precommit for
//! the same cellar in the same period, so every allocation that reaches
//! aggregation was bound before anyone could see it.

use cellar_core::{
    Allocation, Commit, Height, OracleError, OracleParams, Phase, Result, ValidatorAddress,
    VotePeriod,
};
use tracing::{debug, warn};

use super::precommit::{describe, get_precommit};
use crate::context::Context;
use crate::events::OracleEvent;
use crate::store::{self, keys, OracleStore};

/// Accept a reveal of `allocation` from `validator` at `height`.
///
/// Checks, in order: reveal phase, matching precommit exists, digest
/// matches, no earlier commit for the same key this period.
pub fn submit_commit(
    ctx: &mut Context<'_>,
    params: &OracleParams,
    period: &VotePeriod,
    validator: ValidatorAddress,
    allocation: Allocation,
    height: Height,
) -> Result<Commit> {
    match period.phase_at(height, params.precommit_share) {
        Some(Phase::Reveal) => {}
        other => {
            return Err(OracleError::invalid_phase(format!(
                "commit at height {height} falls in {} of {period}",
                describe(other)
            )))
        }
    }

    let cellar_id = allocation.cellar_id().to_string();
    let precommit = get_precommit(ctx.store, period.start_height, &validator, &cellar_id)?
        .ok_or_else(|| OracleError::NoPrecommit {
            validator: validator.to_string(),
            cellar_id: cellar_id.clone(),
        })?;

    let revealed = allocation.commitment_hash(&validator);
    if revealed != precommit.hash {
        warn!(
            validator = %validator,
            cellar_id = %cellar_id,
            expected = %precommit.hash,
            actual = %revealed,
            "reveal does not match precommit"
        );
        return Err(OracleError::HashMismatch {
            cellar_id,
            expected: precommit.hash.to_string(),
            actual: revealed.to_string(),
        });
    }

    let key = keys::commit_key(period.start_height, &validator, &cellar_id);
    if ctx.store.has(&key)? {
        return Err(OracleError::DuplicateCommit {
            validator: validator.to_string(),
            cellar_id,
        });
    }

    let commit = Commit {
        validator,
        cellar_id: cellar_id.clone(),
        allocation,
        height,
    };
    store::set_typed(ctx.store, &key, &commit)?;

    debug!(validator = %validator, cellar_id = %cellar_id, height, "commit accepted");
    ctx.emit(OracleEvent::CommitAccepted {
        validator,
        cellar_id,
        height,
    });
    Ok(commit)
}

/// Commit of `validator` for `cellar_id` in the period starting at `period_start`.
pub fn get_commit(
    store: &dyn OracleStore,
    period_start: Height,
    validator: &ValidatorAddress,
    cellar_id: &str,
) -> Result<Option<Commit>> {
    store::get_typed(store, &keys::commit_key(period_start, validator, cellar_id))
}

/// Every commit of the period, ordered by validator then cellar id.
pub fn commits_in_period(store: &dyn OracleStore, period_start: Height) -> Result<Vec<Commit>> {
    store::scan_typed(store, &keys::commit_period_prefix(period_start))
}

/// Commits of the period for one cellar, ordered by validator.
pub fn commits_for_cellar(
    store: &dyn OracleStore,
    period_start: Height,
    cellar_id: &str,
) -> Result<Vec<Commit>> {
    Ok(commits_in_period(store, period_start)?
        .into_iter()
        .filter(|commit| commit.cellar_id == cellar_id)
        .collect())
}

/// Remove the period's commits, optionally only those for one cellar.
pub fn clear_commits(
    store: &mut dyn OracleStore,
    period_start: Height,
    cellar_id: Option<&str>,
) -> Result<usize> {
    match cellar_id {
        None => store::delete_prefix(store, &keys::commit_period_prefix(period_start)),
        Some(cellar_id) => {
            let mut removed = 0;
            for commit in commits_for_cellar(store, period_start, cellar_id)? {
                let key = keys::commit_key(period_start, &commit.validator, cellar_id);
                if store.delete(&key)? {
                    removed += 1;
                }
            }
            Ok(removed)
        }
    }
}
