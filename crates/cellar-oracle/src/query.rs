//! Read-only query surface
//!
//! Responses are serde types so a host can hand them out as JSON unchanged.

use cellar_core::{
    Cellar, Commit, Height, OracleError, OracleParams, Phase, Precommit, Result, ValidatorAddress,
};
use serde::{Deserialize, Serialize};

use crate::genesis;
use crate::ledger;
use crate::publish;
use crate::schedule::load_period;
use crate::store::OracleStore;

/// Current vote period and phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitPeriodResponse {
    /// Latest height seen
    pub current_height: Height,
    /// First height of the period
    pub vote_period_start: Height,
    /// Last height of the period
    pub vote_period_end: Height,
    /// Phase at `current_height`
    pub phase: Option<Phase>,
}

/// Stored parameters.
pub fn params(store: &dyn OracleStore) -> Result<OracleParams> {
    genesis::load_params(store)
}

/// Period bounds, current height and phase.
pub fn commit_period(store: &dyn OracleStore) -> Result<CommitPeriodResponse> {
    let params = params(store)?;
    let period =
        load_period(store)?.ok_or_else(|| OracleError::store("vote period missing from store"))?;
    Ok(CommitPeriodResponse {
        current_height: period.current_height,
        vote_period_start: period.start_height,
        vote_period_end: period.end_height,
        phase: period.phase_at(period.current_height, params.precommit_share),
    })
}

fn current_start(store: &dyn OracleStore) -> Result<Height> {
    load_period(store)?
        .map(|p| p.start_height)
        .ok_or_else(|| OracleError::store("vote period missing from store"))
}

/// Precommit of `validator` for `cellar_id` in the current period.
pub fn allocation_precommit(
    store: &dyn OracleStore,
    validator: &ValidatorAddress,
    cellar_id: &str,
) -> Result<Option<Precommit>> {
    ledger::get_precommit(store, current_start(store)?, validator, cellar_id)
}

/// Every precommit of the current period.
pub fn allocation_precommits(store: &dyn OracleStore) -> Result<Vec<Precommit>> {
    ledger::precommits_in_period(store, current_start(store)?)
}

/// Commit of `validator` for `cellar_id` in the current period.
pub fn allocation_commit(
    store: &dyn OracleStore,
    validator: &ValidatorAddress,
    cellar_id: &str,
) -> Result<Option<Commit>> {
    ledger::get_commit(store, current_start(store)?, validator, cellar_id)
}

/// Every commit of the current period.
pub fn allocation_commits(store: &dyn OracleStore) -> Result<Vec<Commit>> {
    ledger::commits_in_period(store, current_start(store)?)
}

/// Latest published state of every cellar.
pub fn cellars(store: &dyn OracleStore) -> Result<Vec<Cellar>> {
    publish::all_cellars(store)
}

/// Latest published state of `cellar_id`.
pub fn cellar(store: &dyn OracleStore, cellar_id: &str) -> Result<Option<Cellar>> {
    publish::get_cellar(store, cellar_id)
}
