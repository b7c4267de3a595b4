//! Precommit ledger
//!
//! Stores one hash commitment per (validator, cellar) per vote period.
//! Accepted precommits are immutable: a second submission for the same key in
//! the same period is rejected rather than overwriting the first.

use cellar_core::{
    Hash32, Height, OracleError, OracleParams, Phase, Precommit, Result, ValidatorAddress,
    VotePeriod,
};
use tracing::debug;

use crate::context::Context;
use crate::events::OracleEvent;
use crate::store::{self, keys, OracleStore};

/// Accept a precommit for `(validator, cellar_id)` at `height`.
///
/// Checks, in order: precommit phase, registered cellar, no earlier
/// precommit for the same key this period.
pub fn submit_precommit(
    ctx: &mut Context<'_>,
    params: &OracleParams,
    period: &VotePeriod,
    validator: ValidatorAddress,
    cellar_id: &str,
    hash: Hash32,
    height: Height,
) -> Result<Precommit> {
    match period.phase_at(height, params.precommit_share) {
        Some(Phase::Precommit) => {}
        other => {
            return Err(OracleError::invalid_phase(format!(
                "precommit at height {height} falls in {} of {period}",
                describe(other)
            )))
        }
    }

    if !ctx.cellars.exists(cellar_id) {
        return Err(OracleError::unknown_cellar(cellar_id));
    }

    let key = keys::precommit_key(period.start_height, &validator, cellar_id);
    if ctx.store.has(&key)? {
        return Err(OracleError::DuplicatePrecommit {
            validator: validator.to_string(),
            cellar_id: cellar_id.to_string(),
        });
    }

    let precommit = Precommit {
        validator,
        cellar_id: cellar_id.to_string(),
        hash,
        height,
    };
    store::set_typed(ctx.store, &key, &precommit)?;

    debug!(
        validator = %validator,
        cellar_id,
        hash = %hash,
        height,
        "precommit accepted"
    );
    ctx.emit(OracleEvent::PrecommitAccepted {
        validator,
        cellar_id: cellar_id.to_string(),
        hash,
        height,
    });
    Ok(precommit)
}

/// Precommit of `validator` for `cellar_id` in the period starting at `period_start`.
pub fn get_precommit(
    store: &dyn OracleStore,
    period_start: Height,
    validator: &ValidatorAddress,
    cellar_id: &str,
) -> Result<Option<Precommit>> {
    store::get_typed(store, &keys::precommit_key(period_start, validator, cellar_id))
}

/// Every precommit of the period, ordered by validator then cellar id.
pub fn precommits_in_period(store: &dyn OracleStore, period_start: Height) -> Result<Vec<Precommit>> {
    store::scan_typed(store, &keys::precommit_period_prefix(period_start))
}

/// Remove the period's precommits, optionally only those for one cellar.
pub fn clear_precommits(
    store: &mut dyn OracleStore,
    period_start: Height,
    cellar_id: Option<&str>,
) -> Result<usize> {
    match cellar_id {
        None => store::delete_prefix(store, &keys::precommit_period_prefix(period_start)),
        Some(cellar_id) => {
            let mut removed = 0;
            for precommit in precommits_in_period(store, period_start)? {
                if precommit.cellar_id == cellar_id {
                    let key = keys::precommit_key(period_start, &precommit.validator, cellar_id);
                    if store.delete(&key)? {
                        removed += 1;
                    }
                }
            }
            Ok(removed)
        }
    }
}

pub(crate) fn describe(phase: Option<Phase>) -> String {
    match phase {
        Some(phase) => format!("the {phase} phase"),
        None => "no phase".to_string(),
    }
}
