//! Rebalance publisher
//!
//! The only write path to canonical cellar state. Publishing replaces the
//! stored tick ranges of a cellar and clears that cellar's ledger entries for
//! the period that produced them.

use cellar_core::{Cellar, Height, Result};
use tracing::info;

use crate::context::Context;
use crate::events::OracleEvent;
use crate::ledger::{clear_commits, clear_precommits};
use crate::store::{self, keys, OracleStore};

/// Make `cellar` canonical as the outcome of the period at `period_start`.
pub fn publish(ctx: &mut Context<'_>, period_start: Height, cellar: Cellar) -> Result<()> {
    cellar.validate()?;
    write_cellar(ctx.store, &cellar)?;

    let precommits = clear_precommits(ctx.store, period_start, Some(&cellar.id))?;
    let commits = clear_commits(ctx.store, period_start, Some(&cellar.id))?;

    info!(
        cellar_id = %cellar.id,
        period_start,
        tick_ranges = cellar.tick_ranges.len(),
        cleared_precommits = precommits,
        cleared_commits = commits,
        "rebalance published"
    );
    ctx.emit(OracleEvent::RebalancePublished {
        tick_ranges: cellar.tick_ranges.len(),
        cellar_id: cellar.id,
        period_start,
    });
    Ok(())
}

/// Store `cellar` as canonical without touching the ledgers.
///
/// Used by genesis; block processing goes through [`publish`].
pub(crate) fn write_cellar(store: &mut dyn OracleStore, cellar: &Cellar) -> Result<()> {
    store::set_typed(store, &keys::cellar_key(&cellar.id), cellar)
}

/// Canonical state of `cellar_id`.
pub fn get_cellar(store: &dyn OracleStore, cellar_id: &str) -> Result<Option<Cellar>> {
    store::get_typed(store, &keys::cellar_key(cellar_id))
}

/// Every canonical cellar, ordered by id.
pub fn all_cellars(store: &dyn OracleStore) -> Result<Vec<Cellar>> {
    store::scan_typed(store, &keys::cellar_prefix())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{commits_in_period, precommits_in_period};
    use crate::store::MemoryStore;
    use cellar_core::{
        Allocation, Commit, Hash32, OracleError, Precommit, TickRange, ValidatorAddress,
    };
    use std::collections::{BTreeMap, BTreeSet};

    fn seed_ledgers(mem: &mut MemoryStore, cellar_id: &str) {
        let validator = ValidatorAddress::new([1; 20]);
        let precommit = Precommit {
            validator,
            cellar_id: cellar_id.to_string(),
            hash: Hash32([0; 32]),
            height: 1,
        };
        store::set_typed(mem, &keys::precommit_key(0, &validator, cellar_id), &precommit).unwrap();
        let commit = Commit {
            validator,
            cellar_id: cellar_id.to_string(),
            allocation: Allocation::new(Cellar::new(cellar_id, vec![]), "s"),
            height: 6,
        };
        store::set_typed(mem, &keys::commit_key(0, &validator, cellar_id), &commit).unwrap();
    }

    #[test]
    fn test_publish_overwrites_and_clears_cellar_entries() {
        let mut mem = MemoryStore::new();
        seed_ledgers(&mut mem, "a");
        seed_ledgers(&mut mem, "b");
        write_cellar(&mut mem, &Cellar::new("a", vec![TickRange::new(2, 1, 1)])).unwrap();

        let powers: BTreeMap<ValidatorAddress, u64> = BTreeMap::new();
        let cellars: BTreeSet<String> = BTreeSet::new();
        let mut ctx = Context::new(&mut mem, &powers, &cellars);
        let updated = Cellar::new("a", vec![TickRange::new(9, 3, 4)]);
        publish(&mut ctx, 0, updated.clone()).unwrap();
        assert_eq!(ctx.events.of_kind("rebalance_published").count(), 1);

        assert_eq!(get_cellar(&mem, "a").unwrap(), Some(updated));
        let left: Vec<_> = precommits_in_period(&mem, 0).unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].cellar_id, "b");
        assert_eq!(commits_in_period(&mem, 0).unwrap().len(), 1);
    }

    #[test]
    fn test_publish_rejects_malformed_cellar() {
        let mut mem = MemoryStore::new();
        let powers: BTreeMap<ValidatorAddress, u64> = BTreeMap::new();
        let cellars: BTreeSet<String> = BTreeSet::new();
        let mut ctx = Context::new(&mut mem, &powers, &cellars);

        let err = publish(&mut ctx, 0, Cellar::new("a", vec![TickRange::new(1, 1, 1)])).unwrap_err();
        assert!(matches!(err, OracleError::InvalidMessage { .. }));
        assert!(all_cellars(ctx.store).unwrap().is_empty());
    }
}
