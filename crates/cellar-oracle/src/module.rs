//! Allocation module state-transition function
//!
//! The host chain drives the oracle through three entry points:
//!
//! - `begin_block` once per height, before any transaction
//! - `deliver_precommit` / `deliver_commit` once per message, in delivery order
//!
//! Every call receives an explicit [`Context`]; the module itself holds no
//! state.

use cellar_core::{Height, OracleError, OracleParams, Result, VotePeriod};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::aggregate::aggregate;
use crate::context::Context;
use crate::events::OracleEvent;
use crate::genesis::{self, GenesisState};
use crate::ledger::{clear_commits, clear_precommits, commits_for_cellar, submit_commit, submit_precommit};
use crate::msgs::{MsgAllocationCommit, MsgAllocationPrecommit};
use crate::publish::publish;
use crate::schedule::{advance, load_period, save_period};

/// Result code of a successful transaction.
pub const CODE_OK: u32 = 0;

/// Outcome of delivering one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxResult {
    /// `0` on success, otherwise [`OracleError::abci_code`]
    pub code: u32,
    /// Human-readable outcome
    pub log: String,
    /// Events produced by the message; empty on failure
    pub events: Vec<OracleEvent>,
    /// The failure, if any
    pub error: Option<OracleError>,
}

impl TxResult {
    fn ok(log: String, events: Vec<OracleEvent>) -> Self {
        Self {
            code: CODE_OK,
            log,
            events,
            error: None,
        }
    }

    fn err(error: OracleError) -> Self {
        Self {
            code: error.abci_code(),
            log: error.to_string(),
            events: Vec::new(),
            error: Some(error),
        }
    }

    /// Whether the message was applied.
    pub fn is_ok(&self) -> bool {
        self.code == CODE_OK
    }
}

/// What a rollover did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodReport {
    /// The period that closed
    pub ended: VotePeriod,
    /// The period that opened
    pub started: VotePeriod,
    /// Cellars whose aggregate was published, in id order
    pub published: Vec<String>,
    /// Cellars left unchanged, in id order
    pub failed: Vec<String>,
}

/// The cellar allocation oracle.
///
/// Stateless: parameters are read from the store on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocationModule;

impl AllocationModule {
    /// Build a module.
    pub fn new() -> Self {
        Self
    }

    /// Parameters written at genesis.
    pub fn params(&self, ctx: &Context<'_>) -> Result<OracleParams> {
        genesis::load_params(&*ctx.store)
    }

    /// Load `state` and open the first period at `height`.
    pub fn init_genesis(
        &self,
        ctx: &mut Context<'_>,
        state: &GenesisState,
        height: Height,
    ) -> Result<VotePeriod> {
        let period = genesis::init(ctx.store, state, height)?;
        ctx.emit(OracleEvent::PeriodStarted { period });
        Ok(period)
    }

    /// Current exportable state.
    pub fn export_genesis(&self, ctx: &Context<'_>) -> Result<GenesisState> {
        genesis::export(&*ctx.store)
    }

    /// Apply a height notification.
    ///
    /// On rollover the ended period is aggregated for every registered cellar,
    /// its ledgers are cleared and a report is returned. The rollover is
    /// all-or-nothing: on error neither the period nor the ledgers change and
    /// no event is kept.
    pub fn begin_block(&self, ctx: &mut Context<'_>, height: Height) -> Result<Option<PeriodReport>> {
        ctx.atomically(|tx| self.apply_height(tx, height))
    }

    fn apply_height(&self, ctx: &mut Context<'_>, height: Height) -> Result<Option<PeriodReport>> {
        let params = genesis::load_params(&*ctx.store)?;
        let period = current_period(ctx)?;
        let step = advance(&period, height, params.vote_period);
        if step.period != period {
            save_period(ctx.store, &step.period)?;
        }

        let Some(ended) = step.ended else {
            return Ok(None);
        };

        info!(
            start_height = ended.start_height,
            end_height = ended.end_height,
            height,
            "vote period ended"
        );
        ctx.emit(OracleEvent::PeriodEnded { period: ended });

        let (published, failed) = self.end_period(ctx, &params, &ended)?;

        ctx.emit(OracleEvent::PeriodStarted {
            period: step.period,
        });
        info!(
            start_height = step.period.start_height,
            end_height = step.period.end_height,
            "vote period started"
        );

        Ok(Some(PeriodReport {
            ended,
            started: step.period,
            published,
            failed,
        }))
    }

    fn end_period(
        &self,
        ctx: &mut Context<'_>,
        params: &OracleParams,
        ended: &VotePeriod,
    ) -> Result<(Vec<String>, Vec<String>)> {
        let start = ended.start_height;
        let mut published = Vec::new();
        let mut failed = Vec::new();

        for cellar_id in ctx.cellars.cellar_ids() {
            let commits = commits_for_cellar(ctx.store, start, &cellar_id)?;
            let outcome = aggregate(&cellar_id, &commits, ctx.powers, params)
                .and_then(|cellar| publish(ctx, start, cellar));

            match outcome {
                Ok(()) => published.push(cellar_id),
                Err(OracleError::QuorumNotReached {
                    cellar_id,
                    committed,
                    total,
                }) => {
                    if commits.is_empty() {
                        debug!(cellar_id = %cellar_id, period_start = start, "no commits for cellar");
                    } else {
                        warn!(
                            cellar_id = %cellar_id,
                            committed,
                            total,
                            period_start = start,
                            "quorum not reached, cellar unchanged"
                        );
                    }
                    ctx.emit(OracleEvent::QuorumNotReached {
                        cellar_id: cellar_id.clone(),
                        committed,
                        total,
                        period_start: start,
                    });
                    failed.push(cellar_id);
                }
                Err(err @ OracleError::InvalidMessage { .. }) => {
                    warn!(cellar_id = %cellar_id, error = %err, "aggregate rejected, cellar unchanged");
                    ctx.emit(OracleEvent::AggregateRejected {
                        cellar_id: cellar_id.clone(),
                        code: err.code().to_string(),
                        reason: err.to_string(),
                        period_start: start,
                    });
                    failed.push(cellar_id);
                }
                // Store and codec failures abort the whole rollover.
                Err(err) => return Err(err),
            }
        }

        let precommits = clear_precommits(ctx.store, start, None)?;
        let commits = clear_commits(ctx.store, start, None)?;
        debug!(
            period_start = start,
            cleared_precommits = precommits,
            cleared_commits = commits,
            "ledgers cleared"
        );
        Ok((published, failed))
    }

    /// Apply a batch of precommits atomically.
    pub fn deliver_precommit(&self, ctx: &mut Context<'_>, msg: &MsgAllocationPrecommit) -> TxResult {
        let before = ctx.events.len();
        let result = msg.validate_basic().and_then(|()| {
            let params = genesis::load_params(&*ctx.store)?;
            let period = current_period(ctx)?;
            ctx.atomically(|tx| {
                for entry in &msg.precommits {
                    submit_precommit(
                        tx,
                        &params,
                        &period,
                        msg.signer,
                        &entry.cellar_id,
                        entry.hash,
                        period.current_height,
                    )?;
                }
                Ok(msg.precommits.len())
            })
        });
        finish(ctx, before, "precommit", &msg.signer.to_string(), result)
    }

    /// Apply a batch of reveals atomically.
    pub fn deliver_commit(&self, ctx: &mut Context<'_>, msg: &MsgAllocationCommit) -> TxResult {
        let before = ctx.events.len();
        let result = msg.validate_basic().and_then(|()| {
            let params = genesis::load_params(&*ctx.store)?;
            let period = current_period(ctx)?;
            ctx.atomically(|tx| {
                for allocation in &msg.commits {
                    submit_commit(
                        tx,
                        &params,
                        &period,
                        msg.signer,
                        allocation.clone(),
                        period.current_height,
                    )?;
                }
                Ok(msg.commits.len())
            })
        });
        finish(ctx, before, "commit", &msg.signer.to_string(), result)
    }
}

fn current_period(ctx: &Context<'_>) -> Result<VotePeriod> {
    load_period(&*ctx.store)?.ok_or_else(|| OracleError::store("vote period missing from store"))
}

fn finish(
    ctx: &Context<'_>,
    before: usize,
    kind: &str,
    signer: &str,
    result: Result<usize>,
) -> TxResult {
    match result {
        Ok(count) => {
            debug!(signer, count, "{kind} message applied");
            TxResult::ok(
                format!("{count} {kind}(s) accepted"),
                ctx.events.events()[before..].to_vec(),
            )
        }
        Err(err) => {
            debug!(signer, code = err.code(), error = %err, "{kind} message rejected");
            TxResult::err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{self, keys, MemoryStore, OracleStore};
    use cellar_core::{Allocation, Cellar, Commit, Phase, Ratio, TickRange, ValidatorAddress};
    use std::collections::{BTreeMap, BTreeSet};

    fn validator(seed: u8) -> ValidatorAddress {
        ValidatorAddress::new([seed; 20])
    }

    fn allocation(id: &str) -> Allocation {
        Allocation::new(Cellar::new(id, vec![TickRange::new(200, 100, 10)]), "salt")
    }

    struct Chain {
        store: MemoryStore,
        powers: BTreeMap<ValidatorAddress, u64>,
        cellars: BTreeSet<String>,
        module: AllocationModule,
    }

    impl Chain {
        fn new() -> Self {
            Self::with_genesis(GenesisState::default())
        }

        fn with_genesis(state: GenesisState) -> Self {
            let mut chain = Self {
                store: MemoryStore::new(),
                powers: [(validator(1), 1)].into_iter().collect(),
                cellars: ["a".to_string(), "b".to_string()].into_iter().collect(),
                module: AllocationModule::new(),
            };
            let mut ctx = Context::new(&mut chain.store, &chain.powers, &chain.cellars);
            chain.module.init_genesis(&mut ctx, &state, 0).unwrap();
            chain
        }

        fn try_block(&mut self, height: Height) -> (Result<Option<PeriodReport>>, Vec<OracleEvent>) {
            let mut ctx = Context::new(&mut self.store, &self.powers, &self.cellars);
            let result = self.module.begin_block(&mut ctx, height);
            (result, ctx.events.take())
        }

        fn block(&mut self, height: Height) -> Option<PeriodReport> {
            self.try_block(height).0.unwrap()
        }

        fn precommit(&mut self, msg: &MsgAllocationPrecommit) -> TxResult {
            let mut ctx = Context::new(&mut self.store, &self.powers, &self.cellars);
            self.module.deliver_precommit(&mut ctx, msg)
        }

        fn commit(&mut self, msg: &MsgAllocationCommit) -> TxResult {
            let mut ctx = Context::new(&mut self.store, &self.powers, &self.cellars);
            self.module.deliver_commit(&mut ctx, msg)
        }
    }

    #[test]
    fn test_genesis_rejects_invalid_params() {
        let state = GenesisState {
            params: OracleParams {
                vote_period: 0,
                ..OracleParams::default()
            },
            ..GenesisState::default()
        };
        let mut mem = MemoryStore::new();
        let powers: BTreeMap<ValidatorAddress, u64> = BTreeMap::new();
        let cellars: BTreeSet<String> = BTreeSet::new();
        let mut ctx = Context::new(&mut mem, &powers, &cellars);
        assert!(matches!(
            AllocationModule::new().init_genesis(&mut ctx, &state, 0),
            Err(OracleError::InvalidParams { .. })
        ));
        assert!(ctx.events.is_empty());
    }

    #[test]
    fn test_single_validator_round() {
        let mut chain = Chain::new();
        let allocations = vec![allocation("a"), allocation("b")];

        chain.block(1);
        let res = chain.precommit(&MsgAllocationPrecommit::from_allocations(&allocations, validator(1)));
        assert!(res.is_ok(), "{}", res.log);
        assert_eq!(res.events.len(), 2);

        chain.block(5);
        let res = chain.commit(&MsgAllocationCommit::new(validator(1), allocations.clone()));
        assert!(res.is_ok(), "{}", res.log);

        for h in 6..=10 {
            assert!(chain.block(h).is_none());
        }
        let report = chain.block(11).unwrap();
        assert_eq!(report.published, ["a", "b"]);
        assert!(report.failed.is_empty());
        assert_eq!(report.started, VotePeriod::starting_at(11, 10));
        assert_eq!(
            crate::query::cellar(&chain.store, "a").unwrap(),
            Some(allocations[0].cellar.clone())
        );
        assert!(crate::ledger::commits_in_period(&chain.store, 0).unwrap().is_empty());
    }

    #[test]
    fn test_failed_entry_aborts_whole_message() {
        let mut chain = Chain::new();
        chain.block(1);

        let mut msg = MsgAllocationPrecommit::from_allocations(&[allocation("a")], validator(1));
        msg.precommits.push(crate::msgs::PrecommitEntry {
            cellar_id: "unregistered".to_string(),
            hash: allocation("a").commitment_hash(&validator(1)),
        });
        let res = chain.precommit(&msg);
        assert!(!res.is_ok());
        assert_eq!(res.code, OracleError::unknown_cellar("x").abci_code());
        assert!(res.events.is_empty());
        assert!(crate::ledger::precommits_in_period(&chain.store, 0).unwrap().is_empty());
    }

    #[test]
    fn test_empty_period_reports_every_cellar_failed() {
        let mut chain = Chain::new();
        let report = chain.block(11).unwrap();
        assert!(report.published.is_empty());
        assert_eq!(report.failed, ["a", "b"]);
    }

    #[test]
    fn test_rollover_with_unreadable_ledger_changes_nothing() {
        let mut chain = Chain::new();
        let allocations = vec![allocation("a"), allocation("b")];
        chain.block(1);
        assert!(chain
            .precommit(&MsgAllocationPrecommit::from_allocations(&allocations, validator(1)))
            .is_ok());
        chain.block(5);
        assert!(chain
            .commit(&MsgAllocationCommit::new(validator(1), allocations.clone()))
            .is_ok());
        chain.block(10);

        let garbage = keys::commit_key(0, &validator(9), "b");
        chain.store.set(&garbage, vec![0xff]).unwrap();
        let before = chain.store.clone();

        let (result, events) = chain.try_block(11);
        assert!(matches!(result, Err(OracleError::Codec { .. })));
        assert!(events.is_empty());
        assert_eq!(chain.store, before);
        assert_eq!(
            load_period(&chain.store).unwrap().map(|p| (p.start_height, p.current_height)),
            Some((0, 10))
        );
        assert!(chain.store.has(&keys::commit_key(0, &validator(1), "a")).unwrap());

        // Once the ledger is readable the same height rolls over.
        assert!(chain.store.delete(&garbage).unwrap());
        let report = chain.block(11).unwrap();
        assert_eq!(report.ended.start_height, 0);
        assert_eq!(report.published, ["a", "b"]);
        assert!(crate::ledger::commits_in_period(&chain.store, 0).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_aggregate_is_reported_and_cellar_kept() {
        let original = Cellar::new("a", vec![TickRange::new(50, 10, 1)]);
        let mut chain = Chain::with_genesis(GenesisState {
            cellars: vec![original.clone()],
            ..GenesisState::default()
        });

        // A ledger entry that never went through message validation.
        let inverted = Allocation::new(Cellar::new("a", vec![TickRange::new(100, 200, 1)]), "salt");
        let commit = Commit {
            validator: validator(1),
            cellar_id: "a".to_string(),
            allocation: inverted,
            height: 5,
        };
        store::set_typed(&mut chain.store, &keys::commit_key(0, &validator(1), "a"), &commit).unwrap();

        let (result, events) = chain.try_block(11);
        let report = result.unwrap().unwrap();
        assert!(report.published.is_empty());
        assert_eq!(report.failed, ["a", "b"]);
        assert_eq!(crate::query::cellar(&chain.store, "a").unwrap(), Some(original));
        assert!(crate::ledger::commits_in_period(&chain.store, 0).unwrap().is_empty());

        let rejected: Vec<_> = events.iter().filter(|e| e.kind() == "aggregate_rejected").collect();
        assert_eq!(rejected.len(), 1);
        assert!(matches!(
            rejected[0],
            OracleEvent::AggregateRejected { cellar_id, code, period_start: 0, .. }
                if cellar_id == "a" && code == "oracle_invalid_message"
        ));
    }

    #[test]
    fn test_restarted_module_follows_stored_params() {
        let params = OracleParams {
            precommit_share: Ratio::new(1, 5),
            ..OracleParams::default()
        };
        let mut chain = Chain::with_genesis(GenesisState {
            params: params.clone(),
            ..GenesisState::default()
        });
        chain.module = AllocationModule::new();
        chain.block(4);

        let response = crate::query::commit_period(&chain.store).unwrap();
        assert_eq!(response.phase, Some(Phase::Reveal));

        let res = chain.precommit(&MsgAllocationPrecommit::from_allocations(&[allocation("a")], validator(1)));
        assert!(matches!(res.error, Some(OracleError::InvalidPhase { .. })));

        let ctx = Context::new(&mut chain.store, &chain.powers, &chain.cellars);
        assert_eq!(chain.module.params(&ctx).unwrap(), params);
    }
}
