//! Block-driving harness
//!
//! Owns an in-memory store, a power table, a registry and an
//! [`AllocationModule`], and plays the host chain: one `begin_block` per
//! height, messages delivered at the current height.

use std::collections::{BTreeMap, BTreeSet};

use cellar_core::{Allocation, Cellar, Height, OracleParams, ValidatorAddress, VotePeriod};
use cellar_oracle::schedule::load_period;
use cellar_oracle::{
    query, AllocationModule, Context, GenesisState, MemoryStore, MsgAllocationCommit,
    MsgAllocationPrecommit, OracleEvent, PeriodReport, TxResult,
};

use crate::fixtures::{equal_powers, registry};

/// Height at which harness genesis runs.
pub const GENESIS_HEIGHT: Height = 1;

/// A single simulated chain running the oracle.
pub struct OracleHarness {
    /// Module state
    pub store: MemoryStore,
    /// Voting power table
    pub powers: BTreeMap<ValidatorAddress, u64>,
    /// Registered cellar ids
    pub cellars: BTreeSet<String>,
    module: AllocationModule,
    height: Height,
    events: Vec<OracleEvent>,
}

impl OracleHarness {
    /// Harness with default params, the given powers and registry.
    pub fn new(powers: BTreeMap<ValidatorAddress, u64>, cellar_ids: &[&str]) -> Self {
        Self::with_genesis(GenesisState::default(), powers, cellar_ids)
    }

    /// Harness where every validator has weight 1.
    pub fn equal_power(validators: &[ValidatorAddress], cellar_ids: &[&str]) -> Self {
        Self::new(equal_powers(validators), cellar_ids)
    }

    /// Harness with custom params.
    pub fn with_params(
        params: OracleParams,
        powers: BTreeMap<ValidatorAddress, u64>,
        cellar_ids: &[&str],
    ) -> Self {
        let genesis = GenesisState {
            params,
            cellars: Vec::new(),
        };
        Self::with_genesis(genesis, powers, cellar_ids)
    }

    /// Harness initialized from `genesis` at [`GENESIS_HEIGHT`].
    pub fn with_genesis(
        genesis: GenesisState,
        powers: BTreeMap<ValidatorAddress, u64>,
        cellar_ids: &[&str],
    ) -> Self {
        let module = AllocationModule::new();
        let mut harness = Self {
            store: MemoryStore::new(),
            powers,
            cellars: registry(cellar_ids),
            module,
            height: GENESIS_HEIGHT,
            events: Vec::new(),
        };
        let mut ctx = Context::new(&mut harness.store, &harness.powers, &harness.cellars);
        module.init_genesis(&mut ctx, &genesis, GENESIS_HEIGHT).unwrap();
        harness.events.extend(ctx.events.take());
        harness
    }

    /// Latest height.
    pub fn height(&self) -> Height {
        self.height
    }

    /// Current vote period.
    pub fn period(&self) -> VotePeriod {
        load_period(&self.store).unwrap().unwrap()
    }

    /// Parameters stored at genesis.
    pub fn params(&self) -> OracleParams {
        query::params(&self.store).unwrap()
    }

    /// Every event emitted so far.
    pub fn events(&self) -> &[OracleEvent] {
        &self.events
    }

    /// Events of one kind.
    pub fn events_of(&self, kind: &str) -> Vec<&OracleEvent> {
        self.events.iter().filter(|e| e.kind() == kind).collect()
    }

    /// Run `begin_block` at `height` without touching the harness height.
    ///
    /// Used to exercise out-of-order notifications.
    pub fn begin_block_at(&mut self, height: Height) -> Option<PeriodReport> {
        let mut ctx = Context::new(&mut self.store, &self.powers, &self.cellars);
        let report = self.module.begin_block(&mut ctx, height).unwrap();
        self.events.extend(ctx.events.take());
        report
    }

    /// Advance one block.
    pub fn next_block(&mut self) -> Option<PeriodReport> {
        self.height += 1;
        self.begin_block_at(self.height)
    }

    /// Advance block by block until `height`, collecting rollovers.
    pub fn advance_to(&mut self, height: Height) -> Vec<PeriodReport> {
        let mut reports = Vec::new();
        while self.height < height {
            reports.extend(self.next_block());
        }
        reports
    }

    /// Advance to the first reveal height of the current period.
    pub fn advance_to_reveal(&mut self) {
        let reveal = self.period().reveal_start(self.params().precommit_share);
        self.advance_to(reveal);
    }

    /// Advance past the end of the current period and return its report.
    pub fn finish_period(&mut self) -> PeriodReport {
        let end = self.period().end_height;
        let mut reports = self.advance_to(end + 1);
        assert_eq!(reports.len(), 1, "expected exactly one rollover");
        reports.remove(0)
    }

    /// Deliver a precommit message for `allocations` from `validator`.
    pub fn precommit(&mut self, validator: ValidatorAddress, allocations: &[Allocation]) -> TxResult {
        let msg = MsgAllocationPrecommit::from_allocations(allocations, validator);
        self.deliver_precommit(&msg)
    }

    /// Deliver an arbitrary precommit message.
    pub fn deliver_precommit(&mut self, msg: &MsgAllocationPrecommit) -> TxResult {
        let mut ctx = Context::new(&mut self.store, &self.powers, &self.cellars);
        let result = self.module.deliver_precommit(&mut ctx, msg);
        self.events.extend(ctx.events.take());
        result
    }

    /// Deliver a commit message revealing `allocations` from `validator`.
    pub fn commit(&mut self, validator: ValidatorAddress, allocations: &[Allocation]) -> TxResult {
        let msg = MsgAllocationCommit::new(validator, allocations.to_vec());
        let mut ctx = Context::new(&mut self.store, &self.powers, &self.cellars);
        let result = self.module.deliver_commit(&mut ctx, &msg);
        self.events.extend(ctx.events.take());
        result
    }

    /// Play one full period from the precommit phase.
    ///
    /// Every voter precommits, the chain moves to the reveal phase, every
    /// voter reveals, and the period is closed.
    pub fn run_round(&mut self, votes: &[(ValidatorAddress, Vec<Allocation>)]) -> PeriodReport {
        for (validator, allocations) in votes {
            let result = self.precommit(*validator, allocations);
            assert!(result.is_ok(), "precommit from {validator} failed: {}", result.log);
        }
        self.advance_to_reveal();
        for (validator, allocations) in votes {
            let result = self.commit(*validator, allocations);
            assert!(result.is_ok(), "commit from {validator} failed: {}", result.log);
        }
        self.finish_period()
    }

    /// Published state of `cellar_id`.
    pub fn cellar(&self, cellar_id: &str) -> Option<Cellar> {
        query::cellar(&self.store, cellar_id).unwrap()
    }

    /// Exported genesis of the current state.
    pub fn export_genesis(&mut self) -> GenesisState {
        let ctx = Context::new(&mut self.store, &self.powers, &self.cellars);
        self.module.export_genesis(&ctx).unwrap()
    }
}
