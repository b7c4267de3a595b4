#![deny(clippy::dbg_macro)]
#![deny(clippy::todo)]
//! # Cellar Oracle - Commit-Reveal Allocation Consensus
//!
//! Validators agree on the liquidity tick ranges of managed vaults
//! ("cellars") through a two-phase commit-reveal vote. Each vote period is
//! split by height into a precommit phase, where only digests are accepted,
//! and a reveal phase, where allocations are accepted if they hash to the
//! submitter's precommit. When a period ends the revealed allocations are
//! aggregated by power-weighted median and, given quorum, published as the
//! cellar's canonical state.
//!
//! ## Layout
//!
//! - **schedule**: height-driven period rollover
//! - **ledger**: precommit and commit ledgers
//! - **aggregate**: quorum gate and weighted-median aggregation
//! - **publish**: the single write path to canonical cellar state
//! - **module**: `begin_block` / `deliver_*` state-transition entry points
//! - **msgs**, **query**, **genesis**, **events**: host-chain surfaces
//! - **store**: the `OracleStore` boundary, in-memory store and overlay
//!
//! The crate is synchronous and single-threaded: the host calls it once per
//! block and once per message, passing an explicit [`Context`].

pub mod aggregate;
pub mod context;
pub mod events;
pub mod genesis;
pub mod ledger;
pub mod module;
pub mod msgs;
pub mod publish;
pub mod query;
pub mod schedule;
pub mod store;

pub use aggregate::{aggregate, weighted_median};
pub use context::Context;
pub use events::{EventLog, OracleEvent};
pub use genesis::GenesisState;
pub use module::{AllocationModule, PeriodReport, TxResult, CODE_OK};
pub use msgs::{MsgAllocationCommit, MsgAllocationPrecommit, PrecommitEntry};
pub use publish::publish;
pub use schedule::{advance, ScheduleStep};
pub use store::{MemoryStore, OracleStore, StoreTransaction};
