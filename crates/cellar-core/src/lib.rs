#![deny(clippy::dbg_macro)]
#![deny(clippy::todo)]
//! # Cellar Core - Allocation Oracle Foundation
//!
//! Shared, effect-free building blocks for the cellar allocation oracle.
//!
//! ## Contents
//!
//! - **types**: Tick ranges, cellars, allocations, ledger records, vote periods
//! - **hash**: SHA-256 digest and the `Hash32` type
//! - **commitment**: Canonical commitment encoding and hashing
//! - **params**: Oracle parameters, TOML loading and validation
//! - **interfaces**: Voting power and cellar registry collaborators
//! - **errors**: Unified `OracleError` taxonomy with stable codes
//!
//! Nothing in this crate reads the clock, draws randomness or iterates a hash
//! map, so every function is safe to call from replicated state transitions.

pub mod commitment;
pub mod errors;
pub mod hash;
pub mod interfaces;
pub mod params;
pub mod types;

pub use commitment::{canonical_bytes, commitment_hash};
pub use errors::{OracleError, Result};
pub use hash::Hash32;
pub use interfaces::{CellarRegistry, VotingPowerTable};
pub use params::{OracleParams, ParamsValidationError, Ratio};
pub use types::{
    phase, Allocation, Cellar, Commit, Height, Phase, Precommit, TickRange, ValidatorAddress,
    VotePeriod,
};
