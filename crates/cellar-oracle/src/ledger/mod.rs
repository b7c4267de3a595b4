//! Commitment ledgers
//!
//! - **precommit**: hash-only commitments, accepted in the precommit phase
//! - **commit**: revealed allocations, accepted in the reveal phase when they
//!   match a precommit
//!
//! Both ledgers are keyed by `(period_start, validator, cellar_id)`, so a
//! record from one period can never satisfy a lookup in another.

pub mod commit;
pub mod precommit;

pub use commit::{
    clear_commits, commits_for_cellar, commits_in_period, get_commit, submit_commit,
};
pub use precommit::{clear_precommits, get_precommit, precommits_in_period, submit_precommit};
