//! Cellar Oracle Testing Infrastructure
//!
//! Shared fixtures, a block-driving harness and proptest strategies for the
//! oracle crates. Used as a dev-dependency only.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! ```rust,no_run
//! use cellar_testkit::*;
//!
//! let validators = four_validators();
//! let mut harness = OracleHarness::equal_power(&validators, &[TEST_CELLAR_ID]);
//! let votes: Vec<_> = validators.iter().map(|v| (*v, vec![test_allocation()])).collect();
//! let report = harness.run_round(&votes);
//! assert_eq!(report.published, [TEST_CELLAR_ID]);
//! ```

pub mod fixtures;
pub mod harness;
pub mod logging;
pub mod sampling;
pub mod strategies;

pub use fixtures::*;
pub use harness::OracleHarness;
pub use logging::init_test_tracing;
pub use sampling::random_submissions;
