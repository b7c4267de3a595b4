//! Property test strategies for oracle types
//!
//! Every strategy produces well-formed values: ranges have `upper > lower`,
//! cellar ids and salts are non-empty.

use proptest::prelude::*;

// Re-export proptest for convenience
pub use proptest;

use cellar_core::{Allocation, Cellar, TickRange, ValidatorAddress};

/// Arbitrary validator address.
pub fn arb_validator() -> impl Strategy<Value = ValidatorAddress> {
    any::<[u8; 20]>().prop_map(ValidatorAddress::new)
}

/// Well-formed tick range.
pub fn arb_tick_range() -> impl Strategy<Value = TickRange> {
    (0u64..1_000_000, 1u64..10_000, 0u64..1_000)
        .prop_map(|(lower, span, weight)| TickRange::new(lower + span, lower, weight))
}

/// Cellar id drawn from a small alphabet so collisions across draws happen.
pub fn arb_cellar_id() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,12}"
}

/// Well-formed cellar with up to `max_ranges` ranges.
pub fn arb_cellar(max_ranges: usize) -> impl Strategy<Value = Cellar> {
    (
        arb_cellar_id(),
        prop::collection::vec(arb_tick_range(), 0..=max_ranges),
    )
        .prop_map(|(id, ranges)| Cellar::new(id, ranges))
}

/// Non-empty salt.
pub fn arb_salt() -> impl Strategy<Value = String> {
    "[A-Za-z0-9]{1,32}"
}

/// Well-formed allocation.
pub fn arb_allocation() -> impl Strategy<Value = Allocation> {
    (arb_cellar(8), arb_salt()).prop_map(|(cellar, salt)| Allocation::new(cellar, salt))
}
