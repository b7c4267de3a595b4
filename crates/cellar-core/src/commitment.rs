//! Commitment codec
//!
//! Serializes an allocation and its submitter into a canonical byte string and
//! hashes it. The layout is fixed:
//!
//! ```text
//! "cellar-allocation/v1"
//! u32 BE len(id)   || id bytes
//! u32 BE count(tick_ranges)
//! per range:  u64 BE upper || u64 BE lower || u64 BE weight
//! u32 BE len(salt) || salt bytes
//! 20 validator address bytes
//! ```
//!
//! Every variable-length field is length-prefixed, so distinct inputs never
//! share an encoding.

use crate::hash::{hash, Hash32};
use crate::types::{Allocation, Cellar, ValidatorAddress};

/// Domain separation tag for allocation commitments.
pub const COMMITMENT_DOMAIN: &[u8] = b"cellar-allocation/v1";

/// Canonical bytes committed to by a precommit.
pub fn canonical_bytes(cellar: &Cellar, salt: &str, validator: &ValidatorAddress) -> Vec<u8> {
    let mut out = Vec::with_capacity(
        COMMITMENT_DOMAIN.len() + 12 + cellar.id.len() + salt.len() + 24 * cellar.tick_ranges.len() + 20,
    );
    out.extend_from_slice(COMMITMENT_DOMAIN);
    put_bytes(&mut out, cellar.id.as_bytes());
    put_len(&mut out, cellar.tick_ranges.len());
    for range in &cellar.tick_ranges {
        out.extend_from_slice(&range.upper.to_be_bytes());
        out.extend_from_slice(&range.lower.to_be_bytes());
        out.extend_from_slice(&range.weight.to_be_bytes());
    }
    put_bytes(&mut out, salt.as_bytes());
    out.extend_from_slice(validator.as_bytes());
    out
}

/// Commitment digest for `(cellar, salt, validator)`.
pub fn commitment_hash(cellar: &Cellar, salt: &str, validator: &ValidatorAddress) -> Hash32 {
    hash(&canonical_bytes(cellar, salt, validator))
}

impl Allocation {
    /// Commitment digest of this allocation for `validator`.
    pub fn commitment_hash(&self, validator: &ValidatorAddress) -> Hash32 {
        commitment_hash(&self.cellar, &self.salt, validator)
    }
}

// Lengths above u32::MAX are saturated; inputs that large are rejected by
// message validation long before they reach the codec.
fn put_len(out: &mut Vec<u8>, len: usize) {
    let len = u32::try_from(len).unwrap_or(u32::MAX);
    out.extend_from_slice(&len.to_be_bytes());
}

fn put_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    put_len(out, bytes.len());
    out.extend_from_slice(bytes);
}
