//! Persistent store boundary
//!
//! The oracle keeps all of its state behind [`OracleStore`], a synchronous
//! byte-keyed map supplied by the host chain. Values are bincode-encoded
//! serde types; keys are built only through [`keys`].
//!
//! - [`MemoryStore`]: BTreeMap-backed store for tests and simulation
//! - [`StoreTransaction`]: write overlay that is flushed only on success

pub mod keys;
pub mod memory;
pub mod transaction;

pub use memory::MemoryStore;
pub use transaction::StoreTransaction;

use cellar_core::{OracleError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Key-value store operations consumed by the oracle.
///
/// Implementations must return `scan_prefix` results in ascending key order;
/// aggregation relies on it for deterministic iteration.
pub trait OracleStore {
    /// Read the value at `key`.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Write `value` at `key`, replacing any previous value.
    fn set(&mut self, key: &[u8], value: Vec<u8>) -> Result<()>;

    /// Remove `key`; returns whether it existed.
    fn delete(&mut self, key: &[u8]) -> Result<bool>;

    /// All entries whose key starts with `prefix`, in ascending key order.
    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>>;

    /// Whether `key` holds a value.
    fn has(&self, key: &[u8]) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// Encode a value for storage.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    bincode::serialize(value).map_err(|e| OracleError::codec(format!("encode failed: {e}")))
}

/// Decode a stored value.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    bincode::deserialize(bytes).map_err(|e| OracleError::codec(format!("decode failed: {e}")))
}

/// Read and decode the value at `key`.
pub fn get_typed<T: DeserializeOwned>(store: &dyn OracleStore, key: &[u8]) -> Result<Option<T>> {
    store.get(key)?.map(|bytes| decode(&bytes)).transpose()
}

/// Encode and write `value` at `key`.
pub fn set_typed<T: Serialize>(store: &mut dyn OracleStore, key: &[u8], value: &T) -> Result<()> {
    let bytes = encode(value)?;
    store.set(key, bytes)
}

/// Decode every value under `prefix`, in key order.
pub fn scan_typed<T: DeserializeOwned>(store: &dyn OracleStore, prefix: &[u8]) -> Result<Vec<T>> {
    store
        .scan_prefix(prefix)?
        .iter()
        .map(|(_, bytes)| decode(bytes))
        .collect()
}

/// Delete every key under `prefix`; returns how many were removed.
pub fn delete_prefix(store: &mut dyn OracleStore, prefix: &[u8]) -> Result<usize> {
    let keys: Vec<Vec<u8>> = store
        .scan_prefix(prefix)?
        .into_iter()
        .map(|(key, _)| key)
        .collect();
    let mut removed = 0;
    for key in keys {
        if store.delete(&key)? {
            removed += 1;
        }
    }
    Ok(removed)
}
