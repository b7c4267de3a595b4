//! All-or-nothing write overlay
//!
//! A [`StoreTransaction`] buffers writes and deletes on top of a parent store.
//! Reads see the buffered state. Nothing reaches the parent until
//! [`StoreTransaction::commit`]; dropping the transaction discards it.

use std::collections::BTreeMap;
use std::ops::Bound;

use cellar_core::Result;

use super::OracleStore;

/// Buffered view over a parent store.
pub struct StoreTransaction<'a> {
    parent: &'a mut dyn OracleStore,
    // `None` marks a pending delete.
    pending: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl<'a> StoreTransaction<'a> {
    /// Open a transaction over `parent`.
    pub fn new(parent: &'a mut dyn OracleStore) -> Self {
        Self {
            parent,
            pending: BTreeMap::new(),
        }
    }

    /// Number of buffered operations.
    pub fn pending_ops(&self) -> usize {
        self.pending.len()
    }

    /// Flush buffered operations to the parent in key order.
    pub fn commit(self) -> Result<()> {
        let StoreTransaction { parent, pending } = self;
        for (key, value) in pending {
            match value {
                Some(value) => parent.set(&key, value)?,
                None => {
                    parent.delete(&key)?;
                }
            }
        }
        Ok(())
    }
}

impl OracleStore for StoreTransaction<'_> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        match self.pending.get(key) {
            Some(value) => Ok(value.clone()),
            None => self.parent.get(key),
        }
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>) -> Result<()> {
        self.pending.insert(key.to_vec(), Some(value));
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<bool> {
        let existed = self.get(key)?.is_some();
        self.pending.insert(key.to_vec(), None);
        Ok(existed)
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> =
            self.parent.scan_prefix(prefix)?.into_iter().collect();
        for (key, value) in self
            .pending
            .range::<[u8], _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(prefix))
        {
            match value {
                Some(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }
        Ok(merged.into_iter().collect())
    }
}
