//! In-memory store for testing and simulation

use std::collections::BTreeMap;
use std::ops::Bound;

use cellar_core::Result;

use super::OracleStore;

/// BTreeMap-backed [`OracleStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl OracleStore for MemoryStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.data.get(key).cloned())
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>) -> Result<()> {
        self.data.insert(key.to_vec(), value);
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<bool> {
        Ok(self.data.remove(key).is_some())
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        Ok(self
            .data
            .range::<[u8], _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_is_ordered_and_bounded() {
        let mut store = MemoryStore::new();
        store.set(b"p/b", vec![2]).unwrap();
        store.set(b"p/a", vec![1]).unwrap();
        store.set(b"q/a", vec![3]).unwrap();
        store.set(b"o/z", vec![0]).unwrap();

        let keys: Vec<Vec<u8>> = store
            .scan_prefix(b"p/")
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec![b"p/a".to_vec(), b"p/b".to_vec()]);
    }

    #[test]
    fn test_delete_reports_presence() {
        let mut store = MemoryStore::new();
        store.set(b"k", vec![1]).unwrap();
        assert!(store.delete(b"k").unwrap());
        assert!(!store.delete(b"k").unwrap());
        assert!(store.is_empty());
    }
}
