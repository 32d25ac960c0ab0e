//! Key-value persistence contract.
//!
//! The host environment supplies get/set/remove over string blobs scoped to
//! the current session. When no host store is available the core degrades to
//! `MemoryStore` — same contract, no durability. Callers treat every
//! `StorageError` as survivable: log it and keep going against memory.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::StorageError;

/// The persistence collaborator: string blobs keyed by string.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> std::result::Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> std::result::Result<(), StorageError>;
    fn remove(&self, key: &str) -> std::result::Result<(), StorageError>;
}

/// In-memory implementation — the graceful-degradation target and the
/// default for tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> std::result::Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StorageError::Unavailable("store lock poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> std::result::Result<(), StorageError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StorageError::Unavailable("store lock poisoned".into()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> std::result::Result<(), StorageError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StorageError::Unavailable("store lock poisoned".into()))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove_roundtrip() {
        let store = MemoryStore::new();
        store.set("conversation:abc", "{}").unwrap();
        assert_eq!(store.get("conversation:abc").unwrap().as_deref(), Some("{}"));

        store.remove("conversation:abc").unwrap();
        assert_eq!(store.get("conversation:abc").unwrap(), None);
    }

    #[test]
    fn get_missing_key_is_none_not_error() {
        let store = MemoryStore::new();
        assert!(store.get("nope").unwrap().is_none());
    }
}
