//! In-memory room backend for testing.

use crate::address::ContentAddress;
use crate::backend::{RoomBackend, StoredRoom};
use crate::error::{StoreError, StoreResult};
use parking_lot::RwLock;
use std::collections::HashMap;

/// An in-memory room backend.
///
/// Suitable for unit tests, integration tests, and ephemeral catalogs
/// that don't need persistence.
///
/// # Thread Safety
///
/// All mutations run under a single write lock, so the occupancy check
/// inside `create` and the insert are one atomic step.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: RwLock<HashMap<String, StoredRoom>>,
}

impl MemoryBackend {
    /// Creates a new empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every record.
    pub fn clear(&self) {
        self.records.write().clear();
    }
}

impl RoomBackend for MemoryBackend {
    fn create(&self, address: &ContentAddress, record: &StoredRoom) -> StoreResult<()> {
        let mut records = self.records.write();
        if records.contains_key(address.as_str()) {
            return Err(StoreError::RoomExists);
        }
        records.insert(address.as_str().to_owned(), record.clone());
        Ok(())
    }

    fn remove(&self, address: &ContentAddress) -> StoreResult<()> {
        match self.records.write().remove(address.as_str()) {
            Some(_) => Ok(()),
            None => Err(StoreError::RoomNotFound),
        }
    }

    fn get(&self, address: &ContentAddress) -> StoreResult<Option<StoredRoom>> {
        Ok(self.records.read().get(address.as_str()).cloned())
    }

    fn contains(&self, address: &ContentAddress) -> StoreResult<bool> {
        Ok(self.records.read().contains_key(address.as_str()))
    }

    fn list(&self) -> StoreResult<Vec<StoredRoom>> {
        Ok(self.records.read().values().cloned().collect())
    }

    fn len(&self) -> StoreResult<usize> {
        Ok(self.records.read().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomcast_protocol::RoomDocument;
    use serde_json::json;

    fn record(owner: &str, name: &str) -> (ContentAddress, StoredRoom) {
        let record = StoredRoom::new(owner, RoomDocument::new(name, json!("x")));
        (record.address(), record)
    }

    #[test]
    fn create_and_get() {
        let backend = MemoryBackend::new();
        let (address, rec) = record("alice", "cave1");

        backend.create(&address, &rec).unwrap();
        assert_eq!(backend.get(&address).unwrap(), Some(rec));
        assert_eq!(backend.len().unwrap(), 1);
    }

    #[test]
    fn create_occupied_address_fails() {
        let backend = MemoryBackend::new();
        let (address, rec) = record("alice", "cave1");

        backend.create(&address, &rec).unwrap();
        let result = backend.create(&address, &rec);
        assert!(matches!(result, Err(StoreError::RoomExists)));
        assert_eq!(backend.len().unwrap(), 1);
    }

    #[test]
    fn remove_vacant_address_fails() {
        let backend = MemoryBackend::new();
        let (address, _) = record("alice", "cave1");

        let result = backend.remove(&address);
        assert!(matches!(result, Err(StoreError::RoomNotFound)));
    }

    #[test]
    fn remove_then_recreate() {
        let backend = MemoryBackend::new();
        let (address, rec) = record("alice", "cave1");

        backend.create(&address, &rec).unwrap();
        backend.remove(&address).unwrap();
        assert!(!backend.contains(&address).unwrap());

        backend.create(&address, &rec).unwrap();
        assert!(backend.contains(&address).unwrap());
    }

    #[test]
    fn list_returns_all_records() {
        let backend = MemoryBackend::new();
        for name in ["a", "b", "c"] {
            let (address, rec) = record("alice", name);
            backend.create(&address, &rec).unwrap();
        }

        let mut names: Vec<String> = backend
            .list()
            .unwrap()
            .into_iter()
            .map(|r| r.document.room)
            .collect();
        names.sort();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn concurrent_creates_have_one_winner() {
        use std::sync::Arc;

        let backend = Arc::new(MemoryBackend::new());
        let (address, rec) = record("alice", "cave1");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let backend = Arc::clone(&backend);
                let address = address.clone();
                let rec = rec.clone();
                std::thread::spawn(move || backend.create(&address, &rec).is_ok())
            })
            .collect();

        let wins = handles.into_iter().map(|h| h.join().unwrap()).filter(|&w| w).count();
        assert_eq!(wins, 1);
        assert_eq!(backend.len().unwrap(), 1);
    }
}
