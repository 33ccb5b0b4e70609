//! InMemoryCoffeeStore - BTreeMap-backed store for tests, development and
//! single-process deployments.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::CoffeeStore;
use crate::coffee::{validate_name, CoffeeRecord};
use crate::error::StoreError;
use crate::guard::check_version;

#[derive(Default)]
struct Storage {
    records: BTreeMap<u64, CoffeeRecord>,
    last_id: u64,
}

/// In-memory coffee store.
///
/// The write lock is the single serialization point for every mutation, so
/// the version check in `update` cannot interleave with another write.
/// Clone-friendly via Arc; clones share storage.
#[derive(Clone, Default)]
pub struct InMemoryCoffeeStore {
    storage: Arc<RwLock<Storage>>,
}

impl InMemoryCoffeeStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Storage>, StoreError> {
        self.storage
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Storage>, StoreError> {
        self.storage
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))
    }
}

impl CoffeeStore for InMemoryCoffeeStore {
    fn list_all(&self) -> Result<Vec<CoffeeRecord>, StoreError> {
        let storage = self.read()?;
        Ok(storage.records.values().cloned().collect())
    }

    fn get(&self, id: u64) -> Result<CoffeeRecord, StoreError> {
        let storage = self.read()?;
        storage
            .records
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound { id })
    }

    fn create(&self, name: &str) -> Result<CoffeeRecord, StoreError> {
        let name = validate_name(name)?;
        let mut storage = self.write()?;

        let id = storage.last_id + 1;
        let record = CoffeeRecord {
            id,
            name: name.to_string(),
            version: 1,
        };
        storage.last_id = id;
        storage.records.insert(id, record.clone());

        Ok(record)
    }

    fn update(
        &self,
        id: u64,
        name: &str,
        expected_version: u64,
    ) -> Result<CoffeeRecord, StoreError> {
        let name = validate_name(name)?;
        let mut storage = self.write()?;

        let record = storage
            .records
            .get_mut(&id)
            .ok_or(StoreError::NotFound { id })?;
        check_version(id, expected_version, record.version)?;

        record.name = name.to_string();
        record.version += 1;

        Ok(record.clone())
    }

    fn delete(&self, id: u64) -> Result<(), StoreError> {
        let mut storage = self.write()?;
        storage
            .records
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound { id })
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.records.len())
    }
}
