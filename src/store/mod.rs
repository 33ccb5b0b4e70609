//! Coffee stores - authoritative CRUD over coffee records keyed by id.
//!
//! Every implementation honors the same contract:
//!
//! - ids come from a monotonic sequence and are never reused, even after a
//!   delete
//! - a new record starts at version 1
//! - `update` reads the current version, compares it with the caller's
//!   expected version, replaces the name and bumps the version as a single
//!   atomic step per id
//! - a write is durable in the backing medium before the call returns `Ok`
//!
//! ## Example
//!
//! ```ignore
//! use coffeehouse::{CoffeeStore, InMemoryCoffeeStore};
//!
//! let store = InMemoryCoffeeStore::new();
//! let created = store.create("Coffee 1")?;
//! let updated = store.update(created.id, "Coffee 1 v2", created.version)?;
//! assert_eq!(updated.version, 2);
//! ```

mod in_memory;
#[cfg(feature = "sqlite")]
mod sqlite;

use std::sync::Arc;

use crate::coffee::CoffeeRecord;
use crate::error::StoreError;

pub use in_memory::InMemoryCoffeeStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteCoffeeStore;

/// Names created by [`seed`] when no others are given.
pub const DEFAULT_SEED: [&str; 3] = ["Coffee 1", "Coffee 2", "Coffee 3"];

/// Abstract CRUD storage for coffee records.
pub trait CoffeeStore: Send + Sync {
    /// All records in ascending id order.
    fn list_all(&self) -> Result<Vec<CoffeeRecord>, StoreError>;

    /// Get a record by id.
    fn get(&self, id: u64) -> Result<CoffeeRecord, StoreError>;

    /// Create a record with the next id and version 1.
    fn create(&self, name: &str) -> Result<CoffeeRecord, StoreError>;

    /// Replace the name if `expected_version` matches, bumping the version.
    fn update(&self, id: u64, name: &str, expected_version: u64)
        -> Result<CoffeeRecord, StoreError>;

    /// Delete a record by id.
    fn delete(&self, id: u64) -> Result<(), StoreError>;

    /// Number of live records.
    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.list_all()?.len())
    }
}

impl<S: CoffeeStore + ?Sized> CoffeeStore for Arc<S> {
    fn list_all(&self) -> Result<Vec<CoffeeRecord>, StoreError> {
        (**self).list_all()
    }

    fn get(&self, id: u64) -> Result<CoffeeRecord, StoreError> {
        (**self).get(id)
    }

    fn create(&self, name: &str) -> Result<CoffeeRecord, StoreError> {
        (**self).create(name)
    }

    fn update(
        &self,
        id: u64,
        name: &str,
        expected_version: u64,
    ) -> Result<CoffeeRecord, StoreError> {
        (**self).update(id, name, expected_version)
    }

    fn delete(&self, id: u64) -> Result<(), StoreError> {
        (**self).delete(id)
    }

    fn count(&self) -> Result<usize, StoreError> {
        (**self).count()
    }
}

/// Populate a store through the regular create path.
pub fn seed<S, I, N>(store: &S, names: I) -> Result<Vec<CoffeeRecord>, StoreError>
where
    S: CoffeeStore + ?Sized,
    I: IntoIterator<Item = N>,
    N: AsRef<str>,
{
    let mut created = Vec::new();
    for name in names {
        let record = store.create(name.as_ref())?;
        tracing::debug!(id = record.id, name = %record.name, "seeded coffee");
        created.push(record);
    }
    Ok(created)
}
