//! coffeehouse - a versioned coffee collection with optimistic concurrency.
//!
//! Every coffee carries a version that starts at 1 and is bumped on each
//! update. Clients echo the version they last saw in `If-Match`; a stale
//! token is rejected with a conflict instead of silently overwriting a newer
//! write.

mod coffee;
mod error;
pub mod guard;
pub mod store;

#[cfg(feature = "http")]
pub mod config;
#[cfg(feature = "http")]
pub mod http;

pub use coffee::{validate_name, CoffeeInput, CoffeeRecord};
pub use error::StoreError;
pub use guard::{check_version, GuardError, PreconditionError, VersionGuard};
pub use store::{seed, CoffeeStore, InMemoryCoffeeStore, DEFAULT_SEED};
#[cfg(feature = "sqlite")]
pub use store::SqliteCoffeeStore;
