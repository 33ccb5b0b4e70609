//! Coffee records - the single resource type served by the store.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// A stored coffee together with its concurrency version.
///
/// `id` is assigned by the store and never changes. `version` starts at 1 and
/// is bumped by exactly one on every successful update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoffeeRecord {
    pub id: u64,
    pub name: String,
    pub version: u64,
}

impl CoffeeRecord {
    /// Canonical resource path, used for the `Location` header.
    pub fn location(&self) -> String {
        format!("/coffee/{}", self.id)
    }
}

/// Client-supplied fields for create and update.
///
/// `name` is optional at the decoding layer so that a missing or null name
/// is reported as invalid input rather than a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoffeeInput {
    #[serde(default)]
    pub name: Option<String>,
}

impl CoffeeInput {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    /// Returns the validated name, or `InvalidInput` if it is missing or empty.
    pub fn name(&self) -> Result<&str, StoreError> {
        validate_name(self.name.as_deref().unwrap_or_default())
    }
}

/// A name is required and must not be empty.
pub fn validate_name(name: &str) -> Result<&str, StoreError> {
    if name.is_empty() {
        return Err(StoreError::InvalidInput("Missing name".into()));
    }
    Ok(name)
}
