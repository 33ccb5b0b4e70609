use std::fmt;

/// Error type for coffee store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A required field was missing or malformed.
    InvalidInput(String),
    /// No coffee exists with this id.
    NotFound { id: u64 },
    /// Optimistic concurrency conflict: the caller's version is stale.
    VersionConflict { id: u64, expected: u64, actual: u64 },
    /// Failure of the underlying storage medium.
    Storage(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::InvalidInput(msg) => write!(f, "{}", msg),
            StoreError::NotFound { id } => write!(f, "No coffee found with ID {}", id),
            StoreError::VersionConflict {
                id,
                expected,
                actual,
            } => write!(
                f,
                "Version conflict for coffee with ID {}: version = {}, If-Match = {}",
                id, actual, expected
            ),
            StoreError::Storage(msg) => write!(f, "storage error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Storage(err.to_string())
    }
}
