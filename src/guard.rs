//! Version guard - precondition policy for optimistic concurrency.
//!
//! A mutating request carries the version it last observed (the `If-Match`
//! token). The guard runs in two phases:
//!
//! 1. [`VersionGuard::parse`] at the request boundary, before the store is
//!    touched: rejects a missing token (when one is required) or a token that
//!    is not a positive integer.
//! 2. [`check_version`] inside the store's critical section, where the
//!    current version is read, compared, and bumped without interleaving.
//!
//! [`VersionGuard::check`] runs both phases for callers that already hold the
//! current version.

use std::fmt;

use crate::error::StoreError;

/// Rejections produced while reading a precondition token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    /// A token is required but none was supplied.
    Required,
    /// The supplied token is not a well-formed version.
    Invalid(String),
}

impl fmt::Display for PreconditionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreconditionError::Required => write!(f, "If-Match header is required"),
            PreconditionError::Invalid(raw) => write!(
                f,
                "If-Match header must be a positive integer version, got '{}'",
                raw
            ),
        }
    }
}

impl std::error::Error for PreconditionError {}

/// Outcome of a full guard check against a known current version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    Precondition(PreconditionError),
    Conflict(StoreError),
}

impl fmt::Display for GuardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardError::Precondition(e) => e.fmt(f),
            GuardError::Conflict(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for GuardError {}

impl From<PreconditionError> for GuardError {
    fn from(err: PreconditionError) -> Self {
        GuardError::Precondition(err)
    }
}

impl From<StoreError> for GuardError {
    fn from(err: StoreError) -> Self {
        GuardError::Conflict(err)
    }
}

/// Precondition policy for mutating requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionGuard {
    required: bool,
}

impl Default for VersionGuard {
    fn default() -> Self {
        Self::required()
    }
}

impl VersionGuard {
    /// Every mutation must carry a token.
    pub const fn required() -> Self {
        Self { required: true }
    }

    /// A missing token is allowed; a present one is still validated.
    pub const fn optional() -> Self {
        Self { required: false }
    }

    /// Read the supplied token.
    ///
    /// Accepts a bare integer or a quoted one (`1` or `"1"`). Returns
    /// `Ok(None)` only when no token was supplied and none is required.
    pub fn parse(&self, supplied: Option<&str>) -> Result<Option<u64>, PreconditionError> {
        let Some(raw) = supplied else {
            return if self.required {
                Err(PreconditionError::Required)
            } else {
                Ok(None)
            };
        };

        let trimmed = raw.trim();
        let unquoted = trimmed
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(trimmed);

        match unquoted.parse::<u64>() {
            Ok(version) if version > 0 => Ok(Some(version)),
            _ => Err(PreconditionError::Invalid(raw.to_string())),
        }
    }

    /// Parse the token and compare it with the current version in one step.
    pub fn check(
        &self,
        id: u64,
        supplied: Option<&str>,
        current_version: u64,
    ) -> Result<(), GuardError> {
        if let Some(expected) = self.parse(supplied)? {
            check_version(id, expected, current_version)?;
        }
        Ok(())
    }
}

/// Compare the caller's expected version with the stored one.
///
/// Must be called while holding whatever serializes writes to `id`.
pub fn check_version(id: u64, expected: u64, actual: u64) -> Result<(), StoreError> {
    if expected != actual {
        return Err(StoreError::VersionConflict {
            id,
            expected,
            actual,
        });
    }
    Ok(())
}
