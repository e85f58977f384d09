//! Shared primitives for all Rust crates in pathguard.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across pathguard crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl std::fmt::Display for NonEmptyString {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Common application error categories.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Caller is blocked by authorization policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A path segment names a field or relation that does not exist.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// An intermediate path segment cannot be traversed.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// A path is longer than the configured traversal limit.
    #[error("depth limit exceeded: path '{path}' has {depth} segments, maximum is {max_depth}")]
    DepthLimitExceeded {
        /// Offending path.
        path: String,
        /// Number of segments in the path.
        depth: usize,
        /// Configured maximum.
        max_depth: usize,
    },

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns whether the error reports a malformed field reference.
    #[must_use]
    pub fn is_path_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownField(_) | Self::InvalidPath(_) | Self::DepthLimitExceeded { .. }
        )
    }
}
