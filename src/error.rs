//! Error types for contactql.
//!
//! All errors are strongly typed using thiserror. Record-level errors
//! (`NormalizationError`) are collected into the merge report instead of
//! aborting a batch; everything else propagates to the caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors raised while building normalizers or loading configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        pattern: String,
        reason: String,
    },

    #[error("Pattern '{pattern}' has {actual} capture groups, expected at least {expected}")]
    MissingCaptureGroups {
        pattern: String,
        expected: usize,
        actual: usize,
    },

    #[error("Lookup table key cannot be empty ({table})")]
    EmptyLookupKey {
        table: String,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        reason: String,
    },
}

/// Record-level failures. A record that fails normalization is rejected on
/// its own; the rest of the batch continues.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NormalizationError {
    #[error("Required field '{field}' is missing")]
    MissingField {
        field: String,
    },

    #[error("Malformed value '{value}' in field '{field}': {reason}")]
    MalformedInput {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Value '{value}' in field '{field}' does not match pattern '{pattern}'")]
    PatternMismatch {
        field: String,
        value: String,
        pattern: String,
    },
}

/// Errors raised by the fetch/persist adapters at the I/O boundary.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Failed to fetch records: {message}")]
    Fetch {
        message: String,
    },

    #[error("Failed to persist record: {message}")]
    Persist {
        message: String,
    },

    #[error("Failed to decode record: {message}")]
    Decode {
        message: String,
    },
}

/// Top-level error type for contactql.
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Normalization error: {0}")]
    Normalization(#[from] NormalizationError),

    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl ContactError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a record-level normalization error.
    #[must_use]
    pub const fn is_normalization(&self) -> bool {
        matches!(self, Self::Normalization(_))
    }

    /// Returns true if this is an adapter error.
    #[must_use]
    pub const fn is_adapter(&self) -> bool {
        matches!(self, Self::Adapter(_))
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    /// Returns true if the error concerns a single record and the batch can continue.
    #[must_use]
    pub const fn is_record_level(&self) -> bool {
        self.is_normalization()
    }
}

/// Result type alias for contactql operations.
pub type ContactResult<T> = Result<T, ContactError>;
