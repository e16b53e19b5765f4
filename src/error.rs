//! Error types shared across the repository and plugin layers.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors surfaced by repository operations and event dispatch.
///
/// Validation and not-found failures carry the exact messages the wire
/// contract promises to callers; storage and serialization failures are
/// passed through unchanged with no retry or recovery at this layer.
#[derive(Debug, Error)]
pub enum DataError {
    /// A record failed a required-field check before reaching storage.
    #[error("{reason}")]
    Validation {
        /// Human-readable description of the failed check.
        reason: String,
    },

    /// A single-record lookup by natural key found no stored value.
    #[error("{message}")]
    NotFound {
        /// Type-specific message, e.g. "No verifiable credential found".
        message: &'static str,
    },

    /// The storage collaborator failed; propagated unchanged.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A stored value or message payload could not be (de)serialized.
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// A filter pattern supplied in a message failed to compile.
    #[error("invalid filter pattern: {reason}")]
    InvalidPattern {
        /// Compile error reported by the regex engine.
        reason: String,
    },

    /// A recognized message arrived before the plugin was initialized.
    #[error("Plugin not initialized. Did you forget to call initialize() ?")]
    Uninitialized,
}

impl DataError {
    /// Creates a validation error.
    pub fn validation<S: Into<String>>(reason: S) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Creates a not-found error with a type-specific message.
    #[must_use]
    pub const fn not_found(message: &'static str) -> Self {
        Self::NotFound { message }
    }
}
