//! Coordinator and configuration errors.
//!
//! None of these reach application code through the public operations; the
//! service logs them and self-heals. They exist so internal steps can use `?`.

use sb_01_shared_store::{StoreError, StoreScope};
use thiserror::Error;

/// Errors raised inside a coordinator step.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// A supplied store has the wrong scope. Fatal: the coordinator goes inert.
    #[error("{role} store has scope {actual}, expected {expected}")]
    CapabilityUnavailable {
        /// Which store ("shared" or "local").
        role: &'static str,
        /// Scope it advertises.
        actual: StoreScope,
        /// Scope it needs.
        expected: StoreScope,
    },

    /// The store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A stored registry, mailbox or lock record has the wrong shape.
    #[error("Malformed value under '{key}': {reason}")]
    MalformedStoredValue {
        /// Offending key.
        key: String,
        /// What was wrong.
        reason: String,
    },

    /// The persisted id failed the format check.
    #[error("Persisted identity '{value}' is not a valid peer id")]
    StaleIdentity {
        /// The rejected value, rendered as JSON.
        value: String,
    },

    /// The lock record is younger than the lock timeout and not ours.
    #[error("Advisory lock held by another peer for {age_ms}ms, retry in {retry_after_ms}ms")]
    LockContention {
        /// Age of the foreign record.
        age_ms: u64,
        /// Suggested back-off.
        retry_after_ms: u64,
    },
}

impl CoordinatorError {
    /// True if overwriting the value is the recovery.
    #[must_use]
    pub fn is_self_healable(&self) -> bool {
        match self {
            Self::MalformedStoredValue { .. } | Self::StaleIdentity { .. } => true,
            Self::Store(inner) => inner.is_malformed(),
            _ => false,
        }
    }
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File path.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// Parsed but unusable.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
