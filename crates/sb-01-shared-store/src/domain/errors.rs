//! Store errors.

use thiserror::Error;

/// Errors raised by drivers and by the structured store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing medium failed.
    #[error("I/O error on key '{key}': {source}")]
    Io {
        /// Key being accessed.
        key: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A stored value could not be decoded.
    #[error("Stored value under '{key}' is malformed: {reason}")]
    Malformed {
        /// Key holding the malformed value.
        key: String,
        /// Decoder message.
        reason: String,
    },

    /// A value could not be encoded for storage.
    #[error("Value for '{key}' could not be serialized: {reason}")]
    Serialization {
        /// Key being written.
        key: String,
        /// Encoder message.
        reason: String,
    },

    /// No candidate driver is usable on this host.
    #[error("No storage driver is available")]
    Unavailable,
}

impl StoreError {
    /// True for decode failures, which callers may self-heal by overwriting.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}
