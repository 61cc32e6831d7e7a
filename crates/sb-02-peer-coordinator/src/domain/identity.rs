//! Peer id generation and the format check applied to persisted ids.
//!
//! An id is the configured prefix followed by a decimal suffix:
//! `floor(now_ms + unit * 10000)` where `unit` is uniform in `[0, 1)`.
//! Uniqueness is probabilistic.

use crate::domain::{PeerId, Timestamp};
use serde_json::Value;

/// Spread added to the clock reading so peers started in the same
/// millisecond still get different ids.
pub const SUFFIX_JITTER: f64 = 10_000.0;

/// Id format for one prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityFormat {
    prefix: String,
}

impl IdentityFormat {
    /// Format with the given prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Generate a fresh id from a clock reading and a random unit value.
    #[must_use]
    pub fn generate(&self, now: Timestamp, unit: f64) -> PeerId {
        let unit = if unit.is_finite() {
            unit.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let suffix = (now.as_millis() as f64 + unit * SUFFIX_JITTER).floor() as u64;
        PeerId::new(format!("{}{}", self.prefix, suffix))
    }

    /// True if `candidate` is the prefix followed by one or more ASCII digits.
    #[must_use]
    pub fn is_valid(&self, candidate: &str) -> bool {
        candidate
            .strip_prefix(self.prefix.as_str())
            .is_some_and(|suffix| !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()))
    }

    /// Accept a persisted value only if it is a string in this format.
    #[must_use]
    pub fn parse(&self, stored: &Value) -> Option<PeerId> {
        stored
            .as_str()
            .filter(|s| self.is_valid(s))
            .map(PeerId::new)
    }
}
