//! Advisory lock.
//!
//! The lock is a single shared key holding a [`LockRecord`]. A record younger
//! than `lock_timeout` means another peer is probably mid-cycle. That is only a
//! signal: the acquirer overwrites the record and proceeds either way, so two
//! peers can still run a cycle at the same time. What the lock buys is fewer
//! overlapping cycles, not exclusion.

use crate::domain::{PeerId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Contents of the lock key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    /// When the holder took the lock.
    pub timestamp: Timestamp,
    /// Holder id, if it had one yet. Registration takes the lock before the
    /// identity is known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder: Option<PeerId>,
}

impl LockRecord {
    /// Record for a lock taken now.
    #[must_use]
    pub fn new(timestamp: Timestamp, holder: Option<PeerId>) -> Self {
        Self { timestamp, holder }
    }

    /// Decode the stored value.
    ///
    /// # Errors
    ///
    /// The decoder message if the value is not a lock record.
    pub fn from_value(value: &Value) -> Result<Self, String> {
        serde_json::from_value(value.clone()).map_err(|e| e.to_string())
    }

    /// Encode for storage.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut record = serde_json::Map::new();
        record.insert("timestamp".to_string(), Value::from(self.timestamp.as_millis()));
        if let Some(holder) = &self.holder {
            record.insert("holder".to_string(), Value::String(holder.to_string()));
        }
        Value::Object(record)
    }

    /// True if this record names `peer` as holder.
    #[must_use]
    pub fn is_held_by(&self, peer: Option<&PeerId>) -> bool {
        matches!((&self.holder, peer), (Some(holder), Some(peer)) if holder == peer)
    }
}

/// Result of inspecting the lock key before overwriting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOutcome {
    /// Absent, expired, or our own record.
    Free,
    /// Someone else took it `age_ms` ago. The caller proceeds anyway;
    /// `retry_after` is the hint a stricter caller would wait for.
    Contended {
        /// Age of the foreign record.
        age_ms: u64,
        /// Suggested back-off.
        retry_after: Duration,
    },
}

impl LockOutcome {
    /// True for [`LockOutcome::Contended`].
    #[must_use]
    pub fn is_contended(&self) -> bool {
        matches!(self, Self::Contended { .. })
    }
}

/// Local view of the advisory lock.
#[derive(Debug, Clone)]
pub struct LockManager {
    timeout: Duration,
    interval: Duration,
    written: Option<LockRecord>,
}

impl LockManager {
    /// Manager with the given staleness timeout and retry interval.
    #[must_use]
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self {
            timeout,
            interval,
            written: None,
        }
    }

    /// Inspect the current record.
    #[must_use]
    pub fn assess(
        &self,
        current: Option<&LockRecord>,
        me: Option<&PeerId>,
        now: Timestamp,
    ) -> LockOutcome {
        let Some(record) = current else {
            return LockOutcome::Free;
        };
        if record.is_held_by(me) {
            return LockOutcome::Free;
        }

        let age_ms = now.millis_since(record.timestamp);
        if u128::from(age_ms) < self.timeout.as_millis() {
            LockOutcome::Contended {
                age_ms,
                retry_after: self.interval,
            }
        } else {
            LockOutcome::Free
        }
    }

    /// We wrote `record` to the lock key.
    pub fn mark_held(&mut self, record: LockRecord) {
        self.written = Some(record);
    }

    /// Forget our record, returning it if we had one.
    pub fn mark_released(&mut self) -> Option<LockRecord> {
        self.written.take()
    }

    /// Whether we believe the key currently holds our record.
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.written.is_some()
    }

    /// Staleness timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Retry hint handed out on contention.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }
}
