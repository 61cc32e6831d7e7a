//! Test utilities for the peer coordinator.
//!
//! Deterministic implementations of the outbound ports. Enable with the
//! `test-utils` feature flag.
//!
//! # Example
//!
//! ```rust
//! use sb_02_peer_coordinator::test_utils::ManualTimeSource;
//! use sb_02_peer_coordinator::TimeSource;
//!
//! let clock = ManualTimeSource::new(1_000);
//! clock.advance(250);
//! assert_eq!(clock.now().as_millis(), 1_250);
//! ```

use crate::domain::Timestamp;
use crate::ports::{RandomSource, TimeSource};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// A clock that only moves when told to.
///
/// Share one behind an `Arc` between several coordinators to simulate peers
/// reading the same wall clock.
#[derive(Debug, Default)]
pub struct ManualTimeSource {
    millis: AtomicU64,
}

impl ManualTimeSource {
    /// Clock starting at `millis`.
    pub fn new(millis: u64) -> Self {
        Self {
            millis: AtomicU64::new(millis),
        }
    }

    /// Move forward by `millis`.
    pub fn advance(&self, millis: u64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }

    /// Move forward by a duration.
    pub fn advance_by(&self, duration: Duration) {
        self.advance(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX));
    }

    /// Jump to an absolute time.
    pub fn set(&self, millis: u64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.millis.load(Ordering::SeqCst))
    }
}

/// A random source that always returns the same value.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandomSource {
    value: f64,
}

impl FixedRandomSource {
    /// Source returning `value` (expected in `[0, 1)`).
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl RandomSource for FixedRandomSource {
    fn unit(&self) -> f64 {
        self.value
    }
}
