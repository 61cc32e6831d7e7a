//! # Driven Ports (Outbound SPI)
//!
//! These are the interfaces the host supplies.

use crate::domain::{CoordinatorConfig, Timestamp};

/// Abstract interface for the wall clock.
///
/// Enables deterministic testing by injecting controllable time sources.
/// Registry and lock timestamps are compared across peers, so every peer
/// sharing a store must read roughly the same clock.
pub trait TimeSource: Send + Sync {
    /// Current time in milliseconds since the Unix epoch.
    fn now(&self) -> Timestamp;
}

/// Source of the random jitter mixed into generated ids.
pub trait RandomSource: Send + Sync {
    /// A value uniform in `[0, 1)`.
    fn unit(&self) -> f64;
}

/// Abstract interface for configuration loading.
pub trait ConfigProvider: Send + Sync {
    /// Coordinator configuration.
    fn coordinator_config(&self) -> CoordinatorConfig;
}
