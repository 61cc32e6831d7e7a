use crate::domain::Timestamp;
use crate::ports::TimeSource;
use std::time::{SystemTime, UNIX_EPOCH};

/// Production time source using the system clock.
///
/// # Example
///
/// ```rust
/// use sb_02_peer_coordinator::adapters::SystemTimeSource;
/// use sb_02_peer_coordinator::ports::TimeSource;
///
/// let now = SystemTimeSource::new().now();
/// assert!(now.as_millis() > 0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl SystemTimeSource {
    /// Create a new system time source.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Timestamp::new(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }
}
