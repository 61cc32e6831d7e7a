//! Coordinator configuration.

use crate::domain::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Store keys shared by every peer. Peers only interoperate if they agree on
/// these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreKeys {
    /// Local-only key persisting this peer's id.
    pub identity: String,
    /// Shared registry key.
    pub registry: String,
    /// Shared advisory lock key.
    pub lock: String,
    /// Prefix of every mailbox key.
    pub mailbox_prefix: String,
}

impl Default for StoreKeys {
    fn default() -> Self {
        Self {
            identity: "storebus.ident".to_string(),
            registry: "storebus.registry".to_string(),
            lock: "storebus.lock".to_string(),
            mailbox_prefix: "storebus.mailbox.".to_string(),
        }
    }
}

/// Coordinator configuration. Times are milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Poll tick period (default: 200ms)
    pub poll_interval_ms: u64,
    /// Retry hint handed out on lock contention (default: 50ms)
    pub lock_interval_ms: u64,
    /// Age past which a lock record is stale (default: 1000ms)
    pub lock_timeout_ms: u64,
    /// Age past which a registry entry is evicted (default: 5000ms)
    pub registry_timeout_ms: u64,
    /// Extra registration passes that must see our own entry before Ready
    /// (default: 0)
    pub registration_checks: u32,
    /// Peer id prefix (default: "peer_")
    pub identity_prefix: String,
    /// Key layout
    pub keys: StoreKeys,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 200,
            lock_interval_ms: 50,
            lock_timeout_ms: 1_000,
            registry_timeout_ms: 5_000,
            registration_checks: 0,
            identity_prefix: "peer_".to_string(),
            keys: StoreKeys::default(),
        }
    }
}

impl CoordinatorConfig {
    /// Create a config suitable for testing (short, round values)
    pub fn for_testing() -> Self {
        Self {
            poll_interval_ms: 100,
            lock_interval_ms: 10,
            lock_timeout_ms: 300,
            registry_timeout_ms: 1_000,
            registration_checks: 0,
            identity_prefix: "peer_".to_string(),
            keys: StoreKeys::default(),
        }
    }

    /// Poll tick period.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Lock retry hint.
    #[must_use]
    pub fn lock_interval(&self) -> Duration {
        Duration::from_millis(self.lock_interval_ms)
    }

    /// Lock staleness timeout.
    #[must_use]
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    /// Registry eviction timeout.
    #[must_use]
    pub fn registry_timeout(&self) -> Duration {
        Duration::from_millis(self.registry_timeout_ms)
    }

    /// Reject values the coordinator cannot run with.
    ///
    /// # Errors
    ///
    /// `ConfigError::Invalid` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let timings = [
            ("poll_interval_ms", self.poll_interval_ms),
            ("lock_interval_ms", self.lock_interval_ms),
            ("lock_timeout_ms", self.lock_timeout_ms),
            ("registry_timeout_ms", self.registry_timeout_ms),
        ];
        if let Some((field, _)) = timings.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::Invalid(format!("{field} must be non-zero")));
        }

        let names = [
            ("identity_prefix", &self.identity_prefix),
            ("keys.identity", &self.keys.identity),
            ("keys.registry", &self.keys.registry),
            ("keys.lock", &self.keys.lock),
            ("keys.mailbox_prefix", &self.keys.mailbox_prefix),
        ];
        if let Some((field, _)) = names.iter().find(|(_, value)| value.is_empty()) {
            return Err(ConfigError::Invalid(format!("{field} must not be empty")));
        }

        if self
            .identity_prefix
            .chars()
            .last()
            .is_some_and(|c| c.is_ascii_digit())
        {
            return Err(ConfigError::Invalid(
                "identity_prefix must not end with a digit".to_string(),
            ));
        }
        Ok(())
    }
}
