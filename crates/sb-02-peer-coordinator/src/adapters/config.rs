use crate::domain::CoordinatorConfig;
use crate::ports::ConfigProvider;

// ============================================================================
// StaticConfigProvider - In-code configuration
// ============================================================================

/// Configuration provider returning a fixed config.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigProvider {
    config: CoordinatorConfig,
}

impl StaticConfigProvider {
    /// Provider with the default config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider with the given config.
    #[must_use]
    pub fn with_config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }
}

impl ConfigProvider for StaticConfigProvider {
    fn coordinator_config(&self) -> CoordinatorConfig {
        self.config.clone()
    }
}

// ============================================================================
// TomlConfigProvider - Config file loading (requires "config-file" feature)
// ============================================================================

#[cfg(feature = "config-file")]
mod toml_config {
    use super::*;
    use crate::domain::{ConfigError, StoreKeys};
    use serde::Deserialize;
    use std::fs;
    use std::path::Path;

    /// Configuration file structure.
    #[derive(Debug, Deserialize, Default)]
    #[serde(deny_unknown_fields)]
    struct ConfigFile {
        #[serde(default)]
        timing: TimingSection,
        #[serde(default)]
        keys: KeysSection,
    }

    #[derive(Debug, Deserialize, Default)]
    #[serde(deny_unknown_fields)]
    struct TimingSection {
        poll_interval_ms: Option<u64>,
        lock_interval_ms: Option<u64>,
        lock_timeout_ms: Option<u64>,
        registry_timeout_ms: Option<u64>,
        registration_checks: Option<u32>,
    }

    #[derive(Debug, Deserialize, Default)]
    #[serde(deny_unknown_fields)]
    struct KeysSection {
        identity_prefix: Option<String>,
        identity: Option<String>,
        registry: Option<String>,
        lock: Option<String>,
        mailbox_prefix: Option<String>,
    }

    /// TOML-based configuration provider.
    ///
    /// # Config File Format
    ///
    /// ```toml
    /// [timing]
    /// poll_interval_ms = 200
    /// lock_interval_ms = 50
    /// lock_timeout_ms = 1000
    /// registry_timeout_ms = 5000
    /// registration_checks = 0
    ///
    /// [keys]
    /// identity_prefix = "peer_"
    /// identity = "storebus.ident"
    /// registry = "storebus.registry"
    /// lock = "storebus.lock"
    /// mailbox_prefix = "storebus.mailbox."
    /// ```
    ///
    /// Missing values take their defaults. The result is validated.
    #[derive(Debug, Clone)]
    pub struct TomlConfigProvider {
        config: CoordinatorConfig,
    }

    impl TomlConfigProvider {
        /// Load configuration from a TOML file.
        ///
        /// # Errors
        ///
        /// Returns error if the file cannot be read, parsed or validated.
        pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
            let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
                path: path.as_ref().display().to_string(),
                source: e,
            })?;

            Self::parse(&content)
        }

        /// Parse configuration from a TOML string.
        pub fn parse(content: &str) -> Result<Self, ConfigError> {
            let file: ConfigFile =
                toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

            let defaults = CoordinatorConfig::default();
            let key_defaults = StoreKeys::default();
            let tc = file.timing;
            let kc = file.keys;

            let config = CoordinatorConfig {
                poll_interval_ms: tc.poll_interval_ms.unwrap_or(defaults.poll_interval_ms),
                lock_interval_ms: tc.lock_interval_ms.unwrap_or(defaults.lock_interval_ms),
                lock_timeout_ms: tc.lock_timeout_ms.unwrap_or(defaults.lock_timeout_ms),
                registry_timeout_ms: tc
                    .registry_timeout_ms
                    .unwrap_or(defaults.registry_timeout_ms),
                registration_checks: tc
                    .registration_checks
                    .unwrap_or(defaults.registration_checks),
                identity_prefix: kc.identity_prefix.unwrap_or(defaults.identity_prefix),
                keys: StoreKeys {
                    identity: kc.identity.unwrap_or(key_defaults.identity),
                    registry: kc.registry.unwrap_or(key_defaults.registry),
                    lock: kc.lock.unwrap_or(key_defaults.lock),
                    mailbox_prefix: kc.mailbox_prefix.unwrap_or(key_defaults.mailbox_prefix),
                },
            };
            config.validate()?;

            Ok(Self { config })
        }
    }

    impl ConfigProvider for TomlConfigProvider {
        fn coordinator_config(&self) -> CoordinatorConfig {
            self.config.clone()
        }
    }
}

#[cfg(feature = "config-file")]
pub use toml_config::TomlConfigProvider;

// ============================================================================
// Tests
// ============================================================================
