//! # Store
//!
//! A driver plus a serializer, exposed through the [`SharedStore`] port.

use crate::adapters::JsonSerializer;
use crate::domain::{StoreError, StoreScope};
use crate::ports::{SharedStore, StoreDriver, ValueSerializer};
use serde_json::Value;
use tracing::trace;

/// Structured store assembled from a raw driver and a serializer.
pub struct Store {
    driver: Box<dyn StoreDriver>,
    serializer: Box<dyn ValueSerializer>,
}

impl Store {
    /// Compose a store.
    #[must_use]
    pub fn new(driver: Box<dyn StoreDriver>, serializer: Box<dyn ValueSerializer>) -> Self {
        Self { driver, serializer }
    }

    /// Compose a store with the JSON serializer.
    #[must_use]
    pub fn json(driver: Box<dyn StoreDriver>) -> Self {
        Self::new(driver, Box::new(JsonSerializer))
    }

    /// Name of the underlying driver.
    #[must_use]
    pub fn driver_name(&self) -> &'static str {
        self.driver.name()
    }

    /// Name of the serializer.
    #[must_use]
    pub fn serializer_name(&self) -> &'static str {
        self.serializer.name()
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("driver", &self.driver.name())
            .field("serializer", &self.serializer.name())
            .field("scope", &self.driver.scope())
            .finish()
    }
}

impl SharedStore for Store {
    fn scope(&self) -> StoreScope {
        self.driver.scope()
    }

    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let Some(raw) = self.driver.get(key)? else {
            return Ok(None);
        };
        self.serializer
            .decode(&raw)
            .map(Some)
            .map_err(|reason| StoreError::Malformed {
                key: key.to_string(),
                reason,
            })
    }

    fn set(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let raw = self
            .serializer
            .encode(value)
            .map_err(|reason| StoreError::Serialization {
                key: key.to_string(),
                reason,
            })?;
        trace!(key, bytes = raw.len(), "Store write");
        self.driver.set(key, raw)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.driver.delete(key)
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.driver.clear()
    }
}
