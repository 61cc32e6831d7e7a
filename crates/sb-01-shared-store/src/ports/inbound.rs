//! # Driving Port (Inbound API)

use crate::domain::{StoreError, StoreScope};
use serde_json::Value;
use std::sync::Arc;

/// Capability-tagged key-value store holding structured values.
///
/// Implementations use interior mutability: every method takes `&self` so a
/// single store can be shared between peers in one process.
pub trait SharedStore: Send + Sync {
    /// Visibility of this store.
    fn scope(&self) -> StoreScope;

    /// Read a value. `Ok(None)` if the key is absent.
    ///
    /// # Errors
    ///
    /// `StoreError::Malformed` if the stored value cannot be decoded,
    /// `StoreError::Io` if the medium fails.
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Write a value, replacing whatever was stored.
    fn set(&self, key: &str, value: &Value) -> Result<(), StoreError>;

    /// Remove a key. Removing an absent key is not an error.
    fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Remove every key.
    fn clear(&self) -> Result<(), StoreError>;
}

impl<T: SharedStore + ?Sized> SharedStore for Arc<T> {
    fn scope(&self) -> StoreScope {
        (**self).scope()
    }

    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key)
    }

    fn clear(&self) -> Result<(), StoreError> {
        (**self).clear()
    }
}
