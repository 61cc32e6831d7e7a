//! # Driven Ports (Outbound SPI)
//!
//! A backend only moves strings; encoding structured values is the
//! serializer's job.

use crate::domain::{StoreError, StoreScope};
use serde_json::Value;

/// Raw string key-value backend.
pub trait StoreDriver: Send + Sync {
    /// Driver name, for logs.
    fn name(&self) -> &'static str;

    /// Visibility of values written through this driver.
    fn scope(&self) -> StoreScope;

    /// Whether the driver can be used on this host.
    ///
    /// Checked once by `DriverSelector`; never re-checked.
    fn available(&self) -> bool {
        true
    }

    /// Read the raw value under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write the raw value under `key`.
    fn set(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Remove `key`. Absent keys are not an error.
    fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Remove every key.
    fn clear(&self) -> Result<(), StoreError>;
}

/// Encoding between structured values and raw stored text.
pub trait ValueSerializer: Send + Sync {
    /// Serializer name, for logs.
    fn name(&self) -> &'static str;

    /// Encode a value. `Err` carries the encoder message.
    fn encode(&self, value: &Value) -> Result<String, String>;

    /// Decode raw text. `Err` carries the decoder message.
    fn decode(&self, raw: &str) -> Result<Value, String>;
}
