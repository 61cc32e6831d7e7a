//! # Shared Store
//!
//! The storage capability StoreBus peers coordinate through.
//!
//! ## Architecture
//!
//! - **Domain Layer:** store scope and errors
//! - **Ports Layer:** `SharedStore` (structured values, consumed by the peer
//!   coordinator), `StoreDriver` and `ValueSerializer` (raw backends and
//!   encodings)
//! - **Adapters Layer:** `MemoryDriver`, `FileDriver`, `JsonSerializer`
//! - `Store` composes one driver with one serializer; `DriverSelector` picks
//!   the first available driver from a fixed candidate order, once.
//!
//! ## Scope
//!
//! Every driver advertises a [`StoreScope`]. Only a `PeerShared` store is
//! visible to other peers; a `LocalOnly` store is private to one peer and is
//! used for identity persistence.
//!
//! ## Example
//!
//! ```rust
//! use sb_01_shared_store::{MemoryDriver, SharedStore, Store, StoreScope};
//! use serde_json::json;
//!
//! let driver = MemoryDriver::peer_shared();
//! let store = Store::json(Box::new(driver.clone()));
//! assert_eq!(store.scope(), StoreScope::PeerShared);
//!
//! store.set("greeting", &json!({"hello": "world"})).unwrap();
//!
//! // Clones of a memory driver share the same backing map
//! let other_peer = Store::json(Box::new(driver));
//! assert_eq!(other_peer.get("greeting").unwrap(), Some(json!({"hello": "world"})));
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod selector;
pub mod store;

pub use adapters::{JsonSerializer, MemoryDriver};
#[cfg(feature = "file-driver")]
pub use adapters::FileDriver;
pub use domain::{StoreError, StoreScope};
pub use ports::{SharedStore, StoreDriver, ValueSerializer};
pub use selector::DriverSelector;
pub use store::Store;
