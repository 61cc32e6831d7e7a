//! # Ports Layer
//!
//! - **Driving Port (Inbound):** `SharedStore`, the structured store the peer
//!   coordinator consumes
//! - **Driven Ports (Outbound):** `StoreDriver` and `ValueSerializer`, the raw
//!   backend and encoding a `Store` is assembled from

pub mod inbound;
pub mod outbound;

pub use inbound::SharedStore;
pub use outbound::{StoreDriver, ValueSerializer};
