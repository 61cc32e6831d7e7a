//! # Ports Layer
//!
//! - **Driving Port (Inbound):** `PeerBusApi`, the surface application code
//!   uses
//! - **Driven Ports (Outbound):** `TimeSource`, `RandomSource`,
//!   `ConfigProvider`, supplied by the host
//!
//! The shared store and local event bus ports live in their own crates
//! (`sb-01-shared-store`, `shared-bus`).

pub mod inbound;
pub mod outbound;

pub use inbound::{PeerBusApi, ReadyCallback};
pub use outbound::{ConfigProvider, RandomSource, TimeSource};
