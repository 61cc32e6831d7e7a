//! # StoreBus Test Suite
//!
//! Cross-crate integration tests: several `PeerCoordinator`s sharing one
//! store, driven tick by tick on a manual clock or by the tokio poll loop.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs    # Shared medium, clock and peer builders
//!     ├── scenarios.rs   # End-to-end scenarios: delivery, join, inert, corrupt id
//!     ├── properties.rs  # Eviction, latency, accumulation, identity stability
//!     ├── file_store.rs  # Peers over the directory-backed driver
//!     └── scheduler.rs   # PollLoop-driven peers on paused tokio time
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p sb-tests
//! cargo test -p sb-tests integration::scenarios::
//! ```

pub mod integration;
