//! # Peer Coordinator
//!
//! Lets independent peers that share nothing but a key-value store exchange
//! events as if on one bus.
//!
//! ## How it works
//!
//! Every peer:
//! - assigns itself an id (`peer_<millis>`) and persists it in a local-only
//!   store so it survives restarts;
//! - heartbeats into a shared registry (`{id: last_seen_ms}`), evicting
//!   entries nobody has refreshed within `registry_timeout`;
//! - on `trigger(event, data)`, appends `{event, data}` to the mailbox of
//!   every other registered peer;
//! - every `poll_interval`, drains its own mailbox and emits each entry on
//!   its local event bus.
//!
//! Registry and mailbox updates run under an advisory lock. The lock is a
//! timestamped key that peers overwrite unconditionally: it narrows the
//! window for interleaved read-modify-write cycles but does not close it.
//! Concurrent appends to one mailbox can lose a batch.
//!
//! ## Architecture
//!
//! - **Domain Layer:** ids, registry, mailbox codec, lock assessment, config
//! - **Ports Layer:** `PeerBusApi` (inbound); `TimeSource`, `RandomSource`,
//!   `ConfigProvider` (outbound)
//! - **Service Layer:** `PeerCoordinator`, the lifecycle state machine
//! - **Adapters Layer:** system clock, OS randomness, static/TOML config,
//!   tokio `PollLoop`
//!
//! ## Example
//!
//! ```rust
//! use sb_01_shared_store::{MemoryDriver, SharedStore, Store};
//! use sb_02_peer_coordinator::{CoordinatorConfig, PeerBusApi, PeerCoordinator};
//! use shared_bus::{InMemoryEventBus, LocalEvent};
//! use std::sync::{Arc, Mutex};
//!
//! let medium = MemoryDriver::peer_shared();
//!
//! let spawn_peer = |prefix: &str| {
//!     let config = CoordinatorConfig {
//!         identity_prefix: prefix.to_string(),
//!         ..CoordinatorConfig::default()
//!     };
//!     let peer = PeerCoordinator::with_system_sources(config, Arc::new(InMemoryEventBus::new()));
//!     let shared: Arc<dyn SharedStore> = Arc::new(Store::json(Box::new(medium.clone())));
//!     let local: Arc<dyn SharedStore> = Arc::new(Store::json(Box::new(MemoryDriver::local_only())));
//!     peer.init(shared, local);
//!     peer
//! };
//!
//! let a = spawn_peer("a_");
//! let b = spawn_peer("b_");
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = seen.clone();
//! b.bind("ping", Arc::new(move |event: &LocalEvent| {
//!     sink.lock().unwrap().push(event.payload.clone());
//! }));
//!
//! a.tick(); // A learns about B
//! a.trigger("ping", serde_json::json!({"n": 1}));
//! b.tick(); // B drains its mailbox
//!
//! assert_eq!(*seen.lock().unwrap(), vec![serde_json::json!({"n": 1})]);
//! ```

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Test utilities (ManualTimeSource, FixedRandomSource)
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Domain
pub use domain::{
    ConfigError, CoordinatorConfig, CoordinatorError, CoordinatorStats, IdentityFormat,
    LockManager, LockOutcome, LockRecord, OutboundQueue, PeerId, Phase, QueuedEvent, RegistryMap,
    RegistrySnapshot, StoreKeys, Timestamp, MEMBERSHIP_EVENT,
};

// Ports
pub use ports::{ConfigProvider, PeerBusApi, RandomSource, ReadyCallback, TimeSource};

// Service
pub use service::{PeerCoordinator, PeerIdentity};

// Adapters
pub use adapters::{OsRandomSource, StaticConfigProvider, SystemTimeSource};

#[cfg(feature = "config-file")]
pub use adapters::TomlConfigProvider;

#[cfg(feature = "runtime")]
pub use adapters::{PollLoop, PollLoopHandle};
