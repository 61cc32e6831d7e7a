//! # Peer Coordinator Service
//!
//! `PeerCoordinator` owns every piece of per-peer mutable state (identity,
//! registry snapshot, outbound queue, lock view, lifecycle phase) and
//! implements the `PeerBusApi` port.
//!
//! Each `tick()` is one atomic step of the lifecycle:
//!
//! ```text
//! Registering: lock → ensure identity → refresh registry → unlock → (Ready)
//! Ready/Polling: lock → dispatch inbound → refresh registry → send all → unlock
//! ```
//!
//! A scheduler (see `adapters::PollLoop`) calls `tick()` every
//! `poll_interval`. Stopping the scheduler stops the peer; a tick in progress
//! always runs to completion.
//!
//! ## Locking
//!
//! Internal state sits behind short-lived `parking_lot` locks, none of which
//! are held while events are emitted on the local bus. Handlers may call back
//! into the coordinator.

// Semantic submodules
mod api;
mod core;
mod cycle;
mod delivery;
mod identity;
mod registration;

// Re-export public API
pub use core::PeerCoordinator;
pub use identity::PeerIdentity;
