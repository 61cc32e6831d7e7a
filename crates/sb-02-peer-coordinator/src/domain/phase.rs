//! Lifecycle phase and counters.

use serde::Serialize;
use std::fmt;

/// Coordinator lifecycle.
///
/// ```text
/// Uninitialized ──init()──→ Registering ──→ Ready ──tick──→ Polling ⟲
///        │
///        └──init() on an unsuitable store──→ Inert
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Constructed, `init` not called yet.
    Uninitialized,
    /// Identity assigned, confirming the registry entry.
    Registering,
    /// Registered; the next tick starts polling.
    Ready,
    /// Steady state.
    Polling,
    /// Store capability check failed. Every call is a no-op from here on.
    Inert,
}

impl Phase {
    /// True once registration has completed.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Ready | Self::Polling)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Registering => "registering",
            Self::Ready => "ready",
            Self::Polling => "polling",
            Self::Inert => "inert",
        };
        f.write_str(name)
    }
}

/// Counters since construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CoordinatorStats {
    /// Ticks that did work (registration passes and poll cycles).
    pub ticks: u64,
    /// Mailbox entries written to other peers.
    pub events_sent: u64,
    /// Mailbox entries dispatched locally.
    pub events_delivered: u64,
    /// Lock acquisitions that found a live foreign record.
    pub lock_contentions: u64,
    /// Malformed stored values overwritten.
    pub self_heals: u64,
    /// Registry entries evicted by this peer.
    pub evictions: u64,
}
