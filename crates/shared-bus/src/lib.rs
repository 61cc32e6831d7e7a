//! # Shared Bus - Local Event Bus
//!
//! The in-process side of StoreBus. The peer coordinator emits every event it
//! drains from its mailbox (and every registry membership change) here, and
//! application code listens here.
//!
//! ## Two ways to listen
//!
//! ```text
//!                  ┌──────────────────┐
//!   emit() ──────→ │  InMemoryEventBus │ ──→ bound handlers (sync, by name)
//!                  │                   │ ──→ Subscription (broadcast, filtered)
//!                  └──────────────────┘
//! ```
//!
//! - **Handlers** (`bind` / `unbind`) run synchronously inside `emit`, in
//!   registration order. No bus lock is held while they run, so a handler may
//!   bind, unbind or emit again.
//! - **Subscriptions** receive a copy of every event over a
//!   `tokio::sync::broadcast` channel, for async consumers.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, LocalEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventHandler, EventSubscriber, HandlerId, Subscription, SubscriptionError};

/// Maximum events to buffer per broadcast subscriber before it lags.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// The full local bus surface: emit on one side, bind/unbind on the other.
///
/// Blanket-implemented for anything that is both a publisher and a subscriber,
/// so consumers can hold an `Arc<dyn LocalEventBus>`.
pub trait LocalEventBus: EventPublisher + EventSubscriber {}

impl<T: EventPublisher + EventSubscriber> LocalEventBus for T {}
