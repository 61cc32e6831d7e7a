//! # Event Publisher
//!
//! Defines the emitting side of the bus and the in-memory implementation.

use crate::events::{EventFilter, LocalEvent};
use crate::subscriber::{EventHandler, EventSubscriber, HandlerId, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;
use tracing::{debug, trace, warn};

type HandlerTable = HashMap<String, Vec<(HandlerId, EventHandler)>>;

/// Trait for emitting events onto the bus.
pub trait EventPublisher: Send + Sync {
    /// Emit an event.
    ///
    /// # Returns
    ///
    /// The number of handlers and subscriptions that received the event.
    fn emit(&self, event: LocalEvent) -> usize;

    /// Get the total number of events emitted.
    fn events_published(&self) -> u64;
}

/// In-memory implementation of the local event bus.
pub struct InMemoryEventBus {
    /// Broadcast sender for subscriptions.
    sender: broadcast::Sender<LocalEvent>,

    /// Bound handlers by event name, in registration order.
    handlers: RwLock<HandlerTable>,

    /// Next handler id to hand out.
    next_handler_id: AtomicU64,

    /// Total events emitted.
    events_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,
}

impl InMemoryEventBus {
    /// Create a new in-memory event bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new in-memory event bus with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            handlers: RwLock::new(HashMap::new()),
            next_handler_id: AtomicU64::new(1),
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to events matching a filter.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(names = ?filter.names, "New subscription created");
        Subscription::new(self.sender.subscribe(), filter)
    }

    /// Get the number of active broadcast subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Read the handler table. A handler that panicked while another thread
    /// held the lock does not leave the table inconsistent, so poisoning is
    /// logged and cleared.
    fn read_handlers(&self) -> RwLockReadGuard<'_, HandlerTable> {
        self.handlers.read().unwrap_or_else(|poisoned| {
            warn!("Handler table lock poisoned, recovering");
            PoisonError::into_inner(poisoned)
        })
    }

    fn write_handlers(&self) -> RwLockWriteGuard<'_, HandlerTable> {
        self.handlers.write().unwrap_or_else(|poisoned| {
            warn!("Handler table lock poisoned, recovering");
            PoisonError::into_inner(poisoned)
        })
    }

    /// Snapshot the handlers for `name` so none of our locks are held while
    /// they run.
    fn handlers_for(&self, name: &str) -> Vec<EventHandler> {
        self.read_handlers()
            .get(name)
            .map(|bound| bound.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default()
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for InMemoryEventBus {
    fn emit(&self, event: LocalEvent) -> usize {
        self.events_published.fetch_add(1, Ordering::Relaxed);

        let handlers = self.handlers_for(&event.name);
        for handler in &handlers {
            handler(&event);
        }

        let name = event.name.clone();
        let receivers = match self.sender.send(event) {
            Ok(count) => count,
            Err(_) => {
                // No broadcast subscribers; handlers may still have run
                trace!(event = %name, "No broadcast subscribers");
                0
            }
        };

        debug!(
            event = %name,
            handlers = handlers.len(),
            receivers,
            "Event emitted"
        );
        handlers.len() + receivers
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn bind(&self, name: &str, handler: EventHandler) -> HandlerId {
        let id = HandlerId(self.next_handler_id.fetch_add(1, Ordering::Relaxed));
        self.write_handlers()
            .entry(name.to_string())
            .or_default()
            .push((id, handler));
        debug!(event = %name, handler = %id, "Handler bound");
        id
    }

    fn unbind(&self, name: &str, id: HandlerId) -> bool {
        let mut handlers = self.write_handlers();
        let Some(bound) = handlers.get_mut(name) else {
            return false;
        };

        let before = bound.len();
        bound.retain(|(bound_id, _)| *bound_id != id);
        let removed = bound.len() != before;
        if bound.is_empty() {
            handlers.remove(name);
        }
        if removed {
            debug!(event = %name, handler = %id, "Handler unbound");
        }
        removed
    }

    fn unbind_all(&self, name: &str) -> usize {
        let removed = self.write_handlers().remove(name).map_or(0, |bound| bound.len());
        debug!(event = %name, removed, "All handlers unbound");
        removed
    }

    fn handler_count(&self, name: &str) -> usize {
        self.read_handlers().get(name).map_or(0, Vec::len)
    }
}
