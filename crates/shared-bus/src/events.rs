//! # Local Events
//!
//! A local event is a name plus an opaque JSON payload. Names are free-form;
//! the bus attaches no meaning to them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An event delivered on the local bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalEvent {
    /// Event name handlers are bound to.
    pub name: String,
    /// Structured payload, passed through untouched.
    pub payload: Value,
}

impl LocalEvent {
    /// Create a new event.
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    /// The event name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Filter for broadcast subscriptions.
///
/// An empty name list matches every event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Event names to receive (empty = all).
    pub names: Vec<String>,
}

impl EventFilter {
    /// Create a filter that matches all events.
    #[must_use]
    pub fn all() -> Self {
        Self { names: Vec::new() }
    }

    /// Create a filter for specific event names.
    #[must_use]
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &LocalEvent) -> bool {
        self.names.is_empty() || self.names.iter().any(|n| n == &event.name)
    }
}
