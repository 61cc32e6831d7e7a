//! Outbound queue and mailbox encoding.
//!
//! A mailbox is a JSON array of [`QueuedEvent`]s stored under
//! `mailbox_prefix + peer_id`. Senders append; only the owner clears.

use crate::domain::{PeerId, QueuedEvent};
use serde_json::Value;

/// Store key of `peer`'s mailbox.
#[must_use]
pub fn mailbox_key(prefix: &str, peer: &PeerId) -> String {
    format!("{prefix}{peer}")
}

/// Decode a stored mailbox.
///
/// # Errors
///
/// The decoder message if the value is not an array of `{event, data}`
/// records. The caller treats that as an empty mailbox and overwrites it.
pub fn decode_mailbox(value: &Value) -> Result<Vec<QueuedEvent>, String> {
    if !value.is_array() {
        return Err("mailbox is not an array".to_string());
    }
    serde_json::from_value(value.clone()).map_err(|e| e.to_string())
}

/// Encode a mailbox for storage.
#[must_use]
pub fn encode_mailbox(entries: &[QueuedEvent]) -> Value {
    Value::Array(
        entries
            .iter()
            .map(|entry| {
                serde_json::json!({
                    "event": entry.event,
                    "data": entry.data,
                })
            })
            .collect(),
    )
}

/// Events triggered locally and not yet fanned out, in call order.
#[derive(Debug, Clone, Default)]
pub struct OutboundQueue {
    entries: Vec<QueuedEvent>,
}

impl OutboundQueue {
    /// Empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn push(&mut self, entry: QueuedEvent) {
        self.entries.push(entry);
    }

    /// Take every queued event, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<QueuedEvent> {
        std::mem::take(&mut self.entries)
    }

    /// Number of queued events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
