//! # Driving Port (Inbound API)

use crate::domain::{Phase, PeerId};
use sb_01_shared_store::SharedStore;
use serde_json::Value;
use shared_bus::{EventHandler, HandlerId};
use std::sync::Arc;

/// Callback run once when the coordinator first becomes ready.
pub type ReadyCallback = Box<dyn FnOnce() + Send>;

/// Application-facing operations of a peer.
///
/// No operation reports failure. Before `init`, after a failed capability
/// check, or when the store misbehaves, calls quietly do nothing or
/// self-heal.
///
/// # Example
///
/// ```rust,ignore
/// use sb_02_peer_coordinator::ports::PeerBusApi;
///
/// fn greet<T: PeerBusApi>(peer: &T) {
///     peer.trigger("hello", serde_json::json!({"from": "tab 1"}));
/// }
/// ```
pub trait PeerBusApi: Send + Sync {
    /// Bind to the stores and register.
    ///
    /// `shared` must advertise peer-shared scope and `local` local-only
    /// scope; otherwise the peer goes permanently inert. Returns the phase
    /// reached. Calling `init` again after the first call has no effect.
    fn init(&self, shared: Arc<dyn SharedStore>, local: Arc<dyn SharedStore>) -> Phase;

    /// Queue an event for every other live peer.
    fn trigger(&self, event: &str, data: Value);

    /// Bind a local handler (delegates to the local event bus).
    fn bind(&self, event: &str, handler: EventHandler) -> HandlerId;

    /// Unbind one local handler.
    fn unbind(&self, event: &str, id: HandlerId) -> bool;

    /// Unbind every local handler for `event`.
    fn unbind_all(&self, event: &str) -> usize;

    /// This peer's id, or `None` until registration completes.
    fn identity(&self) -> Option<PeerId>;

    /// Run `callback` once when the peer becomes ready.
    ///
    /// Runs immediately if the peer is already ready; never runs on an inert
    /// peer.
    fn on_ready(&self, callback: ReadyCallback);
}
