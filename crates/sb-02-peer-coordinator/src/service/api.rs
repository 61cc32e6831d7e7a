use crate::domain::{Phase, PeerId, QueuedEvent};
use crate::ports::{PeerBusApi, ReadyCallback};
use crate::service::PeerCoordinator;
use sb_01_shared_store::SharedStore;
use serde_json::Value;
use shared_bus::{EventHandler, EventSubscriber, HandlerId};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::debug;

impl PeerBusApi for PeerCoordinator {
    fn init(&self, shared: Arc<dyn SharedStore>, local: Arc<dyn SharedStore>) -> Phase {
        self.initialize(shared, local)
    }

    fn trigger(&self, event: &str, data: Value) {
        let phase = self.phase();
        if phase == Phase::Inert {
            debug!(event, "Peer inert, trigger dropped");
            return;
        }

        self.outbound.lock().push(QueuedEvent::new(event, data));
        if !phase.is_active() {
            return;
        }

        // Opportunistic send when nothing else is in flight
        if self
            .sending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        if let (Some(stores), Some(me)) = (self.bound_stores(), self.identity.current()) {
            self.send_all(&stores, &me);
        }
        self.sending.store(false, Ordering::Release);
    }

    fn bind(&self, event: &str, handler: EventHandler) -> HandlerId {
        self.bus.bind(event, handler)
    }

    fn unbind(&self, event: &str, id: HandlerId) -> bool {
        self.bus.unbind(event, id)
    }

    fn unbind_all(&self, event: &str) -> usize {
        self.bus.unbind_all(event)
    }

    fn identity(&self) -> Option<PeerId> {
        if self.phase().is_active() {
            self.identity.current()
        } else {
            None
        }
    }

    fn on_ready(&self, callback: ReadyCallback) {
        let mut pending = self.ready_callbacks.lock();
        match self.phase() {
            phase if phase.is_active() => {
                drop(pending);
                callback();
            }
            Phase::Inert => debug!("Peer inert, ready callback dropped"),
            _ => pending.push(callback),
        }
    }
}
