//! # Test Fixtures
//!
//! A [`Network`] is one shared medium plus one manual clock. Peers joined to
//! it get their own local-only store and their own local bus, the way
//! separate processes would.

use parking_lot::Mutex;
use sb_01_shared_store::{MemoryDriver, SharedStore, Store};
use sb_02_peer_coordinator::domain::mailbox_key;
use sb_02_peer_coordinator::test_utils::{FixedRandomSource, ManualTimeSource};
use sb_02_peer_coordinator::{
    CoordinatorConfig, PeerBusApi, PeerCoordinator, PeerId, Phase, MEMBERSHIP_EVENT,
};
use sb_telemetry::peer_span;
use serde_json::Value;
use shared_bus::{InMemoryEventBus, LocalEvent};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Wall-clock start for every network.
pub const EPOCH_MS: u64 = 1_700_000_000_000;

/// Peers sharing one store and one clock.
pub struct Network {
    pub clock: Arc<ManualTimeSource>,
    shared: Arc<dyn SharedStore>,
    config: CoordinatorConfig,
    spawned: AtomicU32,
}

impl Network {
    /// Network over an in-memory peer-shared store with test timings.
    pub fn new() -> Self {
        Self::with_store(Arc::new(Store::json(Box::new(MemoryDriver::peer_shared()))))
    }

    /// Network over the given shared store.
    pub fn with_store(shared: Arc<dyn SharedStore>) -> Self {
        sb_telemetry::init_test_logging();
        Self {
            clock: Arc::new(ManualTimeSource::new(EPOCH_MS)),
            shared,
            config: CoordinatorConfig::for_testing(),
            spawned: AtomicU32::new(0),
        }
    }

    /// Replace the config used for peers spawned from now on.
    pub fn with_config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn shared(&self) -> Arc<dyn SharedStore> {
        self.shared.clone()
    }

    /// Build a peer with a fresh local store, not yet initialized.
    pub fn spawn(&self, name: &'static str) -> Peer {
        let local: Arc<dyn SharedStore> =
            Arc::new(Store::json(Box::new(MemoryDriver::local_only())));
        self.spawn_with_local(name, local)
    }

    /// Build a peer over an existing local store, not yet initialized.
    ///
    /// Every spawned peer gets a distinct id jitter, so peers created at the
    /// same instant still get distinct ids.
    pub fn spawn_with_local(&self, name: &'static str, local: Arc<dyn SharedStore>) -> Peer {
        let n = self.spawned.fetch_add(1, Ordering::Relaxed);
        let jitter = f64::from(n % 64 + 1) / 128.0;
        let bus = Arc::new(InMemoryEventBus::new());
        let coordinator = PeerCoordinator::new(
            self.config.clone(),
            bus.clone(),
            self.clock.clone(),
            Arc::new(FixedRandomSource::new(jitter)),
        );
        Peer {
            name,
            coordinator: Arc::new(coordinator),
            bus,
            local,
        }
    }

    /// Spawn and initialize a peer against this network's shared store.
    pub fn join(&self, name: &'static str) -> Peer {
        let peer = self.spawn(name);
        peer.init(self);
        peer
    }

    /// A new process for `peer`: same local store, fresh coordinator.
    pub fn restart(&self, peer: &Peer) -> Peer {
        let next = self.spawn_with_local(peer.name, peer.local.clone());
        next.init(self);
        next
    }

    /// Advance the shared clock.
    pub fn advance(&self, millis: u64) {
        self.clock.advance(millis);
    }

    /// One poll interval passes and every listed peer ticks once, in order.
    pub fn round(&self, peers: &[&Peer]) {
        self.advance(self.config.poll_interval_ms);
        for peer in peers {
            peer.tick();
        }
    }

    /// `n` rounds.
    pub fn rounds(&self, peers: &[&Peer], n: usize) {
        for _ in 0..n {
            self.round(peers);
        }
    }

    /// Raw stored value.
    pub fn read(&self, key: &str) -> Option<Value> {
        self.shared.get(key).ok().flatten()
    }

    /// Stored mailbox of `peer`.
    pub fn mailbox_of(&self, peer: &Peer) -> Option<Value> {
        self.read(&mailbox_key(&self.config.keys.mailbox_prefix, &peer.id()))
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

/// One peer: its coordinator, its local bus and its local-only store.
pub struct Peer {
    pub name: &'static str,
    pub coordinator: Arc<PeerCoordinator>,
    pub bus: Arc<InMemoryEventBus>,
    pub local: Arc<dyn SharedStore>,
}

impl Peer {
    pub fn init(&self, network: &Network) -> Phase {
        self.coordinator.init(network.shared(), self.local.clone())
    }

    pub fn tick(&self) {
        let _span = peer_span!("test_tick", self.name).entered();
        self.coordinator.tick();
    }

    pub fn trigger(&self, event: &str, data: Value) {
        self.coordinator.trigger(event, data);
    }

    /// Id of a registered peer.
    ///
    /// # Panics
    ///
    /// If the peer is not Ready or Polling.
    pub fn id(&self) -> PeerId {
        match self.coordinator.identity() {
            Some(id) => id,
            None => panic!("{} has no identity in phase {}", self.name, self.coordinator.phase()),
        }
    }

    /// Record every payload emitted locally under `event`.
    pub fn record(&self, event: &str) -> Recorder {
        let recorder = Recorder::default();
        let sink = recorder.clone();
        self.coordinator.bind(
            event,
            Arc::new(move |event: &LocalEvent| sink.push(event.payload.clone())),
        );
        recorder
    }

    /// Record membership snapshots announced to this peer.
    pub fn record_membership(&self) -> Recorder {
        self.record(MEMBERSHIP_EVENT)
    }
}

/// Payloads captured by a bound handler.
#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Value>>>);

impl Recorder {
    fn push(&self, payload: Value) {
        self.0.lock().push(payload);
    }

    pub fn payloads(&self) -> Vec<Value> {
        self.0.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.0.lock().len()
    }

    pub fn last(&self) -> Option<Value> {
        self.0.lock().last().cloned()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

/// Sorted ids as the JSON array a membership event carries.
pub fn membership_payload(peers: &[&Peer]) -> Value {
    let mut ids: Vec<String> = peers.iter().map(|p| p.id().to_string()).collect();
    ids.sort();
    Value::from(ids)
}
