use crate::domain::{
    CoordinatorConfig, CoordinatorError, CoordinatorStats, ConfigError, IdentityFormat,
    LockManager, OutboundQueue, Phase, RegistrySnapshot, Timestamp,
};
use crate::ports::{ConfigProvider, RandomSource, ReadyCallback, TimeSource};
use crate::service::PeerIdentity;
use parking_lot::{Mutex, RwLock};
use sb_01_shared_store::SharedStore;
use shared_bus::LocalEventBus;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;

/// The stores a coordinator was initialized with.
#[derive(Clone)]
pub(crate) struct BoundStores {
    /// Peer-shared store: registry, lock, mailboxes.
    pub(crate) shared: Arc<dyn SharedStore>,
    /// Local-only store: identity.
    pub(crate) local: Arc<dyn SharedStore>,
}

/// Live counters behind [`CoordinatorStats`].
#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    pub(crate) ticks: AtomicU64,
    pub(crate) events_sent: AtomicU64,
    pub(crate) events_delivered: AtomicU64,
    pub(crate) lock_contentions: AtomicU64,
    pub(crate) self_heals: AtomicU64,
    pub(crate) evictions: AtomicU64,
}

impl StatsCounters {
    pub(crate) fn bump(counter: &AtomicU64, by: u64) {
        counter.fetch_add(by, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CoordinatorStats {
        CoordinatorStats {
            ticks: self.ticks.load(Ordering::Relaxed),
            events_sent: self.events_sent.load(Ordering::Relaxed),
            events_delivered: self.events_delivered.load(Ordering::Relaxed),
            lock_contentions: self.lock_contentions.load(Ordering::Relaxed),
            self_heals: self.self_heals.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

/// One peer's coordinator.
///
/// Construct one per process and share it behind an `Arc`; every method
/// takes `&self`.
///
/// # Example
///
/// ```rust
/// use sb_01_shared_store::{MemoryDriver, SharedStore, Store};
/// use sb_02_peer_coordinator::{CoordinatorConfig, PeerBusApi, PeerCoordinator, Phase};
/// use shared_bus::InMemoryEventBus;
/// use std::sync::Arc;
///
/// let coordinator = PeerCoordinator::with_system_sources(
///     CoordinatorConfig::default(),
///     Arc::new(InMemoryEventBus::new()),
/// );
///
/// let shared: Arc<dyn SharedStore> = Arc::new(Store::json(Box::new(MemoryDriver::peer_shared())));
/// let local: Arc<dyn SharedStore> = Arc::new(Store::json(Box::new(MemoryDriver::local_only())));
///
/// assert_eq!(coordinator.init(shared, local), Phase::Ready);
/// assert!(coordinator.identity().is_some());
/// ```
pub struct PeerCoordinator {
    pub(crate) config: CoordinatorConfig,
    pub(crate) bus: Arc<dyn LocalEventBus>,
    pub(crate) time_source: Arc<dyn TimeSource>,
    pub(crate) random_source: Arc<dyn RandomSource>,
    pub(crate) identity: PeerIdentity,
    pub(crate) stores: RwLock<Option<BoundStores>>,
    pub(crate) phase: RwLock<Phase>,
    pub(crate) snapshot: RwLock<RegistrySnapshot>,
    pub(crate) outbound: Mutex<OutboundQueue>,
    pub(crate) lock: Mutex<LockManager>,
    /// Consecutive registration passes that found our own entry.
    pub(crate) registration_checks_done: AtomicU32,
    /// Set while a send or cycle is in flight, and during registration.
    pub(crate) sending: AtomicBool,
    /// Set while `tick` runs.
    pub(crate) ticking: AtomicBool,
    pub(crate) ready_callbacks: Mutex<Vec<ReadyCallback>>,
    pub(crate) stats: StatsCounters,
}

impl PeerCoordinator {
    /// Create a coordinator.
    ///
    /// # Arguments
    ///
    /// * `config` - Timing and key layout
    /// * `bus` - Local event bus delivered events are emitted on
    /// * `time_source` - Wall clock shared (roughly) by all peers
    /// * `random_source` - Jitter for id generation
    pub fn new(
        config: CoordinatorConfig,
        bus: Arc<dyn LocalEventBus>,
        time_source: Arc<dyn TimeSource>,
        random_source: Arc<dyn RandomSource>,
    ) -> Self {
        let identity = PeerIdentity::new(
            IdentityFormat::new(config.identity_prefix.clone()),
            config.keys.identity.clone(),
        );
        let lock = LockManager::new(config.lock_timeout(), config.lock_interval());
        Self {
            config,
            bus,
            time_source,
            random_source,
            identity,
            stores: RwLock::new(None),
            phase: RwLock::new(Phase::Uninitialized),
            snapshot: RwLock::new(RegistrySnapshot::default()),
            outbound: Mutex::new(OutboundQueue::new()),
            lock: Mutex::new(lock),
            registration_checks_done: AtomicU32::new(0),
            // Nothing is sent until registration completes
            sending: AtomicBool::new(true),
            ticking: AtomicBool::new(false),
            ready_callbacks: Mutex::new(Vec::new()),
            stats: StatsCounters::default(),
        }
    }

    /// Create a coordinator on the system clock and OS randomness.
    pub fn with_system_sources(config: CoordinatorConfig, bus: Arc<dyn LocalEventBus>) -> Self {
        Self::new(
            config,
            bus,
            Arc::new(crate::adapters::SystemTimeSource::new()),
            Arc::new(crate::adapters::OsRandomSource::new()),
        )
    }

    /// Create a coordinator from a config provider, validating the config.
    ///
    /// # Errors
    ///
    /// `ConfigError::Invalid` if the provided config is unusable.
    pub fn from_provider(
        provider: &dyn ConfigProvider,
        bus: Arc<dyn LocalEventBus>,
        time_source: Arc<dyn TimeSource>,
        random_source: Arc<dyn RandomSource>,
    ) -> Result<Self, ConfigError> {
        let config = provider.coordinator_config();
        config.validate()?;
        Ok(Self::new(config, bus, time_source, random_source))
    }

    /// Configuration in use.
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        *self.phase.read()
    }

    /// Registry membership as last observed.
    pub fn peers(&self) -> RegistrySnapshot {
        self.snapshot.read().clone()
    }

    /// Counters since construction.
    pub fn stats(&self) -> CoordinatorStats {
        self.stats.snapshot()
    }

    /// Events queued locally and not yet sent.
    pub fn pending_outbound(&self) -> usize {
        self.outbound.lock().len()
    }

    /// The local event bus.
    pub fn bus(&self) -> &Arc<dyn LocalEventBus> {
        &self.bus
    }

    pub(crate) fn now(&self) -> Timestamp {
        self.time_source.now()
    }

    pub(crate) fn set_phase(&self, next: Phase) {
        *self.phase.write() = next;
    }

    pub(crate) fn bound_stores(&self) -> Option<BoundStores> {
        self.stores.read().clone()
    }

    /// Log a malformed stored value that is about to be overwritten.
    pub(crate) fn record_self_heal(&self, err: &CoordinatorError) {
        StatsCounters::bump(&self.stats.self_heals, 1);
        warn!(error = %err, "Self-healing malformed stored value");
    }
}
