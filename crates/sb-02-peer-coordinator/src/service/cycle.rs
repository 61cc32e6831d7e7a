use crate::domain::{
    CoordinatorError, LockOutcome, LockRecord, Phase, PeerId, RegistryMap, RegistrySnapshot,
    MEMBERSHIP_EVENT,
};
use crate::service::core::{BoundStores, StatsCounters};
use crate::service::PeerCoordinator;
use serde_json::Value;
use shared_bus::{EventPublisher, LocalEvent};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, debug_span, info, trace, warn};

/// Clears a flag when dropped.
struct FlagGuard<'a>(&'a AtomicBool);

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl PeerCoordinator {
    /// Run one step of the lifecycle.
    ///
    /// Does nothing before `init`, on an inert peer, or when called from
    /// inside another tick (for example by an event handler).
    pub fn tick(&self) {
        if self.ticking.swap(true, Ordering::AcqRel) {
            trace!("Tick already in progress");
            return;
        }
        let _ticking = FlagGuard(&self.ticking);

        match self.phase() {
            Phase::Uninitialized | Phase::Inert => {}
            Phase::Registering => self.registration_pass(),
            Phase::Ready | Phase::Polling => self.poll_cycle(),
        }
    }

    /// dispatch → refresh → send, under the advisory lock.
    fn poll_cycle(&self) {
        let (Some(stores), Some(me)) = (self.bound_stores(), self.identity.current()) else {
            return;
        };
        let _span = debug_span!("poll_cycle", peer = %me).entered();

        let claimed = self
            .sending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();

        self.with_advisory_lock(&stores, Some(&me), || {
            self.dispatch_inbound(&stores, &me);
            if let Err(e) = self.refresh_registry(&stores, &me) {
                warn!(error = %e, "Registry refresh skipped");
            }
            self.send_all(&stores, &me);
        });

        if claimed {
            self.sending.store(false, Ordering::Release);
        }
        StatsCounters::bump(&self.stats.ticks, 1);

        let mut phase = self.phase.write();
        if *phase == Phase::Ready {
            *phase = Phase::Polling;
            debug!("Polling");
        }
    }

    /// Run `f` between an advisory acquire and release.
    ///
    /// `f` always runs: contention is logged and counted, never waited on.
    pub(crate) fn with_advisory_lock<R>(
        &self,
        stores: &BoundStores,
        me: Option<&PeerId>,
        f: impl FnOnce() -> R,
    ) -> R {
        self.acquire_lock(stores, me);
        let result = f();
        self.release_lock(stores);
        result
    }

    fn acquire_lock(&self, stores: &BoundStores, me: Option<&PeerId>) {
        let key = self.config.keys.lock.as_str();
        let now = self.now();

        let current = match stores.shared.get(key) {
            Ok(Some(value)) => match LockRecord::from_value(&value) {
                Ok(record) => Some(record),
                Err(reason) => {
                    self.record_self_heal(&CoordinatorError::MalformedStoredValue {
                        key: key.to_string(),
                        reason,
                    });
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                if e.is_malformed() {
                    self.record_self_heal(&CoordinatorError::from(e));
                } else {
                    debug!(key, error = %e, "Lock record unreadable, treating as free");
                }
                None
            }
        };

        let mut lock = self.lock.lock();
        if let LockOutcome::Contended {
            age_ms,
            retry_after,
        } = lock.assess(current.as_ref(), me, now)
        {
            StatsCounters::bump(&self.stats.lock_contentions, 1);
            let signal = CoordinatorError::LockContention {
                age_ms,
                retry_after_ms: u64::try_from(retry_after.as_millis()).unwrap_or(u64::MAX),
            };
            let holder = current.as_ref().and_then(|record| record.holder.as_ref());
            debug!(holder = ?holder, signal = %signal, "Advisory lock contended, proceeding");
        }

        let record = LockRecord::new(now, me.cloned());
        match stores.shared.set(key, &record.to_value()) {
            Ok(()) => lock.mark_held(record),
            Err(e) => {
                lock.mark_released();
                warn!(key, error = %e, "Could not write lock record");
            }
        }
    }

    /// Delete the lock key if it still holds the record we wrote.
    fn release_lock(&self, stores: &BoundStores) {
        let Some(ours) = self.lock.lock().mark_released() else {
            return;
        };
        let key = self.config.keys.lock.as_str();

        let still_ours = match stores.shared.get(key) {
            Ok(Some(value)) => LockRecord::from_value(&value).is_ok_and(|record| record == ours),
            Ok(None) => return,
            Err(e) => {
                debug!(key, error = %e, "Lock record unreadable on release");
                false
            }
        };

        if !still_ours {
            debug!(key, "Lock taken over by another peer, leaving it");
            return;
        }
        if let Err(e) = stores.shared.delete(key) {
            warn!(key, error = %e, "Could not release lock");
        }
    }

    /// Read the registry, evict stale entries, stamp our own entry and write
    /// it back.
    ///
    /// Returns whether our own entry was present before stamping.
    ///
    /// # Errors
    ///
    /// Store failures other than malformed values. A malformed registry is
    /// replaced by one holding only live entries we can decode.
    pub(crate) fn refresh_registry(
        &self,
        stores: &BoundStores,
        me: &PeerId,
    ) -> Result<bool, CoordinatorError> {
        let key = self.config.keys.registry.as_str();
        let now = self.now();

        let mut map = match stores.shared.get(key) {
            Ok(Some(value)) => self.decode_registry(key, &value),
            Ok(None) => RegistryMap::new(),
            Err(e) if e.is_malformed() => {
                self.record_self_heal(&CoordinatorError::from(e));
                RegistryMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        let was_present = map.contains(me);
        let evicted = map.evict_stale(now, self.config.registry_timeout());
        for peer in evicted.iter().filter(|peer| *peer != me) {
            StatsCounters::bump(&self.stats.evictions, 1);
            info!(peer = %me, evicted = %peer, "Evicted stale peer");
        }

        map.touch(me, now);
        stores.shared.set(key, &map.to_value())?;

        self.update_snapshot(RegistrySnapshot::from_map(&map));
        Ok(was_present)
    }

    fn decode_registry(&self, key: &str, value: &Value) -> RegistryMap {
        match RegistryMap::from_value(value) {
            Ok((map, 0)) => map,
            Ok((map, dropped)) => {
                self.record_self_heal(&CoordinatorError::MalformedStoredValue {
                    key: key.to_string(),
                    reason: format!("{dropped} entries without a numeric timestamp"),
                });
                map
            }
            Err(reason) => {
                self.record_self_heal(&CoordinatorError::MalformedStoredValue {
                    key: key.to_string(),
                    reason,
                });
                RegistryMap::new()
            }
        }
    }

    /// Cache `next` and announce it if membership changed.
    fn update_snapshot(&self, next: RegistrySnapshot) {
        {
            let mut current = self.snapshot.write();
            if current.hash() == next.hash() {
                return;
            }
            *current = next.clone();
        }

        info!(peers = next.len(), hash = &next.hash()[..12], "Registry membership changed");
        self.bus
            .emit(LocalEvent::new(MEMBERSHIP_EVENT, next.to_event_payload()));
    }
}
