use crate::domain::{CoordinatorError, Phase, PeerId};
use crate::service::core::{BoundStores, StatsCounters};
use crate::service::PeerCoordinator;
use sb_01_shared_store::{SharedStore, StoreScope};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn};

impl PeerCoordinator {
    pub(crate) fn initialize(
        &self,
        shared: Arc<dyn SharedStore>,
        local: Arc<dyn SharedStore>,
    ) -> Phase {
        {
            let mut phase = self.phase.write();
            if *phase != Phase::Uninitialized {
                warn!(phase = %*phase, "Already initialized, ignoring init");
                return *phase;
            }

            if let Err(err) = check_capabilities(shared.as_ref(), local.as_ref()) {
                error!(error = %err, "Store capability check failed, peer is inert");
                *phase = Phase::Inert;
            } else {
                *self.stores.write() = Some(BoundStores { shared, local });
                *phase = Phase::Registering;
            }
        }

        if self.phase() == Phase::Inert {
            let dropped = std::mem::take(&mut *self.ready_callbacks.lock());
            let queued = self.outbound.lock().drain();
            debug!(
                callbacks = dropped.len(),
                events = queued.len(),
                "Discarded pending work on inert peer"
            );
            return Phase::Inert;
        }

        info!("Registering peer");
        self.tick();
        self.phase()
    }

    /// One Registering step: ensure identity and stamp our registry entry
    /// under the advisory lock, then move to Ready once enough consecutive
    /// passes have found the entry already there.
    pub(crate) fn registration_pass(&self) {
        let Some(stores) = self.bound_stores() else {
            return;
        };
        StatsCounters::bump(&self.stats.ticks, 1);

        let holder = self.identity.current();
        let registered = self.with_advisory_lock(&stores, holder.as_ref(), || {
            let me = self.identity.ensure(
                stores.local.as_ref(),
                self.time_source.as_ref(),
                self.random_source.as_ref(),
            );
            match self.refresh_registry(&stores, &me) {
                Ok(was_present) => Some((me, was_present)),
                Err(e) => {
                    warn!(peer = %me, error = %e, "Registration write failed, retrying next tick");
                    None
                }
            }
        });
        let Some((me, was_present)) = registered else {
            return;
        };
        let _span = info_span!("registration", peer = %me).entered();

        let required = self.config.registration_checks;
        if required > 0 {
            let done = if was_present {
                self.registration_checks_done.fetch_add(1, Ordering::AcqRel) + 1
            } else {
                self.registration_checks_done.store(0, Ordering::Release);
                0
            };
            if done < required {
                debug!(done, required, "Registration not yet confirmed");
                return;
            }
        }

        self.become_ready(&stores, &me);
    }

    /// Enter Ready, flush events queued during registration, then run the
    /// ready callbacks.
    fn become_ready(&self, stores: &BoundStores, me: &PeerId) {
        let callbacks = {
            let mut callbacks = self.ready_callbacks.lock();
            self.set_phase(Phase::Ready);
            std::mem::take(&mut *callbacks)
        };
        info!(peers = self.snapshot.read().len(), "Peer ready");

        self.send_all(stores, me);
        self.sending.store(false, Ordering::Release);

        for callback in callbacks {
            callback();
        }
    }
}

/// The shared store must be visible to other peers and the identity store
/// private to this one.
fn check_capabilities(
    shared: &dyn SharedStore,
    local: &dyn SharedStore,
) -> Result<(), CoordinatorError> {
    for (role, store, expected) in [
        ("shared", shared, StoreScope::PeerShared),
        ("local", local, StoreScope::LocalOnly),
    ] {
        let actual = store.scope();
        if actual != expected {
            return Err(CoordinatorError::CapabilityUnavailable {
                role,
                actual,
                expected,
            });
        }
    }
    Ok(())
}
