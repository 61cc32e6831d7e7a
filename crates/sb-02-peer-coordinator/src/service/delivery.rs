use crate::domain::{
    decode_mailbox, encode_mailbox, mailbox_key, CoordinatorError, PeerId, QueuedEvent,
};
use crate::service::core::{BoundStores, StatsCounters};
use crate::service::PeerCoordinator;
use shared_bus::{EventPublisher, LocalEvent};
use tracing::{debug, warn};

impl PeerCoordinator {
    /// Fan the outbound queue out to every other peer in the last snapshot.
    ///
    /// Each mailbox is read, appended to and written back. Two senders
    /// appending to the same mailbox at once can lose one batch; the store
    /// offers nothing stronger. The queue is emptied even when there is no
    /// one to send to.
    ///
    /// Returns the number of mailbox entries written.
    pub(crate) fn send_all(&self, stores: &BoundStores, me: &PeerId) -> usize {
        let entries = self.outbound.lock().drain();
        if entries.is_empty() {
            return 0;
        }

        let targets: Vec<PeerId> = self.snapshot.read().others(me).cloned().collect();
        if targets.is_empty() {
            debug!(peer = %me, dropped = entries.len(), "No other peers, outbound queue cleared");
            return 0;
        }

        let mut written = 0;
        for target in &targets {
            match self.append_to_mailbox(stores, target, &entries) {
                Ok(()) => written += entries.len(),
                Err(e) => warn!(peer = %me, target = %target, error = %e, "Mailbox append failed"),
            }
        }

        StatsCounters::bump(&self.stats.events_sent, written as u64);
        debug!(
            peer = %me,
            entries = entries.len(),
            targets = targets.len(),
            "Outbound queue sent"
        );
        written
    }

    fn append_to_mailbox(
        &self,
        stores: &BoundStores,
        target: &PeerId,
        entries: &[QueuedEvent],
    ) -> Result<(), CoordinatorError> {
        let key = mailbox_key(&self.config.keys.mailbox_prefix, target);

        let mut mailbox = match stores.shared.get(&key) {
            Ok(Some(value)) => decode_mailbox(&value).unwrap_or_else(|reason| {
                self.record_self_heal(&CoordinatorError::MalformedStoredValue {
                    key: key.clone(),
                    reason,
                });
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) if e.is_malformed() => {
                self.record_self_heal(&CoordinatorError::from(e));
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        mailbox.extend_from_slice(entries);
        stores.shared.set(&key, &encode_mailbox(&mailbox))?;
        Ok(())
    }

    /// Drain our own mailbox and emit each entry locally, in order.
    ///
    /// The mailbox is cleared before anything is emitted, so entries another
    /// peer appends meanwhile wait for the next cycle instead of being
    /// emitted twice. If the clear fails nothing is emitted. A missing or
    /// malformed mailbox is reset to an empty array.
    ///
    /// Returns the number of events emitted.
    pub(crate) fn dispatch_inbound(&self, stores: &BoundStores, me: &PeerId) -> usize {
        let key = mailbox_key(&self.config.keys.mailbox_prefix, me);

        let (entries, needs_reset) = match stores.shared.get(&key) {
            Ok(Some(value)) => match decode_mailbox(&value) {
                Ok(entries) => (entries, false),
                Err(reason) => {
                    self.record_self_heal(&CoordinatorError::MalformedStoredValue {
                        key: key.clone(),
                        reason,
                    });
                    (Vec::new(), true)
                }
            },
            Ok(None) => (Vec::new(), true),
            Err(e) if e.is_malformed() => {
                self.record_self_heal(&CoordinatorError::from(e));
                (Vec::new(), true)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Mailbox unreadable, skipping dispatch");
                return 0;
            }
        };

        if entries.is_empty() {
            if needs_reset {
                if let Err(e) = stores.shared.set(&key, &encode_mailbox(&[])) {
                    warn!(key = %key, error = %e, "Could not reset mailbox");
                }
            }
            return 0;
        }

        if let Err(e) = stores.shared.set(&key, &encode_mailbox(&[])) {
            warn!(key = %key, error = %e, "Could not clear mailbox, skipping dispatch");
            return 0;
        }

        let count = entries.len();
        for entry in entries {
            self.bus.emit(LocalEvent::new(entry.event, entry.data));
        }
        StatsCounters::bump(&self.stats.events_delivered, count as u64);
        debug!(count, "Mailbox dispatched");
        count
    }
}
