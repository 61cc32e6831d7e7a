use crate::domain::{CoordinatorError, IdentityFormat, PeerId};
use crate::ports::{RandomSource, TimeSource};
use parking_lot::Mutex;
use sb_01_shared_store::SharedStore;
use serde_json::Value;
use tracing::{info, warn};

/// Assigns and persists this peer's id.
///
/// The id is read from (or written to) the local-only store once, then
/// cached: `ensure` returns the same id for the lifetime of this value.
pub struct PeerIdentity {
    format: IdentityFormat,
    key: String,
    cached: Mutex<Option<PeerId>>,
}

impl PeerIdentity {
    /// Identity persisted under `key` with the given id format.
    pub fn new(format: IdentityFormat, key: impl Into<String>) -> Self {
        Self {
            format,
            key: key.into(),
            cached: Mutex::new(None),
        }
    }

    /// The id, loading or generating it on first call.
    ///
    /// A persisted value that fails the format check is replaced by a fresh
    /// id. Store failures are logged; the id is still returned, it just will
    /// not survive a restart.
    pub fn ensure(
        &self,
        local: &dyn SharedStore,
        time: &dyn TimeSource,
        random: &dyn RandomSource,
    ) -> PeerId {
        let mut cached = self.cached.lock();
        if let Some(id) = cached.as_ref() {
            return id.clone();
        }

        let id = match self.load(local) {
            Some(id) => {
                info!(peer = %id, "Restored peer identity");
                id
            }
            None => {
                let id = self.format.generate(time.now(), random.unit());
                if let Err(e) = local.set(&self.key, &Value::String(id.to_string())) {
                    warn!(peer = %id, key = %self.key, error = %e, "Could not persist peer identity");
                }
                info!(peer = %id, "Generated peer identity");
                id
            }
        };

        *cached = Some(id.clone());
        id
    }

    /// The cached id, if `ensure` has run.
    #[must_use]
    pub fn current(&self) -> Option<PeerId> {
        self.cached.lock().clone()
    }

    /// Store key the id is persisted under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    fn load(&self, local: &dyn SharedStore) -> Option<PeerId> {
        let stored = match local.get(&self.key) {
            Ok(stored) => stored?,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Persisted identity unreadable");
                return None;
            }
        };

        let parsed = self.format.parse(&stored);
        if parsed.is_none() {
            let err = CoordinatorError::StaleIdentity {
                value: stored.to_string(),
            };
            warn!(key = %self.key, error = %err, "Regenerating peer identity");
        }
        parsed
    }
}
