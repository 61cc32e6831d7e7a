use crate::domain::{StoreError, StoreScope};
use crate::ports::StoreDriver;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// In-memory driver.
///
/// Cloning a `MemoryDriver` yields a handle onto the same map, which is how
/// several peers in one process share a peer-shared medium.
#[derive(Debug, Clone)]
pub struct MemoryDriver {
    scope: StoreScope,
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryDriver {
    /// Create an empty driver with the given scope.
    #[must_use]
    pub fn new(scope: StoreScope) -> Self {
        Self {
            scope,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Empty peer-shared driver.
    #[must_use]
    pub fn peer_shared() -> Self {
        Self::new(StoreScope::PeerShared)
    }

    /// Empty local-only driver.
    #[must_use]
    pub fn local_only() -> Self {
        Self::new(StoreScope::LocalOnly)
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Stored keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.entries.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl StoreDriver for MemoryDriver {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn scope(&self) -> StoreScope {
        self.scope
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.entries.write().clear();
        Ok(())
    }
}
