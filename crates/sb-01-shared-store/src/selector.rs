//! # Driver Selection
//!
//! Candidates are tried in the order they were added. The first one that
//! reports itself available wins; the choice is made once per call to
//! [`DriverSelector::select`] and never revisited by the caller.

use crate::domain::StoreError;
use crate::ports::StoreDriver;
use crate::store::Store;
use tracing::{debug, info, warn};

/// Ordered list of candidate drivers.
#[derive(Default)]
pub struct DriverSelector {
    candidates: Vec<Box<dyn StoreDriver>>,
}

impl DriverSelector {
    /// Empty selector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a candidate. Earlier candidates take precedence.
    #[must_use]
    pub fn with_candidate(mut self, driver: Box<dyn StoreDriver>) -> Self {
        self.candidates.push(driver);
        self
    }

    /// Number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// True if there are no candidates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Pick the first available driver.
    ///
    /// # Errors
    ///
    /// `StoreError::Unavailable` if no candidate is usable.
    pub fn select(self) -> Result<Box<dyn StoreDriver>, StoreError> {
        for driver in self.candidates {
            if driver.available() {
                info!(driver = driver.name(), scope = %driver.scope(), "Storage driver selected");
                return Ok(driver);
            }
            debug!(driver = driver.name(), "Storage driver not available, trying next");
        }
        warn!("No storage driver available");
        Err(StoreError::Unavailable)
    }

    /// Pick the first available driver and wrap it in a JSON [`Store`].
    pub fn select_store(self) -> Result<Store, StoreError> {
        self.select().map(Store::json)
    }
}

impl std::fmt::Debug for DriverSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.candidates.iter().map(|d| d.name()))
            .finish()
    }
}
