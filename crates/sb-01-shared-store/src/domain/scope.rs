//! Store visibility scope.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who can see the values a store holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreScope {
    /// Visible to every peer sharing the medium.
    PeerShared,
    /// Private to a single peer.
    LocalOnly,
}

impl StoreScope {
    /// True if other peers observe writes to this store.
    #[must_use]
    pub fn is_peer_shared(self) -> bool {
        matches!(self, Self::PeerShared)
    }
}

impl fmt::Display for StoreScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PeerShared => write!(f, "peer-shared"),
            Self::LocalOnly => write!(f, "local-only"),
        }
    }
}
