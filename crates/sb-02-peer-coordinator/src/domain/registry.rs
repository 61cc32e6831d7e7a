//! Heartbeat registry.
//!
//! The shared registry key holds a JSON object mapping peer ids to the
//! millisecond timestamp of their last refresh. Every peer rewrites it on each
//! refresh, evicting any entry older than `registry_timeout`, so eviction is
//! cooperative: a dead peer disappears only when a live one next refreshes.

use crate::domain::{PeerId, Timestamp};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::time::Duration;

/// Name of the local event emitted when registry membership changes.
/// The payload is the sorted JSON array of peer ids.
pub const MEMBERSHIP_EVENT: &str = "storebus:peers";

/// Decoded registry contents, ordered by peer id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryMap {
    entries: BTreeMap<PeerId, Timestamp>,
}

impl RegistryMap {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the stored value.
    ///
    /// Returns the map and the number of entries dropped because their
    /// timestamp was not an unsigned integer.
    ///
    /// # Errors
    ///
    /// The decoder message if `value` is not a JSON object.
    pub fn from_value(value: &Value) -> Result<(Self, usize), String> {
        let Value::Object(object) = value else {
            return Err(format!("expected an object, found {}", kind_of(value)));
        };

        let mut entries = BTreeMap::new();
        let mut dropped = 0;
        for (id, seen) in object {
            match seen.as_u64() {
                Some(millis) => {
                    entries.insert(PeerId::new(id.as_str()), Timestamp::new(millis));
                }
                None => dropped += 1,
            }
        }
        Ok((Self { entries }, dropped))
    }

    /// Encode for storage.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let object: Map<String, Value> = self
            .entries
            .iter()
            .map(|(id, seen)| (id.as_str().to_string(), Value::from(seen.as_millis())))
            .collect();
        Value::Object(object)
    }

    /// Remove every entry last seen more than `timeout` before `now`.
    /// Returns the evicted ids.
    pub fn evict_stale(&mut self, now: Timestamp, timeout: Duration) -> Vec<PeerId> {
        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        let stale: Vec<PeerId> = self
            .entries
            .iter()
            .filter(|(_, seen)| now.millis_since(**seen) > timeout_ms)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &stale {
            self.entries.remove(id);
        }
        stale
    }

    /// Insert or refresh an entry.
    pub fn touch(&mut self, peer: &PeerId, now: Timestamp) {
        self.entries.insert(peer.clone(), now);
    }

    /// True if `peer` has an entry.
    #[must_use]
    pub fn contains(&self, peer: &PeerId) -> bool {
        self.entries.contains_key(peer)
    }

    /// Last-seen timestamp for `peer`.
    #[must_use]
    pub fn last_seen(&self, peer: &PeerId) -> Option<Timestamp> {
        self.entries.get(peer).copied()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &PeerId> {
        self.entries.keys()
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Registry membership as last observed by one peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrySnapshot {
    peers: Vec<PeerId>,
    hash: String,
}

impl RegistrySnapshot {
    /// Snapshot of the given ids. Order of the input does not matter.
    #[must_use]
    pub fn from_ids<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = PeerId>,
    {
        let mut peers: Vec<PeerId> = ids.into_iter().collect();
        peers.sort();
        peers.dedup();
        let hash = Self::hash_of(&peers);
        Self { peers, hash }
    }

    /// Snapshot of a registry map.
    #[must_use]
    pub fn from_map(map: &RegistryMap) -> Self {
        Self::from_ids(map.ids().cloned())
    }

    /// SHA-256 over the sorted ids joined by `#`, hex encoded.
    #[must_use]
    pub fn hash_of(sorted: &[PeerId]) -> String {
        let joined = sorted
            .iter()
            .map(PeerId::as_str)
            .collect::<Vec<_>>()
            .join("#");
        hex::encode(Sha256::digest(joined.as_bytes()))
    }

    /// Sorted ids.
    #[must_use]
    pub fn peers(&self) -> &[PeerId] {
        &self.peers
    }

    /// Content hash.
    #[must_use]
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// True if `peer` is a member.
    #[must_use]
    pub fn contains(&self, peer: &PeerId) -> bool {
        self.peers.binary_search(peer).is_ok()
    }

    /// Every member except `me`.
    pub fn others<'a>(&'a self, me: &'a PeerId) -> impl Iterator<Item = &'a PeerId> + 'a {
        self.peers.iter().filter(move |peer| *peer != me)
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// True if no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Payload of the membership-changed event.
    #[must_use]
    pub fn to_event_payload(&self) -> Value {
        Value::Array(
            self.peers
                .iter()
                .map(|peer| Value::String(peer.as_str().to_string()))
                .collect(),
        )
    }
}

impl Default for RegistrySnapshot {
    fn default() -> Self {
        Self::from_ids(Vec::new())
    }
}
