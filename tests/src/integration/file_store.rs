//! # Directory-Backed Peers
//!
//! Each peer opens its own `FileDriver` on one shared directory, the way
//! separate processes on one host would, and a private directory for its
//! identity.

use super::fixtures::{Network, Peer};
use sb_01_shared_store::{
    DriverSelector, FileDriver, MemoryDriver, SharedStore, Store, StoreDriver, StoreScope,
};
use sb_02_peer_coordinator::{PeerBusApi, Phase};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

fn open_shared(dir: &Path) -> Arc<dyn SharedStore> {
    let store = DriverSelector::new()
        .with_candidate(Box::new(FileDriver::new(dir, StoreScope::PeerShared)))
        .with_candidate(Box::new(MemoryDriver::peer_shared()))
        .select_store()
        .unwrap();
    assert_eq!(store.driver_name(), "file");
    Arc::new(store)
}

fn open_local(dir: &Path) -> Arc<dyn SharedStore> {
    Arc::new(Store::json(Box::new(FileDriver::new(dir, StoreScope::LocalOnly))))
}

/// Path of the file holding `key` under `dir`.
fn value_file(dir: &Path, key: &str) -> std::path::PathBuf {
    let stem: String = key.bytes().map(|b| format!("{b:02x}")).collect();
    dir.join(format!("{stem}.val"))
}

/// Spawn a peer with its own handles onto the shared and local directories.
fn start(net: &Network, name: &'static str, shared_dir: &Path, local_dir: &Path) -> Peer {
    let peer = net.spawn_with_local(name, open_local(local_dir));
    let phase = peer
        .coordinator
        .init(open_shared(shared_dir), peer.local.clone());
    assert_eq!(phase, Phase::Ready);
    peer
}

#[test]
fn test_peers_exchange_events_through_a_directory() {
    let shared = tempfile::tempdir().unwrap();
    let local_a = tempfile::tempdir().unwrap();
    let local_b = tempfile::tempdir().unwrap();
    let net = Network::new();

    let a = start(&net, "a", shared.path(), local_a.path());
    let b = start(&net, "b", shared.path(), local_b.path());
    net.round(&[&a, &b]);

    let pings = b.record("ping");
    a.trigger("ping", json!({"via": "files"}));
    net.round(&[&a, &b]);

    assert_eq!(pings.payloads(), vec![json!({"via": "files"})]);
    assert_eq!(a.coordinator.peers().len(), 2);

    // Every stored value is a plain file in the shared directory
    let files = std::fs::read_dir(shared.path()).unwrap().count();
    assert!(files >= 3, "registry and two mailboxes, found {files}");
}

#[test]
fn test_undecodable_files_are_overwritten_and_delivery_resumes() {
    let shared = tempfile::tempdir().unwrap();
    let local_a = tempfile::tempdir().unwrap();
    let local_b = tempfile::tempdir().unwrap();
    let net = Network::new();

    let a = start(&net, "a", shared.path(), local_a.path());
    let b = start(&net, "b", shared.path(), local_b.path());
    net.round(&[&a, &b]);

    let garbage = [0xff_u8, 0xfe, 0x00];
    let mailbox = format!("{}{}", net.config().keys.mailbox_prefix, b.id());
    std::fs::write(value_file(shared.path(), &net.config().keys.registry), garbage).unwrap();
    std::fs::write(value_file(shared.path(), &mailbox), garbage).unwrap();

    // One round repairs both values, the next one re-learns membership
    net.rounds(&[&a, &b], 2);
    assert_eq!(open_shared(shared.path()).get(&mailbox).unwrap(), Some(json!([])));
    assert_eq!(a.coordinator.peers().len(), 2);
    assert!(a.coordinator.stats().self_heals >= 1);
    assert!(b.coordinator.stats().self_heals >= 1);

    let pings = b.record("ping");
    a.trigger("ping", json!({"n": 1}));
    net.round(&[&a, &b]);
    assert_eq!(pings.payloads(), vec![json!({"n": 1})]);
}

#[test]
fn test_long_mailbox_prefix_works_on_files() {
    let shared = tempfile::tempdir().unwrap();
    let local_a = tempfile::tempdir().unwrap();
    let local_b = tempfile::tempdir().unwrap();
    let mut config = sb_02_peer_coordinator::CoordinatorConfig::for_testing();
    config.keys.mailbox_prefix = "storebus.mailbox.".repeat(12);
    let net = Network::new().with_config(config);

    let a = start(&net, "a", shared.path(), local_a.path());
    let b = start(&net, "b", shared.path(), local_b.path());
    net.round(&[&a, &b]);

    let pings = b.record("ping");
    a.trigger("ping", json!("long keys"));
    net.round(&[&a, &b]);

    assert_eq!(pings.payloads(), vec![json!("long keys")]);
}

#[test]
fn test_identity_persists_in_local_directory() {
    let shared = tempfile::tempdir().unwrap();
    let local = tempfile::tempdir().unwrap();
    let net = Network::new();

    let first = start(&net, "a", shared.path(), local.path()).id();
    net.advance(5_000);
    let second = start(&net, "a", shared.path(), local.path()).id();

    assert_eq!(first, second);
}

#[test]
fn test_selector_falls_back_when_directory_is_unusable() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").unwrap();

    let file = FileDriver::new(&blocker, StoreScope::PeerShared);
    assert!(!file.available());

    let store = DriverSelector::new()
        .with_candidate(Box::new(file))
        .with_candidate(Box::new(MemoryDriver::peer_shared()))
        .select_store()
        .unwrap();
    assert_eq!(store.driver_name(), "memory");

    let net = Network::with_store(Arc::new(store));
    let a = net.join("a");
    assert!(a.coordinator.phase().is_active());
}
