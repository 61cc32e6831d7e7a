//! # Coordinator Properties
//!
//! Delivery latency, registry eviction, mailbox accumulation and identity
//! stability, checked across several peers.

use super::fixtures::{Network, Peer};
use sb_01_shared_store::SharedStore;
use sb_02_peer_coordinator::{IdentityFormat, PeerBusApi};
use serde_json::json;

fn steady_network(names: &[&'static str]) -> (Network, Vec<Peer>) {
    let net = Network::new();
    let peers: Vec<Peer> = names.iter().map(|name| net.join(name)).collect();
    let refs: Vec<&Peer> = peers.iter().collect();
    net.round(&refs);
    (net, peers)
}

// =============================================================================
// DELIVERY LATENCY
// =============================================================================

#[test]
fn test_every_pair_delivers_within_two_poll_intervals() {
    let (net, peers) = steady_network(&["a", "b", "c"]);
    let refs: Vec<&Peer> = peers.iter().collect();

    for sender in &peers {
        for receiver in peers.iter().filter(|p| p.name != sender.name) {
            let seen = receiver.record("relay");
            sender.trigger("relay", json!(sender.name));

            net.rounds(&refs, 2);
            assert_eq!(
                seen.payloads(),
                vec![json!(sender.name)],
                "{} -> {}",
                sender.name,
                receiver.name
            );
            receiver.coordinator.unbind_all("relay");
        }
    }
}

#[test]
fn test_trigger_issued_between_ticks_is_delivered_next_cycle() {
    let (net, peers) = steady_network(&["a", "b"]);
    let (a, b) = (&peers[0], &peers[1]);
    let seen = b.record("late");

    // B has already ticked this interval; A triggers afterwards
    b.tick();
    a.trigger("late", json!(1));
    assert_eq!(seen.count(), 0);

    net.round(&[a, b]);
    assert_eq!(seen.count(), 1);
}

// =============================================================================
// EVICTION
// =============================================================================

#[test]
fn test_silent_peer_is_evicted_by_next_refresh() {
    let (net, peers) = steady_network(&["a", "b", "c"]);
    let (a, b, c) = (&peers[0], &peers[1], &peers[2]);
    let membership = a.record_membership();

    // C stops polling
    let timeout = net.config().registry_timeout_ms;
    let poll = net.config().poll_interval_ms;
    for _ in 0..(timeout / poll) {
        net.round(&[a, b]);
    }
    assert!(a.coordinator.peers().contains(&c.id()));

    net.round(&[a, b]);
    let registry = net.read("storebus.registry").unwrap_or_default();
    assert!(registry.get(c.id().as_str()).is_none());
    assert!(!a.coordinator.peers().contains(&c.id()));
    assert!(!b.coordinator.peers().contains(&c.id()));
    assert_eq!(
        membership.last(),
        Some(super::fixtures::membership_payload(&[a, b]))
    );
    assert_eq!(
        a.coordinator.stats().evictions + b.coordinator.stats().evictions,
        1
    );
}

#[test]
fn test_peers_refreshing_on_schedule_are_never_evicted() {
    let (net, peers) = steady_network(&["a", "b", "c"]);
    let refs: Vec<&Peer> = peers.iter().collect();

    net.rounds(&refs, 100);

    for peer in &peers {
        assert_eq!(peer.coordinator.peers().len(), 3, "{}", peer.name);
        assert_eq!(peer.coordinator.stats().evictions, 0, "{}", peer.name);
    }
}

#[test]
fn test_evicted_peer_rejoins_on_its_next_refresh() {
    let (net, peers) = steady_network(&["a", "b"]);
    let (a, b) = (&peers[0], &peers[1]);

    net.advance(net.config().registry_timeout_ms + 1);
    a.tick();
    assert_eq!(a.coordinator.peers().len(), 1);

    b.tick();
    a.tick();
    assert_eq!(a.coordinator.peers().len(), 2);
}

// =============================================================================
// MAILBOX
// =============================================================================

#[test]
fn test_mailbox_accumulates_until_owner_polls() {
    let (net, peers) = steady_network(&["a", "b", "c"]);
    let (a, b, c) = (&peers[0], &peers[1], &peers[2]);
    let seen = c.record("note");

    a.trigger("note", json!("a1"));
    b.trigger("note", json!("b1"));
    a.trigger("note", json!("a2"));

    assert_eq!(
        net.mailbox_of(c),
        Some(json!([
            {"event": "note", "data": "a1"},
            {"event": "note", "data": "b1"},
            {"event": "note", "data": "a2"},
        ]))
    );
    assert_eq!(seen.count(), 0);

    c.tick();
    assert_eq!(seen.payloads(), vec![json!("a1"), json!("b1"), json!("a2")]);
    assert_eq!(net.mailbox_of(c), Some(json!([])));
}

#[test]
fn test_draining_empty_mailbox_leaves_empty_array() {
    let (net, peers) = steady_network(&["a"]);
    let a = &peers[0];

    for _ in 0..3 {
        net.round(&[a]);
        assert_eq!(net.mailbox_of(a), Some(json!([])));
    }
    assert_eq!(a.coordinator.stats().events_delivered, 0);
}

#[test]
fn test_garbage_in_shared_keys_is_healed_within_one_cycle() {
    let (net, peers) = steady_network(&["a", "b"]);
    let (a, b) = (&peers[0], &peers[1]);
    let shared = net.shared();

    shared.set("storebus.registry", &json!("oops")).unwrap();
    shared
        .set(&format!("storebus.mailbox.{}", b.id()), &json!(17))
        .unwrap();
    shared.set("storebus.lock", &json!([1, 2, 3])).unwrap();

    net.round(&[a, b]);

    assert_eq!(net.mailbox_of(b), Some(json!([])));
    assert_eq!(net.read("storebus.lock"), None);
    let registry = net.read("storebus.registry").unwrap_or_default();
    assert!(registry.get(a.id().as_str()).is_some());
    assert!(registry.get(b.id().as_str()).is_some());

    // A rebuilt the registry before B re-stamped it
    net.round(&[a, b]);
    assert_eq!(a.coordinator.peers().len(), 2);

    let seen = b.record("after");
    a.trigger("after", json!(true));
    net.round(&[a, b]);
    assert_eq!(seen.count(), 1);
}

// =============================================================================
// IDENTITY
// =============================================================================

#[test]
fn test_identity_survives_restart_with_same_local_store() {
    let (net, peers) = steady_network(&["a"]);
    let a = &peers[0];
    let before = a.id();

    net.advance(10_000);
    let restarted = net.restart(a);
    assert_eq!(restarted.id(), before);
}

#[test]
fn test_identity_changes_after_local_store_is_cleared() {
    let (net, peers) = steady_network(&["a"]);
    let a = &peers[0];
    let before = a.id();

    a.local.clear().unwrap();
    net.advance(1);
    let restarted = net.restart(a);

    assert_ne!(restarted.id(), before);
    assert!(IdentityFormat::new("peer_").is_valid(restarted.id().as_str()));
}

#[test]
fn test_identity_is_stable_across_many_cycles() {
    let (net, peers) = steady_network(&["a", "b"]);
    let ids: Vec<_> = peers.iter().map(Peer::id).collect();
    let refs: Vec<&Peer> = peers.iter().collect();

    net.rounds(&refs, 20);

    assert_eq!(peers.iter().map(Peer::id).collect::<Vec<_>>(), ids);
    assert_ne!(ids[0], ids[1]);
}
