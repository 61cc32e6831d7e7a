//! # End-to-End Scenarios
//!
//! Two or three peers on one shared medium, stepped tick by tick.
//!
//! 1. Delivery: an event triggered on A is dispatched once on B
//! 2. Join: a late peer is announced to everyone already running
//! 3. Inert: a store without peer-shared scope makes the peer a no-op
//! 4. Corrupt identity: a bad persisted id is replaced on init

use super::fixtures::{membership_payload, Network};
use sb_01_shared_store::{MemoryDriver, SharedStore, Store};
use sb_02_peer_coordinator::{IdentityFormat, PeerBusApi, Phase};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// =============================================================================
// DELIVERY
// =============================================================================

#[test]
fn test_trigger_is_dispatched_once_on_the_other_peer() {
    let net = Network::new();
    let a = net.join("a");
    let b = net.join("b");
    net.round(&[&a, &b]);

    let pings = b.record("ping");
    a.trigger("ping", json!({"n": 1}));

    // One cycle of A, then one of B
    a.tick();
    b.tick();
    assert_eq!(pings.payloads(), vec![json!({"n": 1})]);

    net.rounds(&[&a, &b], 3);
    assert_eq!(pings.count(), 1, "event must not be redelivered");
}

#[test]
fn test_trigger_is_not_dispatched_on_the_sender() {
    let net = Network::new();
    let a = net.join("a");
    let b = net.join("b");
    net.round(&[&a, &b]);

    let own = a.record("ping");
    a.trigger("ping", json!("hi"));
    net.rounds(&[&a, &b], 2);

    assert_eq!(own.count(), 0);
    assert_eq!(net.mailbox_of(&a), Some(json!([])));
}

#[test]
fn test_events_are_dispatched_in_trigger_order() {
    let net = Network::new();
    let a = net.join("a");
    let b = net.join("b");
    net.round(&[&a, &b]);

    let seen = b.record("step");
    for n in 0..5 {
        a.trigger("step", json!(n));
    }
    net.round(&[&a, &b]);

    assert_eq!(
        seen.payloads(),
        (0..5).map(|n| json!(n)).collect::<Vec<_>>()
    );
}

#[test]
fn test_reply_from_handler_reaches_sender() {
    let net = Network::new();
    let a = net.join("a");
    let b = net.join("b");
    net.round(&[&a, &b]);

    let responder = b.coordinator.clone();
    b.coordinator.bind(
        "ping",
        Arc::new(move |event: &shared_bus::LocalEvent| {
            responder.trigger("pong", event.payload.clone());
        }),
    );
    let pongs = a.record("pong");

    a.trigger("ping", json!(42));
    net.round(&[&b, &a]);

    assert_eq!(pongs.payloads(), vec![json!(42)]);
}

// =============================================================================
// LATE JOIN
// =============================================================================

#[test]
fn test_late_peer_is_announced_to_running_peers() {
    let net = Network::new();
    let a = net.join("a");
    let b = net.join("b");

    // Steady state for a full registry timeout
    let steady = (net.config().registry_timeout_ms / net.config().poll_interval_ms) as usize;
    net.rounds(&[&a, &b], steady);

    let seen_by_a = a.record_membership();
    let seen_by_b = b.record_membership();

    let c = net.join("c");
    assert_eq!(c.coordinator.peers().len(), 3);

    net.round(&[&a, &b]);

    let expected = membership_payload(&[&a, &b, &c]);
    assert_eq!(seen_by_a.payloads(), vec![expected.clone()]);
    assert_eq!(seen_by_b.payloads(), vec![expected]);
    assert_eq!(a.coordinator.stats().evictions, 0);
    assert_eq!(b.coordinator.stats().evictions, 0);
}

#[test]
fn test_late_peer_receives_events_after_first_cycle() {
    let net = Network::new();
    let a = net.join("a");
    let b = net.join("b");
    net.round(&[&a, &b]);

    let c = net.join("c");
    let pings = c.record("ping");
    net.round(&[&a, &b, &c]);

    a.trigger("ping", json!("welcome"));
    net.round(&[&a, &b, &c]);

    assert_eq!(pings.payloads(), vec![json!("welcome")]);
}

// =============================================================================
// INERT
// =============================================================================

#[test]
fn test_store_without_peer_shared_scope_leaves_peer_inert() {
    let unusable: Arc<dyn SharedStore> =
        Arc::new(Store::json(Box::new(MemoryDriver::local_only())));
    let net = Network::with_store(unusable);
    let a = net.spawn("a");

    let ready = Arc::new(AtomicUsize::new(0));
    let before = ready.clone();
    a.coordinator.on_ready(Box::new(move || {
        before.fetch_add(1, Ordering::SeqCst);
    }));

    assert_eq!(a.init(&net), Phase::Inert);
    assert_eq!(a.coordinator.identity(), None);

    a.trigger("ping", json!(1));
    net.rounds(&[&a], 5);

    let after = ready.clone();
    a.coordinator.on_ready(Box::new(move || {
        after.fetch_add(1, Ordering::SeqCst);
    }));

    assert_eq!(ready.load(Ordering::SeqCst), 0);
    assert_eq!(a.coordinator.phase(), Phase::Inert);
    assert_eq!(a.coordinator.pending_outbound(), 0);
    assert_eq!(net.read("storebus.registry"), None);
    assert_eq!(a.local.get("storebus.ident").unwrap(), None);
}

#[test]
fn test_inert_peer_does_not_disturb_healthy_peers() {
    let net = Network::new();
    let a = net.join("a");
    let b = net.join("b");
    net.round(&[&a, &b]);

    // Misconfigured: handed a private store as the shared one
    let c = net.spawn("c");
    let private: Arc<dyn SharedStore> =
        Arc::new(Store::json(Box::new(MemoryDriver::local_only())));
    assert_eq!(c.coordinator.init(private, c.local.clone()), Phase::Inert);

    let pings = b.record("ping");
    c.trigger("ping", json!("from c"));
    a.trigger("ping", json!("from a"));
    net.round(&[&a, &b, &c]);

    assert_eq!(pings.payloads(), vec![json!("from a")]);
    assert_eq!(a.coordinator.peers().len(), 2);
}

// =============================================================================
// CORRUPT IDENTITY
// =============================================================================

#[test]
fn test_corrupted_identity_is_replaced_on_init() {
    let net = Network::new();
    let a = net.spawn("a");
    a.local
        .set("storebus.ident", &json!("definitely not an id"))
        .unwrap();

    assert_eq!(a.init(&net), Phase::Ready);
    let id = a.id();

    assert_ne!(id.as_str(), "definitely not an id");
    assert!(IdentityFormat::new("peer_").is_valid(id.as_str()));
    assert_eq!(a.local.get("storebus.ident").unwrap(), Some(json!(id.as_str())));
}

#[test]
fn test_non_string_identity_is_replaced_on_init() {
    let net = Network::new();
    let a = net.spawn("a");
    a.local
        .set("storebus.ident", &json!({"id": 12345}))
        .unwrap();

    a.init(&net);
    assert!(IdentityFormat::new("peer_").is_valid(a.id().as_str()));
}
