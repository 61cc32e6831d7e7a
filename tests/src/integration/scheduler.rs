//! # Scheduled Peers
//!
//! Peers driven by their own `PollLoop` on paused tokio time. The manual
//! clock is moved alongside tokio time so registry ages stay meaningful.

use super::fixtures::Network;
use sb_02_peer_coordinator::{PeerBusApi, Phase, PollLoop};
use serde_json::json;
use std::time::Duration;

/// Sleep `steps` poll intervals, advancing the store clock with tokio time.
async fn run_for(net: &Network, steps: u64) {
    let poll = net.config().poll_interval_ms;
    for _ in 0..steps {
        tokio::time::sleep(Duration::from_millis(poll)).await;
        net.advance(poll);
    }
}

#[tokio::test(start_paused = true)]
async fn test_scheduled_peers_deliver_within_two_intervals() {
    let net = Network::new();
    let a = net.join("a");
    let b = net.join("b");
    let pings = b.record("ping");

    let loop_a = PollLoop::spawn(a.coordinator.clone());
    let loop_b = PollLoop::spawn(b.coordinator.clone());
    run_for(&net, 2).await;
    assert_eq!(a.coordinator.phase(), Phase::Polling);
    assert_eq!(a.coordinator.peers().len(), 2);

    a.trigger("ping", json!("scheduled"));
    run_for(&net, 2).await;
    assert_eq!(pings.payloads(), vec![json!("scheduled")]);

    loop_a.join().await.unwrap();
    loop_b.join().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_stopped_peer_is_evicted_by_running_peer() {
    let net = Network::new();
    let a = net.join("a");
    let b = net.join("b");

    let loop_a = PollLoop::spawn(a.coordinator.clone());
    let loop_b = PollLoop::spawn(b.coordinator.clone());
    run_for(&net, 2).await;
    assert_eq!(a.coordinator.peers().len(), 2);

    loop_b.join().await.unwrap();
    let steps = net.config().registry_timeout_ms / net.config().poll_interval_ms + 3;
    run_for(&net, steps).await;

    assert_eq!(a.coordinator.peers().peers(), &[a.id()]);
    assert_eq!(a.coordinator.stats().evictions, 1);
    loop_a.join().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_loop_finishes_registration_checks() {
    let net = Network::new().with_config(sb_02_peer_coordinator::CoordinatorConfig {
        registration_checks: 3,
        ..sb_02_peer_coordinator::CoordinatorConfig::for_testing()
    });
    let a = net.spawn("a");

    let ready = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    let flag = ready.clone();
    a.coordinator.on_ready(Box::new(move || {
        flag.store(true, std::sync::atomic::Ordering::SeqCst);
    }));
    assert_eq!(a.init(&net), Phase::Registering);

    let handle = PollLoop::spawn(a.coordinator.clone());
    run_for(&net, 4).await;

    assert!(ready.load(std::sync::atomic::Ordering::SeqCst));
    assert!(a.coordinator.phase().is_active());
    handle.join().await.unwrap();
}
