//! # Poll Loop
//!
//! Tokio task calling [`PeerCoordinator::tick`] every `poll_interval`.
//!
//! Stopping is "stop rearming": the task finishes the tick it is in (ticks
//! are synchronous) and exits at the next select.

use crate::service::PeerCoordinator;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

/// Scheduler for one coordinator.
pub struct PollLoop;

impl PollLoop {
    /// Spawn the loop on the current tokio runtime at the configured
    /// `poll_interval`.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(coordinator: Arc<PeerCoordinator>) -> PollLoopHandle {
        let period = coordinator.config().poll_interval();
        Self::spawn_with_period(coordinator, period)
    }

    /// Spawn the loop with an explicit period.
    pub fn spawn_with_period(coordinator: Arc<PeerCoordinator>, period: Duration) -> PollLoopHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; the first poll happens one
            // period after spawn.
            ticker.tick().await;
            info!(period_ms = period_millis(period), "Poll loop started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => coordinator.tick(),
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!("Poll loop stopped");
        });

        PollLoopHandle {
            stop: stop_tx,
            task,
        }
    }
}

/// Period as whole milliseconds for log fields, saturating.
fn period_millis(period: Duration) -> u64 {
    u64::try_from(period.as_millis()).unwrap_or(u64::MAX)
}

/// Handle to a running poll loop.
pub struct PollLoopHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollLoopHandle {
    /// Stop rearming. Idempotent.
    pub fn stop(&self) {
        let _ = self.stop.send(true);
    }

    /// True once the task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop and wait for the task to exit.
    ///
    /// # Errors
    ///
    /// The join error if the task panicked.
    pub async fn join(self) -> Result<(), JoinError> {
        self.stop();
        self.task.await
    }
}
