//! # Poller
//!
//! Refresh lifecycle around the aggregator: an immediate first cycle, then
//! one cycle per interval until stopped. The latest snapshot is published
//! through a shared read handle; per-cycle outcomes also reach the owner
//! through callbacks.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::aggregate::FeedAggregator;
use crate::error::FeedError;
use crate::types::Snapshot;

/// Shared reader for the most recent snapshot. Clone freely; the poller task
/// is the only writer.
#[derive(Clone, Default)]
pub struct SnapshotHandle {
    inner: Arc<RwLock<Option<Snapshot>>>,
}

impl SnapshotHandle {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
        }
    }

    /// Latest published snapshot, or `None` before the first successful cycle.
    pub fn latest(&self) -> Option<Snapshot> {
        if let Ok(guard) = self.inner.read() {
            guard.clone()
        } else {
            None
        }
    }

    fn publish(&self, snap: Snapshot) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = Some(snap);
        }
    }
}

/// A running poll loop. `start` returns it already running; `stop` consumes
/// it, so a stopped poller cannot be restarted.
pub struct Poller {
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
    snapshots: SnapshotHandle,
}

impl Poller {
    /// Spawn the cycle loop. The first cycle starts immediately; each later
    /// cycle starts one `period` after the previous one was due. A zero
    /// period is clamped to one millisecond. A cycle failure leaves the
    /// stored snapshot untouched (stale beats blank).
    pub fn start<S, E>(
        aggregator: FeedAggregator,
        period: Duration,
        mut on_snapshot: S,
        mut on_error: E,
    ) -> Self
    where
        S: FnMut(&Snapshot) + Send + 'static,
        E: FnMut(&FeedError) + Send + 'static,
    {
        // tokio's interval panics on a zero period; the config loader clamps
        // its own value, but callers can pass any Duration here.
        let period = period.max(Duration::from_millis(1));
        let snapshots = SnapshotHandle::new();
        let published = snapshots.clone();
        let (tx, mut rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = &mut rx => break,
                    _ = ticker.tick() => {
                        // A stop signal arriving mid-cycle drops the cycle
                        // future before any callback fires.
                        tokio::select! {
                            biased;
                            _ = &mut rx => break,
                            outcome = aggregator.run_cycle() => match outcome {
                                Ok(snap) => {
                                    published.publish(snap.clone());
                                    on_snapshot(&snap);
                                }
                                Err(e) => on_error(&e),
                            }
                        }
                    }
                }
            }
            tracing::debug!("poller loop exited");
        });

        Self {
            shutdown: Some(tx),
            handle: Some(handle),
            snapshots,
        }
    }

    /// Reader for the most recent successful snapshot.
    pub fn snapshots(&self) -> SnapshotHandle {
        self.snapshots.clone()
    }

    /// Signal shutdown and wait for the loop to exit. No callback fires after
    /// this returns; an in-flight cycle is abandoned, not completed.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        // Dropped without a clean stop: kill the task so it cannot outlive
        // its owner.
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
