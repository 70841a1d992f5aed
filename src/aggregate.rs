// src/aggregate.rs
use std::collections::HashSet;

use futures::future::join_all;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;

use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::fetch::{build_client, UsgsFeed};
use crate::types::{FeedSource, QuakeEvent, Snapshot};

/// One-time metrics registration (so series carry help text on export).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_events_total", "Raw features decoded from feed payloads.");
        describe_counter!(
            "feed_malformed_total",
            "Features skipped during normalization."
        );
        describe_counter!(
            "feed_endpoint_errors_total",
            "Endpoint fetch failures (transport, status, payload)."
        );
        describe_counter!(
            "feed_dedup_total",
            "Events dropped as duplicate ids during merge."
        );
        describe_counter!(
            "feed_fallback_total",
            "Cycles that consulted the fallback feed."
        );
        describe_counter!("feed_cycles_total", "Poll cycles started.");
        describe_counter!(
            "feed_cycle_errors_total",
            "Cycles that produced no usable data."
        );
        describe_histogram!("feed_fetch_ms", "Endpoint fetch + decode time in milliseconds.");
        describe_gauge!("feed_last_cycle_ts", "Unix ts when the last snapshot was taken.");
        describe_gauge!("feed_snapshot_events", "Events in the most recent snapshot.");
    });
}

/// Deduplicate by event id, first occurrence wins. Input order is preserved.
pub fn dedup_by_id(events: Vec<QuakeEvent>) -> (Vec<QuakeEvent>, usize) {
    let mut seen: HashSet<String> = HashSet::with_capacity(events.len());
    let mut keep = Vec::with_capacity(events.len());
    let mut dropped = 0usize;
    for ev in events {
        if seen.insert(ev.id.clone()) {
            keep.push(ev);
        } else {
            dropped += 1;
        }
    }
    (keep, dropped)
}

pub struct FeedAggregator {
    primaries: Vec<Box<dyn FeedSource>>,
    fallback: Box<dyn FeedSource>,
}

impl FeedAggregator {
    pub fn new(primaries: Vec<Box<dyn FeedSource>>, fallback: Box<dyn FeedSource>) -> Self {
        Self { primaries, fallback }
    }

    /// Build HTTP-backed sources for every configured endpoint, sharing one
    /// client. Endpoint order in the config is the dedup precedence order.
    pub fn from_config(cfg: &FeedConfig) -> Self {
        let client = build_client(cfg.request_timeout_secs);
        let primaries = cfg
            .endpoints
            .iter()
            .map(|e| {
                Box::new(UsgsFeed::new(
                    &e.name,
                    &e.url,
                    &cfg.default_kind,
                    client.clone(),
                )) as Box<dyn FeedSource>
            })
            .collect();
        let fallback = Box::new(UsgsFeed::new(
            &cfg.fallback.name,
            &cfg.fallback.url,
            &cfg.default_kind,
            client,
        ));
        Self::new(primaries, fallback)
    }

    /// Run one acquisition cycle: fetch every primary concurrently, merge in
    /// declaration order, dedup by id, and consult the fallback only when the
    /// merged set came out empty.
    pub async fn run_cycle(&self) -> Result<Snapshot, FeedError> {
        ensure_metrics_described();
        counter!("feed_cycles_total").increment(1);

        // 1) Fan out to all primaries; failures become values, not aborts.
        let results = join_all(self.primaries.iter().map(|s| s.fetch())).await;

        // 2) Concatenate in declaration order, independent of completion timing.
        let mut merged: Vec<QuakeEvent> = Vec::new();
        for (source, result) in self.primaries.iter().zip(results) {
            match result {
                Ok(mut batch) => merged.append(&mut batch),
                Err(e) => {
                    tracing::warn!(error = ?e, feed = source.name(), "feed endpoint error");
                    counter!("feed_endpoint_errors_total").increment(1);
                }
            }
        }

        // 3) First seen wins across the ordered concatenation.
        let (events, dropped) = dedup_by_id(merged);
        if dropped > 0 {
            counter!("feed_dedup_total").increment(dropped as u64);
        }
        if !events.is_empty() {
            return Ok(finish_cycle(events, false));
        }

        // 4) Nothing usable from the primaries: one fallback attempt.
        tracing::warn!(
            feed = self.fallback.name(),
            "all primaries empty, consulting fallback feed"
        );
        counter!("feed_fallback_total").increment(1);
        match self.fallback.fetch().await {
            Ok(batch) if !batch.is_empty() => {
                let (events, dropped) = dedup_by_id(batch);
                if dropped > 0 {
                    counter!("feed_dedup_total").increment(dropped as u64);
                }
                Ok(finish_cycle(events, true))
            }
            Ok(_) => {
                counter!("feed_cycle_errors_total").increment(1);
                Err(FeedError::NoDataAvailable)
            }
            Err(e) => {
                tracing::warn!(error = ?e, feed = self.fallback.name(), "fallback feed error");
                counter!("feed_endpoint_errors_total").increment(1);
                counter!("feed_cycle_errors_total").increment(1);
                Err(FeedError::NoDataAvailable)
            }
        }
    }
}

fn finish_cycle(events: Vec<QuakeEvent>, degraded: bool) -> Snapshot {
    let snap = Snapshot::new(events, degraded);
    gauge!("feed_last_cycle_ts").set(snap.taken_at.timestamp().max(0) as f64);
    gauge!("feed_snapshot_events").set(snap.len() as f64);
    tracing::info!(
        events = snap.len(),
        degraded = snap.degraded,
        "feed cycle complete"
    );
    snap
}
