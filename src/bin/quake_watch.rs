//! Demo watcher: polls the configured feeds and prints one line per cycle
//! until Ctrl-C.

use quake_feed_aggregator::{load_config_default, FeedAggregator, Poller};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = load_config_default()?;
    tracing::info!(
        endpoints = cfg.endpoints.len(),
        interval_secs = cfg.poll_interval_secs,
        "starting feed poller"
    );

    let aggregator = FeedAggregator::from_config(&cfg);
    let poller = Poller::start(
        aggregator,
        cfg.poll_interval(),
        |snap| {
            let strongest = snap
                .events
                .iter()
                .map(|e| e.magnitude)
                .fold(f64::NEG_INFINITY, f64::max);
            println!(
                "[{}] {} events, strongest M{:.1}{}",
                snap.taken_at.format("%H:%M:%S"),
                snap.len(),
                strongest,
                if snap.degraded { " (fallback feed)" } else { "" }
            );
        },
        |e| eprintln!("cycle failed: {e}"),
    );

    tokio::signal::ctrl_c().await?;
    poller.stop().await;
    println!("quake-watch stopped");
    Ok(())
}
