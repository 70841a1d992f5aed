// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregate;
pub mod config;
pub mod error;
pub mod fetch;
pub mod normalize;
pub mod poller;
pub mod types;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::{dedup_by_id, FeedAggregator};
pub use crate::config::{load_config_default, load_config_from, FeedConfig, FeedEndpoint};
pub use crate::error::FeedError;
pub use crate::fetch::{build_client, UsgsFeed};
pub use crate::poller::{Poller, SnapshotHandle};
pub use crate::types::{FeedSource, QuakeEvent, Snapshot};
