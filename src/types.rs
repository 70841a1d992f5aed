// src/types.rs
use chrono::{DateTime, Utc};

use crate::error::FeedError;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QuakeEvent {
    pub id: String, // provider event id, the dedup key
    pub magnitude: f64,
    pub place: String, // free text, empty when the provider omits it
    pub time: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub depth_km: Option<f64>, // negative = above the sea-level reference
    pub url: Option<String>,
    pub kind: String, // e.g., "earthquake", "quarry blast"
}

/// The published result of one poll cycle: merged, deduplicated events.
/// Replaced wholesale per successful cycle, never patched incrementally.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Snapshot {
    pub events: Vec<QuakeEvent>,
    pub degraded: bool, // true when served from the fallback feed
    pub taken_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(events: Vec<QuakeEvent>, degraded: bool) -> Self {
        Self {
            events,
            degraded,
            taken_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events at or above the given magnitude, input order preserved.
    pub fn with_min_magnitude(&self, min: f64) -> Vec<&QuakeEvent> {
        self.events.iter().filter(|e| e.magnitude >= min).collect()
    }
}

#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<QuakeEvent>, FeedError>;
    fn name(&self) -> &str;
}
