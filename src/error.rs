// src/error.rs
use thiserror::Error;

/// Failure taxonomy of the feed pipeline. Containment is bottom-up: a
/// malformed record is skipped inside its batch, a failed endpoint is
/// excluded from the current cycle, and only `NoDataAvailable` (nothing
/// usable anywhere, fallback included) reaches the poller's error callback.
#[derive(Debug, Error)]
pub enum FeedError {
    /// One GeoJSON feature that cannot become a `QuakeEvent`.
    #[error("malformed record: {reason}")]
    MalformedRecord { reason: &'static str },

    #[error("endpoint {endpoint} unavailable (http {status})")]
    EndpointUnavailable { endpoint: String, status: u16 },

    #[error("endpoint {endpoint} unreachable")]
    EndpointUnreachable {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The endpoint answered, but the body is not a GeoJSON summary document.
    #[error("endpoint {endpoint} returned an undecodable payload")]
    MalformedPayload {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// Every primary and the fallback yielded nothing usable this cycle.
    #[error("no feed data available from any endpoint")]
    NoDataAvailable,
}
