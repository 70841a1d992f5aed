use async_trait::async_trait;
use metrics::{counter, histogram};

use crate::error::FeedError;
use crate::normalize::{normalize_batch, RawDocument};
use crate::types::{FeedSource, QuakeEvent};

/// Shared HTTP client with transport bounds suited to feed polling.
pub fn build_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs.max(1)))
        .user_agent(concat!("quake-feed-aggregator/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_default()
}

/// One USGS GeoJSON summary endpoint. The fallback feed uses the same type;
/// only the aggregator treats it differently.
pub struct UsgsFeed {
    name: String,
    url: String,
    default_kind: String,
    client: reqwest::Client,
}

impl UsgsFeed {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        default_kind: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            default_kind: default_kind.into(),
            client,
        }
    }
}

#[async_trait]
impl FeedSource for UsgsFeed {
    /// GET the endpoint once and normalize its batch. No internal retries;
    /// a failure here excludes this endpoint from the current cycle only.
    async fn fetch(&self) -> Result<Vec<QuakeEvent>, FeedError> {
        let t0 = std::time::Instant::now();

        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FeedError::EndpointUnreachable {
                endpoint: self.name.clone(),
                source: e,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::EndpointUnavailable {
                endpoint: self.name.clone(),
                status: status.as_u16(),
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| FeedError::EndpointUnreachable {
                endpoint: self.name.clone(),
                source: e,
            })?;
        let doc: RawDocument =
            serde_json::from_str(&body).map_err(|e| FeedError::MalformedPayload {
                endpoint: self.name.clone(),
                source: e,
            })?;

        let total = doc.features.len();
        let (events, skipped) = normalize_batch(doc, &self.default_kind);

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("feed_fetch_ms").record(ms);
        counter!("feed_events_total").increment(total as u64);
        if skipped > 0 {
            counter!("feed_malformed_total").increment(skipped as u64);
        }
        tracing::debug!(feed = %self.name, total, skipped, "feed batch decoded");

        Ok(events)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
