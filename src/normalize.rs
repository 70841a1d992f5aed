// src/normalize.rs
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::FeedError;
use crate::types::QuakeEvent;

/// Top-level USGS GeoJSON summary document. Features stay raw JSON values
/// so one odd feature cannot fail deserialization of the whole document.
#[derive(Debug, Deserialize)]
pub struct RawDocument {
    #[serde(default)]
    pub features: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    id: Option<String>,
    #[serde(default)]
    properties: RawProperties,
    geometry: Option<RawGeometry>,
}

#[derive(Debug, Default, Deserialize)]
struct RawProperties {
    mag: Option<f64>,
    place: Option<String>,
    time: Option<i64>, // epoch milliseconds
    url: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    // Provider axis order: [lon, lat, depth_km]. USGS emits null components,
    // depth especially, so each slot is nullable on the wire.
    #[serde(default)]
    coordinates: Vec<Option<f64>>,
}

/// Map one raw GeoJSON feature to a canonical event.
///
/// Fails with `MalformedRecord` when the feature has no id, no usable
/// magnitude, or no numeric (lon, lat) coordinate pair. Missing place, time,
/// url, type and depth degrade to defaults instead of failing.
pub fn normalize_feature(
    raw: serde_json::Value,
    default_kind: &str,
) -> Result<QuakeEvent, FeedError> {
    let feat: RawFeature = serde_json::from_value(raw).map_err(|_| FeedError::MalformedRecord {
        reason: "feature does not match the summary schema",
    })?;

    let id = match feat.id {
        Some(id) if !id.is_empty() => id,
        _ => {
            return Err(FeedError::MalformedRecord {
                reason: "missing event id",
            })
        }
    };
    let magnitude = feat.properties.mag.ok_or(FeedError::MalformedRecord {
        reason: "missing magnitude",
    })?;

    let coords = feat.geometry.map(|g| g.coordinates).unwrap_or_default();
    // Swap the provider's (lon, lat) into (lat, lon). A null or absent depth
    // means unknown depth; only a missing or null lon/lat fails the record.
    let (longitude, latitude) = match (
        coords.first().copied().flatten(),
        coords.get(1).copied().flatten(),
    ) {
        (Some(lon), Some(lat)) => (lon, lat),
        _ => {
            return Err(FeedError::MalformedRecord {
                reason: "missing coordinate pair",
            })
        }
    };
    let depth_km = coords.get(2).copied().flatten();

    let time = feat
        .properties
        .time
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .unwrap_or(DateTime::UNIX_EPOCH);

    Ok(QuakeEvent {
        id,
        magnitude,
        place: feat.properties.place.unwrap_or_default(),
        time,
        latitude,
        longitude,
        depth_km,
        url: feat.properties.url,
        kind: feat
            .properties
            .kind
            .unwrap_or_else(|| default_kind.to_string()),
    })
}

/// Normalize every feature of one document, skipping records that fail.
/// Returns the surviving events plus the count of skipped records.
pub fn normalize_batch(doc: RawDocument, default_kind: &str) -> (Vec<QuakeEvent>, usize) {
    let mut out = Vec::with_capacity(doc.features.len());
    let mut skipped = 0usize;
    for raw in doc.features {
        match normalize_feature(raw, default_kind) {
            Ok(ev) => out.push(ev),
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed feature");
                skipped += 1;
            }
        }
    }
    (out, skipped)
}
