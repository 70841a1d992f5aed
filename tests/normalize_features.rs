// tests/normalize_features.rs
use quake_feed_aggregator::normalize::{normalize_batch, normalize_feature, RawDocument};

const FIXTURE: &str = include_str!("fixtures/usgs_all_hour.json");

#[test]
fn fixture_document_normalizes_with_partial_batch_tolerance() {
    let doc: RawDocument = serde_json::from_str(FIXTURE).expect("fixture parses");
    let (events, skipped) = normalize_batch(doc, "earthquake");

    // 7 features: one null magnitude and one null geometry are skipped.
    assert_eq!(events.len(), 5);
    assert_eq!(skipped, 2);

    let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "us7000kufc",
            "nc73999991",
            "ak024a1bcdef",
            "hv74002826",
            "nn00888021"
        ]
    );
}

#[test]
fn fixture_fields_map_onto_the_canonical_shape() {
    let doc: RawDocument = serde_json::from_str(FIXTURE).unwrap();
    let (events, _) = normalize_batch(doc, "earthquake");

    // Axis order swap: geometry carries [lon, lat, depth].
    let ridgecrest = &events[0];
    assert_eq!(ridgecrest.latitude, 35.55);
    assert_eq!(ridgecrest.longitude, -117.55);
    assert_eq!(ridgecrest.depth_km, Some(7.8));
    assert_eq!(ridgecrest.magnitude, 4.6);
    assert_eq!(ridgecrest.time.timestamp_millis(), 1_722_470_000_000);
    assert_eq!(
        ridgecrest.url.as_deref(),
        Some("https://earthquake.usgs.gov/earthquakes/eventpage/us7000kufc")
    );

    // Two coordinate components only: depth stays unset.
    let geysers = &events[1];
    assert_eq!(geysers.depth_km, None);

    // Null type falls back to the configured default kind.
    let anchor_point = &events[2];
    assert_eq!(anchor_point.kind, "earthquake");

    // Null place and time degrade to empty string and the epoch.
    let hawaii = &events[3];
    assert_eq!(hawaii.place, "");
    assert_eq!(hawaii.time, chrono::DateTime::UNIX_EPOCH);

    // Null depth component: the record survives, depth stays unset.
    let nevada = &events[4];
    assert_eq!(nevada.latitude, 36.84);
    assert_eq!(nevada.longitude, -116.55);
    assert_eq!(nevada.depth_km, None);
}

#[test]
fn default_kind_is_a_knob_not_a_constant() {
    let raw = serde_json::json!({
        "id": "ev-kindless",
        "properties": { "mag": 2.2, "time": 0 },
        "geometry": { "coordinates": [3.0, 4.0] }
    });
    let ev = normalize_feature(raw, "seismic event").unwrap();
    assert_eq!(ev.kind, "seismic event");
}
