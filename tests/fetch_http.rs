// tests/fetch_http.rs
use quake_feed_aggregator::{
    build_client, FeedAggregator, FeedConfig, FeedEndpoint, FeedError, FeedSource, UsgsFeed,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FIXTURE: &str = include_str!("fixtures/usgs_all_hour.json");

fn make_feed(server_uri: &str, route: &str) -> UsgsFeed {
    UsgsFeed::new(
        "all_hour",
        format!("{server_uri}{route}"),
        "earthquake",
        build_client(5),
    )
}

#[tokio::test]
async fn fetch_decodes_a_summary_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/all_hour.geojson"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(FIXTURE, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let feed = make_feed(&server.uri(), "/all_hour.geojson");
    let events = feed.fetch().await.unwrap();

    assert_eq!(events.len(), 5); // two malformed features skipped
    assert_eq!(events[0].id, "us7000kufc");
    assert_eq!(events[0].latitude, 35.55);
    assert_eq!(events[0].longitude, -117.55);
    assert_eq!(events[4].depth_km, None); // null depth on the wire
}

#[tokio::test]
async fn server_error_maps_to_endpoint_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let feed = make_feed(&server.uri(), "/all_hour.geojson");
    let err = feed.fetch().await.unwrap_err();
    assert!(matches!(
        err,
        FeedError::EndpointUnavailable { status: 503, .. }
    ));
}

#[tokio::test]
async fn garbage_body_maps_to_malformed_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let feed = make_feed(&server.uri(), "/all_hour.geojson");
    let err = feed.fetch().await.unwrap_err();
    assert!(matches!(err, FeedError::MalformedPayload { .. }));
}

#[tokio::test]
async fn empty_feature_array_is_success_not_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"type":"FeatureCollection","features":[]}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let feed = make_feed(&server.uri(), "/all_hour.geojson");
    let events = feed.fetch().await.unwrap();
    assert!(events.is_empty());
}

#[tokio::test]
async fn unreachable_endpoint_maps_to_endpoint_unreachable() {
    // Nothing listens on this port.
    let feed = UsgsFeed::new(
        "dead",
        "http://127.0.0.1:1/feed.geojson",
        "earthquake",
        build_client(2),
    );
    let err = feed.fetch().await.unwrap_err();
    assert!(matches!(err, FeedError::EndpointUnreachable { .. }));
}

#[tokio::test]
async fn aggregator_survives_mixed_endpoint_health_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/hour.geojson"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(FIXTURE, "application/json"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/day.geojson"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/week.geojson"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"type":"FeatureCollection","features":[]}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let cfg = FeedConfig {
        endpoints: vec![
            FeedEndpoint {
                name: "hour".into(),
                url: format!("{}/hour.geojson", server.uri()),
            },
            FeedEndpoint {
                name: "day".into(),
                url: format!("{}/day.geojson", server.uri()),
            },
            FeedEndpoint {
                name: "week".into(),
                url: format!("{}/week.geojson", server.uri()),
            },
        ],
        fallback: FeedEndpoint {
            name: "significant".into(),
            url: format!("{}/significant.geojson", server.uri()),
        },
        ..FeedConfig::default()
    };

    let agg = FeedAggregator::from_config(&cfg);
    let snap = agg.run_cycle().await.unwrap();

    assert_eq!(snap.len(), 5); // fixture events, one endpoint down, one empty
    assert!(!snap.degraded);
}
