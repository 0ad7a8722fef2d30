//! Integration tests for the geocoding and directions clients.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cartroute_client::{
    ClientError, DirectionsClient, DirectionsQuery, GeocodingClient, HttpOptions,
};
use cartroute_core::{GeoPosition, Waypoint};

fn options() -> HttpOptions {
    HttpOptions {
        timeout_secs: 5,
        user_agent: "cartroute-test/0.1".to_string(),
        max_retries: 0,
        backoff_base_ms: 0,
    }
}

#[tokio::test]
async fn geocode_returns_first_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geocode/json"))
        .and(query_param("address", "Ben Thanh Market"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "results": [
                {"geometry": {"location": {"lat": 10.7725, "lng": 106.6980}}},
                {"geometry": {"location": {"lat": 0.0, "lng": 0.0}}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeocodingClient::new(&server.uri(), "test-key", &options()).unwrap();
    let position = client.geocode("Ben Thanh Market").await.unwrap();
    assert_eq!(position, GeoPosition::new(10.7725, 106.6980));
}

#[tokio::test]
async fn geocode_zero_results_is_no_results() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geocode/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "ZERO_RESULTS", "results": []})),
        )
        .mount(&server)
        .await;

    let client = GeocodingClient::new(&server.uri(), "test-key", &options()).unwrap();
    let err = client.geocode("nowhere at all").await.unwrap_err();
    assert!(matches!(err, ClientError::NoResults { .. }), "got: {err:?}");
}

#[tokio::test]
async fn geocode_denied_is_service_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geocode/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid."
        })))
        .mount(&server)
        .await;

    let client = GeocodingClient::new(&server.uri(), "bad-key", &options()).unwrap();
    let err = client.geocode("Ben Thanh Market").await.unwrap_err();
    match err {
        ClientError::Service {
            status, message, ..
        } => {
            assert_eq!(status, "REQUEST_DENIED");
            assert_eq!(message.as_deref(), Some("The provided API key is invalid."));
        }
        other => panic!("expected Service error, got: {other:?}"),
    }
}

#[tokio::test]
async fn directions_decodes_overview_polyline() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/directions/json"))
        .and(query_param("origin", "38.5,-120.2"))
        .and(query_param("destination", "43.252,-126.453"))
        .and(query_param("waypoints", "optimize:true|40.7,-120.95"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "routes": [{
                "overview_polyline": {"points": "_p~iF~ps|U_ulLnnqC_mqNvxq`@"},
                "waypoint_order": [0]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = DirectionsClient::new(&server.uri(), "test-key", &options()).unwrap();
    let resolved = client
        .directions(&DirectionsQuery {
            origin: Waypoint::Position(GeoPosition::new(38.5, -120.2)),
            destination: Waypoint::Position(GeoPosition::new(43.252, -126.453)),
            stops: vec![Waypoint::Position(GeoPosition::new(40.7, -120.95))],
            optimize: true,
        })
        .await
        .unwrap();
    assert_eq!(resolved.path.len(), 3);
    assert_eq!(resolved.waypoint_order, vec![0]);
}

#[tokio::test]
async fn directions_non_ok_status_is_service_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/directions/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "NOT_FOUND", "routes": []})),
        )
        .mount(&server)
        .await;

    let client = DirectionsClient::new(&server.uri(), "test-key", &options()).unwrap();
    let err = client
        .directions(&DirectionsQuery {
            origin: Waypoint::Address("A".to_string()),
            destination: Waypoint::Address("B".to_string()),
            stops: Vec::new(),
            optimize: false,
        })
        .await
        .unwrap_err();
    assert!(
        matches!(err, ClientError::Service { ref status, .. } if status == "NOT_FOUND"),
        "got: {err:?}"
    );
}
