//! Integration tests for API routes.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use catalog::{CatalogStore, Database};
use ext_clients::{GeocoderClient, GeocoderConfig, RoutingClient, RouterConfig};
use http_body_util::BodyExt;
use server::{create_router, AppState};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn test_store() -> CatalogStore {
    let db = Database::new(":memory:").expect("connect");
    let store = CatalogStore::new(db);
    store.init_schema().expect("init schema");
    store
}

fn test_state(geocoder_url: &str, router_url: &str) -> AppState {
    let geocoder_config = GeocoderConfig {
        base_url: geocoder_url.to_string(),
        user_agent: "fuel-route-planner-tests/0.1".to_string(),
        timeout: Duration::from_secs(5),
        retry_count: 0,
        cache_ttl: Duration::from_secs(60),
    };
    let router_config = RouterConfig {
        base_url: router_url.to_string(),
        timeout: Duration::from_secs(5),
        retry_count: 0,
        cache_ttl: Duration::from_secs(60),
    };

    AppState {
        catalog: Arc::new(test_store()),
        geocoder: GeocoderClient::new(geocoder_config).expect("geocoder client"),
        router: RoutingClient::new(router_config).expect("routing client"),
        defaults: server::DefaultVehicleParams { mpg: 10.0, tank_capacity_gallons: 50.0, max_range_miles: 500.0 },
        max_candidate_stations: 600,
    }
}

async fn get(state: AppState, uri: &str) -> (StatusCode, String) {
    let app = create_router(state);

    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_health_endpoint() {
    let state = test_state("http://127.0.0.1:0", "http://127.0.0.1:0");
    let (status, body) = get(state, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_catalog_health_endpoint_reports_counts() {
    let state = test_state("http://127.0.0.1:0", "http://127.0.0.1:0");
    let (status, body) = get(state, "/api/v1/health").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"stations\":{\"total\":0,\"geocoded\":0}"));
}

#[tokio::test]
async fn test_invalid_route_returns_404() {
    let state = test_state("http://127.0.0.1:0", "http://127.0.0.1:0");
    let (status, _body) = get(state, "/api/invalid/route").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_route_plan_within_range_needs_no_stops() {
    let mut geocode_server = mockito::Server::new_async().await;
    let mut router_server = mockito::Server::new_async().await;

    let _geocode_mock = geocode_server
        .mock("GET", "/search")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"lat":"36.0","lon":"-95.0","address":{"country_code":"us"}}]"#)
        .create_async()
        .await;

    let _route_mock = router_server
        .mock("GET", mockito::Matcher::Regex("/route/v1/driving/.*".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"code":"Ok","routes":[{"distance":144841.0,"duration":5400.0,
                "geometry":{"coordinates":[[-95.0,36.0],[-94.0,36.0]]}}]}"#,
        )
        .create_async()
        .await;

    let state = test_state(&geocode_server.url(), &router_server.url());
    let app = create_router(state);

    let body = serde_json::json!({
        "start_location": "Tulsa, OK",
        "finish_location": "Oklahoma City, OK",
    });

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/route-plan")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(parsed["stops"].as_array().unwrap().len(), 0);
    assert_eq!(parsed["optimizer_used"], "baseline");
    assert!((parsed["summary"]["distance_miles"].as_f64().unwrap() - 90.0).abs() < 0.01);
}

#[tokio::test]
async fn test_malformed_json_body_returns_invalid_json_error() {
    let state = test_state("http://127.0.0.1:0", "http://127.0.0.1:0");
    let app = create_router(state);

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/route-plan")
        .header("content-type", "application/json")
        .body(Body::from("{not valid json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(parsed["error"]["code"], "invalid_json");
}

#[tokio::test]
async fn test_unknown_field_returns_invalid_json_error() {
    let state = test_state("http://127.0.0.1:0", "http://127.0.0.1:0");
    let app = create_router(state);

    let body = serde_json::json!({
        "start_location": "Tulsa, OK",
        "finish_location": "Oklahoma City, OK",
        "not_a_real_field": true,
    });

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/route-plan")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(parsed["error"]["code"], "invalid_json");
}

#[tokio::test]
async fn test_out_of_range_field_returns_validation_error() {
    let mut geocode_server = mockito::Server::new_async().await;
    let router_server = mockito::Server::new_async().await;
    let _geocode_mock = geocode_server
        .mock("GET", "/search")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"lat":"36.0","lon":"-95.0","address":{"country_code":"us"}}]"#)
        .create_async()
        .await;

    let state = test_state(&geocode_server.url(), &router_server.url());
    let app = create_router(state);

    let body = serde_json::json!({
        "start_location": "Tulsa, OK",
        "finish_location": "Oklahoma City, OK",
        "corridor_miles": 500.0,
    });

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/route-plan")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(parsed["error"]["code"], "validation_error");
}
