#[macro_use]
extern crate time_test;

mod common;

use rocket::http::Status;
use serde_json::Value;

use common::client;

#[rocket::async_test]
async fn test_service_info_and_health() {
    let client = client().await;
    time_test!("test_service_info_and_health");

    let response = client.get("/").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.expect("valid JSON response");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["health"], "/health");

    let response = client.get("/health").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.expect("valid JSON response");
    assert_eq!(body["status"], "Healthy");
}

#[rocket::async_test]
async fn test_unknown_route_uses_error_envelope() {
    let client = client().await;
    time_test!("test_unknown_route_uses_error_envelope");

    let response = client.get("/api/Nothing").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
    let body: Value = response.into_json().await.expect("valid JSON response");
    assert_eq!(body["statusCode"], 404);
    assert!(body["traceId"].is_string());
}
