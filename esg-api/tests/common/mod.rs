#![allow(dead_code)]

use rocket::http::{Header, Status};
use rocket::local::asynchronous::Client;
use serde_json::{Value, json};

use esg_api::orm::testing::test_rocket;

pub const SEED_COMPANY_ID: i32 = 1;

pub async fn client() -> Client {
    Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance")
}

/// Logs in and returns the bearer token.
pub async fn login(client: &Client, username: &str, password: &str) -> String {
    let response = client
        .post("/api/Auth/login")
        .json(&json!({ "username": username, "password": password }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok, "login as {} should succeed", username);

    let body: Value = response.into_json().await.expect("valid JSON response");
    body["data"]["token"]
        .as_str()
        .expect("token in login response")
        .to_string()
}

pub fn bearer(token: &str) -> Header<'static> {
    Header::new("Authorization", format!("Bearer {}", token))
}

pub async fn admin_token(client: &Client) -> String {
    login(client, "admin", "admin123").await
}

pub async fn manager_token(client: &Client) -> String {
    login(client, "manager", "manager123").await
}

pub async fn user_token(client: &Client) -> String {
    login(client, "user", "user123").await
}
